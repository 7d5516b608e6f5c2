//! Mantis - Rust 编码智能体 CLI
//!
//! 模块划分：
//! - **agent**: 动作解析/校验、计划生成、续行策略、确认闸门、主循环
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 单目标内的对话历史（只追加）
//! - **project**: 项目结构缓存与逐行源码分析
//! - **tools**: 工具契约、注册表、执行器与 ~20 个能力实现

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod project;
pub mod tools;
