//! Agent 错误类型
//!
//! 工具失败不在此列：ToolExecutor 将其降级为文本 Observation，永远不会越过该边界。
//! 这里只保留真正会终止一次目标执行的错误。

use thiserror::Error;

/// Agent 运行过程中可能出现的硬错误（协议、LLM、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM 连续输出无法解析的 JSON，超过解析重试上限
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Config error: {0}")]
    Config(String),
}
