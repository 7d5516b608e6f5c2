//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MANTIS__*` 覆盖
//! （双下划线表示嵌套，如 `MANTIS__LLM__MODEL=qwen2.5-coder`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmSection::default(),
            agent: AgentSection::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// [llm] 段：端点、模型与采样参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// OpenAI 兼容端点；默认本地 Ollama
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1:latest".to_string(),
            temperature: 0.1,
        }
    }
}

/// [agent] 段：循环上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 单次目标的最大迭代数（硬上限，超出即中止并记为失败）
    pub max_iterations: usize,
    /// THINK 阶段 JSON 解析的重试上限，超出升级为硬错误
    pub parse_retry_limit: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            parse_retry_limit: 3,
        }
    }
}

/// [tools] 段：子进程超时与探索上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单条命令的超时（秒），由工具自身持有，而非循环
    pub command_timeout_secs: u64,
    /// explore_codebase 默认返回的最大文件数
    pub max_explore_files: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            command_timeout_secs: 30,
            max_explore_files: 20,
        }
    }
}

/// 从 config 目录加载配置，环境变量 MANTIS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MANTIS__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MANTIS")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
