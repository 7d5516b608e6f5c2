//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::OpenAiClient;
pub use traits::LlmClient;

use std::sync::Arc;

use crate::config::AppConfig;

/// 按配置创建 LLM 客户端（base_url 默认本地 Ollama /v1）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    Arc::new(OpenAiClient::new(
        Some(cfg.llm.base_url.as_str()),
        &cfg.llm.model,
        cfg.llm.temperature,
    ))
}
