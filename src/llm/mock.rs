//! Mock LLM 客户端（用于测试，无需 API）
//!
//! MockLlmClient 固定回显 finish；ScriptedLlmClient 按脚本顺序吐出预设回复，
//! 便于测试驱动多步循环。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：总是以 finish 回应，回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!(
            r#"{{"tool": "finish", "args": {{"response": "Echo from Mock: {}"}}}}"#,
            last_user.replace('"', "'")
        ))
    }
}

/// 脚本化客户端：按顺序返回预设回复，耗尽后重复最后一条
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedLlmClient {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        let mut replies = self.replies.lock().map_err(|e| e.to_string())?;
        match replies.pop_front() {
            Some(r) => {
                let mut last = self.last.lock().map_err(|e| e.to_string())?;
                *last = r.clone();
                Ok(r)
            }
            None => {
                let last = self.last.lock().map_err(|e| e.to_string())?;
                if last.is_empty() {
                    Err("script exhausted".to_string())
                } else {
                    Ok(last.clone())
                }
            }
        }
    }
}
