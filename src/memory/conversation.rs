//! 对话记忆：按序只追加的消息日志
//!
//! 每次目标执行新建一份 Memory，循环结束即丢弃；完整历史逐轮原样提交给 LLM 边界。
//! 不设长度上限（已知风险：长目标会线性增长上下文），也绝不重排或原地修改。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 只追加的对话日志
#[derive(Debug, Default)]
pub struct Memory {
    history: Vec<Message>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, msg: Message) {
        self.history.push(msg);
    }

    /// 完整有序历史，按发生顺序
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_preserves_order() {
        let mut mem = Memory::new();
        mem.add(Message::system("s"));
        mem.add(Message::user("u1"));
        mem.add(Message::assistant("a1"));
        mem.add(Message::user("u2"));

        let roles: Vec<&Role> = mem.history().iter().map(|m| &m.role).collect();
        assert_eq!(
            roles,
            vec![&Role::System, &Role::User, &Role::Assistant, &Role::User]
        );
        assert_eq!(mem.history()[1].content, "u1");
        assert_eq!(mem.len(), 4);
    }

    #[test]
    fn test_memory_is_append_only() {
        let mut mem = Memory::new();
        for i in 0..100 {
            mem.add(Message::user(format!("m{}", i)));
        }
        // 无剪枝：全部保留
        assert_eq!(mem.len(), 100);
        assert_eq!(mem.history()[0].content, "m0");
        assert_eq!(mem.history()[99].content, "m99");
    }
}
