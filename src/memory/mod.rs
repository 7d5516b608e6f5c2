//! 记忆层：单次目标内的对话历史

pub mod conversation;

pub use conversation::{Memory, Message, Role};
