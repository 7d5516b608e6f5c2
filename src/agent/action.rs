//! Action 线上格式与解析
//!
//! LLM 每轮必须输出一个严格 JSON 对象 {thought, plan, progress, tool, args}；
//! thought 为固定字段的结构化记录，缺省字段落空串而非任意映射。
//! 解析失败返回 Protocol 错误，由循环的 THINK 子重试处理。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::AgentError;

/// 结构化思考记录：字段固定，缺省为空
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct Thought {
    /// 用户目标的复述
    pub goal: String,
    pub current_state: String,
    pub analysis: String,
    pub next_action: String,
    pub tool: String,
    pub reasoning: String,
}

/// 一次 LLM 提议的工具调用及其理由
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct Action {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<Thought>,
    /// 分步计划文本，完成项以 [x] 标记
    pub plan: String,
    pub progress: String,
    /// 工具名；保留值 "finish" 表示终止
    pub tool: String,
    pub args: Map<String, Value>,
}

/// 终止动作的保留工具名
pub const FINISH_TOOL: &str = "finish";

impl Action {
    pub fn is_finish(&self) -> bool {
        self.tool == FINISH_TOOL
    }

    /// finish 动作的最终回复（校验通过后必定存在）
    pub fn finish_response(&self) -> String {
        match self.args.get("response") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// 回写 Memory 时的序列化形式
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// 严格 JSON 解析：不剥离 Markdown 围栏，非对象即失败
pub fn parse_action(raw: &str) -> Result<Action, AgentError> {
    serde_json::from_str::<Action>(raw.trim())
        .map_err(|e| AgentError::Protocol(format!("{}: {}", e, truncate(raw, 200))))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_action() {
        let raw = r#"{
            "thought": {"goal": "g", "analysis": "a"},
            "plan": "1. [x] look",
            "progress": "looked",
            "tool": "read_file",
            "args": {"path": "main.py"}
        }"#;
        let action = parse_action(raw).expect("parse");
        assert_eq!(action.tool, "read_file");
        assert_eq!(action.args.get("path").and_then(|v| v.as_str()), Some("main.py"));
        let thought = action.thought.expect("thought");
        assert_eq!(thought.goal, "g");
        // 缺省字段落空串
        assert_eq!(thought.next_action, "");
    }

    #[test]
    fn test_parse_minimal_action_defaults() {
        let action = parse_action(r#"{"tool": "finish", "args": {"response": "done"}}"#)
            .expect("parse");
        assert!(action.is_finish());
        assert_eq!(action.finish_response(), "done");
        assert!(action.thought.is_none());
        assert_eq!(action.plan, "");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_action("I think I should read the file").is_err());
        assert!(parse_action("```json\n{\"tool\": \"x\"}\n```").is_err());
    }

    #[test]
    fn test_missing_tool_field_defaults_empty() {
        let action = parse_action(r#"{"plan": "p"}"#).expect("parse");
        assert_eq!(action.tool, "");
    }

    #[test]
    fn test_non_string_finish_response_is_stringified() {
        let action = parse_action(r#"{"tool": "finish", "args": {"response": 42}}"#)
            .expect("parse");
        assert_eq!(action.finish_response(), "42");
    }
}
