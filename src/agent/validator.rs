//! 动作校验器
//!
//! 对照注册表检查 LLM 提议的动作，固定顺序、快速失败，一次最多返回一条批评
//! （不聚合）。批评文案是对外契约：循环将其原样注入纠正消息。

use crate::agent::action::{Action, FINISH_TOOL};
use crate::tools::ToolRegistry;

/// 校验器：持注册表引用，validate 返回 None（通过）或一条批评
pub struct ActionValidator<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ActionValidator<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// 固定顺序检查：
    /// 1. tool 字段缺失
    /// 2. finish 需要 args.response，满足即合法（终止动作）
    /// 3. 工具未注册（批评列出全部注册名）
    /// 4. 缺少必填参数（按声明顺序报第一个）
    /// 5. 出现未声明参数（报第一个）
    pub fn validate(&self, action: &Action) -> Option<String> {
        if action.tool.is_empty() {
            return Some("The 'tool' field is missing in your response.".to_string());
        }

        if action.tool == FINISH_TOOL {
            if !action.args.contains_key("response") {
                return Some("The 'response' field is missing in the 'finish' tool.".to_string());
            }
            return None;
        }

        let Some(tool) = self.registry.get(&action.tool) else {
            return Some(format!(
                "Unknown tool '{}'. Please choose from the available tools: [{}]",
                action.tool,
                self.registry.names().join(", ")
            ));
        };

        for param in tool.parameters() {
            if param.required && !action.args.contains_key(param.name) {
                return Some(format!(
                    "Missing required argument '{}' for tool '{}'.",
                    param.name, action.tool
                ));
            }
        }

        for key in action.args.keys() {
            if !tool.parameters().iter().any(|p| p.name == key) {
                return Some(format!(
                    "Unexpected argument '{}' for tool '{}'.",
                    key, action.tool
                ));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolParam};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    struct WriteFileStub;

    const WRITE_FILE_STUB_PARAMS: &[ToolParam] = &[
        ToolParam::required("path"),
        ToolParam::required("content"),
    ];

    #[async_trait]
    impl Tool for WriteFileStub {
        fn name(&self) -> &str {
            "write_file"
        }
        fn description(&self) -> &str {
            "write"
        }
        fn parameters(&self) -> &'static [ToolParam] {
            WRITE_FILE_STUB_PARAMS
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok(String::new())
        }
    }

    struct ListStub;

    const LIST_STUB_PARAMS: &[ToolParam] = &[
        ToolParam::optional("path", Some(".")),
        ToolParam::optional("recursive", Some("false")),
    ];

    #[async_trait]
    impl Tool for ListStub {
        fn name(&self) -> &str {
            "list_files"
        }
        fn description(&self) -> &str {
            "list"
        }
        fn parameters(&self) -> &'static [ToolParam] {
            LIST_STUB_PARAMS
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok(String::new())
        }
    }

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        reg.register(WriteFileStub);
        reg.register(ListStub);
        reg
    }

    fn action(tool: &str, args: Value) -> Action {
        let args: Map<String, Value> = args.as_object().cloned().unwrap_or_default();
        Action {
            tool: tool.to_string(),
            args,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_tool_field() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        let criticism = v.validate(&action("", json!({}))).expect("criticism");
        assert_eq!(criticism, "The 'tool' field is missing in your response.");
    }

    #[test]
    fn test_finish_requires_response() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        let criticism = v.validate(&action("finish", json!({}))).expect("criticism");
        assert_eq!(
            criticism,
            "The 'response' field is missing in the 'finish' tool."
        );
        assert!(v
            .validate(&action("finish", json!({"response": "done"})))
            .is_none());
    }

    #[test]
    fn test_unknown_tool_enumerates_registry_names() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        let criticism = v
            .validate(&action("teleport", json!({})))
            .expect("criticism");
        assert_eq!(
            criticism,
            "Unknown tool 'teleport'. Please choose from the available tools: [write_file, list_files]"
        );
    }

    #[test]
    fn test_first_missing_required_in_declared_order() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        // path 与 content 都缺：按声明顺序先报 path
        let criticism = v
            .validate(&action("write_file", json!({})))
            .expect("criticism");
        assert_eq!(
            criticism,
            "Missing required argument 'path' for tool 'write_file'."
        );
        // 只缺 content
        let criticism = v
            .validate(&action("write_file", json!({"path": "x.py"})))
            .expect("criticism");
        assert_eq!(
            criticism,
            "Missing required argument 'content' for tool 'write_file'."
        );
    }

    #[test]
    fn test_unexpected_argument() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        let criticism = v
            .validate(&action("list_files", json!({"path": ".", "verbose": true})))
            .expect("criticism");
        assert_eq!(
            criticism,
            "Unexpected argument 'verbose' for tool 'list_files'."
        );
    }

    #[test]
    fn test_valid_action_passes() {
        let reg = registry();
        let v = ActionValidator::new(&reg);
        assert!(v
            .validate(&action(
                "write_file",
                json!({"path": "a.md", "content": "hi"})
            ))
            .is_none());
        // 可选参数可以省略
        assert!(v.validate(&action("list_files", json!({}))).is_none());
    }
}
