//! 系统提示词组装
//!
//! 从注册表的工具描述符渲染 Available Tools 段落（描述逐字拼入），附上由
//! schemars 生成的动作 JSON Schema 约束输出格式，末尾钉住当前目标。

use schemars::schema_for;

use crate::agent::action::Action;
use crate::tools::ToolRegistry;

/// 动作线格式的 JSON Schema（拼入提示词，降低格式错误率）
pub fn action_schema_json() -> String {
    let schema = schema_for!(Action);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

fn render_tool_definitions(registry: &ToolRegistry) -> String {
    let mut out = String::new();
    for tool in registry.iter() {
        out.push_str(&format!("- {}:\n", tool.name()));
        out.push_str(&format!("  - Description: {}\n", tool.description()));
        let params = tool
            .parameters()
            .iter()
            .map(|p| {
                if p.required {
                    p.name.to_string()
                } else {
                    match p.default {
                        Some(d) => format!("{}={}", p.name, d),
                        None => format!("{}?", p.name),
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("  - Arguments: ({})\n\n", params));
    }
    out
}

/// 组装系统提示词：能力说明 + 响应格式 + 策略 + 工具清单 + 当前目标
pub fn build_system_prompt(registry: &ToolRegistry, goal: &str) -> String {
    format!(
        r#"You are an expert AI programming assistant with advanced codebase understanding capabilities. You have access to powerful tools that allow you to navigate, analyze, and understand codebases like a professional developer.

## Your Capabilities

You can:
- Navigate and explore codebases intelligently
- Analyze code structure, dependencies, and patterns
- Find symbols, functions, and types across the project
- Understand code flow and relationships
- Suggest improvements and identify issues
- Execute commands with proper context
- Read and write files efficiently

## Response Format

You must respond with a single JSON object in this exact format:
{{
  "thought": {{
    "goal": "What is the user's goal?",
    "current_state": "What is the current state of the project?",
    "analysis": "What have I learned from previous observations?",
    "next_action": "What is the next logical step to take?",
    "tool": "Which tool is best suited for this step?",
    "reasoning": "Why is this the best approach?"
  }},
  "plan": "Your step-by-step plan to achieve the user's goal. Mark completed steps with [x].",
  "progress": "A summary of the progress you have made so far.",
  "tool": "tool_name",
  "args": {{
    "param1": "value1"
  }}
}}

The response must validate against this schema:
{schema}

## Strategic Approach

1. **Start with context**: Use `get_project_overview` to understand the project structure
2. **Explore intelligently**: Use `explore_codebase` to find relevant files
3. **Read and analyze**: Use `read_and_summarize_project` to read all files and create comprehensive analysis
4. **Write results**: Use `write_file` to save the analysis to the requested file
5. **Navigate efficiently**: Use `navigate_to_symbol` to find specific functions/types
6. **Understand relationships**: Use `get_file_dependencies` to see how files connect
7. **Execute with context**: Use `execute_with_context` for commands with proper working directory

## Important Rules

1. **Always respond with valid JSON** - No other text or explanations
2. **Always provide a tool** - Use `finish` with args.response when the task is complete
3. **Complete the full task** - Don't stop until you've done everything the user asked for
4. **Stay focused on the original goal** - Do not deviate from the user's specific request
5. **Provide correct arguments** - Always include required parameters for tools
6. **Learn from observations** - Analyze results to inform next steps
7. **Handle errors gracefully** - If a tool fails, analyze and try a different approach

## Available Tools

{tools}

**CURRENT GOAL**: {goal}
**IMPORTANT**: Stay focused on this specific goal throughout the conversation. Do not deviate from the user's request."#,
        schema = action_schema_json(),
        tools = render_tool_definitions(registry),
        goal = goal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolParam};
    use async_trait::async_trait;
    use serde_json::Value;

    struct Stub;

    const STUB_PARAMS: &[ToolParam] = &[ToolParam::required("path")];

    #[async_trait]
    impl Tool for Stub {
        fn name(&self) -> &str {
            "read_file"
        }
        fn description(&self) -> &str {
            "Read the contents of a file."
        }
        fn parameters(&self) -> &'static [ToolParam] {
            STUB_PARAMS
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_prompt_contains_tools_and_goal() {
        let mut reg = ToolRegistry::new();
        reg.register(Stub);
        let prompt = build_system_prompt(&reg, "summarize the repo");
        assert!(prompt.contains("- read_file:"));
        assert!(prompt.contains("Read the contents of a file."));
        assert!(prompt.contains("**CURRENT GOAL**: summarize the repo"));
    }

    #[test]
    fn test_action_schema_mentions_wire_fields() {
        let schema = action_schema_json();
        for field in ["thought", "plan", "progress", "tool", "args"] {
            assert!(schema.contains(field), "schema missing {}", field);
        }
    }
}
