//! 工具执行器
//!
//! 持有 ToolRegistry，execute(tool_name, args) 永远返回字符串 Observation：
//! 工具内部的任何失败都被捕获并转为 "Error executing tool '<name>': <message>"，
//! 绝不向循环抛错。每次调用输出结构化审计日志。子进程超时由各工具自身持有。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::tools::ToolRegistry;

/// 工具执行器：调度 + 错误遏制边界
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 执行指定工具；失败降级为文本 Observation，循环侧总是拿到字符串
    pub async fn execute(&self, tool_name: &str, args: Value) -> String {
        let start = Instant::now();
        let args_preview = args_preview(&args);

        let result = match self.registry.get(tool_name) {
            Some(tool) => tool.execute(args).await,
            None => Err(format!("unknown tool '{}'", tool_name)),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": result.is_ok(),
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(observation) => observation,
            Err(e) => format!("Error executing tool '{}': {}", tool_name, e),
        }
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Tool, ToolParam};
    use async_trait::async_trait;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "always fails"
        }
        fn parameters(&self) -> &'static [ToolParam] {
            &[]
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Err("boom".to_string())
        }
    }

    struct OkTool;

    #[async_trait]
    impl Tool for OkTool {
        fn name(&self) -> &str {
            "fine"
        }
        fn description(&self) -> &str {
            "works"
        }
        fn parameters(&self) -> &'static [ToolParam] {
            &[]
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok("all good".to_string())
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_observation() {
        let mut reg = ToolRegistry::new();
        reg.register(FailingTool);
        let exec = ToolExecutor::new(Arc::new(reg));
        let obs = exec.execute("broken", serde_json::json!({})).await;
        assert!(obs.starts_with("Error executing tool 'broken':"));
        assert!(obs.contains("boom"));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let exec = ToolExecutor::new(Arc::new(ToolRegistry::new()));
        let obs = exec.execute("ghost", serde_json::json!({})).await;
        assert!(obs.starts_with("Error executing tool 'ghost':"));
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mut reg = ToolRegistry::new();
        reg.register(OkTool);
        let exec = ToolExecutor::new(Arc::new(reg));
        assert_eq!(exec.execute("fine", serde_json::json!({})).await, "all good");
    }
}
