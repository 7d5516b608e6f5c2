//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters / execute），由 ToolRegistry
//! 按名注册与查找。参数元数据显式登记（名称、是否必填、默认值），校验与提示词生成
//! 共用同一份描述，不做任何反射；声明顺序即校验报告顺序。注册表构建一次后只读，
//! 跨目标共享。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// 工具参数描述：名称、是否必填、默认值（仅用于提示词展示）
#[derive(Debug, Clone, Copy)]
pub struct ToolParam {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl ToolParam {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, default: Option<&'static str>) -> Self {
        Self {
            name,
            required: false,
            default,
        }
    }
}

/// 工具 trait：统一的 invoke 契约
///
/// execute 返回 Ok(observation) 或 Err(reason)；Err 由 ToolExecutor 降级为文本
/// Observation，不会向外传播。auto_execute 默认 true（只读探索/分析类），
/// 有副作用的工具覆盖为 false，执行前需用户确认。
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// 工具描述（逐字拼入 system prompt，供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 声明的参数表，顺序即缺参报告顺序
    fn parameters(&self) -> &'static [ToolParam];

    /// 是否免确认自动执行
    fn auto_execute(&self) -> bool {
        true
    }

    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具注册表：按名存储，保留注册顺序（顺序用于未知工具的提示与提示词渲染）
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// 注册顺序的工具名列表
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// 按注册顺序遍历工具
    pub fn iter(&self) -> impl Iterator<Item = Arc<dyn Tool>> + '_ {
        self.order.iter().filter_map(|n| self.tools.get(n).cloned())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(&'static str);

    #[async_trait]
    impl Tool for Dummy {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "dummy"
        }
        fn parameters(&self) -> &'static [ToolParam] {
            &[]
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            Ok("ok".to_string())
        }
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let mut reg = ToolRegistry::new();
        reg.register(Dummy("zeta"));
        reg.register(Dummy("alpha"));
        reg.register(Dummy("mid"));
        let names: Vec<&str> = reg.names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(reg.contains("alpha"));
        assert!(reg.get("missing").is_none());
    }

    #[test]
    fn test_reregister_keeps_single_entry() {
        let mut reg = ToolRegistry::new();
        reg.register(Dummy("echo"));
        reg.register(Dummy("echo"));
        assert_eq!(reg.len(), 1);
    }
}
