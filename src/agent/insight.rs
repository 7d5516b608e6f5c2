//! 交互学习记录
//!
//! 进程生命周期内累积：成功交互按关键词沉淀工具序列，目标级记录成败与规模。
//! 不落盘（跨目标不跨进程），由上层显式持有并传入循环。

use std::collections::HashMap;

use crate::agent::plan::extract_key_terms;

/// 单目标的交互记录
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    pub success: bool,
    pub actions: usize,
    pub result_length: usize,
}

/// 学习组件：成功模式与目标级洞察
#[derive(Debug, Default)]
pub struct Insights {
    /// 关键词 -> 成功交互中使用过的工具序列
    learned_patterns: HashMap<String, Vec<String>>,
    /// 目标 -> 交互记录（final_result 提到项目时记录）
    project_insights: HashMap<String, InteractionRecord>,
    successes: usize,
    failures: usize,
}

impl Insights {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次交互；tools_used 为本次按序执行过的工具名
    pub fn record_interaction(
        &mut self,
        goal: &str,
        tools_used: &[String],
        final_result: &str,
        success: bool,
    ) {
        if success {
            self.successes += 1;
            for term in extract_key_terms(goal) {
                self.learned_patterns
                    .entry(term)
                    .or_default()
                    .extend(tools_used.iter().cloned());
            }
        } else {
            self.failures += 1;
        }

        if final_result.to_lowercase().contains("project") {
            self.project_insights.insert(
                goal.to_string(),
                InteractionRecord {
                    success,
                    actions: tools_used.len(),
                    result_length: final_result.len(),
                },
            );
        }

        tracing::debug!(
            goal = %goal,
            success,
            actions = tools_used.len(),
            "interaction recorded"
        );
    }

    pub fn patterns_for(&self, term: &str) -> Option<&[String]> {
        self.learned_patterns.get(term).map(|v| v.as_slice())
    }

    pub fn record_for(&self, goal: &str) -> Option<&InteractionRecord> {
        self.project_insights.get(goal)
    }

    /// (成功数, 失败数)
    pub fn totals(&self) -> (usize, usize) {
        (self.successes, self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_stores_tool_patterns() {
        let mut insights = Insights::new();
        insights.record_interaction(
            "summarize the parser",
            &["read_file".to_string(), "write_file".to_string()],
            "done",
            true,
        );
        let tools = insights.patterns_for("parser").expect("pattern");
        assert_eq!(tools, &["read_file", "write_file"]);
    }

    #[test]
    fn test_failure_stores_no_patterns() {
        let mut insights = Insights::new();
        insights.record_interaction(
            "summarize the parser",
            &["read_file".to_string()],
            "Maximum iterations reached",
            false,
        );
        assert!(insights.patterns_for("parser").is_none());
    }

    #[test]
    fn test_project_mention_creates_record() {
        let mut insights = Insights::new();
        insights.record_interaction(
            "describe things",
            &["get_project_overview".to_string()],
            "This project is a CLI.",
            true,
        );
        let rec = insights.record_for("describe things").expect("record");
        assert!(rec.success);
        assert_eq!(rec.actions, 1);
    }
}
