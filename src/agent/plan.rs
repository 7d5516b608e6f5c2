//! 计划生成：意图分类与建议步骤
//!
//! 纯函数：goal 文本 -> 意图分析 + 建议步骤表。计划只用于启动时的日志展示与
//! 策略描述，不做类型检查，也不被循环机械消费（LLM 自己决定每一步）。

use serde::Serialize;
use serde_json::{json, Value};

/// 目标意图类别（关键词首次命中，互斥）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    Analysis,
    Creation,
    Debugging,
    Improvement,
    Unknown,
}

/// 目标复杂度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// 步骤优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// 意图分析结果
#[derive(Debug, Clone, Serialize)]
pub struct IntentAnalysis {
    pub intent: Intent,
    pub complexity: Complexity,
    pub suggested_tools: Vec<&'static str>,
    pub approach: &'static str,
    pub confidence: f32,
}

/// 建议的计划步骤（args 为可选模板）
#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub tool: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    pub reason: String,
    pub priority: Priority,
}

impl PlanStep {
    fn new(tool: &'static str, reason: impl Into<String>, priority: Priority) -> Self {
        Self {
            tool,
            args: None,
            reason: reason.into(),
            priority,
        }
    }

    fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

/// 意图与复杂度分类；无命中退化为 unknown / exploratory
pub fn analyze_intent(goal: &str) -> IntentAnalysis {
    let g = goal.to_lowercase();

    let (intent, suggested_tools, approach, confidence) = if contains_any(
        &g,
        &["find", "search", "locate", "where", "which"],
    ) {
        (
            Intent::Search,
            vec![
                "get_project_overview",
                "explore_codebase",
                "find_code_patterns",
                "navigate_to_symbol",
            ],
            "pattern_matching",
            0.8,
        )
    } else if contains_any(&g, &["analyze", "understand", "explain", "what", "how"]) {
        (
            Intent::Analysis,
            vec![
                "get_project_overview",
                "analyze_file",
                "get_code_flow",
                "get_file_dependencies",
            ],
            "deep_dive",
            0.8,
        )
    } else if contains_any(&g, &["create", "write", "add", "implement", "build"]) {
        (
            Intent::Creation,
            vec![
                "get_project_overview",
                "analyze_file",
                "write_file",
                "execute_with_context",
            ],
            "iterative_build",
            0.7,
        )
    } else if contains_any(&g, &["fix", "debug", "error", "problem", "issue"]) {
        (
            Intent::Debugging,
            vec![
                "get_project_overview",
                "find_code_patterns",
                "analyze_file",
                "execute_with_context",
            ],
            "systematic_investigation",
            0.8,
        )
    } else if contains_any(&g, &["improve", "optimize", "refactor", "better"]) {
        (
            Intent::Improvement,
            vec![
                "get_project_overview",
                "analyze_file",
                "suggest_improvements",
                "get_project_health",
            ],
            "assessment_first",
            0.7,
        )
    } else {
        (Intent::Unknown, vec![], "exploratory", 0.5)
    };

    let complexity = if contains_any(
        &g,
        &["all", "entire", "everything", "complete", "comprehensive"],
    ) {
        Complexity::High
    } else if contains_any(&g, &["simple", "quick", "just", "only"]) {
        Complexity::Low
    } else {
        Complexity::Medium
    };

    IntentAnalysis {
        intent,
        complexity,
        suggested_tools,
        approach,
        confidence,
    }
}

/// 停用词：提取关键词时剔除
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "this", "that", "these", "those", "i", "you", "he", "she", "it",
    "we", "they",
];

/// 提取标识符形态的关键词：去停用词、长度 > 2、按首次出现去重
pub fn extract_key_terms(text: &str) -> Vec<String> {
    let word_re = regex::Regex::new(r"\b[a-zA-Z_][a-zA-Z0-9_]*\b").unwrap();
    let mut seen = std::collections::HashSet::new();
    let mut terms = Vec::new();
    for m in word_re.find_iter(&text.to_lowercase()) {
        let w = m.as_str();
        if w.len() > 2 && !STOP_WORDS.contains(&w) && seen.insert(w.to_string()) {
            terms.push(w.to_string());
        }
    }
    terms
}

/// 生成建议计划：首步依目标形态选定，再按意图追加 2-3 个模板步骤
pub fn generate_plan(goal: &str) -> Vec<PlanStep> {
    let intent = analyze_intent(goal);
    let key_terms = extract_key_terms(goal);
    let g = goal.to_lowercase();

    let mut plan = Vec::new();

    // 读文件类目标跳过全量概览，直接探索 + 批量读取
    if g.contains("read") && g.contains("file") {
        plan.push(
            PlanStep::new(
                "explore_codebase",
                "Find all source files to read and analyze",
                Priority::High,
            )
            .with_args(json!({"pattern": "**/*.py", "max_files": 50})),
        );
        plan.push(PlanStep::new(
            "read_multiple_files",
            "Read all relevant files to understand the project",
            Priority::High,
        ));
        if g.contains("write") && g.contains("readme") {
            plan.push(PlanStep::new(
                "write_file",
                "Write comprehensive description to README.md",
                Priority::High,
            ));
        }
    } else {
        plan.push(PlanStep::new(
            "get_project_overview",
            "Understand project structure and context",
            Priority::High,
        ));
    }

    match intent.intent {
        Intent::Search => {
            if !key_terms.is_empty() {
                plan.push(
                    PlanStep::new(
                        "find_code_patterns",
                        format!("Search for patterns related to: {}", key_terms.join(", ")),
                        Priority::High,
                    )
                    .with_args(json!({"pattern": key_terms.join("|")})),
                );
            }
            plan.push(PlanStep::new(
                "explore_codebase",
                "Explore codebase structure to find relevant files",
                Priority::Medium,
            ));
        }
        Intent::Analysis => {
            plan.push(
                PlanStep::new("explore_codebase", "Find source files to analyze", Priority::High)
                    .with_args(json!({"max_files": 10})),
            );
            plan.push(PlanStep::new(
                "analyze_file",
                "Analyze key files for structure and functionality",
                Priority::High,
            ));
        }
        Intent::Creation => {
            plan.push(PlanStep::new(
                "get_project_health",
                "Assess project health before making changes",
                Priority::Medium,
            ));
            plan.push(PlanStep::new(
                "explore_codebase",
                "Understand existing code structure",
                Priority::High,
            ));
        }
        Intent::Debugging => {
            plan.push(
                PlanStep::new(
                    "find_code_patterns",
                    "Look for error-related code patterns",
                    Priority::High,
                )
                .with_args(json!({"pattern": "error|exception|panic|unwrap"})),
            );
            plan.push(PlanStep::new(
                "get_project_health",
                "Check overall project health for issues",
                Priority::Medium,
            ));
        }
        Intent::Improvement => {
            plan.push(PlanStep::new(
                "get_project_health",
                "Get comprehensive health assessment",
                Priority::High,
            ));
            plan.push(PlanStep::new(
                "suggest_improvements",
                "Get specific improvement suggestions",
                Priority::High,
            ));
        }
        Intent::Unknown => {}
    }

    plan
}

/// 依当前状态给出情境建议（RECOVER 分支与日志使用）
pub fn contextual_suggestions(state: &str) -> Vec<String> {
    let s = state.to_lowercase();
    if s.contains("file not found") {
        vec![
            "Try using explore_codebase to find similar files".to_string(),
            "Check the project structure with get_project_overview".to_string(),
            "Use find_code_patterns to search for related content".to_string(),
        ]
    } else if s.contains("error") {
        vec![
            "Analyze the error context with analyze_file".to_string(),
            "Search for similar error patterns with find_code_patterns".to_string(),
            "Check project health with get_project_health".to_string(),
        ]
    } else if s.contains("import") {
        vec![
            "Use get_file_dependencies to understand import relationships".to_string(),
            "Navigate to the imported symbol with navigate_to_symbol".to_string(),
            "Check if the module exists in the project".to_string(),
        ]
    } else if s.contains("function") || s.contains("class") {
        vec![
            "Use navigate_to_symbol to find the specific function/class".to_string(),
            "Analyze the file containing the symbol".to_string(),
            "Check dependencies and usage patterns".to_string(),
        ]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_intent_suggests_pattern_and_symbol_tools() {
        let analysis = analyze_intent("find the function named parse_config");
        assert_eq!(analysis.intent, Intent::Search);
        assert!(analysis.suggested_tools.contains(&"find_code_patterns"));
        assert!(analysis.suggested_tools.contains(&"navigate_to_symbol"));
        assert!((analysis.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_intent_first_match_wins() {
        // "find" 命中 search，即使后面还有 "fix"
        let analysis = analyze_intent("find and fix the bug");
        assert_eq!(analysis.intent, Intent::Search);
    }

    #[test]
    fn test_unknown_intent_is_exploratory() {
        let analysis = analyze_intent("hello there");
        assert_eq!(analysis.intent, Intent::Unknown);
        assert_eq!(analysis.approach, "exploratory");
        assert!((analysis.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_complexity_keywords() {
        assert_eq!(
            analyze_intent("analyze the entire codebase").complexity,
            Complexity::High
        );
        assert_eq!(
            analyze_intent("just a quick look").complexity,
            Complexity::Low
        );
        assert_eq!(analyze_intent("analyze main.py").complexity, Complexity::Medium);
    }

    #[test]
    fn test_read_file_goal_overrides_first_step() {
        let plan = generate_plan("read all files and write a readme");
        assert_eq!(plan[0].tool, "explore_codebase");
        assert_eq!(plan[1].tool, "read_multiple_files");
        assert!(plan.iter().any(|s| s.tool == "write_file"));
        // 不以全量概览开头
        assert_ne!(plan[0].tool, "get_project_overview");
    }

    #[test]
    fn test_generic_goal_starts_with_overview() {
        let plan = generate_plan("improve the error handling");
        assert_eq!(plan[0].tool, "get_project_overview");
        assert!(plan.iter().any(|s| s.tool == "suggest_improvements"));
    }

    #[test]
    fn test_extract_key_terms_filters_and_dedups() {
        let terms = extract_key_terms("find the parse_config function and the parser");
        assert!(terms.contains(&"parse_config".to_string()));
        assert!(terms.contains(&"parser".to_string()));
        assert!(!terms.contains(&"the".to_string()));
        // 首次出现顺序
        assert_eq!(terms[0], "find");
    }

    #[test]
    fn test_contextual_suggestions_for_missing_file() {
        let suggestions = contextual_suggestions("Error: File 'x.py' not found");
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("explore_codebase"));
    }

    #[test]
    fn test_plan_is_pure() {
        let a = generate_plan("find the config loader");
        let b = generate_plan("find the config loader");
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.tool, y.tool);
            assert_eq!(x.reason, y.reason);
        }
    }
}
