//! 代码质量工具族：find_code_smells / suggest_refactoring / generate_test_suggestions /
//! find_security_issues / get_code_metrics / generate_documentation_suggestions
//!
//! 逐行正则启发式，不做语义分析；输出按严重度/优先级标注图标。

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::project::analysis::Language;
use crate::project::ProjectContext;
use crate::tools::{Tool, ToolParam};

const FILE_PATH_PARAMS: &[ToolParam] = &[ToolParam::required("file_path")];

fn severity_icon(severity: &str) -> &'static str {
    match severity {
        "error" | "high" => "🔴",
        "warning" | "medium" => "🟡",
        "info" => "🔵",
        "low" => "🟢",
        _ => "⚪",
    }
}

fn read_source(ctx: &ProjectContext, file_path: &str) -> Result<String, String> {
    std::fs::read_to_string(ctx.root().join(file_path)).map_err(|e| e.to_string())
}

/// 行是否为注释（按语言的行注释前缀）
fn is_comment(line: &str, lang: Language) -> bool {
    let t = line.trim_start();
    match lang {
        Language::Python => t.starts_with('#'),
        Language::Rust | Language::JavaScript | Language::TypeScript => t.starts_with("//"),
        Language::Unknown => t.starts_with('#') || t.starts_with("//"),
    }
}

/// 行是否带文档标记（文档建议工具使用）
fn is_doc_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("///")
        || t.starts_with("//!")
        || t.starts_with("\"\"\"")
        || t.starts_with('#')
        || t.starts_with("/**")
}

/// 代码坏味道检测
pub struct FindCodeSmellsTool {
    ctx: Arc<ProjectContext>,
}

impl FindCodeSmellsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for FindCodeSmellsTool {
    fn name(&self) -> &str {
        "find_code_smells"
    }

    fn description(&self) -> &str {
        "Find potential code smells in a file: long functions, deep nesting, TODO \
         markers, long lines, duplicate names."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "find_code_smells");

        let content = match read_source(&self.ctx, file_path) {
            Ok(c) => c,
            Err(_) => return Ok(format!("No code smells found in {}", file_path)),
        };
        let lines: Vec<&str> = content.lines().collect();

        // (line, message, severity)
        let mut smells: Vec<(usize, String, &str)> = Vec::new();

        // 长函数：相邻函数声明间距超过 50 行
        if let Ok(a) = self.ctx.analyze_source_file(file_path) {
            let mut decls: Vec<(usize, String)> = a
                .functions
                .iter()
                .map(|f| (f.line, f.name.clone()))
                .collect();
            decls.sort();
            for pair in decls.windows(2) {
                let span = pair[1].0 - pair[0].0;
                if span > 50 {
                    smells.push((
                        pair[0].0,
                        format!("Function '{}' is {} lines long", pair[0].1, span),
                        "warning",
                    ));
                }
            }
            // 同名函数
            let mut seen = std::collections::HashMap::new();
            for (line, name) in &decls {
                if seen.contains_key(name) {
                    smells.push((
                        *line,
                        format!("Function '{}' appears to be duplicated", name),
                        "error",
                    ));
                }
                seen.insert(name.clone(), *line);
            }
        }

        let todo_re = Regex::new(r"(?i)(TODO|FIXME|HACK|XXX)").unwrap();
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let indent = line.len() - line.trim_start().len();
            if indent > 20 && !line.trim().is_empty() {
                smells.push((
                    line_no,
                    format!("Deep nesting detected (level {})", indent / 4),
                    "warning",
                ));
            }
            if todo_re.is_match(line) {
                smells.push((
                    line_no,
                    format!("TODO/FIXME comment: {}", line.trim()),
                    "info",
                ));
            }
            if line.len() > 120 {
                smells.push((line_no, format!("Line is {} characters long", line.len()), "warning"));
            }
        }

        if smells.is_empty() {
            return Ok(format!("No code smells found in {}", file_path));
        }
        smells.sort_by_key(|(line, _, _)| *line);

        let mut result = format!("Code smells found in {}:\n\n", file_path);
        for (line, msg, severity) in smells {
            result.push_str(&format!("{} Line {}: {}\n\n", severity_icon(severity), line, msg));
        }
        Ok(result.trim_end().to_string())
    }
}

/// 重构建议
pub struct SuggestRefactoringTool {
    ctx: Arc<ProjectContext>,
}

impl SuggestRefactoringTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SuggestRefactoringTool {
    fn name(&self) -> &str {
        "suggest_refactoring"
    }

    fn description(&self) -> &str {
        "Suggest refactoring opportunities for a file (oversized types, long parameter \
         lists, import sprawl)."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "suggest_refactoring");

        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(_) => return Ok(format!("No refactoring suggestions for {}", file_path)),
        };

        // (message, priority)
        let mut suggestions: Vec<(String, &str)> = Vec::new();
        for t in &a.types {
            if t.methods.len() > 10 {
                suggestions.push((
                    format!(
                        "Type '{}' has {} methods, consider splitting",
                        t.name,
                        t.methods.len()
                    ),
                    "high",
                ));
            }
        }
        for f in &a.functions {
            if f.args.len() > 5 {
                suggestions.push((
                    format!(
                        "Function '{}' takes {} parameters, consider a parameter struct",
                        f.name,
                        f.args.len()
                    ),
                    "medium",
                ));
            }
        }
        if a.imports.len() > 15 {
            suggestions.push((
                format!(
                    "File has {} imports, consider organizing them",
                    a.imports.len()
                ),
                "low",
            ));
        }

        if suggestions.is_empty() {
            return Ok(format!("No refactoring suggestions for {}", file_path));
        }
        let mut result = format!("Refactoring suggestions for {}:\n\n", file_path);
        for (msg, priority) in suggestions {
            result.push_str(&format!("{} {}\n\n", severity_icon(priority), msg));
        }
        Ok(result.trim_end().to_string())
    }
}

/// 测试建议
pub struct GenerateTestSuggestionsTool {
    ctx: Arc<ProjectContext>,
}

impl GenerateTestSuggestionsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GenerateTestSuggestionsTool {
    fn name(&self) -> &str {
        "generate_test_suggestions"
    }

    fn description(&self) -> &str {
        "Suggest unit tests for untested public functions and types in a file."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "generate_test_suggestions");

        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(_) => return Ok(format!("No test suggestions for {}", file_path)),
        };
        let lang = self.ctx.language_of(file_path);

        let mut result = format!("Test suggestions for {}:\n\n", file_path);
        let mut any = false;
        for f in &a.functions {
            if f.name.starts_with('_') || f.name.starts_with("test") {
                continue;
            }
            any = true;
            let snippet = match lang {
                Language::Rust => format!("#[test]\nfn test_{}() {{\n    // exercise {}\n}}", f.name, f.name),
                _ => format!("def test_{}():\n    # exercise {}\n    pass", f.name, f.name),
            };
            result.push_str(&format!(
                "🔴 Create unit test for function '{}'\n   💡 Example:\n{}\n\n",
                f.name, snippet
            ));
        }
        for t in &a.types {
            if t.name.starts_with('_') {
                continue;
            }
            any = true;
            result.push_str(&format!(
                "🟡 Create integration test for type '{}'\n\n",
                t.name
            ));
        }

        if !any {
            return Ok(format!("No test suggestions for {}", file_path));
        }
        Ok(result.trim_end().to_string())
    }
}

/// 安全问题扫描
pub struct FindSecurityIssuesTool {
    ctx: Arc<ProjectContext>,
}

impl FindSecurityIssuesTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for FindSecurityIssuesTool {
    fn name(&self) -> &str {
        "find_security_issues"
    }

    fn description(&self) -> &str {
        "Scan a file for potential security issues: hardcoded secrets, SQL string \
         building, eval usage."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "find_security_issues");

        let content = match read_source(&self.ctx, file_path) {
            Ok(c) => c,
            Err(_) => return Ok(format!("No security issues found in {}", file_path)),
        };

        let secret_re =
            Regex::new(r#"(?i)(password|api_key|secret|token)\s*=\s*["'][^"']+["']"#).unwrap();
        let sql_re = Regex::new(r#"(?i)(execute\s*\(\s*["'].*%s|query\s*=\s*["'].*\+|execute\s*\(\s*f["'])"#)
            .unwrap();
        let eval_re = Regex::new(r"\beval\s*\(").unwrap();

        // (line, message, suggestion)
        let mut issues: Vec<(usize, &str, &str)> = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if secret_re.is_match(line) {
                issues.push((
                    line_no,
                    "Potential hardcoded secret detected",
                    "Use environment variables or secure configuration",
                ));
            }
            if sql_re.is_match(line) {
                issues.push((
                    line_no,
                    "Potential SQL injection vulnerability",
                    "Use parameterized queries",
                ));
            }
            if eval_re.is_match(line) {
                issues.push((
                    line_no,
                    "eval() usage detected - potential security risk",
                    "Avoid eval() - use safer alternatives",
                ));
            }
        }

        if issues.is_empty() {
            return Ok(format!("No security issues found in {}", file_path));
        }
        let mut result = format!("Security issues found in {}:\n\n", file_path);
        for (line, msg, suggestion) in issues {
            result.push_str(&format!(
                "🔴 Line {}: {}\n   💡 Suggestion: {}\n\n",
                line, msg, suggestion
            ));
        }
        Ok(result.trim_end().to_string())
    }
}

/// 代码度量
pub struct GetCodeMetricsTool {
    ctx: Arc<ProjectContext>,
}

impl GetCodeMetricsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetCodeMetricsTool {
    fn name(&self) -> &str {
        "get_code_metrics"
    }

    fn description(&self) -> &str {
        "Get code metrics for a file: line counts, function/type/import counts and a \
         complexity label."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "get_code_metrics");

        let content = match read_source(&self.ctx, file_path) {
            Ok(c) => c,
            Err(_) => return Ok(format!("Could not analyze metrics for {}", file_path)),
        };
        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(_) => return Ok(format!("Could not analyze metrics for {}", file_path)),
        };
        let lang = self.ctx.language_of(file_path);

        let total = content.lines().count();
        let comment_lines = content.lines().filter(|l| is_comment(l, lang)).count();
        let loc = content
            .lines()
            .filter(|l| !l.trim().is_empty() && !is_comment(l, lang))
            .count();

        let complexity = if a.functions.len() > 10 || loc > 200 {
            "HIGH"
        } else if a.functions.len() > 5 || loc > 100 {
            "MEDIUM"
        } else {
            "LOW"
        };

        Ok(format!(
            "Code metrics for {}:\n\n\
             📊 Lines of Code: {}\n\
             📄 Total Lines: {}\n\
             📝 Comment Lines: {}\n\
             🔧 Functions: {}\n\
             📦 Classes: {}\n\
             📥 Imports: {}\n\
             🧠 Complexity: {}\n",
            file_path,
            loc,
            total,
            comment_lines,
            a.functions.len(),
            a.types.len(),
            a.imports.len(),
            complexity
        ))
    }
}

/// 文档建议
pub struct GenerateDocSuggestionsTool {
    ctx: Arc<ProjectContext>,
}

impl GenerateDocSuggestionsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GenerateDocSuggestionsTool {
    fn name(&self) -> &str {
        "generate_documentation_suggestions"
    }

    fn description(&self) -> &str {
        "Suggest missing documentation: module header, undocumented functions and types."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_PATH_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "generate_documentation_suggestions");

        let content = match read_source(&self.ctx, file_path) {
            Ok(c) => c,
            Err(_) => return Ok(format!("No documentation suggestions for {}", file_path)),
        };
        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(_) => return Ok(format!("No documentation suggestions for {}", file_path)),
        };
        let lines: Vec<&str> = content.lines().collect();

        // (message, priority)
        let mut suggestions: Vec<(String, &str)> = Vec::new();
        if !lines.iter().take(5).any(|l| is_doc_line(l)) {
            suggestions.push((
                "Add a module-level doc comment at the top of the file".to_string(),
                "medium",
            ));
        }
        for f in &a.functions {
            if f.name.starts_with('_') {
                continue;
            }
            let documented = f.line >= 2 && is_doc_line(lines.get(f.line - 2).unwrap_or(&""));
            if !documented {
                suggestions.push((
                    format!("Add doc comment to function '{}'", f.name),
                    "high",
                ));
            }
        }
        for t in &a.types {
            let documented = t.line >= 2 && is_doc_line(lines.get(t.line - 2).unwrap_or(&""));
            if !documented {
                suggestions.push((format!("Add doc comment to type '{}'", t.name), "high"));
            }
        }

        if suggestions.is_empty() {
            return Ok(format!("No documentation suggestions for {}", file_path));
        }
        let mut result = format!("Documentation suggestions for {}:\n\n", file_path);
        for (msg, priority) in suggestions {
            result.push_str(&format!("{} {}\n\n", severity_icon(priority), msg));
        }
        Ok(result.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ctx_with(content: &str) -> (tempfile::TempDir, Arc<ProjectContext>) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("code.py"), content).expect("write");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_smells_flags_todo_and_long_line() {
        let long_line = format!("x = \"{}\"", "a".repeat(130));
        let src = format!("# TODO: fix this later\n{}\n", long_line);
        let (_dir, ctx) = ctx_with(&src);
        let tool = FindCodeSmellsTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "code.py"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Code smells found in code.py:"));
        assert!(obs.contains("TODO/FIXME comment"));
        assert!(obs.contains("characters long"));
    }

    #[tokio::test]
    async fn test_security_flags_hardcoded_secret() {
        let (_dir, ctx) = ctx_with("password = \"hunter2\"\n");
        let tool = FindSecurityIssuesTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "code.py"}))
            .await
            .expect("observation");
        assert!(obs.contains("Potential hardcoded secret detected"));
    }

    #[tokio::test]
    async fn test_metrics_counts_and_complexity() {
        let (_dir, ctx) = ctx_with("# comment\ndef a():\n    pass\n\ndef b():\n    pass\n");
        let tool = GetCodeMetricsTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "code.py"}))
            .await
            .expect("observation");
        assert!(obs.contains("📝 Comment Lines: 1"));
        assert!(obs.contains("🔧 Functions: 2"));
        assert!(obs.contains("🧠 Complexity: LOW"));
    }

    #[tokio::test]
    async fn test_doc_suggestions_for_bare_function() {
        let (_dir, ctx) = ctx_with("def bare():\n    pass\n");
        let tool = GenerateDocSuggestionsTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "code.py"}))
            .await
            .expect("observation");
        assert!(obs.contains("Add doc comment to function 'bare'"));
    }
}
