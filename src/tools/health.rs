//! 体检类工具：suggest_improvements / get_project_health

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::project::analysis::Language;
use crate::project::ProjectContext;
use crate::tools::{Tool, ToolParam};

/// 单文件改进建议
pub struct SuggestImprovementsTool {
    ctx: Arc<ProjectContext>,
}

impl SuggestImprovementsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const SUGGEST_PARAMS: &[ToolParam] = &[ToolParam::required("file_path")];

#[async_trait]
impl Tool for SuggestImprovementsTool {
    fn name(&self) -> &str {
        "suggest_improvements"
    }

    fn description(&self) -> &str {
        "Suggest structural improvements for a file based on its analysis."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        SUGGEST_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "suggest_improvements");

        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(e) => return Ok(format!("Error analyzing {}: {}", file_path, e)),
        };

        let mut suggestions = Vec::new();
        if a.lines > 200 {
            suggestions
                .push("Consider breaking this file into smaller modules (over 200 lines)".to_string());
        }
        if a.imports.len() > 20 {
            suggestions.push(
                "Consider organizing imports or splitting into smaller modules".to_string(),
            );
        }
        if a.functions.len() > 10 {
            suggestions.push(format!(
                "File has {} top-level functions, consider grouping related ones",
                a.functions.len()
            ));
        }
        for t in &a.types {
            if t.methods.len() > 10 {
                suggestions.push(format!(
                    "Type '{}' has {} methods, consider splitting responsibilities",
                    t.name,
                    t.methods.len()
                ));
            }
        }

        if suggestions.is_empty() {
            return Ok(format!(
                "No specific improvements suggested for {}. The code looks well-structured!",
                file_path
            ));
        }

        let mut result = format!("Improvement suggestions for {}:\n\n", file_path);
        for (i, s) in suggestions.iter().enumerate() {
            result.push_str(&format!("{}. {}\n", i + 1, s));
        }
        Ok(result)
    }
}

/// 项目整体健康报告
pub struct GetProjectHealthTool {
    ctx: Arc<ProjectContext>,
}

impl GetProjectHealthTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetProjectHealthTool {
    fn name(&self) -> &str {
        "get_project_health"
    }

    fn description(&self) -> &str {
        "Get an overall health assessment of the project: statistics, language \
         distribution, entry points, git status."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        &[]
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let total = self.ctx.files().len();
        let source = self
            .ctx
            .files()
            .iter()
            .filter(|f| !matches!(self.ctx.language_of(f), Language::Unknown))
            .count();

        let mut report = String::from("Project Health Report\n===================\n\n");
        report.push_str(&format!(
            "📊 File Statistics:\n  Total files: {}\n  Source files: {}\n  Other files: {}\n\n",
            total,
            source,
            total - source
        ));

        report.push_str("📈 Language Distribution:\n");
        let mut stats: Vec<(&String, &usize)> = self.ctx.language_stats().iter().collect();
        stats.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (ext, count) in stats {
            report.push_str(&format!("  {}: {} files\n", ext, count));
        }
        report.push('\n');

        report.push_str("🚪 Entry Points:\n");
        for ep in self.ctx.entry_points() {
            report.push_str(&format!("  📄 {}\n", ep));
        }
        report.push('\n');

        let git = self.ctx.git();
        if git.is_repo {
            report.push_str(&format!(
                "🌿 Git Repository:\n  Branch: {}\n  Root: {}\n",
                git.branch, git.root
            ));
        } else {
            report.push_str("⚠️  Not a Git repository\n");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_health_report_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("main.py"), "def run():\n    pass\n").expect("write");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        let tool = GetProjectHealthTool::new(ctx);
        let obs = tool.execute(serde_json::json!({})).await.expect("observation");
        assert!(obs.starts_with("Project Health Report"));
        assert!(obs.contains("Total files: 1"));
        assert!(obs.contains(".py: 1 files"));
    }

    #[tokio::test]
    async fn test_clean_file_gets_no_suggestions() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("tidy.py"), "def run():\n    pass\n").expect("write");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        let tool = SuggestImprovementsTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "tidy.py"}))
            .await
            .expect("observation");
        assert!(obs.contains("The code looks well-structured!"));
    }
}
