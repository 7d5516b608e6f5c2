//! 探索类工具：get_project_overview / explore_codebase / read_and_summarize_project
//!
//! 输出中的文案（"Found N files matching ..."、"# Project Analysis Summary"）是
//! 续行策略的匹配对象，属于对外契约。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::project::analysis::Language;
use crate::project::ProjectContext;
use crate::tools::{Tool, ToolParam};

/// 项目概览
pub struct GetProjectOverviewTool {
    ctx: Arc<ProjectContext>,
}

impl GetProjectOverviewTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetProjectOverviewTool {
    fn name(&self) -> &str {
        "get_project_overview"
    }

    fn description(&self) -> &str {
        "Get a comprehensive overview of the current project structure: file counts, \
         language distribution, entry points and git info."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        &[]
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(self.ctx.overview())
    }
}

/// 按 glob 模式探索代码库
pub struct ExploreCodebaseTool {
    ctx: Arc<ProjectContext>,
    default_max_files: usize,
}

impl ExploreCodebaseTool {
    pub fn new(ctx: Arc<ProjectContext>, default_max_files: usize) -> Self {
        Self {
            ctx,
            default_max_files,
        }
    }
}

const EXPLORE_PARAMS: &[ToolParam] = &[
    ToolParam::optional("pattern", Some("*")),
    ToolParam::optional("file_type", None),
    ToolParam::optional("max_files", Some("20")),
];

#[async_trait]
impl Tool for ExploreCodebaseTool {
    fn name(&self) -> &str {
        "explore_codebase"
    }

    fn description(&self) -> &str {
        "Explore the codebase with glob filtering. Args: {\"pattern\": \"**/*.py\", \
         \"file_type\": \"py\", \"max_files\": 20} (all optional)."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        EXPLORE_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let mut pattern = args
            .get("pattern")
            .and_then(|v| v.as_str())
            .unwrap_or("*")
            .to_string();
        let file_type = args.get("file_type").and_then(|v| v.as_str());
        let max_files = args
            .get("max_files")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(self.default_max_files);
        tracing::info!(pattern = %pattern, file_type = ?file_type, "explore_codebase");

        // 裸 "*" 搭配扩展名过滤时收窄为递归模式
        if pattern == "*" {
            if let Some(t) = file_type {
                pattern = format!("**/*.{}", t);
            }
        }

        let mut files = self.ctx.find_files_by_pattern(&pattern, file_type);
        if files.is_empty() {
            return Ok(format!(
                "No files found matching pattern '{}' with type '{}'",
                pattern,
                file_type.unwrap_or("any")
            ));
        }
        files.truncate(max_files);

        let mut by_dir: std::collections::BTreeMap<String, Vec<String>> =
            std::collections::BTreeMap::new();
        for f in &files {
            let (dir, name) = match f.rsplit_once('/') {
                Some((d, n)) => (d.to_string(), n.to_string()),
                None => (".".to_string(), f.clone()),
            };
            by_dir.entry(dir).or_default().push(name);
        }

        let mut result = format!("Found {} files matching '{}':\n\n", files.len(), pattern);
        for (dir, mut names) in by_dir {
            names.sort();
            result.push_str(&format!("📁 {}/\n", dir));
            for name in names {
                result.push_str(&format!("  📄 {}\n", name));
            }
            result.push('\n');
        }
        Ok(result.trim_end().to_string())
    }
}

/// 通读项目源文件并产出综合分析文档
pub struct ReadAndSummarizeProjectTool {
    ctx: Arc<ProjectContext>,
}

impl ReadAndSummarizeProjectTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

/// 摘要中最多内嵌的文件数
const SUMMARY_FILE_LIMIT: usize = 10;
/// 单文件内容截断长度
const SUMMARY_CONTENT_CHARS: usize = 1000;

#[async_trait]
impl Tool for ReadAndSummarizeProjectTool {
    fn name(&self) -> &str {
        "read_and_summarize_project"
    }

    fn description(&self) -> &str {
        "Read all project source files and produce a comprehensive analysis document \
         with per-file structure and content."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        &[]
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        let source_files: Vec<String> = self
            .ctx
            .files()
            .iter()
            .filter(|f| !matches!(self.ctx.language_of(f), Language::Unknown))
            .cloned()
            .collect();

        let mut summary = String::from("# Project Analysis Summary\n\n");
        summary.push_str(&format!("## Project Overview\n{}\n\n", self.ctx.overview()));
        summary.push_str("## File Analysis\n\n");

        for file in source_files.iter().take(SUMMARY_FILE_LIMIT) {
            summary.push_str(&format!("### {}\n\n", file));
            match self.ctx.analyze_source_file(file) {
                Ok(a) => {
                    summary.push_str(&format!(
                        "**Structure:** {} lines, {} functions, {} types\n\n",
                        a.lines,
                        a.functions.len(),
                        a.types.len()
                    ));
                    if !a.types.is_empty() {
                        summary.push_str("**Types:**\n");
                        for t in &a.types {
                            summary.push_str(&format!("- `{}` (line {})\n", t.name, t.line));
                        }
                        summary.push('\n');
                    }
                    if !a.functions.is_empty() {
                        summary.push_str("**Functions:**\n");
                        for f in &a.functions {
                            summary.push_str(&format!(
                                "- `{}({})` (line {})\n",
                                f.name,
                                f.args.join(", "),
                                f.line
                            ));
                        }
                        summary.push('\n');
                    }
                }
                Err(e) => summary.push_str(&format!("**Error analyzing {}:** {}\n\n", file, e)),
            }

            match std::fs::read_to_string(self.ctx.root().join(file)) {
                Ok(content) => {
                    if content.chars().count() > SUMMARY_CONTENT_CHARS {
                        let truncated: String =
                            content.chars().take(SUMMARY_CONTENT_CHARS).collect();
                        summary.push_str(&format!(
                            "**Content (first {} chars):**\n```\n{}...\n```\n\n",
                            SUMMARY_CONTENT_CHARS, truncated
                        ));
                    } else {
                        summary.push_str(&format!("**Content:**\n```\n{}\n```\n\n", content));
                    }
                }
                Err(e) => summary.push_str(&format!("**Error reading {}:** {}\n\n", file, e)),
            }
        }

        if source_files.len() > SUMMARY_FILE_LIMIT {
            summary.push_str(&format!(
                "\n*... and {} more files*\n",
                source_files.len() - SUMMARY_FILE_LIMIT
            ));
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ctx() -> (tempfile::TempDir, Arc<ProjectContext>) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.py"), "def one():\n    pass\n").expect("write");
        fs::write(dir.path().join("b.py"), "def two():\n    pass\n").expect("write");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_explore_reports_found_files() {
        let (_dir, ctx) = ctx();
        let tool = ExploreCodebaseTool::new(ctx, 20);
        let obs = tool
            .execute(serde_json::json!({"pattern": "**/*.py"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Found 2 files matching '**/*.py':"));
        assert!(obs.contains("📄 a.py"));
    }

    #[tokio::test]
    async fn test_explore_no_match_observation() {
        let (_dir, ctx) = ctx();
        let tool = ExploreCodebaseTool::new(ctx, 20);
        let obs = tool
            .execute(serde_json::json!({"pattern": "**/*.go"}))
            .await
            .expect("observation");
        assert_eq!(
            obs,
            "No files found matching pattern '**/*.go' with type 'any'"
        );
    }

    #[tokio::test]
    async fn test_summarize_emits_analysis_document() {
        let (_dir, ctx) = ctx();
        let tool = ReadAndSummarizeProjectTool::new(ctx);
        let obs = tool.execute(serde_json::json!({})).await.expect("observation");
        assert!(obs.starts_with("# Project Analysis Summary"));
        assert!(obs.contains("## File Analysis"));
        assert!(obs.contains("### a.py"));
    }
}
