//! 分析/导航类工具：analyze_file / find_code_patterns / get_file_dependencies /
//! navigate_to_symbol / get_code_flow
//!
//! 全部只读，基于 ProjectContext 的结构缓存与逐行正则分析。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::project::ProjectContext;
use crate::tools::{Tool, ToolParam};

/// 默认参与内容搜索的扩展名
const DEFAULT_SEARCH_EXTS: &[&str] = &[".py", ".rs", ".js", ".ts", ".md"];
/// 源码扩展名（符号搜索范围）
const SOURCE_EXTS: &[&str] = &[".py", ".rs", ".js", ".jsx", ".ts", ".tsx"];

/// 单文件结构分析
pub struct AnalyzeFileTool {
    ctx: Arc<ProjectContext>,
}

impl AnalyzeFileTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const ANALYZE_FILE_PARAMS: &[ToolParam] = &[
    ToolParam::required("file_path"),
    ToolParam::optional("include_content", Some("false")),
];

#[async_trait]
impl Tool for AnalyzeFileTool {
    fn name(&self) -> &str {
        "analyze_file"
    }

    fn description(&self) -> &str {
        "Analyze a file's structure: functions, types, imports, with line numbers."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        ANALYZE_FILE_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        let include_content = args
            .get("include_content")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        tracing::info!(file = %file_path, "analyze_file");

        let a = match self.ctx.analyze_source_file(file_path) {
            Ok(a) => a,
            Err(e) => return Ok(format!("Error analyzing {}: {}", file_path, e)),
        };

        let mut result = format!(
            "Analysis of {}:\nLines: {}\nClasses: {}\nFunctions: {}\nImports: {}\n\n",
            file_path,
            a.lines,
            a.types.len(),
            a.functions.len(),
            a.imports.len()
        );

        if !a.types.is_empty() {
            result.push_str("Classes:\n");
            for t in &a.types {
                result.push_str(&format!("  📦 {} (line {})\n", t.name, t.line));
                if !t.methods.is_empty() {
                    result.push_str(&format!("      Methods: {}\n", t.methods.join(", ")));
                }
            }
            result.push('\n');
        }

        if !a.functions.is_empty() {
            result.push_str("Functions:\n");
            for f in &a.functions {
                result.push_str(&format!(
                    "  🔧 {}({}) (line {})\n",
                    f.name,
                    f.args.join(", "),
                    f.line
                ));
            }
            result.push('\n');
        }

        if !a.imports.is_empty() {
            result.push_str("Imports:\n");
            for imp in a.imports.iter().take(10) {
                result.push_str(&format!("  📥 {}\n", imp));
            }
            if a.imports.len() > 10 {
                result.push_str(&format!("  ... and {} more\n", a.imports.len() - 10));
            }
        }

        if include_content {
            match std::fs::read_to_string(self.ctx.root().join(file_path)) {
                Ok(content) => result.push_str(&format!("\nFile Content:\n{}", content)),
                Err(e) => result.push_str(&format!("\nError reading content: {}", e)),
            }
        }

        Ok(result)
    }
}

/// 跨文件内容模式搜索
pub struct FindCodePatternsTool {
    ctx: Arc<ProjectContext>,
}

impl FindCodePatternsTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const FIND_PATTERNS_PARAMS: &[ToolParam] = &[
    ToolParam::required("pattern"),
    ToolParam::optional("file_types", None),
    ToolParam::optional("context_lines", Some("2")),
];

#[async_trait]
impl Tool for FindCodePatternsTool {
    fn name(&self) -> &str {
        "find_code_patterns"
    }

    fn description(&self) -> &str {
        "Find code patterns across the codebase (regex, case-insensitive). Args: \
         {\"pattern\": \"fn main\", \"file_types\": [\".rs\"], \"context_lines\": 2}."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FIND_PATTERNS_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let pattern = args.get("pattern").and_then(|v| v.as_str()).unwrap_or("");
        let context_lines = args
            .get("context_lines")
            .and_then(|v| v.as_u64())
            .unwrap_or(2) as usize;
        let file_types: Vec<String> = args
            .get("file_types")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_SEARCH_EXTS.iter().map(|s| s.to_string()).collect());
        tracing::info!(pattern = %pattern, "find_code_patterns");

        let matches = self.ctx.find_files_by_content(pattern, &file_types);
        if matches.is_empty() {
            return Ok(format!("No matches found for pattern '{}'", pattern));
        }

        let mut result = format!("Found {} matches for '{}':\n\n", matches.len(), pattern);
        let mut current_file: Option<&str> = None;
        for (file, line, _content) in &matches {
            if current_file != Some(file.as_str()) {
                current_file = Some(file.as_str());
                result.push_str(&format!("📄 {}:\n", file));
            }
            let context = self.ctx.context_around_line(file, *line, context_lines);
            result.push_str(&format!("  {}\n", context));
        }
        Ok(result)
    }
}

/// 文件依赖（导入解析）
pub struct GetFileDependenciesTool {
    ctx: Arc<ProjectContext>,
}

impl GetFileDependenciesTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const FILE_DEPS_PARAMS: &[ToolParam] = &[ToolParam::required("file_path")];

#[async_trait]
impl Tool for GetFileDependenciesTool {
    fn name(&self) -> &str {
        "get_file_dependencies"
    }

    fn description(&self) -> &str {
        "List the project files a given file depends on (resolved from its imports)."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        FILE_DEPS_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let file_path = args.get("file_path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(file = %file_path, "get_file_dependencies");

        let deps = self.ctx.file_dependencies(file_path);
        if deps.is_empty() {
            return Ok(format!("No dependencies found for {}", file_path));
        }
        let mut result = format!("Dependencies for {}:\n\n", file_path);
        for dep in deps {
            result.push_str(&format!("  📄 {}\n", dep));
        }
        Ok(result)
    }
}

/// 符号定位：在代码库中查找函数 / 类型声明
pub struct NavigateToSymbolTool {
    ctx: Arc<ProjectContext>,
}

impl NavigateToSymbolTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }

    fn search_file(&self, file: &str, symbol_lower: &str) -> Option<String> {
        let a = self.ctx.analyze_source_file(file).ok()?;
        for t in &a.types {
            if t.name.to_lowercase().contains(symbol_lower) {
                return Some(format!(
                    "Found class '{}' in {} at line {}\n{}",
                    t.name,
                    file,
                    t.line,
                    self.ctx.context_around_line(file, t.line, 5)
                ));
            }
        }
        for f in &a.functions {
            if f.name.to_lowercase().contains(symbol_lower) {
                return Some(format!(
                    "Found function '{}' in {} at line {}\n{}",
                    f.name,
                    file,
                    f.line,
                    self.ctx.context_around_line(file, f.line, 5)
                ));
            }
        }
        None
    }
}

const NAVIGATE_PARAMS: &[ToolParam] = &[
    ToolParam::required("symbol_name"),
    ToolParam::optional("file_hint", None),
];

#[async_trait]
impl Tool for NavigateToSymbolTool {
    fn name(&self) -> &str {
        "navigate_to_symbol"
    }

    fn description(&self) -> &str {
        "Navigate to a function or type declaration by (partial) name, optionally \
         starting from a hinted file."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        NAVIGATE_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let symbol = args
            .get("symbol_name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let file_hint = args.get("file_hint").and_then(|v| v.as_str());
        let symbol_lower = symbol.to_lowercase();
        tracing::info!(symbol = %symbol, "navigate_to_symbol");

        if let Some(hint) = file_hint {
            if let Some(hit) = self.search_file(hint, &symbol_lower) {
                return Ok(hit);
            }
        }

        let source_files: Vec<String> = self
            .ctx
            .files()
            .iter()
            .filter(|f| SOURCE_EXTS.iter().any(|e| f.ends_with(e)))
            .cloned()
            .collect();
        for file in &source_files {
            if let Some(hit) = self.search_file(file, &symbol_lower) {
                return Ok(hit);
            }
        }

        Ok(format!("Symbol '{}' not found in the codebase", symbol))
    }
}

/// 代码流分析：从入口点（文件或符号）展开结构
pub struct GetCodeFlowTool {
    ctx: Arc<ProjectContext>,
}

impl GetCodeFlowTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const CODE_FLOW_PARAMS: &[ToolParam] = &[ToolParam::required("entry_point")];

#[async_trait]
impl Tool for GetCodeFlowTool {
    fn name(&self) -> &str {
        "get_code_flow"
    }

    fn description(&self) -> &str {
        "Analyze code structure and flow starting from an entry point (a source file \
         or a symbol name)."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        CODE_FLOW_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let entry = args
            .get("entry_point")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        tracing::info!(entry = %entry, "get_code_flow");

        if !SOURCE_EXTS.iter().any(|e| entry.ends_with(e)) {
            // 非文件入口按符号定位处理
            let nav = NavigateToSymbolTool::new(self.ctx.clone());
            return nav
                .execute(serde_json::json!({ "symbol_name": entry }))
                .await;
        }

        let a = match self.ctx.analyze_source_file(entry) {
            Ok(a) => a,
            Err(e) => return Ok(format!("Error analyzing {}: {}", entry, e)),
        };

        let mut result = format!("Code flow analysis for {}:\n\n", entry);
        if !a.types.is_empty() {
            result.push_str("Types and their methods:\n");
            for t in &a.types {
                result.push_str(&format!("  📦 {}\n", t.name));
                for m in &t.methods {
                    result.push_str(&format!("    🔧 {}\n", m));
                }
            }
            result.push('\n');
        }
        if !a.functions.is_empty() {
            result.push_str("Functions:\n");
            for f in &a.functions {
                result.push_str(&format!("  🔧 {}({})\n", f.name, f.args.join(", ")));
            }
            result.push('\n');
        }
        let deps = self.ctx.file_dependencies(entry);
        if !deps.is_empty() {
            result.push_str("Dependencies:\n");
            for dep in deps {
                result.push_str(&format!("  📄 {}\n", dep));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ctx() -> (tempfile::TempDir, Arc<ProjectContext>) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("parser.py"),
            "import config\n\nclass Parser:\n    def parse_config(self, raw):\n        pass\n\ndef load(path):\n    pass\n",
        )
        .expect("write");
        fs::write(dir.path().join("config.py"), "SETTING = 1\n").expect("write");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_analyze_file_reports_structure() {
        let (_dir, ctx) = ctx();
        let tool = AnalyzeFileTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "parser.py"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Analysis of parser.py:"));
        assert!(obs.contains("📦 Parser (line 3)"));
        assert!(obs.contains("🔧 load(path)"));
    }

    #[tokio::test]
    async fn test_analyze_missing_file_observation() {
        let (_dir, ctx) = ctx();
        let tool = AnalyzeFileTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"file_path": "nope.py"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Error analyzing nope.py:"));
    }

    #[tokio::test]
    async fn test_navigate_finds_method_owner_class() {
        let (_dir, ctx) = ctx();
        let tool = NavigateToSymbolTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"symbol_name": "parser"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Found class 'Parser' in parser.py at line 3"));
    }

    #[tokio::test]
    async fn test_navigate_unknown_symbol() {
        let (_dir, ctx) = ctx();
        let tool = NavigateToSymbolTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"symbol_name": "zzz_missing"}))
            .await
            .expect("observation");
        assert_eq!(obs, "Symbol 'zzz_missing' not found in the codebase");
    }

    #[tokio::test]
    async fn test_find_code_patterns_matches() {
        let (_dir, ctx) = ctx();
        let tool = FindCodePatternsTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"pattern": "def load"}))
            .await
            .expect("observation");
        assert!(obs.contains("matches for 'def load'"));
        assert!(obs.contains("📄 parser.py:"));
    }

    #[tokio::test]
    async fn test_code_flow_on_file() {
        let (_dir, ctx) = ctx();
        let tool = GetCodeFlowTool::new(ctx);
        let obs = tool
            .execute(serde_json::json!({"entry_point": "parser.py"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Code flow analysis for parser.py:"));
        assert!(obs.contains("Dependencies:"));
    }
}
