//! 工具箱：统一 Tool 契约、注册表、执行器与 ~20 个能力实现
//!
//! 能力分组：文件操作（filesystem）、子进程（shell）、探索（explore）、
//! 分析/导航（analyze）、体检（health）、代码质量（quality）。

pub mod analyze;
pub mod executor;
pub mod explore;
pub mod filesystem;
pub mod health;
pub mod quality;
pub mod registry;
pub mod shell;

pub use executor::ToolExecutor;
pub use registry::{Tool, ToolParam, ToolRegistry};

use std::sync::Arc;

use crate::config::ToolsSection;
use crate::project::ProjectContext;

pub use analyze::{
    AnalyzeFileTool, FindCodePatternsTool, GetCodeFlowTool, GetFileDependenciesTool,
    NavigateToSymbolTool,
};
pub use explore::{ExploreCodebaseTool, GetProjectOverviewTool, ReadAndSummarizeProjectTool};
pub use filesystem::{ListFilesTool, ReadFileTool, ReadMultipleFilesTool, WriteFileTool};
pub use health::{GetProjectHealthTool, SuggestImprovementsTool};
pub use quality::{
    FindCodeSmellsTool, FindSecurityIssuesTool, GenerateDocSuggestionsTool,
    GenerateTestSuggestionsTool, GetCodeMetricsTool, SuggestRefactoringTool,
};
pub use shell::{ExecuteCommandTool, ExecuteWithContextTool};

/// 组装完整注册表：注册顺序即提示词与未知工具提示中的展示顺序
pub fn build_registry(ctx: Arc<ProjectContext>, cfg: &ToolsSection) -> ToolRegistry {
    let root = ctx.root().to_path_buf();
    let mut registry = ToolRegistry::new();

    // 基础文件操作
    registry.register(ListFilesTool::new(ctx.clone()));
    registry.register(ReadFileTool::new(&root));
    registry.register(ReadMultipleFilesTool::new(&root));
    registry.register(WriteFileTool::new(&root));
    registry.register(ExecuteCommandTool::new(&root, cfg.command_timeout_secs));

    // 探索与分析
    registry.register(GetProjectOverviewTool::new(ctx.clone()));
    registry.register(ExploreCodebaseTool::new(ctx.clone(), cfg.max_explore_files));
    registry.register(AnalyzeFileTool::new(ctx.clone()));
    registry.register(FindCodePatternsTool::new(ctx.clone()));
    registry.register(GetFileDependenciesTool::new(ctx.clone()));
    registry.register(NavigateToSymbolTool::new(ctx.clone()));
    registry.register(GetCodeFlowTool::new(ctx.clone()));
    registry.register(SuggestImprovementsTool::new(ctx.clone()));
    registry.register(GetProjectHealthTool::new(ctx.clone()));
    registry.register(ExecuteWithContextTool::new(&root, cfg.command_timeout_secs));

    // 代码质量
    registry.register(FindCodeSmellsTool::new(ctx.clone()));
    registry.register(SuggestRefactoringTool::new(ctx.clone()));
    registry.register(GenerateTestSuggestionsTool::new(ctx.clone()));
    registry.register(FindSecurityIssuesTool::new(ctx.clone()));
    registry.register(GetCodeMetricsTool::new(ctx.clone()));
    registry.register(GenerateDocSuggestionsTool::new(ctx.clone()));
    registry.register(ReadAndSummarizeProjectTool::new(ctx));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_has_full_capability_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Arc::new(ProjectContext::discover(dir.path()));
        let registry = build_registry(ctx, &ToolsSection::default());

        assert_eq!(registry.len(), 22);
        assert_eq!(registry.names()[0], "list_files");
        for name in ["read_file", "write_file", "execute_command", "navigate_to_symbol"] {
            assert!(registry.contains(name), "missing {}", name);
        }
        // 有副作用的工具需要确认，其余自动执行
        for tool in registry.iter() {
            let gated = matches!(
                tool.name(),
                "write_file" | "execute_command" | "execute_with_context"
            );
            assert_eq!(tool.auto_execute(), !gated, "gate mismatch for {}", tool.name());
        }
    }
}
