//! 项目上下文：一次扫描、进程级共享的代码库结构缓存
//!
//! 启动时扫描一遍工作目录（文件清单、目录、入口点、语言分布、git 信息），
//! 之后以 Arc 只读共享给工具层。忽略规则来自内置模式与根目录的 .mantisignore。
//! 单线程顺序执行模型下无需同步。

pub mod analysis;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use analysis::{analyze_source, detect_language, FileAnalysis, Language};

/// 内置忽略模式（与 .mantisignore 叠加）
const BUILTIN_IGNORES: &[&str] = &[
    ".git",
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "*.egg-info",
    ".pytest_cache",
    "node_modules",
    ".venv",
    "venv",
    "target",
    "*.log",
    ".DS_Store",
];

/// 入口点文件名
const ENTRY_POINT_NAMES: &[&str] = &[
    "__main__.py",
    "main.py",
    "app.py",
    "index.py",
    "main.rs",
    "index.js",
    "index.ts",
    "pyproject.toml",
    "setup.py",
    "Cargo.toml",
    "package.json",
];

/// git 仓库信息
#[derive(Debug, Clone, Default)]
pub struct GitInfo {
    pub is_repo: bool,
    pub root: String,
    pub branch: String,
}

/// 项目结构缓存：在 main 中构建一次，经 Arc 传入工具层（不做环境全局量）
pub struct ProjectContext {
    root: PathBuf,
    files: Vec<String>,
    directories: Vec<String>,
    entry_points: Vec<String>,
    language_stats: HashMap<String, usize>,
    git: GitInfo,
    ignore: Vec<glob::Pattern>,
}

impl ProjectContext {
    /// 扫描 root 并构建缓存
    pub fn discover(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let root = root.canonicalize().unwrap_or(root);
        let ignores = load_ignore_patterns(&root);

        let mut files = Vec::new();
        let mut directories = Vec::new();
        let mut entry_points = Vec::new();
        let mut language_stats: HashMap<String, usize> = HashMap::new();

        for entry in walkdir::WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_ignored(&ignores, e.path(), &root))
            .filter_map(|e| e.ok())
        {
            let rel = match entry.path().strip_prefix(&root) {
                Ok(r) => r.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            if entry.file_type().is_dir() {
                directories.push(rel);
            } else if entry.file_type().is_file() {
                let name = entry.file_name().to_string_lossy();
                if ENTRY_POINT_NAMES.contains(&name.as_ref()) {
                    entry_points.push(rel.clone());
                }
                let ext = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{}", e.to_lowercase()))
                    .unwrap_or_default();
                *language_stats.entry(ext).or_insert(0) += 1;
                files.push(rel);
            }
        }

        files.sort();
        directories.sort();
        entry_points.sort();

        let git = git_info(&root);

        Self {
            root,
            files,
            directories,
            entry_points,
            language_stats,
            git,
            ignore: ignores,
        }
    }

    /// 路径是否命中忽略规则（list_files 等实时目录遍历复用）
    pub fn is_path_ignored(&self, path: &Path) -> bool {
        is_ignored(&self.ignore, path, &self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    pub fn language_stats(&self) -> &HashMap<String, usize> {
        &self.language_stats
    }

    pub fn git(&self) -> &GitInfo {
        &self.git
    }

    /// 项目概览文本（供 get_project_overview 工具）
    pub fn overview(&self) -> String {
        let stats = serde_json::to_string_pretty(
            &self
                .language_stats
                .iter()
                .collect::<std::collections::BTreeMap<_, _>>(),
        )
        .unwrap_or_else(|_| "{}".to_string());

        let entry_points = self
            .entry_points
            .iter()
            .map(|ep| format!("  - {}", ep))
            .collect::<Vec<_>>()
            .join("\n");

        let top_dirs = self
            .directories
            .iter()
            .filter(|d| !d.contains('/'))
            .take(10)
            .map(|d| format!("  📁 {}/", d))
            .collect::<Vec<_>>()
            .join("\n");
        let top_files = self
            .files
            .iter()
            .filter(|f| !f.contains('/'))
            .take(10)
            .map(|f| format!("  📄 {}", f))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Project Overview:\n\
             ================\n\
             Root: {}\n\
             Files: {} files\n\
             Directories: {} directories\n\n\
             Language Distribution:\n{}\n\n\
             Entry Points:\n{}\n\n\
             Git Info:\n  Repository: {}\n  Branch: {}\n  Current Dir: {}\n\n\
             Top-level Structure:\n{}\n{}",
            self.root.display(),
            self.files.len(),
            self.directories.len(),
            stats,
            entry_points,
            if self.git.is_repo { "Yes" } else { "No" },
            if self.git.branch.is_empty() {
                "N/A"
            } else {
                &self.git.branch
            },
            self.root.display(),
            top_dirs,
            top_files,
        )
    }

    /// 按 glob 模式查找文件，可选扩展名过滤
    pub fn find_files_by_pattern(&self, pattern: &str, file_type: Option<&str>) -> Vec<String> {
        let compiled = glob::Pattern::new(pattern).ok();
        self.files
            .iter()
            .filter(|f| match &compiled {
                Some(p) => p.matches(f) || p.matches(basename(f)),
                None => false,
            })
            .filter(|f| match file_type {
                Some(t) => f.ends_with(&format!(".{}", t)),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// 按内容查找：优先按正则（忽略大小写），非法正则退化为子串匹配
    pub fn find_files_by_content(
        &self,
        pattern: &str,
        file_exts: &[String],
    ) -> Vec<(String, usize, String)> {
        let re = regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .ok();
        let needle = pattern.to_lowercase();
        let mut results = Vec::new();

        for file in &self.files {
            if !file_exts.iter().any(|ext| file.ends_with(ext.as_str())) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(self.root.join(file)) else {
                continue;
            };
            for (idx, line) in content.lines().enumerate() {
                let hit = match &re {
                    Some(r) => r.is_match(line),
                    None => line.to_lowercase().contains(&needle),
                };
                if hit {
                    results.push((file.clone(), idx + 1, line.trim().to_string()));
                }
            }
        }
        results
    }

    /// 对单个文件做结构分析
    pub fn analyze_source_file(&self, file_path: &str) -> Result<FileAnalysis, String> {
        let full = self.resolve(file_path);
        if !full.exists() {
            return Err(format!("File {} not found", file_path));
        }
        let content = std::fs::read_to_string(&full)
            .map_err(|e| format!("Error analyzing {}: {}", file_path, e))?;
        let lang = detect_language(&full);
        Ok(analyze_source(file_path, &content, lang))
    }

    /// 文件的语言（供工具层判断可分析性）
    pub fn language_of(&self, file_path: &str) -> Language {
        detect_language(Path::new(file_path))
    }

    /// 目标行附近的上下文片段，目标行用 ">>>" 标记
    pub fn context_around_line(&self, file_path: &str, line_num: usize, context: usize) -> String {
        let full = self.resolve(file_path);
        let Ok(content) = std::fs::read_to_string(&full) else {
            return format!("File {} not found", file_path);
        };
        let lines: Vec<&str> = content.lines().collect();
        let start = line_num.saturating_sub(context + 1);
        let end = (line_num + context).min(lines.len());

        let mut out = Vec::new();
        for i in start..end {
            let marker = if i + 1 == line_num { ">>> " } else { "    " };
            out.push(format!("{}{:4}: {}", marker, i + 1, lines[i]));
        }
        format!(
            "Context around line {} in {}:\n{}",
            line_num,
            file_path,
            out.join("\n")
        )
    }

    /// 解析导入，映射回项目内文件
    pub fn file_dependencies(&self, file_path: &str) -> Vec<String> {
        let Ok(analysis) = self.analyze_source_file(file_path) else {
            return Vec::new();
        };

        let mut deps = Vec::new();
        for import in &analysis.imports {
            let segments: Vec<&str> = import.split(['.', ':']).filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                continue;
            }
            // 完整路径命中（python 风格 a.b -> a/b.py 或 a/b/__init__.py）
            let joined = segments.join("/");
            let candidates = [format!("{}.py", joined), format!("{}/__init__.py", joined)];
            if let Some(hit) = candidates.iter().find(|c| self.files.contains(*c)) {
                deps.push(hit.clone());
                continue;
            }
            // 退化：按末段文件名匹配任意源文件
            let tail = segments[segments.len() - 1];
            for f in &self.files {
                let stem = basename(f).rsplit_once('.').map(|(s, _)| s).unwrap_or("");
                if stem == tail && f.as_str() != file_path {
                    deps.push(f.clone());
                    break;
                }
            }
        }
        deps.sort();
        deps.dedup();
        deps
    }

    fn resolve(&self, file_path: &str) -> PathBuf {
        let p = Path::new(file_path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn load_ignore_patterns(root: &Path) -> Vec<glob::Pattern> {
    let mut raw: Vec<String> = BUILTIN_IGNORES.iter().map(|s| s.to_string()).collect();
    if let Ok(content) = std::fs::read_to_string(root.join(".mantisignore")) {
        for line in content.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                raw.push(line.to_string());
            }
        }
    }
    raw.iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .collect()
}

fn is_ignored(patterns: &[glob::Pattern], path: &Path, root: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let rel = path
        .strip_prefix(root)
        .map(|r| r.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    patterns.iter().any(|p| p.matches(&name) || p.matches(&rel))
}

fn git_info(root: &Path) -> GitInfo {
    let toplevel = std::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(root)
        .output();
    match toplevel {
        Ok(out) if out.status.success() => {
            let git_root = String::from_utf8_lossy(&out.stdout).trim().to_string();
            let branch = std::process::Command::new("git")
                .args(["rev-parse", "--abbrev-ref", "HEAD"])
                .current_dir(root)
                .output()
                .ok()
                .filter(|o| o.status.success())
                .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            GitInfo {
                is_repo: true,
                root: git_root,
                branch,
            }
        }
        _ => GitInfo::default(),
    }
}
