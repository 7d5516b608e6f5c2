//! 文件系统工具：list_files / read_file / read_multiple_files / write_file
//!
//! 读写失败以 Ok("Error: ...") 的形式作为 Observation 返回而非 Err：
//! 循环的 RECOVER 分支与续行策略按这些文本模式匹配（如 "Error: File '<p>' not found"），
//! 模式是对外契约的一部分，不可改写。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::project::ProjectContext;
use crate::tools::{Tool, ToolParam};

fn resolve(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// 列出目录内容，可递归
pub struct ListFilesTool {
    ctx: Arc<ProjectContext>,
}

impl ListFilesTool {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }
}

const LIST_FILES_PARAMS: &[ToolParam] = &[
    ToolParam::optional("path", Some(".")),
    ToolParam::optional("recursive", Some("false")),
];

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories in a given path. Directories are suffixed with '/'."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        LIST_FILES_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let recursive = args
            .get("recursive")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        tracing::info!(path = %path, recursive, "list_files");

        let base = resolve(self.ctx.root(), path);
        if !base.exists() {
            return Ok(format!("Error: Directory '{}' does not exist", path));
        }

        let mut entries = Vec::new();
        if recursive {
            for entry in walkdir::WalkDir::new(&base)
                .min_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if self.ctx.is_path_ignored(entry.path()) {
                    continue;
                }
                let rel = entry
                    .path()
                    .strip_prefix(&base)
                    .map(|r| r.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                if entry.file_type().is_dir() {
                    entries.push(format!("📁 {}/", rel));
                } else {
                    entries.push(format!("📄 {}", rel));
                }
            }
        } else {
            let read = std::fs::read_dir(&base)
                .map_err(|e| format!("Error listing files: {}", e))?;
            for entry in read.filter_map(|e| e.ok()) {
                if self.ctx.is_path_ignored(&entry.path()) {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    entries.push(format!("📁 {}/", name));
                } else {
                    entries.push(format!("📄 {}", name));
                }
            }
        }

        entries.sort();
        if entries.is_empty() {
            Ok(format!("No files found in '{}'", path))
        } else {
            Ok(entries.join("\n"))
        }
    }
}

/// 读取单个文件
pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

const READ_FILE_PARAMS: &[ToolParam] = &[ToolParam::required("path")];

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        READ_FILE_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(path = %path, "read_file");
        let full = resolve(&self.root, path);
        if !full.exists() {
            return Ok(format!("Error: File '{}' not found", path));
        }
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(format!("Contents of {}:\n{}", path, content)),
            Err(e) => Ok(format!("Error reading file '{}': {}", path, e)),
        }
    }
}

/// 批量读取多个文件，单个失败不影响其余
pub struct ReadMultipleFilesTool {
    root: PathBuf,
}

impl ReadMultipleFilesTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

const READ_MULTIPLE_PARAMS: &[ToolParam] = &[ToolParam::required("paths")];

#[async_trait]
impl Tool for ReadMultipleFilesTool {
    fn name(&self) -> &str {
        "read_multiple_files"
    }

    fn description(&self) -> &str {
        "Read the contents of multiple files at once. Args: {\"paths\": [\"a.py\", \"b.py\"]}"
    }

    fn parameters(&self) -> &'static [ToolParam] {
        READ_MULTIPLE_PARAMS
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let paths: Vec<String> = args
            .get("paths")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        tracing::info!(count = paths.len(), "read_multiple_files");

        let mut contents = Vec::new();
        for path in &paths {
            let full = resolve(&self.root, path);
            if !full.exists() {
                contents.push(format!("Error: File '{}' not found", path));
                continue;
            }
            match std::fs::read_to_string(&full) {
                Ok(c) => contents.push(format!("--- Contents of {} ---\n{}", path, c)),
                Err(e) => contents.push(format!("Error reading file '{}': {}", path, e)),
            }
        }
        Ok(contents.join("\n\n"))
    }
}

/// 写文件（自动建父目录）。有副作用，执行前需确认。
pub struct WriteFileTool {
    root: PathBuf,
}

impl WriteFileTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

const WRITE_FILE_PARAMS: &[ToolParam] = &[
    ToolParam::required("path"),
    ToolParam::required("content"),
];

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating parent directories as needed."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        WRITE_FILE_PARAMS
    }

    fn auto_execute(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        let content = args.get("content").and_then(|v| v.as_str()).unwrap_or("");
        tracing::info!(path = %path, bytes = content.len(), "write_file");

        let full = resolve(&self.root, path);
        if let Some(parent) = full.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    return Ok(format!("Error writing to file '{}': {}", path, e));
                }
            }
        }
        match std::fs::write(&full, content) {
            Ok(()) => Ok(format!("Successfully wrote to '{}'", path)),
            Err(e) => Ok(format!("Error writing to file '{}': {}", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_file_not_found_observation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tool = ReadFileTool::new(dir.path());
        let obs = tool
            .execute(serde_json::json!({"path": "missing.py"}))
            .await
            .expect("observation");
        assert_eq!(obs, "Error: File 'missing.py' not found");
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let write = WriteFileTool::new(dir.path());
        let obs = write
            .execute(serde_json::json!({"path": "out/README.md", "content": "# hi"}))
            .await
            .expect("observation");
        assert_eq!(obs, "Successfully wrote to 'out/README.md'");

        let read = ReadFileTool::new(dir.path());
        let obs = read
            .execute(serde_json::json!({"path": "out/README.md"}))
            .await
            .expect("observation");
        assert!(obs.starts_with("Contents of out/README.md:"));
        assert!(obs.contains("# hi"));
    }

    #[tokio::test]
    async fn test_read_multiple_mixes_hits_and_misses() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), "alpha").expect("write");
        let tool = ReadMultipleFilesTool::new(dir.path());
        let obs = tool
            .execute(serde_json::json!({"paths": ["a.txt", "b.txt"]}))
            .await
            .expect("observation");
        assert!(obs.contains("--- Contents of a.txt ---"));
        assert!(obs.contains("Error: File 'b.txt' not found"));
    }

    #[test]
    fn test_write_file_requires_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!WriteFileTool::new(dir.path()).auto_execute());
    }
}
