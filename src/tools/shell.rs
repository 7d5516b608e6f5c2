//! 子进程工具：execute_command / execute_with_context
//!
//! 通过 sh -c / cmd /C 执行，超时由工具自身持有（默认 30 秒），循环不设超时。
//! 两者都有副作用，执行前需用户确认。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::tools::{Tool, ToolParam};

fn shell_command(command: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    }
}

/// 执行 shell 命令，输出 STDOUT / STDERR / 退出码
pub struct ExecuteCommandTool {
    timeout_secs: u64,
    working_dir: PathBuf,
}

impl ExecuteCommandTool {
    pub fn new(working_dir: impl AsRef<Path>, timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

const EXECUTE_COMMAND_PARAMS: &[ToolParam] = &[ToolParam::required("command")];

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its stdout, stderr and exit code."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        EXECUTE_COMMAND_PARAMS
    }

    fn auto_execute(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let command = args
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        tracing::info!(command = %command, "execute_command");

        let mut cmd = shell_command(command);
        cmd.current_dir(&self.working_dir);

        let output = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        {
            Err(_) => {
                return Ok(format!(
                    "Error: Command timed out after {} seconds",
                    self.timeout_secs
                ))
            }
            Ok(Err(e)) => return Ok(format!("Error executing command: {}", e)),
            Ok(Ok(out)) => out,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut result = String::new();
        if !stdout.is_empty() {
            result.push_str(&format!("STDOUT:\n{}\n", stdout));
        }
        if !stderr.is_empty() {
            result.push_str(&format!("STDERR:\n{}\n", stderr));
        }
        result.push_str(&format!("Exit code: {}", output.status.code().unwrap_or(-1)));
        Ok(result)
    }
}

/// 在指定工作目录执行命令，输出带上下文头
pub struct ExecuteWithContextTool {
    timeout_secs: u64,
    default_dir: PathBuf,
}

impl ExecuteWithContextTool {
    pub fn new(default_dir: impl AsRef<Path>, timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            default_dir: default_dir.as_ref().to_path_buf(),
        }
    }
}

const EXECUTE_WITH_CONTEXT_PARAMS: &[ToolParam] = &[
    ToolParam::required("command"),
    ToolParam::optional("working_dir", None),
];

#[async_trait]
impl Tool for ExecuteWithContextTool {
    fn name(&self) -> &str {
        "execute_with_context"
    }

    fn description(&self) -> &str {
        "Execute a command in an explicit working directory, reporting the command, \
         directory and exit code alongside its output. Preferred over execute_command."
    }

    fn parameters(&self) -> &'static [ToolParam] {
        EXECUTE_WITH_CONTEXT_PARAMS
    }

    fn auto_execute(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let command = args
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        let working_dir = args
            .get("working_dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_dir.clone());
        tracing::info!(command = %command, dir = %working_dir.display(), "execute_with_context");

        let mut cmd = shell_command(command);
        cmd.current_dir(&working_dir);

        let output = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        {
            Err(_) => {
                return Ok(format!(
                    "Command timed out after {} seconds: {}",
                    self.timeout_secs, command
                ))
            }
            Ok(Err(e)) => return Ok(format!("Error executing command '{}': {}", command, e)),
            Ok(Ok(out)) => out,
        };

        let mut result = format!(
            "Command: {}\nWorking Directory: {}\nExit Code: {}\n\n",
            command,
            working_dir.display(),
            output.status.code().unwrap_or(-1)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.is_empty() {
            result.push_str(&format!("STDOUT:\n{}\n", stdout));
        }
        if !stderr.is_empty() {
            result.push_str(&format!("STDERR:\n{}\n", stderr));
        }
        Ok(result)
    }
}
