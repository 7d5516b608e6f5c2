//! 用户确认闸门
//!
//! 有副作用的工具执行前询问用户；回答非肯定即中止整个目标。
//! trait 抽象便于测试注入（AutoApprove / DenyAll）。

use std::io::Write;

/// 确认闸门：confirm 返回 true 放行，false 中止目标
pub trait UserGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 交互式闸门：从标准输入读一行，仅 "y"（忽略大小写）视为肯定
#[derive(Debug, Default)]
pub struct StdinGate;

impl UserGate for StdinGate {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => false, // EOF / 读失败视为拒绝
            Ok(_) => line.trim().eq_ignore_ascii_case("y"),
        }
    }
}

/// 全部放行（测试与无人值守场景）
#[derive(Debug, Default)]
pub struct AutoApprove;

impl UserGate for AutoApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// 全部拒绝（测试 Aborted 路径）
#[derive(Debug, Default)]
pub struct DenyAll;

impl UserGate for DenyAll {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
