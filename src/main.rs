//! Mantis - Rust 编码智能体 CLI
//!
//! 入口：初始化日志、加载配置、构建组件，目标来自命令行参数（拼接）或
//! 交互式逐行读取；保留词 exit / quit 结束会话。

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use mantis::agent::{AgentLoop, GoalOutcome, Insights, StdinGate};
use mantis::config::{load_config, AppConfig};
use mantis::llm::create_llm_from_config;
use mantis::project::ProjectContext;
use mantis::tools::{build_registry, ToolExecutor};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config load failed, using defaults");
        AppConfig::default()
    });

    // 共享上下文显式构建一次，经 Arc 传入工具层
    let ctx = Arc::new(ProjectContext::discover("."));
    let registry = Arc::new(build_registry(ctx, &cfg.tools));
    let executor = ToolExecutor::new(registry);
    let llm = create_llm_from_config(&cfg);
    let gate = StdinGate;
    let mut insights = Insights::new();

    let agent = AgentLoop::new(
        llm,
        &executor,
        &gate,
        cfg.agent.max_iterations,
        cfg.agent.parse_retry_limit,
    );

    println!("🦗 mantis coding agent (model: {})", cfg.llm.model);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let goal = args.join(" ");
        println!("Goal: {}\n", goal);
        run_goal(&agent, &goal, &mut insights).await?;
    } else {
        // 交互模式：每行一个目标，exit/quit 或 EOF 结束
        let stdin = std::io::stdin();
        loop {
            print!("goal> ");
            std::io::stdout().flush().ok();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let goal = line.trim();
            if goal.is_empty() {
                continue;
            }
            if goal.eq_ignore_ascii_case("exit") || goal.eq_ignore_ascii_case("quit") {
                break;
            }
            run_goal(&agent, goal, &mut insights).await?;
        }
    }

    println!("\n👋 Goodbye!");
    Ok(())
}

async fn run_goal(
    agent: &AgentLoop<'_>,
    goal: &str,
    insights: &mut Insights,
) -> anyhow::Result<()> {
    let outcome = agent
        .run(goal, insights)
        .await
        .context("agent loop failed")?;
    match outcome {
        GoalOutcome::Finished { response } => println!("\n{}\n", response),
        GoalOutcome::Stopped { reason } => println!("\n🛑 Stopping: {}\n", reason),
        GoalOutcome::Aborted => println!("\nAction cancelled by user.\n"),
        GoalOutcome::MaxIterations => println!("\nMaximum iterations reached. Aborting.\n"),
    }
    Ok(())
}
