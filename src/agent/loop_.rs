//! Agent 主循环
//!
//! INIT -> PLAN -> ITERATE{THINK, VALIDATE, CONFIRM?, ACT, RECOVER?, DECIDE} ->
//! {FINISHED | STOPPED | ABORTED | MAX_ITER}。
//!
//! 失败语义：工具错误被执行器降级为 Observation，绝不中断循环；LLM 输出不合法
//! 在 THINK 内有界重试；非法动作走对话式纠正，只受迭代上限约束；确认被拒即
//! 中止目标；迭代耗尽以独立信号退出并记为失败交互。

use std::sync::Arc;

use serde_json::Value;

use crate::agent::action::{parse_action, Action};
use crate::agent::confirm::UserGate;
use crate::agent::continuation::should_continue;
use crate::agent::insight::Insights;
use crate::agent::plan::{contextual_suggestions, generate_plan};
use crate::agent::prompt::build_system_prompt;
use crate::agent::validator::ActionValidator;
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Memory, Message};
use crate::tools::ToolExecutor;

/// Observation 日志预览长度
const OBSERVATION_PREVIEW_CHARS: usize = 200;

/// 一次目标执行的终态：四种停机方式一一对应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalOutcome {
    /// LLM 以 finish 动作交付最终回复
    Finished { response: String },
    /// 续行策略判停
    Stopped { reason: String },
    /// 用户在确认闸门拒绝
    Aborted,
    /// 迭代上限耗尽
    MaxIterations,
}

/// 循环配置与依赖：LLM、执行器、确认闸门、上限
pub struct AgentLoop<'a> {
    llm: Arc<dyn LlmClient>,
    executor: &'a ToolExecutor,
    gate: &'a dyn UserGate,
    max_iterations: usize,
    parse_retry_limit: usize,
}

impl<'a> AgentLoop<'a> {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: &'a ToolExecutor,
        gate: &'a dyn UserGate,
        max_iterations: usize,
        parse_retry_limit: usize,
    ) -> Self {
        Self {
            llm,
            executor,
            gate,
            max_iterations,
            parse_retry_limit,
        }
    }

    /// 执行一次目标：Memory 在此新建并随返回丢弃
    pub async fn run(&self, goal: &str, insights: &mut Insights) -> Result<GoalOutcome, AgentError> {
        // 建议计划：仅日志展示，循环不机械消费
        let plan = generate_plan(goal);
        tracing::info!(steps = plan.len(), "generated advisory plan");
        for step in &plan {
            tracing::debug!(tool = step.tool, reason = %step.reason, "plan step");
        }

        let mut memory = Memory::new();
        memory.add(Message::system(build_system_prompt(
            self.executor.registry(),
            goal,
        )));
        memory.add(Message::user(goal));

        let validator = ActionValidator::new(self.executor.registry());
        let mut tools_used: Vec<String> = Vec::new();

        for iteration in 0..self.max_iterations {
            tracing::info!(iteration = iteration + 1, max = self.max_iterations, "iteration");

            let action = self.think(&mut memory).await?;

            if let Some(thought) = &action.thought {
                tracing::info!(
                    next_action = %thought.next_action,
                    reasoning = %preview(&thought.reasoning),
                    "thought"
                );
            }

            if let Some(criticism) = validator.validate(&action) {
                tracing::warn!(criticism = %criticism, "action rejected");
                memory.add(Message::assistant(action.to_json_string()));
                memory.add(Message::user(format!(
                    "Your last tool call was invalid. {}. Please try again with the correct arguments.",
                    criticism
                )));
                continue;
            }

            if action.is_finish() {
                let response = action.finish_response();
                insights.record_interaction(goal, &tools_used, &response, true);
                return Ok(GoalOutcome::Finished { response });
            }

            if !self.is_auto_execute(&action) {
                tracing::info!(tool = %action.tool, "confirmation required");
                if !self.gate.confirm("Execute this action? (y/n): ") {
                    tracing::info!("action cancelled by user");
                    return Ok(GoalOutcome::Aborted);
                }
            }

            let mut recorded_action = action.to_json_string();
            let mut observation = self
                .executor
                .execute(&action.tool, Value::Object(action.args.clone()))
                .await;
            tools_used.push(action.tool.clone());

            // 一次性恢复：文件未找到 -> 注入纠正对话并立刻探测工作目录，
            // 探测结果覆盖原 Observation（原始工具输出被有意丢弃），
            // 且探测直接走执行器、不过确认闸门
            if observation.contains("Error: File") && observation.contains("not found") {
                let suggestions = contextual_suggestions(&observation);
                if !suggestions.is_empty() {
                    tracing::info!(
                        suggestions = %suggestions[..suggestions.len().min(2)].join("; "),
                        "recovery suggestions"
                    );
                }
                memory.add(Message::assistant(recorded_action.clone()));
                memory.add(Message::user(format!(
                    "Observation: {}\n\nI got a 'file not found' error. I will now run `pwd` to find out my current working directory.",
                    observation
                )));

                let probe_args = serde_json::json!({"command": "pwd"});
                recorded_action =
                    serde_json::json!({"tool": "execute_command", "args": probe_args.clone()})
                        .to_string();
                observation = self.executor.execute("execute_command", probe_args).await;
            }

            tracing::info!(tool = %action.tool, observation = %preview(&observation), "observation");

            let decision = should_continue(&observation, iteration, self.max_iterations);
            if !decision.proceed {
                tracing::info!(reason = %decision.reason, "stopping");
                return Ok(GoalOutcome::Stopped {
                    reason: decision.reason,
                });
            }

            memory.add(Message::assistant(recorded_action));
            memory.add(Message::user(format!("Observation: {}", observation)));
        }

        insights.record_interaction(goal, &tools_used, "Maximum iterations reached", false);
        Ok(GoalOutcome::MaxIterations)
    }

    /// THINK：提交完整历史，解析严格 JSON；失败注入纠正消息并重试，有界
    async fn think(&self, memory: &mut Memory) -> Result<Action, AgentError> {
        for attempt in 0..=self.parse_retry_limit {
            let raw = self
                .llm
                .complete(memory.history())
                .await
                .map_err(AgentError::Llm)?;
            match parse_action(&raw) {
                Ok(action) => return Ok(action),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "model response was not valid JSON, retrying");
                    memory.add(Message::assistant(
                        "Invalid JSON response. Please provide a valid JSON object.".to_string(),
                    ));
                }
            }
        }
        Err(AgentError::Protocol(format!(
            "model failed to produce valid JSON after {} retries",
            self.parse_retry_limit
        )))
    }

    fn is_auto_execute(&self, action: &Action) -> bool {
        self.executor
            .registry()
            .get(&action.tool)
            .map(|t| t.auto_execute())
            .unwrap_or(false)
    }
}

fn preview(s: &str) -> String {
    if s.chars().count() > OBSERVATION_PREVIEW_CHARS {
        format!(
            "{}...",
            s.chars().take(OBSERVATION_PREVIEW_CHARS).collect::<String>()
        )
    } else {
        s.to_string()
    }
}
