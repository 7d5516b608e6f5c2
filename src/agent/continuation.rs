//! 续行策略：对工具输出文本的启发式停机判断
//!
//! 纯函数、固定规则序、首条命中即返回。这是对自然语言 Observation 的尽力而为
//! 判断，不是任务完成的形式化证明；除显式 finish 动作外，它与迭代硬上限是
//! 仅有的终止机制。规则文本与顺序是行为契约，调整须连同测试一起改。

/// 续行决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationDecision {
    pub proceed: bool,
    pub reason: String,
}

impl ContinuationDecision {
    fn stop(reason: &str) -> Self {
        Self {
            proceed: false,
            reason: reason.to_string(),
        }
    }

    fn go(reason: &str) -> Self {
        Self {
            proceed: true,
            reason: reason.to_string(),
        }
    }
}

/// (observation, iteration, cap) -> 决策；规则按序求值，首条命中生效
pub fn should_continue(observation: &str, iteration: usize, cap: usize) -> ContinuationDecision {
    if iteration >= cap {
        return ContinuationDecision::stop("max iterations reached");
    }

    let obs = observation.to_lowercase();

    // 任务完成信号：README 已写出
    if obs.contains("successfully wrote") && obs.contains("readme.md") {
        return ContinuationDecision::stop("task completed");
    }

    // 找到文件只是中间态，还要继续处理
    if obs.contains("found") && obs.contains("files") && obs.contains("matching") {
        return ContinuationDecision::go("need to process found files");
    }

    // 读完文件后还需落盘摘要
    if obs.contains("project analysis summary") || obs.contains("file analysis") {
        return ContinuationDecision::go("need to write summary");
    }

    // 错误循环保护
    if obs.contains("error") && iteration > 3 {
        return ContinuationDecision::stop("too many errors");
    }

    if obs.contains("no files found") && iteration < 5 {
        return ContinuationDecision::go("still searching");
    }

    if ["analyzing", "exploring", "searching", "processing"]
        .iter()
        .any(|p| obs.contains(p))
    {
        return ContinuationDecision::go("still processing");
    }

    if ["next", "continue", "more", "additional"]
        .iter()
        .any(|p| obs.contains(p))
    {
        return ContinuationDecision::go("more work indicated");
    }

    ContinuationDecision::go("continuing exploration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_beats_everything() {
        // 任意文本在 iteration == cap 时都停
        for obs in ["", "Successfully wrote to 'README.md'", "still exploring"] {
            let d = should_continue(obs, 10, 10);
            assert!(!d.proceed);
            assert_eq!(d.reason, "max iterations reached");
        }
    }

    #[test]
    fn test_readme_written_stops() {
        let d = should_continue("Successfully wrote to 'README.md'", 2, 10);
        assert!(!d.proceed);
        assert_eq!(d.reason, "task completed");
        // 大小写不敏感
        let d = should_continue("SUCCESSFULLY WROTE to 'Readme.MD'", 0, 10);
        assert!(!d.proceed);
    }

    #[test]
    fn test_found_files_continues() {
        let d = should_continue("Found 12 files matching '**/*.py':", 1, 10);
        assert!(d.proceed);
        assert_eq!(d.reason, "need to process found files");
    }

    #[test]
    fn test_analysis_summary_continues() {
        let d = should_continue("# Project Analysis Summary\n...", 1, 10);
        assert!(d.proceed);
        assert_eq!(d.reason, "need to write summary");
        let d = should_continue("## File Analysis\n...", 1, 10);
        assert_eq!(d.reason, "need to write summary");
    }

    #[test]
    fn test_error_loop_protection_after_three() {
        let d = should_continue("Error executing tool 'x': boom", 4, 10);
        assert!(!d.proceed);
        assert_eq!(d.reason, "too many errors");
        // 早期错误不触发
        let d = should_continue("Error executing tool 'x': boom", 3, 10);
        assert!(d.proceed);
    }

    #[test]
    fn test_no_files_found_keeps_searching_early() {
        let d = should_continue("No files found in 'src'", 2, 10);
        assert!(d.proceed);
        assert_eq!(d.reason, "still searching");
    }

    #[test]
    fn test_progress_words_continue() {
        let d = should_continue("Analyzing main.py ...", 1, 10);
        assert_eq!(d.reason, "still processing");
        let d = should_continue("there is more to do", 1, 10);
        assert_eq!(d.reason, "more work indicated");
    }

    #[test]
    fn test_default_continues() {
        let d = should_continue("Contents of main.py:\nprint('hi')", 1, 10);
        assert!(d.proceed);
        assert_eq!(d.reason, "continuing exploration");
    }

    #[test]
    fn test_policy_is_pure() {
        let a = should_continue("Found 3 files matching '*.rs'", 2, 10);
        let b = should_continue("Found 3 files matching '*.rs'", 2, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rule_order_found_files_beats_error_guard() {
        // 规则 3 先于规则 5：同时含 "found files matching" 与 "error" 时继续
        let d = should_continue("Found 2 files matching 'error_*.log'", 5, 10);
        assert!(d.proceed);
        assert_eq!(d.reason, "need to process found files");
    }
}
