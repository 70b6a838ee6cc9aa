/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{AverageScores, BatchGradingResult, GradingSummary};
use crate::workflow::{CloseOutcome, SessionCtx};

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(ctx: &SessionCtx, base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量批改模式");
    info!("📋 会话: {}", ctx);
    info!("🌐 接口: {}", base_url);
    info!(
        "🕒 时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 输出批改结果表
pub fn log_results_table(results: &[BatchGradingResult]) {
    info!("\n{}", "─".repeat(60));
    info!(
        "{:<8} {:<16} {:>6} {:>4} {:>6} {:>6} {:>6} {:>6}  状态",
        "ID", "姓名", "总分", "缺", "发音", "准确", "流利", "完整"
    );
    for r in results {
        info!(
            "{:<8} {:<16} {:>6.1} {:>4} {:>6.1} {:>6.1} {:>6.1} {:>6.1}  {}",
            r.student_id,
            truncate_text(&r.student_name, 12),
            r.total_score,
            r.missing_items_count,
            r.avg_pronunciation,
            r.avg_accuracy,
            r.avg_fluency,
            r.avg_completeness,
            r.status
        );
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_session_summary(
    summary: &GradingSummary,
    averages: &AverageScores,
    outcome: &CloseOutcome,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批改完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "👥 学生: {} (已批改 {}, 已退回 {})",
        summary.total_students, summary.graded, summary.returned
    );
    info!("⚠️ 有缺失小题: {}", summary.with_missing_items);
    info!("🎯 平均总分: {:.1}", summary.avg_total_score);
    info!("📈 {}", averages);
    match outcome {
        CloseOutcome::NothingToReturn => info!("↩️ 未退回任何学生"),
        CloseOutcome::Returned { count } => info!("↩️ 已退回订正: {}", count),
        CloseOutcome::ReturnFailed { count } => info!("❌ 退回订正提交失败: {}", count),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
