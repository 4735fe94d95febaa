//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{ChainReport, ChainStatus};

/// 初始化日志
///
/// `RUST_LOG` 优先，否则使用配置中的过滤规则。重复初始化时静默忽略。
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目链自动求解");
    info!("👤 调用方: {}", config.email);
    info!(
        "⏱️ 链路预算: {} 秒 (安全余量 {} 秒)",
        config.chain_budget_secs, config.safety_margin_secs
    );
    info!("🤖 模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

/// 打印链路最终统计
pub fn log_chain_summary(report: &ChainReport) {
    let icon = match report.status {
        ChainStatus::Done => "✅",
        ChainStatus::TimedOut => "⏱️",
        _ => "❌",
    };

    info!("\n{}", "=".repeat(60));
    info!("📊 题目链处理完成统计");
    info!("会话: {}", report.session_id);
    info!("开始时间: {}", report.started_at.format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("{} 状态: {}", icon, report.status);
    info!("📄 处理题目: {} (正确 {})", report.step_count, report.correct_count);
    info!("🔗 最后 URL: {}", report.last_url);
    info!("⏱️ 总耗时: {:.1} 秒", report.elapsed.as_secs_f64());
    if let Some(failure) = &report.failure {
        info!("❌ 失败原因: {}", failure);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
