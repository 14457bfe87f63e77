//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数
use std::path::Path;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::VideoStats;

/// 初始化日志
///
/// 默认 `info`；`quiet` 时只输出警告，`debug` 时输出调试信息。
/// 设置了 `RUST_LOG` 时以环境变量为准。
pub fn init(config: &Config) {
    let level = default_level(config);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,havamath_extractor={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn default_level(config: &Config) -> &'static str {
    if config.debug {
        "debug"
    } else if config.quiet {
        "warn"
    } else {
        "info"
    }
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - Havamath 讲座视频提取");
    info!("📊 worker 数量: {}", config.worker_count());
    info!("⏱️ 页面等待时间: {} 秒", config.wait_time_secs);
    if let Some(port) = config.browser_debug_port {
        info!("🔌 连接已有浏览器 (端口: {})", port);
    } else if config.reuse_browser {
        info!("♻️ 所有 worker 共用一个浏览器");
    }
    info!("{}", "=".repeat(60));
}

/// 记录视频提取开始信息
///
/// # 参数
/// - `total`: 讲座总数
/// - `workers`: worker 数量
/// - `shared`: 是否共用浏览器
pub fn log_extraction_start(total: usize, workers: usize, shared: bool) {
    info!("\n{}", "─".repeat(60));
    info!("🎬 开始提取 {} 个讲座的视频", total);
    info!(
        "📋 {} 个 worker{}",
        workers,
        if shared { "（共用浏览器，每个 worker 一个标签页）" } else { "（每个 worker 一个浏览器）" }
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 视频提取统计（跳过视频提取时为 `None`）
/// - `saved`: 导出的讲座数量
/// - `output`: 输出文件路径
/// - `elapsed`: 总耗时
pub fn print_final_stats(stats: Option<&VideoStats>, saved: usize, output: &Path, elapsed: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {} (耗时 {:.1} 秒)",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        elapsed.as_secs_f64()
    );
    info!("{}", "=".repeat(60));
    info!("📚 讲座数量: {}", saved);
    if let Some(stats) = stats {
        info!("✅ 有视频: {}/{}", stats.with_video(), stats.total);
        info!("  🆕 新找到: {}", stats.found);
        info!("  ⏭️ 已有链接: {}", stats.already_present);
        info!("⚠️ 未找到视频: {}", stats.not_found);
        info!("🔗 没有链接: {}", stats.no_link);
        info!("❌ 失败: {}", stats.failed);
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
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
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Căn bậc hai", 20), "Căn bậc hai");
        assert_eq!(truncate_text("Căn bậc hai", 3), "Căn...");
    }

    #[test]
    fn test_default_level() {
        let mut config = Config::default();
        assert_eq!(default_level(&config), "info");
        config.quiet = true;
        assert_eq!(default_level(&config), "warn");
        config.debug = true;
        assert_eq!(default_level(&config), "debug");
    }
}
