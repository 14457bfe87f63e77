use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

/// 启动浏览器并在后台处理浏览器事件
///
/// 返回浏览器和事件处理任务的句柄，浏览器关闭后句柄自动结束
pub async fn launch_browser(config: &Config) -> AppResult<(Browser, JoinHandle<()>)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if config.headless { "无头模式" } else { "窗口模式" }
    );

    let browser_config = build_browser_config(config)?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::browser_launch_failed(e)
    })?;
    debug!("浏览器启动成功");

    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    Ok((browser, handle))
}

fn build_browser_config(config: &Config) -> AppResult<BrowserConfig> {
    let mut builder = BrowserConfig::builder();

    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(path));
    }

    builder
        .window_size(1920, 1080)
        .args(vec![
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-notifications",
            "--mute-audio",
            "--disable-logging",
            "--log-level=3",
        ])
        .build()
        .map_err(|message| {
            error!("配置浏览器失败: {}", message);
            AppError::Browser(BrowserError::ConfigurationFailed { message })
        })
}
