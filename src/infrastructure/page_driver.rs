//! 页面驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 读取 / 执行 JS"的能力

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppError, AppResult, BrowserError};

/// 轮询元素时的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 页面驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 goto / content / eval 能力
/// - 不认识 Lecture / Chapter
/// - 不处理业务流程
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    /// 创建新的页面驱动
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航到指定 URL 并等待加载完成
    pub async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    /// 刷新当前页面
    pub async fn reload(&self) -> AppResult<()> {
        self.page.reload().await?;
        Ok(())
    }

    /// 当前页面的完整 HTML
    pub async fn content(&self) -> AppResult<String> {
        Ok(self.page.content().await?)
    }

    /// 设置 cookies（作用于当前页面所在的域）
    pub async fn set_cookies(&self, cookies: Vec<CookieParam>) -> AppResult<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        self.page.set_cookies(cookies).await?;
        Ok(())
    }

    /// 等待匹配选择器的元素出现
    ///
    /// # 返回
    /// 超时前找到返回 `true`，超时返回 `false`
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                debug!("等待 '{}' 超时 ({:?})", selector, timeout);
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        result.into_value().map_err(|e| {
            AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })
        })
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value).map_err(|e| {
            AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })
        })
    }

    /// 关闭页面
    pub async fn close(self) -> AppResult<()> {
        self.page.close().await?;
        Ok(())
    }
}
