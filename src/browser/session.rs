//! 浏览器会话
//!
//! 每个 worker 持有一个会话：要么是自己启动的浏览器，要么是共享浏览器中的一个标签页

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{connect_to_browser, launch_browser};
use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::PageDriver;
use crate::services::CookieStore;

/// 多个会话共用的浏览器
pub struct SharedBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 连接的是外部浏览器（结束时不关闭它）
    external: bool,
}

impl SharedBrowser {
    /// 根据配置连接已有浏览器或启动新浏览器
    pub async fn open(config: &Config) -> AppResult<Arc<Self>> {
        let (browser, handler, external) = match config.browser_debug_port {
            Some(port) => {
                let (browser, handler) = connect_to_browser(port).await?;
                (browser, handler, true)
            }
            None => {
                let (browser, handler) = launch_browser(config).await?;
                (browser, handler, false)
            }
        };
        Ok(Arc::new(Self {
            browser,
            handler,
            external,
        }))
    }

    /// 关闭浏览器（外部浏览器只断开事件处理）
    pub async fn shutdown(self) {
        let Self {
            mut browser,
            handler,
            external,
        } = self;
        if !external {
            close_browser(&mut browser).await;
        }
        handler.abort();
    }
}

enum Backing {
    /// 会话自己启动的浏览器
    Owned {
        browser: Browser,
        handler: JoinHandle<()>,
    },
    /// 共享浏览器中的标签页
    Tab(Arc<SharedBrowser>),
}

/// 浏览器会话
pub struct BrowserSession {
    label: String,
    driver: PageDriver,
    backing: Backing,
}

impl BrowserSession {
    /// 打开会话
    ///
    /// # 参数
    /// - `label`: 会话名称（仅用于日志）
    /// - `shared`: 共享浏览器；为 `None` 时启动独立浏览器
    /// - `cookies`: 打开后写入的 cookies
    pub async fn open(
        label: impl Into<String>,
        config: &Config,
        shared: Option<Arc<SharedBrowser>>,
        cookies: &CookieStore,
    ) -> AppResult<Self> {
        let label = label.into();

        let (page, backing) = match shared {
            Some(shared) => {
                let page = shared
                    .browser
                    .new_page("about:blank")
                    .await
                    .map_err(page_creation_failed)?;
                (page, Backing::Tab(shared))
            }
            None => {
                let (browser, handler) = launch_browser(config).await?;
                let page = browser
                    .new_page("about:blank")
                    .await
                    .map_err(page_creation_failed)?;
                (page, Backing::Owned { browser, handler })
            }
        };

        let session = Self {
            label,
            driver: PageDriver::new(page),
            backing,
        };

        if !cookies.is_empty() {
            session.load_cookies(config.site_root(), cookies).await?;
        }

        debug!("[{}] 会话已就绪", session.label);
        Ok(session)
    }

    /// 页面驱动
    pub fn driver(&self) -> &PageDriver {
        &self.driver
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 写入 cookies：先访问站点根，再设置 cookies 并刷新
    async fn load_cookies(&self, site_root: &str, cookies: &CookieStore) -> AppResult<()> {
        self.driver.goto(site_root).await?;
        sleep(Duration::from_secs(2)).await;

        self.driver.set_cookies(cookies.to_cdp_params()).await?;
        self.driver.reload().await?;
        sleep(Duration::from_secs(1)).await;

        info!("[{}] 🍪 已写入 {} 个 cookies", self.label, cookies.len());
        Ok(())
    }

    /// 关闭会话：标签页只关闭页面，独立浏览器整体关闭
    pub async fn close(self) {
        let Self {
            label,
            driver,
            backing,
        } = self;

        if let Err(e) = driver.close().await {
            debug!("[{}] 关闭页面失败: {}", label, e);
        }

        if let Backing::Owned {
            mut browser,
            handler,
        } = backing
        {
            close_browser(&mut browser).await;
            handler.abort();
        }
        debug!("[{}] 会话已关闭", label);
    }
}

fn page_creation_failed(e: chromiumoxide::error::CdpError) -> AppError {
    AppError::Browser(BrowserError::PageCreationFailed {
        source: Box::new(e),
    })
}

async fn close_browser(browser: &mut Browser) {
    if let Err(e) = browser.close().await {
        warn!("⚠️ 关闭浏览器失败: {}", e);
        return;
    }
    if let Err(e) = browser.wait().await {
        debug!("等待浏览器进程退出失败: {}", e);
    }
}
