//! 课程处理器 - 编排层
//!
//! ## 职责
//!
//! 获取一个课程的讲座列表，并给每个讲座标上章节。
//!
//! ## 获取顺序
//!
//! 1. 浏览器打开课程页面，按章节标题分析（HTML → 页面内 JS）
//! 2. HTTP 直接获取页面（带 cookies）
//! 3. 浏览器重新打开页面，只解析讲座链接
//!
//! 方法 2、3 得到的讲座按标题编号分类章节。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::{BrowserSession, SharedBrowser};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::lecture::LectureRecord;
use crate::services::chapter_classifier::{
    chapters_of, classify_by_headings, classify_by_title, classify_in_page,
};
use crate::services::course_page::parse_lecture_links;
use crate::services::html::LECTURE_LINK_SELECTOR;
use crate::services::{CookieStore, CoursePage};

/// 获取课程的讲座列表（含章节）
///
/// 所有方法都没有结果时返回空列表，由调用方决定如何处理
pub async fn scrape_lecture_list(
    config: &Config,
    cookies: &CookieStore,
    shared: Option<Arc<SharedBrowser>>,
    course_url: &str,
) -> AppResult<Vec<LectureRecord>> {
    info!("📋 正在获取讲座列表: {}", course_url);

    let session = match BrowserSession::open("列表", config, shared, cookies).await {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("⚠️ 无法打开浏览器会话，改用 HTTP 获取: {}", e);
            None
        }
    };

    let mut lectures = Vec::new();

    // ========== 方法 1: 浏览器 + 章节分析 ==========
    if let Some(session) = &session {
        match list_with_chapters(session, config, course_url).await {
            Ok(found) if !found.is_empty() => lectures = found,
            Ok(_) => info!("章节分析没有找到讲座，尝试 HTTP 获取..."),
            Err(e) => warn!("⚠️ 章节分析失败: {}", e),
        }
    }

    if lectures.is_empty() {
        // ========== 方法 2: HTTP 获取 ==========
        lectures = match fetch_static(config, cookies, course_url).await {
            Ok(found) => found,
            Err(e) => {
                warn!("⚠️ HTTP 获取讲座列表失败: {}", e);
                Vec::new()
            }
        };

        // ========== 方法 3: 浏览器重新加载 ==========
        if lectures.is_empty() {
            if let Some(session) = &session {
                info!("🔄 通过浏览器重新获取讲座列表...");
                match list_with_browser(session, config, course_url).await {
                    Ok(found) => lectures = found,
                    Err(e) => warn!("⚠️ 浏览器获取讲座列表失败: {}", e),
                }
            }
        }

        classify_by_title(&mut lectures);
    }

    if let Some(session) = session {
        session.close().await;
    }

    log_chapters(&lectures);
    Ok(lectures)
}

/// 方法 1：浏览器打开页面后按章节标题分析
async fn list_with_chapters(
    session: &BrowserSession,
    config: &Config,
    course_url: &str,
) -> AppResult<Vec<LectureRecord>> {
    let driver = session.driver();
    open_course_page(session, config, course_url).await?;

    let html = driver.content().await?;
    let mut outline = classify_by_headings(&html, config.site_root());
    debug!(
        "HTML 章节分析: {} 个章节, {} 个讲座",
        outline.chapters.len(),
        outline.all_lectures.len()
    );

    if outline.is_empty() {
        info!("HTML 中没有找到讲座，尝试页面内分析...");
        outline = classify_in_page(driver).await?;
    }

    let only_placeholder = outline.has_only_placeholder();
    let mut lectures = outline.into_records(course_url);
    if only_placeholder {
        debug!("没有识别到章节标题，按讲座标题分类");
        classify_by_title(&mut lectures);
    }
    Ok(lectures)
}

/// 方法 2：HTTP 获取页面并解析
async fn fetch_static(
    config: &Config,
    cookies: &CookieStore,
    course_url: &str,
) -> AppResult<Vec<LectureRecord>> {
    let course_page = CoursePage::new(config, cookies)?;
    course_page.list_lectures(course_url).await
}

/// 方法 3：浏览器重新打开页面，只解析讲座链接
async fn list_with_browser(
    session: &BrowserSession,
    config: &Config,
    course_url: &str,
) -> AppResult<Vec<LectureRecord>> {
    open_course_page(session, config, course_url).await?;
    let html = session.driver().content().await?;
    let lectures = parse_lecture_links(&html, config.site_root(), course_url)?;
    debug!("浏览器页面中找到 {} 个讲座链接", lectures.len());
    Ok(lectures)
}

/// 打开课程页面并等待讲座链接出现（超时只记录日志）
async fn open_course_page(
    session: &BrowserSession,
    config: &Config,
    course_url: &str,
) -> AppResult<()> {
    let driver = session.driver();
    driver.goto(course_url).await?;

    let timeout = Duration::from_secs(config.element_timeout_secs);
    if !driver.wait_for_selector(LECTURE_LINK_SELECTOR, timeout).await {
        warn!(
            "[{}] ⏱️ {} 秒内没有出现讲座链接，继续解析当前页面",
            session.label(),
            config.element_timeout_secs
        );
    }
    Ok(())
}

fn log_chapters(lectures: &[LectureRecord]) {
    let chapters = chapters_of(lectures);
    info!(
        "✓ 找到 {} 个讲座，分为 {} 个章节",
        lectures.len(),
        chapters.len()
    );
    for chapter in &chapters {
        debug!("  📖 {} ({} 个讲座)", chapter.title, chapter.lectures.len());
    }
}
