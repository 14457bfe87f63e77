//! 课程页面服务 - 业务能力层
//!
//! 通过 HTTP 获取课程页面，并从 HTML 中解析讲座链接

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, FetchError};
use crate::models::lecture::{LectureRecord, ENTER_CLASS_TITLE};
use crate::services::html::{absolutize, element_text, selector, LECTURE_LINK_SELECTOR};
use crate::services::CookieStore;

/// 从课程 URL 中提取课程 ID（`/courses/<id>/...`）
pub fn extract_course_id(course_url: &str) -> Option<String> {
    let url = Url::parse(course_url).ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some("courses"), Some(id)) => Some(id.to_string()),
        _ => None,
    }
}

/// 从课程页面 HTML 中解析讲座列表
///
/// 跳过"Vào học"按钮，位置从 1 开始连续编号
pub fn parse_lecture_links(
    html: &str,
    site_root: &str,
    course_url: &str,
) -> AppResult<Vec<LectureRecord>> {
    let document = Html::parse_document(html);
    let link_selector = selector(LECTURE_LINK_SELECTOR)?;
    let child_selector = selector("span, div")?;

    let mut lectures = Vec::new();
    for link in document.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let position = lectures.len() + 1;

        let mut title = element_text(&link);
        if title.is_empty() {
            title = link
                .select(&child_selector)
                .next()
                .map(|child| element_text(&child))
                .unwrap_or_default();
        }
        if title.is_empty() {
            title = format!("Bài giảng {}", position);
        }
        if title == ENTER_CLASS_TITLE {
            continue;
        }

        lectures.push(LectureRecord::new(
            position,
            absolutize(href, site_root),
            title,
            course_url,
        ));
    }

    Ok(lectures)
}

/// 课程页面服务
pub struct CoursePage {
    client: Client,
    site_root: String,
}

impl CoursePage {
    /// 创建课程页面服务（带 cookies 的 HTTP 客户端）
    pub fn new(config: &Config, cookies: &CookieStore) -> AppResult<Self> {
        let site_root = config.site_root().to_string();
        let root_url = Url::parse(&site_root).map_err(|_| {
            AppError::Config(ConfigError::InvalidCourseUrl {
                url: site_root.clone(),
            })
        })?;

        let jar = Arc::new(Jar::default());
        cookies.fill_jar(&jar, &root_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_provider(jar)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::request_failed(&site_root, e))?;

        Ok(Self { client, site_root })
    }

    /// 获取页面 HTML
    pub async fn fetch_html(&self, url: &str) -> AppResult<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::request_failed(url, e))
    }

    /// 通过 HTTP 获取讲座列表
    pub async fn list_lectures(&self, course_url: &str) -> AppResult<Vec<LectureRecord>> {
        info!("🌐 正在通过 HTTP 获取讲座列表...");
        let html = self.fetch_html(course_url).await?;
        let lectures = parse_lecture_links(&html, &self.site_root, course_url)?;
        debug!("HTTP 页面中找到 {} 个讲座链接", lectures.len());
        Ok(lectures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURSE_URL: &str = "https://havamath.vn/courses/toan-9";

    #[test]
    fn test_extract_course_id() {
        assert_eq!(extract_course_id(COURSE_URL).as_deref(), Some("toan-9"));
        assert_eq!(
            extract_course_id("https://havamath.vn/courses/toan-9/learn/abc?tab=1").as_deref(),
            Some("toan-9")
        );
        assert_eq!(extract_course_id("https://havamath.vn/courses/"), None);
        assert_eq!(extract_course_id("https://havamath.vn/blog/toan-9"), None);
        assert_eq!(extract_course_id("not a url"), None);
    }

    #[test]
    fn test_parse_lecture_links() {
        let html = r#"
            <html><body>
              <a href="/courses/toan-9/learn/1">Vào học</a>
              <ul>
                <li><a href="/courses/toan-9/learn/2">  Bài 1. Căn bậc hai </a></li>
                <li><a href="courses/toan-9/learn/3"><img src="x.png"></a></li>
                <li><a href="https://havamath.vn/courses/toan-9/learn/4"><span> </span></a></li>
                <li><a href="/about">Giới thiệu</a></li>
              </ul>
            </body></html>
        "#;

        let lectures = parse_lecture_links(html, "https://havamath.vn", COURSE_URL).unwrap();
        assert_eq!(lectures.len(), 3);

        assert_eq!(lectures[0].position, 1);
        assert_eq!(lectures[0].lecture_title, "Bài 1. Căn bậc hai");
        assert_eq!(lectures[0].lecture_link, "https://havamath.vn/courses/toan-9/learn/2");
        assert_eq!(lectures[0].origin_url, COURSE_URL);

        assert_eq!(lectures[1].lecture_title, "Bài giảng 2");
        assert_eq!(lectures[1].lecture_link, "https://havamath.vn/courses/toan-9/learn/3");

        assert_eq!(lectures[2].position, 3);
        assert_eq!(lectures[2].lecture_title, "Bài giảng 3");
    }

    #[test]
    fn test_positions_are_monotonic() {
        let html = (1..=5)
            .map(|i| format!("<a href='/learn/{}'>Bài {}</a><a href='/learn/x{}'>Vào học</a>", i, i, i))
            .collect::<String>();
        let lectures = parse_lecture_links(&html, "https://havamath.vn", COURSE_URL).unwrap();
        let positions: Vec<_> = lectures.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }
}
