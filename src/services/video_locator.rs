//! 视频定位服务 - 业务能力层
//!
//! 只负责"在一个讲座页面里找到视频"这一能力，不关心流程。
//! 按顺序尝试，第一个命中即返回：
//!
//! 1. YouTube iframe
//! 2. `data-youtube-id` 属性
//! 3. YouTube 链接
//! 4. 页面源码中的 YouTube 模式
//! 5. 页面内 JS 扫描所有属性
//! 6. `<video>` / `<source>` 直链（mp4 / m3u8）
//! 7. 页面源码中的直链模式
//! 8. 同源 iframe 内的 `<video>`

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::services::html::selector;

/// 视频来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// YouTube 视频 ID（11 位）
    YouTube(String),
    /// 视频文件直链
    Direct(String),
}

impl VideoSource {
    /// 导出时使用的 URL
    pub fn url(&self) -> String {
        match self {
            VideoSource::YouTube(id) => format!("https://youtu.be/{}", id),
            VideoSource::Direct(url) => url.clone(),
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// 命中的定位方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    YoutubeIframe,
    DataYoutubeId,
    YoutubeLink,
    YoutubePageSource,
    AttributeScan,
    DirectElement,
    DirectPageSource,
    FrameVideo,
}

impl LocateStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LocateStrategy::YoutubeIframe => "YouTube iframe",
            LocateStrategy::DataYoutubeId => "data-youtube-id 属性",
            LocateStrategy::YoutubeLink => "YouTube 链接",
            LocateStrategy::YoutubePageSource => "页面源码 (YouTube)",
            LocateStrategy::AttributeScan => "JS 属性扫描",
            LocateStrategy::DirectElement => "video/source 元素",
            LocateStrategy::DirectPageSource => "页面源码 (直链)",
            LocateStrategy::FrameVideo => "iframe 内的 video",
        }
    }
}

const ID: &str = "[a-zA-Z0-9_-]{11}";

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("视频定位正则无效"))
        .collect()
}

/// 从 URL / 属性值中提取 YouTube ID 的模式
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)({ID})"),
        format!(r#"youtube_id["\s:=]+["']({ID})"#),
        format!(r#"youtubeId["\s:=]+["']({ID})"#),
        format!(r#"videoId["\s:=]+["']({ID})"#),
        format!(r#"video-id="({ID})""#),
        format!(r#"data-video-id="({ID})""#),
        format!(r"youtube\.com/v/({ID})"),
        format!(r"youtube\.com/vi/({ID})"),
        format!(r"youtu\.be/({ID})"),
        format!(r#"data-youtube-id="({ID})""#),
    ])
});

/// 页面源码中的 YouTube 模式
static SOURCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        format!(r"https://youtu\.be/({ID})"),
        format!(r"https://www\.youtube\.com/watch\?v=({ID})"),
        format!(r"https://www\.youtube\.com/embed/({ID})"),
        format!(r"youtube\.com/embed/({ID})"),
        format!(r#"youtube_id["\s:=]+["']({ID})"#),
        format!(r#"youtubeId["\s:=]+["']({ID})"#),
        format!(r#"videoId["\s:=]+["']({ID})"#),
        format!(r#"video-id="({ID})""#),
        format!(r#"data-video-id="({ID})""#),
        format!(r"youtube\.com/v/({ID})"),
        format!(r"youtube\.com/vi/({ID})"),
        format!(r"/embed/({ID})"),
        format!(r"youtu\.be/({ID})"),
        format!(r#"data-youtube-id="({ID})""#),
    ])
});

/// 页面源码中的视频直链模式
static DIRECT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r#"(https?://[^"'\s]+\.mp4)"#.to_string(),
        r#"(https?://[^"'\s]+\.m3u8)"#.to_string(),
        r#"videoUrl["']\s*:\s*["']([^"']+)"#.to_string(),
        r#"videoSrc["']\s*:\s*["']([^"']+)"#.to_string(),
        r#"playbackUrl["']\s*:\s*["']([^"']+)"#.to_string(),
        r#"src=["'](https?://[^"'\s]+\.mp4)"#.to_string(),
        r#"src=["'](https?://[^"'\s]+\.m3u8)"#.to_string(),
    ])
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{ID}$")).expect("视频定位正则无效"));

/// 从 URL 或属性值中提取 YouTube ID
///
/// 依次尝试已知的 URL / 属性模式；整个值本身就是 11 位 ID 时直接返回
pub fn extract_youtube_id(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| BARE_ID.is_match(text).then(|| text.to_string()))
}

/// 是否是视频文件直链
fn is_direct_video(src: &str) -> bool {
    src.ends_with(".mp4") || src.contains(".m3u8")
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 方法 1-3：在 DOM 中查找 YouTube
pub fn find_youtube_in_dom(html: &str) -> AppResult<Option<(VideoSource, LocateStrategy)>> {
    let document = Html::parse_document(html);

    let iframe = selector("iframe[src*='youtube']")?;
    for element in document.select(&iframe) {
        let src = element.value().attr("src").unwrap_or_default();
        if src.contains("youtube.com") {
            if let Some(id) = extract_youtube_id(src) {
                return Ok(Some((VideoSource::YouTube(id), LocateStrategy::YoutubeIframe)));
            }
        }
    }

    let data_id = selector("[data-youtube-id]")?;
    for element in document.select(&data_id) {
        let id = element.value().attr("data-youtube-id").unwrap_or_default().trim();
        if !id.is_empty() {
            return Ok(Some((VideoSource::YouTube(id.to_string()), LocateStrategy::DataYoutubeId)));
        }
    }

    let links = selector("a[href*='youtube.com'], a[href*='youtu.be']")?;
    for element in document.select(&links) {
        if let Some(id) = element.value().attr("href").and_then(extract_youtube_id) {
            return Ok(Some((VideoSource::YouTube(id), LocateStrategy::YoutubeLink)));
        }
    }

    Ok(None)
}

/// 方法 4：在页面源码中查找 YouTube
pub fn find_youtube_in_source(page_source: &str) -> Option<VideoSource> {
    if !page_source.contains("youtube.com/embed") && !page_source.contains("youtu.be") {
        return None;
    }
    first_capture(&SOURCE_PATTERNS, page_source).map(VideoSource::YouTube)
}

/// 方法 6-7：查找视频文件直链
pub fn find_direct_video(html: &str) -> AppResult<Option<(VideoSource, LocateStrategy)>> {
    let document = Html::parse_document(html);

    for css in ["video[src]", "source[src]"] {
        let sel = selector(css)?;
        for element in document.select(&sel) {
            let src = element.value().attr("src").unwrap_or_default();
            if is_direct_video(src) {
                return Ok(Some((
                    VideoSource::Direct(src.to_string()),
                    LocateStrategy::DirectElement,
                )));
            }
        }
    }

    Ok(first_capture(&DIRECT_PATTERNS, html)
        .map(|url| (VideoSource::Direct(url), LocateStrategy::DirectPageSource)))
}

/// 视频定位服务
///
/// 不持有页面，每次调用时由流程层传入 PageDriver
#[derive(Debug, Default)]
pub struct VideoLocator;

impl VideoLocator {
    pub fn new() -> Self {
        Self
    }

    /// 在当前页面中定位视频
    pub async fn locate(
        &self,
        driver: &PageDriver,
    ) -> AppResult<Option<(VideoSource, LocateStrategy)>> {
        let html = driver.content().await?;

        if let Some(found) = find_youtube_in_dom(&html)? {
            return Ok(Some(found));
        }
        if let Some(source) = find_youtube_in_source(&html) {
            return Ok(Some((source, LocateStrategy::YoutubePageSource)));
        }

        match self.scan_attributes(driver).await {
            Ok(Some(id)) => {
                return Ok(Some((VideoSource::YouTube(id), LocateStrategy::AttributeScan)))
            }
            Ok(None) => {}
            Err(e) => debug!("JS 属性扫描失败: {}", e),
        }

        if let Some(found) = find_direct_video(&html)? {
            return Ok(Some(found));
        }

        match driver.eval_as::<String>(FRAME_VIDEO_SCRIPT).await {
            Ok(src) if !src.is_empty() => {
                Ok(Some((VideoSource::Direct(src), LocateStrategy::FrameVideo)))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("iframe 视频查找失败: {}", e);
                Ok(None)
            }
        }
    }

    /// 方法 5：扫描页面上所有元素的属性值
    async fn scan_attributes(&self, driver: &PageDriver) -> AppResult<Option<String>> {
        let values: Vec<String> = driver.eval_as(ATTRIBUTE_SCAN_SCRIPT).await?;
        debug!("JS 属性扫描得到 {} 个候选值", values.len());
        Ok(values.iter().find_map(|v| extract_youtube_id(v)))
    }
}

/// 收集含 youtube 的属性值，以及名称含 video / youtube 的属性上的 11 位值
const ATTRIBUTE_SCAN_SCRIPT: &str = r#"
(() => {
    const values = [];
    for (const el of document.querySelectorAll('*')) {
        for (const attr of Array.from(el.attributes || [])) {
            const value = attr.value || '';
            if (!value) continue;
            const name = attr.name.toLowerCase();
            if (value.includes('youtube.com') || value.includes('youtu.be')) {
                values.push(value);
            } else if ((name.includes('video') || name.includes('youtube')) &&
                       /^[a-zA-Z0-9_-]{11}$/.test(value)) {
                values.push(value);
            }
        }
    }
    return values;
})()
"#;

/// 在同源 iframe（src 含 player / video）中查找 `<video>` 的 src
const FRAME_VIDEO_SCRIPT: &str = r#"
(() => {
    for (const frame of document.querySelectorAll('iframe')) {
        const src = frame.getAttribute('src') || '';
        if (!src.includes('player') && !src.includes('video')) continue;
        try {
            const doc = frame.contentDocument;
            if (!doc) continue;
            for (const video of doc.querySelectorAll('video')) {
                const s = video.currentSrc || video.getAttribute('src');
                if (s) return s;
            }
        } catch (e) {
            // 跨域 iframe
        }
    }
    return '';
})()
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_youtube_id_from_urls() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"), id);
        assert_eq!(extract_youtube_id("https://youtu.be/dQw4w9WgXcQ"), id);
        assert_eq!(extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"), id);
        assert_eq!(extract_youtube_id("https://youtube.com/vi/dQw4w9WgXcQ/0.jpg"), id);
        assert_eq!(extract_youtube_id(r#"{"videoId": "dQw4w9WgXcQ"}"#), id);
    }

    #[test]
    fn test_extract_youtube_id_bare_and_invalid() {
        assert_eq!(extract_youtube_id("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(extract_youtube_id("dQw4w9WgXc"), None);
        assert_eq!(extract_youtube_id("https://vimeo.com/123456"), None);
        assert_eq!(extract_youtube_id(""), None);
    }

    #[test]
    fn test_dom_strategies_in_order() {
        let html = r#"
            <a href="https://youtu.be/LINK0000000">xem</a>
            <div data-youtube-id="DATA0000000"></div>
            <iframe src="https://www.youtube.com/embed/IFRAME00000?autoplay=1"></iframe>
        "#;
        let (source, strategy) = find_youtube_in_dom(html).unwrap().unwrap();
        assert_eq!(source, VideoSource::YouTube("IFRAME00000".to_string()));
        assert_eq!(strategy, LocateStrategy::YoutubeIframe);

        let html = r#"<a href="https://youtu.be/LINK0000000">xem</a><div data-youtube-id="DATA0000000"></div>"#;
        let (source, strategy) = find_youtube_in_dom(html).unwrap().unwrap();
        assert_eq!(source.url(), "https://youtu.be/DATA0000000");
        assert_eq!(strategy, LocateStrategy::DataYoutubeId);

        let html = r#"<a href="https://www.youtube.com/watch?v=LINK0000000">xem</a>"#;
        let (_, strategy) = find_youtube_in_dom(html).unwrap().unwrap();
        assert_eq!(strategy, LocateStrategy::YoutubeLink);
    }

    #[test]
    fn test_page_source_requires_youtube_marker() {
        let script = r#"<script>var player = {"youtubeId": "abcdefghijk"};</script>"#;
        assert_eq!(find_youtube_in_source(script), None);

        let script = r#"<script>var p = {"youtubeId": "abcdefghijk"}; // youtu.be</script>"#;
        assert_eq!(
            find_youtube_in_source(script),
            Some(VideoSource::YouTube("abcdefghijk".to_string()))
        );
    }

    #[test]
    fn test_direct_video() {
        let html = r#"<video><source src="https://cdn.havamath.vn/v/1/index.m3u8"></video>"#;
        let (source, strategy) = find_direct_video(html).unwrap().unwrap();
        assert_eq!(source, VideoSource::Direct("https://cdn.havamath.vn/v/1/index.m3u8".into()));
        assert_eq!(strategy, LocateStrategy::DirectElement);

        let html = r#"<script>window.__DATA__ = {"playbackUrl": "https://cdn.havamath.vn/p/2"}</script>"#;
        let (source, strategy) = find_direct_video(html).unwrap().unwrap();
        assert_eq!(source.url(), "https://cdn.havamath.vn/p/2");
        assert_eq!(strategy, LocateStrategy::DirectPageSource);

        assert!(find_direct_video("<p>no video</p>").unwrap().is_none());
    }

    #[test]
    fn test_video_element_without_media_extension_is_skipped() {
        let html = r#"<video src="blob:https://havamath.vn/123"></video><p>https://cdn.vn/a.mp4</p>"#;
        let (source, strategy) = find_direct_video(html).unwrap().unwrap();
        assert_eq!(source.url(), "https://cdn.vn/a.mp4");
        assert_eq!(strategy, LocateStrategy::DirectPageSource);
    }
}
