//! HTML 解析辅助函数

use scraper::{ElementRef, Selector};

use crate::error::{AppError, AppResult};

/// 讲座链接的选择器
pub const LECTURE_LINK_SELECTOR: &str = "a[href*='/learn/']";

/// 解析 CSS 选择器
pub fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::invalid_selector(css, e.to_string()))
}

/// 元素的可见文本（合并空白）
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 是否是讲座链接
pub fn is_lecture_link(element: &ElementRef) -> bool {
    element.value().name() == "a"
        && element
            .value()
            .attr("href")
            .is_some_and(|href| href.contains("/learn/"))
}

/// 把相对链接补全为绝对链接
pub fn absolutize(href: &str, site_root: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", site_root, href)
    } else {
        format!("{}/{}", site_root, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_absolutize() {
        let root = "https://havamath.vn";
        assert_eq!(absolutize("/learn/1", root), "https://havamath.vn/learn/1");
        assert_eq!(absolutize("learn/1", root), "https://havamath.vn/learn/1");
        assert_eq!(absolutize("https://cdn.vn/learn/1", root), "https://cdn.vn/learn/1");
        assert_eq!(absolutize("//cdn.vn/learn/1", root), "https://cdn.vn/learn/1");
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let doc = Html::parse_fragment("<a href='/learn/1'>\n  <span>Bài 1</span>\n  <span>Căn bậc hai</span></a>");
        let sel = selector("a").unwrap();
        let a = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(&a), "Bài 1 Căn bậc hai");
        assert!(is_lecture_link(&a));
    }

    #[test]
    fn test_invalid_selector_is_error() {
        assert!(selector("a[[").is_err());
    }
}
