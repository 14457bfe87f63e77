//! 章节分类服务 - 业务能力层
//!
//! 三种启发式方法，按顺序尝试：
//! 1. 按文档顺序遍历标题元素和讲座链接（HTML）
//! 2. 在页面内执行同样的分析（JS）
//! 3. 根据讲座标题的编号模式分类

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::models::chapter::{
    Chapter, ChapteredLecture, LectureRef, CHAPTER_MARKERS, UNKNOWN_CHAPTER,
};
use crate::models::lecture::{LectureRecord, ENTER_CLASS_TITLE, UNCLASSIFIED_CHAPTER};
use crate::services::html::{absolutize, element_text, is_lecture_link};

/// 章节标题的最大长度（字符）
const MAX_TITLE_CHARS: usize = 200;

/// 章节容器 class 中的关键字
const CHAPTER_CLASS_KEYWORDS: [&str; 4] = ["chapter", "section", "module", "course-section"];

/// 讲座标题中的章节模式，如 "Chương 2 ..."、"3. ..."
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let words = CHAPTER_MARKERS.join("|");
    Regex::new(&format!(r"(?i)^({})\s+\d+|^\d+\.\s+", words)).expect("章节标题正则无效")
});

/// 章节分析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterOutline {
    pub chapters: Vec<Chapter>,
    pub all_lectures: Vec<ChapteredLecture>,
}

impl ChapterOutline {
    pub fn is_empty(&self) -> bool {
        self.all_lectures.is_empty()
    }

    /// 是否只有占位章节（页面上没有可识别的章节标题）
    pub fn has_only_placeholder(&self) -> bool {
        self.chapters.len() == 1 && self.chapters[0].title == UNKNOWN_CHAPTER
    }

    /// 转换为讲座记录（位置从 1 开始）
    pub fn into_records(self, course_url: &str) -> Vec<LectureRecord> {
        self.all_lectures
            .into_iter()
            .enumerate()
            .map(|(i, lecture)| {
                LectureRecord::new(i + 1, lecture.url, lecture.title, course_url)
                    .with_chapter(lecture.chapter)
            })
            .collect()
    }
}

/// 方法 1：按文档顺序遍历
///
/// 标题元素（h1-h5、class 含 chapter/section/module 的 div）开启新章节，
/// 之后出现的讲座链接归入当前章节；没有讲座的章节会被丢弃
pub fn classify_by_headings(html: &str, site_root: &str) -> ChapterOutline {
    let document = Html::parse_document(html);

    let mut chapters: Vec<Chapter> = Vec::new();
    let mut current = Chapter::new(UNKNOWN_CHAPTER);
    let mut all_lectures = Vec::new();

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if inside_lecture_link(&element) {
            continue;
        }

        if is_lecture_link(&element) {
            let title = element_text(&element);
            if title.is_empty() || title == ENTER_CLASS_TITLE {
                continue;
            }
            let url = absolutize(element.value().attr("href").unwrap_or_default(), site_root);
            current.lectures.push(LectureRef {
                title: title.clone(),
                url: url.clone(),
            });
            all_lectures.push(ChapteredLecture {
                title,
                url,
                chapter: current.title.clone(),
            });
            continue;
        }

        if let Some(title) = chapter_title(&element) {
            debug!("章节候选: {}", title);
            let previous = std::mem::replace(&mut current, Chapter::new(title));
            if !previous.lectures.is_empty() {
                chapters.push(previous);
            }
        }
    }

    if !current.lectures.is_empty() {
        chapters.push(current);
    }

    ChapterOutline {
        chapters,
        all_lectures,
    }
}

/// 元素作为章节标题时的文本
fn chapter_title(element: &ElementRef) -> Option<String> {
    let name = element.value().name();
    let is_heading = matches!(name, "h1" | "h2" | "h3" | "h4" | "h5");
    let is_chapter_div = name == "div" && {
        let class = element.value().attr("class").unwrap_or_default().to_lowercase();
        CHAPTER_CLASS_KEYWORDS.iter().any(|k| class.contains(k))
    };
    if !is_heading && !is_chapter_div {
        return None;
    }

    // 包含讲座链接的 div 是章节容器，不是标题
    if is_chapter_div && element.descendants().filter_map(ElementRef::wrap).any(|e| is_lecture_link(&e)) {
        return None;
    }

    let text = element_text(element);
    if text.is_empty() || text.chars().count() >= MAX_TITLE_CHARS {
        return None;
    }
    Some(text)
}

fn inside_lecture_link(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_lecture_link(&ancestor))
}

/// 方法 2：在页面内执行章节分析
pub async fn classify_in_page(driver: &PageDriver) -> AppResult<ChapterOutline> {
    driver.eval_as::<ChapterOutline>(IN_PAGE_OUTLINE_SCRIPT).await
}

const IN_PAGE_OUTLINE_SCRIPT: &str = r#"
(() => {
    const headingSelector = 'h1, h2, h3, h4, h5, div.chapter-heading, div.section-heading, ' +
        'div[class*="chapter-title"], div[class*="section-title"]';
    const isLecture = el => el.tagName === 'A' && (el.getAttribute('href') || '').includes('/learn/');

    const chapters = [];
    const allLectures = [];
    let current = { title: "Chương không xác định", lectures: [] };

    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT);
    for (let el = walker.currentNode; el; el = walker.nextNode()) {
        if (el.closest && el.parentElement && el.parentElement.closest('a[href*="/learn/"]')) {
            continue;
        }
        if (isLecture(el)) {
            const title = (el.textContent || '').trim().replace(/\s+/g, ' ');
            if (title && title !== "Vào học") {
                current.lectures.push({ title: title, url: el.href });
                allLectures.push({ title: title, url: el.href, chapter: current.title });
            }
            continue;
        }
        if (el.matches && el.matches(headingSelector)) {
            const text = (el.textContent || '').trim().replace(/\s+/g, ' ');
            if (text && text.length < 200) {
                if (current.lectures.length > 0) {
                    chapters.push(current);
                }
                current = { title: text, lectures: [] };
            }
        }
    }
    if (current.lectures.length > 0) {
        chapters.push(current);
    }
    return { chapters: chapters, allLectures: allLectures };
})()
"#;

/// 方法 3：根据标题编号分类
///
/// 匹配模式的标题成为当前章节（自身也归入该章节），
/// 第一次匹配之前的讲座标记为"Chưa phân loại"
pub fn classify_by_title(lectures: &mut [LectureRecord]) {
    let mut current = UNCLASSIFIED_CHAPTER.to_string();

    for lecture in lectures.iter_mut() {
        if TITLE_PATTERN.is_match(&lecture.lecture_title) {
            debug!("标题识别为章节: {}", lecture.lecture_title);
            current = lecture.lecture_title.clone();
        }
        lecture.chapter = Some(current.clone());
    }
}

/// 从讲座记录汇总章节（用于日志统计）
pub fn chapters_of(lectures: &[LectureRecord]) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    for lecture in lectures {
        let title = lecture.chapter.as_deref().unwrap_or(UNCLASSIFIED_CHAPTER);
        let lecture_ref = LectureRef {
            title: lecture.lecture_title.clone(),
            url: lecture.lecture_link.clone(),
        };
        match chapters.iter_mut().find(|c| c.title == title) {
            Some(chapter) => chapter.lectures.push(lecture_ref),
            None => {
                let mut chapter = Chapter::new(title);
                chapter.lectures.push(lecture_ref);
                chapters.push(chapter);
            }
        }
    }
    chapters
}
