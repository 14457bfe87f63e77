use serde::{Deserialize, Serialize};

/// 没有识别出任何章节标题时使用的占位章节
pub const UNKNOWN_CHAPTER: &str = "Chương không xác định";

/// 章节中的讲座引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureRef {
    pub title: String,
    pub url: String,
}

/// 章节：连续的一组讲座
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub lectures: Vec<LectureRef>,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lectures: Vec::new(),
        }
    }
}

/// 已归入章节的讲座
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapteredLecture {
    pub title: String,
    pub url: String,
    pub chapter: String,
}

/// 讲座标题中表示章节开头的词（小写）
pub const CHAPTER_MARKERS: [&str; 6] = ["chương", "phần", "module", "unit", "section", "bài"];
