use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 进入课程的按钮文字，不是真正的讲座
pub const ENTER_CLASS_TITLE: &str = "Vào học";
/// 未分类讲座的章节名称
pub const UNCLASSIFIED_CHAPTER: &str = "Chưa phân loại";
/// 导出文件的表名
pub const TABLE_NAME: &str = "Lecture List";
/// 导出文件的结构版本
pub const SCHEMA_VERSION: &str = "1.0";
/// 讲座列表上限（写入每条记录，与站点导出保持一致）
pub const LECTURE_LIST_LIMIT: u32 = 100;

/// 单个讲座记录（完整结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureRecord {
    #[serde(rename = "Position", default)]
    pub position: usize,
    #[serde(rename = "Lecture Link", default)]
    pub lecture_link: String,
    #[serde(rename = "Lecture Title", default)]
    pub lecture_title: String,
    #[serde(rename = "Extract Date", default)]
    pub extract_date: String,
    #[serde(rename = "Task Link", default)]
    pub task_link: String,
    #[serde(rename = "Origin URL", default)]
    pub origin_url: String,
    #[serde(rename = "Lecture List Limit", default = "default_list_limit")]
    pub lecture_list_limit: u32,
    #[serde(rename = "Chapter", default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(rename = "Video URL", default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

fn default_list_limit() -> u32 {
    LECTURE_LIST_LIMIT
}

impl LectureRecord {
    /// 创建新的讲座记录
    pub fn new(
        position: usize,
        lecture_link: impl Into<String>,
        lecture_title: impl Into<String>,
        origin_url: impl Into<String>,
    ) -> Self {
        Self {
            position,
            lecture_link: lecture_link.into(),
            lecture_title: lecture_title.into(),
            extract_date: iso_now(),
            task_link: String::new(),
            origin_url: origin_url.into(),
            lecture_list_limit: LECTURE_LIST_LIMIT,
            chapter: None,
            video_url: None,
        }
    }

    /// 设置章节
    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }

    /// 是否已经有 YouTube 短链接
    pub fn has_youtube_url(&self) -> bool {
        self.video_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://youtu.be/"))
    }

    /// 是否是"进入课程"按钮
    pub fn is_enter_class(&self) -> bool {
        self.lecture_title == ENTER_CLASS_TITLE
    }
}

/// 讲座列表导出（完整结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureExport {
    pub data: Vec<LectureRecord>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub export_id: String,
    #[serde(default)]
    pub export_created_at: String,
}

fn default_table() -> String {
    TABLE_NAME.to_string()
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl LectureExport {
    /// 创建空导出，`export_id` 形如 `<前缀>-<unix 秒>`
    pub fn new(id_prefix: &str) -> Self {
        Self {
            data: Vec::new(),
            table: TABLE_NAME.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            export_id: format!("{}-{}", id_prefix, chrono::Utc::now().timestamp()),
            export_created_at: iso_now(),
        }
    }

    /// 补齐导入记录中缺失的字段
    ///
    /// 缺少位置时按顺序编号，缺少标题时使用"Bài giảng <位置>"；链接保持原样
    pub fn fill_missing(&mut self) {
        for (i, record) in self.data.iter_mut().enumerate() {
            if record.position == 0 {
                record.position = i + 1;
            }
            if record.lecture_title.trim().is_empty() {
                record.lecture_title = format!("Bài giảng {}", record.position);
            }
        }
    }

    /// 转换为简化结构
    ///
    /// 去掉"Vào học"按钮，并按 (title, videoUrl) 去重，保留首次出现的顺序
    pub fn simplify(&self) -> SimplifiedExport {
        let mut seen = HashSet::new();
        let mut lectures = Vec::new();

        for record in &self.data {
            if record.is_enter_class() {
                continue;
            }

            let video_url = record.video_url.clone().unwrap_or_default();
            let key = (record.lecture_title.clone(), video_url.clone());
            if !seen.insert(key) {
                continue;
            }

            lectures.push(SimplifiedLecture {
                title: record.lecture_title.clone(),
                video_url,
                chapter: record
                    .chapter
                    .clone()
                    .unwrap_or_else(|| UNCLASSIFIED_CHAPTER.to_string()),
            });
        }

        SimplifiedExport { lectures }
    }
}

/// 简化结构中的单个讲座
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedLecture {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "videoUrl", default)]
    pub video_url: String,
    #[serde(default = "default_chapter")]
    pub chapter: String,
}

fn default_chapter() -> String {
    UNCLASSIFIED_CHAPTER.to_string()
}

/// 简化结构导出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedExport {
    pub lectures: Vec<SimplifiedLecture>,
}

impl SimplifiedExport {
    /// 转换回完整结构（导入简化文件时使用）
    pub fn into_full(self, site_root: &str) -> LectureExport {
        let mut export = LectureExport::new("import");
        export.data = self
            .lectures
            .into_iter()
            .enumerate()
            .map(|(i, lecture)| {
                let position = i + 1;
                let title = if lecture.title.is_empty() {
                    format!("Bài giảng {}", position)
                } else {
                    lecture.title
                };
                let mut record = LectureRecord::new(
                    position,
                    format!("{}/unknown/link/{}", site_root, position),
                    title,
                    "",
                )
                .with_chapter(lecture.chapter);
                record.video_url = Some(lecture.video_url);
                record
            })
            .collect();
        export
    }
}

/// 当前时间（ISO 8601，毫秒精度，UTC）
pub fn iso_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: usize, title: &str, video: Option<&str>, chapter: Option<&str>) -> LectureRecord {
        let mut r = LectureRecord::new(
            position,
            format!("https://havamath.vn/learn/{}", position),
            title,
            "https://havamath.vn/courses/toan-9",
        );
        r.video_url = video.map(str::to_string);
        r.chapter = chapter.map(str::to_string);
        r
    }

    #[test]
    fn test_simplify_dedups_and_skips_enter_class() {
        let mut export = LectureExport::new("toan-9");
        export.data = vec![
            record(1, "Vào học", None, None),
            record(2, "Bài 1. Căn bậc hai", Some("https://youtu.be/abcdefghijk"), Some("Chương 1")),
            record(3, "Bài 1. Căn bậc hai", Some("https://youtu.be/abcdefghijk"), Some("Chương 1")),
            record(4, "Bài 1. Căn bậc hai", Some("https://youtu.be/zzzzzzzzzzz"), Some("Chương 1")),
            record(5, "Bài 2. Hằng đẳng thức", None, None),
        ];

        let simplified = export.simplify();
        let titles: Vec<_> = simplified
            .lectures
            .iter()
            .map(|l| (l.title.as_str(), l.video_url.as_str()))
            .collect();

        assert_eq!(
            titles,
            vec![
                ("Bài 1. Căn bậc hai", "https://youtu.be/abcdefghijk"),
                ("Bài 1. Căn bậc hai", "https://youtu.be/zzzzzzzzzzz"),
                ("Bài 2. Hằng đẳng thức", ""),
            ]
        );
        assert_eq!(simplified.lectures[2].chapter, UNCLASSIFIED_CHAPTER);
    }

    #[test]
    fn test_verbose_field_names() {
        let r = record(1, "Bài 1", Some("https://youtu.be/abcdefghijk"), Some("Chương 1"));
        let json = serde_json::to_value(&r).unwrap();

        assert_eq!(json["Position"], 1);
        assert_eq!(json["Lecture Title"], "Bài 1");
        assert_eq!(json["Lecture List Limit"], 100);
        assert_eq!(json["Video URL"], "https://youtu.be/abcdefghijk");
        assert_eq!(json["Chapter"], "Chương 1");
    }

    #[test]
    fn test_missing_optional_fields_are_omitted() {
        let r = record(1, "Bài 1", None, None);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("Video URL").is_none());
        assert!(json.get("Chapter").is_none());
    }

    #[test]
    fn test_into_full_assigns_positions_and_placeholders() {
        let simplified = SimplifiedExport {
            lectures: vec![
                SimplifiedLecture {
                    title: String::new(),
                    video_url: "https://youtu.be/abcdefghijk".to_string(),
                    chapter: "Chương 2".to_string(),
                },
                SimplifiedLecture {
                    title: "Bài 5".to_string(),
                    video_url: String::new(),
                    chapter: UNCLASSIFIED_CHAPTER.to_string(),
                },
            ],
        };

        let full = simplified.into_full("https://havamath.vn");
        assert!(full.export_id.starts_with("import-"));
        assert_eq!(full.data[0].lecture_title, "Bài giảng 1");
        assert_eq!(full.data[0].lecture_link, "https://havamath.vn/unknown/link/1");
        assert_eq!(full.data[1].position, 2);
        assert!(full.data[0].has_youtube_url());
        assert!(!full.data[1].has_youtube_url());
    }

    #[test]
    fn test_iso_now_format() {
        let now = iso_now();
        assert_eq!(now.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(now.ends_with('Z'));
    }
}
