use crate::error::{AppError, AppResult, FileError};
use crate::models::lecture::{LectureExport, SimplifiedExport};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载讲座数据
///
/// 支持两种结构：完整结构（`data`）和简化结构（`lectures`），
/// 简化结构会被转换为完整结构
pub async fn load_lecture_json(json_file_path: &Path, site_root: &str) -> AppResult<LectureExport> {
    let path_str = json_file_path.display().to_string();

    if !fs::try_exists(json_file_path).await.unwrap_or(false) {
        return Err(AppError::File(FileError::NotFound { path: path_str }));
    }

    let content = fs::read_to_string(json_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    parse_lecture_json(&content, site_root).map_err(|e| {
        AppError::File(FileError::UnknownSchema {
            path: path_str,
            source: Box::new(e),
        })
    })
}

/// 解析 JSON 文本（两种结构都支持）
pub fn parse_lecture_json(content: &str, site_root: &str) -> Result<LectureExport, serde_json::Error> {
    let value: JsonValue = serde_json::from_str(content)?;

    if value.get("lectures").is_some() {
        tracing::debug!("检测到简化结构，转换为完整结构");
        let simplified: SimplifiedExport = serde_json::from_value(value)?;
        return Ok(simplified.into_full(site_root));
    }

    let mut export: LectureExport = serde_json::from_value(value)?;
    export.fill_missing();
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_schema_ignores_unknown_fields() {
        let content = r#"{
            "data": [{
                "Position": 1,
                "Lecture Link": "https://havamath.vn/learn/1",
                "Lecture Title": "Bài 1",
                "Extract Date": "2024-01-01T00:00:00.000Z",
                "Task Link": "",
                "Origin URL": "https://havamath.vn/courses/toan-9",
                "Lecture List Limit": 100,
                "Extra": "ignored"
            }],
            "table": "Lecture List",
            "schema_version": "1.0",
            "export_id": "toan-9-1700000000",
            "export_created_at": "2024-01-01T00:00:00.000Z"
        }"#;

        let export = parse_lecture_json(content, "https://havamath.vn").unwrap();
        assert_eq!(export.export_id, "toan-9-1700000000");
        assert_eq!(export.data.len(), 1);
        assert!(export.data[0].chapter.is_none());
        assert!(export.data[0].video_url.is_none());
    }

    #[test]
    fn test_parse_simplified_schema() {
        let content = r#"{"lectures": [
            {"title": "Bài 1", "videoUrl": "https://youtu.be/abcdefghijk", "chapter": "Chương 1"},
            {"title": "Bài 2", "videoUrl": ""}
        ]}"#;

        let export = parse_lecture_json(content, "https://havamath.vn").unwrap();
        assert_eq!(export.data.len(), 2);
        assert_eq!(export.data[1].chapter.as_deref(), Some("Chưa phân loại"));
        assert_eq!(export.data[1].lecture_link, "https://havamath.vn/unknown/link/2");
    }

    #[test]
    fn test_parse_full_schema_tolerates_missing_link_and_title() {
        let content = r#"{"data": [
            {"Position": 1, "Lecture Title": "Bài 1"},
            {"Position": 2, "Lecture Link": "https://havamath.vn/learn/2"},
            {"Video URL": "https://youtu.be/abcdefghijk"}
        ]}"#;

        let export = parse_lecture_json(content, "https://havamath.vn").unwrap();
        assert_eq!(export.data.len(), 3);

        assert_eq!(export.data[0].lecture_title, "Bài 1");
        assert!(export.data[0].lecture_link.is_empty());

        assert_eq!(export.data[1].lecture_title, "Bài giảng 2");
        assert_eq!(export.data[1].lecture_link, "https://havamath.vn/learn/2");

        assert_eq!(export.data[2].position, 3);
        assert_eq!(export.data[2].lecture_title, "Bài giảng 3");
        assert!(export.data[2].has_youtube_url());
    }

    #[test]
    fn test_parse_rejects_unknown_structure() {
        assert!(parse_lecture_json(r#"{"rows": []}"#, "https://havamath.vn").is_err());
    }
}
