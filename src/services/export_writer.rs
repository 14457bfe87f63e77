//! 导出写入服务 - 业务能力层
//!
//! 只负责"把讲座列表写成 JSON 文件"能力，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::lecture::LectureExport;

/// 课程模式下的默认输出路径
///
/// - 只获取列表：`<课程ID>_lectures.json`
/// - 提取视频：`<课程ID>_videos.json`
pub fn default_output_path(course_id: &str, skip_videos: bool) -> PathBuf {
    let suffix = if skip_videos { "lectures" } else { "videos" };
    PathBuf::from(format!("{}_{}.json", course_id, suffix))
}

/// 导出写入服务
pub struct ExportWriter {
    simplified: bool,
}

impl ExportWriter {
    /// # 参数
    /// - `simplified`: 输出简化结构（title / videoUrl / chapter）
    pub fn new(simplified: bool) -> Self {
        Self { simplified }
    }

    /// 渲染为格式化的 JSON 文本（非 ASCII 字符原样保留）
    pub fn render(&self, export: &LectureExport) -> serde_json::Result<String> {
        self.render_counted(export).map(|(content, _)| content)
    }

    /// 渲染并返回实际写出的讲座数量
    fn render_counted(&self, export: &LectureExport) -> serde_json::Result<(String, usize)> {
        if self.simplified {
            let simplified = export.simplify();
            let content = serde_json::to_string_pretty(&simplified)?;
            Ok((content, simplified.lectures.len()))
        } else {
            let content = serde_json::to_string_pretty(export)?;
            Ok((content, export.data.len()))
        }
    }

    /// 写入文件，返回写入的讲座数量
    pub async fn write(&self, export: &LectureExport, path: &Path) -> AppResult<usize> {
        let path_str = path.display().to_string();
        let (content, count) = self
            .render_counted(export)
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(&path_str, e))?;
        }

        fs::write(path, content)
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        debug!("写入 {} (简化结构: {})", path_str, self.simplified);
        info!("💾 已保存 {} 个讲座到 {}", count, path_str);
        Ok(count)
    }
}
