//! 讲座处理流程 - 流程层
//!
//! 核心职责：定义"一个讲座"的完整处理流程
//!
//! 流程顺序：
//! 1. 没有链接或已有 YouTube 短链接 → 跳过
//! 2. 打开讲座页面，等待加载
//! 3. VideoLocator 定位视频 → 写入 Video URL

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::lecture::LectureRecord;
use crate::services::VideoLocator;
use crate::utils::logging::truncate_text;
use crate::workflow::lecture_ctx::LectureCtx;

/// 讲座处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 找到视频
    Found,
    /// 已有 YouTube 链接，跳过
    AlreadyPresent,
    /// 没有讲座链接，跳过
    NoLink,
    /// 页面上没有找到视频
    NotFound,
}

/// 讲座处理流程
///
/// - 不持有任何资源（page 由调用方的会话持有）
/// - 只依赖业务能力（services）
pub struct LectureFlow {
    locator: VideoLocator,
    wait_time: Duration,
}

impl LectureFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            locator: VideoLocator::new(),
            wait_time: Duration::from_secs(config.wait_time_secs),
        }
    }

    /// 处理单个讲座，找到的视频写回 `lecture.video_url`
    ///
    /// 没找到视频时 `video_url` 置为空字符串
    pub async fn run(
        &self,
        driver: &PageDriver,
        lecture: &mut LectureRecord,
        ctx: &LectureCtx,
    ) -> Result<ProcessResult> {
        if lecture.lecture_link.is_empty() {
            debug!("{} 没有讲座链接，跳过", ctx);
            return Ok(ProcessResult::NoLink);
        }
        if lecture.has_youtube_url() {
            debug!("{} 已有 YouTube 链接，跳过", ctx);
            return Ok(ProcessResult::AlreadyPresent);
        }

        info!(
            "{} 🔍 正在处理: {}",
            ctx,
            truncate_text(&lecture.lecture_title, 60)
        );

        driver
            .goto(&lecture.lecture_link)
            .await
            .with_context(|| format!("{} 打开讲座页面失败", ctx))?;
        sleep(self.wait_time).await;

        let located = self
            .locator
            .locate(driver)
            .await
            .with_context(|| format!("{} 定位视频失败", ctx))?;

        match located {
            Some((source, strategy)) => {
                let url = source.url();
                info!("{} ✓ 找到视频 ({}): {}", ctx, strategy.name(), url);
                lecture.video_url = Some(url);
                Ok(ProcessResult::Found)
            }
            None => {
                warn!("{} ⚠️ 未找到视频: {}", ctx, lecture.lecture_link);
                lecture.video_url = Some(String::new());
                Ok(ProcessResult::NotFound)
            }
        }
    }
}
