//! 批量讲座处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行的资源管理和并发调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载 cookies，按需打开共享浏览器
//! 2. **两种输入**：课程 URL（先获取列表）或已有 JSON 文件
//! 3. **并发控制**：多个 worker 从同一个队列中取讲座
//! 4. **资源管理**：每个 worker 持有自己的浏览器会话，结束时关闭
//! 5. **结果写回**：按原始序号写回，保持讲座顺序
//! 6. **全局统计**：汇总所有讲座的处理结果

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::browser::{BrowserSession, SharedBrowser};
use crate::cli::Input;
use crate::config::Config;
use crate::error::{AppError, ExtractError};
use crate::models::lecture::{LectureExport, LectureRecord};
use crate::models::load_lecture_json;
use crate::orchestrator::course_processor::scrape_lecture_list;
use crate::services::course_page::extract_course_id;
use crate::services::export_writer::default_output_path;
use crate::services::{CookieStore, ExportWriter};
use crate::utils::logging;
use crate::workflow::{LectureCtx, LectureFlow, ProcessResult};

/// 待处理的讲座队列（原始序号, 讲座）
type LectureQueue = Arc<Mutex<VecDeque<(usize, LectureRecord)>>>;

/// worker 的处理结果（原始序号, 讲座, 结果；处理出错时结果为 None）
type WorkerOutput = (usize, LectureRecord, Option<ProcessResult>);

/// 应用主结构
pub struct App {
    config: Arc<Config>,
    cookies: Arc<CookieStore>,
    /// 共用的浏览器（`reuse_browser` 或连接已有浏览器时）
    shared: Option<Arc<SharedBrowser>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let cookies = CookieStore::load_optional(config.cookies_file.as_deref());
        if !cookies.is_empty() {
            info!("🍪 已加载 {} 个 cookies", cookies.len());
        }

        let shared = if config.reuse_browser || config.browser_debug_port.is_some() {
            let browser = SharedBrowser::open(&config)
                .await
                .context("打开共享浏览器失败")?;
            Some(browser)
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            cookies: Arc::new(cookies),
            shared,
        })
    }

    /// 运行应用主逻辑，返回输出文件路径
    pub async fn run(&self, input: Input, output: Option<PathBuf>) -> Result<PathBuf> {
        match input {
            Input::Course(url) => self.process_course(&url, output).await,
            Input::Json(path) => self.process_json(&path, output).await,
        }
    }

    /// 处理课程：获取列表 → 提取视频 → 导出
    pub async fn process_course(&self, course_url: &str, output: Option<PathBuf>) -> Result<PathBuf> {
        let started = Instant::now();
        let course_id = extract_course_id(course_url)
            .ok_or_else(|| AppError::invalid_course_url(course_url))?;
        info!("📚 课程 ID: {}", course_id);

        let lectures = scrape_lecture_list(
            &self.config,
            &self.cookies,
            self.shared.clone(),
            course_url,
        )
        .await?;

        if lectures.is_empty() {
            return Err(AppError::Extract(ExtractError::NoLectures {
                course_url: course_url.to_string(),
            })
            .into());
        }

        let mut export = LectureExport::new(&course_id);
        export.data = lectures;

        let stats = if self.config.skip_videos {
            info!("⏭️ 跳过视频提取");
            None
        } else {
            Some(self.extract_videos(&mut export.data).await)
        };

        let path = output.unwrap_or_else(|| default_output_path(&course_id, self.config.skip_videos));
        self.export(&export, &path).await?;

        logging::print_final_stats(stats.as_ref(), export.data.len(), &path, started.elapsed());
        Ok(path)
    }

    /// 处理已有 JSON 文件：加载 → 提取视频 → 导出（默认覆盖原文件）
    pub async fn process_json(&self, json_path: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
        let started = Instant::now();
        info!("📂 正在加载 {}", json_path.display());

        let mut export = load_lecture_json(json_path, self.config.site_root()).await?;
        info!("✓ 已加载 {} 个讲座", export.data.len());

        let stats = if self.config.skip_videos {
            info!("⏭️ 跳过视频提取");
            None
        } else {
            Some(self.extract_videos(&mut export.data).await)
        };

        let path = output.unwrap_or_else(|| json_path.to_path_buf());
        self.export(&export, &path).await?;

        logging::print_final_stats(stats.as_ref(), export.data.len(), &path, started.elapsed());
        Ok(path)
    }

    async fn export(&self, export: &LectureExport, path: &Path) -> Result<()> {
        ExportWriter::new(self.config.simplified_output)
            .write(export, path)
            .await
            .with_context(|| format!("保存结果到 {} 失败", path.display()))?;
        Ok(())
    }

    /// 并发提取所有讲座的视频，结果按原始顺序写回
    pub async fn extract_videos(&self, lectures: &mut Vec<LectureRecord>) -> VideoStats {
        let total = lectures.len();
        let mut stats = VideoStats {
            total,
            ..Default::default()
        };
        if total == 0 {
            return stats;
        }

        let workers = self.config.worker_count().min(total);
        logging::log_extraction_start(total, workers, self.shared.is_some());

        let originals = std::mem::take(lectures);
        let queue: LectureQueue = Arc::new(Mutex::new(
            originals.iter().cloned().enumerate().collect(),
        ));

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 1..=workers {
            let label = format!("worker-{}", worker_id);
            let handle = tokio::spawn(run_worker(
                label.clone(),
                self.config.clone(),
                self.cookies.clone(),
                self.shared.clone(),
                queue.clone(),
                total,
            ));
            handles.push((label, handle));
        }

        let mut outputs = Vec::with_capacity(total);
        for (label, handle) in handles {
            match handle.await {
                Ok(worker_outputs) => outputs.extend(worker_outputs),
                Err(e) => error!("[{}] 任务执行失败: {}", label, e),
            }
        }

        // 所有会话都没能打开时，队列里会剩下未处理的讲座
        let leftovers: Vec<_> = queue.lock().await.drain(..).collect();
        if !leftovers.is_empty() {
            warn!("⚠️ 有 {} 个讲座未被处理", leftovers.len());
        }

        *lectures = merge_results(originals, outputs, leftovers, &mut stats);
        stats
    }

    /// 关闭共享浏览器
    pub async fn shutdown(self) {
        if let Some(shared) = self.shared {
            match Arc::try_unwrap(shared) {
                Ok(browser) => browser.shutdown().await,
                Err(_) => warn!("⚠️ 共享浏览器仍被占用，跳过关闭"),
            }
        }
    }
}

/// 单个 worker：打开会话后不断从队列取讲座，直到队列为空
async fn run_worker(
    label: String,
    config: Arc<Config>,
    cookies: Arc<CookieStore>,
    shared: Option<Arc<SharedBrowser>>,
    queue: LectureQueue,
    total: usize,
) -> Vec<WorkerOutput> {
    let session = match BrowserSession::open(label.clone(), &config, shared, &cookies).await {
        Ok(session) => session,
        Err(e) => {
            error!("[{}] ❌ 打开浏览器会话失败: {}", label, e);
            return Vec::new();
        }
    };

    let flow = LectureFlow::new(&config);
    let mut outputs = Vec::new();

    loop {
        let next = queue.lock().await.pop_front();
        let Some((index, mut lecture)) = next else {
            break;
        };

        let ctx = LectureCtx::new(index + 1, total, label.as_str());
        let result = match flow.run(session.driver(), &mut lecture, &ctx).await {
            Ok(result) => Some(result),
            Err(e) => {
                error!("{} ❌ 处理过程中发生错误: {:#}", ctx, e);
                lecture.video_url = Some(String::new());
                None
            }
        };
        outputs.push((index, lecture, result));
    }

    session.close().await;
    info!("[{}] ✓ 完成 {} 个讲座", label, outputs.len());
    outputs
}

/// 按原始序号合并 worker 结果
///
/// - `outputs`：worker 处理过的讲座
/// - `leftovers`：仍在队列中、没有 worker 处理的讲座
///
/// 两者都没有覆盖的序号（worker 任务异常退出）使用原始记录。
/// 未处理的讲座视为失败，`Video URL` 置空（已有 YouTube 链接的保持不变）。
fn merge_results(
    originals: Vec<LectureRecord>,
    outputs: Vec<WorkerOutput>,
    leftovers: Vec<(usize, LectureRecord)>,
    stats: &mut VideoStats,
) -> Vec<LectureRecord> {
    let mut slots: Vec<Option<LectureRecord>> = vec![None; originals.len()];

    for (index, lecture, result) in outputs {
        if let Some(slot) = slots.get_mut(index) {
            stats.record(result);
            *slot = Some(lecture);
        }
    }
    for (index, lecture) in leftovers {
        if let Some(slot) = slots.get_mut(index) {
            stats.record(None);
            *slot = Some(mark_unprocessed(lecture));
        }
    }

    let mut lost = 0;
    let merged = originals
        .into_iter()
        .zip(slots)
        .map(|(original, slot)| {
            slot.unwrap_or_else(|| {
                lost += 1;
                mark_unprocessed(original)
            })
        })
        .collect();

    if lost > 0 {
        error!("❌ {} 个讲座的处理结果丢失，保留原始记录", lost);
        stats.failed += lost;
    }
    merged
}

fn mark_unprocessed(mut lecture: LectureRecord) -> LectureRecord {
    if !lecture.has_youtube_url() {
        lecture.video_url = Some(String::new());
    }
    lecture
}

/// 视频提取统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VideoStats {
    pub total: usize,
    pub found: usize,
    pub already_present: usize,
    pub no_link: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl VideoStats {
    fn record(&mut self, result: Option<ProcessResult>) {
        match result {
            Some(ProcessResult::Found) => self.found += 1,
            Some(ProcessResult::AlreadyPresent) => self.already_present += 1,
            Some(ProcessResult::NoLink) => self.no_link += 1,
            Some(ProcessResult::NotFound) => self.not_found += 1,
            None => self.failed += 1,
        }
    }

    /// 有视频链接的讲座数量（新找到 + 已有）
    pub fn with_video(&self) -> usize {
        self.found + self.already_present
    }
}
