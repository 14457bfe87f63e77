//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度和资源管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量讲座处理器
//! - 管理应用生命周期（初始化、运行、清理）
//! - 课程 URL / JSON 文件两种入口
//! - worker 队列控制并发
//! - 管理浏览器资源（SharedBrowser、BrowserSession）
//! - 输出全局统计信息
//!
//! ### `course_processor` - 课程处理器
//! - 获取课程的讲座列表（浏览器 → HTTP → 浏览器）
//! - 给讲座标上章节
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<LectureRecord>)
//!     ↓
//! course_processor (获取讲座列表)
//!     ↓
//! workflow::LectureFlow (处理单个讲座)
//!     ↓
//! services (能力层：course_page / chapter_classifier / video_locator / export_writer)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod batch_processor;
pub mod course_processor;

pub use batch_processor::{App, VideoStats};
pub use course_processor::scrape_lecture_list;
