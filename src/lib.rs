//! # Havamath Extractor
//!
//! 从 havamath.vn 课程页面提取讲座列表、章节和视频链接的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 唯一的 page owner，提供 goto / content / eval 能力
//! - `browser/` - 启动 / 连接浏览器，管理每个 worker 的会话
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `CoursePage` - HTTP 获取课程页面、解析讲座链接
//! - `chapter_classifier` - 章节分类能力
//! - `VideoLocator` - 在讲座页面中定位视频
//! - `ExportWriter` - 写 JSON 能力
//! - `CookieStore` - 读取 cookies
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个讲座"的完整处理流程
//! - `LectureCtx` - 上下文封装（worker + 讲座序号）
//! - `LectureFlow` - 流程编排（跳过判断 → 打开页面 → 定位视频）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 管理资源和并发，两种入口
//! - `orchestrator/course_processor` - 获取课程的讲座列表
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::{Cli, Input};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PageDriver;
pub use models::{LectureExport, LectureRecord};
pub use orchestrator::App;
pub use workflow::{LectureCtx, LectureFlow, ProcessResult};
