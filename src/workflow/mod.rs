pub mod lecture_ctx;
pub mod lecture_flow;

pub use lecture_ctx::LectureCtx;
pub use lecture_flow::{LectureFlow, ProcessResult};
