//! 讲座处理上下文
//!
//! 封装"哪个 worker 正在处理第几个讲座"这一信息

use std::fmt::Display;

/// 讲座处理上下文
#[derive(Debug, Clone)]
pub struct LectureCtx {
    /// 讲座在列表中的序号（从1开始）
    pub index: usize,

    /// 讲座总数（仅用于日志显示）
    pub total: usize,

    /// 处理该讲座的 worker
    pub worker: String,
}

impl LectureCtx {
    pub fn new(index: usize, total: usize, worker: impl Into<String>) -> Self {
        Self {
            index,
            total,
            worker: worker.into(),
        }
    }
}

impl Display for LectureCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} 讲座 {}/{}]", self.worker, self.index, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = LectureCtx::new(3, 12, "worker-2");
        assert_eq!(ctx.to_string(), "[worker-2 讲座 3/12]");
    }
}
