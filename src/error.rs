use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面抓取错误（HTTP）
    #[error("抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 页面解析 / 提取错误
    #[error("提取错误: {0}")]
    Extract(#[from] ExtractError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed { source: BoxedSource },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed { port: u16, source: BoxedSource },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed { source: BoxedSource },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed { url: String, source: BoxedSource },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed { source: BoxedSource },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
}

/// HTTP 抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed { url: String, source: BoxedSource },
    /// 非 2xx 状态码
    #[error("返回状态码 {status} ({url})")]
    BadStatus { url: String, status: u16 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed { path: String, source: BoxedSource },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed { path: String, source: BoxedSource },
    /// JSON 格式不符合任何已知结构
    #[error("无法识别的 JSON 结构 ({path}): {source}")]
    UnknownSchema { path: String, source: BoxedSource },
}

/// 页面解析 / 提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// CSS 选择器无效
    #[error("CSS 选择器无效 '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
    /// 课程页面没有任何讲座
    #[error("课程 {course_url} 中没有找到讲座")]
    NoLectures { course_url: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL 格式不正确
    #[error("无效的课程 URL: {url}")]
    InvalidCourseUrl { url: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed { path: String, source: BoxedSource },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器启动错误
    pub fn browser_launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建 HTTP 请求错误
    pub fn request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Fetch(FetchError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建选择器错误
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Extract(ExtractError::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        })
    }

    /// 创建课程 URL 错误
    pub fn invalid_course_url(url: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidCourseUrl { url: url.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category_and_detail() {
        let err = AppError::invalid_course_url("https://havamath.vn/blog/abc");
        let text = err.to_string();
        assert!(text.starts_with("配置错误"));
        assert!(text.contains("https://havamath.vn/blog/abc"));
    }

    #[test]
    fn test_source_chain_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::file_read_failed("cookies.json", io);
        assert!(err.to_string().contains("cookies.json"));
        let file_err = err.source().expect("应该有 source");
        assert!(file_err.source().is_some());
    }
}
