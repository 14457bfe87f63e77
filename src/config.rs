use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 优先级：默认值 < TOML 配置文件 < 环境变量 < 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 站点根地址（用于补全相对链接和加载 cookies）
    pub site_root: String,
    /// cookies JSON 文件路径
    pub cookies_file: Option<String>,
    /// 是否以无头模式运行浏览器
    pub headless: bool,
    /// Chrome / Edge 可执行文件路径（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<String>,
    /// 连接已有浏览器的调试端口（设置后不再启动新浏览器）
    pub browser_debug_port: Option<u16>,
    /// 同时处理的讲座数量（即 worker 数量）
    pub threads: usize,
    /// 每个讲座页面加载后的等待时间（秒）
    pub wait_time_secs: u64,
    /// 等待讲座链接出现的超时时间（秒）
    pub element_timeout_secs: u64,
    /// 所有 worker 共用一个浏览器（每个 worker 一个标签页）
    pub reuse_browser: bool,
    /// 输出简化结构（title / videoUrl / chapter）
    pub simplified_output: bool,
    /// 只获取讲座列表，不提取视频
    pub skip_videos: bool,
    /// 只输出警告及以上日志
    pub quiet: bool,
    /// 输出 debug 日志
    pub debug: bool,
    /// HTTP 请求超时时间（秒）
    pub http_timeout_secs: u64,
    /// HTTP 请求使用的 User-Agent
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: "https://havamath.vn".to_string(),
            cookies_file: None,
            headless: true,
            chrome_executable: None,
            browser_debug_port: None,
            threads: 4,
            wait_time_secs: 10,
            element_timeout_secs: 15,
            reuse_browser: false,
            simplified_output: true,
            skip_videos: false,
            quiet: false,
            debug: false,
            http_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::FileParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })
    }

    /// 在默认值基础上应用环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 用 `HAVAMATH_*` 环境变量覆盖当前配置
    pub fn with_env(mut self) -> AppResult<Self> {
        if let Ok(v) = std::env::var("HAVAMATH_SITE_ROOT") {
            self.site_root = v;
        }
        if let Ok(v) = std::env::var("HAVAMATH_COOKIES") {
            self.cookies_file = Some(v);
        }
        if let Ok(v) = std::env::var("HAVAMATH_CHROME_PATH") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = parse_env("HAVAMATH_HEADLESS", "bool")? {
            self.headless = v;
        }
        if let Some(v) = parse_env("HAVAMATH_BROWSER_PORT", "u16")? {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = parse_env("HAVAMATH_THREADS", "usize")? {
            self.threads = v;
        }
        if let Some(v) = parse_env("HAVAMATH_WAIT_TIME", "u64")? {
            self.wait_time_secs = v;
        }
        if let Some(v) = parse_env("HAVAMATH_REUSE_BROWSER", "bool")? {
            self.reuse_browser = v;
        }
        Ok(self)
    }

    /// 实际使用的 worker 数量（至少 1 个）
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }

    /// 站点根地址（去掉末尾的 `/`）
    pub fn site_root(&self) -> &str {
        self.site_root.trim_end_matches('/')
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
        Err(_) => Ok(None),
    }
}
