//! 命令行参数

use crate::config::Config;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Havamath 讲座视频提取工具
#[derive(Debug, Parser)]
#[command(name = "havamath-extractor", version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "json"])))]
pub struct Cli {
    /// 要处理的课程 URL
    #[arg(long)]
    pub url: Option<String>,

    /// 要处理的现有 JSON 文件
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// cookies JSON 文件路径
    #[arg(long)]
    pub cookies: Option<String>,

    /// 输出文件路径
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// TOML 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 显示浏览器窗口
    #[arg(long)]
    pub no_headless: bool,

    /// 只获取讲座列表，不提取视频 URL
    #[arg(long)]
    pub skip_videos: bool,

    /// 不显示进度信息
    #[arg(long)]
    pub quiet: bool,

    /// 显示 debug 信息
    #[arg(long)]
    pub debug: bool,

    /// 页面加载等待时间（秒）
    #[arg(long)]
    pub wait_time: Option<u64>,

    /// 并发 worker 数量
    #[arg(long)]
    pub threads: Option<usize>,

    /// 输出完整结构，不做简化
    #[arg(long)]
    pub full_output: bool,

    /// 所有 worker 共用一个浏览器
    #[arg(long)]
    pub reuse_browser: bool,

    /// 连接已运行浏览器的调试端口
    #[arg(long)]
    pub browser_port: Option<u16>,

    /// 浏览器可执行文件路径
    #[arg(long)]
    pub chrome_path: Option<String>,
}

/// 本次运行的输入
#[derive(Debug, Clone)]
pub enum Input {
    /// 从课程页面开始
    Course(String),
    /// 从已有 JSON 文件开始
    Json(PathBuf),
}

impl Cli {
    /// 本次运行的输入
    pub fn input(&self) -> Option<Input> {
        match (&self.url, &self.json) {
            (Some(url), _) => Some(Input::Course(url.clone())),
            (None, Some(path)) => Some(Input::Json(path.clone())),
            (None, None) => None,
        }
    }

    /// 把命令行参数覆盖到配置上
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(cookies) = &self.cookies {
            config.cookies_file = Some(cookies.clone());
        }
        if self.no_headless {
            config.headless = false;
        }
        if self.skip_videos {
            config.skip_videos = true;
        }
        if self.quiet {
            config.quiet = true;
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(wait_time) = self.wait_time {
            config.wait_time_secs = wait_time;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.full_output {
            config.simplified_output = false;
        }
        if self.reuse_browser {
            config.reuse_browser = true;
        }
        if let Some(port) = self.browser_port {
            config.browser_debug_port = Some(port);
        }
        if let Some(path) = &self.chrome_path {
            config.chrome_executable = Some(path.clone());
        }
        config
    }
}
