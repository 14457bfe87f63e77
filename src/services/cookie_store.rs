//! Cookie 服务 - 业务能力层
//!
//! 读取浏览器导出的 cookies JSON，清理后分别提供给 HTTP 客户端和浏览器

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite, TimeSinceEpoch};
use reqwest::cookie::Jar;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

use crate::error::{AppError, AppResult, FileError};

/// 单个 cookie（浏览器扩展 / Selenium 导出格式）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, alias = "expirationDate")]
    pub expiry: Option<f64>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
}

/// Cookie 集合
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    cookies: Vec<StoredCookie>,
}

impl CookieStore {
    /// 从 JSON 文件加载 cookies
    pub fn load(path: &Path) -> AppResult<Self> {
        let path_str = path.display().to_string();
        if !path.exists() {
            return Err(AppError::File(FileError::NotFound { path: path_str }));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(&path_str, e))?;
        let store = Self::parse(&content).map_err(|e| {
            AppError::File(FileError::UnknownSchema {
                path: path_str,
                source: Box::new(e),
            })
        })?;

        debug!("已加载 {} 个 cookies", store.len());
        Ok(store)
    }

    /// 可选加载：路径为空或加载失败时返回空集合
    pub fn load_optional(path: Option<&str>) -> Self {
        match path {
            Some(path) => Self::load(Path::new(path)).unwrap_or_else(|e| {
                warn!("⚠️ 加载 cookies 失败: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// 解析 cookies JSON 数组
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let cookies: Vec<StoredCookie> = serde_json::from_str(content)?;
        Ok(Self { cookies })
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// 写入 HTTP 客户端的 cookie jar
    pub fn fill_jar(&self, jar: &Jar, site_root: &Url) {
        for cookie in &self.cookies {
            let mut header = format!(
                "{}={}; Path={}",
                cookie.name,
                cookie.value,
                cookie.path.as_deref().unwrap_or("/")
            );
            if let Some(domain) = cookie.domain.as_deref().filter(|d| !d.is_empty()) {
                header.push_str("; Domain=");
                header.push_str(domain);
            }
            jar.add_cookie_str(&header, site_root);
        }
    }

    /// 转换为 CDP 的 cookie 参数
    ///
    /// 会清理掉浏览器不接受的字段：`sameSite` 为空时补为 `Lax`，过期时间取整
    pub fn to_cdp_params(&self) -> Vec<CookieParam> {
        self.cookies
            .iter()
            .map(|cookie| {
                let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
                param.domain = cookie.domain.clone().filter(|d| !d.is_empty());
                param.path = Some(cookie.path.clone().unwrap_or_else(|| "/".to_string()));
                param.secure = cookie.secure;
                param.http_only = cookie.http_only;
                param.same_site = Some(same_site(cookie.same_site.as_deref()));
                param.expires = cookie
                    .expiry
                    .map(|expiry| TimeSinceEpoch::new(expiry.trunc()));
                param
            })
            .collect()
    }
}

fn same_site(value: Option<&str>) -> CookieSameSite {
    match value.map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("strict") => CookieSameSite::Strict,
        Some("none") | Some("no_restriction") => CookieSameSite::None,
        _ => CookieSameSite::Lax,
    }
}
