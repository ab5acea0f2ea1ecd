//! 单次 HTTP(S) 探测结果

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 错误详情的最大保留字符数
pub const ERROR_DETAIL_LIMIT: usize = 100;

/// 探测失败分类，序列化为稳定的字符串代码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ProbeError {
    Timeout,
    DnsFailed,
    ConnectionRefused,
    NetworkUnreachable,
    Ssl(String),
    Unknown(String),
}

impl ProbeError {
    pub fn ssl(detail: &str) -> Self {
        ProbeError::Ssl(truncate_chars(detail, ERROR_DETAIL_LIMIT))
    }

    pub fn unknown(detail: &str) -> Self {
        ProbeError::Unknown(truncate_chars(detail, ERROR_DETAIL_LIMIT))
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout => write!(f, "timeout"),
            ProbeError::DnsFailed => write!(f, "dns_failed"),
            ProbeError::ConnectionRefused => write!(f, "connection_refused"),
            ProbeError::NetworkUnreachable => write!(f, "network_unreachable"),
            ProbeError::Ssl(detail) => write!(f, "ssl_error: {}", detail),
            ProbeError::Unknown(detail) => write!(f, "unknown: {}", detail),
        }
    }
}

impl From<ProbeError> for String {
    fn from(err: ProbeError) -> Self {
        err.to_string()
    }
}

impl From<String> for ProbeError {
    fn from(code: String) -> Self {
        match code.as_str() {
            "timeout" => ProbeError::Timeout,
            "dns_failed" => ProbeError::DnsFailed,
            "connection_refused" => ProbeError::ConnectionRefused,
            "network_unreachable" => ProbeError::NetworkUnreachable,
            other => {
                if let Some(detail) = other.strip_prefix("ssl_error: ") {
                    ProbeError::Ssl(detail.to_string())
                } else if let Some(detail) = other.strip_prefix("unknown: ") {
                    ProbeError::Unknown(detail.to_string())
                } else {
                    ProbeError::Unknown(other.to_string())
                }
            }
        }
    }
}

/// 一次探测的结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    /// 请求未完成时为 0
    pub status_code: u16,
    /// 仅在发生重定向时存在
    pub final_url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// 已排序去重
    #[serde(default)]
    pub technologies: Vec<String>,
    pub server: Option<String>,
    pub title: Option<String>,
    pub content_length: Option<u64>,
    pub tls: bool,
    pub error: Option<ProbeError>,
    pub duration_ms: u64,
}

impl ProbeResult {
    /// 失败结果：状态码固定为 0
    pub fn failure(url: &str, error: ProbeError, duration_ms: u64) -> Self {
        Self {
            url: url.to_string(),
            status_code: 0,
            final_url: None,
            headers: BTreeMap::new(),
            technologies: Vec::new(),
            server: None,
            title: None,
            content_length: None,
            tls: is_tls_url(url),
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code > 0 && self.error.is_none()
    }
}

/// tls 只看输入 URL 的 scheme
pub fn is_tls_url(url: &str) -> bool {
    url.get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

pub(crate) fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
