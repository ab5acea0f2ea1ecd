//! 资产记录
//! 由数据源创建，分类器追加标签，流水线填充存活与探测信息

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probe::ProbeResult;
use crate::error::{ReconError, ReconResult};

/// 一个发现的主机名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub domain: String,
    pub source: String,
    #[serde(default = "Utc::now")]
    pub discovered_at: DateTime<Utc>,

    // 可选字段
    #[serde(default)]
    pub ip: Option<IpAddr>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub cert_issued: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cert_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// None 表示尚未检查
    #[serde(default)]
    pub live: Option<bool>,

    // HTTP 探测结果
    #[serde(default)]
    pub http: Option<ProbeResult>,
    #[serde(default)]
    pub https: Option<ProbeResult>,
}

impl Asset {
    /// 创建资产，域名会被规范化；不合法的域名返回错误
    pub fn new(domain: &str, source: &str) -> ReconResult<Self> {
        let normalized = normalize_domain(domain).ok_or_else(|| {
            ReconError::InvalidInput(format!("not a hostname: {:?}", domain))
        })?;
        Ok(Self::from_normalized(normalized, source))
    }

    pub(crate) fn from_normalized(domain: String, source: &str) -> Self {
        Self {
            domain,
            source: source.to_string(),
            discovered_at: Utc::now(),
            ip: None,
            org: None,
            cert_issued: None,
            cert_expires: None,
            tags: Vec::new(),
            live: None,
            http: None,
            https: None,
        }
    }

    /// 追加标签（允许重复）
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// 记录 DNS 结果：解析成功即存活
    pub fn with_resolution(mut self, ip: Option<IpAddr>) -> Self {
        self.live = Some(ip.is_some());
        self.ip = ip;
        self
    }

    pub fn with_probes(mut self, http: ProbeResult, https: ProbeResult) -> Self {
        self.http = Some(http);
        self.https = Some(https);
        self
    }

    /// 优先 HTTPS 结果，其次 HTTP
    pub fn preferred_probe(&self) -> Option<&ProbeResult> {
        self.https.as_ref().or(self.http.as_ref())
    }
}

/// 规范化主机名：去空白、转小写、去掉通配前缀 `*.`
/// 返回 None 表示不是主机名（为空或包含 `@`）
pub fn normalize_domain(raw: &str) -> Option<String> {
    let mut domain = raw.trim().to_lowercase();
    while let Some(stripped) = domain.strip_prefix("*.") {
        domain = stripped.to_string();
    }
    let domain = domain.trim().to_string();
    if domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(domain)
}
