//! crt.sh source
//! 证书透明日志查询，上游繁忙时按固定间隔重试

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::AssetSource;
use crate::config::{GlobalConfig, RetryPolicy};
use crate::error::{ReconError, ReconResult};
use crate::model::Asset;
use crate::model::asset::normalize_domain;

pub const SOURCE_NAME: &str = "crtsh";

/// 表示上游仍在处理或过载的状态码
const RETRYABLE_STATUS: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// crt.sh JSON 条目，name_value 可能包含多行
#[derive(Debug, Clone, Deserialize)]
pub struct CrtshEntry {
    #[serde(default)]
    pub name_value: String,
}

/// crt.sh 数据源
#[derive(Debug, Clone)]
pub struct CrtshSource {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    retry_delay: Duration,
}

impl CrtshSource {
    pub fn new(config: &GlobalConfig) -> ReconResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.source_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.crtsh_url.trim_end_matches('/').to_string(),
            retry: config.source_retry,
            retry_delay: config.source_retry_delay,
        })
    }

    /// 单次请求
    async fn query_once(&self, query: &str) -> ReconResult<Vec<CrtshEntry>> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("output", "json")])
            .send()
            .await?;

        let status = response.status();
        if RETRYABLE_STATUS.contains(&status) {
            return Err(ReconError::SourceUnavailable {
                status: status.as_u16(),
                url,
            });
        }
        if !status.is_success() {
            return Err(ReconError::SourceError(format!(
                "{} returned status code {}",
                url, status
            )));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl AssetSource for CrtshSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, query: &str) -> ReconResult<Vec<Asset>> {
        info!("querying crt.sh for {}", query);
        let entries = simple_retry(self.retry.max_retries(), self.retry_delay, || {
            self.query_once(query)
        })
        .await
        .map_err(|e| match e {
            ReconError::SourceUnavailable { status, url } => ReconError::SourceError(format!(
                "{} still unavailable (status {}) after {} attempts",
                url,
                status,
                self.retry.max_retries() + 1
            )),
            other => other,
        })?;

        let names = normalize_names(&entries);
        debug!("crt.sh returned {} entries, {} unique names", entries.len(), names.len());

        Ok(names
            .into_iter()
            .map(|name| Asset::from_normalized(name, SOURCE_NAME))
            .collect())
    }
}

/// 通用异步重试：仅对可重试错误重试，固定间隔，保留最后一次错误
pub(crate) async fn simple_retry<F, Fut, T>(
    max_retries: usize,
    delay: Duration,
    mut func: F,
) -> ReconResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ReconResult<T>>,
{
    let mut attempt = 0;
    loop {
        match func().await {
            Ok(res) => return Ok(res),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    "request failed: {}, retrying in {:?} (attempt {}/{})",
                    e, delay, attempt, max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 拆分多行条目，规范化并去重（保持首次出现顺序）
pub fn normalize_names(entries: &[CrtshEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .flat_map(|entry| entry.name_value.split('\n'))
        .filter_map(normalize_domain)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
