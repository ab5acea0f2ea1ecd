//! HTTP Prober
//! 单次 GET 探测：忽略证书校验、可跟随重定向、总耗时受超时约束
//! 成功与失败都以 ProbeResult 返回，从不向调用方报错

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, redirect::Policy};
use tracing::debug;
use url::Url;

use super::classify::classify_error;
use crate::config::GlobalConfig;
use crate::error::{ReconError, ReconResult};
use crate::extractor::HtmlExtractor;
use crate::fingerprint::TechDetector;
use crate::model::{ProbeError, ProbeResult};
use crate::model::probe::is_tls_url;
use crate::utils::HeaderConverter;

const MAX_REDIRECTS: usize = 10;

/// 探测能力抽象
#[async_trait]
pub trait Probe: Send + Sync {
    /// 探测单个 URL
    async fn probe(&self, url: &str) -> ProbeResult;

    /// 对裸域名分别发起 HTTP 与 HTTPS 探测，两者结果互不影响
    async fn probe_domain(&self, domain: &str) -> (ProbeResult, ProbeResult) {
        let http_url = format!("http://{}", domain);
        let https_url = format!("https://{}", domain);
        tokio::join!(self.probe(&http_url), self.probe(&https_url))
    }
}

/// 基于 reqwest 的探测器
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    no_redirect_client: Client,
    timeout: Duration,
    follow_redirects: bool,
    max_body_bytes: usize,
    detector: TechDetector,
}

impl HttpProber {
    pub fn new(config: &GlobalConfig) -> ReconResult<Self> {
        let build = |policy: Policy| {
            Client::builder()
                .user_agent(config.user_agent.as_str())
                .danger_accept_invalid_certs(true)
                .redirect(policy)
                .timeout(config.http_timeout)
                .build()
                .map_err(|e| ReconError::ProberInitError(e.to_string()))
        };

        Ok(Self {
            client: build(Policy::limited(MAX_REDIRECTS))?,
            no_redirect_client: build(Policy::none())?,
            timeout: config.http_timeout,
            follow_redirects: config.follow_redirects,
            max_body_bytes: config.max_body_bytes,
            detector: TechDetector::new(),
        })
    }

    /// 探测单个 URL，超时与重定向策略由调用方指定
    pub async fn probe_url(&self, url: &str, limit: Duration, follow_redirects: bool) -> ProbeResult {
        let start = Instant::now();
        let elapsed_ms = |start: Instant| start.elapsed().as_millis() as u64;

        let requested = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return ProbeResult::failure(url, ProbeError::unknown(&e.to_string()), elapsed_ms(start));
            }
        };

        let client = if follow_redirects { &self.client } else { &self.no_redirect_client };
        let mut response = match client.get(requested.clone()).timeout(limit).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = classify_error(&e, is_tls_url(url));
                debug!("probe {} failed: {} ({})", url, error, e);
                return ProbeResult::failure(url, error, elapsed_ms(start));
            }
        };

        let status_code = response.status().as_u16();
        let final_url = (response.url() != &requested).then(|| response.url().to_string());

        // Header 键名统一小写
        let headers = HeaderConverter::to_joined(&HeaderConverter::to_hashmap(response.headers()));
        let body = read_limited(&mut response, self.max_body_bytes).await;
        let body = String::from_utf8_lossy(&body);

        let technologies = self.detector.detect(&headers, &body);
        let content_length = headers
            .get("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|len| *len > 0);

        ProbeResult {
            url: url.to_string(),
            status_code,
            final_url,
            server: headers.get("server").cloned(),
            title: HtmlExtractor::extract_title(&body),
            headers: HeaderConverter::filter_interesting(&headers),
            technologies,
            content_length,
            tls: is_tls_url(url),
            error: None,
            duration_ms: elapsed_ms(start),
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        self.probe_url(url, self.timeout, self.follow_redirects).await
    }
}

/// 最多读取 limit 字节，读取中途出错时保留已读部分
async fn read_limited(response: &mut Response, limit: usize) -> Vec<u8> {
    let mut body = Vec::new();
    while body.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                debug!("body read interrupted for {}: {}", response.url(), e);
                break;
            }
        }
    }
    body
}
