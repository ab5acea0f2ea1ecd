//! 全局配置管理,存储所有可配置项

use std::time::Duration;

/// 默认查询模式
pub const DEFAULT_QUERY: &str = "%.mil";

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Never,     // 不重试
    Times(u8), // 固定次数重试（不含第一次）
}

impl RetryPolicy {
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Times(n) => *n as usize,
        }
    }
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // DNS 解析超时（上游解析器可能很慢）
    pub dns_timeout: Duration,
    // 单次 HTTP(S) 请求总超时
    pub http_timeout: Duration,
    // 是否跟随重定向
    pub follow_redirects: bool,
    // 探测请求的 User-Agent
    pub user_agent: String,
    // 响应体读取上限（字节）
    pub max_body_bytes: usize,
    // 并发处理的资产数，1 表示逐个处理
    pub concurrency: usize,
    // 存活主机是否进行 HTTP/HTTPS 探测
    pub probe_http: bool,
    // 数据源重试策略
    pub source_retry: RetryPolicy,
    pub source_retry_delay: Duration,
    pub source_timeout: Duration,
    // crt.sh 基础地址
    pub crtsh_url: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_secs(60),
            http_timeout: Duration::from_secs(30),
            follow_redirects: true,
            user_agent: format!("rsrecon/{}", env!("CARGO_PKG_VERSION")),
            max_body_bytes: 100_000,
            concurrency: 1,
            probe_http: false,
            source_retry: RetryPolicy::Times(3),
            source_retry_delay: Duration::from_secs(5),
            source_timeout: Duration::from_secs(60),
            crtsh_url: "https://crt.sh".to_string(),
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.config.dns_timeout = timeout;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// 并发数至少为 1
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers.max(1);
        self
    }

    pub fn probe_http(mut self, enabled: bool) -> Self {
        self.config.probe_http = enabled;
        self
    }

    pub fn source_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.source_retry = policy;
        self
    }

    pub fn source_retry_delay(mut self, delay: Duration) -> Self {
        self.config.source_retry_delay = delay;
        self
    }

    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.config.source_timeout = timeout;
        self
    }

    pub fn crtsh_url(mut self, url: impl Into<String>) -> Self {
        self.config.crtsh_url = url.into();
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
