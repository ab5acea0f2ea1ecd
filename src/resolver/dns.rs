//! DNS Resolver
//! 解析主机名到首个 IPv4 地址（无 IPv4 时取首个地址），任何失败都返回 None

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::GlobalConfig;

/// 解析能力抽象，流水线只依赖该接口
#[async_trait]
pub trait Resolve: Send + Sync {
    /// 解析失败（NXDOMAIN、超时、网络错误）一律返回 None
    async fn resolve(&self, domain: &str) -> Option<IpAddr>;
}

/// 基于 hickory 的异步解析器
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioResolver,
    timeout: Duration,
}

impl DnsResolver {
    /// 使用系统解析配置，读取失败时退回默认上游
    pub fn new(query_timeout: Duration) -> Self {
        let mut builder = match TokioResolver::builder(TokioConnectionProvider::default()) {
            Ok(builder) => builder,
            Err(e) => {
                warn!("system resolver config unavailable ({}), using defaults", e);
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
            }
        };
        builder.options_mut().timeout = query_timeout;
        builder.options_mut().attempts = 1;

        Self {
            resolver: builder.build(),
            timeout: query_timeout,
        }
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.dns_timeout)
    }

    /// 指定超时解析
    pub async fn resolve_with_timeout(&self, domain: &str, limit: Duration) -> Option<IpAddr> {
        match timeout(limit, self.resolver.lookup_ip(domain)).await {
            Ok(Ok(lookup)) => {
                let ip = lookup
                    .iter()
                    .find(IpAddr::is_ipv4)
                    .or_else(|| lookup.iter().next());
                debug!("resolved {} -> {:?}", domain, ip);
                ip
            }
            Ok(Err(e)) => {
                debug!("resolution failed for {}: {}", domain, e);
                None
            }
            Err(_) => {
                debug!("resolution timed out for {} after {:?}", domain, limit);
                None
            }
        }
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(&self, domain: &str) -> Option<IpAddr> {
        self.resolve_with_timeout(domain, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let resolver = DnsResolver::new(Duration::from_secs(5));
        let ip = resolver.resolve("127.0.0.1").await;
        assert_eq!(ip, Some("127.0.0.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_invalid_name_is_none() {
        let resolver = DnsResolver::new(Duration::from_secs(2));
        assert_eq!(resolver.resolve("bad..name..invalid").await, None);
    }

    #[tokio::test]
    async fn test_outer_timeout_bounds_lookup() {
        // 解析器自身超时较长，外层时限仍然生效
        let resolver = DnsResolver::new(Duration::from_secs(30));
        let start = std::time::Instant::now();
        let ip = resolver
            .resolve_with_timeout("slow-host.rsrecon.invalid", Duration::ZERO)
            .await;
        assert_eq!(ip, None);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
