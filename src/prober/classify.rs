//! 探测失败分类
//! 每次失败只归入一个类别

use std::error::Error as _;

use crate::model::ProbeError;

const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
    "no address associated",
];

const TLS_MARKERS: &[&str] = &[
    "certificate",
    "tls",
    "ssl",
    "handshake",
    "corrupt message",
    "alert",
];

/// 分类 reqwest 错误，tls 表示请求 URL 为 https
pub fn classify_error(err: &reqwest::Error, tls: bool) -> ProbeError {
    let causes = error_causes(err);
    let causes: Vec<&str> = causes.iter().map(String::as_str).collect();
    classify_failure(err.is_timeout(), err.is_connect(), tls, &causes)
}

/// 按 超时 → DNS → 拒绝连接 → 网络不可达 → TLS → 其它 的顺序判定
/// causes 为不含 URL 的错误链，详情取最底层原因；只有 https 请求才会归为 ssl_error
pub fn classify_failure(is_timeout: bool, is_connect: bool, tls: bool, causes: &[&str]) -> ProbeError {
    let lower = causes.join(": ").to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
    let detail = causes.last().copied().unwrap_or_default();

    if is_timeout || lower.contains("timed out") {
        ProbeError::Timeout
    } else if has_any(DNS_MARKERS) {
        ProbeError::DnsFailed
    } else if lower.contains("connection refused") {
        ProbeError::ConnectionRefused
    } else if lower.contains("network is unreachable") || lower.contains("no route to host") {
        ProbeError::NetworkUnreachable
    } else if tls && has_any(TLS_MARKERS) {
        ProbeError::ssl(detail)
    } else if is_connect {
        ProbeError::ConnectionRefused
    } else {
        ProbeError::unknown(detail)
    }
}

/// 收集错误链（不含顶层带 URL 的描述）
/// 没有下层原因时退回顶层描述，并去掉其中的 URL
fn error_causes(err: &reqwest::Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    if causes.is_empty() {
        let mut message = err.to_string();
        if let Some(url) = err.url() {
            message = message.replace(&format!(" ({})", url), "").replace(url.as_str(), "");
        }
        causes.push(message);
    }
    causes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_wins() {
        assert_eq!(classify_failure(true, true, true, &["whatever"]), ProbeError::Timeout);
        assert_eq!(
            classify_failure(false, false, false, &["operation timed out"]),
            ProbeError::Timeout
        );
    }

    #[test]
    fn test_dns_failure() {
        let causes = [
            "client error (Connect)",
            "dns error",
            "failed to lookup address information: Name or service not known",
        ];
        assert_eq!(classify_failure(false, true, false, &causes), ProbeError::DnsFailed);
    }

    #[test]
    fn test_refused_and_unreachable() {
        assert_eq!(
            classify_failure(false, true, false, &["tcp connect error", "Connection refused (os error 111)"]),
            ProbeError::ConnectionRefused
        );
        assert_eq!(
            classify_failure(false, true, true, &["tcp connect error", "Network is unreachable (os error 101)"]),
            ProbeError::NetworkUnreachable
        );
    }

    #[test]
    fn test_tls_failure_uses_innermost_cause() {
        let cause = format!("invalid peer certificate: {}", "x".repeat(300));
        match classify_failure(false, true, true, &["client error (Connect)", cause.as_str()]) {
            ProbeError::Ssl(d) => {
                assert!(d.starts_with("invalid peer certificate"));
                assert_eq!(d.chars().count(), 100);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_plain_http_never_reports_ssl() {
        // 主机名或路径里的 ssl/tls 字样不影响分类
        let causes = ["client error (SendRequest)", "connection closed before message completed"];
        let plain = classify_failure(false, false, false, &causes);
        assert_eq!(
            plain,
            ProbeError::Unknown("connection closed before message completed".to_string())
        );
        assert_eq!(
            classify_failure(false, true, false, &["received fatal alert: HandshakeFailure"]),
            ProbeError::ConnectionRefused
        );
        assert_eq!(
            classify_failure(false, true, true, &["received fatal alert: HandshakeFailure"]),
            ProbeError::Ssl("received fatal alert: HandshakeFailure".to_string())
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            classify_failure(false, true, false, &["connection reset"]),
            ProbeError::ConnectionRefused
        );
        assert_eq!(
            classify_failure(false, false, false, &["builder error"]),
            ProbeError::Unknown("builder error".to_string())
        );
        assert_eq!(classify_failure(false, false, false, &[]), ProbeError::Unknown(String::new()));
    }
}
