//! Header格式转换工具
//! 统一小写键名，合并多值，过滤出需要保留的 Header

use std::collections::{BTreeMap, HashMap};

use reqwest::header::HeaderMap;
use tracing::warn;

/// 输出中保留的 Header（服务标识、框架、安全相关、Cookie）
pub const INTERESTING_HEADERS: &[&str] = &[
    "server",
    "x-powered-by",
    "x-aspnet-version",
    "x-aspnetmvc-version",
    "x-generator",
    "x-drupal-cache",
    "x-varnish",
    "x-cache",
    "via",
    "x-frame-options",
    "x-xss-protection",
    "x-content-type-options",
    "content-security-policy",
    "strict-transport-security",
    "www-authenticate",
    "set-cookie",
];

const MAX_HEADER_ENTRIES: usize = 1000;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为HashMap<String, Vec<String>>，键名统一小写
    pub fn to_hashmap(header_map: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();

        for (iter_count, (key, value)) in header_map.iter().enumerate() {
            if iter_count >= MAX_HEADER_ENTRIES {
                warn!("header count exceeds {}, ignoring the rest", MAX_HEADER_ENTRIES);
                break;
            }

            let value_str = String::from_utf8_lossy(value.as_bytes()).into_owned();
            map.entry(key.as_str().to_lowercase())
                .or_default()
                .push(value_str);
        }

        map
    }

    /// 多值 Header 以 `, ` 合并为单值
    pub fn to_joined(hashmap: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
        hashmap
            .iter()
            .map(|(key, values)| (key.to_lowercase(), values.join(", ")))
            .collect()
    }

    /// 只保留白名单内的 Header
    pub fn filter_interesting(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
        headers
            .iter()
            .filter(|(key, _)| INTERESTING_HEADERS.contains(&key.to_lowercase().as_str()))
            .map(|(key, value)| (key.to_lowercase(), value.clone()))
            .collect()
    }
}
