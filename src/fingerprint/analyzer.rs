//! 检测分析器：分别处理 Header / Cookie / Body
use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::pattern::SignatureTable;
use crate::utils::VersionExtractor;

/// Body 只扫描前 50,000 个字符
pub const BODY_SCAN_LIMIT: usize = 50_000;

/// Header分析器
pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    /// 每个 Header 的签名按顺序全部尝试，命中即记录
    pub fn analyze(
        table: &SignatureTable,
        headers: &HashMap<String, String>,
        detected: &mut BTreeSet<String>,
    ) {
        for signature in &table.header_signatures {
            let Some(raw_value) = headers.get(&signature.header_name) else {
                continue;
            };
            let header_value = raw_value.to_lowercase();
            if header_value.is_empty() {
                continue;
            }

            for pattern in &signature.patterns {
                if !pattern.matcher.is_match(&header_value) {
                    continue;
                }
                let captures = if VersionExtractor::expects_capture(&pattern.label_template) {
                    pattern.matcher.captures(&header_value)
                } else {
                    None
                };
                let label = VersionExtractor::render(&pattern.label_template, captures.as_ref());
                trace!(
                    "header match: header={}, rule={}, label={}",
                    signature.header_name,
                    pattern.matcher.describe(),
                    label
                );
                detected.insert(label);
            }
        }
    }
}

/// Cookie分析器
pub struct CookieAnalyzer;

impl CookieAnalyzer {
    pub fn analyze(
        table: &SignatureTable,
        headers: &HashMap<String, String>,
        detected: &mut BTreeSet<String>,
    ) {
        let Some(cookies) = headers.get("set-cookie") else {
            return;
        };
        let cookies = cookies.to_lowercase();

        for pattern in &table.cookie_signatures {
            if pattern.matcher.is_match(&cookies) {
                trace!("cookie match: rule={}", pattern.matcher.describe());
                detected.insert(pattern.label_template.clone());
            }
        }
    }
}

/// Body分析器
pub struct BodyAnalyzer;

impl BodyAnalyzer {
    pub fn analyze(table: &SignatureTable, body: &str, detected: &mut BTreeSet<String>) {
        let sample = body_sample(body).to_lowercase();
        if sample.is_empty() {
            return;
        }

        for pattern in &table.body_signatures {
            if pattern.matcher.is_match(&sample) {
                trace!("body match: rule={}", pattern.matcher.describe());
                detected.insert(pattern.label_template.clone());
            }
        }
    }
}

/// 截取前 BODY_SCAN_LIMIT 个字符（按字符边界）
fn body_sample(body: &str) -> &str {
    match body.char_indices().nth(BODY_SCAN_LIMIT) {
        Some((byte_index, _)) => &body[..byte_index],
        None => body,
    }
}
