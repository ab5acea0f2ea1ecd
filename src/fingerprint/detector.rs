//! 检测器核心：整合各类分析器，输出排序去重后的技术标签
use std::collections::{BTreeSet, HashMap};

use super::analyzer::{BodyAnalyzer, CookieAnalyzer, HeaderAnalyzer};
use super::pattern::SignatureTable;
use super::signatures::DEFAULT_SIGNATURES;

/// 技术检测器
/// 纯函数，无 I/O 无状态，可在多个任务间共享
#[derive(Debug, Clone, Copy)]
pub struct TechDetector {
    table: &'static SignatureTable,
}

impl Default for TechDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TechDetector {
    /// 使用内置签名表
    pub fn new() -> Self {
        Self {
            table: &DEFAULT_SIGNATURES,
        }
    }

    /// 核心检测接口
    /// headers 的键名大小写不敏感
    pub fn detect(&self, headers: &HashMap<String, String>, body: &str) -> Vec<String> {
        // 1. 统一 Header 键名为小写
        let normalized: HashMap<String, String> = headers
            .iter()
            .map(|(key, value)| (key.to_lowercase(), value.clone()))
            .collect();

        // 2. 执行各类分析
        let mut detected = BTreeSet::new();
        HeaderAnalyzer::analyze(self.table, &normalized, &mut detected);
        CookieAnalyzer::analyze(self.table, &normalized, &mut detected);
        BodyAnalyzer::analyze(self.table, body, &mut detected);

        // 3. BTreeSet 保证输出有序
        detected.into_iter().collect()
    }
}

/// 对外暴露的简化接口
pub fn detect(headers: &HashMap<String, String>, body: &str) -> Vec<String> {
    TechDetector::new().detect(headers, body)
}
