//! 编译后模式模型
//! 指纹签名编译后的结构

use regex::{Captures, Regex};

#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String), // 包含匹配（忽略大小写）
    Regex(Regex),     // 正则匹配
}

impl Matcher {
    /// 匹配输入，返回捕获结果（正则专用）
    pub fn captures<'a>(&'a self, input: &'a str) -> Option<Captures<'a>> {
        match self {
            Matcher::Regex(regex) => regex.captures(input),
            _ => None, // 字符串匹配无需捕获
        }
    }

    /// 简单匹配判断
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Matcher::Contains(s) => input.to_lowercase().contains(&s.to_lowercase()),
            Matcher::Regex(regex) => regex.is_match(input),
        }
    }

    /// 规则描述
    pub fn describe(&self) -> &str {
        match self {
            Matcher::Contains(s) => s,
            Matcher::Regex(r) => r.as_str(),
        }
    }
}

/// 编译后的签名：匹配器 + 标签模板
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub matcher: Matcher,
    pub label_template: String,
}

/// 某个 Header 上的有序签名列表
#[derive(Debug, Clone)]
pub struct HeaderSignature {
    pub header_name: String,
    pub patterns: Vec<CompiledPattern>,
}

/// 编译后的签名表，进程内只读共享
#[derive(Debug, Clone)]
pub struct SignatureTable {
    pub version: &'static str,
    pub header_signatures: Vec<HeaderSignature>,
    pub cookie_signatures: Vec<CompiledPattern>,
    pub body_signatures: Vec<CompiledPattern>,
}

impl SignatureTable {
    pub fn pattern_count(&self) -> usize {
        self.header_signatures.iter().map(|h| h.patterns.len()).sum::<usize>()
            + self.cookie_signatures.len()
            + self.body_signatures.len()
    }
}
