//! 版本提取工具模块
//! 根据标签模板与正则捕获结果生成技术标签
//! 支持 \1/\2 或 $1/$2 两种分组引用格式，分组缺失或为空时连同前导 `/` 一起省略

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(/?)(?:\\|\$)(\d)").expect("placeholder regex is valid")
});

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 展开标签模板
    ///
    /// `IIS/$1` + 捕获 `8.5` -> `IIS/8.5`；无捕获 -> `IIS`
    pub fn render(template: &str, captures: Option<&Captures>) -> String {
        if !template.contains(['$', '\\']) {
            return template.to_string();
        }

        let rendered = PLACEHOLDER_REGEX.replace_all(template, |placeholder: &Captures| {
            let group_index: usize = placeholder[2].parse().unwrap_or(0);
            let value = captures
                .and_then(|cap| cap.get(group_index))
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty() && group_index > 0);

            match value {
                Some(v) => format!("{}{}", &placeholder[1], v),
                None => String::new(),
            }
        });

        rendered.trim().to_string()
    }

    /// 模板是否引用了捕获分组
    pub fn expects_capture(template: &str) -> bool {
        PLACEHOLDER_REGEX.is_match(template)
    }
}
