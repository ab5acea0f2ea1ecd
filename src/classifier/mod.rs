//! 资产分类：去重、打标签、按模式过滤
pub mod processor;

pub use self::processor::{Classifier, DEFAULT_TAG_PATTERNS, FALSE_POSITIVES, matches_component};
