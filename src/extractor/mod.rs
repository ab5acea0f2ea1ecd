//! 提取模块
pub mod html_extractor;

pub use self::html_extractor::{HtmlExtractor, TITLE_LIMIT};
