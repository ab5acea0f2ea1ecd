//! 工具模块
pub mod header_converter;
pub mod version_extractor;

pub use self::header_converter::{HeaderConverter, INTERESTING_HEADERS};
pub use self::version_extractor::VersionExtractor;
