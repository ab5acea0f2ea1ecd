//! 指纹模块：签名表、分析器与检测器
pub mod analyzer;
pub mod detector;
pub mod pattern;
pub mod signatures;

pub use self::detector::{TechDetector, detect};
pub use self::pattern::{CompiledPattern, HeaderSignature, Matcher, SignatureTable};
pub use self::signatures::{DEFAULT_SIGNATURES, SIGNATURE_TABLE_VERSION, SignatureCompiler};
