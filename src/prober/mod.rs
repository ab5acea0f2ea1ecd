//! HTTP 探测模块
pub mod classify;
pub mod http;

pub use self::classify::{classify_error, classify_failure};
pub use self::http::{HttpProber, Probe};
