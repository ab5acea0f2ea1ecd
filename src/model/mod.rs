//! 数据模型：资产记录与探测结果
pub mod asset;
pub mod probe;

pub use self::asset::Asset;
pub use self::probe::{ProbeError, ProbeResult};
