//! DNS 解析模块
pub mod dns;

pub use self::dns::{DnsResolver, Resolve};
