//! 全局错误类型定义
//! 单主机的解析/探测失败不会进入这里，它们作为数据记录在 Asset/ProbeResult 上

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum ReconError {
    // 数据源相关错误
    #[error("source request failed: {0}")]
    SourceError(String),
    #[error("source temporarily unavailable (status {status}): {url}")]
    SourceUnavailable { status: u16, url: String },

    // 初始化相关错误
    #[error("failed to initialize HTTP prober: {0}")]
    ProberInitError(String),
    #[error("failed to compile pattern: {0}")]
    RegexCompileError(#[from] RegexError),

    // 网络相关错误
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("json error: {0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),

    // 基础错误
    #[error("io error: {0}")]
    IoError(#[from] IoError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ReconError {
    /// 是否可重试（上游仍在处理/过载）
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconError::SourceUnavailable { .. } => true,
            ReconError::HttpError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// 全局Result类型
pub type ReconResult<T> = Result<T, ReconError>;
