//! 输出模块：JSON / CSV
pub mod csv;
pub mod json;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ReconError, ReconResult};
use crate::model::Asset;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;

/// 输出能力：格式化资产，给定路径时同时写入文件
pub trait OutputWriter {
    fn name(&self) -> &'static str;

    fn write(&self, assets: &[Asset], path: Option<&Path>) -> ReconResult<String>;
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn writer(&self) -> Box<dyn OutputWriter> {
        match self {
            OutputFormat::Json => Box::new(JsonOutput),
            OutputFormat::Csv => Box::new(CsvOutput),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ReconError::InvalidInput(format!("unknown output format: {}", other))),
        }
    }
}

/// 写入文件（若给定路径）
pub(crate) fn persist(output: &str, path: Option<&Path>) -> ReconResult<()> {
    if let Some(path) = path {
        std::fs::write(path, output)?;
    }
    Ok(())
}
