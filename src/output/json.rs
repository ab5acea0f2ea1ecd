//! JSON 输出：资产记录原样序列化为数组

use std::path::Path;

use super::{OutputWriter, persist};
use crate::error::ReconResult;
use crate::model::Asset;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOutput;

impl OutputWriter for JsonOutput {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&self, assets: &[Asset], path: Option<&Path>) -> ReconResult<String> {
        let output = serde_json::to_string_pretty(assets)?;
        persist(&output, path)?;
        Ok(output)
    }
}
