//! CSV 输出：扁平化列，探测相关列优先取 HTTPS 结果

use std::path::Path;

use csv::Writer;

use super::{OutputWriter, persist};
use crate::error::{ReconError, ReconResult};
use crate::model::Asset;

pub const CSV_COLUMNS: &[&str] = &[
    "domain",
    "source",
    "discovered_at",
    "ip",
    "org",
    "tags",
    "live",
    "https_status",
    "http_status",
    "server",
    "technologies",
    "title",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOutput;

impl CsvOutput {
    fn row(asset: &Asset) -> Vec<String> {
        let probe = asset.preferred_probe();
        let status = |p: &Option<crate::model::ProbeResult>| {
            p.as_ref().map(|r| r.status_code.to_string()).unwrap_or_default()
        };

        vec![
            asset.domain.clone(),
            asset.source.clone(),
            asset.discovered_at.to_rfc3339(),
            asset.ip.map(|ip| ip.to_string()).unwrap_or_default(),
            asset.org.clone().unwrap_or_default(),
            asset.tags.join(","),
            asset.live.map(|live| live.to_string()).unwrap_or_default(),
            status(&asset.https),
            status(&asset.http),
            probe.and_then(|p| p.server.clone()).unwrap_or_default(),
            probe.map(|p| p.technologies.join(",")).unwrap_or_default(),
            probe.and_then(|p| p.title.clone()).unwrap_or_default(),
        ]
    }
}

impl OutputWriter for CsvOutput {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, assets: &[Asset], path: Option<&Path>) -> ReconResult<String> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(CSV_COLUMNS)?;
        for asset in assets {
            wtr.write_record(Self::row(asset))?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| ReconError::InvalidInput(format!("csv flush failed: {}", e)))?;
        let output = String::from_utf8(data)
            .map_err(|e| ReconError::InvalidInput(format!("csv output is not utf-8: {}", e)))?;

        persist(&output, path)?;
        Ok(output)
    }
}
