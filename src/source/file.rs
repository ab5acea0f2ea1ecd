//! 本地文件数据源
//! `[` 开头按 JSON 资产数组解析（与 JSON 输出格式一致），否则按每行一个主机名解析

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::AssetSource;
use crate::error::{ReconError, ReconResult};
use crate::model::Asset;
use crate::model::asset::normalize_domain;

pub const SOURCE_NAME: &str = "file";

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取并解析文件，遇到不合法记录立即失败
    pub async fn load(&self) -> ReconResult<Vec<Asset>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let assets = parse_assets(&content)?;
        debug!("loaded {} assets from {}", assets.len(), self.path.display());
        Ok(assets)
    }
}

#[async_trait]
impl AssetSource for FileSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    /// 文件源忽略查询模式
    async fn fetch(&self, _query: &str) -> ReconResult<Vec<Asset>> {
        self.load().await
    }
}

/// 解析文件内容
pub fn parse_assets(content: &str) -> ReconResult<Vec<Asset>> {
    if content.trim_start().starts_with('[') {
        let records: Vec<Asset> = serde_json::from_str(content)?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, mut asset)| {
                asset.domain = normalize_domain(&asset.domain).ok_or_else(|| {
                    ReconError::InvalidInput(format!(
                        "record {}: not a hostname: {:?}",
                        index, asset.domain
                    ))
                })?;
                Ok(asset)
            })
            .collect()
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(index, line)| {
                Asset::new(line, SOURCE_NAME).map_err(|_| {
                    ReconError::InvalidInput(format!(
                        "line {}: not a hostname: {:?}",
                        index + 1,
                        line.trim()
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_plain_list() {
        let assets = parse_assets("# targets\nWWW.ARMY.MIL\n\n*.navy.mil\n").unwrap();
        let domains: Vec<&str> = assets.iter().map(|a| a.domain.as_str()).collect();
        assert_eq!(domains, vec!["www.army.mil", "navy.mil"]);
        assert!(assets.iter().all(|a| a.source == SOURCE_NAME));
    }

    #[test]
    fn test_plain_list_fails_fast_on_email() {
        let err = parse_assets("a.mil\nuser@b.mil\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_json_records() {
        let json = r#"[{"domain":"Portal.AF.mil","source":"crtsh","discovered_at":"2024-05-01T12:00:00Z","tags":["portal"],"live":true}]"#;
        let assets = parse_assets(json).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].domain, "portal.af.mil");
        assert_eq!(assets[0].source, "crtsh");
        assert_eq!(assets[0].tags, vec!["portal"]);
        assert_eq!(assets[0].live, Some(true));
    }

    #[test]
    fn test_malformed_json_record_is_an_error() {
        assert!(parse_assets(r#"[{"source":"crtsh"}]"#).is_err());
        assert!(parse_assets(r#"[{"domain":"","source":"crtsh"}]"#).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "vpn.a.mil").unwrap();
        writeln!(file, "dev.a.mil").unwrap();

        let source = FileSource::new(file.path());
        let assets = source.fetch("ignored").await.unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(source.name(), "file");
    }
}
