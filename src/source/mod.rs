//! 数据源模块：证书透明日志查询与本地文件加载
pub mod crtsh;
pub mod file;

use async_trait::async_trait;

use crate::error::ReconResult;
use crate::model::Asset;

pub use self::crtsh::{CrtshEntry, CrtshSource, normalize_names};
pub use self::file::FileSource;

/// 数据源能力：按查询模式返回资产
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// 数据源名称，写入 Asset.source
    fn name(&self) -> &str;

    async fn fetch(&self, query: &str) -> ReconResult<Vec<Asset>>;
}
