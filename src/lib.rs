//! rsrecon - 证书透明日志资产发现与存活探测工具
//!
//! 流程：数据源（crt.sh / 本地文件）→ 去重打标与过滤 → DNS 存活检测
//! → HTTP/HTTPS 探测与技术栈识别 → JSON / CSV 输出

// 导出全局错误类型
pub use self::error::{ReconError, ReconResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig, RetryPolicy, DEFAULT_QUERY};

// 导出数据模型
pub use self::model::{Asset, ProbeError, ProbeResult};

// 导出数据源
pub use self::source::{AssetSource, CrtshSource, FileSource};

// 导出分类器
pub use self::classifier::Classifier;

// 导出解析与探测
pub use self::resolver::{DnsResolver, Resolve};
pub use self::prober::{HttpProber, Probe};

// 导出指纹识别
pub use self::fingerprint::{SignatureTable, TechDetector, DEFAULT_SIGNATURES};

// 导出提取与工具
pub use self::extractor::HtmlExtractor;
pub use self::utils::{HeaderConverter, VersionExtractor};

// 导出流水线
pub use self::pipeline::{
    CancelToken, LivenessPipeline, NoProgress, PipelineReport, PipelineSummary, ProgressEvent,
    ProgressSink,
};

// 导出输出模块
pub use self::output::{CsvOutput, JsonOutput, OutputFormat, OutputWriter};

// 声明所有子模块
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fingerprint;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prober;
pub mod resolver;
pub mod source;
pub mod utils;
