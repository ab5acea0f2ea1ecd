//! 存活检测与探测流水线
pub mod cancel;
pub mod liveness;
pub mod progress;

pub use self::cancel::CancelToken;
pub use self::liveness::{AssetStage, LivenessPipeline, PipelineReport, PipelineSummary};
pub use self::progress::{NoProgress, ProgressEvent, ProgressSink};
