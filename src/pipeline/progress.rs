//! 进度事件与观察者接口
//! 进度只是旁路通知，不影响流水线输出

use super::liveness::{AssetStage, PipelineSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// 单个资产的阶段变化
    /// index 为资产在输入中的位置（从 1 开始），current 为已完成的资产数，不会回退
    Stage {
        index: usize,
        current: usize,
        total: usize,
        domain: String,
        stage: AssetStage,
        status: String,
    },
    /// 运行结束时的汇总
    Finished(PipelineSummary),
}

/// 进度观察者
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// 丢弃所有进度事件
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}
