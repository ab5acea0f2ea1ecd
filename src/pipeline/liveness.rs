//! Liveness & Probing Pipeline
//! 每个资产依次经过：RESOLVING → {DEAD | LIVE} → (PROBING → PROBED)?
//! 资产之间可以并发处理，输出顺序始终与输入一致

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::model::{Asset, ProbeResult};
use crate::prober::Probe;
use crate::resolver::Resolve;

/// 单个资产所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetStage {
    Resolving,
    Dead,
    Live,
    Probing,
    Probed,
}

impl fmt::Display for AssetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetStage::Resolving => "resolving",
            AssetStage::Dead => "dead",
            AssetStage::Live => "live",
            AssetStage::Probing => "probing",
            AssetStage::Probed => "probed",
        };
        f.write_str(name)
    }
}

/// 运行汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub live: usize,
    pub dead: usize,
}

impl PipelineSummary {
    pub fn from_assets(assets: &[Asset]) -> Self {
        Self {
            total: assets.len(),
            live: assets.iter().filter(|a| a.live == Some(true)).count(),
            dead: assets.iter().filter(|a| a.live == Some(false)).count(),
        }
    }
}

/// 流水线输出
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub assets: Vec<Asset>,
    pub summary: PipelineSummary,
}

struct PipelineInner {
    resolver: Arc<dyn Resolve>,
    prober: Option<Arc<dyn Probe>>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancelToken,
}

/// 存活检测与探测流水线
#[derive(Clone)]
pub struct LivenessPipeline {
    inner: Arc<PipelineInner>,
    concurrency: usize,
}

impl LivenessPipeline {
    /// 只做 DNS 存活检测
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                resolver,
                prober: None,
                progress: Arc::new(NoProgress),
                cancel: CancelToken::new(),
            }),
            concurrency: 1,
        }
    }

    /// 对存活主机启用 HTTP/HTTPS 探测
    pub fn with_prober(self, prober: Arc<dyn Probe>) -> Self {
        self.map_inner(|inner| inner.prober = Some(prober))
    }

    pub fn with_progress(self, progress: Arc<dyn ProgressSink>) -> Self {
        self.map_inner(|inner| inner.progress = progress)
    }

    pub fn with_cancel(self, cancel: CancelToken) -> Self {
        self.map_inner(|inner| inner.cancel = cancel)
    }

    /// 并发处理的资产数，至少为 1
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    fn map_inner(self, apply: impl FnOnce(&mut PipelineInner)) -> Self {
        let mut inner = PipelineInner {
            resolver: Arc::clone(&self.inner.resolver),
            prober: self.inner.prober.clone(),
            progress: Arc::clone(&self.inner.progress),
            cancel: self.inner.cancel.clone(),
        };
        apply(&mut inner);
        Self {
            inner: Arc::new(inner),
            concurrency: self.concurrency,
        }
    }

    /// 处理全部资产，单个主机失败不会中断批次
    pub async fn run(&self, assets: Vec<Asset>) -> PipelineReport {
        let total = assets.len();
        info!(
            "checking {} assets (probing: {}, workers: {})",
            total,
            self.inner.prober.is_some(),
            self.concurrency
        );

        let progress = Arc::new(RunProgress::new(Arc::clone(&self.inner.progress), total));
        let assets = if self.concurrency <= 1 || total <= 1 {
            self.run_sequential(assets, &progress).await
        } else {
            self.run_concurrent(assets, &progress).await
        };

        let summary = PipelineSummary::from_assets(&assets);
        self.inner.progress.on_progress(&ProgressEvent::Finished(summary));
        info!(
            "liveness check finished: {} total, {} live, {} dead",
            summary.total, summary.live, summary.dead
        );

        PipelineReport { assets, summary }
    }

    async fn run_sequential(&self, assets: Vec<Asset>, progress: &RunProgress) -> Vec<Asset> {
        let mut processed = Vec::with_capacity(assets.len());
        for (index, asset) in assets.into_iter().enumerate() {
            processed.push(self.inner.process(index + 1, asset, progress).await);
        }
        processed
    }

    /// 有界并发：信号量限制同时处理的资产数，结果写回各自的槽位
    async fn run_concurrent(&self, assets: Vec<Asset>, progress: &Arc<RunProgress>) -> Vec<Asset> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, asset) in assets.iter().cloned().enumerate() {
            let inner = Arc::clone(&self.inner);
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(progress);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, inner.process(index + 1, asset, &progress).await)
            });
        }

        let mut slots = assets;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, asset)) => slots[index] = asset,
                // 任务异常时该槽位保留原始资产
                Err(e) => warn!("asset worker failed: {}", e),
            }
        }
        slots
    }
}

/// 单次运行的进度计数
/// 事件在锁内发出，观察者看到的完成数只增不减
struct RunProgress {
    sink: Arc<dyn ProgressSink>,
    total: usize,
    completed: Mutex<usize>,
}

impl RunProgress {
    fn new(sink: Arc<dyn ProgressSink>, total: usize) -> Self {
        Self {
            sink,
            total,
            completed: Mutex::new(0),
        }
    }

    /// finished 表示该资产已到达终态
    fn emit(&self, index: usize, domain: &str, stage: AssetStage, status: String, finished: bool) {
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        if finished {
            *completed += 1;
        }
        self.sink.on_progress(&ProgressEvent::Stage {
            index,
            current: *completed,
            total: self.total,
            domain: domain.to_string(),
            stage,
            status,
        });
    }
}

impl PipelineInner {
    async fn process(&self, index: usize, asset: Asset, progress: &RunProgress) -> Asset {
        if self.cancel.is_cancelled() {
            debug!("run cancelled, leaving {} unchecked", asset.domain);
            return asset;
        }

        let domain = asset.domain.clone();
        let report = |stage: AssetStage, status: String, finished: bool| {
            progress.emit(index, &domain, stage, status, finished);
        };

        // RESOLVING
        report(AssetStage::Resolving, "resolving".to_string(), false);
        let ip = self.resolver.resolve(&domain).await;
        debug!("dns {} -> {:?}", domain, ip);
        let asset = asset.with_resolution(ip);

        let Some(ip) = ip else {
            report(AssetStage::Dead, "dead (no DNS answer)".to_string(), true);
            return asset;
        };
        report(AssetStage::Live, format!("live ({})", ip), self.prober.is_none());

        let Some(prober) = &self.prober else {
            return asset;
        };

        // PROBING
        report(AssetStage::Probing, "probing http/https".to_string(), false);
        let (http, https) = prober.probe_domain(&domain).await;
        log_probe(&domain, &http);
        log_probe(&domain, &https);
        report(
            AssetStage::Probed,
            format!("probed: http={} https={}", probe_status(&http), probe_status(&https)),
            true,
        );

        asset.with_probes(http, https)
    }
}

fn probe_status(result: &ProbeResult) -> String {
    match &result.error {
        Some(error) => error.to_string(),
        None => result.status_code.to_string(),
    }
}

fn log_probe(domain: &str, result: &ProbeResult) {
    let scheme = if result.tls { "https" } else { "http" };
    match &result.error {
        Some(error) => debug!(
            "{} {} failed: {} ({}ms)",
            scheme, domain, error, result.duration_ms
        ),
        None => debug!(
            "{} {} -> {} [{}] ({}ms)",
            scheme,
            domain,
            result.status_code,
            result.technologies.join(", "),
            result.duration_ms
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::net::IpAddr;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::model::ProbeError;

    /// 固定映射的假解析器，可为每个域名设置延迟
    struct FakeResolver {
        answers: HashMap<String, IpAddr>,
        delays: HashMap<String, Duration>,
    }

    impl FakeResolver {
        fn new(live: &[(&str, &str)]) -> Self {
            Self {
                answers: live
                    .iter()
                    .map(|(d, ip)| (d.to_string(), ip.parse().unwrap()))
                    .collect(),
                delays: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl Resolve for FakeResolver {
        async fn resolve(&self, domain: &str) -> Option<IpAddr> {
            if let Some(delay) = self.delays.get(domain) {
                tokio::time::sleep(*delay).await;
            }
            self.answers.get(domain).copied()
        }
    }

    /// HTTP 失败、HTTPS 成功的假探测器，记录被探测的 URL
    #[derive(Default)]
    struct FakeProber {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Probe for FakeProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            self.calls.lock().unwrap().push(url.to_string());
            if url.starts_with("https://") {
                ProbeResult {
                    url: url.to_string(),
                    status_code: 200,
                    final_url: None,
                    headers: BTreeMap::new(),
                    technologies: vec!["Nginx".to_string()],
                    server: Some("nginx".to_string()),
                    title: Some("Home".to_string()),
                    content_length: None,
                    tls: true,
                    error: None,
                    duration_ms: 3,
                }
            } else {
                ProbeResult::failure(url, ProbeError::ConnectionRefused, 1)
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_progress(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn assets(domains: &[&str]) -> Vec<Asset> {
        domains.iter().map(|d| Asset::new(d, "test").unwrap()).collect()
    }

    #[tokio::test]
    async fn test_dead_hosts_are_not_probed() {
        let resolver = Arc::new(FakeResolver::new(&[("live.mil", "192.0.2.1")]));
        let prober = Arc::new(FakeProber::default());
        let pipeline = LivenessPipeline::new(resolver).with_prober(prober.clone());

        let report = pipeline.run(assets(&["live.mil", "dead.mil"])).await;

        assert_eq!(report.summary, PipelineSummary { total: 2, live: 1, dead: 1 });
        let live = &report.assets[0];
        assert_eq!(live.live, Some(true));
        assert_eq!(live.ip, Some("192.0.2.1".parse().unwrap()));
        assert_eq!(live.http.as_ref().unwrap().error, Some(ProbeError::ConnectionRefused));
        assert_eq!(live.https.as_ref().unwrap().status_code, 200);

        let dead = &report.assets[1];
        assert_eq!(dead.live, Some(false));
        assert!(dead.http.is_none() && dead.https.is_none());

        let calls: HashSet<String> = prober.calls.lock().unwrap().iter().cloned().collect();
        assert_eq!(
            calls,
            HashSet::from(["http://live.mil".to_string(), "https://live.mil".to_string()])
        );
    }

    #[tokio::test]
    async fn test_without_prober_stops_at_live() {
        let resolver = Arc::new(FakeResolver::new(&[("a.mil", "192.0.2.1")]));
        let report = LivenessPipeline::new(resolver).run(assets(&["a.mil"])).await;
        assert_eq!(report.assets[0].live, Some(true));
        assert!(report.assets[0].https.is_none());
    }

    #[tokio::test]
    async fn test_progress_events_per_stage() {
        let resolver = Arc::new(FakeResolver::new(&[("live.mil", "192.0.2.1")]));
        let sink = Arc::new(RecordingSink::default());
        let pipeline = LivenessPipeline::new(resolver)
            .with_prober(Arc::new(FakeProber::default()))
            .with_progress(sink.clone());

        pipeline.run(assets(&["live.mil", "dead.mil"])).await;

        let events = sink.events.lock().unwrap();
        let stages: Vec<(usize, usize, AssetStage)> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Stage { index, current, stage, .. } => Some((*index, *current, *stage)),
                ProgressEvent::Finished(_) => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                (1, 0, AssetStage::Resolving),
                (1, 0, AssetStage::Live),
                (1, 0, AssetStage::Probing),
                (1, 1, AssetStage::Probed),
                (2, 1, AssetStage::Resolving),
                (2, 2, AssetStage::Dead),
            ]
        );
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished(PipelineSummary { total: 2, live: 1, dead: 1 }))
        );
    }

    #[tokio::test]
    async fn test_concurrent_progress_counter_never_decreases() {
        let domains = ["a.mil", "b.mil", "c.mil", "d.mil"];
        let mut resolver = FakeResolver::new(&[]);
        // 越靠前的主机越慢，完成顺序与输入顺序相反
        for (i, d) in domains.iter().enumerate() {
            resolver
                .delays
                .insert(d.to_string(), Duration::from_millis(((4 - i) * 20) as u64));
        }
        let sink = Arc::new(RecordingSink::default());

        LivenessPipeline::new(Arc::new(resolver))
            .with_progress(sink.clone())
            .with_concurrency(4)
            .run(assets(&domains))
            .await;

        let events = sink.events.lock().unwrap();
        let counters: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Stage { current, .. } => Some(*current),
                ProgressEvent::Finished(_) => None,
            })
            .collect();
        assert!(counters.windows(2).all(|w| w[0] <= w[1]), "{:?}", counters);

        let dead: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Stage { index, current, stage: AssetStage::Dead, .. } => {
                    Some((*index, *current))
                }
                _ => None,
            })
            .collect();
        assert_eq!(dead, vec![(4, 1), (3, 2), (2, 3), (1, 4)]);
    }

    #[tokio::test]
    async fn test_progress_does_not_change_output() {
        let domains = ["a.mil", "b.mil", "c.mil"];
        let resolver = Arc::new(FakeResolver::new(&[("a.mil", "192.0.2.1"), ("c.mil", "192.0.2.3")]));

        let quiet = LivenessPipeline::new(resolver.clone()).run(assets(&domains)).await;
        let noisy = LivenessPipeline::new(resolver)
            .with_progress(Arc::new(RecordingSink::default()))
            .run(assets(&domains))
            .await;

        let strip = |a: &Asset| (a.domain.clone(), a.ip, a.live);
        assert_eq!(
            quiet.assets.iter().map(strip).collect::<Vec<_>>(),
            noisy.assets.iter().map(strip).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_concurrent_run_preserves_input_order() {
        let domains: Vec<String> = (0..12).map(|i| format!("h{}.mil", i)).collect();
        let live: Vec<(String, String)> = domains
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 3 != 0)
            .map(|(i, d)| (d.clone(), format!("192.0.2.{}", i + 1)))
            .collect();
        let live_refs: Vec<(&str, &str)> =
            live.iter().map(|(d, ip)| (d.as_str(), ip.as_str())).collect();

        let mut resolver = FakeResolver::new(&live_refs);
        // 越靠前的主机越慢，迫使完成顺序与输入顺序相反
        for (i, d) in domains.iter().enumerate() {
            resolver
                .delays
                .insert(d.clone(), Duration::from_millis(((12 - i) * 5) as u64));
        }

        let input: Vec<Asset> = domains.iter().map(|d| Asset::new(d, "test").unwrap()).collect();
        let report = LivenessPipeline::new(Arc::new(resolver))
            .with_prober(Arc::new(FakeProber::default()))
            .with_concurrency(4)
            .run(input)
            .await;

        let order: Vec<&str> = report.assets.iter().map(|a| a.domain.as_str()).collect();
        assert_eq!(order, domains.iter().map(String::as_str).collect::<Vec<_>>());
        for (i, asset) in report.assets.iter().enumerate() {
            assert_eq!(asset.live, Some(i % 3 != 0), "{}", asset.domain);
            assert_eq!(asset.https.is_some(), i % 3 != 0);
        }
        assert_eq!(report.summary, PipelineSummary { total: 12, live: 8, dead: 4 });
    }

    #[tokio::test]
    async fn test_cancelled_run_leaves_assets_unchecked() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let resolver = Arc::new(FakeResolver::new(&[("a.mil", "192.0.2.1")]));
        let report = LivenessPipeline::new(resolver)
            .with_cancel(cancel)
            .run(assets(&["a.mil", "b.mil"]))
            .await;

        assert_eq!(report.assets.len(), 2);
        assert!(report.assets.iter().all(|a| a.live.is_none()));
        assert_eq!(report.summary, PipelineSummary { total: 2, live: 0, dead: 0 });
    }
}
