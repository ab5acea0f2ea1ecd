//! rsrecon 命令行入口
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rsrecon::{
    AssetSource, CancelToken, Classifier, ConfigManager, CrtshSource, DnsResolver, FileSource,
    GlobalConfig, HttpProber, LivenessPipeline, OutputFormat, ProgressEvent, ProgressSink,
    DEFAULT_QUERY,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Certificate transparency asset discovery and liveness probing", long_about = None)]
struct Cli {
    /// crt.sh query (use % as wildcard)
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Load assets from a local JSON or line list instead of crt.sh
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Comma separated keywords; keep only hosts with a matching label component
    #[arg(long)]
    filter: Option<String>,

    /// Resolve every asset and mark it live or dead
    #[arg(long)]
    check_live: bool,

    /// Emit only live assets (implies --check-live)
    #[arg(long)]
    live_only: bool,

    /// Probe live hosts over HTTP and HTTPS (implies --check-live)
    #[arg(long)]
    probe: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// DNS timeout in seconds
    #[arg(long, default_value_t = 60)]
    dns_timeout: u64,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout: u64,

    /// Number of assets checked in parallel
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,
}

impl Cli {
    fn needs_liveness(&self) -> bool {
        self.check_live || self.live_only || self.probe
    }

    fn config(&self) -> GlobalConfig {
        ConfigManager::custom()
            .dns_timeout(Duration::from_secs(self.dns_timeout))
            .http_timeout(Duration::from_secs(self.http_timeout))
            .concurrency(self.concurrency)
            .probe_http(self.probe)
            .build()
    }
}

/// 终端进度条
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {wide_msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Stage { current, domain, status, .. } => {
                self.bar.set_position(*current as u64);
                self.bar.set_message(format!("{} {}", domain, status));
            }
            ProgressEvent::Finished(summary) => {
                self.bar.finish_and_clear();
                eprintln!(
                    "[*] {} assets: {} live, {} dead",
                    summary.total, summary.live, summary.dead
                );
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "rsrecon=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.config();

    let source: Box<dyn AssetSource> = match &cli.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(CrtshSource::new(&config)?),
    };
    let assets = source
        .fetch(&cli.query)
        .await
        .with_context(|| format!("failed to load assets from {}", source.name()))?;
    info!("{} returned {} assets", source.name(), assets.len());

    let classifier = Classifier::from_csv(cli.filter.as_deref().unwrap_or_default());
    let mut assets = classifier.process(assets);
    info!("{} assets after classification", assets.len());

    if cli.needs_liveness() && !assets.is_empty() {
        let cancel = CancelToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, finishing in-flight hosts");
                signal_token.cancel();
            }
        });

        let resolver = Arc::new(DnsResolver::from_config(&config));
        let mut pipeline = LivenessPipeline::new(resolver)
            .with_concurrency(config.concurrency)
            .with_cancel(cancel);
        if config.probe_http {
            pipeline = pipeline.with_prober(Arc::new(HttpProber::new(&config)?));
        }
        if !cli.no_progress {
            pipeline = pipeline.with_progress(Arc::new(BarProgress::new(assets.len())));
        }

        assets = pipeline.run(assets).await.assets;
    }

    if cli.live_only {
        assets.retain(|asset| asset.live == Some(true));
    }

    let writer = cli.format.writer();
    let output = writer
        .write(&assets, cli.output.as_deref())
        .with_context(|| format!("failed to write {} output", writer.name()))?;

    match &cli.output {
        Some(path) => eprintln!("[+] {} assets written to {}", assets.len(), path.display()),
        None => println!("{}", output),
    }

    Ok(())
}
