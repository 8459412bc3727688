// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use sift_http::{config, pipeline, replay};

#[derive(Parser, Debug)]
#[command(name = "sift-http")]
struct Args {
    /// Optional config TOML path (backend URL, suppression rules, MIME prefixes)
    #[arg(long)]
    config: Option<String>,

    /// JSONL transaction stream to replay; reads stdin when omitted
    #[arg(long)]
    input: Option<String>,

    /// Seconds to wait for queued deliveries before exiting
    #[arg(long, default_value_t = 15)]
    drain_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    // Load config: optional CLI path; fail open to defaults.
    let cfg = if let Some(ref p) = args.config {
        config::Config::load_from_path(p).await.unwrap_or_else(|e| {
            warn!(%p, %e, "failed to load config, using defaults");
            config::Config::default()
        })
    } else {
        config::Config::default()
    };

    info!(
        backend = %cfg.backend.base_url,
        rules = cfg.suppress.len(),
        mimes = cfg.script_mimes.len(),
        "starting"
    );

    let pipeline = pipeline::Pipeline::from_config(&cfg);

    let processed = tokio::select! {
        res = run_replay(&args, &pipeline) => res?,
        _ = signal::ctrl_c() => {
            info!("interrupted");
            0
        }
    };

    drain(&pipeline, Duration::from_secs(args.drain_timeout)).await;

    let stats = pipeline.dispatcher().stats();
    info!(
        processed,
        delivered = stats.delivered.load(Ordering::Relaxed),
        failed = stats.failed.load(Ordering::Relaxed),
        dropped = stats.dropped.load(Ordering::Relaxed),
        "done"
    );

    Ok(())
}

async fn run_replay(args: &Args, pipeline: &pipeline::Pipeline) -> anyhow::Result<u64> {
    match &args.input {
        Some(path) => replay::replay_path(path, pipeline).await,
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            replay::replay(stdin, pipeline).await
        }
    }
}

/// Give queued deliveries a chance to finish; whatever is still in
/// flight at the deadline is abandoned.
async fn drain(pipeline: &pipeline::Pipeline, limit: Duration) {
    let stats = pipeline.dispatcher().stats();
    let started = Instant::now();
    while stats.pending() > 0 {
        if started.elapsed() > limit {
            warn!(pending = stats.pending(), "drain timeout, abandoning deliveries");
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
