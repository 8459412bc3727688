// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Best-effort asynchronous delivery of events to the analysis backend.
//!
//! Submission never blocks the caller: events enter a bounded queue and
//! a capped number of deliveries run concurrently behind it. A failed
//! delivery is logged and discarded; nothing is retried and nothing
//! propagates back to the submitting thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Uri};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::TokioExecutor;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::event::OutboundEvent;

type HttpClient = LegacyClient<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Truncation limits for log lines.
pub(crate) const URL_LOG_LIMIT: usize = 60;
const BODY_LOG_LIMIT: usize = 200;

/// Shorten a string for logging, respecting char boundaries.
pub(crate) fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Delivery counters, updated by the worker tasks. Readable at any
/// time without affecting submission.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Events accepted into the queue.
    pub submitted: AtomicU64,
    /// Deliveries the backend acknowledged with a 2xx.
    pub delivered: AtomicU64,
    /// Deliveries that failed (timeout, transport error, non-2xx).
    pub failed: AtomicU64,
    /// Events dropped without delivery (queue full or forwarding disabled).
    pub dropped: AtomicU64,
}

impl DispatchStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Events accepted but not yet resolved either way.
    pub fn pending(&self) -> u64 {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let resolved =
            self.delivered.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed);
        submitted.saturating_sub(resolved)
    }
}

/// Hands events to the backend without ever blocking the submitter.
///
/// Must be constructed inside a tokio runtime; the delivery pump runs
/// as a spawned task. When the HTTPS transport cannot be built or the
/// backend base URL does not parse, the dispatcher degrades to a sink
/// that accepts and drops events (logged once at construction).
pub struct Dispatcher {
    queue: Option<mpsc::Sender<OutboundEvent>>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    pub fn new(cfg: &BackendConfig) -> Self {
        let stats = Arc::new(DispatchStats::default());
        let base_url = cfg.base_url.trim_end_matches('/').to_string();

        if let Err(e) = base_url.parse::<Uri>() {
            warn!(base_url = %base_url, error = %e, "invalid backend URL, forwarding disabled");
            return Self { queue: None, stats };
        }

        let https = match HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder.https_or_http().enable_http1().build(),
            Err(e) => {
                warn!(error = %e, "https transport unavailable, forwarding disabled");
                return Self { queue: None, stats };
            }
        };
        let client: HttpClient = LegacyClient::builder(TokioExecutor::new()).build(https);

        let (tx, rx) = mpsc::channel(cfg.queue_depth.max(1));
        tokio::spawn(pump(
            rx,
            client,
            base_url,
            Duration::from_secs(cfg.timeout_seconds),
            cfg.max_in_flight.max(1),
            stats.clone(),
        ));

        Self {
            queue: Some(tx),
            stats,
        }
    }

    /// Queue an event for delivery and return immediately.
    ///
    /// When the queue is full the event is dropped and counted; the
    /// submitting thread is never delayed by a slow or absent backend.
    pub fn send(&self, event: OutboundEvent) {
        let Some(queue) = &self.queue else {
            DispatchStats::bump(&self.stats.dropped);
            return;
        };
        match queue.try_send(event) {
            Ok(()) => DispatchStats::bump(&self.stats.submitted),
            Err(mpsc::error::TrySendError::Full(ev)) => {
                DispatchStats::bump(&self.stats.dropped);
                debug!(
                    url = %truncate_for_log(&ev.url, URL_LOG_LIMIT),
                    "delivery queue full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                DispatchStats::bump(&self.stats.dropped);
            }
        }
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }

    /// Whether events stand any chance of leaving the process.
    pub fn is_active(&self) -> bool {
        self.queue.is_some()
    }
}

/// Drains the queue, running at most `max_in_flight` deliveries at a time.
async fn pump(
    mut rx: mpsc::Receiver<OutboundEvent>,
    client: HttpClient,
    base_url: String,
    timeout: Duration,
    max_in_flight: usize,
    stats: Arc<DispatchStats>,
) {
    let limit = Arc::new(Semaphore::new(max_in_flight));
    while let Some(event) = rx.recv().await {
        let permit = match limit.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let client = client.clone();
        let base_url = base_url.clone();
        let stats = stats.clone();
        tokio::spawn(async move {
            deliver(&client, &base_url, timeout, &event, &stats).await;
            drop(permit);
        });
    }
}

/// One POST, one fixed timeout, no retry. Every failure terminates in
/// a log line carrying the truncated source URL.
async fn deliver(
    client: &HttpClient,
    base_url: &str,
    timeout: Duration,
    event: &OutboundEvent,
    stats: &DispatchStats,
) {
    let target = format!("{}{}", base_url, event.endpoint());
    let url = truncate_for_log(&event.url, URL_LOG_LIMIT);

    let payload = match serde_json::to_vec(event) {
        Ok(payload) => payload,
        Err(e) => {
            DispatchStats::bump(&stats.failed);
            warn!(%url, error = %e, "failed to serialize event");
            return;
        }
    };

    let req = match Request::builder()
        .method(Method::POST)
        .uri(&target)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(payload)))
    {
        Ok(req) => req,
        Err(e) => {
            DispatchStats::bump(&stats.failed);
            warn!(%url, %target, error = %e, "failed to build request");
            return;
        }
    };

    match tokio::time::timeout(timeout, client.request(req)).await {
        Err(_) => {
            DispatchStats::bump(&stats.failed);
            warn!(%url, %target, timeout_s = timeout.as_secs(), "delivery timed out");
        }
        Ok(Err(e)) => {
            DispatchStats::bump(&stats.failed);
            warn!(%url, %target, error = %e, "delivery failed");
        }
        Ok(Ok(res)) if res.status().is_success() => {
            DispatchStats::bump(&stats.delivered);
        }
        Ok(Ok(res)) => {
            let status = res.status().as_u16();
            let body = match res.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(_) => Bytes::new(),
            };
            let snippet = truncate_for_log(&String::from_utf8_lossy(&body), BODY_LOG_LIMIT);
            DispatchStats::bump(&stats.failed);
            warn!(%url, %target, status, body = %snippet, "backend rejected event");
        }
    }
}
