// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Shared test utilities to reduce duplication across test modules.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;

use crate::transaction::Transaction;

/// Response transaction that classifies as script under the stock MIME
/// prefixes, with a decodable body.
pub fn make_script_response(url: &str) -> Transaction {
    let mut tx = Transaction::response(url);
    tx.stated_mime = Some("application/javascript; charset=utf-8".to_string());
    tx.body = Some(Bytes::from_static(b"console.log(1)"));
    tx
}

/// In-process backend that records every POSTed (path, JSON body) pair
/// and answers with a fixed status.
pub struct RecordingBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl RecordingBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_recording_backend(status: StatusCode) -> RecordingBackend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend listener");
    let addr = listener.local_addr().expect("local addr");
    let requests: Arc<Mutex<Vec<(String, serde_json::Value)>>> = Arc::new(Mutex::new(Vec::new()));

    let accept_log = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let log = accept_log.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let log = log.clone();
                    async move {
                        let path = req.uri().path().to_string();
                        let body = match req.into_body().collect().await {
                            Ok(collected) => collected.to_bytes(),
                            Err(_) => Bytes::new(),
                        };
                        let json = serde_json::from_slice(&body)
                            .unwrap_or(serde_json::Value::Null);
                        log.lock().unwrap().push((path, json));
                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .body(Full::new(Bytes::from_static(b"{\"success\":true}")))
                                .expect("build response"),
                        )
                    }
                });
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    RecordingBackend { addr, requests }
}
