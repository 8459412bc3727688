// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Fake analysis backend shared by the integration tests.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;

/// Records every POSTed (path, JSON body) pair and answers with a
/// fixed status.
pub struct FakeBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl FakeBackend {
    pub async fn spawn(status: StatusCode) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind backend listener");
        let addr = listener.local_addr().expect("local addr");
        let requests: Arc<Mutex<Vec<(String, serde_json::Value)>>> =
            Arc::new(Mutex::new(Vec::new()));

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
                            let json =
                                serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
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

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// Poll until the backend has received `count` requests.
    pub async fn wait_for_requests(&self, count: usize) -> Vec<(String, serde_json::Value)> {
        for _ in 0..200 {
            let requests = self.requests();
            if requests.len() >= count {
                return requests;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "backend received {} requests, expected {}",
            self.requests().len(),
            count
        );
    }
}
