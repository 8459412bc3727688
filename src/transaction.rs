// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Canonical transaction view handed to the observer pipeline.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which half of the exchange a notification describes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Request,
    Response,
}

/// Read-only view of one HTTP exchange as observed by the host engine.
///
/// A transaction exists only for the duration of one observer callback;
/// the pipeline never retains it.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,

    /// Absolute URL of the originating request.
    pub url: String,

    /// Content-Type header value, if the server sent one.
    pub stated_mime: Option<String>,

    /// Content type sniffed by the engine, if any.
    pub inferred_mime: Option<String>,

    /// Raw response body bytes; absent for requests and bodiless responses.
    pub body: Option<Bytes>,
}

impl Transaction {
    /// Response-direction transaction skeleton for construction sites and tests.
    pub fn response(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            direction: Direction::Response,
            url: url.into(),
            stated_mime: None,
            inferred_mime: None,
            body: None,
        }
    }

    /// Request-direction transaction skeleton.
    pub fn request(url: impl Into<String>) -> Self {
        Self {
            direction: Direction::Request,
            ..Self::response(url)
        }
    }
}

/// Explicit interface between a traffic engine and this crate.
///
/// Any engine that can produce [`Transaction`] values can drive the
/// pipeline, real interceptor and test double alike. Implementations
/// must be cheap and non-blocking: the engine calls this on its own
/// traffic-handling thread.
pub trait TransactionObserver: Send + Sync {
    fn on_transaction(&self, tx: &Transaction);
}
