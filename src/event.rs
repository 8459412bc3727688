// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Outbound events and their backend wire format.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Response body bytes could not be decoded as UTF-8 text.
#[derive(Debug, Error)]
#[error("response body is not valid UTF-8: {0}")]
pub struct BodyDecodeError(#[from] std::string::FromUtf8Error);

/// The two event shapes the backend distinguishes by endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Seen,
    Analyze,
}

/// Immutable outbound record, created per transaction and consumed
/// exactly once by the dispatcher.
///
/// Serializes to the backend wire shape: `{"url": ...}` for Seen,
/// `{"url": ..., "content": ...}` for Analyze.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    #[serde(skip)]
    pub kind: EventKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl OutboundEvent {
    /// Minimal record noting a non-suppressed transaction was observed.
    pub fn seen(url: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Seen,
            url: url.into(),
            content: None,
        }
    }

    /// Record carrying the decoded script body for backend analysis.
    ///
    /// Decoding is strict UTF-8; on failure the caller drops this event
    /// only, leaving the transaction's Seen event unaffected.
    pub fn analyze(url: impl Into<String>, body: &Bytes) -> Result<Self, BodyDecodeError> {
        let content = String::from_utf8(body.to_vec())?;
        Ok(Self {
            kind: EventKind::Analyze,
            url: url.into(),
            content: Some(content),
        })
    }

    /// Backend endpoint path this event is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self.kind {
            EventKind::Seen => "/log",
            EventKind::Analyze => "/analyze",
        }
    }
}
