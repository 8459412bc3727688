// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Sifts intercepted HTTP traffic and relays script content to an
//! analysis backend.
//!
//! This library provides the core pipeline for sift-http: URL-pattern
//! suppression, script MIME detection, and non-blocking best-effort
//! event delivery. A host engine drives it through the
//! [`transaction::TransactionObserver`] interface; the engine's own
//! traffic handling is never blocked or modified.

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod pipeline;
pub mod replay;
pub mod transaction;

#[cfg(test)]
mod test_helpers;

// Keep library small; main.rs remains the binary entrypoint.
