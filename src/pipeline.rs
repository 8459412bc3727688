// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! Glue between a traffic engine and the classifier/dispatcher pair.
//!
//! Everything here runs synchronously on the engine's notification
//! thread and must stay fast: suppression check, MIME check, event
//! construction. The network happens behind the dispatcher's queue.

use tracing::{debug, warn};

use crate::classify::{ScriptMimes, SuppressionList};
use crate::config::Config;
use crate::dispatch::{truncate_for_log, Dispatcher, URL_LOG_LIMIT};
use crate::event::OutboundEvent;
use crate::transaction::{Direction, Transaction, TransactionObserver};

pub struct Pipeline {
    suppression: SuppressionList,
    script_mimes: ScriptMimes,
    dispatcher: Dispatcher,
}

impl Pipeline {
    pub fn new(suppression: SuppressionList, script_mimes: ScriptMimes, dispatcher: Dispatcher) -> Self {
        Self {
            suppression,
            script_mimes,
            dispatcher,
        }
    }

    /// Build the full pipeline from startup configuration.
    ///
    /// Fails open: a suppression pattern that does not compile degrades
    /// to an empty rule set (logged) rather than disabling forwarding,
    /// and a dispatcher without a usable transport becomes a sink.
    pub fn from_config(cfg: &Config) -> Self {
        let suppression = match SuppressionList::compile(&cfg.suppress) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "suppression rules unusable, continuing with none");
                SuppressionList::empty()
            }
        };
        let script_mimes = ScriptMimes::new(&cfg.script_mimes);
        let dispatcher = Dispatcher::new(&cfg.backend);
        Self::new(suppression, script_mimes, dispatcher)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn suppression(&self) -> &SuppressionList {
        &self.suppression
    }
}

impl TransactionObserver for Pipeline {
    fn on_transaction(&self, tx: &Transaction) {
        // Only responses are inspected; the response carries its own
        // recorded request URL.
        if tx.direction == Direction::Request {
            return;
        }
        if tx.url.is_empty() {
            warn!("transaction without a URL, skipping");
            return;
        }
        if self.suppression.is_ignored(&tx.url) {
            debug!(url = %truncate_for_log(&tx.url, URL_LOG_LIMIT), "suppressed");
            return;
        }

        self.dispatcher.send(OutboundEvent::seen(&tx.url));

        let Some(matched) = self
            .script_mimes
            .matched_prefix(tx.stated_mime.as_deref(), tx.inferred_mime.as_deref())
        else {
            return;
        };
        let Some(body) = &tx.body else {
            debug!(
                url = %truncate_for_log(&tx.url, URL_LOG_LIMIT),
                matched,
                "script match without a body, nothing to analyze"
            );
            return;
        };
        match OutboundEvent::analyze(&tx.url, body) {
            Ok(event) => {
                debug!(
                    url = %truncate_for_log(&tx.url, URL_LOG_LIMIT),
                    matched,
                    bytes = body.len(),
                    "forwarding script body"
                );
                self.dispatcher.send(event);
            }
            Err(e) => {
                // The Seen event above already went out; only the
                // analyze half is lost.
                warn!(
                    url = %truncate_for_log(&tx.url, URL_LOG_LIMIT),
                    error = %e,
                    "dropping analyze event"
                );
            }
        }
    }
}
