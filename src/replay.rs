// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! JSONL transaction records for driving the pipeline without a live
//! engine.
//!
//! Each line is one recorded transaction. Malformed lines are skipped
//! with a warning; a bad record never aborts the stream.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::transaction::{Direction, Transaction, TransactionObserver};

/// One recorded transaction as it appears on a JSONL line.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplayRecord {
    pub url: String,

    #[serde(default = "default_direction")]
    pub direction: Direction,

    #[serde(default)]
    pub stated_mime: Option<String>,

    #[serde(default)]
    pub inferred_mime: Option<String>,

    /// Response body as text. Recorded streams carry decoded bodies,
    /// so replayed transactions cannot reproduce undecodable bytes.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_direction() -> Direction {
    Direction::Response
}

impl ReplayRecord {
    pub fn into_transaction(self) -> Transaction {
        let mut tx = match self.direction {
            Direction::Request => Transaction::request(self.url),
            Direction::Response => Transaction::response(self.url),
        };
        tx.stated_mime = self.stated_mime;
        tx.inferred_mime = self.inferred_mime;
        tx.body = self.body.map(Bytes::from);
        tx
    }
}

/// Feed every well-formed JSONL record from `reader` to `observer`.
///
/// Returns the number of transactions delivered. Empty lines are
/// ignored; lines that fail to parse are logged with their line number
/// and skipped.
pub async fn replay<R, O>(reader: R, observer: &O) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
    O: TransactionObserver,
{
    let mut lines = reader.lines();
    let mut line_num = 0u64;
    let mut delivered = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_num += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ReplayRecord>(&line) {
            Ok(record) => {
                observer.on_transaction(&record.into_transaction());
                delivered += 1;
            }
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "failed to parse transaction record, skipping");
            }
        }
    }

    Ok(delivered)
}

/// Replay a JSONL file from disk.
pub async fn replay_path<P, O>(path: P, observer: &O) -> anyhow::Result<u64>
where
    P: AsRef<std::path::Path>,
    O: TransactionObserver,
{
    let file = tokio::fs::File::open(path.as_ref()).await?;
    replay(tokio::io::BufReader::new(file), observer).await
}
