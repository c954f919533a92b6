//! Outreach log — the one durable record of every action taken.
//!
//! In-memory, append-only during a run; `flush_to_storage` writes rows
//! past a watermark into a CSV store that accumulates across runs. Flush
//! runs on every termination path; calling it again is a no-op rather
//! than an overwrite.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use internscout_common::OutreachAttempt;

const STORE_HEADER: &str = "timestamp,name,company,job_title,status";

pub struct OutreachLog {
    store_path: PathBuf,
    attempts: Vec<OutreachAttempt>,
    flushed: usize,
}

impl OutreachLog {
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path,
            attempts: Vec::new(),
            flushed: 0,
        }
    }

    pub fn append(&mut self, attempt: OutreachAttempt) {
        info!(
            name = attempt.contact_name.as_str(),
            company = attempt.entity_name.as_str(),
            role = %attempt.role_title,
            outcome = %attempt.outcome,
            "Outreach attempt recorded"
        );
        self.attempts.push(attempt);
    }

    pub fn attempts(&self) -> &[OutreachAttempt] {
        &self.attempts
    }

    pub fn unflushed(&self) -> usize {
        self.attempts.len() - self.flushed
    }

    /// Drop pending rows without persisting them (operator-confirmed
    /// discard). A later flush becomes a no-op.
    pub fn discard_pending(&mut self) {
        let dropped = self.unflushed();
        if dropped > 0 {
            warn!(dropped, "Discarding unflushed outreach attempts");
        }
        self.flushed = self.attempts.len();
    }

    /// Append all unflushed rows to the store. Creates the file (with
    /// its header) on first use; repeated calls append further rows,
    /// never overwrite.
    pub fn flush_to_storage(&mut self) -> Result<usize> {
        let pending = &self.attempts[self.flushed..];
        if pending.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let new_store = !self.store_path.exists();
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.store_path)
            .with_context(|| format!("Failed to open {}", self.store_path.display()))?;

        if new_store {
            writeln!(out, "{STORE_HEADER}")?;
        }
        for attempt in pending {
            writeln!(out, "{}", store_row(attempt))?;
        }
        out.flush()?;

        let rows = pending.len();
        self.flushed = self.attempts.len();
        info!(path = %self.store_path.display(), rows, "Outreach log flushed");
        Ok(rows)
    }
}

fn store_row(attempt: &OutreachAttempt) -> String {
    [
        attempt.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        csv_field(&attempt.contact_name),
        csv_field(&attempt.entity_name),
        csv_field(attempt.role_title.as_str()),
        attempt.outcome.to_string(),
    ]
    .join(",")
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
