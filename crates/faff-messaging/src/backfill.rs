// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation job that fills in vectors for messages stored without one.

use std::sync::Arc;
use std::time::Duration;

use faff_config::model::BackfillConfig;
use faff_core::{EmbeddingAdapter, FaffError, MessageStore};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::recording;

/// Totals for one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Rows handed to the embedder.
    pub processed: u64,
    /// Rows that received a vector from this run.
    pub embedded: u64,
    /// Rows that already had a vector by the time the update ran.
    pub skipped: u64,
    /// Rows whose embedding failed; they stay absent-vector.
    pub failed: u64,
    /// Rows still without a vector when the run ended.
    pub remaining: u64,
    /// Batches fetched.
    pub batches: u64,
    /// The run stopped because cancellation was requested.
    pub cancelled: bool,
}

/// Sequentially embeds absent-vector messages, oldest first, with pacing.
///
/// Stops when nothing is pending or a whole batch makes no progress, so a
/// provider that rejects every remaining row cannot loop it forever.
pub struct BackfillJob {
    store: Arc<dyn MessageStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    batch_size: usize,
    pacing: Duration,
}

impl BackfillJob {
    pub fn new(
        store: Arc<dyn MessageStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &BackfillConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            batch_size: config.batch_size.max(1),
            pacing: Duration::from_millis(config.sleep_ms),
        }
    }

    /// Run to completion or until `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<BackfillReport, FaffError> {
        let mut report = BackfillReport::default();
        let initial = self.store.count_missing_vectors().await?;
        info!(pending = initial, batch_size = self.batch_size, "backfill starting");

        loop {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let pending = self.store.count_missing_vectors().await?;
            if pending == 0 {
                break;
            }

            let batch = self.store.select_missing_vector_batch(self.batch_size).await?;
            if batch.is_empty() {
                break;
            }
            report.batches += 1;

            let mut progress = 0u64;
            for message in batch {
                report.processed += 1;
                match self.embedder.embed(&message.message).await {
                    Ok(vector) => {
                        if self.store.update_vector(message.id, &vector).await? {
                            report.embedded += 1;
                        } else {
                            report.skipped += 1;
                        }
                        progress += 1;
                    }
                    Err(e) => {
                        report.failed += 1;
                        recording::record_embedding_failure("backfill");
                        warn!(message_id = message.id.0, error = %e, "backfill embedding failed");
                    }
                }

                if self.pause(cancel).await {
                    report.cancelled = true;
                    break;
                }
            }

            recording::record_backfill_embedded(progress);
            info!(
                batch = report.batches,
                progress,
                embedded = report.embedded,
                failed = report.failed,
                pending_before = pending,
                "backfill batch complete"
            );

            if report.cancelled {
                break;
            }
            if progress == 0 {
                warn!(pending, "backfill batch made no progress, stopping");
                break;
            }
        }

        report.remaining = self.store.count_missing_vectors().await?;
        info!(
            processed = report.processed,
            embedded = report.embedded,
            failed = report.failed,
            remaining = report.remaining,
            cancelled = report.cancelled,
            "backfill finished"
        );
        Ok(report)
    }

    /// Sleep the inter-item delay; returns `true` if cancelled meanwhile.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        if self.pacing.is_zero() {
            return cancel.is_cancelled();
        }
        tokio::select! {
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(self.pacing) => false,
        }
    }
}
