// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Implementation of `faff backfill`.

use std::sync::Arc;

use faff_config::FaffConfig;
use faff_core::{EmbeddingAdapter, FaffError, MessageStore, PluginAdapter};
use faff_embedding::EmbeddingClient;
use faff_messaging::{BackfillJob, BackfillReport};
use faff_storage::SqliteStore;
use tracing::{info, warn};

use crate::shutdown;

/// Run one backfill pass and print the report as JSON on stdout.
///
/// Fails when the store errors, or when rows remain but none could be embedded.
pub async fn run_backfill(config: FaffConfig) -> Result<(), FaffError> {
    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
    let client = Arc::new(EmbeddingClient::new(&config.embedding)?);

    let messages: Arc<dyn MessageStore> = store.clone();
    let embedder: Arc<dyn EmbeddingAdapter> = client.clone();
    let job = BackfillJob::new(messages, embedder, &config.backfill);

    let cancel = shutdown::install_signal_handler();
    let outcome = job.run(&cancel).await;

    if let Err(e) = store.shutdown().await {
        warn!("storage shutdown failed: {e}");
    }

    let report = outcome?;
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| FaffError::Internal(format!("failed to encode report: {e}")))?;
    println!("{rendered}");

    check_report(&report)?;
    info!(remaining = report.remaining, "backfill complete");
    Ok(())
}

fn check_report(report: &BackfillReport) -> Result<(), FaffError> {
    if report.cancelled || report.remaining == 0 || report.embedded + report.skipped > 0 {
        return Ok(());
    }
    Err(FaffError::Internal(format!(
        "backfill made no progress: {} rows still lack vectors",
        report.remaining
    )))
}
