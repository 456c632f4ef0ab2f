// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Implementation of `faff serve`.

use std::sync::Arc;

use faff_config::FaffConfig;
use faff_core::{EmbeddingAdapter, FaffError, PluginAdapter};
use faff_embedding::EmbeddingClient;
use faff_gateway::AppState;
use faff_storage::SqliteStore;
use tracing::{info, warn};

use crate::shutdown;

/// Open storage, wire the services and serve until SIGINT/SIGTERM.
pub async fn run_serve(config: FaffConfig) -> Result<(), FaffError> {
    info!("starting faff");

    if config.auth.uses_insecure_secret() {
        warn!("auth.jwt_secret is not set; using the built-in development secret");
    }

    faff_messaging::recording::register_metrics();

    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
    info!(path = %config.storage.database_path, "storage ready");

    let client = Arc::new(EmbeddingClient::new(&config.embedding)?);
    let embedder: Arc<dyn EmbeddingAdapter> = client.clone();

    let state = AppState::new(store.clone(), embedder, &config);
    let cancel = shutdown::install_signal_handler();

    let served = faff_gateway::serve(&config.server, state, cancel).await;

    if let Err(e) = client.shutdown().await {
        warn!("embedding client shutdown failed: {e}");
    }
    if let Err(e) = store.shutdown().await {
        warn!("storage shutdown failed: {e}");
    }

    served?;
    info!("faff stopped");
    Ok(())
}
