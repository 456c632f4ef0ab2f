// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the messaging stack over a temp SQLite database
//! and a [`MockEmbedder`], so tests drive the real store and services
//! without network access.

use std::sync::Arc;

use faff_config::model::{BackfillConfig, FaffConfig, SearchConfig, StorageConfig};
use faff_core::{EmbeddingAdapter, FaffError, MessageStore, NewUser, User, UserStore};
use faff_messaging::{BackfillJob, MessageService, SearchService};
use faff_storage::SqliteStore;

use crate::mock_embedder::MockEmbedder;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    embedder: Option<MockEmbedder>,
    search: SearchConfig,
    backfill: BackfillConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            embedder: None,
            search: SearchConfig::default(),
            // No pacing by default; tests opt in.
            backfill: BackfillConfig {
                batch_size: 100,
                sleep_ms: 0,
            },
        }
    }

    /// Use a preconfigured mock embedder.
    pub fn with_embedder(mut self, embedder: MockEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override the search limits.
    pub fn with_search_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.search = SearchConfig {
            default_limit,
            max_limit,
        };
        self
    }

    /// Override backfill batch size and per-row delay.
    pub fn with_backfill(mut self, batch_size: usize, sleep_ms: u64) -> Self {
        self.backfill = BackfillConfig {
            batch_size,
            sleep_ms,
        };
        self
    }

    /// Build the test harness, opening a fresh database.
    pub async fn build(self) -> Result<TestHarness, FaffError> {
        let temp_dir = tempfile::TempDir::new().map_err(FaffError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let store = Arc::new(SqliteStore::open(storage_config.clone()).await?);
        let embedder = Arc::new(self.embedder.unwrap_or_default());

        let config = FaffConfig {
            storage: storage_config,
            search: self.search.clone(),
            backfill: self.backfill.clone(),
            ..FaffConfig::default()
        };

        let messages = MessageService::new(store.clone(), embedder.clone());
        let search = SearchService::new(store.clone(), embedder.clone(), self.search);

        Ok(TestHarness {
            store,
            embedder,
            messages,
            search,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock embedder and temp storage.
pub struct TestHarness {
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteStore>,
    /// The mock embedding provider shared by every service.
    pub embedder: Arc<MockEmbedder>,
    pub messages: MessageService,
    pub search: SearchService,
    /// Configuration matching the harness wiring.
    pub config: FaffConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default settings.
    pub async fn new() -> Result<Self, FaffError> {
        Self::builder().build().await
    }

    /// Register a user named `name` with email `<name>@example.com`.
    pub async fn create_user(&self, name: &str) -> Result<User, FaffError> {
        self.store
            .create(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password: "password123".to_string(),
            })
            .await
    }

    /// A backfill job over the harness store and embedder.
    pub fn backfill_job(&self) -> BackfillJob {
        BackfillJob::new(self.store.clone(), self.embedder.clone(), &self.config.backfill)
    }

    pub fn message_store(&self) -> Arc<dyn MessageStore> {
        self.store.clone()
    }

    pub fn user_store(&self) -> Arc<dyn UserStore> {
        self.store.clone()
    }

    pub fn embedding_adapter(&self) -> Arc<dyn EmbeddingAdapter> {
        self.embedder.clone()
    }
}
