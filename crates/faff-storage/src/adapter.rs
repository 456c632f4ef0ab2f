// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the user and message store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use faff_config::model::StorageConfig;
use faff_core::{
    AdapterType, ConversationMessage, FaffError, HealthStatus, Message, MessageId, MessageStore,
    NewMessage, NewUser, PluginAdapter, SimilarityHit, StoredUser, User, UserId, UserStore,
};

use crate::database::Database;
use crate::password;
use crate::queries;
use crate::queries::messages::InsertOutcome;

/// SQLite-backed user and message store.
///
/// The database is opened lazily by [`SqliteStore::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for the configured path without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, FaffError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open the database, apply PRAGMAs and run migrations.
    pub async fn initialize(&self) -> Result<(), FaffError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FaffError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, FaffError> {
        self.db.get().ok_or_else(|| FaffError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FaffError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        match db.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => {
                warn!(error = %e, "database health check failed");
                Ok(HealthStatus::Unhealthy(e.to_string()))
            }
        }
    }

    async fn shutdown(&self) -> Result<(), FaffError> {
        if let Some(db) = self.db.get()
            && self.config.wal_mode
        {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, FaffError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, FaffError> {
        queries::users::get_user_with_hash(self.db()?, email).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, FaffError> {
        let db = self.db()?;
        let hash = password::hash_password(&new_user.password)?;
        queries::users::insert_user(db, &new_user.name, &new_user.email, &hash)
            .await?
            .ok_or_else(|| FaffError::Conflict("User with this email already exists".into()))
    }

    async fn list(&self) -> Result<Vec<User>, FaffError> {
        queries::users::list_users(self.db()?).await
    }

    fn verify_credential(&self, password: &str, password_hash: &str) -> bool {
        password::verify_password(password, password_hash)
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert(&self, message: NewMessage) -> Result<Message, FaffError> {
        match queries::messages::insert_message(self.db()?, message).await? {
            InsertOutcome::Inserted(message) => Ok(message),
            InsertOutcome::UnknownParticipant => Err(FaffError::InputInvalid(
                "sender or receiver does not exist".into(),
            )),
        }
    }

    async fn select_conversation(
        &self,
        a: UserId,
        b: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, FaffError> {
        queries::messages::conversation(self.db()?, a, b, limit).await
    }

    async fn select_by_similarity(
        &self,
        user: UserId,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarityHit>, FaffError> {
        queries::messages::nearest_messages(self.db()?, user, vector, limit).await
    }

    async fn count_missing_vectors(&self) -> Result<u64, FaffError> {
        queries::messages::count_missing_vectors(self.db()?).await
    }

    async fn select_missing_vector_batch(&self, limit: usize) -> Result<Vec<Message>, FaffError> {
        queries::messages::missing_vector_batch(self.db()?, limit).await
    }

    async fn update_vector(&self, id: MessageId, vector: &[f32]) -> Result<bool, FaffError> {
        queries::messages::set_vector_if_missing(self.db()?, id, vector).await
    }
}
