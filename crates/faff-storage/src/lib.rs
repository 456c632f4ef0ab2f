// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Faff messaging service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, argon2 credential hashing, and
//! sqlite-vec cosine similarity over stored message vectors.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod password;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
