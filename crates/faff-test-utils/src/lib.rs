// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Faff integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Deterministic embedding provider with switchable failures
//! - [`TestHarness`] - Temp SQLite store wired to the messaging services

pub mod harness;
pub mod mock_embedder;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_embedder::{FailureMode, MOCK_DIMENSIONS, MockEmbedder};
