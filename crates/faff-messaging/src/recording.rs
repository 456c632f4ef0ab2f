// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_gauge};

/// Register all Faff metric descriptions. Call once at startup.
pub fn register_metrics() {
    describe_counter!("faff_messages_sent_total", "Messages persisted by the send path");
    describe_counter!("faff_search_queries_total", "Semantic search requests served");
    describe_counter!(
        "faff_embedding_failures_total",
        "Embedding attempts that ended without a vector"
    );
    describe_counter!(
        "faff_embedding_requests_total",
        "Embedding client calls by outcome"
    );
    describe_counter!(
        "faff_backfill_embedded_total",
        "Messages whose vector was filled in by the backfill job"
    );
    describe_gauge!("faff_active_connections", "Live realtime connections");
}

/// Record a persisted message.
pub fn record_message_sent(with_embedding: bool) {
    metrics::counter!(
        "faff_messages_sent_total",
        "embedding" => if with_embedding { "present" } else { "absent" }
    )
    .increment(1);
}

/// Record a search request.
pub fn record_search() {
    metrics::counter!("faff_search_queries_total").increment(1);
}

/// Record an embedding failure at the given stage (`send`, `search`, `backfill`).
pub fn record_embedding_failure(stage: &'static str) {
    metrics::counter!("faff_embedding_failures_total", "stage" => stage).increment(1);
}

/// Record vectors written by a backfill pass.
pub fn record_backfill_embedded(count: u64) {
    metrics::counter!("faff_backfill_embedded_total").increment(count);
}

/// Set the number of live realtime connections.
pub fn set_active_connections(count: usize) {
    metrics::gauge!("faff_active_connections").set(count as f64);
}
