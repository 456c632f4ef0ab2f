// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of send, search and backfill over a real SQLite store.

use faff_core::{FaffError, MessageStore};
use faff_test_utils::{FailureMode, MockEmbedder, TestHarness};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn sent_messages_are_searchable_by_meaning() {
    let h = TestHarness::new().await.unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();

    h.messages.send(alice.id, bob.id, "want to grab pizza tonight").await.unwrap();
    h.messages.send(bob.id, alice.id, "the quarterly report is due").await.unwrap();

    let results = h.search.search(alice.id, "pizza tonight", None).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].message.message, "want to grab pizza tonight");
    assert_eq!(results[0].sender_name, "Alice");
    assert_eq!(results[0].receiver_name, "Bob");
    assert!(results[0].similarity_score > results[1].similarity_score);
}

#[tokio::test]
async fn search_never_returns_other_users_messages() {
    let h = TestHarness::new().await.unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();
    let carol = h.create_user("Carol").await.unwrap();

    h.messages.send(bob.id, carol.id, "secret pizza plans").await.unwrap();
    h.messages.send(alice.id, bob.id, "hello there").await.unwrap();

    let results = h.search.search(alice.id, "secret pizza plans", None).await.unwrap();
    assert!(results.iter().all(|r| r.message.involves(alice.id)));
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn outage_then_backfill_makes_messages_searchable() {
    let h = TestHarness::new().await.unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();

    h.embedder.set_failure(FailureMode::Always).await;
    let stored = h.messages.send(alice.id, bob.id, "lunch on thursday").await.unwrap();
    assert!(stored.embedding.is_none());
    assert_eq!(h.store.count_missing_vectors().await.unwrap(), 1);

    // Search degrades to empty while the provider is down.
    assert!(h.search.search(alice.id, "lunch", None).await.unwrap().is_empty());

    h.embedder.set_failure(FailureMode::Never).await;
    assert!(h.search.search(alice.id, "lunch", None).await.unwrap().is_empty());

    let report = h.backfill_job().run(&CancellationToken::new()).await.unwrap();
    assert_eq!(report.embedded, 1);
    assert_eq!(report.remaining, 0);

    let results = h.search.search(alice.id, "lunch thursday", None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message.id, stored.id);
}

#[tokio::test]
async fn backfill_completes_within_expected_batches() {
    let h = TestHarness::builder()
        .with_embedder(MockEmbedder::failing())
        .with_backfill(3, 0)
        .build()
        .await
        .unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();
    for i in 0..7 {
        h.messages.send(alice.id, bob.id, &format!("note {i}")).await.unwrap();
    }
    assert_eq!(h.store.count_missing_vectors().await.unwrap(), 7);

    h.embedder.set_failure(FailureMode::Never).await;
    let report = h.backfill_job().run(&CancellationToken::new()).await.unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.embedded, 7);
    assert_eq!(report.remaining, 0);
}

#[tokio::test]
async fn backfill_leaves_persistent_failures_pending() {
    let h = TestHarness::builder()
        .with_embedder(MockEmbedder::failing())
        .build()
        .await
        .unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();
    h.messages.send(alice.id, bob.id, "poison message").await.unwrap();
    h.messages.send(alice.id, bob.id, "regular message").await.unwrap();

    h.embedder
        .set_failure(FailureMode::WhenContains("poison".into()))
        .await;
    let report = h.backfill_job().run(&CancellationToken::new()).await.unwrap();

    assert_eq!(report.embedded, 1);
    assert_eq!(report.remaining, 1);
}

#[tokio::test]
async fn sending_to_unknown_user_is_rejected() {
    let h = TestHarness::new().await.unwrap();
    let alice = h.create_user("Alice").await.unwrap();

    let err = h
        .messages
        .send(alice.id, faff_core::UserId(9999), "anyone there?")
        .await
        .unwrap_err();
    assert!(matches!(err, FaffError::InputInvalid(_)));
}

#[tokio::test]
async fn conversation_lists_both_directions_oldest_first() {
    let h = TestHarness::new().await.unwrap();
    let alice = h.create_user("Alice").await.unwrap();
    let bob = h.create_user("Bob").await.unwrap();
    let carol = h.create_user("Carol").await.unwrap();

    h.messages.send(alice.id, bob.id, "hi bob").await.unwrap();
    h.messages.send(bob.id, alice.id, "hi alice").await.unwrap();
    h.messages.send(carol.id, alice.id, "unrelated").await.unwrap();

    let convo = h.messages.conversation(alice.id, bob.id, None).await.unwrap();
    let bodies: Vec<_> = convo.iter().map(|m| m.message.message.as_str()).collect();
    assert_eq!(bodies, ["hi bob", "hi alice"]);
    assert_eq!(convo[1].sender_name, "Bob");
}
