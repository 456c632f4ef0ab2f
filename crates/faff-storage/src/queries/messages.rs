// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence and vector similarity queries.
//!
//! Vectors live in the nullable `messages.embedding` TEXT column as
//! `[a,b,c]` literals; sqlite-vec reads them directly as JSON vectors.

use faff_core::vector::{from_literal, to_literal};
use faff_core::{
    ConversationMessage, FaffError, Message, MessageId, NewMessage, SimilarityHit, UserId,
};
use rusqlite::types::Type;
use rusqlite::{ErrorCode, Row, params};

use crate::database::{Database, map_tr_err};

/// Columns `0..=6` of every message projection, in `message_from_row` order.
const MESSAGE_COLUMNS: &str =
    "m.id, m.sender_id, m.receiver_id, m.message, m.created_at, m.updated_at, m.embedding";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let embedding = row
        .get::<_, Option<String>>(6)?
        .map(|literal| {
            from_literal(&literal)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))
        })
        .transpose()?;
    Ok(Message {
        id: MessageId(row.get(0)?),
        sender_id: UserId(row.get(1)?),
        receiver_id: UserId(row.get(2)?),
        message: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        embedding,
    })
}

/// Outcome of an insert attempt.
pub enum InsertOutcome {
    Inserted(Message),
    /// Sender or receiver does not reference an existing user.
    UnknownParticipant,
}

/// Insert a message and its optional vector as one write.
pub async fn insert_message(db: &Database, new: NewMessage) -> Result<InsertOutcome, FaffError> {
    let literal = new.embedding.as_deref().map(to_literal);
    db.connection()
        .call(move |conn| -> Result<InsertOutcome, rusqlite::Error> {
            let inserted = conn.query_row(
                "INSERT INTO messages (sender_id, receiver_id, message, embedding)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, created_at",
                params![new.sender_id.0, new.receiver_id.0, new.body, literal],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            );
            match inserted {
                Ok((id, created_at)) => Ok(InsertOutcome::Inserted(Message {
                    id: MessageId(id),
                    sender_id: new.sender_id,
                    receiver_id: new.receiver_id,
                    message: new.body,
                    created_at,
                    updated_at: None,
                    embedding: new.embedding,
                })),
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Ok(InsertOutcome::UnknownParticipant)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Both directions of a two-party conversation, oldest first.
pub async fn conversation(
    db: &Database,
    a: UserId,
    b: UserId,
    limit: usize,
) -> Result<Vec<ConversationMessage>, FaffError> {
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationMessage>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, s.name
                 FROM messages m
                 JOIN users s ON s.id = m.sender_id
                 WHERE (m.sender_id = ?1 AND m.receiver_id = ?2)
                    OR (m.sender_id = ?2 AND m.receiver_id = ?1)
                 ORDER BY m.created_at ASC, m.id ASC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![a.0, b.0, limit as i64], |row| {
                Ok(ConversationMessage {
                    message: message_from_row(row)?,
                    sender_name: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Messages involving `user` ranked by cosine distance to `vector`.
///
/// Rows whose vector length differs from the query's are excluded, so a
/// model change never compares vectors of different dimensionality. Rows
/// with an undefined distance (a zero-norm vector on either side) are
/// skipped too.
pub async fn nearest_messages(
    db: &Database,
    user: UserId,
    vector: &[f32],
    limit: usize,
) -> Result<Vec<SimilarityHit>, FaffError> {
    let query = to_literal(vector);
    db.connection()
        .call(move |conn| -> Result<Vec<SimilarityHit>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, s.name, r.name,
                        vec_distance_cosine(m.embedding, ?2) AS distance
                 FROM messages m
                 JOIN users s ON s.id = m.sender_id
                 JOIN users r ON r.id = m.receiver_id
                 WHERE (m.sender_id = ?1 OR m.receiver_id = ?1)
                   AND m.embedding IS NOT NULL
                   AND vec_length(m.embedding) = vec_length(?2)
                   AND vec_distance_cosine(m.embedding, ?2) IS NOT NULL
                 ORDER BY distance ASC, m.id ASC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![user.0, query, limit as i64], |row| {
                Ok(SimilarityHit {
                    message: message_from_row(row)?,
                    sender_name: row.get(7)?,
                    receiver_name: row.get(8)?,
                    distance: row.get::<_, f64>(9)? as f32,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of messages still waiting for a vector.
pub async fn count_missing_vectors(db: &Database) -> Result<u64, FaffError> {
    db.connection()
        .call(|conn| -> Result<u64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE embedding IS NULL",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n.max(0) as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Oldest-first batch of messages without a vector.
pub async fn missing_vector_batch(db: &Database, limit: usize) -> Result<Vec<Message>, FaffError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 WHERE m.embedding IS NULL
                 ORDER BY m.id ASC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Set a message's vector unless one is already stored.
pub async fn set_vector_if_missing(
    db: &Database,
    id: MessageId,
    vector: &[f32],
) -> Result<bool, FaffError> {
    let literal = to_literal(vector);
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE messages
                 SET embedding = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND embedding IS NULL",
                params![id.0, literal],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}
