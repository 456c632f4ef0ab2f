// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account queries.

use faff_core::{FaffError, StoredUser, User, UserId};
use rusqlite::{ErrorCode, OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};

const USER_COLUMNS: &str = "id, name, email, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Insert a user with an already hashed password.
///
/// Returns `Ok(None)` when the email is already registered.
pub async fn insert_user(
    db: &Database,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<Option<User>, FaffError> {
    let (name, email, password_hash) = (name.to_string(), email.to_string(), password_hash.to_string());
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            let inserted = conn.query_row(
                &format!(
                    "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"
                ),
                params![name, email, password_hash],
                user_from_row,
            );
            match inserted {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a user by id.
pub async fn get_user(db: &Database, id: UserId) -> Result<Option<User>, FaffError> {
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.0],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a user and its password hash by email.
pub async fn get_user_with_hash(db: &Database, email: &str) -> Result<Option<StoredUser>, FaffError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<StoredUser>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
                params![email],
                |row| {
                    Ok(StoredUser {
                        user: user_from_row(row)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All users ordered by display name.
pub async fn list_users(db: &Database) -> Result<Vec<User>, FaffError> {
    db.connection()
        .call(|conn| -> Result<Vec<User>, rusqlite::Error> {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY name ASC, id ASC"))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
