// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer credential verification.

use crate::error::FaffError;
use crate::types::UserId;

/// Validates an opaque bearer credential and yields the user it names.
pub trait TokenVerifier: Send + Sync {
    /// Returns the authenticated user id, or `FaffError::Unauthorized`.
    fn verify(&self, token: &str) -> Result<UserId, FaffError>;
}
