// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between in-memory vectors and the textual vector literal
//! stored in the `messages.embedding` column (`[0.1,0.2,...]`).
//!
//! The literal is also valid JSON, which is what the sqlite-vec distance
//! functions accept for text-typed vectors.

use thiserror::Error;

/// Errors raised while parsing a stored vector literal.
#[derive(Debug, Error, PartialEq)]
pub enum VectorCodecError {
    #[error("vector literal must be enclosed in brackets")]
    MissingBrackets,

    #[error("invalid vector component at index {index}: {value:?}")]
    InvalidComponent { index: usize, value: String },
}

/// Encodes a vector as `[a,b,c]` using the shortest round-trip float form.
pub fn to_literal(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 12 + 2);
    out.push('[');
    for (i, component) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&component.to_string());
    }
    out.push(']');
    out
}

/// Parses a `[a,b,c]` literal back into a vector.
///
/// Whitespace around components is tolerated; non-finite components are rejected.
pub fn from_literal(literal: &str) -> Result<Vec<f32>, VectorCodecError> {
    let inner = literal
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(VectorCodecError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .enumerate()
        .map(|(index, raw)| {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| VectorCodecError::InvalidComponent {
                    index,
                    value: raw.trim().to_string(),
                })
        })
        .collect()
}
