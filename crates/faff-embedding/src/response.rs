// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of feature-extraction responses and error bodies.

use faff_core::EmbedError;
use serde_json::Value;

/// Unwrap nested single-sequence arrays until a flat numeric vector remains.
///
/// Feature-extraction endpoints answer `[0.1, ...]`, `[[0.1, ...]]` or deeper
/// nestings depending on model and pipeline; only the first row is used.
pub fn normalize_embedding_response(mut value: Value) -> Result<Vec<f32>, EmbedError> {
    while let Value::Array(items) = &mut value {
        match items.first() {
            Some(Value::Array(_)) => value = items.swap_remove(0),
            _ => break,
        }
    }

    let Value::Array(items) = value else {
        return Err(EmbedError::MalformedResponse(format!(
            "expected an array, got {}",
            json_kind(&value)
        )));
    };

    if items.is_empty() {
        return Err(EmbedError::MalformedResponse("empty embedding".into()));
    }

    let vector = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    EmbedError::MalformedResponse(format!(
                        "component {i} is not a finite number: {item}"
                    ))
                })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    // Cosine distance is undefined for a zero-norm vector.
    if vector.iter().all(|v| *v == 0.0) {
        return Err(EmbedError::MalformedResponse("zero-norm embedding".into()));
    }
    Ok(vector)
}

/// Best human-readable detail from an error body: `error`, then `message`,
/// then the raw text.
pub fn error_detail(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|parsed| {
            ["error", "message"].iter().find_map(|key| match parsed.get(key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(other @ (Value::Object(_) | Value::Array(_))) => Some(other.to_string()),
                _ => None,
            })
        })
        .unwrap_or_else(|| raw.trim().to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
