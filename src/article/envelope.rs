//! The top-level response envelope and its decoder.
//!
//! Decoding is done by `serde`, but a bare `serde_json::Error` only tells us
//! *what* went wrong, not *where*.  [`decode_envelope`] sorts failures into
//! [`DecodeError`] kinds and, for null/type problems, walks the parsed JSON
//! against the expected shape to name the offending field.

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::Value;

use super::Article;
use crate::error::DecodeError;

/// One decoded API response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    pub total_results: i64,
    /// Articles in the order the API returned them.
    pub articles: Vec<Article>,
}

/// The API's own error report, e.g. for a revoked key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    status: String,
    code: Option<String>,
    message: Option<String>,
}

/// Decode a response body into an [`ApiResponse`].
pub fn decode_envelope(body: &[u8]) -> Result<ApiResponse, DecodeError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| classify(&Value::Null, &e))?;
    ApiResponse::deserialize(&value).map_err(|e| classify(&value, &e))
}

/// Recognise an API error body (`{"status": "error", ...}`).
///
/// Returns `None` for anything that is not one, including well-formed
/// success envelopes.
pub fn decode_api_failure(body: &[u8]) -> Option<ApiFailure> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    if parsed.status != "error" {
        return None;
    }
    Some(ApiFailure {
        code: parsed.code.unwrap_or_else(|| "unknown".into()),
        message: parsed.message.unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Problem {
    Null,
    WrongType,
}

/// Expected JSON shape of the envelope, mirrored from the serde types above.
enum Shape {
    Str,
    NullableStr,
    Int,
    Object(&'static [(&'static str, Shape)]),
    Array(&'static Shape),
}

const SOURCE_FIELDS: &[(&str, Shape)] = &[("id", Shape::NullableStr), ("name", Shape::NullableStr)];

const ARTICLE_FIELDS: &[(&str, Shape)] = &[
    ("source", Shape::Object(SOURCE_FIELDS)),
    ("author", Shape::NullableStr),
    ("title", Shape::NullableStr),
    ("url", Shape::NullableStr),
    ("urlToImage", Shape::NullableStr),
    ("description", Shape::NullableStr),
    ("publishedAt", Shape::NullableStr),
    ("content", Shape::NullableStr),
];

const ARTICLE: Shape = Shape::Object(ARTICLE_FIELDS);

const ENVELOPE: Shape = Shape::Object(&[
    ("status", Shape::Str),
    ("totalResults", Shape::Int),
    ("articles", Shape::Array(&ARTICLE)),
]);

const ROOT: &str = "<root>";

fn classify(value: &Value, err: &serde_json::Error) -> DecodeError {
    let detail = err.to_string();

    match err.classify() {
        Category::Syntax | Category::Eof => DecodeError::Corrupted { detail },
        Category::Io => DecodeError::Other { detail },
        Category::Data => {
            if let Some(key) = missing_field_key(&detail) {
                DecodeError::MissingField { key, detail }
            } else if detail.starts_with("invalid type: null") {
                DecodeError::MissingValue {
                    field: locate_or_root(value, Problem::Null),
                    detail,
                }
            } else if detail.starts_with("invalid type")
                || detail.starts_with("invalid value")
                || detail.starts_with("invalid length")
            {
                DecodeError::TypeMismatch {
                    field: locate_or_root(value, Problem::WrongType),
                    detail,
                }
            } else {
                DecodeError::Other { detail }
            }
        }
    }
}

/// Extract `key` from serde's "missing field `key`" message.
fn missing_field_key(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

fn locate_or_root(value: &Value, want: Problem) -> String {
    match locate(value, &ENVELOPE, "", want) {
        Some(path) if !path.is_empty() => path,
        _ => ROOT.to_string(),
    }
}

/// Find the first location (in map/array iteration order, the same order
/// serde visits) where `value` breaks `shape` in the `want` way.
fn locate(value: &Value, shape: &Shape, path: &str, want: Problem) -> Option<String> {
    match (shape, value) {
        (Shape::NullableStr, Value::Null | Value::String(_)) | (Shape::Str, Value::String(_)) => None,
        (_, Value::Null) => (want == Problem::Null).then(|| path.to_string()),
        (Shape::Int, Value::Number(n)) if n.is_i64() => None,
        (Shape::Object(fields), Value::Object(map)) => map.iter().find_map(|(key, child)| {
            let (_, child_shape) = fields.iter().find(|(name, _)| *name == key.as_str())?;
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            locate(child, child_shape, &child_path, want)
        }),
        (Shape::Array(item), Value::Array(items)) => items
            .iter()
            .enumerate()
            .find_map(|(i, child)| locate(child, item, &format!("{path}[{i}]"), want)),
        _ => (want == Problem::WrongType).then(|| path.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
