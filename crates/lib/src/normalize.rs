//! # Response Normalization
//!
//! Converts the unreliable raw text of a model reply into a valid
//! [`ExtractionResult`] or a classified [`ExtractError`]. The model is an
//! untrusted, best-effort oracle; this module is the sole integrity
//! boundary between its output and the rest of the system.
//!
//! The pipeline is a sequence of fallbacks, each compensating for a known
//! imperfection of model output: stray whitespace, markdown fences around
//! the JSON, prose before or after the object, syntactically broken JSON,
//! and missing or mistyped fields. `normalize_reply` is a pure function,
//! performs exactly one pass over exactly one reply, and never panics on
//! malformed input.

use crate::errors::ExtractError;
use crate::types::{ExtractedContent, ExtractionResult, Stanza};
use regex::Regex;
use serde_json::Value;

/// Maximum length, in characters, of the raw-reply excerpt carried by
/// normalization errors. Bounds the error payload.
const EXCERPT_MAX_CHARS: usize = 500;

/// Placeholder used when the reply carries no usable `content` value.
const NO_CONTENT_PLACEHOLDER: &str = "No content extracted";

/// Normalizes one raw model reply into the canonical result shape.
pub fn normalize_reply(raw: &str) -> Result<ExtractionResult, ExtractError> {
    let trimmed = raw.trim();
    let unfenced = strip_code_fence(trimmed)?;

    // Best-effort slice between the first `{` and the last `}`, discarding
    // any prose the model added around the object.
    let start = match unfenced.find('{') {
        Some(start) => start,
        None => {
            return Err(ExtractError::NoJsonFound {
                excerpt: excerpt(raw),
            })
        }
    };
    let candidate = match unfenced.rfind('}') {
        Some(end) if end > start => &unfenced[start..=end],
        // A reply that opens an object but never closes it still reaches
        // the parser, whose error message names the actual defect.
        _ => &unfenced[start..],
    };

    let value: Value =
        serde_json::from_str(candidate).map_err(|e| ExtractError::MalformedJson {
            message: e.to_string(),
            excerpt: excerpt(raw),
        })?;

    let map = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ExtractError::InvalidShape {
                excerpt: excerpt(raw),
            })
        }
    };

    let language =
        non_empty_string(map.get("language")).unwrap_or_else(|| "unknown".to_string());
    let is_poem = map.get("isPoem").map(is_truthy).unwrap_or(false);
    let translation = non_empty_string(map.get("translation"));

    let content_value = match map.get("content") {
        Some(v) if is_truthy(v) => v.clone(),
        _ => Value::String(NO_CONTENT_PLACEHOLDER.to_string()),
    };

    let content = if is_poem {
        match content_value {
            Value::Array(items) => {
                ExtractedContent::Poem(items.iter().map(coerce_stanza).collect())
            }
            // A poem whose content arrived as a single string becomes a
            // one-stanza poem rather than violating the poem/content
            // invariant.
            Value::String(text) => ExtractedContent::Poem(vec![Stanza {
                original: text,
                transliteration: None,
                translation: String::new(),
            }]),
            _ => {
                return Err(ExtractError::InvalidShape {
                    excerpt: excerpt(raw),
                })
            }
        }
    } else {
        match content_value {
            Value::String(text) => ExtractedContent::PlainText(text),
            _ => {
                return Err(ExtractError::InvalidShape {
                    excerpt: excerpt(raw),
                })
            }
        }
    };

    Ok(ExtractionResult {
        language,
        is_poem,
        content,
        translation,
    })
}

/// Strips one markdown code fence (with an optional language tag) and
/// returns the enclosed text, or the input unchanged when no fence is
/// present. Models frequently wrap JSON in fences despite instructions
/// not to.
fn strip_code_fence(text: &str) -> Result<&str, ExtractError> {
    let re = Regex::new(r"```(?:[a-zA-Z]+)?\n?([\s\S]*?)```")?;
    Ok(re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(text))
}

/// JavaScript-style truthiness: `null`, `false`, `0`, and `""` are falsy;
/// everything else, including empty arrays and objects, is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns the value as an owned string only when it is a non-empty JSON
/// string. Non-string values are treated as absent rather than
/// stringified.
fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Coerces one element of a poem's `content` array into the canonical
/// stanza shape. A bare string becomes the stanza's original text; any
/// other non-object shape yields an empty stanza.
fn coerce_stanza(item: &Value) -> Stanza {
    match item {
        Value::Object(fields) => Stanza {
            original: fields
                .get("original")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            transliteration: non_empty_string(fields.get("transliteration")),
            translation: fields
                .get("translation")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        Value::String(text) => Stanza {
            original: text.clone(),
            transliteration: None,
            translation: String::new(),
        },
        _ => Stanza {
            original: String::new(),
            transliteration: None,
            translation: String::new(),
        },
    }
}

/// The first `EXCERPT_MAX_CHARS` characters of the raw reply, truncated on
/// a character boundary.
fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_MAX_CHARS).collect()
}
