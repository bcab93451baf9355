//! Recursive value encoder.
//!
//! Turns one [`Value`] tree into a run of tokens. Encoding never fails:
//! shapes without a dedicated rule fall back to their display text.

use crate::token::{Token, TokenSequence};
use crate::value::Value;

/// Append the tokens for `value` to `tokens`.
///
/// - Mapping, pair and record entries become `<name>...</name>` elements.
/// - Sequences encode their items in order with no wrapper of their own.
/// - Scalars become a single text token in canonical form.
/// - Null produces nothing.
///
/// Mapping entries are emitted in the map's iteration order, which is not
/// stable across runs.
pub fn encode_value(value: &Value, tokens: &mut TokenSequence) {
    match value {
        Value::Null => {}
        Value::Mapping(entries) => {
            for (key, item) in entries {
                encode_element(key, item, tokens);
            }
        }
        Value::Pair(name, item) => encode_element(name, item, tokens),
        Value::Sequence(items) => {
            for item in items {
                encode_value(item, tokens);
            }
        }
        Value::Record(record) => {
            for field in record.fields() {
                encode_element(&field.element_name(), &field.value, tokens);
            }
        }
        Value::String(s) => tokens.push(Token::text(s.as_str())),
        Value::Int(i) => tokens.push(Token::text(i.to_string())),
        Value::UInt(u) => tokens.push(Token::text(u.to_string())),
        Value::Float(f) => tokens.push(Token::text(format_f64(*f))),
        Value::Float32(f) => tokens.push(Token::text(format_f32(*f))),
        Value::Bool(b) => tokens.push(Token::text(if *b { "true" } else { "false" })),
        Value::Other(s) => tokens.push(Token::text(s.as_str())),
    }
}

/// Encode a value into a fresh sequence.
pub fn encode(value: &Value) -> TokenSequence {
    let mut tokens = TokenSequence::new();
    encode_value(value, &mut tokens);
    tokens
}

fn encode_element(name: &str, value: &Value, tokens: &mut TokenSequence) {
    tokens.push(Token::open(name));
    encode_value(value, tokens);
    tokens.push(Token::close(name));
}

/// Shortest round-trip decimal, never in exponent form.
pub fn format_f64(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        (if f > 0.0 { "INF" } else { "-INF" }).to_string()
    } else {
        f.to_string()
    }
}

/// Like [`format_f64`], with single-precision shortest digits (`3.14f32` -> `3.14`).
pub fn format_f32(f: f32) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        (if f > 0.0 { "INF" } else { "-INF" }).to_string()
    } else {
        f.to_string()
    }
}
