//! Raw engine error → [`ErrorRecord`]
//!
//! Paths look like `/module:TABLE[k1='v1'][k2='v2']/FIELD`:
//! - the segment carrying the key predicates names the table
//! - a plain segment after it names the offending field
//! - predicate values, in order, are the record keys
//!
//! Messages quote the offending value after the word "value"; a message
//! with no quotes at all is free constraint text (must-rule failures).

use tracing::debug;

use super::kind::ErrorKind;
use super::record::ErrorRecord;
use crate::engine::{codes, SchemaEngine};

/// One `/`-separated path segment with its key predicates
#[derive(Debug, PartialEq, Eq)]
struct Segment {
    name: String,
    predicates: Vec<(String, String)>,
}

/// Translates the engine's pending error. An engine with nothing pending
/// yields a success record without touching path parsing.
pub fn translate_pending<E: SchemaEngine + ?Sized>(engine: &E) -> ErrorRecord {
    match engine.first_error() {
        Some(raw) => translate(raw.code, &raw.path, &raw.message, &raw.app_tag),
        None => ErrorRecord::success(),
    }
}

/// Translates one raw error signal.
pub fn translate(raw_code: u32, raw_path: &str, raw_message: &str, raw_app_tag: &str) -> ErrorRecord {
    if raw_code == codes::SUCCESS {
        return ErrorRecord::success();
    }

    let segments = split_path(raw_path);
    let table_idx = segments
        .iter()
        .position(|s| !s.predicates.is_empty())
        .or_else(|| segments.len().checked_sub(1));

    let (table_name, keys, field) = match table_idx {
        Some(idx) => {
            let table = &segments[idx];
            let keys: Vec<String> = table.predicates.iter().map(|(_, v)| v.clone()).collect();
            let field = segments
                .last()
                .filter(|_| idx + 1 < segments.len())
                .map(|s| s.name.clone())
                .unwrap_or_default();
            (table.name.clone(), keys, field)
        }
        None => (String::new(), Vec::new(), String::new()),
    };

    let (value, constraint_message) = split_message(raw_message);
    let key_list = keys.join(", ");
    let message = match &value {
        Some(value) => format!(
            "{} with keys [{}] has field {} with invalid value {}",
            table_name, key_list, field, value
        ),
        None => format!(
            "Dependent data validation failed for table {} with keys [{}]",
            table_name, key_list
        ),
    };

    let kind = ErrorKind::from_raw(raw_code);
    debug!(raw_code, kind = %kind, table = %table_name, field = %field, "engine error translated");

    ErrorRecord {
        kind,
        table_name,
        keys,
        field,
        value: value.unwrap_or_default(),
        message,
        constraint_message,
        app_tag: raw_app_tag.to_string(),
    }
}

/// Returns `(quoted value, constraint text)` from an engine message.
fn split_message(message: &str) -> (Option<String>, String) {
    let parts: Vec<&str> = message.split('"').collect();
    if parts.len() == 1 {
        return (None, message.to_string());
    }

    // Even indices are outside quotes
    let value = parts
        .iter()
        .enumerate()
        .step_by(2)
        .find(|(_, part)| part.to_lowercase().contains("value"))
        .and_then(|(idx, _)| parts.get(idx + 1))
        .map(|v| v.to_string());

    (value, String::new())
}

/// Splits a path into segments, keeping quoted predicate values intact so
/// values containing `/` or `]` do not break the split.
fn split_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();
    let mut name = String::new();
    let mut predicates = Vec::new();

    let flush = |name: &mut String, predicates: &mut Vec<(String, String)>, out: &mut Vec<Segment>| {
        if !name.is_empty() || !predicates.is_empty() {
            out.push(Segment {
                name: strip_module(name).to_string(),
                predicates: std::mem::take(predicates),
            });
        }
        name.clear();
    };

    while let Some(c) = chars.next() {
        match c {
            '/' => flush(&mut name, &mut predicates, &mut segments),
            '[' => {
                let mut key = String::new();
                let mut value = String::new();
                while let Some(&k) = chars.peek() {
                    if k == '=' || k == ']' {
                        break;
                    }
                    key.push(k);
                    chars.next();
                }
                if chars.peek() == Some(&'=') {
                    chars.next();
                    match chars.peek().copied() {
                        Some(quote @ ('\'' | '"')) => {
                            chars.next();
                            for v in chars.by_ref() {
                                if v == quote {
                                    break;
                                }
                                value.push(v);
                            }
                        }
                        _ => {
                            while let Some(&v) = chars.peek() {
                                if v == ']' {
                                    break;
                                }
                                value.push(v);
                                chars.next();
                            }
                        }
                    }
                }
                // Skip to the closing bracket
                for v in chars.by_ref() {
                    if v == ']' {
                        break;
                    }
                }
                predicates.push((strip_module(key.trim()).to_string(), value));
            }
            _ => name.push(c),
        }
    }
    flush(&mut name, &mut predicates, &mut segments);

    segments
}

fn strip_module(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}
