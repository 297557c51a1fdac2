//! Dot-separated field paths into JSON payloads.

use std::fmt;

use serde_json::Value;

/// A pre-split path such as `student.guardians.0.phone`.
///
/// Each segment selects an object key, or an array index when the current
/// value is an array. An empty path selects the whole payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let segments = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split('.').map(str::to_string).collect()
        };
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// Walk `payload` and return the value at this path, if any.
    ///
    /// Resolution fails on a missing key, a non-numeric or out-of-range
    /// index, or when descending into a scalar.
    #[must_use]
    pub fn resolve<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(payload, |current, segment| match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
