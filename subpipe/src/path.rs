//! Path addressing into record payload and metadata trees
//!
//! A path is rooted at either the payload (`$`) or the metadata (`meta.$`)
//! and continues with dot-separated segments:
//! - `$` / `meta.$` address the whole tree
//! - `$.user.name` walks object keys
//! - `$.items.0` indexes into arrays with a non-negative integer segment

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::types::FieldValue;

/// Token addressing the payload root
pub const PAYLOAD_ROOT: &str = "$";

/// Token addressing the metadata root
pub const METADATA_ROOT: &str = "meta.$";

/// Most null slots a single write may append to an array
pub const MAX_ARRAY_PADDING: usize = 4096;

/// Which tree of a record a path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    Payload,
    Metadata,
}

impl Root {
    pub fn token(&self) -> &'static str {
        match self {
            Root::Payload => PAYLOAD_ROOT,
            Root::Metadata => METADATA_ROOT,
        }
    }
}

/// Error from parsing or walking a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path '{0}': expected '$', 'meta.$', '$.<field>' or 'meta.$.<field>'")]
    InvalidRoot(String),
    #[error("invalid path '{0}': contains an empty segment")]
    EmptySegment(String),
    #[error("key '{key}' not found at '{at}'")]
    KeyNotFound { key: String, at: String },
    #[error("invalid array index '{index}' at '{at}'")]
    InvalidIndex { index: String, at: String },
    #[error("array index {index} out of range at '{at}' (length {len})")]
    IndexOutOfRange { index: usize, len: usize, at: String },
    #[error("array index {index} at '{at}' is too far past the end (length {len})")]
    IndexTooLarge { index: usize, len: usize, at: String },
    #[error("cannot descend into {kind} at '{at}'")]
    NotAContainer { kind: &'static str, at: String },
}

impl PathError {
    /// True when the error only means "nothing lives at this path"
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            PathError::KeyNotFound { .. }
                | PathError::IndexOutOfRange { .. }
                | PathError::NotAContainer { .. }
        )
    }
}

/// A parsed path: a root plus the segments below it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    root: Root,
    segments: Vec<String>,
}

impl Path {
    /// Parse a textual path
    ///
    /// Surrounding whitespace is ignored. Anything not rooted at `$` or
    /// `meta.$` is rejected, as are empty segments (`$.a..b`, `$.`).
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let trimmed = text.trim();

        let (root, rest) = if trimmed == PAYLOAD_ROOT {
            (Root::Payload, None)
        } else if trimmed == METADATA_ROOT {
            (Root::Metadata, None)
        } else if let Some(rest) = trimmed.strip_prefix("$.") {
            (Root::Payload, Some(rest))
        } else if let Some(rest) = trimmed.strip_prefix("meta.$.") {
            (Root::Metadata, Some(rest))
        } else {
            return Err(PathError::InvalidRoot(trimmed.to_string()));
        };

        let segments: Vec<String> = match rest {
            None => Vec::new(),
            Some(rest) => rest.split('.').map(|s| s.to_string()).collect(),
        };

        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment(trimmed.to_string()));
        }

        Ok(Path { root, segments })
    }

    /// Path addressing the whole payload
    pub fn payload_root() -> Self {
        Path {
            root: Root::Payload,
            segments: Vec::new(),
        }
    }

    /// Check whether text is shaped like a payload path (`$` or `$.…`)
    pub fn is_payload_path(text: &str) -> bool {
        text == PAYLOAD_ROOT || text.starts_with("$.")
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path addresses a whole tree
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walk the tree and borrow the addressed value
    pub fn resolve<'a>(&self, tree: &'a Json) -> Result<&'a Json, PathError> {
        let mut current = tree;
        for (i, segment) in self.segments.iter().enumerate() {
            current = match current {
                Json::Object(map) => map.get(segment).ok_or_else(|| PathError::KeyNotFound {
                    key: segment.clone(),
                    at: self.location(i + 1),
                })?,
                Json::Array(items) => {
                    let index = self.index_at(i)?;
                    items.get(index).ok_or_else(|| PathError::IndexOutOfRange {
                        index,
                        len: items.len(),
                        at: self.location(i + 1),
                    })?
                }
                other => {
                    return Err(PathError::NotAContainer {
                        kind: kind_name(other),
                        at: self.location(i),
                    });
                }
            };
        }
        Ok(current)
    }

    /// Read the addressed value; every walk failure is reported as missing
    pub fn get(&self, tree: &Json) -> FieldValue {
        match self.resolve(tree) {
            Ok(value) => FieldValue::found(value.clone()),
            Err(err) => {
                log::trace!("lookup of '{}' found nothing: {}", self, err);
                FieldValue::missing()
            }
        }
    }

    /// Store a value at this path, creating missing intermediate objects
    ///
    /// Missing or null intermediates become empty objects; a numeric segment
    /// never creates an array. Writing to an array index past the end pads the
    /// array with nulls, up to `MAX_ARRAY_PADDING` new slots. A root path
    /// replaces the whole tree.
    pub fn set(&self, tree: &mut Json, value: Json) -> Result<(), PathError> {
        let Some((last, parents)) = self.segments.split_last() else {
            *tree = value;
            return Ok(());
        };

        let mut current = tree;
        for (i, segment) in parents.iter().enumerate() {
            if current.is_null() {
                *current = Json::Object(Map::new());
            }
            current = match current {
                Json::Object(map) => {
                    let child = map
                        .entry(segment.clone())
                        .or_insert_with(|| Json::Object(Map::new()));
                    if child.is_null() {
                        *child = Json::Object(Map::new());
                    }
                    child
                }
                Json::Array(items) => {
                    let index = self.index_at(i)?;
                    let len = items.len();
                    items.get_mut(index).ok_or_else(|| PathError::IndexOutOfRange {
                        index,
                        len,
                        at: self.location(i + 1),
                    })?
                }
                other => {
                    return Err(PathError::NotAContainer {
                        kind: kind_name(other),
                        at: self.location(i),
                    });
                }
            };
        }

        if current.is_null() {
            *current = Json::Object(Map::new());
        }
        match current {
            Json::Object(map) => {
                map.insert(last.clone(), value);
            }
            Json::Array(items) => {
                let index = self.index_at(parents.len())?;
                let len = items.len();
                if index >= len {
                    let new_len = index
                        .checked_add(1)
                        .filter(|new_len| new_len - len <= MAX_ARRAY_PADDING)
                        .ok_or_else(|| PathError::IndexTooLarge {
                            index,
                            len,
                            at: self.location(parents.len() + 1),
                        })?;
                    items.resize(new_len, Json::Null);
                }
                items[index] = value;
            }
            other => {
                return Err(PathError::NotAContainer {
                    kind: kind_name(other),
                    at: self.location(parents.len()),
                });
            }
        }
        Ok(())
    }

    /// Remove the value at this path
    ///
    /// Object keys are removed; array elements are nulled so the indices of
    /// the other elements stay put. A path that leads nowhere is a no-op, but a
    /// non-numeric segment against an array is still an error. A root path
    /// resets the tree to an empty object.
    pub fn delete(&self, tree: &mut Json) -> Result<(), PathError> {
        let Some((last, parents)) = self.segments.split_last() else {
            *tree = Json::Object(Map::new());
            return Ok(());
        };

        let mut current = tree;
        for (i, segment) in parents.iter().enumerate() {
            let next = match current {
                Json::Object(map) => map.get_mut(segment),
                Json::Array(items) => {
                    let index = self.index_at(i)?;
                    items.get_mut(index)
                }
                _ => None,
            };
            match next {
                Some(child) => current = child,
                None => return Ok(()),
            }
        }

        match current {
            Json::Object(map) => {
                map.remove(last);
            }
            Json::Array(items) => {
                let index = self.index_at(parents.len())?;
                if let Some(slot) = items.get_mut(index) {
                    *slot = Json::Null;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Parse the segment at `i` as an array index
    fn index_at(&self, i: usize) -> Result<usize, PathError> {
        let segment = &self.segments[i];
        parse_index(segment).ok_or_else(|| PathError::InvalidIndex {
            index: segment.clone(),
            at: self.location(i + 1),
        })
    }

    /// Render the root plus the first `depth` segments
    fn location(&self, depth: usize) -> String {
        let mut out = self.root.token().to_string();
        for segment in self.segments.iter().take(depth) {
            out.push('.');
            out.push_str(segment);
        }
        out
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.location(self.segments.len()))
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Digits only: no sign, no whitespace
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn kind_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
