//! Edit sessions: a working copy of a document next to its original.
//!
//! Sessions are values. `commit` and `reset` return a new session and leave
//! the receiver as it was, so a host can keep the previous state around (for
//! previews or to discard an edit) without copying the whole document up
//! front. Both copies live behind `Arc`; the working copy is cloned only when
//! a commit actually writes to a shared tree.
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::classify::coerce;
use crate::error::{EditError, Result};
use crate::mutate::{lookup, set_at_path};
use crate::path::Path;

#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub path: Path,
    /// Value at `path` before the commit; `None` if the path did not resolve.
    pub before: Option<Value>,
    pub after: Value,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub before: Option<Value>,
    pub after: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    original: Arc<Value>,
    working: Arc<Value>,
    changes: Vec<ChangeRecord>,
}

impl EditSession {
    pub fn load(value: &Value) -> Self {
        Self::load_owned(value.clone())
    }

    pub fn load_owned(value: Value) -> Self {
        let original = Arc::new(value);
        Self {
            working: Arc::clone(&original),
            original,
            changes: Vec::new(),
        }
    }

    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::load_owned)
            .map_err(|e| EditError::InvalidDocument(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::load_owned)
            .map_err(|e| EditError::InvalidDocument(e.to_string()))
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map(Self::load_owned)
            .map_err(|e| EditError::InvalidDocument(e.to_string()))
    }

    pub fn get(&self, path: &Path) -> Result<&Value> {
        lookup(&self.working, path)
    }

    /// Applies raw text input at `path`, coerced to the type of the value
    /// currently there. A path that does not resolve yet gets a string.
    pub fn commit(&self, path: &Path, raw: &str) -> Result<EditSession> {
        let value = match lookup(&self.working, path) {
            Ok(current) => coerce(current, raw),
            Err(_) => Value::String(raw.to_string()),
        };
        self.commit_value(path, value)
    }

    /// Assigns an already-typed value at `path`.
    pub fn commit_value(&self, path: &Path, value: Value) -> Result<EditSession> {
        let before = lookup(&self.working, path).ok().cloned();
        let mut working = Arc::clone(&self.working);
        set_at_path(Arc::make_mut(&mut working), path, value.clone())?;
        tracing::debug!(path = %path, "committed edit");

        let mut changes = self.changes.clone();
        changes.push(ChangeRecord {
            path: path.clone(),
            before,
            after: value,
            at: Local::now(),
        });
        Ok(EditSession {
            original: Arc::clone(&self.original),
            working,
            changes,
        })
    }

    pub fn reset(&self) -> EditSession {
        EditSession {
            original: Arc::clone(&self.original),
            working: Arc::clone(&self.original),
            changes: Vec::new(),
        }
    }

    pub fn diff(&self) -> BTreeMap<Path, ValueChange> {
        diff_values(&self.original, &self.working)
    }

    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.original, &self.working) && self.original != self.working
    }

    /// Whether commits can succeed at all: only a mapping root accepts writes.
    /// Hosts should render fields read-only otherwise.
    pub fn is_writable(&self) -> bool {
        self.working.is_object()
    }

    pub fn original(&self) -> &Value {
        &self.original
    }

    pub fn working(&self) -> &Value {
        &self.working
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    pub fn into_working(self) -> Value {
        Arc::unwrap_or_clone(self.working)
    }
}

/// Structural differences between two documents, keyed by the deepest path
/// at which they differ.
pub fn diff_values(before: &Value, after: &Value) -> BTreeMap<Path, ValueChange> {
    let mut out = BTreeMap::new();
    diff_into(&Path::root(), before, after, &mut out);
    out
}

fn diff_into(at: &Path, before: &Value, after: &Value, out: &mut BTreeMap<Path, ValueChange>) {
    match (before, after) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, av) in a {
                match b.get(k) {
                    Some(bv) => diff_into(&at.child(k.as_str()), av, bv, out),
                    None => {
                        out.insert(
                            at.child(k.as_str()),
                            ValueChange { before: Some(av.clone()), after: None },
                        );
                    }
                }
            }
            for (k, bv) in b {
                if !a.contains_key(k) {
                    out.insert(
                        at.child(k.as_str()),
                        ValueChange { before: None, after: Some(bv.clone()) },
                    );
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for i in 0..a.len().max(b.len()) {
                let p = at.child(i.to_string());
                match (a.get(i), b.get(i)) {
                    (Some(av), Some(bv)) => diff_into(&p, av, bv, out),
                    (av, bv) => {
                        out.insert(p, ValueChange { before: av.cloned(), after: bv.cloned() });
                    }
                }
            }
        }
        (a, b) if a != b => {
            out.insert(
                at.clone(),
                ValueChange { before: Some(a.clone()), after: Some(b.clone()) },
            );
        }
        _ => {}
    }
}
