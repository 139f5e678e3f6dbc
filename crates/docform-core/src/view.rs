// Rendering contract for hosts: what to draw at each path, and which
// branches are folded. Nothing here touches the document.
use std::collections::HashSet;

use serde_json::Value;

use crate::classify::{FieldKind, display_text};
use crate::error::Result;
use crate::mutate::lookup;
use crate::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub path: Path,
    /// Key in the parent mapping, or the index as a string; `None` at root.
    pub key: Option<String>,
    pub kind: FieldKind,
    pub text: String,
    /// Number of children for branches.
    pub len: Option<usize>,
}

fn describe(path: Path, value: &Value) -> Field {
    let len = match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    };
    Field {
        key: path.last().map(str::to_string),
        kind: FieldKind::of(value),
        text: display_text(value),
        len,
        path,
    }
}

pub fn field(root: &Value, path: &Path) -> Result<Field> {
    let value = lookup(root, path)?;
    Ok(describe(path.clone(), value))
}

/// Direct children of the branch at `path`, in document order. Leaves have
/// no children.
pub fn children(root: &Value, path: &Path) -> Result<Vec<Field>> {
    let node = lookup(root, path)?;
    let out = match node {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| describe(path.child(k.as_str()), v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| describe(path.child(i.to_string()), v))
            .collect(),
        _ => Vec::new(),
    };
    Ok(out)
}

/// Folded branches, by path. Everything not listed is expanded.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashSet<Path>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, path: &Path) -> bool {
        self.collapsed.contains(path)
    }

    pub fn toggle(&mut self, path: &Path) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.clone());
        }
    }

    pub fn collapse(&mut self, path: &Path) {
        self.collapsed.insert(path.clone());
    }

    pub fn expand(&mut self, path: &Path) {
        self.collapsed.remove(path);
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Folds every non-empty branch below the root.
    pub fn collapse_all(&mut self, root: &Value) {
        fn walk(at: &Path, v: &Value, out: &mut HashSet<Path>) {
            let kids: Vec<(Path, &Value)> = match v {
                Value::Object(map) => map.iter().map(|(k, c)| (at.child(k.as_str()), c)).collect(),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (at.child(i.to_string()), c))
                    .collect(),
                _ => return,
            };
            for (p, c) in kids {
                if FieldKind::of(c).is_branch() {
                    walk(&p, c, out);
                    out.insert(p);
                }
            }
        }
        walk(&Path::root(), root, &mut self.collapsed);
    }

    /// Drops entries whose path no longer resolves to a branch in `root`.
    pub fn retain_existing(&mut self, root: &Value) {
        self.collapsed
            .retain(|p| lookup(root, p).map(|v| FieldKind::of(v).is_branch()).unwrap_or(false));
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}
