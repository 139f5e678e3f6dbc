// Path-addressed reads and writes over serde_json::Value.
//
// Sequences are addressed by canonical index keys ("0", "1", ...). Reads
// need an in-bounds index; writes also accept the index one past the end,
// which appends. On writes, any segment that cannot hold the next key
// (missing, scalar, null, or a sequence with any other key) is replaced by
// an empty mapping and the walk continues. This silently changes the
// document's shape at that segment: a replaced sequence loses all of its
// existing elements. Callers that care should check with `lookup` first.
use serde_json::{Map, Value};

use crate::error::{EditError, Result};
use crate::path::{Path, array_index};

pub fn lookup<'a>(root: &'a Value, path: &Path) -> Result<&'a Value> {
    let mut cur = root;
    for (depth, key) in path.keys().iter().enumerate() {
        let next = match cur {
            Value::Object(map) => map.get(key),
            Value::Array(items) => array_index(key, items.len()).map(|i| &items[i]),
            _ => None,
        };
        cur = next.ok_or_else(|| EditError::PathNotFound {
            path: path.prefix(depth + 1),
        })?;
    }
    Ok(cur)
}

/// Overwrites the location at `path` with `value`, creating intermediate
/// mappings as needed. The root must be a mapping and `path` non-empty.
pub fn set_at_path(root: &mut Value, path: &Path, value: Value) -> Result<()> {
    let Some((last, parents)) = path.keys().split_last() else {
        return Err(EditError::InvalidPath("cannot assign to the document root".into()));
    };
    if !root.is_object() {
        return Err(EditError::InvalidPath("document root is not a mapping".into()));
    }
    let mut cur = root;
    for key in parents {
        cur = child_slot(cur, key);
    }
    *child_slot(cur, last) = value;
    Ok(())
}

/// Like `set_at_path`, but leaves `root` alone and returns the updated copy.
pub fn with_assignment(root: &Value, path: &Path, value: Value) -> Result<Value> {
    let mut out = root.clone();
    set_at_path(&mut out, path, value)?;
    Ok(out)
}

fn can_hold(container: &Value, key: &str) -> bool {
    match container {
        Value::Object(_) => true,
        Value::Array(items) => array_index(key, items.len() + 1).is_some(),
        _ => false,
    }
}

fn child_slot<'a>(container: &'a mut Value, key: &str) -> &'a mut Value {
    if !can_hold(container, key) {
        if let Value::Array(items) = &*container {
            tracing::warn!(key, dropped = items.len(), "replacing sequence with an empty mapping");
        } else {
            tracing::debug!(key, "replacing non-mapping segment with an empty mapping");
        }
        *container = Value::Object(Map::new());
    }
    let index = match &*container {
        Value::Array(items) => array_index(key, items.len() + 1),
        _ => None,
    };
    match (container, index) {
        (Value::Array(items), Some(i)) => {
            if i == items.len() {
                items.push(Value::Null);
            }
            &mut items[i]
        }
        // a mapping at this point; IndexMut inserts null for a missing key
        (other, _) => &mut other[key],
    }
}
