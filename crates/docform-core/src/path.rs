// Key paths into a document. Root is the empty path.
// Text form is an RFC 6901 JSON Pointer: "" for root, "/a/b" otherwise,
// with `~` escaped as `~0` and `/` as `~1` inside a key.
use std::fmt;

use crate::error::{EditError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path(keys.into_iter().map(Into::into).collect())
    }

    /// Parses a JSON Pointer. A missing leading `/` is an error, except for
    /// the empty string which is the root.
    pub fn parse_pointer(pointer: &str) -> Result<Self> {
        if pointer.is_empty() {
            return Ok(Path::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(EditError::InvalidPath(format!(
                "pointer must start with '/': {pointer}"
            )));
        };
        Ok(Path(rest.split('/').map(unescape_token).collect()))
    }

    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for key in &self.0 {
            out.push('/');
            out.push_str(&escape_token(key));
        }
        out
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Path> {
        self.0.split_last().map(|(_, rest)| Path(rest.to_vec()))
    }

    pub fn child(&self, key: impl Into<String>) -> Path {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Path(keys)
    }

    /// First `n` keys of this path.
    pub fn prefix(&self, n: usize) -> Path {
        Path(self.0[..n.min(self.0.len())].to_vec())
    }

    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        f.write_str(&self.to_pointer())
    }
}

impl From<Vec<String>> for Path {
    fn from(keys: Vec<String>) -> Self {
        Path(keys)
    }
}

impl From<&[&str]> for Path {
    fn from(keys: &[&str]) -> Self {
        Path::from_keys(keys.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        Path::from_keys(keys)
    }
}

pub fn escape_token(key: &str) -> String {
    if !key.contains('~') && !key.contains('/') {
        return key.to_string();
    }
    key.replace('~', "~0").replace('/', "~1")
}

pub fn unescape_token(tok: &str) -> String {
    if !tok.contains('~') {
        return tok.to_string();
    }
    tok.replace("~1", "/").replace("~0", "~")
}

/// Index into a sequence of `len` items, if `key` is a canonical decimal
/// index ("0", "17"; no sign, no leading zeros) within bounds.
pub fn array_index(key: &str, len: usize) -> Option<usize> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    key.parse::<usize>().ok().filter(|&i| i < len)
}
