//! KeyPath to source-line bookkeeping used for diagnostics.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Best-known source line of a node; prints `unknown` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRef(Option<usize>);

impl LineRef {
    pub fn at(line: usize) -> Self {
        LineRef(Some(line))
    }

    pub fn unknown() -> Self {
        LineRef(None)
    }

    pub fn get(&self) -> Option<usize> {
        self.0
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{line}"),
            None => f.write_str("unknown"),
        }
    }
}

/// Maps every KeyPath assigned during parsing to the line that introduced it.
///
/// Never consulted for control flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeOrigins(IndexMap<String, usize>);

impl NodeOrigins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key_path: impl Into<String>, line: usize) {
        self.0.insert(key_path.into(), line);
    }

    pub fn contains(&self, key_path: &str) -> bool {
        self.0.contains_key(key_path)
    }

    pub fn line_of(&self, key_path: &str) -> LineRef {
        LineRef(self.0.get(key_path).copied())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries at `prefix` and below it, keyed by the suffix after `prefix`.
    pub fn subtree(&self, prefix: &str) -> Vec<(String, usize)> {
        self.0
            .iter()
            .filter_map(|(path, line)| {
                let suffix = path.strip_prefix(prefix)?;
                (suffix.is_empty() || suffix.starts_with('.'))
                    .then(|| (suffix.to_string(), *line))
            })
            .collect()
    }

    /// Drops every entry at `prefix` and below it.
    pub fn remove_subtree(&mut self, prefix: &str) {
        self.0.retain(|path, _| match path.strip_prefix(prefix) {
            Some(suffix) => !(suffix.is_empty() || suffix.starts_with('.')),
            None => true,
        });
    }

    /// Re-roots a snapshot taken with [`NodeOrigins::subtree`] under `prefix`.
    pub fn graft(&mut self, prefix: &str, entries: &[(String, usize)]) {
        for (suffix, line) in entries {
            self.0.insert(format!("{prefix}{suffix}"), *line);
        }
    }

    /// Makes the subtree at `to` resolve to the same lines as the one at `from`.
    pub fn copy_subtree(&mut self, from: &str, to: &str) {
        let entries = self.subtree(from);
        self.graft(to, &entries);
    }
}
