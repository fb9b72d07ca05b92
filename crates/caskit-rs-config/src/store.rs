//! Flat `key=value` property store

use std::{collections::HashMap, path::Path};

use crate::Result;

/// Immutable mapping from property name to value.
///
/// Built once from a properties file and never mutated afterwards, so a
/// store can be shared across request threads without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    entries: HashMap<String, String>,
}

impl PropertyStore {
    /// Parse properties text.
    ///
    /// One entry per line. The key ends at the first `=`, `:` or whitespace,
    /// and whitespace around a single `=` or `:` separator is skipped. Lines
    /// starting with `#` or `!` are comments. Values keep trailing
    /// whitespace. Later duplicates replace earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.lines() {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let (key, value) = split_entry(line);
            if key.is_empty() {
                continue;
            }

            entries.insert(key.to_string(), value.to_string());
        }

        Self { entries }
    }

    /// Read and parse a properties file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    /// Raw lookup; empty values are reported as present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Scoped lookup: `<scope>.<key>` first, then the bare key.
    ///
    /// Empty values are treated as absent at both levels.
    pub fn get_scoped(&self, scope: &str, key: &str) -> Option<&str> {
        let scoped = format!("{scope}.{key}");
        non_empty(self.get(&scoped)).or_else(|| non_empty(self.get(key)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_entry(line: &str) -> (&str, &str) {
    let Some(idx) = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace()) else {
        return (line, "");
    };

    let rest = line[idx..].trim_start();
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..idx], rest.trim_start())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl<K, V> FromIterator<(K, V)> for PropertyStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
