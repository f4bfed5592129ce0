use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::parser::TableParser;

/// Mapping from command names (`\frac`) or single characters (`$`) to their
/// translation. Later registrations overwrite earlier ones.
#[derive(Debug, Default, Clone)]
pub struct CommandTable(HashMap<String, Entry>);

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Option<Entry> {
        self.0.insert(key.into(), entry.into())
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Load literal entries from table source text.
    ///
    /// Each non-comment line is `key value`, split at the first space.
    /// Returns the number of entries read.
    pub fn load(&mut self, source: &str) -> Result<usize> {
        let lines = TableParser::parse_table(source)?;
        let count = lines.len();
        for line in lines {
            self.insert(line.key, line.value);
        }
        Ok(count)
    }

    /// Load literal entries from a table file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let count = self.load(&source)?;
        debug!("loaded {} entries from {}", count, path.display());
        Ok(count)
    }
}

impl<K: Into<String>> Extend<(K, Entry)> for CommandTable {
    fn extend<T: IntoIterator<Item = (K, Entry)>>(&mut self, iter: T) {
        for (key, entry) in iter {
            self.insert(key, entry);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Entry)> for CommandTable {
    fn from_iter<T: IntoIterator<Item = (K, Entry)>>(iter: T) -> Self {
        let mut table = CommandTable::new();
        table.extend(iter);
        table
    }
}
