//! Lower-cased name index

use std::collections::{BTreeSet, HashMap};

/// Maps a lower-cased name to the ids currently carrying it
#[derive(Debug, Default)]
pub struct NameIndex {
    names: HashMap<String, BTreeSet<String>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn insert(&mut self, name: &str, id: &str) {
        self.names
            .entry(Self::key(name))
            .or_default()
            .insert(id.to_string());
    }

    pub fn remove(&mut self, name: &str, id: &str) {
        let key = Self::key(name);
        if let Some(ids) = self.names.get_mut(&key) {
            ids.remove(id);
            if ids.is_empty() {
                self.names.remove(&key);
            }
        }
    }

    pub fn rename(&mut self, old: &str, new: &str, id: &str) {
        self.remove(old, id);
        self.insert(new, id);
    }

    /// Ids whose name equals `name`, ignoring case
    pub fn lookup(&self, name: &str) -> Vec<String> {
        self.names
            .get(&Self::key(name))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut index = NameIndex::new();
        index.insert("Jane Doe", "P1");
        assert_eq!(index.lookup("JANE DOE"), vec!["P1".to_string()]);
        assert_eq!(index.lookup(" jane doe "), vec!["P1".to_string()]);
    }

    #[test]
    fn test_rename_moves_id() {
        let mut index = NameIndex::new();
        index.insert("Jane Doe", "P1");
        index.insert("Jane Doe", "P2");
        index.rename("Jane Doe", "Jane R. Doe", "P1");

        assert_eq!(index.lookup("jane doe"), vec!["P2".to_string()]);
        assert_eq!(index.lookup("jane r. doe"), vec!["P1".to_string()]);
    }
}
