//! In-memory cache: section name → (key → string value).
//!
//! Both levels keep insertion order so that a flushed file lists sections and
//! keys in the order they were first seen.  Settings files hold a handful of
//! sections with a few keys each, so lookups are linear scans over small
//! vectors.

/// A named group of key/value entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or overwrites `key`.  An overwritten key keeps its position.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Inserts `key` only if it is not present yet.  Returns `false` when an
    /// earlier entry already holds the key.
    pub fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key.to_string(), value.to_string()));
        true
    }
}

/// All sections of one settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Looks up a single value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Inserts or overwrites a value, creating the section when needed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.insert(key, value),
            None => {
                let mut created = Section::new(section);
                created.insert(key, value);
                self.sections.push(created);
            }
        }
    }

    /// Appends a complete section.  Returns `false` and drops `section` when
    /// one with the same name already exists.
    pub fn push_section(&mut self, section: Section) -> bool {
        if self.contains_section(&section.name) {
            return false;
        }
        self.sections.push(section);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }
}
