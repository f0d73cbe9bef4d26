use std::collections::HashMap;

/// A record exposing named text fields.
///
/// Fields that were never set read as absent; the engine treats absent
/// fields as the empty string during matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, consuming and returning the row for chaining.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field value through a mutable reference.
    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_owned(), value.into());
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for Row {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}
