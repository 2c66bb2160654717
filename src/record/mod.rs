//! Record model
//!
//! A [`Record`] is one captured directory entity: its identifier plus the value
//! extracted for every configured field. An [`ItemReference`] is the pointer to
//! an entity found on a listing page, before its detail page has been visited.

mod field_value;

pub use field_value::{FieldValue, NOT_FOUND_TEXT};

use std::collections::BTreeMap;

/// Name of the identifier column in every record store
pub const IDENTIFIER_COLUMN: &str = "identifier";

/// One extracted directory entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    identifier: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record with no fields
    ///
    /// Returns `None` when the identifier is empty after trimming; an entity
    /// without an identifier cannot be deduplicated and is never stored.
    pub fn new(identifier: impl Into<String>) -> Option<Self> {
        let identifier = identifier.into().trim().to_string();
        if identifier.is_empty() {
            return None;
        }
        Some(Self {
            identifier,
            fields: BTreeMap::new(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Sets the value of a field, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Returns the value of a field
    ///
    /// A field that was never set reads as [`FieldValue::NotFound`].
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&FieldValue::NotFound)
    }

    /// Iterates over the fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields holding an actual value
    pub fn found_count(&self) -> usize {
        self.fields.values().filter(|v| v.is_found()).count()
    }

    /// Renders the record as a row following the given column order
    ///
    /// The first cell is always the identifier.
    pub fn to_row(&self, columns: &[String]) -> Vec<String> {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(self.identifier.clone());
        for column in columns {
            row.push(self.get(column).as_cell().to_string());
        }
        row
    }
}

/// A discovered `(identifier, detail_url)` pair awaiting detail extraction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemReference {
    pub identifier: String,
    pub detail_url: String,
}

impl ItemReference {
    pub fn new(identifier: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            detail_url: detail_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_rejects_blank_identifier() {
        assert!(Record::new("").is_none());
        assert!(Record::new("   ").is_none());
        assert_eq!(Record::new("  Acme LLC ").unwrap().identifier(), "Acme LLC");
    }

    #[test]
    fn test_unset_field_reads_not_found() {
        let record = Record::new("Acme LLC").unwrap();
        assert_eq!(record.get("Website"), &FieldValue::NotFound);
        assert_eq!(record.found_count(), 0);
    }

    #[test]
    fn test_to_row_follows_column_order() {
        let mut record = Record::new("Acme LLC").unwrap();
        record.set("Website", FieldValue::found("https://acme.example"));
        record.set("Location", FieldValue::NotFound);

        let columns = vec![
            "Location".to_string(),
            "Website".to_string(),
            "Industry".to_string(),
        ];
        assert_eq!(
            record.to_row(&columns),
            vec![
                "Acme LLC".to_string(),
                NOT_FOUND_TEXT.to_string(),
                "https://acme.example".to_string(),
                NOT_FOUND_TEXT.to_string(),
            ]
        );
    }
}
