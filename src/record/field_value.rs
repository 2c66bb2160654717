use std::fmt;

/// Cell text used to persist [`FieldValue::NotFound`]
pub const NOT_FOUND_TEXT: &str = "Not found";

/// The value of one extracted field
///
/// `NotFound` means no extraction strategy produced anything. It is distinct
/// from an empty string, which is never stored as `Found`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Found(String),
    NotFound,
}

impl FieldValue {
    /// Wraps a raw value, trimming it and mapping blank text to `NotFound`
    pub fn found(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::NotFound
        } else if trimmed.len() == value.len() {
            Self::Found(value)
        } else {
            Self::Found(trimmed.to_string())
        }
    }

    /// Parses a persisted cell back into a value
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim() == NOT_FOUND_TEXT {
            Self::NotFound
        } else {
            Self::found(cell)
        }
    }

    /// The text written to a record store for this value
    pub fn as_cell(&self) -> &str {
        match self {
            Self::Found(value) => value,
            Self::NotFound => NOT_FOUND_TEXT,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(Self::found).unwrap_or(Self::NotFound)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cell())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_trims_and_rejects_blank() {
        assert_eq!(FieldValue::found("  Boston, MA "), FieldValue::Found("Boston, MA".into()));
        assert_eq!(FieldValue::found(" \n\t"), FieldValue::NotFound);
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(FieldValue::from_cell("Not found"), FieldValue::NotFound);
        assert_eq!(FieldValue::from_cell(""), FieldValue::NotFound);
        assert_eq!(FieldValue::from_cell("Denver"), FieldValue::Found("Denver".into()));
        assert_eq!(FieldValue::NotFound.as_cell(), NOT_FOUND_TEXT);
    }
}
