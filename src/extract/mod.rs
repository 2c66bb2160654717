//! Field extraction with ordered fallback strategies
//!
//! Directory markup is not stable from one entry to the next, so every field
//! declares several ways of finding its value. [`FieldExtractor::extract`]
//! tries them in declared order and the first non-empty result wins. A
//! strategy that cannot produce a value never aborts the record; when none
//! succeeds the field is [`FieldValue::NotFound`].

mod strategy;

pub use strategy::{CompiledStrategy, Strategy};

use crate::navigator::Page;
use crate::record::{FieldValue, Record};
use crate::ConfigError;
use serde::Deserialize;

/// Static extraction configuration for one field
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub strategies: Vec<Strategy>,
}

/// A field spec with selectors and patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    strategies: Vec<CompiledStrategy>,
}

/// Compiles a field spec, rejecting invalid selectors and patterns up front
pub fn compile_field(spec: &FieldSpec) -> Result<CompiledField, ConfigError> {
    if spec.strategies.is_empty() {
        return Err(ConfigError::Validation(format!(
            "field '{}' needs at least one strategy",
            spec.name
        )));
    }
    let strategies = spec
        .strategies
        .iter()
        .map(Strategy::compile)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompiledField {
        name: spec.name.clone(),
        strategies,
    })
}

/// Extracts every configured field from a page
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    fields: Vec<CompiledField>,
}

impl FieldExtractor {
    pub fn new(specs: &[FieldSpec]) -> Result<Self, ConfigError> {
        let fields = specs
            .iter()
            .map(compile_field)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Runs one field's strategies in order
    pub fn extract(field: &CompiledField, page: &Page) -> FieldValue {
        for (index, strategy) in field.strategies.iter().enumerate() {
            match strategy.apply(page) {
                Some(value) => {
                    let value = FieldValue::found(value);
                    if value.is_found() {
                        return value;
                    }
                    tracing::debug!(
                        "{}: strategy {} ({}) produced blank text",
                        field.name,
                        index + 1,
                        strategy.kind()
                    );
                }
                None => tracing::debug!(
                    "{}: strategy {} ({}) found nothing",
                    field.name,
                    index + 1,
                    strategy.kind()
                ),
            }
        }
        FieldValue::NotFound
    }

    /// Builds the record for `identifier` from the current page
    ///
    /// Returns `None` only when the identifier is blank.
    pub fn extract_record(&self, identifier: &str, page: &Page) -> Option<Record> {
        let mut record = Record::new(identifier)?;
        for field in &self.fields {
            record.set(field.name.clone(), Self::extract(field, page));
        }
        Some(record)
    }
}
