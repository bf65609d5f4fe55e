//! End-to-end resolution: definition variable + record to outcome.

use std::sync::Arc;

use tab_convert::Conversion;
use tab_model::{Definition, Dimension, KeyLocator, RecordAccess, Variable};

use crate::cache::ConversionCache;
use crate::error::{DefError, Result};

/// Binds a parsed definition to a conversion provider and a record-access
/// strategy, and orchestrates extract-then-resolve.
///
/// Increments pass the raw field value through unchanged; dimensions
/// extract a key (offset slice or secondary field) and resolve it through
/// the referenced conversion file.
pub struct ResolutionContext<A> {
    definition: Definition,
    conversions: Arc<ConversionCache>,
    access: A,
}

impl<A: RecordAccess> ResolutionContext<A> {
    pub fn new(definition: Definition, conversions: Arc<ConversionCache>, access: A) -> Self {
        Self {
            definition,
            conversions,
            access,
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn conversions(&self) -> &Arc<ConversionCache> {
        &self.conversions
    }

    /// Look a variable up by display name.
    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.definition
            .get(name)
            .ok_or_else(|| DefError::VariableNotFound(name.to_string()))
    }

    /// Resolve a variable by display name against one record (or batch).
    pub fn transform(&self, name: &str, record: &A::Record) -> Result<A::Output> {
        let variable = self.variable(name)?;
        self.resolve(variable, record)
    }

    /// Resolve a variable against one record (or batch).
    pub fn resolve(&self, variable: &Variable, record: &A::Record) -> Result<A::Output> {
        match variable {
            Variable::Increment(increment) => {
                Ok(self.access.extract_raw(record, &increment.field_key)?)
            }
            Variable::Dimension(dimension) => self.resolve_dimension(dimension, record),
        }
    }

    fn resolve_dimension(&self, dimension: &Dimension, record: &A::Record) -> Result<A::Output> {
        let conversion = self.conversions.get(&dimension.conversion)?;
        let keys = self.extract_keys(dimension, &conversion, record)?;
        let label_field = locator_field(dimension);

        Ok(self.access.map(keys, |value| {
            conversion.resolve(value, Some(&dimension.field_key), label_field)
        }))
    }

    fn extract_keys(
        &self,
        dimension: &Dimension,
        conversion: &Conversion,
        record: &A::Record,
    ) -> Result<A::Keys> {
        let keys = match (conversion.value_length(), &dimension.locator) {
            (Some(length), KeyLocator::Offset(start)) => {
                self.access
                    .extract_range(record, &dimension.field_key, *start, length)?
            }
            // The key is the already-decoded content of the named field.
            (Some(_), KeyLocator::Field(field)) => self.access.extract_key(record, field)?,
            // Table-backed sources match against the whole decoded field.
            (None, _) => self.access.extract_key(record, &dimension.field_key)?,
        };
        Ok(keys)
    }

    /// Category descriptions available for a dimension variable.
    pub fn categories(&self, name: &str) -> Result<Vec<String>> {
        let variable = self.variable(name)?;
        let dimension = variable
            .as_dimension()
            .ok_or_else(|| DefError::NotDimension(name.to_string()))?;

        let conversion = self.conversions.get(&dimension.conversion)?;
        Ok(conversion.category_labels(locator_field(dimension)))
    }
}

/// For table-backed sources the locator's field names the label column.
fn locator_field(dimension: &Dimension) -> Option<&str> {
    match &dimension.locator {
        KeyLocator::Field(field) => Some(field.as_str()),
        KeyLocator::Offset(_) => None,
    }
}
