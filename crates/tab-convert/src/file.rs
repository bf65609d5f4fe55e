//! Parsed conversion files and value-to-category resolution.

use std::fmt;

use tab_model::{Category, Resolved};

use crate::lookup::{FileShape, Lookup, LookupKind, select_lookup};
use crate::table::TableFile;

/// A parsed conversion file: categories plus the lookup structure chosen
/// for the file's shape. Immutable once constructed.
pub struct CnvFile {
    name: String,
    description: Option<String>,
    declared_category_count: usize,
    value_length: usize,
    categories: Vec<Category>,
    subtotals: Vec<Category>,
    empty_category: Option<Category>,
    lookup: Box<dyn Lookup>,
}

impl CnvFile {
    /// Build a file from parsed category slots. Placeholder slots are
    /// dropped; subtotal categories leave the resolvable set but stay on
    /// record; the first category with an empty marker becomes the default
    /// for blank input.
    pub(crate) fn assemble(
        name: String,
        description: Option<String>,
        declared_category_count: usize,
        value_length: usize,
        slots: Vec<Option<Category>>,
        shape: &FileShape,
    ) -> Self {
        let parsed: Vec<Category> = slots.into_iter().flatten().collect();
        let empty_category = parsed.iter().find(|c| c.has_empty).cloned();
        let (subtotals, categories): (Vec<Category>, Vec<Category>) =
            parsed.into_iter().partition(|c| c.subtotal);
        let lookup = select_lookup(shape, &categories);

        Self {
            name,
            description,
            declared_category_count,
            value_length,
            categories,
            subtotals,
            empty_category,
            lookup,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Category count declared in the header. Equals resolvable categories
    /// plus subtotals for a well-formed file.
    pub fn declared_category_count(&self) -> usize {
        self.declared_category_count
    }

    /// Key length in characters; extraction slices exactly this many.
    pub fn value_length(&self) -> usize {
        self.value_length
    }

    /// Resolvable categories, in parsed order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Subtotal categories, excluded from resolution.
    pub fn subtotal_categories(&self) -> &[Category] {
        &self.subtotals
    }

    /// The designated category for blank/missing input, when one exists.
    pub fn empty_category(&self) -> Option<&Category> {
        self.empty_category.as_ref()
    }

    pub fn lookup_kind(&self) -> LookupKind {
        self.lookup.kind()
    }

    /// The category matching a non-blank value, if any.
    pub fn find_category(&self, value: &str) -> Option<&Category> {
        self.lookup
            .find(value)
            .and_then(|index| self.categories.get(index))
    }

    /// Resolve a raw extracted value to its category description. Blank
    /// input goes to the empty category without touching the lookup; an
    /// unmatched value is `NoMatch`, not an error.
    pub fn resolve(&self, value: &str) -> Resolved {
        if value.trim().is_empty() {
            return match &self.empty_category {
                Some(category) => Resolved::Label(category.description.clone()),
                None => Resolved::NoMatch,
            };
        }
        match self.find_category(value) {
            Some(category) => Resolved::Label(category.description.clone()),
            None => Resolved::NoMatch,
        }
    }
}

impl fmt::Debug for CnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CnvFile")
            .field("name", &self.name)
            .field("declared_category_count", &self.declared_category_count)
            .field("value_length", &self.value_length)
            .field("categories", &self.categories.len())
            .field("lookup", &self.lookup.kind())
            .finish()
    }
}

/// A conversion source: the CNV text grammar, or a record-table-backed
/// equivalent. Matched exhaustively at resolution time.
#[derive(Debug)]
pub enum Conversion {
    Cnv(CnvFile),
    Table(TableFile),
}

impl Conversion {
    pub fn name(&self) -> &str {
        match self {
            Self::Cnv(file) => file.name(),
            Self::Table(table) => table.name(),
        }
    }

    /// Key length for offset-based extraction. Table sources carry none;
    /// their keys are whole decoded fields.
    pub fn value_length(&self) -> Option<usize> {
        match self {
            Self::Cnv(file) => Some(file.value_length()),
            Self::Table(_) => None,
        }
    }

    /// Resolve an extracted key to a category description.
    ///
    /// `key_field` and `label_field` only apply to table sources: the key
    /// column to match against (falling back to the table's first column)
    /// and the column supplying the description.
    pub fn resolve(
        &self,
        value: &str,
        key_field: Option<&str>,
        label_field: Option<&str>,
    ) -> Resolved {
        match self {
            Self::Cnv(file) => file.resolve(value),
            Self::Table(table) => table.resolve(value, key_field, label_field),
        }
    }

    /// All category descriptions offered by this source.
    pub fn category_labels(&self, label_field: Option<&str>) -> Vec<String> {
        match self {
            Self::Cnv(file) => file
                .categories()
                .iter()
                .map(|c| c.description.clone())
                .collect(),
            Self::Table(table) => table.labels(label_field),
        }
    }
}
