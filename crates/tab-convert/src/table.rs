//! Record-table-backed conversion sources.
//!
//! Some definitions reference a conversion table instead of the CNV text
//! grammar: each row is one category, one column carries the key and
//! another the description. This reader takes CSV input; column and key
//! matching is case-insensitive, like the rest of the path handling in the
//! legacy ecosystem.

use std::collections::{BTreeMap, HashMap};

use csv::ReaderBuilder;
use tab_model::Resolved;

use crate::error::{ConvertError, Result};

/// A conversion source backed by a table of records.
#[derive(Debug)]
pub struct TableFile {
    name: String,
    fields: Vec<String>,
    records: Vec<BTreeMap<String, String>>,
    /// Default key column: the table's first column.
    key_field: String,
    /// Uppercased key value to record index, built over `key_field`.
    index: HashMap<String, usize>,
}

impl TableFile {
    /// Read a table from CSV text. The header row names the columns; the
    /// first column is the default key.
    pub fn from_csv(name: &str, text: &str) -> Result<Self> {
        let table_error = |message: String| ConvertError::Table {
            name: name.to_string(),
            message,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let fields: Vec<String> = reader
            .headers()
            .map_err(|e| table_error(e.to_string()))?
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim().to_string())
            .collect();
        let key_field = fields
            .first()
            .cloned()
            .ok_or_else(|| table_error("no columns".to_string()))?;

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| table_error(e.to_string()))?;
            let mut row = BTreeMap::new();
            for (column, value) in record.iter().enumerate() {
                row.insert(
                    fields.get(column).cloned().unwrap_or_default(),
                    value.trim().to_string(),
                );
            }
            records.push(row);
        }

        let index = records
            .iter()
            .enumerate()
            .map(|(at, row)| {
                let key = row.get(&key_field).cloned().unwrap_or_default();
                (key.to_uppercase(), at)
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            fields,
            records,
            key_field,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Resolve a key to the description held in `label_field`.
    ///
    /// The key matches against `key_field` when that names a table column,
    /// else against the table's first column. `label_field` falls back to
    /// the second column.
    pub fn resolve(
        &self,
        value: &str,
        key_field: Option<&str>,
        label_field: Option<&str>,
    ) -> Resolved {
        if value.trim().is_empty() {
            return Resolved::NoMatch;
        }

        let Some(row) = self.find_record(key_field, value) else {
            return Resolved::NoMatch;
        };
        match row.get(self.label_column(label_field)) {
            Some(label) => Resolved::Label(label.clone()),
            None => {
                tracing::warn!(
                    table = %self.name,
                    label_field = label_field.unwrap_or(""),
                    "label column missing from conversion table"
                );
                Resolved::NoMatch
            }
        }
    }

    /// Description column values, one per record, in table order.
    pub fn labels(&self, label_field: Option<&str>) -> Vec<String> {
        let column = self.label_column(label_field);
        self.records
            .iter()
            .filter_map(|row| row.get(column).cloned())
            .collect()
    }

    fn find_record(
        &self,
        key_field: Option<&str>,
        value: &str,
    ) -> Option<&BTreeMap<String, String>> {
        match key_field.and_then(|f| self.column(f)) {
            Some(column) if column != self.key_field.as_str() => self
                .records
                .iter()
                .find(|row| {
                    row.get(column)
                        .is_some_and(|v| v.eq_ignore_ascii_case(value))
                }),
            _ => self
                .index
                .get(&value.to_uppercase())
                .map(|at| &self.records[*at]),
        }
    }

    fn label_column(&self, requested: Option<&str>) -> &str {
        requested
            .and_then(|f| self.column(f))
            .unwrap_or_else(|| {
                self.fields
                    .get(1)
                    .map(String::as_str)
                    .unwrap_or(self.key_field.as_str())
            })
    }

    /// Resolve a column name case-insensitively to its declared spelling.
    fn column(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}
