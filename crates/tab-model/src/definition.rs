//! The parsed definition file: named variables in declaration order.

use serde::{Deserialize, Serialize};

use crate::variable::Variable;

/// Kind tags usable as table columns.
pub const COLUMN_KINDS: &[char] = &['C', 'X', 'D', 'T'];
/// Kind tags usable as table rows.
pub const ROW_KINDS: &[char] = &['L', 'X', 'D', 'T'];
/// Kind tags usable as record selections.
pub const SELECTION_KINDS: &[char] = &['S'];
/// Kind tags of measure variables.
pub const INCREMENT_KINDS: &[char] = &['I', 'E'];

/// A parsed definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Nominal file name.
    pub name: String,
    /// Description from the first comment line, when present.
    pub description: Option<String>,
    /// Variables in declaration order.
    pub variables: Vec<Variable>,
    /// Opaque pattern describing the expected source record file naming.
    pub record_pattern: Option<String>,
    /// Reference to the help file, when declared.
    pub help_reference: Option<String>,
}

impl Definition {
    /// Look a variable up by display name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Whether a variable with this display name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn by_kinds(&self, kinds: &[char]) -> Vec<&Variable> {
        self.variables
            .iter()
            .filter(|v| kinds.contains(&v.kind()))
            .collect()
    }

    /// Variables usable as table columns.
    pub fn columns(&self) -> Vec<&Variable> {
        self.by_kinds(COLUMN_KINDS)
    }

    /// Variables usable as table rows.
    pub fn rows(&self) -> Vec<&Variable> {
        self.by_kinds(ROW_KINDS)
    }

    /// Variables usable as record selections.
    pub fn selections(&self) -> Vec<&Variable> {
        self.by_kinds(SELECTION_KINDS)
    }

    /// Measure variables.
    pub fn increments(&self) -> Vec<&Variable> {
        self.by_kinds(INCREMENT_KINDS)
    }

    /// All category-resolved variables (everything except increments).
    pub fn dimensions(&self) -> Vec<&Variable> {
        self.variables
            .iter()
            .filter(|v| !INCREMENT_KINDS.contains(&v.kind()))
            .collect()
    }
}
