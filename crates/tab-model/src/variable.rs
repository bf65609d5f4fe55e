//! Variable descriptors parsed from a definition file.

use serde::{Deserialize, Serialize};

/// Records index fields by the first 10 characters of the declared name,
/// a legacy identifier-length constraint of the source format.
const FIELD_KEY_LEN: usize = 10;

fn field_key_of(field: &str) -> String {
    field.chars().take(FIELD_KEY_LEN).collect()
}

/// Where a dimension's lookup key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyLocator {
    /// Character offset within the source field (0-based); the key is a
    /// fixed-length slice starting there, possibly spanning further fields.
    Offset(usize),
    /// The key lives in a second, already-decoded field; for table-backed
    /// conversions this names the label column instead.
    Field(String),
}

/// A measure variable: its raw value passes through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Increment {
    /// Single-letter kind tag from the definition file.
    pub kind: char,
    /// Display name.
    pub name: String,
    /// Declared source field name.
    pub source_field: String,
    /// Effective record lookup key (truncated source field).
    pub field_key: String,
}

impl Increment {
    pub fn new(kind: char, name: impl Into<String>, field: impl Into<String>) -> Self {
        let source_field = field.into();
        Self {
            kind,
            name: name.into(),
            field_key: field_key_of(&source_field),
            source_field,
        }
    }
}

/// A classification variable: its raw value resolves to a category label
/// through a conversion file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Single-letter kind tag from the definition file.
    pub kind: char,
    /// Display name.
    pub name: String,
    /// Declared source field name.
    pub source_field: String,
    /// Effective record lookup key (truncated source field).
    pub field_key: String,
    /// Where the lookup key comes from.
    pub locator: KeyLocator,
    /// Reference path of the conversion file.
    pub conversion: String,
}

impl Dimension {
    pub fn new(
        kind: char,
        name: impl Into<String>,
        field: impl Into<String>,
        locator: KeyLocator,
        conversion: impl Into<String>,
    ) -> Self {
        let source_field = field.into();
        Self {
            kind,
            name: name.into(),
            field_key: field_key_of(&source_field),
            source_field,
            locator,
            conversion: conversion.into(),
        }
    }
}

/// A definition-file variable, matched exhaustively at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variable {
    Increment(Increment),
    Dimension(Dimension),
}

impl Variable {
    pub fn kind(&self) -> char {
        match self {
            Self::Increment(v) => v.kind,
            Self::Dimension(v) => v.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Increment(v) => &v.name,
            Self::Dimension(v) => &v.name,
        }
    }

    pub fn source_field(&self) -> &str {
        match self {
            Self::Increment(v) => &v.source_field,
            Self::Dimension(v) => &v.source_field,
        }
    }

    pub fn field_key(&self) -> &str {
        match self {
            Self::Increment(v) => &v.field_key,
            Self::Dimension(v) => &v.field_key,
        }
    }

    pub fn as_dimension(&self) -> Option<&Dimension> {
        match self {
            Self::Dimension(v) => Some(v),
            Self::Increment(_) => None,
        }
    }
}
