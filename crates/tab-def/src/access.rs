//! Record-access implementations: one record at a time, or a column batch.
//!
//! Conversion metadata names only the first physical field, a starting
//! position, and a value length. When the value length runs past the first
//! field, extraction continues through the following fields in schema order,
//! zero-padding numeric fields to the remaining width before concatenation,
//! and the result is sliced to exactly the requested range.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tab_model::{AccessError, AccessResult, RecordAccess, Resolved, Value};

/// One record: field name to raw value.
pub type Record = BTreeMap<String, Value>;

/// A column batch: field name to one column of raw values, all columns the
/// same length.
pub type Frame = BTreeMap<String, Vec<Value>>;

/// Access to single records. The schema carries the physical field order
/// used when an extraction spans more than one field.
#[derive(Debug, Clone)]
pub struct PointAccess {
    schema: Vec<String>,
}

impl PointAccess {
    pub fn new<I, S>(schema: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into_iter().map(Into::into).collect(),
        }
    }
}

impl RecordAccess for PointAccess {
    type Record = Record;
    type Keys = String;
    type Output = Resolved;

    fn extract_range(
        &self,
        record: &Record,
        field: &str,
        start: usize,
        length: usize,
    ) -> AccessResult<String> {
        let mut at = self
            .schema
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))?;

        let wanted = start + length;
        let mut buffer = String::new();
        while buffer.chars().count() < wanted && at < self.schema.len() {
            let name = &self.schema[at];
            let value = record
                .get(name)
                .ok_or_else(|| AccessError::FieldNotFound(name.clone()))?;
            append_value(&mut buffer, value, wanted);
            at += 1;
        }

        Ok(buffer.chars().skip(start).take(length).collect())
    }

    fn extract_key(&self, record: &Record, field: &str) -> AccessResult<String> {
        record
            .get(field)
            .map(|v| v.to_text())
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))
    }

    fn extract_raw(&self, record: &Record, field: &str) -> AccessResult<Resolved> {
        record
            .get(field)
            .map(|v| Resolved::Raw(v.clone()))
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))
    }

    fn map<F>(&self, keys: String, resolve: F) -> Resolved
    where
        F: Fn(&str) -> Resolved,
    {
        resolve(&keys)
    }
}

/// Access to column batches. Extraction and resolution run element-wise,
/// preserving input order and length.
#[derive(Debug, Clone)]
pub struct ColumnarAccess {
    schema: Vec<String>,
}

impl ColumnarAccess {
    pub fn new<I, S>(schema: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: schema.into_iter().map(Into::into).collect(),
        }
    }
}

impl RecordAccess for ColumnarAccess {
    type Record = Frame;
    type Keys = Vec<String>;
    type Output = Vec<Resolved>;

    fn extract_range(
        &self,
        frame: &Frame,
        field: &str,
        start: usize,
        length: usize,
    ) -> AccessResult<Vec<String>> {
        let first = self
            .schema
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))?;
        let column = frame
            .get(field)
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))?;

        let mut buffers: Vec<String> = column.iter().map(ToString::to_string).collect();
        let wanted = start + length;
        let mut longest = max_chars(&buffers);
        let mut at = first + 1;
        // Spanning is driven by the longest entry, so every row sees the
        // same number of appended fields.
        while longest < wanted && at < self.schema.len() {
            let name = &self.schema[at];
            let next = frame
                .get(name)
                .ok_or_else(|| AccessError::FieldNotFound(name.clone()))?;
            let width = wanted - longest;
            for (buffer, value) in buffers.iter_mut().zip(next.iter()) {
                append_number_padded(buffer, value, width);
            }
            longest = max_chars(&buffers);
            at += 1;
        }

        Ok(buffers
            .into_iter()
            .map(|s| s.chars().skip(start).take(length).collect())
            .collect())
    }

    fn extract_key(&self, frame: &Frame, field: &str) -> AccessResult<Vec<String>> {
        frame
            .get(field)
            .map(|column| column.iter().map(|v| v.to_text()).collect())
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))
    }

    fn extract_raw(&self, frame: &Frame, field: &str) -> AccessResult<Vec<Resolved>> {
        frame
            .get(field)
            .map(|column| column.iter().map(|v| Resolved::Raw(v.clone())).collect())
            .ok_or_else(|| AccessError::FieldNotFound(field.to_string()))
    }

    fn map<F>(&self, keys: Vec<String>, resolve: F) -> Vec<Resolved>
    where
        F: Fn(&str) -> Resolved,
    {
        keys.iter().map(|key| resolve(key)).collect()
    }
}

fn append_value(buffer: &mut String, value: &Value, wanted: usize) {
    let width = wanted.saturating_sub(buffer.chars().count());
    append_number_padded(buffer, value, width);
}

/// Text concatenates as-is; numbers are zero-padded to the remaining width.
fn append_number_padded(buffer: &mut String, value: &Value, width: usize) {
    match value {
        Value::Text(s) => buffer.push_str(s),
        Value::Number(n) => {
            let rendered = n.to_string();
            let _ = write!(buffer, "{rendered:0>width$}");
        }
    }
}

fn max_chars(buffers: &[String]) -> usize {
    buffers.iter().map(|s| s.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn extraction_spans_following_fields() {
        let access = PointAccess::new(["A", "B"]);
        let rec = record(&[("A", Value::from("AB")), ("B", Value::from("12"))]);

        let extracted = access.extract_range(&rec, "A", 1, 3).unwrap();
        assert_eq!(extracted, "B12");
    }

    #[test]
    fn numeric_fields_are_zero_padded_when_spanned() {
        let access = PointAccess::new(["COD_IDADE", "IDADE"]);
        let rec = record(&[
            ("COD_IDADE", Value::from("2")),
            ("IDADE", Value::Number(21.0)),
        ]);

        // Wanted width 4: "2" + "21" padded to the remaining 3 -> "2021".
        let extracted = access.extract_range(&rec, "COD_IDADE", 0, 4).unwrap();
        assert_eq!(extracted, "2021");
    }

    #[test]
    fn extraction_is_sliced_to_the_requested_range() {
        let access = PointAccess::new(["DT_INTER"]);
        let rec = record(&[("DT_INTER", Value::from("20210105"))]);

        assert_eq!(access.extract_range(&rec, "DT_INTER", 2, 2).unwrap(), "21");
        assert_eq!(access.extract_range(&rec, "DT_INTER", 0, 4).unwrap(), "2021");
        // Exhausted fields yield a short slice rather than an error.
        assert_eq!(access.extract_range(&rec, "DT_INTER", 6, 4).unwrap(), "05");
    }

    #[test]
    fn missing_fields_fail_with_the_field_name() {
        let access = PointAccess::new(["A"]);
        let rec = record(&[("A", Value::from("x"))]);
        assert_eq!(
            access.extract_range(&rec, "B", 0, 1),
            Err(AccessError::FieldNotFound("B".to_string()))
        );
    }

    #[test]
    fn columnar_extraction_preserves_order_and_length() {
        let access = ColumnarAccess::new(["A", "B"]);
        let mut frame = Frame::new();
        frame.insert(
            "A".to_string(),
            vec![Value::from("AB"), Value::from("CD"), Value::from("EF")],
        );
        frame.insert(
            "B".to_string(),
            vec![Value::from("12"), Value::from("34"), Value::from("56")],
        );

        let extracted = access.extract_range(&frame, "A", 1, 3).unwrap();
        assert_eq!(extracted, vec!["B12", "D34", "F56"]);
    }
}
