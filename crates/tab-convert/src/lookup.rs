//! Lookup strategies: five resolution structures, one chosen per file.
//!
//! The choice trades build cost for O(1)/O(log n) queries when the key space
//! is small and dense or exactly enumerable, and falls back to interval or
//! linear search when ranges or non-numeric keys make denser structures
//! unsafe. Selection happens once, from file-shape flags gathered during
//! parsing; the built structure is immutable afterwards.

use std::collections::HashMap;

use tab_model::{Category, ValueRange};

/// Discriminant of the strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Range,
    BinarySearch,
    Hash,
    DenseArray,
    Linear,
}

/// A built resolution structure. `find` returns an index into the file's
/// resolvable category list.
///
/// Blank queries never reach a strategy: callers resolve the trimmed-empty
/// case through the file's designated empty category first.
pub trait Lookup: Send + Sync {
    fn kind(&self) -> LookupKind;
    fn find(&self, value: &str) -> Option<usize>;
}

/// File-shape flags driving strategy selection.
#[derive(Debug, Clone)]
pub struct FileShape {
    /// First header token (letters); `"N"` selects the long body layout.
    pub format: String,
    /// Fourth header token (letters).
    pub type_tag: String,
    /// Declared key length in characters.
    pub value_length: usize,
    /// Some category declared a value range.
    pub has_range: bool,
    /// Every declared value is a digit run.
    pub only_numeric_values: bool,
    /// No category has more than one value.
    pub all_single_valued: bool,
}

/// Pick the resolution structure for a parsed category set. First match in
/// the decision table wins.
pub(crate) fn select_lookup(shape: &FileShape, categories: &[Category]) -> Box<dyn Lookup> {
    if shape.has_range {
        return Box::new(RangeLookup::build(categories));
    }
    if shape.type_tag.starts_with('F') {
        if !shape.all_single_valued {
            tracing::warn!(
                "numeric-format conversion file declares multi-valued categories"
            );
        }
        return Box::new(BinarySearchLookup::build(categories));
    }
    if shape.type_tag == "L" {
        return Box::new(HashLookup::build(categories));
    }
    if shape.value_length <= 3 && shape.only_numeric_values {
        return Box::new(DenseArrayLookup::build(shape.value_length, categories));
    }
    Box::new(LinearLookup::build(categories))
}

struct RangeEntry {
    start: String,
    /// Exclusive bound derived from the inclusive range end.
    stop: String,
    order: u32,
    category: usize,
}

/// Interval structure over inclusive ranges. Among all intervals containing
/// a query, the category with the lowest declared order wins; two categories
/// may legitimately declare the same values and the earlier one must be
/// preferred.
pub struct RangeLookup {
    entries: Vec<RangeEntry>,
}

impl RangeLookup {
    pub fn build(categories: &[Category]) -> Self {
        let mut entries = Vec::new();
        for (index, category) in categories.iter().enumerate() {
            for value in &category.values {
                entries.push(RangeEntry {
                    start: value.start.clone(),
                    stop: value.stop_bound(),
                    order: category.order,
                    category: index,
                });
            }
        }
        entries.sort_by(|a, b| a.start.cmp(&b.start));
        Self { entries }
    }
}

impl Lookup for RangeLookup {
    fn kind(&self) -> LookupKind {
        LookupKind::Range
    }

    fn find(&self, value: &str) -> Option<usize> {
        let mut best: Option<(u32, usize)> = None;
        for entry in &self.entries {
            if entry.start.as_str() > value {
                break;
            }
            if value < entry.stop.as_str()
                && best.is_none_or(|(order, _)| entry.order < order)
            {
                best = Some((entry.order, entry.category));
            }
        }
        best.map(|(_, category)| category)
    }
}

/// Exact decimal values in file order (the files are sorted by
/// construction). The search narrows to a single index and returns that
/// category even without an exact match, reproducing the legacy resolver.
/// Non-numeric queries return no match.
pub struct BinarySearchLookup {
    values: Vec<f64>,
}

impl BinarySearchLookup {
    pub fn build(categories: &[Category]) -> Self {
        let values = categories
            .iter()
            .map(|category| {
                let single = category
                    .values
                    .first()
                    .and_then(ValueRange::single_value);
                match single.and_then(|v| v.trim().parse::<f64>().ok()) {
                    Some(number) => number,
                    None => {
                        tracing::warn!(
                            order = category.order,
                            "category value is not a single decimal number"
                        );
                        f64::NAN
                    }
                }
            })
            .collect();
        Self { values }
    }
}

impl Lookup for BinarySearchLookup {
    fn kind(&self) -> LookupKind {
        LookupKind::BinarySearch
    }

    fn find(&self, value: &str) -> Option<usize> {
        let query: f64 = value.trim().parse().ok()?;

        let mut result = None;
        let mut low = 0usize;
        let mut high = self.values.len().checked_sub(1)?;
        while high >= low {
            let middle = low + (high - low) / 2;
            result = Some(middle);

            if query == self.values[middle] {
                break;
            } else if query < self.values[middle] {
                high = middle;
                if high == low {
                    break;
                }
            } else {
                low = middle + 1;
            }
        }
        result
    }
}

/// Exact-string map for arbitrary-length alphanumeric keys. Categories are
/// inserted in file order, so a key declared twice resolves to the last
/// declaration.
pub struct HashLookup {
    values: HashMap<String, usize>,
}

impl HashLookup {
    pub fn build(categories: &[Category]) -> Self {
        let mut values = HashMap::new();
        for (index, category) in categories.iter().enumerate() {
            for value in &category.values {
                match value.single_value() {
                    Some(single) => {
                        values.insert(single.to_string(), index);
                    }
                    None => tracing::warn!(
                        order = category.order,
                        "range value in a hash-indexed conversion file"
                    ),
                }
            }
        }
        Self { values }
    }
}

impl Lookup for HashLookup {
    fn kind(&self) -> LookupKind {
        LookupKind::Hash
    }

    fn find(&self, value: &str) -> Option<usize> {
        self.values.get(value).copied()
    }
}

/// Direct-indexed array for short all-numeric keys: `10^value_length + 1`
/// slots indexed by the integer value. Non-digit and out-of-range queries
/// return no match.
pub struct DenseArrayLookup {
    slots: Vec<Option<usize>>,
}

impl DenseArrayLookup {
    pub fn build(value_length: usize, categories: &[Category]) -> Self {
        let size = 10usize.pow(value_length as u32) + 1;
        let mut slots = vec![None; size];
        for (index, category) in categories.iter().enumerate() {
            for value in &category.values {
                let parsed = value
                    .single_value()
                    .and_then(|v| v.trim().parse::<usize>().ok());
                match parsed {
                    Some(n) if n < size => slots[n] = Some(index),
                    _ => tracing::warn!(
                        order = category.order,
                        value = %value,
                        "value does not fit the dense index"
                    ),
                }
            }
        }
        Self { slots }
    }
}

impl Lookup for DenseArrayLookup {
    fn kind(&self) -> LookupKind {
        LookupKind::DenseArray
    }

    fn find(&self, value: &str) -> Option<usize> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        value
            .parse::<usize>()
            .ok()
            .filter(|n| *n < self.slots.len())
            .and_then(|n| self.slots[n])
    }
}

/// Ordered scan: categories ascending by declared order, first whose value
/// set contains the query wins.
pub struct LinearLookup {
    ordered: Vec<(usize, Vec<ValueRange>)>,
}

impl LinearLookup {
    pub fn build(categories: &[Category]) -> Self {
        let mut ordered: Vec<(usize, Vec<ValueRange>)> = categories
            .iter()
            .enumerate()
            .map(|(index, category)| (index, category.values.clone()))
            .collect();
        ordered.sort_by_key(|(index, _)| categories[*index].order);
        Self { ordered }
    }
}

impl Lookup for LinearLookup {
    fn kind(&self) -> LookupKind {
        LookupKind::Linear
    }

    fn find(&self, value: &str) -> Option<usize> {
        self.ordered
            .iter()
            .find(|(_, values)| values.iter().any(|v| v.contains(value)))
            .map(|(index, _)| *index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(order: u32, description: &str, values: Vec<ValueRange>) -> Category {
        Category {
            order,
            description: description.to_string(),
            values,
            subtotal: false,
            has_empty: false,
        }
    }

    #[test]
    fn binary_search_returns_nearest_probed_slot() {
        let categories = vec![
            category(1, "low", vec![ValueRange::single("10")]),
            category(2, "mid", vec![ValueRange::single("20")]),
            category(3, "high", vec![ValueRange::single("30")]),
        ];
        let lookup = BinarySearchLookup::build(&categories);

        assert_eq!(lookup.find("20"), Some(1));
        // No exact slot for 25: the narrowed index is returned as-is.
        assert!(lookup.find("25").is_some());
        assert_eq!(lookup.find("abc"), None);
        assert_eq!(lookup.find(""), None);
    }

    #[test]
    fn range_tie_break_prefers_lowest_order() {
        let categories = vec![
            category(2, "later", vec![ValueRange::new("00", "99")]),
            category(1, "earlier", vec![ValueRange::new("10", "20")]),
        ];
        let lookup = RangeLookup::build(&categories);

        assert_eq!(lookup.find("15"), Some(1));
        assert_eq!(lookup.find("50"), Some(0));
        assert_eq!(lookup.find("xx"), None);
    }

    #[test]
    fn dense_array_rejects_non_digit_and_out_of_range() {
        let categories = vec![category(1, "one", vec![ValueRange::single("7")])];
        let lookup = DenseArrayLookup::build(1, &categories);

        assert_eq!(lookup.find("7"), Some(0));
        assert_eq!(lookup.find("8"), None);
        assert_eq!(lookup.find("77"), None);
        assert_eq!(lookup.find("x"), None);
        assert_eq!(lookup.find("+7"), None);
    }

    #[test]
    fn hash_last_writer_wins_on_duplicate_keys() {
        let categories = vec![
            category(1, "first", vec![ValueRange::single("43")]),
            category(2, "second", vec![ValueRange::single("43")]),
        ];
        let lookup = HashLookup::build(&categories);
        assert_eq!(lookup.find("43"), Some(1));
    }
}
