pub mod category;
pub mod definition;
pub mod record;
pub mod value;
pub mod variable;

pub use category::Category;
pub use definition::Definition;
pub use record::{AccessError, AccessResult, RecordAccess, Resolved, Value};
pub use value::ValueRange;
pub use variable::{Dimension, Increment, KeyLocator, Variable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_over_values_and_ranges() {
        let category = Category {
            order: 1,
            description: "8-14 dias".to_string(),
            values: vec![ValueRange::new("0008", "0014"), ValueRange::single("0099")],
            subtotal: false,
            has_empty: false,
        };
        assert!(category.matches("0009"));
        assert!(category.matches("0099"));
        assert!(!category.matches("0015"));
    }

    #[test]
    fn value_renders_without_trailing_zero() {
        assert_eq!(Value::Number(100.92).to_text(), "100.92");
        assert_eq!(Value::Number(2.0).to_text(), "2");
        assert_eq!(Value::Text("520870".to_string()).to_text(), "520870");
    }
}
