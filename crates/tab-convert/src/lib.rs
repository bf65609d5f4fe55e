pub mod error;
pub mod file;
pub mod lookup;
pub mod parser;
pub mod table;

pub use error::{ConvertError, Result};
pub use file::{CnvFile, Conversion};
pub use lookup::{
    BinarySearchLookup, DenseArrayLookup, FileShape, HashLookup, LinearLookup, Lookup, LookupKind,
    RangeLookup,
};
pub use parser::parse_cnv;
pub use table::TableFile;
