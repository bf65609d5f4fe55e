pub mod access;
pub mod cache;
pub mod context;
pub mod error;
pub mod parser;
pub mod session;
pub mod source;

pub use access::{ColumnarAccess, Frame, PointAccess, Record};
pub use cache::ConversionCache;
pub use context::ResolutionContext;
pub use error::{DefError, Result};
pub use parser::DefParser;
pub use session::TabSession;
pub use source::{DirSource, TextSource, decode_text};
