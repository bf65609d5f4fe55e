//! Session entry point: a source root plus its conversion cache.

use std::path::PathBuf;
use std::sync::Arc;

use tab_model::{Definition, RecordAccess};

use crate::cache::ConversionCache;
use crate::context::ResolutionContext;
use crate::error::{DefError, Result};
use crate::parser::DefParser;
use crate::source::{DirSource, TextSource};

/// One opened tabulation source: lists and parses definition files and
/// shares a single conversion cache across every context created from it.
pub struct TabSession {
    source: Arc<dyn TextSource>,
    conversions: Arc<ConversionCache>,
}

impl TabSession {
    /// Open a session over an unpacked directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let source: Arc<dyn TextSource> = Arc::new(DirSource::open(root)?);
        Ok(Self::with_source(source))
    }

    /// Open a session over any text source.
    pub fn with_source(source: Arc<dyn TextSource>) -> Self {
        let conversions = Arc::new(ConversionCache::new(source.clone()));
        Self {
            source,
            conversions,
        }
    }

    /// Names of the definition files available in this source.
    pub fn definitions(&self) -> Result<Vec<String>> {
        self.source.list("def")
    }

    /// Parse a definition file; a bare name gets the `.def` extension
    /// appended when the literal path misses.
    pub fn load_definition(&self, path: &str) -> Result<Definition> {
        let (name, text) = match self.source.read(path)? {
            Some(text) => (path.to_string(), text),
            None if !path.to_lowercase().ends_with(".def") => {
                let with_extension = format!("{path}.def");
                let text =
                    self.source
                        .read(&with_extension)?
                        .ok_or_else(|| DefError::NotFound {
                            path: path.to_string(),
                        })?;
                (with_extension, text)
            }
            None => {
                return Err(DefError::NotFound {
                    path: path.to_string(),
                });
            }
        };

        let base = name.rsplit(['/', '\\']).next().unwrap_or(&name);
        DefParser::new().parse(base, &text)
    }

    /// Build a resolution context over a parsed definition, sharing this
    /// session's conversion cache.
    pub fn context<A: RecordAccess>(
        &self,
        definition: Definition,
        access: A,
    ) -> ResolutionContext<A> {
        ResolutionContext::new(definition, self.conversions.clone(), access)
    }

    pub fn conversions(&self) -> &Arc<ConversionCache> {
        &self.conversions
    }
}
