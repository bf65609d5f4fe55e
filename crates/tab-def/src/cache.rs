//! The conversion file cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tab_convert::{Conversion, TableFile, parse_cnv};

use crate::error::{DefError, Result};
use crate::source::TextSource;

/// Caller-owned cache of parsed conversion files, keyed by normalized
/// case-insensitive path.
///
/// Each distinct path is parsed at most once; later lookups return the same
/// shared instance. A file that fails to parse is never inserted, so one
/// broken conversion cannot poison lookups of the others.
pub struct ConversionCache {
    source: Arc<dyn TextSource>,
    entries: Mutex<HashMap<String, Arc<Conversion>>>,
}

impl ConversionCache {
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cached conversion for `path`, parsing it on first use.
    pub fn get(&self, path: &str) -> Result<Arc<Conversion>> {
        let key = normalize_path(path);

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = entries.get(&key) {
            return Ok(cached.clone());
        }

        let parsed = Arc::new(self.load(path)?);
        entries.insert(key, parsed.clone());
        Ok(parsed)
    }

    /// Number of distinct conversion files parsed so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, path: &str) -> Result<Conversion> {
        let name = file_name(path);
        match extension(path).as_deref() {
            Some("cnv") => {
                let text = self.read(path)?;
                Ok(Conversion::Cnv(parse_cnv(name, &text)?))
            }
            Some("csv") => {
                let text = self.read(path)?;
                Ok(Conversion::Table(TableFile::from_csv(name, &text)?))
            }
            _ => Err(DefError::UnsupportedConversion {
                path: path.to_string(),
            }),
        }
    }

    fn read(&self, path: &str) -> Result<String> {
        self.source.read(path)?.ok_or_else(|| DefError::NotFound {
            path: path.to_string(),
        })
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
