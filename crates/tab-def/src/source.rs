//! Text sources: case-insensitive relative paths to decoded file contents.
//!
//! Definition and conversion files reference each other with DOS-era paths:
//! backslashes, arbitrary casing. A source resolves those references; the
//! directory implementation here covers the common unpacked-archive layout,
//! while zip or remote sources stay outside the core.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DefError, Result};

/// Supplies decoded text by case-insensitive relative path.
pub trait TextSource: Send + Sync {
    /// Contents of the file at `path`, or `None` when absent.
    fn read(&self, path: &str) -> Result<Option<String>>;

    /// Names of files with the given extension (case-insensitive), sorted.
    fn list(&self, extension: &str) -> Result<Vec<String>>;
}

/// A source rooted at a directory, resolving every path component
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DefError::NotFound {
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextSource for DirSource {
    fn read(&self, path: &str) -> Result<Option<String>> {
        let mut current = self.root.clone();
        for part in unix_path(path).split('/').filter(|p| !p.is_empty()) {
            match find_entry(&current, part)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        if !current.is_file() {
            return Ok(None);
        }

        let bytes = fs::read(&current).map_err(|e| DefError::Io {
            path: current.display().to_string(),
            source: e,
        })?;
        Ok(Some(decode_text(&bytes)))
    }

    fn list(&self, extension: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        collect_by_extension(&self.root, extension, &mut names)?;
        names.sort();
        Ok(names)
    }
}

/// Legacy references use backslash separators.
fn unix_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn find_entry(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    let target = name.to_lowercase();
    for entry in read_dir(dir)? {
        let entry = entry.map_err(|e| DefError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        if entry.file_name().to_string_lossy().to_lowercase() == target {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

fn collect_by_extension(dir: &Path, extension: &str, names: &mut Vec<String>) -> Result<()> {
    for entry in read_dir(dir)? {
        let entry = entry.map_err(|e| DefError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_by_extension(&path, extension, names)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            names.push(name.to_string());
        }
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir).map_err(|e| DefError::Io {
        path: dir.display().to_string(),
        source: e,
    })
}

/// Legacy sources are single-byte encoded; fall back to a Latin-1 view of
/// the bytes when they are not valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
