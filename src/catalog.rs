//! Flat directory listings used to resolve directive file names.
//!
//! Directive arguments are bare file names (`common.css`, not
//! `dist/css/common.css`), so every resolver lists its source directory once
//! and looks names up by exact match. Subdirectories are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name → path for the regular files of one directory.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl ResourceCatalog {
    /// List the regular files directly inside `dir`, including symlinks to
    /// regular files.
    pub fn load(dir: &Path) -> io::Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Follows symlinks; a dangling link is reported as an error
            if !fs::metadata(entry.path())?.is_file() {
                continue;
            }
            // Names that are not valid UTF-8 can never match a directive argument
            if let Ok(name) = entry.file_name().into_string() {
                entries.insert(name, entry.path());
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by file name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }
}
