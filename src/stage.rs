//! Machinery shared by the three resolver stages.
//!
//! - [`StageError`]: the error every stage reports to the finalizer.
//! - [`list_pages`]: the page files of a directory, in a stable order.
//! - [`ResourceUsage`]: per-page resource sets and the global classification
//!   derived from them.
//! - [`BundleTarget`]: where a stage writes its resources and how pages link
//!   to them.
//! - [`read_text`] / [`write_text`]: file I/O with the path attached to
//!   errors; writes go through a sibling file and a rename.
//! - [`ensure_no_clash`]: guard against a resource shadowing its bundle.

use crate::catalog::ResourceCatalog;
use crate::compress::CompressError;
use crate::directive::DirectiveKind;
use crate::scanner::ScanError;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {page}: {source}")]
    Scan {
        page: String,
        #[source]
        source: ScanError,
    },
    #[error("could not find {kind} '{name}' referenced by {page}")]
    MissingResource {
        kind: DirectiveKind,
        name: String,
        page: String,
    },
    #[error("{name} is referenced by a page but is also the global bundle name")]
    BundleNameClash { name: String },
    #[error("could not compress {file}: {source}")]
    Compress {
        file: String,
        #[source]
        source: CompressError,
    },
}

impl StageError {
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> StageError + '_ {
        move |source| StageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn scan(page: &str) -> impl FnOnce(ScanError) -> StageError + '_ {
        move |source| StageError::Scan {
            page: page.to_string(),
            source,
        }
    }

    pub fn compress(file: &str) -> impl FnOnce(CompressError) -> StageError + '_ {
        move |source| StageError::Compress {
            file: file.to_string(),
            source,
        }
    }
}

/// A page file of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub name: String,
    pub path: PathBuf,
}

/// List the pages of `dir`, sorted by file name.
pub fn list_pages(dir: &Path) -> Result<Vec<PageFile>, StageError> {
    let catalog = ResourceCatalog::load(dir).map_err(StageError::io(dir))?;
    Ok(catalog
        .iter()
        .map(|(name, path)| PageFile {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
        .collect())
}

/// A page and its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub name: String,
    pub text: String,
}

/// Read every page of `dir`, sorted by file name.
pub fn read_pages(dir: &Path) -> Result<Vec<PageText>, StageError> {
    list_pages(dir)?
        .into_iter()
        .map(|page| {
            Ok(PageText {
                text: read_text(&page.path)?,
                name: page.name,
            })
        })
        .collect()
}

pub fn read_text(path: &Path) -> Result<String, StageError> {
    fs::read_to_string(path).map_err(StageError::io(path))
}

/// Write `contents` to `path` through a sibling file and a rename, so the
/// target never holds a partial write.
pub fn write_text(path: &Path, contents: &str) -> Result<(), StageError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(".{file_name}.partial"));
    fs::write(&partial, contents).map_err(StageError::io(&partial))?;
    fs::rename(&partial, path).map_err(|source| {
        let _ = fs::remove_file(&partial);
        StageError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn create_dir(path: &Path) -> Result<(), StageError> {
    fs::create_dir_all(path).map_err(StageError::io(path))
}

/// Create `path` as an empty directory, removing whatever was there.
pub fn reset_dir(path: &Path) -> Result<(), StageError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(StageError::io(path))?;
    }
    create_dir(path)
}

/// Output location of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTarget {
    /// Directory the resource files are written to.
    pub dir: PathBuf,
    /// URL of `dir` as written into pages, with a trailing `/`.
    pub url_base: String,
    /// File name of the consolidated global bundle.
    pub global_name: String,
}

impl BundleTarget {
    pub fn url(&self, file: &str) -> String {
        format!("{}{}", self.url_base, file)
    }

    pub fn global_url(&self) -> String {
        self.url(&self.global_name)
    }
}

/// Fail if a standalone resource would overwrite the global bundle.
pub fn ensure_no_clash<'a, I>(standalone: I, target: &BundleTarget) -> Result<(), StageError>
where
    I: IntoIterator<Item = &'a str>,
{
    match standalone.into_iter().find(|name| *name == target.global_name) {
        Some(name) => Err(StageError::BundleNameClash {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Escape a value for a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Which pages reference which resources, for one resource kind.
///
/// Filled during a stage's discovery pass; every page must be recorded,
/// including pages without any reference of this kind.
#[derive(Debug, Default, Clone)]
pub struct ResourceUsage {
    per_page: Vec<BTreeSet<String>>,
    all: BTreeSet<String>,
}

impl ResourceUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the distinct resources referenced by one page.
    pub fn record_page(&mut self, resources: BTreeSet<String>) {
        self.all.extend(resources.iter().cloned());
        self.per_page.push(resources);
    }

    /// Every referenced resource, sorted by name.
    pub fn all(&self) -> &BTreeSet<String> {
        &self.all
    }

    pub fn page_count(&self) -> usize {
        self.per_page.len()
    }

    /// Resources referenced by every recorded page.
    ///
    /// A page with no references makes this empty. With no pages at all
    /// nothing is referenced, so the result is empty too.
    pub fn global(&self) -> HashSet<String> {
        let mut pages = self.per_page.iter();
        let Some(first) = pages.next() else {
            return HashSet::new();
        };
        let mut global: HashSet<String> = first.iter().cloned().collect();
        for page in pages {
            global.retain(|name| page.contains(name));
        }
        global
    }
}
