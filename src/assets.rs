//! Static asset copying.
//!
//! Runs after the three stages have succeeded. Each asset category (images,
//! fonts, licences, locales) is mirrored from its source directory into the
//! same relative path under the output directory:
//!
//! ```text
//! assets/images/logo.png      →  app/assets/images/logo.png
//! assets/fonts/sans/a.woff2   →  app/assets/fonts/sans/a.woff2
//! assets/locales/en.js        →  app/assets/locales/en.js   (compressed)
//! ```
//!
//! Files that already exist at the destination are left alone. Locale files
//! are scripts: they are compressed with the script compressor and written
//! before the mirror pass, which then skips them.
//!
//! Nothing here fails the build. Every problem becomes a warning in the
//! [`AssetReport`].

use crate::catalog::ResourceCatalog;
use crate::compress::{CompressError, TextCompressor};
use crate::config::AssetsConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("could not compress locale {file}: {source}")]
    Compress {
        file: String,
        #[source]
        source: CompressError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Outcome of mirroring one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub category: &'static str,
    pub copied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub categories: Vec<CopyStats>,
    /// Locale files compressed into the output.
    pub locales: Vec<String>,
    pub warnings: Vec<String>,
}

/// Mirror every file under `src` into `dst`, skipping existing files.
/// Symlinked files and directories are copied as their targets.
pub fn mirror_dir(src: &Path, dst: &Path, category: &'static str) -> Result<CopyStats, AssetError> {
    let mut stats = CopyStats {
        category,
        ..Default::default()
    };
    fs::create_dir_all(dst).map_err(io_error(dst))?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error(&target))?;
        } else if target.exists() {
            stats.skipped += 1;
        } else {
            fs::copy(entry.path(), &target).map_err(io_error(&target))?;
            stats.copied += 1;
        }
    }
    Ok(stats)
}

/// Compress the locale files at the top of `src` into `dst`.
///
/// Existing files in `dst` are overwritten. Returns the names written.
pub fn compress_locales(
    src: &Path,
    dst: &Path,
    compressor: &dyn TextCompressor,
) -> Result<Vec<String>, AssetError> {
    let catalog = ResourceCatalog::load(src).map_err(io_error(src))?;
    fs::create_dir_all(dst).map_err(io_error(dst))?;

    let mut written = Vec::new();
    for (name, path) in catalog.iter() {
        let text = fs::read_to_string(path).map_err(io_error(path))?;
        let compressed = compressor
            .compress(&text)
            .map_err(|source| AssetError::Compress {
                file: name.to_string(),
                source,
            })?;
        let target = dst.join(name);
        fs::write(&target, compressed).map_err(io_error(&target))?;
        written.push(name.to_string());
    }
    Ok(written)
}

/// Copy every asset category of the project into `output`.
pub fn copy_assets(
    root: &Path,
    output: &Path,
    assets: &AssetsConfig,
    script_compressor: &dyn TextCompressor,
) -> AssetReport {
    let mut report = AssetReport::default();

    let locales_src = root.join(&assets.locales);
    if locales_src.is_dir() {
        match compress_locales(&locales_src, &output.join(&assets.locales), script_compressor) {
            Ok(names) => report.locales = names,
            Err(e) => report.warnings.push(e.to_string()),
        }
    }

    let categories = [
        ("images", &assets.images),
        ("fonts", &assets.fonts),
        ("licences", &assets.licences),
        ("locales", &assets.locales),
    ];
    for (category, rel) in categories {
        let src = root.join(rel);
        if !src.is_dir() {
            report
                .warnings
                .push(format!("{category} directory {} not found, skipped", src.display()));
            continue;
        }
        match mirror_dir(&src, &output.join(rel), category) {
            Ok(stats) => report.categories.push(stats),
            Err(e) => report.warnings.push(e.to_string()),
        }
    }
    report
}
