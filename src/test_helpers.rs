//! Shared test utilities for the statapp test suite.
//!
//! [`ProjectFixture`] builds a throwaway project with the stock layout in a
//! temp directory. Builder methods drop files into the source directories;
//! accessors return the resolved paths the stages operate on.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = ProjectFixture::new()
//!     .page("index.html", "<- partial(nav.html) ->")
//!     .partial("nav.html", "<nav></nav>");
//!
//! partials::run(&project.pages(), &project.partials(), &project.temp()).unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::bundle;
use crate::config::{ProjectConfig, ProjectPaths};
use crate::stage::BundleTarget;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp project with the default config layout.
///
/// The four source directories exist from the start; the output and
/// scratch directories are only created by the pipeline or by
/// [`scratch_page`](Self::scratch_page).
pub struct ProjectFixture {
    dir: TempDir,
    config: ProjectConfig,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::default();
        let paths = ProjectPaths::new(dir.path(), &config);
        for d in [&paths.pages, &paths.partials, &paths.styles, &paths.scripts] {
            fs::create_dir_all(d).unwrap();
        }
        Self { dir, config }
    }

    /// Write `content` to `rel` under the project root, creating parents.
    pub fn file(self, rel: &str, content: &str) -> Self {
        write(&self.root().join(rel), content);
        self
    }

    pub fn page(self, name: &str, content: &str) -> Self {
        write(&self.pages().join(name), content);
        self
    }

    pub fn partial(self, name: &str, content: &str) -> Self {
        write(&self.partials().join(name), content);
        self
    }

    pub fn style(self, name: &str, content: &str) -> Self {
        write(&self.styles().join(name), content);
        self
    }

    pub fn script(self, name: &str, content: &str) -> Self {
        write(&self.scripts().join(name), content);
        self
    }

    /// Write a page straight into the scratch directory, as stage 1 would.
    pub fn scratch_page(self, name: &str, content: &str) -> Self {
        write(&self.temp().join(name), content);
        self
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Adjust the config. Source directories created by [`new`](Self::new)
    /// keep the default layout.
    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(self.root(), &self.config)
    }

    pub fn pages(&self) -> PathBuf {
        self.paths().pages
    }

    pub fn partials(&self) -> PathBuf {
        self.paths().partials
    }

    pub fn styles(&self) -> PathBuf {
        self.paths().styles
    }

    pub fn scripts(&self) -> PathBuf {
        self.paths().scripts
    }

    pub fn temp(&self) -> PathBuf {
        self.paths().temp
    }

    pub fn output(&self) -> PathBuf {
        self.paths().output
    }

    /// Read a file relative to the output directory.
    pub fn read_output(&self, rel: &str) -> String {
        let path = self.output().join(rel);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
    }

    pub fn style_target(&self) -> BundleTarget {
        bundle::style_target(&self.paths(), &self.config)
    }

    pub fn script_target(&self) -> BundleTarget {
        bundle::script_target(&self.paths(), &self.config)
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Relative paths of every file under `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
