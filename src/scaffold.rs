//! Project scaffolding for `statapp init`.
//!
//! Creates the directory layout described by the config and writes the
//! documented stock `statapp.toml` when the project has none. Existing
//! directories and an existing config are left as they are.

use crate::config::{self, CONFIG_FILENAME, ProjectConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("could not create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One directory of the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// What the directory holds, e.g. `pages`.
    pub role: &'static str,
    /// Path relative to the project root.
    pub path: String,
    pub created: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub entries: Vec<LayoutEntry>,
    /// Whether the stock config file was written.
    pub config_written: bool,
}

/// The directories of a project, in creation order.
pub fn layout(config: &ProjectConfig) -> Vec<(&'static str, &str)> {
    vec![
        ("pages", config.source.pages.as_str()),
        ("partials", config.source.partials.as_str()),
        ("styles", config.source.styles.as_str()),
        ("scripts", config.source.scripts.as_str()),
        ("output", config.output.dir.as_str()),
        ("images", config.assets.images.as_str()),
        ("fonts", config.assets.fonts.as_str()),
        ("licences", config.assets.licences.as_str()),
        ("locales", config.assets.locales.as_str()),
    ]
}

/// Create the project layout under `root`.
pub fn init(root: &Path, config: &ProjectConfig) -> Result<ScaffoldReport, ScaffoldError> {
    let mut report = ScaffoldReport::default();

    for (role, rel) in layout(config) {
        let path = root.join(rel);
        let created = !path.is_dir();
        if created {
            fs::create_dir_all(&path).map_err(|source| ScaffoldError::Io {
                path: path.clone(),
                source,
            })?;
        }
        report.entries.push(LayoutEntry {
            role,
            path: rel.to_string(),
            created,
        });
    }

    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        fs::write(&config_path, config::stock_config_toml()).map_err(|source| {
            ScaffoldError::Io {
                path: config_path.clone(),
                source,
            }
        })?;
        report.config_written = true;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout_and_config() {
        let tmp = TempDir::new().unwrap();

        let report = init(tmp.path(), &ProjectConfig::default()).unwrap();

        assert_eq!(report.entries.len(), 9);
        assert!(report.entries.iter().all(|e| e.created));
        assert!(report.config_written);
        assert!(tmp.path().join("html").is_dir());
        assert!(tmp.path().join("dist/css").is_dir());
        assert!(tmp.path().join("assets/locales").is_dir());
        assert!(tmp.path().join(CONFIG_FILENAME).is_file());
    }

    #[test]
    fn init_reports_existing_and_keeps_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("partials")).unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "compress = false\n").unwrap();

        let report = init(tmp.path(), &ProjectConfig::default()).unwrap();

        let partials = report.entries.iter().find(|e| e.role == "partials").unwrap();
        assert!(!partials.created);
        assert!(!report.config_written);
        assert_eq!(
            fs::read_to_string(tmp.path().join(CONFIG_FILENAME)).unwrap(),
            "compress = false\n"
        );
    }

    #[test]
    fn scaffolded_config_loads() {
        let tmp = TempDir::new().unwrap();
        init(tmp.path(), &ProjectConfig::default()).unwrap();
        assert_eq!(config::load_config(tmp.path()).unwrap(), ProjectConfig::default());
    }
}
