//! Project configuration module.
//!
//! Handles loading, validating, and merging the `statapp.toml` file in the
//! project root. Stock defaults describe the classic project layout; a user
//! config only overrides what it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! uri_prefix = ""           # Prefix for generated href/src attributes
//! compress = true           # Minify pages, stylesheets and scripts
//!
//! [source]
//! pages = "html"            # HTML page fragments
//! partials = "partials"     # Reusable partials
//! styles = "dist/css"       # Stylesheets
//! scripts = "dist/js"       # Scripts
//!
//! [output]
//! dir = "app"               # Bundle output directory
//! temp = ".statapp-tmp"     # Scratch directory inside the output directory
//! styles = "css"            # Stylesheet subdirectory of the output
//! scripts = "js"            # Script subdirectory of the output
//! global_style = "globalstyle.css"
//! global_script = "globalscript.js"
//!
//! [assets]
//! images = "assets/images"
//! fonts = "assets/fonts"
//! licences = "assets/licences"
//! locales = "assets/locales"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file in the project root.
pub const CONFIG_FILENAME: &str = "statapp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `statapp.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Prepended to every generated stylesheet/script URL.
    pub uri_prefix: String,
    /// Minify output; `false` copies texts through unchanged.
    pub compress: bool,
    /// Source directories, relative to the project root.
    pub source: SourceConfig,
    /// Output layout.
    pub output: OutputConfig,
    /// Static asset directories mirrored into the output.
    pub assets: AssetsConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            uri_prefix: String::new(),
            compress: true,
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub pages: String,
    pub partials: String,
    pub styles: String,
    pub scripts: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            pages: "html".to_string(),
            partials: "partials".to_string(),
            styles: "dist/css".to_string(),
            scripts: "dist/js".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: String,
    /// Scratch directory for the first two stages, inside `dir`.
    pub temp: String,
    pub styles: String,
    pub scripts: String,
    /// File name of the consolidated global stylesheet.
    pub global_style: String,
    /// File name of the consolidated global script.
    pub global_script: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "app".to_string(),
            temp: ".statapp-tmp".to_string(),
            styles: "css".to_string(),
            scripts: "js".to_string(),
            global_style: "globalstyle.css".to_string(),
            global_script: "globalscript.js".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub images: String,
    pub fonts: String,
    pub licences: String,
    /// Locale scripts; compressed like scripts before mirroring.
    pub locales: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            images: "assets/images".to_string(),
            fonts: "assets/fonts".to_string(),
            licences: "assets/licences".to_string(),
            locales: "assets/locales".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dirs = [
            ("source.pages", &self.source.pages),
            ("source.partials", &self.source.partials),
            ("source.styles", &self.source.styles),
            ("source.scripts", &self.source.scripts),
            ("output.dir", &self.output.dir),
            ("output.temp", &self.output.temp),
            ("output.styles", &self.output.styles),
            ("output.scripts", &self.output.scripts),
        ];
        for (key, value) in dirs {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }

        for (key, value) in [
            ("output.global_style", &self.output.global_style),
            ("output.global_script", &self.output.global_script),
        ] {
            if value.is_empty() || value.contains('/') || value.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain file name"
                )));
            }
        }

        // The output dir is deleted by `clean` and the scratch dir by every
        // build, so both must stay strictly below the project root.
        if !is_nested_relative(&self.output.dir) {
            return Err(ConfigError::Validation(
                "output.dir must be a relative path without '.' or '..' components".into(),
            ));
        }
        if !is_single_component(&self.output.temp) {
            return Err(ConfigError::Validation(
                "output.temp must be a single directory name".into(),
            ));
        }
        for (key, value) in [
            ("output.styles", &self.output.styles),
            ("output.scripts", &self.output.scripts),
        ] {
            if !is_nested_relative(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a relative path without '.' or '..' components"
                )));
            }
            if Path::new(value).starts_with(&self.output.temp) {
                return Err(ConfigError::Validation(format!(
                    "{key} must not be inside output.temp"
                )));
            }
        }
        if Path::new(&self.output.styles) == Path::new(&self.output.scripts) {
            return Err(ConfigError::Validation(
                "output.styles and output.scripts must differ".into(),
            ));
        }

        let output = Path::new(&self.output.dir);
        for (key, value) in [
            ("source.pages", &self.source.pages),
            ("source.partials", &self.source.partials),
            ("source.styles", &self.source.styles),
            ("source.scripts", &self.source.scripts),
            ("assets.images", &self.assets.images),
            ("assets.fonts", &self.assets.fonts),
            ("assets.licences", &self.assets.licences),
            ("assets.locales", &self.assets.locales),
        ] {
            if Path::new(value).starts_with(output) {
                return Err(ConfigError::Validation(format!(
                    "output.dir must not contain {key}"
                )));
            }
        }
        Ok(())
    }
}

/// A relative path made only of normal components, e.g. `app` or `build/app`.
fn is_nested_relative(value: &str) -> bool {
    let mut components = Path::new(value).components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Exactly one normal component, e.g. `.statapp-tmp`.
fn is_single_component(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Absolute directory layout of one project, resolved from its config.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub pages: PathBuf,
    pub partials: PathBuf,
    pub styles: PathBuf,
    pub scripts: PathBuf,
    pub output: PathBuf,
    pub temp: PathBuf,
    pub output_styles: PathBuf,
    pub output_scripts: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: &Path, config: &ProjectConfig) -> Self {
        let output = root.join(&config.output.dir);
        Self {
            root: root.to_path_buf(),
            pages: root.join(&config.source.pages),
            partials: root.join(&config.source.partials),
            styles: root.join(&config.source.styles),
            scripts: root.join(&config.source.scripts),
            temp: output.join(&config.output.temp),
            output_styles: output.join(&config.output.styles),
            output_scripts: output.join(&config.output.scripts),
            output,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ProjectConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `statapp.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the project config, merged over the stock defaults and validated.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `statapp.toml`.
///
/// Used by the `gen-config` command and written by `init`.
pub fn stock_config_toml() -> &'static str {
    r##"# statapp configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Prefix for every generated stylesheet and script URL,
# e.g. "/" for root-relative links.
uri_prefix = ""

# Minify pages, stylesheets and scripts. false copies them unchanged.
compress = true

# ---------------------------------------------------------------------------
# Source directories (relative to the project root)
# ---------------------------------------------------------------------------
[source]
# HTML pages. Every file here becomes a page of the bundle.
pages = "html"

# Partials, inlined with <- partial(name) ->
partials = "partials"

# Stylesheets, included with <- style(name) ->
styles = "dist/css"

# Scripts, included with <- script(name, order) ->
scripts = "dist/js"

# ---------------------------------------------------------------------------
# Output layout
# ---------------------------------------------------------------------------
[output]
dir = "app"

# Scratch directory inside the output dir, removed after a successful build.
temp = ".statapp-tmp"

# Subdirectories for stylesheets and scripts. Pages link to them relative
# to themselves (css/globalstyle.css). For the classic layout served from
# /dist/css and /dist/js, set uri_prefix = "/", styles = "dist/css" and
# scripts = "dist/js".
styles = "css"
scripts = "js"

# Bundles holding every stylesheet/script that all pages include.
global_style = "globalstyle.css"
global_script = "globalscript.js"

# ---------------------------------------------------------------------------
# Static assets, mirrored into the output dir under the same paths
# ---------------------------------------------------------------------------
[assets]
images = "assets/images"
fonts = "assets/fonts"
licences = "assets/licences"
# Locale scripts are compressed before they are copied.
locales = "assets/locales"
"##
}
