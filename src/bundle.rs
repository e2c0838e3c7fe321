//! Build orchestration.
//!
//! The [`Finalizer`] runs the three stages strictly in order over one
//! project, then copies the static assets:
//!
//! ```text
//! 1. Partials  html/ + partials/   →  app/.statapp-tmp/     (partials inlined)
//! 2. Styles    scratch + dist/css/ →  app/css/, scratch     (style links)
//! 3. Scripts   scratch + dist/js/  →  app/js/, app/*.html   (script tags, compressed)
//!    Assets    assets/*            →  app/assets/*
//! ```
//!
//! The first failing stage aborts the build with a [`BuildError`] naming the
//! stage; nothing after it runs. The scratch directory is removed only after
//! all three stages succeed, so a failed build leaves it behind for
//! inspection.
//!
//! [`check`] runs the read-only half of each stage: partial lookup in memory
//! and the discovery passes of stages 2 and 3.

use crate::assets::{self, AssetReport};
use crate::catalog::ResourceCatalog;
use crate::compress::Compressors;
use crate::config::{ConfigError, ProjectConfig, ProjectPaths};
use crate::partials::{self, PartialReport};
use crate::scripts::{self, ScriptPlan, ScriptReport};
use crate::stage::{self, BundleTarget, PageText, StageError};
use crate::styles::{self, StylePlan, StyleReport};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("stage 1 (partials) failed: {0}")]
    Partials(#[source] StageError),
    #[error("stage 2 (styles) failed: {0}")]
    Styles(#[source] StageError),
    #[error("stage 3 (scripts) failed: {0}")]
    Scripts(#[source] StageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where stylesheets go and how pages link to them.
pub fn style_target(paths: &ProjectPaths, config: &ProjectConfig) -> BundleTarget {
    BundleTarget {
        dir: paths.output_styles.clone(),
        url_base: format!("{}{}/", config.uri_prefix, config.output.styles),
        global_name: config.output.global_style.clone(),
    }
}

/// Where scripts go and how pages link to them.
pub fn script_target(paths: &ProjectPaths, config: &ProjectConfig) -> BundleTarget {
    BundleTarget {
        dir: paths.output_scripts.clone(),
        url_base: format!("{}{}/", config.uri_prefix, config.output.scripts),
        global_name: config.output.global_script.clone(),
    }
}

/// Reports of a complete build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub partials: PartialReport,
    pub styles: StyleReport,
    pub scripts: ScriptReport,
    pub assets: AssetReport,
}

/// Runs the build of one project.
///
/// The stage methods are public so callers can report progress between
/// stages; they must be called in order. [`run`](Self::run) does all of it.
pub struct Finalizer<'a> {
    config: &'a ProjectConfig,
    paths: ProjectPaths,
    compressors: &'a Compressors,
}

impl<'a> Finalizer<'a> {
    /// Fails if `config` does not validate; the stages delete directories
    /// derived from it.
    pub fn new(
        root: &Path,
        config: &'a ProjectConfig,
        compressors: &'a Compressors,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            paths: ProjectPaths::new(root, config),
            config,
            compressors,
        })
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Stage 1.
    pub fn inline_partials(&self) -> Result<PartialReport, BuildError> {
        partials::run(&self.paths.pages, &self.paths.partials, &self.paths.temp)
            .map_err(BuildError::Partials)
    }

    /// Stage 2.
    pub fn consolidate_styles(&self) -> Result<StyleReport, BuildError> {
        styles::run(
            &self.paths.temp,
            &self.paths.styles,
            &style_target(&self.paths, self.config),
            self.compressors.style.as_ref(),
        )
        .map_err(BuildError::Styles)
    }

    /// Stage 3.
    pub fn consolidate_scripts(&self) -> Result<ScriptReport, BuildError> {
        scripts::run(
            &self.paths.temp,
            &self.paths.scripts,
            &self.paths.output,
            &script_target(&self.paths, self.config),
            self.compressors.script.as_ref(),
            self.compressors.markup.as_ref(),
        )
        .map_err(BuildError::Scripts)
    }

    /// Remove the scratch directory and copy the static assets.
    pub fn finish(&self) -> Result<AssetReport, BuildError> {
        let temp = &self.paths.temp;
        if temp.exists() {
            fs::remove_dir_all(temp).map_err(|source| BuildError::Io {
                path: temp.clone(),
                source,
            })?;
        }
        Ok(assets::copy_assets(
            &self.paths.root,
            &self.paths.output,
            &self.config.assets,
            self.compressors.script.as_ref(),
        ))
    }

    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let partials = self.inline_partials()?;
        let styles = self.consolidate_styles()?;
        let scripts = self.consolidate_scripts()?;
        let assets = self.finish()?;
        Ok(BuildReport {
            partials,
            styles,
            scripts,
            assets,
        })
    }
}

/// Build the project at `root`.
pub fn build(
    root: &Path,
    config: &ProjectConfig,
    compressors: &Compressors,
) -> Result<BuildReport, BuildError> {
    Finalizer::new(root, config, compressors)?.run()
}

/// What a build would do, computed without writing anything.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub partials: PartialReport,
    pub styles: StylePlan,
    pub scripts: ScriptPlan,
}

/// Validate the project at `root` without writing anything.
///
/// Reports the same errors a build would, except compressor failures.
pub fn check(root: &Path, config: &ProjectConfig) -> Result<CheckReport, BuildError> {
    config.validate()?;
    let paths = ProjectPaths::new(root, config);

    let partials =
        partials::resolve_pages(&paths.pages, &paths.partials).map_err(BuildError::Partials)?;
    let pages: Vec<PageText> = partials
        .pages
        .iter()
        .map(|p| PageText {
            name: p.name.clone(),
            text: p.text.clone(),
        })
        .collect();

    let styles = discover_with(&paths.styles, |catalog| {
        let plan = styles::discover(&pages, catalog)?;
        stage::ensure_no_clash(plan.standalone(), &style_target(&paths, config))?;
        Ok(plan)
    })
    .map_err(BuildError::Styles)?;

    let scripts = discover_with(&paths.scripts, |catalog| {
        let plan = scripts::discover(&pages, catalog)?;
        stage::ensure_no_clash(plan.standalone(), &script_target(&paths, config))?;
        Ok(plan)
    })
    .map_err(BuildError::Scripts)?;

    Ok(CheckReport {
        partials,
        styles,
        scripts,
    })
}

fn discover_with<T>(
    dir: &Path,
    discover: impl FnOnce(&ResourceCatalog) -> Result<T, StageError>,
) -> Result<T, StageError> {
    let catalog = ResourceCatalog::load(dir).map_err(StageError::io(dir))?;
    discover(&catalog)
}

/// Delete the output directory. Returns whether there was one.
pub fn clean(root: &Path, config: &ProjectConfig) -> Result<bool, BuildError> {
    config.validate()?;
    let output = ProjectPaths::new(root, config).output;
    if !output.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&output).map_err(|source| BuildError::Io {
        path: output.clone(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use crate::test_helpers::*;

    fn two_page_project() -> ProjectFixture {
        ProjectFixture::new()
            .page(
                "index.html",
                "<html>\n<- partial(head.html) ->\n<body>\n<- script(app.js, 1) ->\n<- script(index.js, 2) ->\n</body>\n</html>",
            )
            .page(
                "about.html",
                "<html>\n<- partial(head.html) ->\n<body>\n<- script(app.js, 1) ->\n</body>\n</html>",
            )
            .partial("head.html", "<head>\n<- style(common.css) ->\n</head>")
            .style("common.css", "body{}")
            .script("app.js", "APP;")
            .script("index.js", "INDEX;")
    }

    #[test]
    fn build_writes_site_and_removes_scratch() {
        let project = two_page_project();

        let report = build(project.root(), project.config(), &Compressors::passthrough()).unwrap();

        assert_eq!(
            list_files(&project.output()),
            vec![
                "about.html",
                "css/globalstyle.css",
                "index.html",
                "js/globalscript.js",
                "js/index.js",
            ]
        );
        assert_eq!(
            project.read_output("index.html"),
            "<html><head><link rel=\"stylesheet\" href=\"css/globalstyle.css\">\n</head>\n<body><script src=\"js/globalscript.js\"></script><script src=\"js/index.js\"></script>\n</body>\n</html>"
        );
        assert_eq!(project.read_output("js/globalscript.js"), "APP;");
        assert_eq!(report.styles.bundled, vec!["common.css"]);
        assert_eq!(report.scripts.standalone, vec!["index.js"]);
        assert!(!project.temp().exists());
    }

    #[test]
    fn uri_prefix_applies_to_links() {
        let mut project = two_page_project();
        project.config_mut().uri_prefix = "/static/".into();

        build(project.root(), project.config(), &Compressors::passthrough()).unwrap();

        let about = project.read_output("about.html");
        assert!(about.contains("href=\"/static/css/globalstyle.css\""));
        assert!(about.contains("src=\"/static/js/globalscript.js\""));
    }

    #[test]
    fn failing_stage_is_named_and_later_stages_skipped() {
        let project = two_page_project().page("broken.html", "<- style(missing.css) ->");

        let err = build(project.root(), project.config(), &Compressors::passthrough()).unwrap_err();

        assert!(matches!(
            err,
            BuildError::Styles(StageError::MissingResource { kind: DirectiveKind::Style, .. })
        ));
        assert!(err.to_string().starts_with("stage 2 (styles) failed"));
        assert!(!project.output().join("js").exists());
        assert!(project.temp().exists());
    }

    #[test]
    fn check_classifies_without_writing() {
        let project = two_page_project();

        let report = check(project.root(), project.config()).unwrap();

        assert_eq!(report.partials.pages.len(), 2);
        assert_eq!(report.styles.bundled(), vec!["common.css"]);
        assert_eq!(report.scripts.bundled(), vec![("app.js", 1)]);
        assert_eq!(report.scripts.standalone(), vec!["index.js"]);
        assert!(!project.output().exists());
    }

    #[test]
    fn check_reports_missing_script() {
        let project = ProjectFixture::new().page("index.html", "<- script(missing.js, 0) ->");

        let err = check(project.root(), project.config()).unwrap_err();

        assert!(matches!(err, BuildError::Scripts(StageError::MissingResource { .. })));
        assert!(!project.output().exists());
    }

    #[test]
    fn build_copies_assets_after_stages() {
        let project = two_page_project().file("assets/images/logo.png", "png");

        let report = build(project.root(), project.config(), &Compressors::passthrough()).unwrap();

        assert_eq!(project.read_output("assets/images/logo.png"), "png");
        assert_eq!(report.assets.warnings.len(), 3);
    }

    #[test]
    fn invalid_layout_is_rejected_before_touching_files() {
        let mut project = two_page_project();
        project.config_mut().output.temp = "..".into();

        let err = build(project.root(), project.config(), &Compressors::passthrough()).unwrap_err();

        assert!(matches!(err, BuildError::Config(_)));
        assert!(project.pages().join("index.html").exists());

        project.config_mut().output.temp = ".statapp-tmp".into();
        project.config_mut().output.dir = ".".into();
        assert!(matches!(
            clean(project.root(), project.config()),
            Err(BuildError::Config(_))
        ));
        assert!(project.pages().join("index.html").exists());
    }

    #[test]
    fn clean_removes_output() {
        let project = two_page_project();
        build(project.root(), project.config(), &Compressors::passthrough()).unwrap();

        assert!(clean(project.root(), project.config()).unwrap());
        assert!(!project.output().exists());
        assert!(!clean(project.root(), project.config()).unwrap());
    }
}
