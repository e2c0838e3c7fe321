//! Script consolidation.
//!
//! Stage 3 of the build pipeline, and the last one to touch the pages. The
//! algorithm mirrors [`styles`](crate::styles) with one addition: every
//! `<- script(name, order) ->` directive carries a sort order, and the global
//! bundle is concatenated in ascending order.
//!
//! ## Ordering
//!
//! A script may be requested with different orders by different pages; the
//! lowest order wins. Ties keep the order in which the scripts were first
//! encountered (pages by file name, directives in document order).
//!
//! ```text
//! index.html: script(jquery.js, 0) script(app.js, 10) script(index.js, 20)
//! about.html: script(app.js, 5)    script(jquery.js, 0)
//!
//! order map:  jquery.js → 0, app.js → 5, index.js → 20
//! bundle:     js/globalscript.js = jquery.js + app.js
//! standalone: js/index.js
//! ```
//!
//! After rewriting, each page is compressed as HTML and written to the root
//! of the output directory.

use crate::catalog::ResourceCatalog;
use crate::compress::TextCompressor;
use crate::directive::{Directive, DirectiveKind};
use crate::scanner::{collect_spans, rewrite};
use crate::stage::{self, BundleTarget, PageText, ResourceUsage, StageError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Lowest requested order of each script, with first-encounter positions
/// for tie breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOrderMap {
    entries: HashMap<String, (i32, usize)>,
}

impl ScriptOrderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request for `name` at `order`, keeping the minimum.
    pub fn request(&mut self, name: &str, order: i32) {
        let next = self.entries.len();
        self.entries
            .entry(name.to_string())
            .and_modify(|(current, _)| *current = (*current).min(order))
            .or_insert((order, next));
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.entries.get(name).map(|(order, _)| *order)
    }

    /// All scripts sorted by (order, first encounter).
    pub fn sorted(&self) -> Vec<(&str, i32)> {
        let mut sorted: Vec<(&str, i32, usize)> = self
            .entries
            .iter()
            .map(|(name, (order, seen))| (name.as_str(), *order, *seen))
            .collect();
        sorted.sort_by_key(|&(_, order, seen)| (order, seen));
        sorted
            .into_iter()
            .map(|(name, order, _)| (name, order))
            .collect()
    }
}

/// Result of the discovery pass.
#[derive(Debug, Clone)]
pub struct ScriptPlan {
    pub usage: ResourceUsage,
    pub global: HashSet<String>,
    pub order: ScriptOrderMap,
    /// Every referenced script and its source file, sorted by name.
    pub files: BTreeMap<String, PathBuf>,
}

impl ScriptPlan {
    pub fn is_global(&self, name: &str) -> bool {
        self.global.contains(name)
    }

    /// Global scripts in bundle order, with their effective order.
    pub fn bundled(&self) -> Vec<(&str, i32)> {
        self.order
            .sorted()
            .into_iter()
            .filter(|(name, _)| self.is_global(name))
            .collect()
    }

    /// Referenced scripts that are not global, sorted by name.
    pub fn standalone(&self) -> Vec<&str> {
        self.files
            .keys()
            .filter(|name| !self.is_global(name))
            .map(String::as_str)
            .collect()
    }
}

/// Summary of a stage 3 run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub pages: usize,
    /// Scripts concatenated into the global bundle with their order.
    pub bundled: Vec<(String, i32)>,
    /// Scripts written on their own.
    pub standalone: Vec<String>,
    pub global_bundle: PathBuf,
}

/// Collect and check the script references of `pages`.
pub fn discover<'a, I>(pages: I, catalog: &ResourceCatalog) -> Result<ScriptPlan, StageError>
where
    I: IntoIterator<Item = &'a PageText>,
{
    let mut usage = ResourceUsage::new();
    let mut order = ScriptOrderMap::new();
    let mut files = BTreeMap::new();

    for page in pages {
        let spans = collect_spans(&page.text).map_err(StageError::scan(&page.name))?;
        let mut referenced = BTreeSet::new();

        for span in &spans {
            let Directive::Script { name, order: requested } = &span.directive else {
                continue;
            };
            let path = catalog
                .get(name)
                .ok_or_else(|| StageError::MissingResource {
                    kind: DirectiveKind::Script,
                    name: name.clone(),
                    page: page.name.clone(),
                })?;
            files.insert(name.clone(), path.to_path_buf());
            referenced.insert(name.clone());
            order.request(name, *requested);
        }
        usage.record_page(referenced);
    }

    let global = usage.global();
    Ok(ScriptPlan {
        usage,
        global,
        order,
        files,
    })
}

fn script_tag(src: &str) -> String {
    format!(r#"<script src="{}"></script>"#, stage::escape_attr(src))
}

/// Replace the script directives of one page with script tags.
pub fn rewrite_page(page: &PageText, plan: &ScriptPlan, target: &BundleTarget) -> Result<String, StageError> {
    let spans = collect_spans(&page.text).map_err(StageError::scan(&page.name))?;
    let mut global_included = false;

    rewrite(&page.text, &spans, |span| {
        let Directive::Script { name, .. } = &span.directive else {
            return Ok(None);
        };
        if !plan.is_global(name) {
            return Ok(Some(script_tag(&target.url(name))));
        }
        if global_included {
            return Ok(Some(String::new()));
        }
        global_included = true;
        Ok(Some(script_tag(&target.global_url())))
    })
}

/// Run stage 3: emit scripts and write the final, compressed pages into
/// `output_dir`.
pub fn run(
    temp_dir: &Path,
    scripts_dir: &Path,
    output_dir: &Path,
    target: &BundleTarget,
    script_compressor: &dyn TextCompressor,
    markup_compressor: &dyn TextCompressor,
) -> Result<ScriptReport, StageError> {
    let catalog = ResourceCatalog::load(scripts_dir).map_err(StageError::io(scripts_dir))?;
    let pages = stage::read_pages(temp_dir)?;
    let plan = discover(&pages, &catalog)?;

    stage::ensure_no_clash(plan.standalone(), target)?;
    stage::create_dir(&target.dir)?;

    // discover records a file for every script it orders
    let mut bundle = String::new();
    for (name, _) in plan.bundled() {
        bundle.push_str(&stage::read_text(&plan.files[name])?);
    }

    for (name, path) in plan.files.iter().filter(|(name, _)| !plan.is_global(name)) {
        let compressed = script_compressor
            .compress(&stage::read_text(path)?)
            .map_err(StageError::compress(name))?;
        stage::write_text(&target.dir.join(name), &compressed)?;
    }

    let global_bundle = target.dir.join(&target.global_name);
    let compressed = script_compressor
        .compress(&bundle)
        .map_err(StageError::compress(&target.global_name))?;
    stage::write_text(&global_bundle, &compressed)?;

    for page in &pages {
        let text = rewrite_page(page, &plan, target)?;
        let compressed = markup_compressor
            .compress(&text)
            .map_err(StageError::compress(&page.name))?;
        stage::write_text(&output_dir.join(&page.name), &compressed)?;
    }

    Ok(ScriptReport {
        pages: pages.len(),
        bundled: plan
            .bundled()
            .into_iter()
            .map(|(name, order)| (name.to_string(), order))
            .collect(),
        standalone: plan.standalone().into_iter().map(String::from).collect(),
        global_bundle,
    })
}
