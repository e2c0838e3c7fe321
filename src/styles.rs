//! Style consolidation.
//!
//! Stage 2 of the build pipeline. Works on the scratch copies written by
//! stage 1 in three steps:
//!
//! 1. **Discovery**: collect the `<- style(name) ->` references of every
//!    page and check that each stylesheet exists.
//! 2. **Emission**: stylesheets referenced by *every* page are concatenated
//!    into one global bundle (`globalstyle.css`); all others are compressed
//!    and written under their own name.
//! 3. **Rewrite**: the first directive naming a global stylesheet becomes a
//!    link to the bundle and later ones in the same page are dropped;
//!    page-specific directives become their own link. The rewritten pages
//!    replace the scratch copies.
//!
//! ```text
//! index.html: style(common.css) style(index.css)    css/globalstyle.css  = common.css
//! about.html: style(common.css)                  →  css/index.css
//! ```
//!
//! Nothing is written until discovery has succeeded for all pages.

use crate::catalog::ResourceCatalog;
use crate::compress::TextCompressor;
use crate::directive::{Directive, DirectiveKind};
use crate::scanner::{collect_spans, rewrite};
use crate::stage::{self, BundleTarget, PageText, ResourceUsage, StageError};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Result of the discovery pass.
#[derive(Debug, Clone)]
pub struct StylePlan {
    pub usage: ResourceUsage,
    pub global: HashSet<String>,
    /// Every referenced stylesheet and its source file, sorted by name.
    pub files: BTreeMap<String, PathBuf>,
}

impl StylePlan {
    pub fn is_global(&self, name: &str) -> bool {
        self.global.contains(name)
    }

    /// Referenced stylesheets that are not global, sorted by name.
    pub fn standalone(&self) -> Vec<&str> {
        self.files
            .keys()
            .filter(|name| !self.is_global(name))
            .map(String::as_str)
            .collect()
    }

    /// Global stylesheets in bundle order.
    pub fn bundled(&self) -> Vec<&str> {
        self.files
            .keys()
            .filter(|name| self.is_global(name))
            .map(String::as_str)
            .collect()
    }
}

/// Summary of a stage 2 run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleReport {
    pub pages: usize,
    /// Stylesheets concatenated into the global bundle, in bundle order.
    pub bundled: Vec<String>,
    /// Stylesheets written on their own.
    pub standalone: Vec<String>,
    pub global_bundle: PathBuf,
}

/// Collect and check the style references of `pages`.
pub fn discover<'a, I>(pages: I, catalog: &ResourceCatalog) -> Result<StylePlan, StageError>
where
    I: IntoIterator<Item = &'a PageText>,
{
    let mut usage = ResourceUsage::new();
    let mut files = BTreeMap::new();

    for page in pages {
        let spans = collect_spans(&page.text).map_err(StageError::scan(&page.name))?;
        let mut referenced = BTreeSet::new();

        for span in &spans {
            let Directive::Style { name } = &span.directive else {
                continue;
            };
            let path = catalog
                .get(name)
                .ok_or_else(|| StageError::MissingResource {
                    kind: DirectiveKind::Style,
                    name: name.clone(),
                    page: page.name.clone(),
                })?;
            files.insert(name.clone(), path.to_path_buf());
            referenced.insert(name.clone());
        }
        usage.record_page(referenced);
    }

    let global = usage.global();
    Ok(StylePlan {
        usage,
        global,
        files,
    })
}

fn link_tag(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{}">"#, stage::escape_attr(href))
}

/// Replace the style directives of one page with link tags.
pub fn rewrite_page(page: &PageText, plan: &StylePlan, target: &BundleTarget) -> Result<String, StageError> {
    let spans = collect_spans(&page.text).map_err(StageError::scan(&page.name))?;
    let mut global_linked = false;

    rewrite(&page.text, &spans, |span| {
        let Directive::Style { name } = &span.directive else {
            return Ok(None);
        };
        if !plan.is_global(name) {
            return Ok(Some(link_tag(&target.url(name))));
        }
        if global_linked {
            return Ok(Some(String::new()));
        }
        global_linked = true;
        Ok(Some(link_tag(&target.global_url())))
    })
}

/// Run stage 2 over the pages in `temp_dir`.
pub fn run(
    temp_dir: &Path,
    styles_dir: &Path,
    target: &BundleTarget,
    compressor: &dyn TextCompressor,
) -> Result<StyleReport, StageError> {
    let catalog = ResourceCatalog::load(styles_dir).map_err(StageError::io(styles_dir))?;
    let pages = stage::read_pages(temp_dir)?;
    let plan = discover(&pages, &catalog)?;

    stage::ensure_no_clash(plan.standalone(), target)?;
    stage::create_dir(&target.dir)?;

    let mut bundle = String::new();
    for (name, path) in &plan.files {
        let text = stage::read_text(path)?;
        if plan.is_global(name) {
            bundle.push_str(&text);
        } else {
            let compressed = compressor
                .compress(&text)
                .map_err(StageError::compress(name))?;
            stage::write_text(&target.dir.join(name), &compressed)?;
        }
    }

    let global_bundle = target.dir.join(&target.global_name);
    let compressed = compressor
        .compress(&bundle)
        .map_err(StageError::compress(&target.global_name))?;
    stage::write_text(&global_bundle, &compressed)?;

    for page in &pages {
        let text = rewrite_page(page, &plan, target)?;
        stage::write_text(&temp_dir.join(&page.name), &text)?;
    }

    Ok(StyleReport {
        pages: pages.len(),
        bundled: plan.bundled().into_iter().map(String::from).collect(),
        standalone: plan.standalone().into_iter().map(String::from).collect(),
        global_bundle,
    })
}
