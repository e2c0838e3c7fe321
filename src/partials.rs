//! Partial inlining.
//!
//! Stage 1 of the build pipeline. Every page in the pages directory has its
//! `<- partial(name) ->` directives replaced with the raw contents of the
//! named file from the partials directory, and is written under the same
//! file name into the scratch directory for the later stages.
//!
//! ```text
//! html/index.html            partials/head.html
//! <html>                     <head><title>Home</title>
//!   <- partial(head.html) ->   <- style(common.css) ->
//!   <body>...</body>         </head>
//! </html>
//! ```
//!
//! Partials are inlined verbatim. Directives inside a partial are not
//! expanded here; `style` and `script` directives brought in by a partial are
//! picked up by the next stages like any other.
//!
//! Every page is resolved in memory before anything is written, so a bad
//! directive or missing partial leaves the scratch directory untouched.

use crate::catalog::ResourceCatalog;
use crate::directive::{Directive, DirectiveKind};
use crate::scanner::{collect_spans, rewrite};
use crate::stage::{self, PageFile, StageError};
use std::collections::HashMap;
use std::path::Path;

/// A page after partial inlining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub name: String,
    pub text: String,
    /// Partials inlined into this page, in document order.
    pub partials: Vec<String>,
}

/// Summary of a stage 1 run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialReport {
    pub partials_available: usize,
    pub pages: Vec<ResolvedPage>,
}

/// Replace the partial directives of one page.
///
/// `partials` caches file contents across pages of the same run.
pub fn inline_partials(
    page: &str,
    text: &str,
    catalog: &ResourceCatalog,
    partials: &mut HashMap<String, String>,
) -> Result<ResolvedPage, StageError> {
    let spans = collect_spans(text).map_err(StageError::scan(page))?;
    let mut used = Vec::new();

    let resolved = rewrite(text, &spans, |span| {
        let Directive::Partial { name } = &span.directive else {
            return Ok(None);
        };
        let path = catalog
            .get(name)
            .ok_or_else(|| StageError::MissingResource {
                kind: DirectiveKind::Partial,
                name: name.clone(),
                page: page.to_string(),
            })?;
        if !partials.contains_key(name) {
            partials.insert(name.clone(), stage::read_text(path)?);
        }
        used.push(name.clone());
        Ok(partials.get(name).cloned())
    })?;

    Ok(ResolvedPage {
        name: page.to_string(),
        text: resolved,
        partials: used,
    })
}

/// Resolve every page of `pages_dir` in memory.
pub fn resolve_pages(pages_dir: &Path, partials_dir: &Path) -> Result<PartialReport, StageError> {
    let catalog = ResourceCatalog::load(partials_dir).map_err(StageError::io(partials_dir))?;
    let mut cache = HashMap::new();

    let pages = stage::list_pages(pages_dir)?
        .into_iter()
        .map(|PageFile { name, path }| {
            let text = stage::read_text(&path)?;
            inline_partials(&name, &text, &catalog, &mut cache)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PartialReport {
        partials_available: catalog.len(),
        pages,
    })
}

/// Run stage 1: resolve all pages and write them into `temp_dir`.
///
/// Leftovers of an earlier run are removed from `temp_dir` once every page
/// has resolved.
pub fn run(pages_dir: &Path, partials_dir: &Path, temp_dir: &Path) -> Result<PartialReport, StageError> {
    let report = resolve_pages(pages_dir, partials_dir)?;

    stage::reset_dir(temp_dir)?;
    for page in &report.pages {
        stage::write_text(&temp_dir.join(&page.name), &page.text)?;
    }

    Ok(report)
}
