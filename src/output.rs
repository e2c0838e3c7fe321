//! CLI output formatting for all pipeline stages.
//!
//! # Resource-First Display
//!
//! Stage output lists what the build produced, grouped the way a reader of
//! the bundle thinks about it: pages and the partials they pulled in, then
//! the global bundle and the standalone files of each resource kind. Output
//! paths are shown relative to the output directory.
//!
//! # Output Format
//!
//! ## Partials
//!
//! ```text
//! 001 about.html
//!     Partials: head.html
//! 002 index.html
//!     Partials: head.html, nav.html
//! Inlined 3 partials into 2 pages
//! ```
//!
//! ## Styles / Scripts
//!
//! ```text
//! Global → js/globalscript.js
//!     0 jquery.js
//!     5 app.js
//! Standalone
//!     index.js → js/index.js
//! ```
//!
//! Stylesheets have no order, so their bundle lines carry only the name.
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Warnings go
//! to stderr. Format functions are pure: no I/O, no side effects.

use crate::assets::AssetReport;
use crate::bundle::CheckReport;
use crate::partials::PartialReport;
use crate::scaffold::ScaffoldReport;
use crate::scripts::ScriptReport;
use crate::styles::StyleReport;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` with forward slashes, or as-is when outside.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// The global bundle and standalone section shared by styles and scripts.
///
/// `bundled` lines are preformatted so scripts can carry their order.
fn bundle_section(
    global: &str,
    bundled: &[String],
    standalone: &[String],
    url_dir: &str,
) -> Vec<String> {
    let mut lines = vec![format!("Global → {global}")];
    if bundled.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }
    lines.extend(bundled.iter().map(|b| format!("{}{b}", indent(1))));

    if !standalone.is_empty() {
        lines.push("Standalone".to_string());
        for name in standalone {
            lines.push(format!("{}{name} → {url_dir}/{name}", indent(1)));
        }
    }
    lines
}

// ============================================================================
// Stage 1: Partials
// ============================================================================

pub fn format_partial_report(report: &PartialReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut inlined = 0;

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), page.name));
        if !page.partials.is_empty() {
            lines.push(format!("{}Partials: {}", indent(1), page.partials.join(", ")));
        }
        inlined += page.partials.len();
    }

    lines.push(format!(
        "Inlined {} into {}",
        plural(inlined, "partial"),
        plural(report.pages.len(), "page")
    ));
    lines
}

pub fn print_partial_report(report: &PartialReport) {
    for line in format_partial_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Styles
// ============================================================================

pub fn format_style_report(report: &StyleReport, output_root: &Path) -> Vec<String> {
    let global = display_path(&report.global_bundle, output_root);
    let url_dir = global.rsplit_once('/').map_or("", |(dir, _)| dir).to_string();
    bundle_section(&global, &report.bundled, &report.standalone, &url_dir)
}

pub fn print_style_report(report: &StyleReport, output_root: &Path) {
    for line in format_style_report(report, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Scripts
// ============================================================================

pub fn format_script_report(report: &ScriptReport, output_root: &Path) -> Vec<String> {
    let global = display_path(&report.global_bundle, output_root);
    let url_dir = global.rsplit_once('/').map_or("", |(dir, _)| dir).to_string();
    let bundled: Vec<String> = report
        .bundled
        .iter()
        .map(|(name, order)| format!("{order} {name}"))
        .collect();

    let mut lines = bundle_section(&global, &bundled, &report.standalone, &url_dir);
    lines.push(format!("Wrote {}", plural(report.pages, "page")));
    lines
}

pub fn print_script_report(report: &ScriptReport, output_root: &Path) {
    for line in format_script_report(report, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Assets
// ============================================================================

pub fn format_asset_report(report: &AssetReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .categories
        .iter()
        .map(|c| format!("{}: {} copied, {} skipped", c.category, c.copied, c.skipped))
        .collect();
    if !report.locales.is_empty() {
        lines.push(format!("Compressed locales: {}", report.locales.join(", ")));
    }
    lines
}

pub fn print_asset_report(report: &AssetReport) {
    for line in format_asset_report(report) {
        println!("{}", line);
    }
    print_warnings(&report.warnings);
}

pub fn format_warnings(warnings: &[String]) -> Vec<String> {
    warnings.iter().map(|w| format!("warning: {w}")).collect()
}

pub fn print_warnings(warnings: &[String]) {
    for line in format_warnings(warnings) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the classification a build would apply.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    lines.extend(format_partial_report(&report.partials));

    lines.push(String::new());
    lines.push("Styles".to_string());
    lines.extend(classification(
        report.styles.bundled().into_iter().map(String::from).collect(),
        report.styles.standalone(),
    ));

    lines.push(String::new());
    lines.push("Scripts".to_string());
    lines.extend(classification(
        report
            .scripts
            .bundled()
            .into_iter()
            .map(|(name, order)| format!("{order} {name}"))
            .collect(),
        report.scripts.standalone(),
    ));
    lines
}

fn classification(global: Vec<String>, standalone: Vec<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{}Global: {}", indent(1), list_or_none(&global)));
    let standalone: Vec<String> = standalone.into_iter().map(String::from).collect();
    lines.push(format!("{}Page-specific: {}", indent(1), list_or_none(&standalone)));
    lines
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Init
// ============================================================================

pub fn format_scaffold_report(report: &ScaffoldReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .entries
        .iter()
        .map(|e| {
            let status = if e.created { "created" } else { "exists " };
            format!("{status} {}/ ({})", e.path, e.role)
        })
        .collect();
    if report.config_written {
        lines.push(format!("created {}", crate::config::CONFIG_FILENAME));
    }
    lines
}

pub fn print_scaffold_report(report: &ScaffoldReport) {
    for line in format_scaffold_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
