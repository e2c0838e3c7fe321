//! # statapp
//!
//! A build tool for static web applications. Pages are plain HTML files that
//! pull in shared fragments, stylesheets and scripts through inline
//! directives:
//!
//! ```text
//! <- partial(head.html) ->
//! <- style(common.css) ->
//! <- script(app.js, 10) ->
//! ```
//!
//! The build resolves the directives into a deployable bundle: partials are
//! inlined, stylesheets and scripts referenced by every page are concatenated
//! into one global bundle each, everything else is linked on its own, and the
//! final pages are minified.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Partials  html/ + partials/  →  scratch pages     (partial directives inlined)
//! 2. Styles    scratch + styles/  →  app/css/          (style directives → <link>)
//! 3. Scripts   scratch + scripts/ →  app/js/, app/     (script directives → <script>)
//! ```
//!
//! Each stage scans every page before writing anything, so a missing
//! resource is reported without touching that stage's output. The
//! [`bundle::Finalizer`] runs the stages strictly in order and stops at the
//! first failure.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | Parses the text between markers into a typed [`directive::Directive`] |
//! | [`scanner`] | Finds marker pairs in a page and rewrites the spans they cover |
//! | [`catalog`] | Name → file lookup for a resource directory |
//! | [`stage`] | Errors, page I/O and global/page-specific classification shared by the stages |
//! | [`partials`] | Stage 1: partial inlining |
//! | [`styles`] | Stage 2: style consolidation |
//! | [`scripts`] | Stage 3: ordered script consolidation and page compression |
//! | [`compress`] | Text compressors for markup, stylesheets and scripts (minify-html) |
//! | [`bundle`] | Stage orchestration, dry-run check and clean |
//! | [`assets`] | Static asset mirroring and locale compression |
//! | [`scaffold`] | `init`: project layout and stock config |
//! | [`config`] | `statapp.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for every report |
//!
//! # Design Decisions
//!
//! ## Global Means Every Page
//!
//! A stylesheet or script is global when every page references it. Global
//! resources are served as one file that browsers cache once for the whole
//! site; the rest are linked only from the pages that use them. A page with
//! no style directive at all therefore makes no stylesheet global.
//!
//! ## Lowest Order Wins
//!
//! Script directives carry an order. When pages disagree about a script, its
//! lowest order is used for the bundle. Equal orders keep the order in which
//! the scripts were first seen.
//!
//! ## Injected Compressors
//!
//! Stages take their compressors as [`compress::TextCompressor`] trait
//! objects. Production builds use minify-html; `compress = false` and the
//! tests use a passthrough, so stage output can be asserted byte for byte.

pub mod assets;
pub mod bundle;
pub mod catalog;
pub mod compress;
pub mod config;
pub mod directive;
pub mod output;
pub mod partials;
pub mod scaffold;
pub mod scanner;
pub mod scripts;
pub mod stage;
pub mod styles;

#[cfg(test)]
pub(crate) mod test_helpers;
