//! Text compression for pages, stylesheets and scripts.
//!
//! The pipeline only needs one capability from a compressor: turn a text
//! into a semantically equivalent text that is no longer than the input.
//! That capability is the [`TextCompressor`] trait, with one implementation
//! per content type bundled in [`Compressors`].
//!
//! | Content | Production | `compress = false` |
//! |---|---|---|
//! | **Markup** | [`HtmlMinifier`] | [`Passthrough`] |
//! | **Stylesheet** | [`CssMinifier`] | [`Passthrough`] |
//! | **Script** | [`JsMinifier`] | [`Passthrough`] |
//!
//! A compressor may fail; the stages treat any failure as fatal.

mod minify;

pub use minify::{CssMinifier, HtmlMinifier, JsMinifier};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    #[error("{content} compression failed: {reason}")]
    Failed {
        content: &'static str,
        reason: String,
    },
}

/// Trait for text compressors.
pub trait TextCompressor {
    fn compress(&self, text: &str) -> Result<String, CompressError>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TextCompressor for Passthrough {
    fn compress(&self, text: &str) -> Result<String, CompressError> {
        Ok(text.to_string())
    }
}

/// One compressor per content type.
pub struct Compressors {
    pub markup: Box<dyn TextCompressor>,
    pub style: Box<dyn TextCompressor>,
    pub script: Box<dyn TextCompressor>,
}

impl Compressors {
    /// The minify-html backed compressors.
    pub fn minifying() -> Self {
        Self {
            markup: Box::new(HtmlMinifier),
            style: Box::new(CssMinifier),
            script: Box::new(JsMinifier),
        }
    }

    /// Compressors that leave every text untouched.
    pub fn passthrough() -> Self {
        Self {
            markup: Box::new(Passthrough),
            style: Box::new(Passthrough),
            script: Box::new(Passthrough),
        }
    }

    /// Pick the compressors for the `compress` config switch.
    pub fn for_config(compress: bool) -> Self {
        if compress {
            Self::minifying()
        } else {
            Self::passthrough()
        }
    }
}
