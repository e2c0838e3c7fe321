//! minify-html backed compressors.
//!
//! minify-html only accepts documents, so stylesheets and scripts are
//! wrapped in a `<style>` / `<script>` element, minified with CSS/JS
//! minification switched on, and unwrapped again.

use super::{CompressError, TextCompressor};

/// Minifies whole HTML pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMinifier;

/// Minifies stylesheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssMinifier;

/// Minifies scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsMinifier;

fn cfg() -> minify_html::Cfg {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    cfg
}

fn run(content: &'static str, src: &[u8]) -> Result<String, CompressError> {
    let out = minify_html::minify(src, &cfg());
    String::from_utf8(out).map_err(|e| CompressError::Failed {
        content,
        reason: format!("minifier produced invalid UTF-8: {e}"),
    })
}

/// Rewrite every `</tag` (any case) as `<\/tag` so `text` cannot close the
/// element it is wrapped in. CSS and JS both read `\/` as `/` inside
/// strings and regular expressions, and comments are dropped anyway.
fn escape_closing_tag(text: &str, tag: &str) -> String {
    let needle = format!("</{tag}");
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    // ASCII lowercasing keeps byte offsets
    for (i, _) in text.to_ascii_lowercase().match_indices(&needle) {
        out.push_str(&text[last..=i]);
        out.push('\\');
        last = i + 1;
    }
    out.push_str(&text[last..]);
    out
}

/// Minify `text` as the body of a `<tag>` element and return the new body.
fn minify_element(content: &'static str, tag: &str, text: &str) -> Result<String, CompressError> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }

    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let wrapped = format!("{open}{}{close}", escape_closing_tag(text, tag));
    let out = run(content, wrapped.as_bytes())?;
    out.strip_prefix(&open)
        .and_then(|rest| rest.strip_suffix(&close))
        .map(str::to_string)
        .ok_or_else(|| CompressError::Failed {
            content,
            reason: format!("unexpected minifier output around <{tag}> element"),
        })
}

impl TextCompressor for HtmlMinifier {
    fn compress(&self, text: &str) -> Result<String, CompressError> {
        run("markup", text.as_bytes())
    }
}

impl TextCompressor for CssMinifier {
    fn compress(&self, text: &str) -> Result<String, CompressError> {
        minify_element("stylesheet", "style", text)
    }
}

impl TextCompressor for JsMinifier {
    fn compress(&self, text: &str) -> Result<String, CompressError> {
        minify_element("script", "script", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_whitespace_collapsed() {
        let html = "<html>\n  <head>\n    <title>t</title>\n  </head>\n  <body>\n    <p>hi</p>\n  </body>\n</html>\n";
        let out = HtmlMinifier.compress(html).unwrap();
        assert!(out.len() < html.len());
        assert!(out.contains("<p>hi</p>"));
    }

    #[test]
    fn html_comments_removed() {
        let out = HtmlMinifier.compress("<p>a</p><!-- note --><p>b</p>").unwrap();
        assert!(!out.contains("note"));
    }

    #[test]
    fn css_is_shortened_and_unwrapped() {
        let css = "body {\n    color: red;\n}\n\n/* trailing */\n";
        let out = CssMinifier.compress(css).unwrap();
        assert!(out.len() < css.len());
        assert!(out.contains("color:red"));
        assert!(!out.contains("<style>"));
    }

    #[test]
    fn js_is_unwrapped() {
        let js = "function  greet ( name )  {\n    return 'hi ' + name;\n}\n";
        let out = JsMinifier.compress(js).unwrap();
        assert!(out.len() <= js.len());
        assert!(out.contains("greet"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn empty_input_compresses_to_empty() {
        assert_eq!(CssMinifier.compress("").unwrap(), "");
        assert_eq!(JsMinifier.compress("  \n").unwrap(), "");
    }

    #[test]
    fn closing_tags_are_escaped_in_any_case() {
        assert_eq!(
            escape_closing_tag("a</SCRIPT>b</script", "script"),
            "a<\\/SCRIPT>b<\\/script"
        );
        assert_eq!(escape_closing_tag("x < y </style>", "script"), "x < y </style>");
    }

    #[test]
    fn script_injecting_markup_is_minified() {
        let js = "document.body.insertAdjacentHTML('beforeend', '<script src=\"x.js\"></script>');\n";
        let out = JsMinifier.compress(js).unwrap();
        assert!(out.contains("insertAdjacentHTML"), "{out}");
        assert!(out.contains("x.js"), "{out}");
        assert!(!out.starts_with("<script>"));
    }

    #[test]
    fn style_closing_tag_in_comment_is_minified() {
        let css = "/* see </style> note */\nbody {\n    color: red;\n}\n";
        let out = CssMinifier.compress(css).unwrap();
        assert!(out.contains("color:red"), "{out}");
    }
}
