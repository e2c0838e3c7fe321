//! Directive marker scanning and span substitution.
//!
//! Directives live between an open marker `<-` and a close marker `->`:
//!
//! ```text
//! <head>
//!     <- partial(head.html) ->
//!     <- style(common.css) ->
//! </head>
//! ```
//!
//! The scan is a plain linear search for the fixed markers. Each match yields
//! a [`DirectiveSpan`] whose range starts one character *before* the open
//! marker: the marker owns its separator (normally the space or newline in
//! front of it), so replacing a span also consumes that character. A marker
//! at the very start of a document, or directly after the previous span,
//! owns nothing in front of it.
//!
//! Substitution is done by [`rewrite`], which copies everything outside the
//! replaced spans verbatim.

use crate::directive::{Directive, DirectiveError, parse_directive};
use std::ops::Range;
use thiserror::Error;

pub const OPEN_MARKER: &str = "<-";
pub const CLOSE_MARKER: &str = "->";

/// Length of the excerpt shown for unterminated directives.
const EXCERPT_CHARS: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated directive at byte {offset}: no matching '->' after '{excerpt}'")]
    Unterminated { offset: usize, excerpt: String },
    #[error("invalid directive at byte {offset}: {source}")]
    Directive {
        offset: usize,
        #[source]
        source: DirectiveError,
    },
}

/// One directive occurrence inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSpan<'a> {
    /// Byte range replaced on substitution.
    pub range: Range<usize>,
    /// Trimmed text between the markers.
    pub body: &'a str,
    pub directive: Directive,
}

/// Lazy iterator over the directives of a document, in document order.
///
/// Yields at most one error, after which it is exhausted.
pub struct DirectiveSpans<'a> {
    text: &'a str,
    cursor: usize,
    done: bool,
}

/// Scan `text` for directive markers.
pub fn scan(text: &str) -> DirectiveSpans<'_> {
    DirectiveSpans {
        text,
        cursor: 0,
        done: false,
    }
}

/// Scan `text` and collect every span, failing on the first bad directive.
pub fn collect_spans(text: &str) -> Result<Vec<DirectiveSpan<'_>>, ScanError> {
    scan(text).collect()
}

impl<'a> Iterator for DirectiveSpans<'a> {
    type Item = Result<DirectiveSpan<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let text = self.text;
        let Some(open) = text[self.cursor..].find(OPEN_MARKER).map(|i| self.cursor + i) else {
            self.done = true;
            return None;
        };

        let body_start = open + OPEN_MARKER.len();
        let Some(close) = text[body_start..].find(CLOSE_MARKER).map(|i| body_start + i) else {
            self.done = true;
            return Some(Err(ScanError::Unterminated {
                offset: open,
                excerpt: text[open..].chars().take(EXCERPT_CHARS).collect(),
            }));
        };

        let body = text[body_start..close].trim();
        let directive = match parse_directive(body) {
            Ok(d) => d,
            Err(source) => {
                self.done = true;
                return Some(Err(ScanError::Directive {
                    offset: open,
                    source,
                }));
            }
        };

        let start = if open > self.cursor {
            text[..open]
                .chars()
                .next_back()
                .map_or(open, |c| open - c.len_utf8())
        } else {
            open
        };
        let end = close + CLOSE_MARKER.len();
        self.cursor = end;

        Some(Ok(DirectiveSpan {
            range: start..end,
            body,
            directive,
        }))
    }
}

impl std::iter::FusedIterator for DirectiveSpans<'_> {}

/// Rebuild `text`, letting `replace` decide what happens to each span.
///
/// `Ok(Some(s))` replaces the span with `s` (an empty string deletes it),
/// `Ok(None)` keeps the span verbatim. Spans must come from scanning `text`.
pub fn rewrite<'a, E, F>(text: &str, spans: &[DirectiveSpan<'a>], mut replace: F) -> Result<String, E>
where
    F: FnMut(&DirectiveSpan<'a>) -> Result<Option<String>, E>,
{
    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in spans {
        if let Some(replacement) = replace(span)? {
            result.push_str(&text[cursor..span.range.start]);
            result.push_str(&replacement);
            cursor = span.range.end;
        }
    }
    result.push_str(&text[cursor..]);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use std::convert::Infallible;

    fn replace_all(text: &str, with: &str) -> String {
        let spans = collect_spans(text).unwrap();
        rewrite::<Infallible, _>(text, &spans, |_| Ok(Some(with.to_string()))).unwrap()
    }

    #[test]
    fn no_directives_yields_nothing() {
        assert_eq!(scan("<html><body>plain</body></html>").count(), 0);
        assert_eq!(scan("").count(), 0);
    }

    #[test]
    fn text_without_markers_round_trips() {
        let text = "<p>a - b < c -> not really</p>";
        // "->" without a preceding "<-" is not a directive
        assert_eq!(replace_all(text, "X"), text);
    }

    #[test]
    fn finds_directives_in_order() {
        let text = "a <- partial(h.html) -> b <- style(s.css) -> c <- script(j.js, 2) ->";
        let kinds: Vec<DirectiveKind> = scan(text).map(|s| s.unwrap().directive.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DirectiveKind::Partial,
                DirectiveKind::Style,
                DirectiveKind::Script
            ]
        );
    }

    #[test]
    fn body_is_trimmed_text_between_markers() {
        let span = scan("x <-   style(a.css)\n ->").next().unwrap().unwrap();
        assert_eq!(span.body, "style(a.css)");
    }

    #[test]
    fn span_owns_one_character_before_marker() {
        let text = "ab <- style(a.css) -> cd";
        let span = scan(text).next().unwrap().unwrap();
        assert_eq!(&text[span.range.clone()], " <- style(a.css) ->");
        assert_eq!(replace_all(text, "X"), "abX cd");
    }

    #[test]
    fn marker_at_start_owns_nothing_before_it() {
        let text = "<- style(a.css) ->rest";
        let span = scan(text).next().unwrap().unwrap();
        assert_eq!(span.range, 0..18);
        assert_eq!(replace_all(text, "X"), "Xrest");
    }

    #[test]
    fn adjacent_spans_do_not_overlap() {
        let text = "<- style(a.css) -><- style(b.css) ->";
        let spans = collect_spans(text).unwrap();
        assert_eq!(spans[0].range.end, spans[1].range.start);
        assert_eq!(replace_all(text, "X"), "XX");
    }

    #[test]
    fn multibyte_character_before_marker() {
        let text = "é<- style(a.css) ->";
        assert_eq!(replace_all(text, "X"), "X");
    }

    #[test]
    fn unterminated_directive_is_error() {
        let mut spans = scan("ok <- style(a.css) -> then <- partial(x.html)");
        assert!(spans.next().unwrap().is_ok());
        let err = spans.next().unwrap().unwrap_err();
        assert!(matches!(err, ScanError::Unterminated { offset: 27, .. }));
        assert!(spans.next().is_none());
    }

    #[test]
    fn close_marker_must_follow_open_marker() {
        // "<->" shares the dash; the close marker is searched after "<-"
        let err = scan("<-> style(a.css)").next().unwrap().unwrap_err();
        assert!(matches!(err, ScanError::Unterminated { offset: 0, .. }));
        let err = scan("<-> style(a.css) ->").next().unwrap().unwrap_err();
        assert!(matches!(err, ScanError::Directive { .. }));
    }

    #[test]
    fn bad_directive_reports_offset() {
        let err = collect_spans("hello <- foo(a) ->").unwrap_err();
        assert!(matches!(
            err,
            ScanError::Directive {
                offset: 6,
                source: DirectiveError::Unknown { .. }
            }
        ));
    }

    #[test]
    fn scanning_is_restartable() {
        let text = "<- style(a.css) -> <- style(b.css) ->";
        assert_eq!(scan(text).count(), 2);
        assert_eq!(scan(text).count(), 2);
    }

    #[test]
    fn kept_spans_are_copied_verbatim() {
        let text = "a <- style(s.css) -> b <- partial(p.html) -> c";
        let spans = collect_spans(text).unwrap();
        let out = rewrite::<Infallible, _>(text, &spans, |span| {
            Ok(match &span.directive {
                Directive::Partial { .. } => Some("P".to_string()),
                _ => None,
            })
        })
        .unwrap();
        assert_eq!(out, "a <- style(s.css) -> bP c");
    }

    #[test]
    fn empty_replacement_deletes_span() {
        assert_eq!(replace_all("a <- style(s.css) -> b", ""), "a b");
    }

    #[test]
    fn replace_error_aborts_rewrite() {
        let text = "<- style(s.css) ->";
        let spans = collect_spans(text).unwrap();
        let result: Result<String, &str> = rewrite(text, &spans, |_| Err("nope"));
        assert_eq!(result, Err("nope"));
    }
}
