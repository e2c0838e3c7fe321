//! Directive parsing.
//!
//! A directive is the body of a `<- ... ->` marker pair, written as a call:
//!
//! ```text
//! partial(header.html)
//! style(common.css)
//! script(app.js, 10)
//! ```
//!
//! Arguments are split on `,` and whitespace-trimmed. The argument count is
//! fixed per directive kind, and the second `script` argument is the sort
//! order of the script inside the global bundle.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("syntax error in '{directive}': could not find {missing} parenthesis")]
    Syntax {
        directive: String,
        missing: &'static str,
    },
    #[error("'{directive}': {kind} expects {expected} argument(s), got {found}")]
    Arity {
        directive: String,
        kind: DirectiveKind,
        expected: usize,
        found: usize,
    },
    #[error("unknown directive '{directive}'")]
    Unknown { directive: String },
    #[error("'{directive}': script order '{order}' is not an integer")]
    InvalidOrder { directive: String, order: String },
}

/// The three directive kinds of the template language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Partial,
    Script,
    Style,
}

impl DirectiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Partial => "partial",
            DirectiveKind::Script => "script",
            DirectiveKind::Style => "style",
        }
    }

    fn arity(self) -> usize {
        match self {
            DirectiveKind::Script => 2,
            DirectiveKind::Partial | DirectiveKind::Style => 1,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Inline the named partial file verbatim.
    Partial { name: String },
    /// Include the named script; `order` positions it in the global bundle.
    Script { name: String, order: i32 },
    /// Include the named stylesheet.
    Style { name: String },
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Partial { .. } => DirectiveKind::Partial,
            Directive::Script { .. } => DirectiveKind::Script,
            Directive::Style { .. } => DirectiveKind::Style,
        }
    }

    /// The referenced file name.
    pub fn name(&self) -> &str {
        match self {
            Directive::Partial { name } | Directive::Script { name, .. } | Directive::Style { name } => {
                name
            }
        }
    }

    /// Arguments in source order, as they would be written in the directive.
    pub fn args(&self) -> Vec<String> {
        match self {
            Directive::Script { name, order } => vec![name.clone(), order.to_string()],
            Directive::Partial { name } | Directive::Style { name } => vec![name.clone()],
        }
    }
}

/// Parse a trimmed directive body such as `script(app.js, 3)`.
pub fn parse_directive(body: &str) -> Result<Directive, DirectiveError> {
    let open = body.find('(').ok_or_else(|| DirectiveError::Syntax {
        directive: body.to_string(),
        missing: "opening",
    })?;
    let close = body[open..]
        .find(')')
        .map(|offset| open + offset)
        .ok_or_else(|| DirectiveError::Syntax {
            directive: body.to_string(),
            missing: "closing",
        })?;

    let args: Vec<&str> = body[open + 1..close].split(',').map(str::trim).collect();

    let kind = match body[..open].trim() {
        "partial" => DirectiveKind::Partial,
        "script" => DirectiveKind::Script,
        "style" => DirectiveKind::Style,
        _ => {
            return Err(DirectiveError::Unknown {
                directive: body.to_string(),
            });
        }
    };

    if args.len() != kind.arity() {
        return Err(DirectiveError::Arity {
            directive: body.to_string(),
            kind,
            expected: kind.arity(),
            found: args.len(),
        });
    }

    let name = args[0].to_string();
    Ok(match kind {
        DirectiveKind::Partial => Directive::Partial { name },
        DirectiveKind::Style => Directive::Style { name },
        DirectiveKind::Script => {
            let order = args[1]
                .parse::<i32>()
                .map_err(|_| DirectiveError::InvalidOrder {
                    directive: body.to_string(),
                    order: args[1].to_string(),
                })?;
            Directive::Script { name, order }
        }
    })
}
