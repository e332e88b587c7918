//! Diagnostics reported while scanning and parsing.
//!
//! Nothing in this crate fails hard on bad input. Problems are described by a
//! [`Diagnostic`] and handed to [`ParseHooks::syntax_error`]; parsing carries
//! on with the longest valid prefix.
//!
//! [`ParseHooks::syntax_error`]: crate::hooks::ParseHooks::syntax_error

use std::fmt;

use thiserror::Error;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SyntaxErrorKind {
    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("unmatched opening bracket")]
    UnmatchedOpenFence,

    #[error("unmatched closing bracket")]
    UnmatchedCloseFence,

    #[error("expression nested too deeply")]
    RecursionLimit,

    #[error("missing operand")]
    MissingOperand,

    #[error("unexpected token")]
    UnexpectedToken,

    #[error("line break treated as statement separator")]
    NewlineAsSeparator,

    #[error("parse aborted")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The text does not parse; the front end reports the first of these.
    Critical,
    /// Advisory only.
    Informational,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => f.write_str("error"),
            Severity::Informational => f.write_str("note"),
        }
    }
}

/// A located problem in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{severity} at {position}: {kind}")]
pub struct Diagnostic {
    pub kind: SyntaxErrorKind,
    /// Code-unit offset into the parsed text.
    pub position: usize,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn critical(kind: SyntaxErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            severity: Severity::Critical,
        }
    }

    pub fn informational(kind: SyntaxErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            severity: Severity::Informational,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diagnostic_display_names_severity_and_kind() {
        let d = Diagnostic::critical(SyntaxErrorKind::UnmatchedCloseFence, 3);
        assert_eq!(d.to_string(), "error at 3: unmatched closing bracket");
        assert!(d.is_critical());

        let d = Diagnostic::informational(SyntaxErrorKind::NewlineAsSeparator, 0);
        assert_eq!(
            d.to_string(),
            "note at 0: line break treated as statement separator"
        );
    }
}
