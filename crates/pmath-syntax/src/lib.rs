//! # pmath-syntax
//!
//! An incremental lexer/parser for pMath source text that produces a
//! [`SpanArray`] instead of a syntax tree, plus the two conversions between
//! span arrays and [`BoxNode`] trees.
//!
//! ## What is a Span Array?
//!
//! The text stays flat. Every code unit carries two flags (token end,
//! operand start), and every grouping the parser reduces becomes a span
//! `[start, end]` attached to its start position. Groupings never cross, so
//! the spans describe a tree without materializing one.
//!
//! ```text
//! "a+b*c"   flags  +|+|+
//!           spans  0..4, 2..4
//! ```
//!
//! ## Architecture Overview
//!
//! ```text
//! text → Scanner → token flags → Parser → spans → Grouper → BoxNode
//!        (Logos glyphs)          (precedence climbing)
//!
//! BoxNode → Ungrouper → text + spans
//! ```
//!
//! ### 1. Scanner ([`scanner`] module)
//!
//! Marks token ends: names, numbers with radix/precision/exponent, strings,
//! escapes, comments and multi-character operators.
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Precedence climbing over the flagged text. Pulls more lines through
//! [`ParseHooks::read_line`] while a statement is incomplete and reports
//! problems as [`Diagnostic`]s.
//!
//! ### 3. Grouper ([`group`] module) and Ungrouper ([`ungroup`] module)
//!
//! [`materialize`] walks the spans and builds boxes; [`flatten`] goes back.
//!
//! ### 4. Tree view ([`cst`] module)
//!
//! A lossless Rowan tree over the same span array for editor navigation.
//!
//! ## Module Structure
//!
//! ```text
//! pmath-syntax/
//! ├── lib.rs          # This file - public API and conversions
//! ├── span_array.rs   # Flags plus the span arena
//! ├── token.rs        # Character classes and operator precedences
//! ├── charnames.rs    # \[Name] escapes
//! ├── scanner.rs      # Token boundaries
//! ├── parser/
//! │   ├── mod.rs      # Parser state, whitespace, comments, errors
//! │   └── grammar/    # sequence, primary, rest
//! ├── group.rs        # SpanArray → BoxNode
//! ├── ungroup.rs      # BoxNode → text + SpanArray
//! ├── boxes.rs        # BoxNode
//! ├── error.rs        # Diagnostics
//! ├── hooks.rs        # Collaborator traits
//! ├── location.rs     # Line/column tagging
//! ├── syntax_kind.rs  # Rowan kinds
//! └── cst.rs          # Rowan tree builder
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use pmath_syntax::parse_to_boxes;
//!
//! let (boxes, has_error) = parse_to_boxes("1+2*3");
//! assert!(!has_error);
//! assert_eq!(boxes.to_string(), r#"{"1", "+", {"2", "*", "3"}}"#);
//! ```

pub mod boxes;
pub mod charnames;
pub mod cst;
pub mod error;
pub mod group;
pub mod hooks;
pub mod location;
pub mod parser;
pub mod scanner;
pub mod span_array;
pub mod syntax_kind;
pub mod token;
pub mod ungroup;

pub use boxes::{BoxHead, BoxNode};
pub use cst::build_tree;
pub use error::{Diagnostic, Severity, SyntaxErrorKind};
pub use group::{GroupOptions, materialize};
pub use hooks::{EmbeddedBoxes, FlattenSink, GroupHooks, ParseHooks, Recorder};
pub use location::{LineColumn, Location, LocationTagger, SourceMap, tag_locations};
pub use parser::{ErrorMode, ParseOptions, ParseResult, parse};
pub use span_array::{SpanArray, SpanIndex};
pub use syntax_kind::{PmathLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use ungroup::{expand_string_boxes, flatten};

/// UTF-16 code units of `text`.
pub fn to_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Text of `units`, replacing unpaired surrogates.
pub fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Parse a complete text with default options and no collaborators.
pub fn parse_str(text: &str) -> (Vec<u16>, ParseResult) {
    let mut units = to_units(text);
    let result = parse(&mut units, &mut (), &ParseOptions::default());
    (units, result)
}

/// Parse and materialize in one go. Returns the boxes and whether a
/// critical error occurred.
pub fn parse_to_boxes(text: &str) -> (BoxNode, bool) {
    let (units, result) = parse_str(text);
    let boxes = materialize(&result.spans, &units, &GroupOptions::default(), &mut ());
    (boxes, result.has_critical_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn units_round_trip() {
        let text = "α+β";
        assert_eq!(from_units(&to_units(text)), text);
    }

    #[test]
    fn parse_to_boxes_reports_errors() {
        let (boxes, has_error) = parse_to_boxes("(1+2");
        assert!(has_error);
        assert_eq!(boxes.to_string(), r#"{"(", {"1", "+", "2"}}"#);
    }

    #[test]
    fn span_array_always_covers_the_text() {
        for input in ["", "\"abc", "(((", "1+2)", "a /* b", "f[[1]"] {
            let (units, result) = parse_str(input);
            assert_eq!(result.spans.len(), units.len(), "for {input:?}");
            if let Some(last) = units.len().checked_sub(1) {
                assert!(result.spans.is_token_end(last), "for {input:?}");
            }
        }
    }
}
