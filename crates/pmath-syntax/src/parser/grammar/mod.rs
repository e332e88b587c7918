//! # Grammar Rules
//!
//! Each function takes a `&mut Parser`, advances its cursor over one
//! construct and registers a span for every sub-expression it reduces. None
//! of them return anything: the span array is the output.
//!
//! ## Module Structure
//!
//! - [`primary`] - operands: names, numbers, strings, fences, prefix
//!   operators, slots, patterns and raw text lines
//! - [`rest`] - operator chains to the right of an operand, driven by
//!   precedence climbing
//!
//! ## Precedence Climbing
//!
//! [`rest::rest`] is called with the span start of the left operand and a
//! minimum precedence. It keeps consuming operators at or above that level;
//! for each right operand it recurses with a higher level when the next
//! operator binds tighter.
//!
//! ```text
//! a + b * c ^ d
//! └─────────────  rest(a, ANY)
//!     └─────────  rest(b, MUL)    → span b..d
//!         └─────  rest(c, POW)    → span c..d
//! ```
//!
//! ## Error Recovery
//!
//! Grammar functions never fail. A missing operand or unmatched fence is
//! reported through the parser and parsing continues with whatever follows,
//! so every input yields a complete span array.

mod primary;
mod rest;

pub(super) use primary::primary;
pub(super) use rest::rest;

use crate::parser::Parser;
use crate::token::{TokenClass, prec};

/// Parse operands and operator chains until a closing fence, comment end or
/// statement-ending line break.
pub(super) fn sequence(p: &mut Parser<'_>) {
    if !p.enter() {
        return;
    }

    let start = p.pos;
    let mut next = p.next_token_pos();
    while next != p.pos && !p.stack_error {
        if matches!(
            p.token_class(next).0,
            TokenClass::Right | TokenClass::CommentEnd | TokenClass::Space | TokenClass::Newline
        ) {
            break;
        }

        let before = p.pos;
        primary(p, false);
        rest(p, start, prec::ANY);

        if p.pos == before {
            p.skip_to(None, next, true);
        }
        next = p.next_token_pos();
    }

    p.span(start);
    p.leave();
}
