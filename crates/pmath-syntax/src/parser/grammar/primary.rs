//! # Operands
//!
//! [`primary`] consumes exactly one operand together with everything that
//! binds to it from the left: prefix operators and their argument, a whole
//! fenced group, a `name:pattern` pair, or the raw text after `<<`.
//!
//! | Token | Operand |
//! |-------|---------|
//! | name, number, string | the token, plus `:pattern` when a colon follows |
//! | `(` `[` `{` … | fence, contents, matching close |
//! | `-` `!` `++` … | prefix operator and its argument |
//! | `~` `~~` `~~~` | blank pattern with optional head and `:default` |
//! | `#` `##` | slot with optional number |
//! | `?` | optional pattern `?name:default` |
//! | `<<` `??` | raw text line |

use crate::error::SyntaxErrorKind;
use crate::parser::Parser;
use crate::parser::grammar::rest;
use crate::token::{self, TokenClass, prec};

/// Parse one operand at the cursor.
///
/// With `optional` set an absent operand is fine (after `,` or `;`).
pub fn primary(p: &mut Parser<'_>, optional: bool) {
    let start = p.pos;
    let next = p.next_token_pos();
    if next == p.pos {
        if !optional {
            p.error(SyntaxErrorKind::MissingOperand, p.pos);
        }
        return;
    }

    let (class, precedence) = p.token_class(next);
    if !p.enter() {
        if matches!(class, TokenClass::Left | TokenClass::LeftCall) {
            p.skip_to_close_fence();
        }
        return;
    }

    match class {
        TokenClass::Digit | TokenClass::String | TokenClass::Name | TokenClass::Name2 => {
            p.mark_operand_start(start);
            p.skip_to(Some(start), next, true);

            let next = p.next_token_pos();
            if p.token_class(next).0 == TokenClass::Colon {
                p.skip_to(None, next, false);
                let pattern = p.pos;
                primary(p, false);
                rest(p, pattern, prec::ALT);
            }
        }

        TokenClass::Call => {
            p.mark_operand_start(start);
            p.skip_to(Some(start), next, true);
        }

        TokenClass::Tildes => {
            p.mark_operand_start(start);
            p.skip_to(Some(start), next, true);

            let mut next = p.next_token_pos();
            let mut class = p.token_class(next).0;
            if class == TokenClass::Name {
                p.skip_to(Some(start), next, true);
                next = p.next_token_pos();
                class = p.token_class(next).0;
            }
            if class == TokenClass::Colon {
                p.skip_to(None, next, false);
                primary(p, false);
            }
        }

        TokenClass::Slot => {
            p.mark_operand_start(start);
            p.skip_to(Some(start), next, true);

            let next = p.next_token_pos();
            if p.token_class(next).0 == TokenClass::Digit {
                p.skip_to(Some(start), next, true);
            }
        }

        TokenClass::Question => {
            p.mark_operand_start(start);
            p.skip_to(Some(start), next, false);

            let mut next = p.next_token_pos();
            let mut class = p.token_class(next).0;
            if class == TokenClass::Name {
                p.skip_to(Some(start), next, true);
                next = p.next_token_pos();
                class = p.token_class(next).0;
            } else if class != TokenClass::Colon {
                p.error(SyntaxErrorKind::MissingOperand, p.pos);
            }
            if class == TokenClass::Colon {
                p.skip_to(None, next, false);
                let default = p.pos;
                primary(p, false);
                rest(p, default, prec::CIRCMUL);
            }
        }

        TokenClass::Left | TokenClass::LeftCall => {
            p.mark_operand_start(start);
            p.skip_to(None, next, false);

            let inner = p.pos;
            let mut close = p.next_token_pos();
            let mut close_class = p.token_class(close).0;
            p.fence_level += 1;
            if close_class != TokenClass::Right {
                primary(p, false);
                rest(p, inner, prec::ANY);
                close = p.next_token_pos();
                close_class = p.token_class(close).0;
            }
            p.fence_level -= 1;

            if close_class == TokenClass::Right {
                p.skip_to(Some(start), close, true);
            } else {
                p.error(SyntaxErrorKind::UnmatchedOpenFence, start);
            }
        }

        TokenClass::NaryAutoArg => {}

        TokenClass::PlusPlus => prefix(p, start, next, prec::INC),
        TokenClass::NaryOrPrefix | TokenClass::PostfixOrPrefix => {
            let precedence = p.prefix_precedence(next, precedence);
            prefix(p, start, next, precedence);
        }
        TokenClass::Prefix | TokenClass::Integral => prefix(p, start, next, precedence),

        TokenClass::PreText => {
            p.mark_operand_start(start);
            p.skip_to(None, next, false);
            text_line(p);
        }

        _ if optional => {}
        TokenClass::Right
        | TokenClass::Newline
        | TokenClass::BinaryLeft
        | TokenClass::BinaryRight
        | TokenClass::Nary
        | TokenClass::Postfix
        | TokenClass::AssignTag
        | TokenClass::Colon
        | TokenClass::CommentEnd => p.error(SyntaxErrorKind::MissingOperand, start),
        _ => p.error(SyntaxErrorKind::UnexpectedToken, start),
    }

    p.span(start);
    p.leave();
}

/// Prefix operator at `start..next` binding its argument at `precedence`.
fn prefix(p: &mut Parser<'_>, start: usize, next: usize, precedence: i32) {
    p.mark_operand_start(start);
    p.skip_to(None, next, false);
    let operand = p.pos;
    primary(p, false);
    rest(p, operand, precedence);
}

/// Raw text argument of `<<` or `??`: a file name or glob, up to the line
/// break, as one token. A quoted string or a fenced group is parsed normally.
pub fn text_line(p: &mut Parser<'_>) {
    let start = p.pos;
    if p.is_char(start, '"') {
        primary(p, false);
        return;
    }
    let next = p.next_token_pos();
    if next > start && matches!(p.token_class(next).0, TokenClass::Left | TokenClass::LeftCall) {
        primary(p, false);
        return;
    }

    while let Some(unit) = p.unit(p.pos)
        && unit != '\n' as u16
        && (is_path_char(unit)
            || matches!(
                token::classify_char(unit).0,
                TokenClass::Name | TokenClass::Name2 | TokenClass::Digit
            ))
    {
        p.pos += 1;
    }

    if p.pos == start {
        p.error(SyntaxErrorKind::MissingOperand, start);
        return;
    }

    for pos in start..p.pos {
        p.clear_token_end(pos);
    }
    p.set_token_end(p.pos - 1);
    p.mark_operand_start(start);
    p.span(start);
    p.skip_space(Some(start), true);
}

fn is_path_char(unit: u16) -> bool {
    char::from_u32(u32::from(unit))
        .is_some_and(|ch| matches!(ch, '.' | '/' | '\\' | '~' | '*' | '?' | '!' | ':' | '-' | '+'))
}
