//! # Operator Chains
//!
//! [`rest`] extends an operand already parsed at `lhs` with operators of at
//! least a minimum precedence.
//!
//! ## Flattening
//!
//! Consecutive operators of one precedence share a span: `a+b-c` is one
//! group, not `(a+b)-c`. Outside a handful of precedence levels (sums,
//! products, relations, `&&`, `||`, sequencing) this only applies when the
//! operators are spelled the same, so `a->b:>c` nests.
//!
//! ## Juxtaposition
//!
//! An operand directly after another one is an implicit product. After a
//! line break inside an open fence it separates statements instead, like `;`.
//!
//! ## Calls
//!
//! `f(x)` and `f[x]` are calls only without whitespace before the fence;
//! `f (x)` is a product. `[[`, `]]` become single tokens in call position.

use crate::error::{Diagnostic, SyntaxErrorKind};
use crate::parser::Parser;
use crate::parser::grammar::{primary, sequence};
use crate::token::{TokenClass, maybe_first, maybe_rest, prec};

/// Precedence levels whose mixed operators still flatten into one span.
const FLATTENED: [i32; 6] = [prec::EVAL, prec::OR, prec::AND, prec::REL, prec::ADD, prec::MUL];

/// The operator most recently consumed at this level.
#[derive(Debug, Clone, Copy)]
struct LastOp {
    start: usize,
    end: usize,
    prec: i32,
}

/// Parse operators and right operands following the operand at `lhs`.
pub fn rest(p: &mut Parser<'_>, lhs: usize, min_prec: i32) {
    if !p.enter() {
        return;
    }

    let mut last = LastOp {
        start: lhs,
        end: lhs,
        prec: -1,
    };
    let mut next = p.next_token_pos();

    while next != p.pos && !p.stack_error {
        let (class, cur_prec) = p.token_class(next);
        match class {
            TokenClass::Postfix | TokenClass::PostfixOrPrefix if cur_prec >= min_prec => {
                last = postfix(p, lhs, next, cur_prec);
            }

            TokenClass::PlusPlus if plusplus_is_infix(p, next) => {
                if cur_prec < min_prec {
                    break;
                }
                continue_nary(p, lhs, &last, cur_prec, next);
                last = binary(p, next, cur_prec, false);
            }
            TokenClass::PlusPlus if prec::INC >= min_prec => {
                last = postfix(p, lhs, next, prec::INC);
            }

            TokenClass::Call if cur_prec >= min_prec => {
                p.span(lhs);
                last = LastOp {
                    start: p.pos,
                    end: next,
                    prec: cur_prec,
                };
                p.skip_to(Some(lhs), next, false);
                primary(p, false);
            }

            TokenClass::LeftCall if p.last_space_start == p.pos => {
                if prec::CALL < min_prec {
                    break;
                }
                last = call(p, lhs, last, next);
            }

            TokenClass::AssignTag => {
                if prec::ASS >= min_prec {
                    tagged_assignment(p, lhs, next);
                }
                break;
            }

            TokenClass::NaryAutoArg if cur_prec >= min_prec => {
                let saved = (p.last_was_newline, p.last_space_start, p.pos);
                p.skip_to(None, next, true);
                let after = p.next_token_pos();
                if !maybe_first(p.token_class(after).0) {
                    // Trailing separator: `f(a,)`.
                    p.span(lhs);
                    last = LastOp {
                        start: p.pos,
                        end: after,
                        prec: cur_prec,
                    };
                    next = after;
                    continue;
                }
                (p.last_was_newline, p.last_space_start, p.pos) = saved;
                continue_nary(p, lhs, &last, cur_prec, next);
                last = binary(p, next, cur_prec, true);
            }

            TokenClass::Question | TokenClass::BinaryLeft if cur_prec >= min_prec => {
                p.span(lhs);
                last = binary(p, next, cur_prec, false);
            }

            TokenClass::BinaryRight | TokenClass::Nary | TokenClass::NaryOrPrefix
                if cur_prec >= min_prec =>
            {
                continue_nary(p, lhs, &last, cur_prec, next);
                last = binary(p, next, cur_prec, false);
            }

            TokenClass::Tildes
            | TokenClass::Digit
            | TokenClass::String
            | TokenClass::Name
            | TokenClass::Name2
            | TokenClass::Prefix
            | TokenClass::PreText
            | TokenClass::Left
            | TokenClass::LeftCall
            | TokenClass::Slot
            | TokenClass::Integral => {
                let separates = p.last_was_newline && p.fence_level > 0;
                let cur_prec = if separates { prec::EVAL } else { prec::MUL };
                if cur_prec < min_prec {
                    break;
                }
                if separates {
                    p.handle(Diagnostic::informational(SyntaxErrorKind::NewlineAsSeparator, p.pos));
                }
                let here = p.pos;
                continue_nary(p, lhs, &last, cur_prec, here);
                last = binary(p, here, cur_prec, false);
            }

            _ => break,
        }
        next = p.next_token_pos();
    }

    p.span(lhs);
    p.leave();
}

/// Close the span at `lhs` unless the operator at the cursor continues the
/// chain of `last`.
fn continue_nary(p: &mut Parser<'_>, lhs: usize, last: &LastOp, cur_prec: i32, next: usize) {
    let continues = last.prec == cur_prec
        && (FLATTENED.contains(&cur_prec) || p.same_token(last.start, last.end, next));
    if !continues {
        p.span(lhs);
    }
}

fn postfix(p: &mut Parser<'_>, lhs: usize, next: usize, cur_prec: i32) -> LastOp {
    p.span(lhs);
    let last = LastOp {
        start: p.pos,
        end: next,
        prec: cur_prec,
    };
    p.skip_to(Some(lhs), next, true);
    last
}

/// Consume the operator `pos..next` and its right operand, including any
/// tighter-binding operators after it.
fn binary(p: &mut Parser<'_>, next: usize, cur_prec: i32, auto_arg: bool) -> LastOp {
    let last = LastOp {
        start: p.pos,
        end: next,
        prec: cur_prec,
    };
    p.skip_to(None, next, auto_arg);

    let rhs = p.pos;
    primary(p, auto_arg);

    let mut next = p.next_token_pos();
    let mut seen = p.pos;
    while seen != next && !p.stack_error {
        seen = next;
        let (class, mut next_prec) = p.token_class(next);
        if class == TokenClass::Newline {
            break;
        }

        if class == TokenClass::BinaryRight {
            if next_prec < cur_prec {
                break;
            }
            rest(p, rhs, next_prec);
            next = p.next_token_pos();
            continue;
        }

        if class == TokenClass::PlusPlus && !plusplus_is_infix(p, next) {
            next_prec = prec::INC;
        }

        let deeper = if maybe_first(class) {
            let adjacent = class != TokenClass::LeftCall || p.last_space_start == p.pos;
            if adjacent && maybe_rest(class) {
                next_prec
            } else if p.last_was_newline && p.fence_level > 0 {
                prec::EVAL
            } else {
                prec::MUL
            }
        } else if maybe_rest(class) {
            next_prec
        } else {
            break;
        };
        if deeper <= cur_prec {
            break;
        }
        rest(p, rhs, deeper);
        next = p.next_token_pos();
    }

    last
}

/// `f(…)`, `f[…]` or `f[[…]]` with the fence directly after the callee.
fn call(p: &mut Parser<'_>, lhs: usize, last: LastOp, next: usize) -> LastOp {
    let after_dot = last.end == last.start + 1 && p.is_char(last.start, '.');
    let continues =
        last.prec == prec::CALL && (after_dot || p.same_token(last.start, last.end, next));
    if !continues {
        p.span(lhs);
    }

    let open = p.pos;
    let mut open_end = next;
    let double = next == open + 1 && p.is_char(open, '[') && p.is_char(next, '[');
    if double {
        p.clear_token_end(open);
        open_end += 1;
    }

    p.fence_level += 1;
    p.skip_to(None, open_end, false);
    let first = p.next_token_pos();
    if p.token_class(first).0 != TokenClass::Right {
        sequence(p);
    }
    p.fence_level -= 1;

    let mut close = p.next_token_pos();
    let (close_class, close_prec) = p.token_class(close);
    if close_class == TokenClass::Right {
        if double {
            if close == p.pos + 1 && p.is_char(p.pos, ']') && p.is_char(close, ']') {
                p.clear_token_end(p.pos);
                close += 1;
            } else {
                p.error(SyntaxErrorKind::UnmatchedOpenFence, open);
            }
        }
        p.skip_to(Some(lhs), close, true);
    } else {
        p.error(SyntaxErrorKind::UnmatchedOpenFence, open);
    }

    p.span(lhs);
    LastOp {
        start: open,
        end: open_end,
        prec: close_prec,
    }
}

/// `lhs /: pattern := value`.
fn tagged_assignment(p: &mut Parser<'_>, lhs: usize, next: usize) {
    p.span(lhs);
    p.skip_to(None, next, false);
    let pattern = p.pos;
    primary(p, false);
    rest(p, pattern, prec::ASS + 1);

    let assign = p.next_token_pos();
    if p.token_class(assign).1 == prec::ASS {
        p.skip_to(None, assign, false);
        let value = p.pos;
        primary(p, false);
        rest(p, value, prec::ASS);
    } else {
        p.error(SyntaxErrorKind::UnexpectedToken, p.pos);
    }
    p.span(lhs);
}

/// Is the `++` at the cursor followed by an operand (string join) rather
/// than ending one (increment)?
pub fn plusplus_is_infix(p: &mut Parser<'_>, next: usize) -> bool {
    let saved = (p.last_was_newline, p.last_space_start, p.pos);
    p.skip_to(None, next, true);
    let after = p.next_token_pos();
    let class = p.token_class(after).0;
    let infix = after > p.pos && class != TokenClass::Newline && maybe_first(class);
    (p.last_was_newline, p.last_space_start, p.pos) = saved;
    infix
}
