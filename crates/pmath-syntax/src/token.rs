//! # Token Classification
//!
//! Once the scanner has marked where tokens end, the parser needs to know
//! what each token *is*: an operand, a fence, an infix operator, and how
//! tightly it binds. [`analyse`] answers both questions for a slice of code
//! units, returning a [`TokenClass`] and a precedence from [`prec`].
//!
//! Single characters are looked up in per-block tables covering ASCII and
//! Latin-1, general punctuation and invisible operators, the mathematical
//! operator blocks, and the supplemental arrows and operators. Multi-unit
//! operators (`:=`, `//@`, `|->`, ...) are matched by their leading unit.
//!
//! Characters outside every table are identifier letters, except the
//! private-use sentinels in [`chars`] which are single-character names.

use crate::charnames;

/// Special code units with a fixed meaning inside box text.
pub mod chars {
    /// Stands in for one embedded sub-box.
    pub const BOX: u16 = 0xFDD0;
    /// Opens inline box code inside a string.
    pub const LEFT_BOX: u16 = 0xFFF9;
    /// Closes inline box code inside a string.
    pub const RIGHT_BOX: u16 = 0xFFFB;
    pub const PLACEHOLDER: u16 = 0xFFFD;
    pub const SELECTION_PLACEHOLDER: u16 = 0xF527;
    /// Replaces a literal box sentinel found in flattened text.
    pub const NONCHARACTER: u16 = 0xFFFF;
}

/// Operator precedence levels, loosest first.
pub mod prec {
    pub const ANY: i32 = 0;
    pub const SEQ: i32 = 10;
    pub const EVAL: i32 = 20;
    pub const ASS: i32 = 30;
    pub const MODY: i32 = 40;
    pub const LAZY: i32 = 50;
    pub const FUNC: i32 = 60;
    pub const REPL: i32 = 80;
    pub const RULE: i32 = 90;
    pub const MAP: i32 = 100;
    pub const STR: i32 = 110;
    pub const COND: i32 = 120;
    pub const ALT: i32 = 130;
    pub const OR: i32 = 150;
    pub const XOR: i32 = 155;
    pub const AND: i32 = 160;
    pub const ARROW: i32 = 170;
    pub const REL: i32 = 180;
    pub const UNION: i32 = 190;
    pub const ISECT: i32 = 200;
    pub const RANGE: i32 = 210;
    pub const ADD: i32 = 220;
    pub const CIRCADD: i32 = 230;
    pub const PLUSMINUS: i32 = 240;
    pub const CIRCMUL: i32 = 250;
    pub const MUL: i32 = 260;
    pub const DIV: i32 = 270;
    pub const MIDDOT: i32 = 280;
    pub const CROSS: i32 = 290;
    pub const MUL2: i32 = 300;
    pub const POW: i32 = 310;
    pub const FAC: i32 = 320;
    pub const APL: i32 = 330;
    pub const REPEAT: i32 = 340;
    pub const TEST: i32 = 350;
    pub const INC: i32 = 360;
    pub const CALL: i32 = 400;
    pub const INVISADD: i32 = 410;
    pub const DIFF: i32 = 450;
    pub const PRIM: i32 = 1000;
}

/// Syntactic role of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Not a valid token on its own.
    None,
    Space,
    Digit,
    String,
    Name,
    /// Single-character identifier that never continues a name.
    Name2,
    BinaryLeft,
    BinaryRight,
    Nary,
    /// N-ary operator whose operands may be empty (`,` `;` `..`).
    NaryAutoArg,
    NaryOrPrefix,
    PostfixOrPrefix,
    Prefix,
    Postfix,
    Call,
    /// Open fence that may also start a call (`(` `[`).
    LeftCall,
    Left,
    Right,
    /// Operator followed by a raw text argument (`<<` `??`).
    PreText,
    AssignTag,
    PlusPlus,
    Colon,
    Tildes,
    Slot,
    Question,
    Integral,
    CommentEnd,
    Newline,
}

/// May this token start a sub-expression?
pub fn maybe_first(class: TokenClass) -> bool {
    use TokenClass::*;
    matches!(
        class,
        None | Space
            | Name
            | Name2
            | Digit
            | String
            | Prefix
            | NaryAutoArg
            | NaryOrPrefix
            | PostfixOrPrefix
            | Left
            | LeftCall
            | PreText
            | PlusPlus
            | Tildes
            | Slot
            | Question
            | Integral
            | Newline
    )
}

/// May this token continue a sub-expression to its left?
pub fn maybe_rest(class: TokenClass) -> bool {
    use TokenClass::*;
    !matches!(
        class,
        None | Space
            | Name
            | Name2
            | Digit
            | String
            | Prefix
            | PreText
            | Left
            | Right
            | Tildes
            | Slot
            | Integral
    )
}

#[derive(Clone, Copy)]
struct CharInfo {
    prec: i16,
    class: TokenClass,
}

const fn ci(prec: i32, class: TokenClass) -> CharInfo {
    CharInfo {
        prec: prec as i16,
        class,
    }
}

use TokenClass as T;

const ERR: CharInfo = ci(prec::ANY, T::None);
const SPC: CharInfo = ci(prec::ANY, T::Space);
const FAC: CharInfo = ci(prec::FAC, T::PostfixOrPrefix);
const STR: CharInfo = ci(prec::PRIM, T::String);
const ARG: CharInfo = ci(prec::PRIM, T::Slot);
const ID: CharInfo = ci(prec::PRIM, T::Name);
const ID2: CharInfo = ci(prec::PRIM, T::Name2);
const FUN: CharInfo = ci(prec::FUNC, T::Postfix);
const DIF: CharInfo = ci(prec::DIFF, T::Postfix);
const LCL: CharInfo = ci(prec::CALL, T::LeftCall);
const LEF: CharInfo = ci(prec::ANY, T::Left);
const RI1: CharInfo = ci(-1, T::Right);
const RI2: CharInfo = ci(-2, T::Right);
const MUL: CharInfo = ci(prec::MUL, T::Nary);
const ADD: CharInfo = ci(prec::ADD, T::NaryOrPrefix);
const SEQ: CharInfo = ci(prec::SEQ, T::NaryAutoArg);
const DOT: CharInfo = ci(prec::CALL, T::Call);
const DIV: CharInfo = ci(prec::DIV, T::Nary);
const NUM: CharInfo = ci(prec::PRIM, T::Digit);
const COL: CharInfo = ci(prec::MODY, T::Colon);
const EVA: CharInfo = ci(prec::EVAL, T::NaryAutoArg);
const NWL: CharInfo = ci(prec::EVAL, T::Newline);
const REL: CharInfo = ci(prec::REL, T::Nary);
const QUE: CharInfo = ci(prec::TEST, T::Question);
const APL: CharInfo = ci(prec::APL, T::BinaryRight);
const ALT: CharInfo = ci(prec::ALT, T::Nary);
const POW: CharInfo = ci(prec::POW, T::BinaryRight);
const TIL: CharInfo = ci(prec::CALL, T::Tildes);
const NOT: CharInfo = ci(prec::REL, T::Prefix);
const PLM: CharInfo = ci(prec::PLUSMINUS, T::BinaryLeft);
const MID: CharInfo = ci(prec::MIDDOT, T::Nary);
const ARR: CharInfo = ci(prec::ARROW, T::Nary);
const RAR: CharInfo = ci(prec::ARROW, T::BinaryRight);
const ALL: CharInfo = ci(prec::REL, T::Prefix);
const PAR: CharInfo = ci(prec::POW, T::Prefix);
const BIG: CharInfo = ci(prec::CIRCADD, T::Prefix);
const MU2: CharInfo = ci(prec::MUL2, T::Nary);
const AND: CharInfo = ci(prec::AND, T::Nary);
const OR_: CharInfo = ci(prec::OR, T::Nary);
const XOR: CharInfo = ci(prec::XOR, T::Nary);
const ISC: CharInfo = ci(prec::ISECT, T::Nary);
const UNI: CharInfo = ci(prec::UNION, T::Nary);
const INT: CharInfo = ci(prec::MUL, T::Integral);
const AD3: CharInfo = ci(prec::CIRCADD, T::Nary);
const MU3: CharInfo = ci(prec::CIRCMUL, T::Nary);
const RUL: CharInfo = ci(prec::RULE, T::BinaryRight);
const ASS: CharInfo = ci(prec::ASS, T::BinaryRight);
const CRX: CharInfo = ci(prec::CROSS, T::Nary);
const DID: CharInfo = ci(prec::DIV, T::Prefix);
const IAD: CharInfo = ci(prec::INVISADD, T::NaryOrPrefix);
const PRE: CharInfo = ci(prec::PRIM, T::Prefix);

#[rustfmt::skip]
static LATIN1: [CharInfo; 256] = [
    // 0x00
    ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, SPC, NWL, SPC, SPC, SPC, ERR, ERR,
    ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR,
    // 0x20  ' '  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
    SPC, FAC, STR, ARG, ID,  ERR, FUN, DIF, LCL, RI1, MUL, ADD, SEQ, ADD, DOT, DIV,
    // 0x30
    NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM, COL, EVA, REL, REL, REL, QUE,
    // 0x40  @
    APL, ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
    // 0x50                                               [    \    ]    ^    _
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  LCL, STR, RI2, POW, ID,
    // 0x60  `
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
    // 0x70                                               {    |    }    ~
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  LEF, ALT, RI2, TIL, ERR,
    // 0x80
    ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR,
    ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR, ERR,
    // 0xA0
    SPC, ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID2, NOT, ID,  ID,  ID,
    ID2, PLM, DIF, DIF, ID,  ID,  ID,  MID, ID,  DIF, ID,  ID2, ID2, ID2, ID2, ID,
    // 0xC0
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  MUL, ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
    ID,  ID,  ID,  ID,  ID,  ID,  ID,  DIV, ID,  ID,  ID,  ID,  ID,  ID,  ID,  ID,
];

#[rustfmt::skip]
static GENERAL_PUNCTUATION: [CharInfo; 112] = [
    // 0x2000
    SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC, SPC,
    ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2,
    ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2,
    ID2, ID2, ID,  ID,  ID,  ID,  ID,  ID,  ID2, LEF, RI1, ID2, ID2, ID2, ID2, ID2,
    ID2, ID2, ID2, ID2, DIV, LEF, RI1, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2,
    ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID,  ID2, ID2, ID2, ID2, ID2, ID2, ID2, ID2,
    // 0x2060  function application, invisible times/separator/plus
    ID,  APL, MUL, SEQ, IAD, ERR, ERR, ERR, ERR, ERR, ID,  ID,  ID,  ID,  ID,  ID,
];

#[rustfmt::skip]
static MATH_OPERATORS: [CharInfo; 272] = [
    // 0x2200
    ALL, ID2, PAR, ALL, ALL, ID2, PAR, REL, REL, REL, REL, REL, REL, REL, REL, BIG,
    BIG, BIG, ADD, PLM, PLM, DIV, DIV, MU2, MU2, MU2, PAR, PAR, PAR, REL, ID,  ID,
    ID,  ID,  ID,  REL, REL, REL, REL, AND, OR_, ISC, UNI, INT, INT, INT, INT, INT,
    INT, INT, INT, INT, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, ASS, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, BIG, BIG, BIG, REL,
    REL, REL, REL, REL, REL, AD3, AD3, MU3, MU3, MU3, MU3, MU3, REL, AD3, AD3, AD3,
    MU3, MU3, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, XOR, AND, OR_, ID,  ID,
    AND, OR_, ISC, UNI, MU2, MU2, MU2, MU2, REL, REL, REL, REL, REL, REL, OR_, AND,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    // 0x2300  ceiling and floor fences
    ID,  REL, ID,  REL, REL, REL, REL, REL, LEF, RI1, LEF, RI1, ID,  ID,  ID,  ID,
];

#[rustfmt::skip]
static SUPPLEMENTAL_MATH: [CharInfo; 64] = [
    // 0x27C0
    ID2, ID2, REL, REL, REL, LEF, RI1, OR_, REL, REL, REL, ERR, DIV, ERR, ERR, ERR,
    REL, AND, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL, REL,
    REL, REL, REL, REL, REL, REL, LCL, RI1, LEF, RI1, LEF, RI1, LEF, RI1, LEF, RI1,
    ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR, ARR,
];

#[rustfmt::skip]
static N_ARY_LOGIC: [CharInfo; 36] = [
    // 0x2A40
    ISC, UNI, UNI, ISC, ISC, UNI, UNI, UNI, UNI, UNI, UNI, ISC, UNI, ISC, ISC, UNI,
    UNI, AND, OR_, AND, OR_, AND, OR_, OR_, AND, AND, AND, OR_, AND, OR_, AND, AND,
    AND, OR_, OR_, OR_,
];

fn char_info(ch: u16) -> CharInfo {
    match ch {
        0x0000..=0x00FF => LATIN1[ch as usize],
        0x2000..=0x206F => GENERAL_PUNCTUATION[(ch - 0x2000) as usize],
        0x2145 | 0x2146 => DID,
        0x2150..=0x2152 => ERR,
        0x2153..=0x215F => ID2,
        0x2192 => RUL,
        0x21A6 => RAR,
        0x2190..=0x21FF => ARR,
        0x2100..=0x218F => ID,
        0x2200..=0x230F => MATH_OPERATORS[(ch - 0x2200) as usize],
        0x27C0..=0x27FF => SUPPLEMENTAL_MATH[(ch - 0x27C0) as usize],
        0x2900..=0x2980 => ARR,
        0x2981 | 0x2982 | 0x2999 => REL,
        0x2983..=0x2998 if ch % 2 == 1 => LEF,
        0x2983..=0x2998 => RI1,
        0x299A..=0x29B4 => ID2,
        0x29D8 | 0x29DA | 0x29FC => LEF,
        0x29D9 | 0x29DB | 0x29FD => RI1,
        0x29F4 => RUL,
        0x29B5..=0x29FF => REL,
        0x2A00 | 0x2A02 => MU3,
        0x2A01 => AD3,
        0x2A03 | 0x2A04 | 0x2A06 => UNI,
        0x2A05 => ISC,
        0x2A07 => AND,
        0x2A08 => OR_,
        0x2A09 | 0x2A0A | 0x2A3F => BIG,
        0x2A0B..=0x2A1C => INT,
        0x2A1F | 0x2A3E => ID,
        0x2A28 | 0x2A2A => LEF,
        0x2A29 | 0x2A2B => RI1,
        0x2A2F => CRX,
        0x2A30..=0x2A3D => MU2,
        0x2A40..=0x2A63 => N_ARY_LOGIC[(ch - 0x2A40) as usize],
        0x2A74 => ASS,
        0x2A1D..=0x2AFF => REL,
        0xF361 => PRE,
        0xF362 | 0xF603 | 0xF605 => LEF,
        0xF363 | 0xF604 | 0xF606 => RI1,
        chars::BOX
        | chars::LEFT_BOX
        | chars::RIGHT_BOX
        | chars::PLACEHOLDER
        | chars::SELECTION_PLACEHOLDER => ID2,
        _ => ID,
    }
}

/// Class and precedence of a single code unit.
pub fn classify_char(ch: u16) -> (TokenClass, i32) {
    let info = char_info(ch);
    (info.class, info.prec as i32)
}

pub fn is_space(ch: u16) -> bool {
    char_info(ch).class == TokenClass::Space
}

pub fn is_name_char(ch: u16) -> bool {
    char_info(ch).class == TokenClass::Name
}

pub fn is_digit(ch: u16) -> bool {
    (b'0' as u16..=b'9' as u16).contains(&ch)
}

pub fn is_base36_digit(ch: u16) -> bool {
    is_digit(ch)
        || (b'a' as u16..=b'z' as u16).contains(&ch)
        || (b'A' as u16..=b'Z' as u16).contains(&ch)
}

pub fn is_hex_digit(ch: u16) -> bool {
    is_digit(ch)
        || (b'a' as u16..=b'f' as u16).contains(&ch)
        || (b'A' as u16..=b'F' as u16).contains(&ch)
}

fn at(units: &[u16], index: usize) -> u16 {
    units.get(index).copied().unwrap_or(0)
}

/// Classify a whole token.
#[must_use]
pub fn analyse(units: &[u16]) -> (TokenClass, i32) {
    let Some(&first) = units.first() else {
        return (TokenClass::None, prec::ANY);
    };
    if units.len() == 1 {
        return classify_char(first);
    }

    let second = units[1];
    let c = |ch: char| ch as u16;
    match char::from_u32(first as u32).unwrap_or('\0') {
        '+' if second == c('+') => return (T::PlusPlus, prec::STR),
        '+' if second == c('=') => return (T::BinaryRight, prec::MODY),
        '+' => return (T::None, prec::ANY),
        '-' if second == c('-') => return (T::PostfixOrPrefix, prec::INC),
        '-' if second == c('=') => return (T::BinaryRight, prec::MODY),
        '-' if second == c('>') => return (T::BinaryRight, prec::RULE),
        '-' => return (T::None, prec::ANY),
        ':' if second == c('=') => return (T::BinaryRight, prec::ASS),
        ':' if second == c('>') => return (T::BinaryRight, prec::RULE),
        ':' if second == c(':') && units.len() == 2 => return (T::BinaryLeft, prec::CALL),
        ':' if second == c(':') => return (T::BinaryRight, prec::ASS),
        ':' => return (T::None, prec::ANY),
        '<' if second == c('<') => return (T::PreText, prec::PRIM),
        '<' if second == c('=') => return (T::Nary, prec::REL),
        '<' => return (T::None, prec::ANY),
        '>' if second == c('=') => return (T::Nary, prec::REL),
        '>' => return (T::None, prec::ANY),
        '!' if second == c('=') => return (T::Nary, prec::REL),
        '!' if second == c('!') => return (T::Postfix, prec::FAC),
        '!' => return (T::None, prec::ANY),
        '=' if second == c('>') => return (T::Nary, prec::ARROW),
        '=' if second == c('!') || second == c('=') => return (T::Nary, prec::REL),
        '=' => return (T::None, prec::ANY),
        '*' if second == c('=') => return (T::BinaryRight, prec::MODY),
        '*' if second == c('*') => return (T::Postfix, prec::REPEAT),
        '*' => return (T::CommentEnd, prec::ANY),
        '/' => return analyse_slash(units),
        '.' => return (T::NaryAutoArg, prec::RANGE),
        '|' if units.len() == 3 && second == c('-') && units[2] == c('>') => {
            return (T::BinaryRight, prec::ARROW);
        }
        '|' if units.len() == 2 && second == c('>') => return (T::BinaryLeft, prec::ARROW),
        '|' => return (T::Nary, prec::OR),
        '&' => return (T::Nary, prec::AND),
        '@' => return (T::BinaryRight, prec::APL),
        '?' => return (T::PreText, prec::ANY),
        '\\' => return analyse_escaped(units),
        _ => {}
    }

    classify_char(first)
}

fn analyse_slash(units: &[u16]) -> (TokenClass, i32) {
    let c = |ch: char| ch as u16;
    match at(units, 1) {
        s if s == c(':') => (T::AssignTag, prec::ASS),
        s if s == c('=') => (T::BinaryRight, prec::MODY),
        s if s == c('/') => match (units.len(), at(units, 2)) {
            (2, _) => (T::BinaryLeft, prec::LAZY),
            (_, t) if t == c('.') => (T::BinaryRight, prec::REPL),
            (_, t) if t == c('@') => (T::BinaryRight, prec::MAP),
            (_, t) if t == c('=') => (T::BinaryRight, prec::MODY),
            _ => (T::None, prec::ANY),
        },
        s if s == c('.') => (T::BinaryRight, prec::REPL),
        s if s == c('@') => (T::BinaryRight, prec::MAP),
        s if s == c('\\') => (T::Name2, prec::PRIM),
        s if s == c('?') => (T::BinaryLeft, prec::COND),
        _ => (T::None, prec::ANY),
    }
}

/// Tokens starting with a backslash outside strings.
fn analyse_escaped(units: &[u16]) -> (TokenClass, i32) {
    if units[1..].iter().all(|&u| is_space(u) || u == '\n' as u16) {
        return (T::Space, prec::ANY);
    }
    match charnames::decode_escape(units) {
        Some((ch, used)) => {
            let decoded = u16::try_from(ch).map(classify_char).unwrap_or((T::Name, prec::PRIM));
            if used == units.len() {
                decoded
            } else if decoded.0 == T::Name {
                // escaped letter followed by more name characters
                (T::Name, prec::PRIM)
            } else {
                classify_char(units[0])
            }
        }
        None => classify_char(units[0]),
    }
}

/// Binding strength of a token used as a prefix operator.
pub fn prefix_precedence(units: &[u16], default: i32) -> i32 {
    let c = |ch: char| ch as u16;
    match units {
        [u] if *u == c('!') => return prec::REL,
        [a, b] if *a == c('+') && *b == c('+') => return prec::INC,
        [a, b] if *a == c('-') && *b == c('-') => return prec::INC,
        [a, _] if *a == c('.') => return prec::ADD,
        _ => {}
    }
    match default {
        prec::ADD | prec::PLUSMINUS => prec::DIV + 1,
        _ => default + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[rstest]
    #[case(" ", T::Space, prec::ANY)]
    #[case("\n", T::Newline, prec::EVAL)]
    #[case("x", T::Name, prec::PRIM)]
    #[case("7", T::Digit, prec::PRIM)]
    #[case("\"", T::String, prec::PRIM)]
    #[case("(", T::LeftCall, prec::CALL)]
    #[case(")", T::Right, -1)]
    #[case("}", T::Right, -2)]
    #[case("{", T::Left, prec::ANY)]
    #[case("+", T::NaryOrPrefix, prec::ADD)]
    #[case("*", T::Nary, prec::MUL)]
    #[case(",", T::NaryAutoArg, prec::SEQ)]
    #[case(";", T::NaryAutoArg, prec::EVAL)]
    #[case("^", T::BinaryRight, prec::POW)]
    #[case("!", T::PostfixOrPrefix, prec::FAC)]
    #[case("&", T::Postfix, prec::FUNC)]
    #[case("'", T::Postfix, prec::DIFF)]
    #[case("#", T::Slot, prec::PRIM)]
    #[case("~", T::Tildes, prec::CALL)]
    #[case("?", T::Question, prec::TEST)]
    #[case(":", T::Colon, prec::MODY)]
    #[case(".", T::Call, prec::CALL)]
    #[case("%", T::None, prec::ANY)]
    #[case("¬", T::Prefix, prec::REL)]
    #[case("±", T::BinaryLeft, prec::PLUSMINUS)]
    #[case("×", T::Nary, prec::MUL)]
    #[case("→", T::BinaryRight, prec::RULE)]
    #[case("↦", T::BinaryRight, prec::ARROW)]
    #[case("⇒", T::Nary, prec::ARROW)]
    #[case("∀", T::Prefix, prec::REL)]
    #[case("∫", T::Integral, prec::MUL)]
    #[case("∧", T::Nary, prec::AND)]
    #[case("⌈", T::Left, prec::ANY)]
    #[case("⌉", T::Right, -1)]
    #[case("\u{2062}", T::Nary, prec::MUL)]
    #[case("\u{2064}", T::NaryOrPrefix, prec::INVISADD)]
    #[case("α", T::Name, prec::PRIM)]
    fn single_characters(#[case] text: &str, #[case] class: TokenClass, #[case] p: i32) {
        assert_eq!(analyse(&units(text)), (class, p));
    }

    #[rstest]
    #[case("++", T::PlusPlus, prec::STR)]
    #[case("+=", T::BinaryRight, prec::MODY)]
    #[case("--", T::PostfixOrPrefix, prec::INC)]
    #[case("->", T::BinaryRight, prec::RULE)]
    #[case(":>", T::BinaryRight, prec::RULE)]
    #[case(":=", T::BinaryRight, prec::ASS)]
    #[case("::=", T::BinaryRight, prec::ASS)]
    #[case("::", T::BinaryLeft, prec::CALL)]
    #[case("<<", T::PreText, prec::PRIM)]
    #[case("??", T::PreText, prec::ANY)]
    #[case("<=", T::Nary, prec::REL)]
    #[case("===", T::Nary, prec::REL)]
    #[case("=!=", T::Nary, prec::REL)]
    #[case("=>", T::Nary, prec::ARROW)]
    #[case("!!", T::Postfix, prec::FAC)]
    #[case("**", T::Postfix, prec::REPEAT)]
    #[case("*/", T::CommentEnd, prec::ANY)]
    #[case("/:", T::AssignTag, prec::ASS)]
    #[case("//", T::BinaryLeft, prec::LAZY)]
    #[case("//.", T::BinaryRight, prec::REPL)]
    #[case("//@", T::BinaryRight, prec::MAP)]
    #[case("//=", T::BinaryRight, prec::MODY)]
    #[case("/.", T::BinaryRight, prec::REPL)]
    #[case("/@", T::BinaryRight, prec::MAP)]
    #[case("/?", T::BinaryLeft, prec::COND)]
    #[case("/\\/", T::Name2, prec::PRIM)]
    #[case("..", T::NaryAutoArg, prec::RANGE)]
    #[case("|->", T::BinaryRight, prec::ARROW)]
    #[case("|>", T::BinaryLeft, prec::ARROW)]
    #[case("||", T::Nary, prec::OR)]
    #[case("&&", T::Nary, prec::AND)]
    #[case("@@", T::BinaryRight, prec::APL)]
    #[case("abc", T::Name, prec::PRIM)]
    #[case("123", T::Digit, prec::PRIM)]
    #[case("\"abc\"", T::String, prec::PRIM)]
    #[case("##", T::Slot, prec::PRIM)]
    #[case("~~", T::Tildes, prec::CALL)]
    #[case("\\[Alpha]", T::Name, prec::PRIM)]
    #[case("\\[Alpha]bc", T::Name, prec::PRIM)]
    #[case("\\[Element]", T::Nary, prec::REL)]
    #[case("\\\n", T::Space, prec::ANY)]
    fn operators_and_words(#[case] text: &str, #[case] class: TokenClass, #[case] p: i32) {
        assert_eq!(analyse(&units(text)), (class, p));
    }

    #[test]
    fn empty_token_is_none() {
        assert_eq!(analyse(&[]), (T::None, prec::ANY));
    }

    #[test]
    fn sentinels_are_single_character_names() {
        for ch in [chars::BOX, chars::LEFT_BOX, chars::RIGHT_BOX, chars::PLACEHOLDER] {
            assert_eq!(classify_char(ch).0, T::Name2);
        }
    }

    #[rstest]
    #[case("!", prec::FAC, prec::REL)]
    #[case("++", prec::STR, prec::INC)]
    #[case("--", prec::INC, prec::INC)]
    #[case("..", prec::RANGE, prec::ADD)]
    #[case("+", prec::ADD, prec::DIV + 1)]
    #[case("±", prec::PLUSMINUS, prec::DIV + 1)]
    #[case("¬", prec::REL, prec::REL + 1)]
    fn prefix_binding(#[case] text: &str, #[case] default: i32, #[case] expected: i32) {
        assert_eq!(prefix_precedence(&units(text), default), expected);
    }

    #[test]
    fn first_and_rest_sets() {
        assert!(maybe_first(T::Name));
        assert!(maybe_first(T::LeftCall));
        assert!(!maybe_first(T::Nary));
        assert!(maybe_rest(T::Nary));
        assert!(maybe_rest(T::LeftCall));
        assert!(!maybe_rest(T::Name));
        assert!(!maybe_rest(T::Right));
    }
}
