//! Named characters and escape decoding.
//!
//! `\[Alpha]` and friends spell out characters that are awkward to type.
//! The table here is the single source of truth for those names, in both
//! directions. [`decode_escape`] also covers the short escapes (`\n`, `\x41`,
//! `\u03B1`, ...) so the scanner and the token classifier agree on what an
//! escape means.

use crate::token::chars;

static NAMED_CHARS: &[(&str, u32)] = &[
    // Greek
    ("Alpha", 0x03B1),
    ("Beta", 0x03B2),
    ("Gamma", 0x03B3),
    ("Delta", 0x03B4),
    ("Epsilon", 0x03F5),
    ("CurlyEpsilon", 0x03B5),
    ("Zeta", 0x03B6),
    ("Eta", 0x03B7),
    ("Theta", 0x03B8),
    ("CurlyTheta", 0x03D1),
    ("Iota", 0x03B9),
    ("Kappa", 0x03BA),
    ("CurlyKappa", 0x03F0),
    ("Lambda", 0x03BB),
    ("Mu", 0x03BC),
    ("Nu", 0x03BD),
    ("Xi", 0x03BE),
    ("Omicron", 0x03BF),
    ("Pi", 0x03C0),
    ("CurlyPi", 0x03D6),
    ("Rho", 0x03C1),
    ("CurlyRho", 0x03F1),
    ("FinalSigma", 0x03C2),
    ("Sigma", 0x03C3),
    ("Stigma", 0x03DB),
    ("Tau", 0x03C4),
    ("Upsilon", 0x03C5),
    ("Phi", 0x03D5),
    ("CurlyPhi", 0x03C6),
    ("Chi", 0x03C7),
    ("Psi", 0x03C8),
    ("Omega", 0x03C9),
    ("CapitalAlpha", 0x0391),
    ("CapitalBeta", 0x0392),
    ("CapitalGamma", 0x0393),
    ("CapitalDelta", 0x0394),
    ("CapitalEpsilon", 0x0395),
    ("CapitalZeta", 0x0396),
    ("CapitalEta", 0x0397),
    ("CapitalTheta", 0x0398),
    ("CapitalIota", 0x0399),
    ("CapitalKappa", 0x039A),
    ("CapitalLambda", 0x039B),
    ("CapitalMu", 0x039C),
    ("CapitalNu", 0x039D),
    ("CapitalXi", 0x039E),
    ("CapitalOmicron", 0x039F),
    ("CapitalPi", 0x03A0),
    ("CapitalRho", 0x03A1),
    ("CapitalSigma", 0x03A3),
    ("CapitalTau", 0x03A4),
    ("CapitalUpsilon", 0x03A5),
    ("CapitalPhi", 0x03A6),
    ("CapitalChi", 0x03A7),
    ("CapitalPsi", 0x03A8),
    ("CapitalOmega", 0x03A9),
    // Hebrew
    ("Aleph", 0x2135),
    ("Beth", 0x2136),
    ("Gimel", 0x2137),
    ("Dalet", 0x2138),
    // spacing and invisible operators
    ("NonBreakingSpace", 0x00A0),
    ("ThickSpace", 0x2005),
    ("MediumSpace", 0x205F),
    ("ThinSpace", 0x2009),
    ("VeryThinSpace", 0x200A),
    ("InvisibleSpace", 0x200B),
    ("NoBreak", 0x2060),
    ("InvisibleApply", 0x2061),
    ("InvisibleTimes", 0x2062),
    ("InvisibleComma", 0x2063),
    ("InvisiblePlus", 0x2064),
    // operators and constants
    ("Not", 0x00AC),
    ("Degree", 0x00B0),
    ("PlusMinus", 0x00B1),
    ("Times", 0x00D7),
    ("Divide", 0x00F7),
    ("Dot", 0x22C5),
    ("Cross", 0x2A2F),
    ("Ellipsis", 0x2026),
    ("CapitalDifferentialD", 0x2145),
    ("DifferentialD", 0x2146),
    ("ExponentialE", 0x2147),
    ("ImaginaryI", 0x2148),
    ("ImaginaryJ", 0x2149),
    ("ForAll", 0x2200),
    ("PartialD", 0x2202),
    ("Exists", 0x2203),
    ("NotExists", 0x2204),
    ("EmptySet", 0x2205),
    ("Del", 0x2207),
    ("Element", 0x2208),
    ("NotElement", 0x2209),
    ("Product", 0x220F),
    ("Sum", 0x2211),
    ("MinusPlus", 0x2213),
    ("Sqrt", 0x221A),
    ("Infinity", 0x221E),
    ("And", 0x2227),
    ("Or", 0x2228),
    ("Xor", 0x22BB),
    ("Nand", 0x22BC),
    ("Nor", 0x22BD),
    ("Intersection", 0x2229),
    ("Union", 0x222A),
    ("Integral", 0x222B),
    ("ContourIntegral", 0x222E),
    ("NotEqual", 0x2260),
    ("Congruent", 0x2261),
    ("LessEqual", 0x2264),
    ("GreaterEqual", 0x2265),
    ("Subset", 0x2282),
    ("Superset", 0x2283),
    ("SubsetEqual", 0x2286),
    ("SupersetEqual", 0x2287),
    ("CirclePlus", 0x2295),
    ("CircleTimes", 0x2297),
    ("LeftCeiling", 0x2308),
    ("RightCeiling", 0x2309),
    ("LeftFloor", 0x230A),
    ("RightFloor", 0x230B),
    ("LeftDoubleBracket", 0x27E6),
    ("RightDoubleBracket", 0x27E7),
    // arrows and assignment
    ("Rule", 0x2192),
    ("Function", 0x21A6),
    ("Assign", 0x2254),
    ("RuleDelayed", 0x29F4),
    ("AssignDelayed", 0x2A74),
    ("Piecewise", 0xF361),
    ("Placeholder", chars::PLACEHOLDER as u32),
    ("SelectionPlaceholder", chars::SELECTION_PLACEHOLDER as u32),
];

const DIGIT_NAMES: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// Double-struck capitals that live in the letterlike symbols block.
const DOUBLE_STRUCK_LETTERLIKE: [(u8, u32); 7] = [
    (b'C', 0x2102),
    (b'H', 0x210D),
    (b'N', 0x2115),
    (b'P', 0x2119),
    (b'Q', 0x211A),
    (b'R', 0x211D),
    (b'Z', 0x2124),
];

fn double_struck(rest: &str) -> Option<u32> {
    if let Some(digit) = DIGIT_NAMES.iter().position(|&d| d == rest) {
        return Some(0x1D7D8 + digit as u32);
    }
    let (capital, letter) = match rest.strip_prefix("Capital") {
        Some(letter) => (true, letter),
        None => (false, rest),
    };
    let &[byte] = letter.as_bytes() else {
        return None;
    };
    if !byte.is_ascii_uppercase() {
        return None;
    }
    if !capital {
        return Some(0x1D552 + u32::from(byte - b'A'));
    }
    Some(
        DOUBLE_STRUCK_LETTERLIKE
            .iter()
            .find(|(l, _)| *l == byte)
            .map(|(_, ch)| *ch)
            .unwrap_or(0x1D538 + u32::from(byte - b'A')),
    )
}

/// Code point for a character name, e.g. `"Alpha"` → `U+03B1`.
pub fn char_from_name(name: &str) -> Option<u32> {
    if let Some(rest) = name.strip_prefix("DoubleStruck") {
        return double_struck(rest);
    }
    NAMED_CHARS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ch)| *ch)
}

/// Inverse of [`char_from_name`].
pub fn name_from_char(ch: u32) -> Option<String> {
    if let Some((name, _)) = NAMED_CHARS.iter().find(|(_, c)| *c == ch) {
        return Some((*name).to_string());
    }
    if (0x1D7D8..0x1D7E2).contains(&ch) {
        return Some(format!("DoubleStruck{}", DIGIT_NAMES[(ch - 0x1D7D8) as usize]));
    }
    if (0x1D552..0x1D56C).contains(&ch) {
        return Some(format!("DoubleStruck{}", (b'A' + (ch - 0x1D552) as u8) as char));
    }
    if let Some((letter, _)) = DOUBLE_STRUCK_LETTERLIKE.iter().find(|(_, c)| *c == ch) {
        return Some(format!("DoubleStruckCapital{}", *letter as char));
    }
    if (0x1D538..0x1D552).contains(&ch) {
        let letter = (b'A' + (ch - 0x1D538) as u8) as char;
        if DOUBLE_STRUCK_LETTERLIKE.iter().all(|(l, _)| *l as char != letter) {
            return Some(format!("DoubleStruckCapital{letter}"));
        }
    }
    None
}

fn hex_value(units: &[u16]) -> Option<u32> {
    units.iter().try_fold(0u32, |acc, &u| {
        let digit = char::from_u32(u as u32)?.to_digit(16)?;
        Some(acc * 16 + digit)
    })
}

/// Decode the escape at the start of `units` (which begins with `\`).
///
/// Returns the code point and the number of units the escape spans. Line
/// continuations and unknown escapes yield `None`.
pub fn decode_escape(units: &[u16]) -> Option<(u32, usize)> {
    if units.first() != Some(&(b'\\' as u16)) {
        return None;
    }
    let kind = char::from_u32(*units.get(1)? as u32)?;
    let hex = |digits: usize| {
        let value = hex_value(units.get(2..2 + digits)?)?;
        char::from_u32(value).map(|_| (value, 2 + digits))
    };
    match kind {
        'x' => hex(2),
        'u' => hex(4),
        'U' => hex(8),
        '"' | '\\' => Some((kind as u32, 2)),
        'n' => Some(('\n' as u32, 2)),
        't' => Some(('\t' as u32, 2)),
        'r' => Some(('\r' as u32, 2)),
        'f' => Some((0x0C, 2)),
        'b' => Some((0x08, 2)),
        'a' => Some((0x07, 2)),
        'e' => Some((0x1B, 2)),
        '0' => Some((0, 2)),
        '(' => Some((chars::LEFT_BOX as u32, 2)),
        ')' => Some((chars::RIGHT_BOX as u32, 2)),
        '[' => {
            let close = units.iter().position(|&u| u == b']' as u16)?;
            let name: String = units[2..close]
                .iter()
                .map(|&u| char::from_u32(u as u32).filter(char::is_ascii_alphanumeric))
                .collect::<Option<_>>()?;
            char_from_name(&name).map(|ch| (ch, close + 1))
        }
        _ => None,
    }
}
