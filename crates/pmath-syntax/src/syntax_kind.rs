//! SyntaxKind enum for the tokens and nodes of the lossless tree view.
//!
//! Following the rust-analyzer model, tokens and nodes share one enum. Every
//! code unit of the parsed text appears in exactly one token.

/// All syntax kinds of the pMath CST.
///
/// `repr(u16)` keeps the kinds cheap to store in rowan's green tree.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens ===
    /// Blanks and line continuations
    WHITESPACE,
    /// Line break
    NEWLINE,
    /// Identifier, including single-character and namespaced names
    NAME,
    /// Number literal with radix, precision and exponent
    NUMBER,
    /// String literal or a piece of one
    STRING,
    /// Any operator token
    OPERATOR,
    /// `(` `[` `{` and friends
    LEFT_FENCE,
    /// `)` `]` `}` and friends
    RIGHT_FENCE,
    /// `/*`, `*/` or `%`
    COMMENT_DELIMITER,
    /// Embedded box sentinel
    BOX,
    /// A unit that is not a token on its own
    ERROR,

    // === Nodes ===
    /// Whole text
    ROOT,
    /// One span of the span array
    SPAN,
    /// A string literal split into several tokens
    STRING_LIT,
    /// A block or line comment
    COMMENT,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token.
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::ERROR as u16)
    }

    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PmathLang {}

impl rowan::Language for PmathLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::COMMENT as u16);
        // SAFETY: bounds checked above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<PmathLang>;
pub type SyntaxToken = rowan::SyntaxToken<PmathLang>;
pub type SyntaxElement = rowan::SyntaxElement<PmathLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::OPERATOR.is_token());
        assert!(SyntaxKind::ERROR.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::SPAN.is_node());
        assert!(SyntaxKind::COMMENT.is_node());
    }

    #[test]
    fn trivia_detection() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(!SyntaxKind::NAME.is_trivia());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        let kind = SyntaxKind::STRING_LIT;
        let raw: rowan::SyntaxKind = kind.into();
        assert_eq!(PmathLang::kind_from_raw(raw), kind);
    }
}
