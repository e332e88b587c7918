//! The box tree: what grouping produces and ungrouping consumes.
//!
//! A box is either a slice of source text, an embedded sub-box that lives
//! outside the text (represented in the text by a single sentinel unit), or a
//! compound node with a head and children.
//!
//! ```text
//! "1+2*3"  →  {"1", "+", {"2", "*", "3"}}
//! ```

use std::fmt;

use crate::location::Location;

/// Head of a [`BoxNode::Compound`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoxHead {
    /// A plain grouping of sibling pieces.
    List,
    /// A string literal that contains embedded boxes.
    String,
    /// Any other externally defined box, e.g. `SubscriptBox`.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoxNode {
    /// One token (or, for strings, the whole literal).
    Text(String),
    /// An embedded box whose content is unknown to us.
    Placeholder,
    Compound {
        head: BoxHead,
        children: Vec<BoxNode>,
    },
    /// Debug metadata wrapped around a box; structure is unaffected.
    Located {
        inner: Box<BoxNode>,
        location: Location,
    },
}

impl BoxNode {
    pub fn text(text: impl Into<String>) -> Self {
        BoxNode::Text(text.into())
    }

    pub fn list(children: Vec<BoxNode>) -> Self {
        BoxNode::Compound {
            head: BoxHead::List,
            children,
        }
    }

    pub fn named(name: impl Into<String>, children: Vec<BoxNode>) -> Self {
        BoxNode::Compound {
            head: BoxHead::Named(name.into()),
            children,
        }
    }

    /// Text content if this is a text box (looking through locations).
    pub fn as_text(&self) -> Option<&str> {
        match self.unlocated() {
            BoxNode::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Children of a list box.
    pub fn as_list(&self) -> Option<&[BoxNode]> {
        match self.unlocated() {
            BoxNode::Compound {
                head: BoxHead::List,
                children,
            } => Some(children),
            _ => None,
        }
    }

    /// The box with any location wrappers peeled off.
    pub fn unlocated(&self) -> &BoxNode {
        let mut node = self;
        while let BoxNode::Located { inner, .. } = node {
            node = inner;
        }
        node
    }

    /// Deep copy with every location wrapper removed.
    #[must_use]
    pub fn strip_locations(&self) -> BoxNode {
        match self.unlocated() {
            BoxNode::Compound { head, children } => BoxNode::Compound {
                head: head.clone(),
                children: children.iter().map(BoxNode::strip_locations).collect(),
            },
            other => other.clone(),
        }
    }
}

impl From<&str> for BoxNode {
    fn from(text: &str) -> Self {
        BoxNode::text(text)
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[BoxNode]) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{child}")?;
    }
    Ok(())
}

impl fmt::Display for BoxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxNode::Text(text) => write!(f, "{text:?}"),
            BoxNode::Placeholder => f.write_str("Placeholder"),
            BoxNode::Compound {
                head: BoxHead::List,
                children,
            } => {
                f.write_str("{")?;
                write_children(f, children)?;
                f.write_str("}")
            }
            BoxNode::Compound {
                head: BoxHead::String,
                children,
            } => {
                f.write_str("String(")?;
                write_children(f, children)?;
                f.write_str(")")
            }
            BoxNode::Compound {
                head: BoxHead::Named(name),
                children,
            } => {
                write!(f, "{name}(")?;
                write_children(f, children)?;
                f.write_str(")")
            }
            BoxNode::Located { inner, .. } => write!(f, "{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LineColumn;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_nests_lists_in_braces() {
        let node = BoxNode::list(vec![
            "1".into(),
            "+".into(),
            BoxNode::list(vec!["2".into(), "*".into(), "3".into()]),
        ]);
        assert_eq!(node.to_string(), r#"{"1", "+", {"2", "*", "3"}}"#);
    }

    #[test]
    fn display_names_other_heads() {
        let node = BoxNode::Compound {
            head: BoxHead::String,
            children: vec!["\"a".into(), BoxNode::named("FractionBox", vec![]), "\"".into()],
        };
        assert_eq!(node.to_string(), r#"String("\"a", FractionBox(), "\"")"#);
    }

    #[test]
    fn locations_are_transparent() {
        let at = LineColumn { line: 1, column: 0 };
        let node = BoxNode::Located {
            inner: Box::new(BoxNode::list(vec!["x".into()])),
            location: Location { start: at, end: at },
        };
        assert_eq!(node.to_string(), r#"{"x"}"#);
        assert_eq!(node.as_list().map(<[BoxNode]>::len), Some(1));
        assert_eq!(node.strip_locations(), BoxNode::list(vec!["x".into()]));
    }
}
