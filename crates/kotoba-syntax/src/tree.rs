//! The untagged parse tree handed from the grammar to the lowering stage.
//!
//! A node is either a literal leaf or an ordered sequence of nodes. There is no
//! rule tag: meaning is positional and keyword-driven, and it is the
//! transformer's job to classify each sequence.

use serde::Serialize;

/// A single token as it appears in the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Leaf {
    /// Identifier, dotted path, keyword, punctuation or operator text.
    Word(String),
    /// String literal contents.
    Str(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParseTree {
    Leaf(Leaf),
    Seq(Vec<ParseTree>),
}

impl ParseTree {
    pub fn word(text: impl Into<String>) -> Self {
        ParseTree::Leaf(Leaf::Word(text.into()))
    }

    pub fn string(text: impl Into<String>) -> Self {
        ParseTree::Leaf(Leaf::Str(text.into()))
    }

    pub fn number(n: f64) -> Self {
        ParseTree::Leaf(Leaf::Number(n))
    }

    pub fn boolean(b: bool) -> Self {
        ParseTree::Leaf(Leaf::Bool(b))
    }

    pub fn seq(items: Vec<ParseTree>) -> Self {
        ParseTree::Seq(items)
    }

    /// The word text of a word leaf.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            ParseTree::Leaf(Leaf::Word(w)) => Some(w),
            _ => None,
        }
    }

    pub fn is_word(&self, text: &str) -> bool {
        self.as_word() == Some(text)
    }

    pub fn as_seq(&self) -> Option<&[ParseTree]> {
        match self {
            ParseTree::Seq(items) => Some(items),
            ParseTree::Leaf(_) => None,
        }
    }
}
