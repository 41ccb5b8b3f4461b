//! Token definitions produced by the Kotoba lexer.
//!
//! Keywords are not separate token kinds: Kotoba keywords are ordinary words
//! (`関数`, `なら`, `を` ...) and the grammar recognises them by text, using
//! the vocabulary in [`crate::keyword`]. This keeps the token set small and
//! lets the parse tree stay untagged.
//!
//! # Examples
//!
//! ```rust
//! use kotoba_syntax::{Token, TokenKind};
//!
//! let keyword = Token { kind: TokenKind::Word("関数".to_string()), line: 1, col: 1 };
//! let number = Token { kind: TokenKind::Number(42.0), line: 2, col: 1 };
//! assert!(keyword.is_word("関数"));
//! assert!(!number.is_word("関数"));
//! ```

/// Token types that can be produced by the Kotoba lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// An identifier, a dotted path or a keyword
    ///
    /// Examples: `名前`, `Color.RED`, `関数`
    Word(String),

    /// A numeric literal (IEEE-754 double)
    Number(f64),

    /// A string literal, written `「...」` or `"..."`
    Str(String),

    /// `真` / `偽` (or `true` / `false`)
    Bool(bool),

    // === Punctuation ===
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,` or the ideographic comma `、`
    Comma,

    // === Operators ===
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,

    /// End-of-file marker
    Eof,
}

impl TokenKind {
    /// Source text of punctuation and operator tokens, as it appears in the parse tree.
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            _ => return None,
        };
        Some(s)
    }

    /// Human-readable rendering used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word(w) => format!("'{}'", w),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Str(s) => format!("string 「{}」", s),
            TokenKind::Bool(b) => format!("boolean {}", if *b { "真" } else { "偽" }),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol().unwrap_or("?")),
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type and semantic content of this token
    pub kind: TokenKind,

    /// Line number in the source file (1-based)
    pub line: usize,

    /// Column number in the source file (1-based)
    pub col: usize,
}

impl Token {
    /// True if this token is the word `text` (keyword or identifier).
    pub fn is_word(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w == text)
    }
}
