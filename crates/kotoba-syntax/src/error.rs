//! Error handling types for the front half of the Kotoba toolchain.
//!
//! Two kinds of failure happen before a program runs:
//!
//! - **Parse errors** come from the lexer and the grammar. They usually carry
//!   the line and column where scanning or parsing gave up.
//! - **Lowering errors** come from the transformer when a parse-tree sequence
//!   matched a rule marker but does not have that rule's shape. The parse tree
//!   carries no positions, so these errors have none either.
//!
//! Runtime failures live in `kotoba-interpreter`, which has its own taxonomy.
//!
//! # Examples
//!
//! ```rust
//! use kotoba_syntax::error::{Error, ErrorKind, Result, error, lowering_error};
//!
//! fn parse_count(s: &str) -> Result<u32> {
//!     s.parse().map_err(|_| Error::new(format!("Invalid number: {}", s)))
//! }
//!
//! fn shape_check(len: usize) -> Result<()> {
//!     if len < 3 {
//!         lowering_error("declaration is missing its value")
//!     } else {
//!         Ok(())
//!     }
//! }
//!
//! assert!(parse_count("12").is_ok());
//! assert_eq!(shape_check(1).unwrap_err().kind, ErrorKind::Lowering);
//! let _: Result<()> = error("Unexpected token");
//! ```

use std::fmt;

/// Which stage produced an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tokenizing or grammar matching failed.
    Parse,
    /// A parse-tree sequence could not be turned into an AST node.
    Lowering,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Parse => "Parse error",
            ErrorKind::Lowering => "Lowering error",
        }
    }
}

/// An error that occurred while turning source text into an AST.
///
/// # Fields
///
/// - `kind`: the stage that failed
/// - `msg`: human-readable error description
/// - `line`: optional 1-based line number in the source
/// - `col`: optional 1-based column number in the source
///
/// # Examples
///
/// ```rust
/// use kotoba_syntax::Error;
///
/// let located = Error::with_span("Expected '}'", 3, 8);
/// assert_eq!(located.to_string(), "Expected '}' at 3:8");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// Stage that produced the error
    pub kind: ErrorKind,

    /// Human-readable error message
    pub msg: String,

    /// Optional line number in source file (1-based)
    pub line: Option<usize>,

    /// Optional column number in source file (1-based)
    pub col: Option<usize>,
}

impl Error {
    /// Creates a parse error with no location.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// Creates a parse error at the given 1-based line and column.
    pub fn with_span(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind: ErrorKind::Parse,
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }

    /// Creates a lowering error. The parse tree has no positions, so neither does this.
    pub fn lowering(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Lowering,
            msg: msg.into(),
            line: None,
            col: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(l), Some(c)) = (self.line, self.col) {
            write!(f, "{} at {}:{}", self.msg, l, c)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::new(s)
    }
}
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::new(s)
    }
}

/// A specialized `Result` type for lexing, parsing and lowering.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for `Err(Error::new(msg))`.
pub fn error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::new(msg))
}

/// Shorthand for `Err(Error::with_span(msg, line, col))`.
///
/// ```rust
/// use kotoba_syntax::error::{Result, error_at};
///
/// fn reject(line: usize, col: usize) -> Result<String> {
///     error_at(line, col, "Unexpected character '&'")
/// }
/// assert_eq!(reject(2, 4).unwrap_err().line, Some(2));
/// ```
pub fn error_at<T>(line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(msg, line, col))
}

/// Shorthand for `Err(Error::lowering(msg))`.
pub fn lowering_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::lowering(msg))
}
