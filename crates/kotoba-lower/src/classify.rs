//! Keyword-marker classification of parse-tree sequences.
//!
//! Rules are tested in a fixed priority order against the direct children of
//! a sequence. The first rule whose marker is present wins and is never
//! re-tested, so two overlapping patterns can never both claim a sequence.

use kotoba_syntax::keyword as kw;
use kotoba_syntax::tree::ParseTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Import,
    Export,
    Function,
    Class,
    Enum,
    New,
    StaticMethod,
    TryCatch,
    PatternMatching,
    /// A `場合` case reached outside its `判別` block.
    PatternCase,
    If,
    Loop,
    Variable,
    Call,
    Return,
    Throw,
    TypeCheck,
    Binary,
}

impl Rule {
    pub fn describe(self) -> &'static str {
        match self {
            Rule::Import => "import",
            Rule::Export => "export",
            Rule::Function => "function declaration",
            Rule::Class => "class declaration",
            Rule::Enum => "enum declaration",
            Rule::New => "new expression",
            Rule::StaticMethod => "static method declaration",
            Rule::TryCatch => "try/catch",
            Rule::PatternMatching => "pattern match",
            Rule::PatternCase => "pattern case",
            Rule::If => "if statement",
            Rule::Loop => "loop",
            Rule::Variable => "variable declaration",
            Rule::Call => "call",
            Rule::Return => "return",
            Rule::Throw => "throw",
            Rule::TypeCheck => "type check",
            Rule::Binary => "binary expression",
        }
    }
}

fn has(items: &[ParseTree], marker: &str) -> bool {
    items.iter().any(|item| item.is_word(marker))
}

/// `<expr> を <callee>` where the callee is a plain name, not a keyword.
fn is_call(items: &[ParseTree]) -> bool {
    items.len() == 3 && items[1].is_word(kw::PIPE) && items[2].as_word().is_some_and(kw::is_name)
}

fn is_binary(items: &[ParseTree]) -> bool {
    items.len() == 3 && items[1].as_word().is_some_and(kw::is_operator)
}

/// Classify a sequence by its markers; `None` means "recurse elementwise".
pub fn classify(items: &[ParseTree]) -> Option<Rule> {
    let rule = if has(items, kw::IMPORT) {
        Rule::Import
    } else if has(items, kw::EXPORT) {
        Rule::Export
    } else if has(items, kw::FUNCTION) {
        Rule::Function
    } else if has(items, kw::CLASS) {
        Rule::Class
    } else if has(items, kw::ENUM) {
        Rule::Enum
    } else if has(items, kw::NEW) {
        Rule::New
    } else if has(items, kw::STATIC) {
        Rule::StaticMethod
    } else if has(items, kw::TRY) || has(items, kw::CATCH) {
        Rule::TryCatch
    } else if has(items, kw::MATCH) {
        Rule::PatternMatching
    } else if has(items, kw::CASE) {
        Rule::PatternCase
    } else if has(items, kw::IF) {
        Rule::If
    } else if has(items, kw::LOOP) {
        Rule::Loop
    } else if has(items, kw::LET) || has(items, kw::VAR) {
        Rule::Variable
    } else if is_call(items) {
        Rule::Call
    } else if has(items, kw::PIPE) && has(items, kw::RETURN) {
        Rule::Return
    } else if has(items, kw::PIPE) && has(items, kw::THROW) {
        Rule::Throw
    } else if has(items, kw::TYPE_CHECK) {
        Rule::TypeCheck
    } else if is_binary(items) {
        Rule::Binary
    } else {
        return None;
    };
    Some(rule)
}
