//! Reserved words, punctuation and operators of the Kotoba surface language.
//!
//! The parse tree is untagged: keywords and punctuation reach the lowering
//! stage as plain word leaves. These constants are the single vocabulary both
//! the grammar and the transformer match against.

pub const FUNCTION: &str = "関数";
pub const LET: &str = "宣言";
pub const VAR: &str = "定義";
pub const BIND: &str = "は";
pub const IF: &str = "なら";
pub const ELSE: &str = "他";
pub const LOOP: &str = "繰返";
pub const PIPE: &str = "を";
pub const RETURN: &str = "返却";
pub const THROW: &str = "投げる";
pub const CLASS: &str = "構造";
pub const EXTENDS: &str = "継承";
pub const ENUM: &str = "列挙";
pub const NEW: &str = "生成";
pub const STATIC: &str = "静的";
pub const TRY: &str = "試み";
pub const CATCH: &str = "捕捉";
pub const MATCH: &str = "判別";
pub const CASE: &str = "場合";
pub const GUARD: &str = "もし";
pub const IMPORT: &str = "取込";
pub const EXPORT: &str = "公開";
pub const TYPE_CHECK: &str = "検査";

/// Words the lexer turns into boolean literals.
pub const TRUE_WORDS: [&str; 2] = ["真", "true"];
pub const FALSE_WORDS: [&str; 2] = ["偽", "false"];

/// Name bound to the receiver inside class members and methods.
pub const SELF: &str = "自身";

pub const KEYWORDS: [&str; 23] = [
    FUNCTION, LET, VAR, BIND, IF, ELSE, LOOP, PIPE, RETURN, THROW, CLASS, EXTENDS, ENUM, NEW,
    STATIC, TRY, CATCH, MATCH, CASE, GUARD, IMPORT, EXPORT, TYPE_CHECK,
];

pub const LBRACE: &str = "{";
pub const RBRACE: &str = "}";
pub const LPAREN: &str = "(";
pub const RPAREN: &str = ")";
pub const COMMA: &str = ",";
pub const IDEOGRAPHIC_COMMA: &str = "、";

pub const PUNCTUATION: [&str; 6] = [LBRACE, RBRACE, LPAREN, RPAREN, COMMA, IDEOGRAPHIC_COMMA];

pub const OPERATORS: [&str; 10] = ["+", "-", "*", "/", "==", "!=", "<", ">", "<=", ">="];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_punctuation(word: &str) -> bool {
    PUNCTUATION.contains(&word)
}

pub fn is_operator(word: &str) -> bool {
    OPERATORS.contains(&word)
}

/// True for words that can name a binding: not a keyword, punctuation or operator.
pub fn is_name(word: &str) -> bool {
    !word.is_empty() && !is_keyword(word) && !is_punctuation(word) && !is_operator(word)
}
