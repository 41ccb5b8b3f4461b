//! Kotoba lexer: converts source text into tokens.
use kotoba_syntax::error::{error_at, Result};
use kotoba_syntax::keyword;
use kotoba_syntax::token::{Token, TokenKind};

/// Streaming character scanner that produces tokens with positions.
pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Lexer {
    /// Create a new lexer over the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }
    fn peek_next(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }
    fn advance(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos).copied();
        if let Some(c) = ch {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '※' {
                while let Some(c2) = self.peek() {
                    self.advance();
                    if c2 == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, line: usize, col: usize) -> Result<Token> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else if c == '.' && s.chars().all(|d| d.is_ascii_digit()) && self.peek_next().is_some_and(|d| d.is_ascii_digit()) {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let val: f64 = s
            .parse()
            .map_err(|_| kotoba_syntax::error::Error::with_span("Invalid number", line, col))?;
        Ok(Token { kind: TokenKind::Number(val), line, col })
    }

    fn read_word(&mut self, line: usize, col: usize) -> Token {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if is_word_char(c) {
                s.push(c);
                self.advance();
            } else if c == '.' && !s.is_empty() && self.peek_next().is_some_and(is_word_char) {
                // dotted path: Color.RED, 自身.名前
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if keyword::TRUE_WORDS.contains(&s.as_str()) {
            TokenKind::Bool(true)
        } else if keyword::FALSE_WORDS.contains(&s.as_str()) {
            TokenKind::Bool(false)
        } else {
            TokenKind::Word(s)
        };
        Token { kind, line, col }
    }

    fn read_string(&mut self, close: char, line: usize, col: usize) -> Result<Token> {
        let mut s = String::new();
        while let Some(c) = self.advance() {
            match c {
                c if c == close => {
                    return Ok(Token { kind: TokenKind::Str(s), line, col });
                }
                '\\' => {
                    if let Some(n) = self.advance() {
                        let esc = match n {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        };
                        s.push(esc);
                    } else {
                        return error_at(line, col, "Unterminated string");
                    }
                }
                other => s.push(other),
            }
        }
        error_at(line, col, "Unterminated string")
    }

    fn two_char(&mut self, second: char, both: TokenKind, single: Option<TokenKind>, line: usize, col: usize) -> Result<TokenKind> {
        let first = self.advance();
        if self.peek() == Some(second) {
            self.advance();
            return Ok(both);
        }
        match single {
            Some(kind) => Ok(kind),
            None => error_at(
                line,
                col,
                format!("Unexpected '{}' (did you mean '{}{}'?)", first.unwrap_or(' '), first.unwrap_or(' '), second),
            ),
        }
    }

    /// Tokenize the entire input into a vector of tokens ending with Eof.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let line = self.line;
            let col = self.col;
            let kind = match self.peek() {
                None => {
                    tokens.push(Token { kind: TokenKind::Eof, line, col });
                    break;
                }
                Some('{') => {
                    self.advance();
                    TokenKind::LBrace
                }
                Some('}') => {
                    self.advance();
                    TokenKind::RBrace
                }
                Some('(') | Some('（') => {
                    self.advance();
                    TokenKind::LParen
                }
                Some(')') | Some('）') => {
                    self.advance();
                    TokenKind::RParen
                }
                Some(',') | Some('、') => {
                    self.advance();
                    TokenKind::Comma
                }
                Some('+') => {
                    self.advance();
                    TokenKind::Plus
                }
                Some('-') => {
                    self.advance();
                    TokenKind::Minus
                }
                Some('*') => {
                    self.advance();
                    TokenKind::Star
                }
                Some('/') => {
                    self.advance();
                    TokenKind::Slash
                }
                Some('=') => self.two_char('=', TokenKind::EqEq, None, line, col)?,
                Some('!') => self.two_char('=', TokenKind::NotEq, None, line, col)?,
                Some('<') => self.two_char('=', TokenKind::LessEq, Some(TokenKind::Less), line, col)?,
                Some('>') => self.two_char('=', TokenKind::GreaterEq, Some(TokenKind::Greater), line, col)?,
                Some('"') => {
                    self.advance();
                    self.read_string('"', line, col)?.kind
                }
                Some('「') => {
                    self.advance();
                    self.read_string('」', line, col)?.kind
                }
                Some(c) if c.is_ascii_digit() => self.read_number(line, col)?.kind,
                Some(c) if is_word_char(c) => self.read_word(line, col).kind,
                Some(other) => {
                    return error_at(line, col, format!("Unexpected character '{}'", other));
                }
            };
            tokens.push(Token { kind, line, col });
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).tokenize().expect("Lexing should succeed").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_japanese_words_and_strings() {
        assert_eq!(
            kinds("名前 を 表示 「こんにちは」"),
            vec![
                TokenKind::Word("名前".into()),
                TokenKind::Word("を".into()),
                TokenKind::Word("表示".into()),
                TokenKind::Str("こんにちは".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dotted_paths_and_numbers() {
        assert_eq!(
            kinds("Color.RED 3.5 10"),
            vec![TokenKind::Word("Color.RED".into()), TokenKind::Number(3.5), TokenKind::Number(10.0), TokenKind::Eof]
        );
    }

    #[test]
    fn test_booleans_operators_and_comments() {
        assert_eq!(
            kinds("真 <= 偽 ※ comment\n!="),
            vec![TokenKind::Bool(true), TokenKind::LessEq, TokenKind::Bool(false), TokenKind::NotEq, TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions_and_errors() {
        let tokens = Lexer::new("宣言 x\n  は 1").tokenize().unwrap();
        assert_eq!((tokens[2].line, tokens[2].col), (2, 3));
        let err = Lexer::new("「閉じない").tokenize().unwrap_err();
        assert!(err.msg.contains("Unterminated string"));
        assert!(Lexer::new("x = 1").tokenize().is_err());
    }
}
