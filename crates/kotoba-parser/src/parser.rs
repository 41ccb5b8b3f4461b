//! Recursive-descent grammar producing the untagged parse tree.
//!
//! The output keeps every keyword and punctuation token as a word leaf, in
//! source order, so the shapes below are what the lowering stage sees:
//!
//! ```text
//! block       ["{", [stmt...], "}"]
//! function    ["関数", name, ["(", p, ",", q, ")"], block]
//! declaration ["宣言" | "定義", name, "は", expr]
//! if          [cond, "なら", block, ("他", block | if)?]
//! call        [arg, "を", callee]
//! ```

use kotoba_syntax::error::{error_at, Result};
use kotoba_syntax::keyword as kw;
use kotoba_syntax::token::{Token, TokenKind};
use kotoba_syntax::tree::ParseTree;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        self.tokens.is_empty() || matches!(self.peek().kind, TokenKind::Eof)
    }

    fn check_word(&self, text: &str) -> bool {
        self.peek().is_word(text)
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T> {
        let tok = self.peek();
        error_at(tok.line, tok.col, format!("Expected {} but found {}", expected, tok.kind.describe()))
    }

    fn expect_word(&mut self, text: &str) -> Result<ParseTree> {
        if self.check_word(text) {
            self.advance();
            Ok(ParseTree::word(text))
        } else {
            self.unexpected(&format!("'{}'", text))
        }
    }

    fn expect_symbol(&mut self, kind: TokenKind) -> Result<ParseTree> {
        if self.peek().kind == kind {
            let sym = kind.symbol().unwrap_or_default();
            self.advance();
            Ok(ParseTree::word(sym))
        } else {
            self.unexpected(&format!("'{}'", kind.symbol().unwrap_or_default()))
        }
    }

    fn expect_name(&mut self) -> Result<ParseTree> {
        match &self.peek().kind {
            TokenKind::Word(w) if kw::is_name(w) => {
                let w = w.clone();
                self.advance();
                Ok(ParseTree::word(w))
            }
            _ => self.unexpected("a name"),
        }
    }

    /// Parse the whole token stream as a statement list.
    pub fn parse_program(&mut self) -> Result<ParseTree> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(ParseTree::seq(statements))
    }

    pub fn parse_statement(&mut self) -> Result<ParseTree> {
        let word = match &self.peek().kind {
            TokenKind::Word(w) => w.clone(),
            _ => return self.parse_expression_statement(),
        };
        match word.as_str() {
            kw::FUNCTION => self.parse_function(),
            kw::LET | kw::VAR => self.parse_declaration(),
            kw::CLASS => self.parse_class(),
            kw::ENUM => self.parse_enum(),
            kw::STATIC => self.parse_static(),
            kw::TRY => self.parse_try(),
            kw::IMPORT => self.parse_import(),
            kw::EXPORT => self.parse_export(),
            kw::TYPE_CHECK => self.parse_type_check(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> Result<ParseTree> {
        let open = self.expect_symbol(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            statements.push(self.parse_statement()?);
        }
        let close = self.expect_symbol(TokenKind::RBrace)?;
        Ok(ParseTree::seq(vec![open, ParseTree::seq(statements), close]))
    }

    /// `( a, b )` of names, kept with its punctuation.
    fn parse_name_group(&mut self) -> Result<ParseTree> {
        let mut items = vec![self.expect_symbol(TokenKind::LParen)?];
        if !matches!(self.peek().kind, TokenKind::RParen) {
            items.push(self.expect_name()?);
            while matches!(self.peek().kind, TokenKind::Comma) {
                items.push(self.expect_symbol(TokenKind::Comma)?);
                items.push(self.expect_name()?);
            }
        }
        items.push(self.expect_symbol(TokenKind::RParen)?);
        Ok(ParseTree::seq(items))
    }

    fn parse_function(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::FUNCTION)?;
        let name = self.expect_name()?;
        let params = self.parse_name_group()?;
        let body = self.parse_block()?;
        Ok(ParseTree::seq(vec![marker, name, params, body]))
    }

    fn parse_declaration(&mut self) -> Result<ParseTree> {
        let marker = if self.check_word(kw::LET) { self.expect_word(kw::LET)? } else { self.expect_word(kw::VAR)? };
        let name = self.expect_name()?;
        let bind = self.expect_word(kw::BIND)?;
        let value = self.parse_expr()?;
        Ok(ParseTree::seq(vec![marker, name, bind, value]))
    }

    fn parse_class(&mut self) -> Result<ParseTree> {
        let mut items = vec![self.expect_word(kw::CLASS)?, self.expect_name()?];
        if self.check_word(kw::EXTENDS) {
            items.push(self.expect_word(kw::EXTENDS)?);
            items.push(self.expect_name()?);
        }
        items.push(self.parse_block()?);
        Ok(ParseTree::seq(items))
    }

    fn parse_enum(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::ENUM)?;
        let name = self.expect_name()?;
        let mut values = vec![self.expect_symbol(TokenKind::LBrace)?];
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            if matches!(self.peek().kind, TokenKind::Comma) {
                values.push(self.expect_symbol(TokenKind::Comma)?);
            } else {
                values.push(self.expect_name()?);
            }
        }
        values.push(self.expect_symbol(TokenKind::RBrace)?);
        Ok(ParseTree::seq(vec![marker, name, ParseTree::seq(values)]))
    }

    fn parse_static(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::STATIC)?;
        let path = self.expect_name()?;
        let body = self.parse_block()?;
        Ok(ParseTree::seq(vec![marker, path, body]))
    }

    fn parse_try(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::TRY)?;
        let try_block = self.parse_block()?;
        let catch = self.expect_word(kw::CATCH)?;
        let param = self.parse_name_group()?;
        let catch_block = self.parse_block()?;
        Ok(ParseTree::seq(vec![marker, try_block, catch, param, catch_block]))
    }

    fn parse_import(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::IMPORT)?;
        let name = match &self.peek().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                ParseTree::string(s)
            }
            _ => self.expect_name()?,
        };
        Ok(ParseTree::seq(vec![marker, name]))
    }

    fn parse_export(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::EXPORT)?;
        let name = self.expect_name()?;
        let bind = self.expect_word(kw::BIND)?;
        let value = self.parse_expr()?;
        Ok(ParseTree::seq(vec![marker, name, bind, value]))
    }

    fn parse_type_check(&mut self) -> Result<ParseTree> {
        let marker = self.expect_word(kw::TYPE_CHECK)?;
        let value = self.parse_expr()?;
        let bind = self.expect_word(kw::BIND)?;
        let type_name = self.expect_name()?;
        Ok(ParseTree::seq(vec![marker, value, bind, type_name]))
    }

    /// Statements that start with an expression: calls, return/throw, match, if, loop.
    fn parse_expression_statement(&mut self) -> Result<ParseTree> {
        let expr = self.parse_expr()?;
        if self.check_word(kw::PIPE) {
            let target = self.peek_at(1).clone();
            if target.is_word(kw::RETURN) || target.is_word(kw::THROW) {
                let pipe = self.expect_word(kw::PIPE)?;
                let marker = ParseTree::word(if target.is_word(kw::RETURN) { kw::RETURN } else { kw::THROW });
                self.advance();
                return Ok(ParseTree::seq(vec![expr, pipe, marker]));
            }
            if target.is_word(kw::MATCH) {
                let pipe = self.expect_word(kw::PIPE)?;
                let marker = self.expect_word(kw::MATCH)?;
                let cases = self.parse_cases()?;
                return Ok(ParseTree::seq(vec![expr, pipe, marker, cases]));
            }
            self.advance();
            return self.unexpected("a function name after 'を'");
        }
        if self.check_word(kw::IF) {
            return self.parse_if_tail(expr);
        }
        if self.check_word(kw::LOOP) {
            let marker = self.expect_word(kw::LOOP)?;
            let body = self.parse_block()?;
            return Ok(ParseTree::seq(vec![expr, marker, body]));
        }
        Ok(expr)
    }

    fn parse_if_tail(&mut self, condition: ParseTree) -> Result<ParseTree> {
        let mut items = vec![condition, self.expect_word(kw::IF)?, self.parse_block()?];
        if self.check_word(kw::ELSE) {
            items.push(self.expect_word(kw::ELSE)?);
            if matches!(self.peek().kind, TokenKind::LBrace) {
                items.push(self.parse_block()?);
            } else {
                // 他 x なら { ... }: chained else-if
                items.push(self.parse_expression_statement()?);
            }
        }
        Ok(ParseTree::seq(items))
    }

    fn parse_cases(&mut self) -> Result<ParseTree> {
        let open = self.expect_symbol(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            let mut case = Vec::new();
            if self.check_word(kw::ELSE) {
                case.push(self.expect_word(kw::ELSE)?);
            } else {
                case.push(self.parse_expr()?);
                case.push(self.expect_word(kw::CASE)?);
            }
            if self.check_word(kw::GUARD) {
                case.push(self.expect_word(kw::GUARD)?);
                case.push(self.parse_expr()?);
            }
            case.push(self.parse_block()?);
            cases.push(ParseTree::seq(case));
        }
        let close = self.expect_symbol(TokenKind::RBrace)?;
        Ok(ParseTree::seq(vec![open, ParseTree::seq(cases), close]))
    }

    /// Full expression: comparisons chained through `を 名前` calls.
    pub fn parse_expr(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_comparison()?;
        while self.check_word(kw::PIPE) {
            let callee = match &self.peek_at(1).kind {
                TokenKind::Word(w) if kw::is_name(w) => w.clone(),
                _ => break,
            };
            let pipe = self.expect_word(kw::PIPE)?;
            self.advance();
            left = ParseTree::seq(vec![left, pipe, ParseTree::word(callee)]);
        }
        Ok(left)
    }

    fn parse_binary_level(
        &mut self,
        ops: &[TokenKind],
        next: fn(&mut Self) -> Result<ParseTree>,
    ) -> Result<ParseTree> {
        let mut left = next(self)?;
        while ops.contains(&self.peek().kind) {
            let op = self.advance();
            let right = next(self)?;
            left = ParseTree::seq(vec![left, ParseTree::word(op.kind.symbol().unwrap_or_default()), right]);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<ParseTree> {
        self.parse_binary_level(
            &[
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Less,
                TokenKind::LessEq,
                TokenKind::Greater,
                TokenKind::GreaterEq,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<ParseTree> {
        self.parse_binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<ParseTree> {
        self.parse_binary_level(&[TokenKind::Star, TokenKind::Slash], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<ParseTree> {
        if matches!(self.peek().kind, TokenKind::Minus) {
            self.advance();
            if let TokenKind::Number(n) = self.peek().kind {
                self.advance();
                return Ok(ParseTree::number(-n));
            }
            let operand = self.parse_unary()?;
            return Ok(ParseTree::seq(vec![ParseTree::number(0.0), ParseTree::word("-"), operand]));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ParseTree> {
        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(ParseTree::number(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(ParseTree::string(s))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(ParseTree::boolean(b))
            }
            TokenKind::Word(w) if w == kw::NEW => {
                let marker = self.expect_word(kw::NEW)?;
                let class_name = self.expect_name()?;
                Ok(ParseTree::seq(vec![marker, class_name]))
            }
            TokenKind::Word(w) if kw::is_name(&w) => {
                self.advance();
                Ok(ParseTree::word(w))
            }
            TokenKind::LParen => {
                let mut items = vec![self.expect_symbol(TokenKind::LParen)?];
                if !matches!(self.peek().kind, TokenKind::RParen) {
                    items.push(self.parse_expr()?);
                    while matches!(self.peek().kind, TokenKind::Comma) {
                        items.push(self.expect_symbol(TokenKind::Comma)?);
                        items.push(self.parse_expr()?);
                    }
                }
                items.push(self.expect_symbol(TokenKind::RParen)?);
                Ok(ParseTree::seq(items))
            }
            _ => self.unexpected("an expression"),
        }
    }
}
