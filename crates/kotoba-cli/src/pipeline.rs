//! Source text to parse tree to AST.

use kotoba_lexer::Lexer;
use kotoba_parser::Parser;
use kotoba_syntax::ast::Node;
use kotoba_syntax::error::Result;
use kotoba_syntax::tree::ParseTree;

pub fn parse(source: &str) -> Result<ParseTree> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

/// Parse and lower into a `Node::Program`.
pub fn compile(source: &str) -> Result<Node> {
    kotoba_lower::lower(&parse(source)?)
}
