//! Tree-to-AST transformation.
//!
//! `transform` walks the untagged parse tree. Leaves become literals or
//! identifiers (keywords and punctuation vanish), classified sequences become
//! AST nodes, and anything unclassified is recursed into elementwise. Block
//! bodies are flattened as they are built, so every body in the AST is a flat
//! list of nodes.

use kotoba_syntax::ast::{BinaryOp, DeclKind, Node, Pattern, PatternCase};
use kotoba_syntax::error::{lowering_error, Error, Result};
use kotoba_syntax::keyword as kw;
use kotoba_syntax::tree::{Leaf, ParseTree};
use tracing::trace;

use crate::classify::{classify, Rule};

/// Output of lowering one tree node: a single AST node or a nested run of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    Node(Node),
    Seq(Vec<Lowered>),
}

impl From<Node> for Lowered {
    fn from(node: Node) -> Self {
        Lowered::Node(node)
    }
}

impl From<Vec<Node>> for Lowered {
    fn from(nodes: Vec<Node>) -> Self {
        Lowered::Seq(nodes.into_iter().map(Lowered::Node).collect())
    }
}

/// Recursively splice nested sequences into one flat list.
///
/// Flattening an already flat list returns it unchanged.
pub fn flatten(lowered: Lowered) -> Vec<Node> {
    let mut out = Vec::new();
    flatten_into(lowered, &mut out);
    out
}

fn flatten_into(lowered: Lowered, out: &mut Vec<Node>) {
    match lowered {
        Lowered::Node(node) => out.push(node),
        Lowered::Seq(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
    }
}

/// Lower a whole program tree into `Node::Program`.
pub fn lower(tree: &ParseTree) -> Result<Node> {
    let statements = statements(tree)?;
    tracing::debug!(count = statements.len(), "lowered program");
    Ok(Node::Program { statements })
}

/// Lower one parse-tree node. `None` means the node carried no meaning
/// (a keyword or punctuation leaf).
pub fn transform(tree: &ParseTree) -> Result<Option<Lowered>> {
    match tree {
        ParseTree::Leaf(leaf) => Ok(lower_leaf(leaf).map(Lowered::Node)),
        ParseTree::Seq(items) => match classify(items) {
            Some(rule) => {
                trace!(rule = rule.describe(), "classified sequence");
                lower_rule(rule, items).map(|node| Some(Lowered::Node(node)))
            }
            None => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(lowered) = transform(item)? {
                        out.push(lowered);
                    }
                }
                Ok(Some(Lowered::Seq(out)))
            }
        },
    }
}

fn lower_leaf(leaf: &Leaf) -> Option<Node> {
    match leaf {
        Leaf::Number(n) => Some(Node::number(*n)),
        Leaf::Str(s) => Some(Node::string(s.clone())),
        Leaf::Bool(b) => Some(Node::boolean(*b)),
        Leaf::Word(w) if kw::is_name(w) => Some(Node::ident(w.clone())),
        Leaf::Word(_) => None,
    }
}

fn lower_rule(rule: Rule, items: &[ParseTree]) -> Result<Node> {
    match rule {
        Rule::Import => lower_import(items),
        Rule::Export => {
            expect_shape(rule, items, 4)?;
            Ok(Node::ExportStatement { name: name(&items[1], "export name")?, value: Box::new(expr(&items[3])?) })
        }
        Rule::Function => {
            expect_shape(rule, items, 4)?;
            Ok(Node::FunctionDeclaration {
                name: name(&items[1], "function name")?,
                params: name_group(&items[2])?,
                body: block(&items[3])?,
            })
        }
        Rule::Class => lower_class(items),
        Rule::Enum => {
            expect_shape(rule, items, 3)?;
            Ok(Node::EnumDeclaration { name: name(&items[1], "enum name")?, values: name_group(&items[2])? })
        }
        Rule::New => {
            expect_shape(rule, items, 2)?;
            Ok(Node::NewExpression { class_name: name(&items[1], "class name")? })
        }
        Rule::StaticMethod => {
            expect_shape(rule, items, 3)?;
            let path = name(&items[1], "static method path")?;
            let Some((class_name, method)) = path.rsplit_once('.') else {
                return lowering_error(format!("static method '{}' must be written as Class.method", path));
            };
            Ok(Node::StaticMethodDeclaration {
                class_name: class_name.to_string(),
                name: method.to_string(),
                body: block(&items[2])?,
            })
        }
        Rule::TryCatch => {
            expect_shape(rule, items, 5)?;
            let params = name_group(&items[3])?;
            let [catch_param] = <[String; 1]>::try_from(params).map_err(|params| {
                Error::lowering(format!("catch takes exactly one name, found {}", params.len()))
            })?;
            Ok(Node::TryCatchStatement { try_block: block(&items[1])?, catch_param, catch_block: block(&items[4])? })
        }
        Rule::PatternMatching => {
            expect_shape(rule, items, 4)?;
            let mut cases = Vec::new();
            for case in case_list(&items[3])? {
                cases.push(lower_case(case)?);
            }
            Ok(Node::PatternMatching { expression: Box::new(expr(&items[0])?), cases })
        }
        Rule::PatternCase => lowering_error("'場合' case outside of a '判別' block"),
        Rule::If => lower_if(items),
        Rule::Loop => {
            expect_shape(rule, items, 3)?;
            Ok(Node::LoopStatement { condition: Box::new(expr(&items[0])?), body: block(&items[2])? })
        }
        Rule::Variable => {
            expect_shape(rule, items, 4)?;
            let kind = if items[0].is_word(kw::LET) {
                DeclKind::Let
            } else if items[0].is_word(kw::VAR) {
                DeclKind::Var
            } else {
                return lowering_error("variable declaration must start with '宣言' or '定義'");
            };
            Ok(Node::VariableDeclaration { kind, name: name(&items[1], "variable name")?, value: Box::new(expr(&items[3])?) })
        }
        Rule::Call => Ok(Node::CallExpression { callee: name(&items[2], "callee")?, args: args(&items[0])? }),
        Rule::Return => {
            expect_shape(rule, items, 3)?;
            Ok(Node::ReturnStatement { value: Box::new(expr(&items[0])?) })
        }
        Rule::Throw => {
            expect_shape(rule, items, 3)?;
            Ok(Node::ThrowStatement { value: Box::new(expr(&items[0])?) })
        }
        Rule::TypeCheck => {
            expect_shape(rule, items, 4)?;
            Ok(Node::TypeCheck { value: Box::new(expr(&items[1])?), type_name: name(&items[3], "type name")? })
        }
        Rule::Binary => {
            let symbol = items[1].as_word().unwrap_or_default();
            let Some(operator) = BinaryOp::from_symbol(symbol) else {
                return lowering_error(format!("unknown operator '{}'", symbol));
            };
            Ok(Node::binary(operator, expr(&items[0])?, expr(&items[2])?))
        }
    }
}

fn expect_shape(rule: Rule, items: &[ParseTree], len: usize) -> Result<()> {
    if items.len() != len {
        return lowering_error(format!("malformed {}: expected {} parts, found {}", rule.describe(), len, items.len()));
    }
    Ok(())
}

fn lower_import(items: &[ParseTree]) -> Result<Node> {
    expect_shape(Rule::Import, items, 2)?;
    let module_name = match &items[1] {
        ParseTree::Leaf(Leaf::Str(s)) => s.clone(),
        other => name(other, "module name")?,
    };
    Ok(Node::ImportStatement { module_name })
}

fn lower_class(items: &[ParseTree]) -> Result<Node> {
    let super_class = if items.iter().any(|item| item.is_word(kw::EXTENDS)) {
        expect_shape(Rule::Class, items, 5)?;
        Some(name(&items[3], "superclass name")?)
    } else {
        expect_shape(Rule::Class, items, 3)?;
        None
    };
    Ok(Node::ClassDeclaration {
        name: name(&items[1], "class name")?,
        super_class,
        body: block(&items[items.len() - 1])?,
    })
}

fn lower_if(items: &[ParseTree]) -> Result<Node> {
    let alternate = match items.len() {
        3 => None,
        5 if items[3].is_word(kw::ELSE) => {
            let alt = &items[4];
            // else-if chains arrive as a bare statement rather than a block
            if is_block(alt) { Some(block(alt)?) } else { Some(statements(alt)?) }
        }
        n => return lowering_error(format!("malformed if statement: expected 3 or 5 parts, found {}", n)),
    };
    Ok(Node::IfStatement { condition: Box::new(expr(&items[0])?), consequent: block(&items[2])?, alternate })
}

fn case_list(node: &ParseTree) -> Result<Vec<&[ParseTree]>> {
    let Some(inner) = block_inner(node) else {
        return lowering_error("expected a '{ ... }' block of cases");
    };
    let mut cases = Vec::new();
    for group in inner {
        let Some(group) = group.as_seq() else {
            return lowering_error("malformed pattern case");
        };
        for case in group {
            match case.as_seq() {
                Some(case) => cases.push(case),
                None => return lowering_error("malformed pattern case"),
            }
        }
    }
    Ok(cases)
}

/// `p 場合 [もし g] { .. }` or `他 [もし g] { .. }`.
fn lower_case(items: &[ParseTree]) -> Result<PatternCase> {
    let (pattern, rest) = match items {
        [first, rest @ ..] if first.is_word(kw::ELSE) => (Pattern::Default, rest),
        [pattern, marker, rest @ ..] if marker.is_word(kw::CASE) => (Pattern::Value(expr(pattern)?), rest),
        _ => return lowering_error("pattern case must be '<pattern> 場合' or '他'"),
    };
    let (guard, body) = match rest {
        [marker, guard, body] if marker.is_word(kw::GUARD) => (Some(expr(guard)?), body),
        [body] => (None, body),
        _ => return lowering_error("malformed pattern case body"),
    };
    Ok(PatternCase { pattern, guard, body: block(body)? })
}

fn is_block(node: &ParseTree) -> bool {
    block_inner(node).is_some()
}

/// Contents between `{` and `}` of a block sequence.
fn block_inner(node: &ParseTree) -> Option<&[ParseTree]> {
    match node.as_seq()? {
        [open, inner @ .., close] if open.is_word(kw::LBRACE) && close.is_word(kw::RBRACE) => Some(inner),
        _ => None,
    }
}

fn block(node: &ParseTree) -> Result<Vec<Node>> {
    let Some(inner) = block_inner(node) else {
        return lowering_error("expected a '{ ... }' block");
    };
    let mut out = Vec::new();
    for item in inner {
        out.extend(statements(item)?);
    }
    Ok(out)
}

/// Lower a node in statement position and flatten the result.
pub(crate) fn statements(node: &ParseTree) -> Result<Vec<Node>> {
    Ok(transform(node)?.map(flatten).unwrap_or_default())
}

/// Contents between `(` and `)` with the separating commas removed.
fn paren_inner(node: &ParseTree) -> Option<Vec<&ParseTree>> {
    match node.as_seq()? {
        [open, inner @ .., close] if open.is_word(kw::LPAREN) && close.is_word(kw::RPAREN) => Some(
            inner
                .iter()
                .filter(|item| !item.is_word(kw::COMMA) && !item.is_word(kw::IDEOGRAPHIC_COMMA))
                .collect(),
        ),
        _ => None,
    }
}

/// An expression slot: must produce exactly one node.
fn expr(node: &ParseTree) -> Result<Node> {
    if let Some(inner) = paren_inner(node) {
        return match inner.as_slice() {
            [single] => expr(single),
            _ => lowering_error(format!("expected one parenthesised expression, found {}", inner.len())),
        };
    }
    let mut nodes = statements(node)?;
    match nodes.len() {
        1 => Ok(nodes.remove(0)),
        0 => lowering_error("expected an expression, found nothing"),
        n => lowering_error(format!("expected a single expression, found {}", n)),
    }
}

/// Call arguments: a paren group spreads into several, anything else is one.
fn args(node: &ParseTree) -> Result<Vec<Node>> {
    match paren_inner(node) {
        Some(inner) => inner.into_iter().map(expr).collect(),
        None => Ok(vec![expr(node)?]),
    }
}

fn name(node: &ParseTree, what: &str) -> Result<String> {
    match node.as_word() {
        Some(word) if kw::is_name(word) => Ok(word.to_string()),
        _ => lowering_error(format!("expected {} but found {:?}", what, node)),
    }
}

/// Names inside `( .. )` or `{ .. }`, separators dropped.
fn name_group(node: &ParseTree) -> Result<Vec<String>> {
    let Some(items) = node.as_seq() else {
        return lowering_error("expected a group of names");
    };
    let mut names = Vec::new();
    for item in items {
        match item.as_word() {
            Some(word) if kw::is_punctuation(word) => {}
            _ => names.push(name(item, "a name")?),
        }
    }
    Ok(names)
}
