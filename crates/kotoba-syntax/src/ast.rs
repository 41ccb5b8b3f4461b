//! AST (abstract syntax tree) types for the Kotoba language.
//!
//! Every node carries exactly one variant tag. Ambiguity between overlapping
//! keyword patterns is resolved while lowering, never left to the evaluator.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// `宣言` binds `let`, `定義` binds `var`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Let,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl BinaryOp {
    pub fn from_symbol(s: &str) -> Option<Self> {
        let op = match s {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Literal payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
}

/// One arm of a `判別` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternCase {
    pub pattern: Pattern,
    pub guard: Option<Node>,
    pub body: Vec<Node>,
}

/// What a case compares the subject against.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// An expression whose value must equal the subject.
    Value(Node),
    /// The `他` catch-all.
    Default,
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Pattern::Value(node) => node.serialize(serializer),
            Pattern::Default => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", "DefaultCase")?;
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Program {
        statements: Vec<Node>,
    },
    FunctionDeclaration {
        name: String,
        params: Vec<String>,
        body: Vec<Node>,
    },
    VariableDeclaration {
        kind: DeclKind,
        name: String,
        value: Box<Node>,
    },
    ClassDeclaration {
        name: String,
        #[serde(rename = "superClass")]
        super_class: Option<String>,
        body: Vec<Node>,
    },
    EnumDeclaration {
        name: String,
        values: Vec<String>,
    },
    NewExpression {
        #[serde(rename = "className")]
        class_name: String,
    },
    StaticMethodDeclaration {
        #[serde(rename = "className")]
        class_name: String,
        name: String,
        body: Vec<Node>,
    },
    IfStatement {
        condition: Box<Node>,
        consequent: Vec<Node>,
        alternate: Option<Vec<Node>>,
    },
    PatternMatching {
        expression: Box<Node>,
        cases: Vec<PatternCase>,
    },
    LoopStatement {
        condition: Box<Node>,
        body: Vec<Node>,
    },
    TryCatchStatement {
        #[serde(rename = "tryBlock")]
        try_block: Vec<Node>,
        #[serde(rename = "catchParam")]
        catch_param: String,
        #[serde(rename = "catchBlock")]
        catch_block: Vec<Node>,
    },
    ImportStatement {
        #[serde(rename = "moduleName")]
        module_name: String,
    },
    ExportStatement {
        name: String,
        value: Box<Node>,
    },
    CallExpression {
        callee: String,
        args: Vec<Node>,
    },
    ReturnStatement {
        value: Box<Node>,
    },
    ThrowStatement {
        value: Box<Node>,
    },
    TypeCheck {
        value: Box<Node>,
        #[serde(rename = "typeName")]
        type_name: String,
    },
    BinaryExpression {
        operator: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Identifier {
        name: String,
    },
    Literal {
        value: Literal,
    },
}

impl Node {
    /// Variant name, as used in diagnostics and the JSON `"type"` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Program { .. } => "Program",
            Node::FunctionDeclaration { .. } => "FunctionDeclaration",
            Node::VariableDeclaration { .. } => "VariableDeclaration",
            Node::ClassDeclaration { .. } => "ClassDeclaration",
            Node::EnumDeclaration { .. } => "EnumDeclaration",
            Node::NewExpression { .. } => "NewExpression",
            Node::StaticMethodDeclaration { .. } => "StaticMethodDeclaration",
            Node::IfStatement { .. } => "IfStatement",
            Node::PatternMatching { .. } => "PatternMatching",
            Node::LoopStatement { .. } => "LoopStatement",
            Node::TryCatchStatement { .. } => "TryCatchStatement",
            Node::ImportStatement { .. } => "ImportStatement",
            Node::ExportStatement { .. } => "ExportStatement",
            Node::CallExpression { .. } => "CallExpression",
            Node::ReturnStatement { .. } => "ReturnStatement",
            Node::ThrowStatement { .. } => "ThrowStatement",
            Node::TypeCheck { .. } => "TypeCheck",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::Identifier { .. } => "Identifier",
            Node::Literal { .. } => "Literal",
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Node::Identifier { name: name.into() }
    }

    pub fn number(n: f64) -> Self {
        Node::Literal { value: Literal::Number(n) }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Node::Literal { value: Literal::Str(s.into()) }
    }

    pub fn boolean(b: bool) -> Self {
        Node::Literal { value: Literal::Bool(b) }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Node>) -> Self {
        Node::CallExpression { callee: callee.into(), args }
    }

    pub fn binary(operator: BinaryOp, left: Node, right: Node) -> Self {
        Node::BinaryExpression { operator, left: Box::new(left), right: Box::new(right) }
    }
}
