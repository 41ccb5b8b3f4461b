//! Value types for the Kotoba interpreter.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kotoba_syntax::ast::{Literal, Node};
use kotoba_syntax::keyword;

use crate::env::Env;

#[derive(Debug, Clone)]
pub enum Value {
    /// An IEEE-754 double
    Number(f64),
    /// A UTF-8 encoded string value
    Str(String),
    /// A boolean value (真 or 偽)
    Bool(bool),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    Enum(Rc<Enumeration>),
    /// The unit value representing "no value"
    Unit,
}

/// A user-defined function closed over the scope it was declared in.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
    pub closure: Env,
}

#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub super_class: Option<Rc<Class>>,
    /// Member declarations run on instantiation (methods excluded).
    pub members: Vec<Node>,
    pub methods: HashMap<String, Rc<Function>>,
    pub statics: RefCell<HashMap<String, Rc<Function>>>,
    /// Scope the class was declared in.
    pub env: Env,
}

impl Class {
    /// The inheritance chain, root ancestor first and `self` last.
    pub fn lineage(self: &Rc<Self>) -> Vec<Rc<Class>> {
        let mut chain = vec![self.clone()];
        let mut current = self.super_class.clone();
        while let Some(class) = current {
            current = class.super_class.clone();
            chain.push(class);
        }
        chain.reverse();
        chain
    }

    /// Instance method lookup, walking up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(m) => Some(m.clone()),
            None => self.super_class.as_ref().and_then(|s| s.find_method(name)),
        }
    }

    pub fn find_static(&self, name: &str) -> Option<Rc<Function>> {
        match self.statics.borrow().get(name) {
            Some(m) => Some(m.clone()),
            None => self.super_class.as_ref().and_then(|s| s.find_static(name)),
        }
    }

    pub fn is_or_extends(&self, name: &str) -> bool {
        self.name == name || self.super_class.as_ref().is_some_and(|s| s.is_or_extends(name))
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<HashMap<String, Value>>,
}

impl fmt::Debug for Instance {
    // Fields may point back at this instance, so only their names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.borrow();
        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();
        f.debug_struct("Instance").field("class", &self.class.name).field("fields", &names).finish()
    }
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self { class, fields: RefCell::new(HashMap::new()) }
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(name.into(), value);
    }
}

#[derive(Debug)]
pub struct Enumeration {
    pub name: String,
    /// Variant name to its position in the declaration
    pub ordinals: HashMap<String, i64>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>, variants: Vec<String>) -> Self {
        let ordinals = variants.into_iter().enumerate().map(|(i, v)| (v, i as i64)).collect();
        Self { name: name.into(), ordinals }
    }

    pub fn ordinal(&self, variant: &str) -> Option<i64> {
        self.ordinals.get(variant).copied()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Enum(_) => "enum",
            Value::Unit => "unit",
        }
    }

    /// Whether `name` (English, Japanese alias, or a class name) describes this value.
    pub fn matches_type(&self, name: &str) -> bool {
        let canonical = match name {
            "数値" => "number",
            "文字列" => "string",
            "真偽" => "boolean",
            "手続" => "function",
            "構造体" => "class",
            "実体" => "instance",
            "列挙体" => "enum",
            "無" => "unit",
            other => other,
        };
        if canonical == self.type_name() {
            return true;
        }
        match self {
            Value::Instance(inst) => inst.class.is_or_extends(name),
            _ => false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Unit => false,
            _ => true,
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

/// Structural equality. `seen` holds instance pairs already under comparison,
/// which are taken as equal so cyclic fields terminate.
fn values_equal(a: &Value, b: &Value, seen: &mut Vec<(*const Instance, *const Instance)>) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Unit, Value::Unit) => true,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Enum(a), Value::Enum(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            if !Rc::ptr_eq(&a.class, &b.class) {
                return false;
            }
            let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
            if seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            let (fa, fb) = (a.fields.borrow(), b.fields.borrow());
            let equal = fa.len() == fb.len()
                && fa.iter().all(|(k, va)| fb.get(k).is_some_and(|vb| values_equal(va, vb, seen)));
            seen.pop();
            equal
        }
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self, f, &mut Vec::new())
    }
}

/// `seen` holds the instances currently being printed; meeting one again
/// prints `<循環>` instead of recursing.
fn write_value(value: &Value, f: &mut fmt::Formatter<'_>, seen: &mut Vec<*const Instance>) -> fmt::Result {
    match value {
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
        Value::Number(n) => write!(f, "{}", n),
        Value::Str(s) => write!(f, "{}", s),
        Value::Bool(b) => write!(f, "{}", if *b { keyword::TRUE_WORDS[0] } else { keyword::FALSE_WORDS[0] }),
        Value::Function(func) => write!(f, "<関数 {}>", func.name),
        Value::Class(class) => write!(f, "<構造 {}>", class.name),
        Value::Enum(e) => write!(f, "<列挙 {}>", e.name),
        Value::Instance(inst) => {
            let ptr = Rc::as_ptr(inst);
            if seen.contains(&ptr) {
                return write!(f, "<循環>");
            }
            seen.push(ptr);
            let fields = inst.fields.borrow();
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            write!(f, "{} {{", inst.class.name)?;
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, " {}: ", name)?;
                write_value(&fields[*name], f, seen)?;
            }
            if !names.is_empty() {
                write!(f, " ")?;
            }
            seen.pop();
            write!(f, "}}")
        }
        Value::Unit => write!(f, "<無>"),
    }
}
