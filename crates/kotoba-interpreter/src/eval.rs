//! Expression evaluation: literals, names and member paths, operators, calls
//! and instantiation.

use std::rc::Rc;

use kotoba_syntax::ast::{BinaryOp, Node};
use kotoba_syntax::keyword;
use tracing::debug;

use crate::builtins::CallContext;
use crate::env::Env;
use crate::error::{Result, RuntimeError};
use crate::flow::Flow;
use crate::interpreter::Interpreter;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Function, Instance, Value};

impl Interpreter {
    pub fn evaluate(&mut self, node: &Node, env: &Env) -> Result<Value> {
        match node {
            Node::Literal { value } => Ok(Value::from(value)),
            Node::Identifier { name } => lookup(name, env),
            Node::BinaryExpression { operator, left, right } => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                apply_binary(*operator, l, r)
            }
            Node::CallExpression { callee, args } => self.call(callee, args, env),
            Node::NewExpression { class_name } => self.instantiate(class_name, env),
            Node::TypeCheck { value, type_name } => {
                let v = self.evaluate(value, env)?;
                if v.matches_type(type_name) {
                    Ok(Value::Unit)
                } else {
                    Err(RuntimeError::type_error(format!("expected {} but found {} ({})", type_name, v.type_name(), v)))
                }
            }
            other => Err(RuntimeError::UnknownNodeKind(other.kind_name().to_string())),
        }
    }

    fn call(&mut self, callee: &str, args: &[Node], env: &Env) -> Result<Value> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.evaluate(a, env)?);
        }
        if let Some(native) = self.builtins.get(callee) {
            let mut ctx = CallContext { out: self.out.as_mut(), env };
            return native(&mut ctx, values);
        }
        match lookup(callee, env)? {
            Value::Function(func) => self.call_function(&func, values),
            other => Err(RuntimeError::type_error(format!("'{}' is a {}, not a function", callee, other.type_name()))),
        }
    }

    pub(crate) fn call_function(&mut self, func: &Function, args: Vec<Value>) -> Result<Value> {
        if func.params.len() != args.len() {
            return Err(RuntimeError::type_error(format!(
                "function '{}' expected {} args, got {}",
                func.name,
                func.params.len(),
                args.len()
            )));
        }
        debug!(name = %func.name, args = args.len(), depth = self.call_depth, "call");
        let scope = func.closure.child();
        for (param, value) in func.params.iter().zip(args) {
            scope.define(param.clone(), value);
        }
        match self.nested(|interp| interp.exec_block(&func.body, &scope))? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::Unit),
        }
    }

    /// Run one call frame, failing once the depth limit is reached.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow { depth: self.max_call_depth });
        }
        self.call_depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.call_depth -= 1;
        result
    }

    fn instantiate(&mut self, class_name: &str, env: &Env) -> Result<Value> {
        let class = match env.get(class_name) {
            Some(Value::Class(c)) => c,
            _ => return Err(RuntimeError::UnknownClass(class_name.to_string())),
        };
        debug!(class = %class.name, "instantiate");
        let instance = Rc::new(Instance::new(class.clone()));
        for cls in class.lineage() {
            // Member bindings belong to the instance, never to the declaring scope.
            let scope = cls.env.sealed_child();
            scope.define(keyword::SELF, Value::Instance(instance.clone()));
            if let Flow::Return(_) = self.nested(|interp| interp.exec_block(&cls.members, &scope))? {
                return Err(RuntimeError::type_error(format!("返却 is not allowed in the body of class '{}'", cls.name)));
            }
            for (name, value) in scope.vars_snapshot() {
                if name != keyword::SELF {
                    instance.set_field(name, value);
                }
            }
        }
        Ok(Value::Instance(instance))
    }

    /// Assign `owner.field` for a dotted declaration name.
    pub(crate) fn set_member(&mut self, owner: &str, field: &str, value: Value, env: &Env) -> Result<()> {
        match lookup(owner, env)? {
            Value::Instance(inst) => {
                inst.set_field(field, value);
                Ok(())
            }
            other => Err(RuntimeError::type_error(format!("cannot set field '{}' on a {}", field, other.type_name()))),
        }
    }
}

/// Resolve a name or dotted member path.
fn lookup(path: &str, env: &Env) -> Result<Value> {
    let mut parts = path.split('.');
    let head = parts.next().unwrap_or(path);
    let mut value = env.get(head).ok_or_else(|| RuntimeError::UndefinedVariable(head.to_string()))?;
    for member in parts {
        value = member_of(&value, member).ok_or_else(|| match &value {
            Value::Instance(_) | Value::Enum(_) | Value::Class(_) => RuntimeError::UndefinedVariable(path.to_string()),
            other => RuntimeError::type_error(format!("a {} has no member '{}'", other.type_name(), member)),
        })?;
    }
    Ok(value)
}

fn member_of(value: &Value, member: &str) -> Option<Value> {
    match value {
        Value::Instance(inst) => inst
            .get_field(member)
            .or_else(|| inst.class.find_method(member).map(|m| Value::Function(bind_self(&m, value.clone())))),
        Value::Enum(e) => e.ordinal(member).map(|n| Value::Number(n as f64)),
        Value::Class(class) => class.find_static(member).map(Value::Function),
        _ => None,
    }
}

/// A copy of `method` whose scope has `自身` bound to the receiver.
fn bind_self(method: &Function, receiver: Value) -> Rc<Function> {
    let closure = method.closure.child();
    closure.define(keyword::SELF, receiver);
    Rc::new(Function { name: method.name.clone(), params: method.params.clone(), body: method.body.clone(), closure })
}

fn apply_binary(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Eq => Ok(Value::Bool(l == r)),
        Ne => Ok(Value::Bool(l != r)),
        Add => match (l, r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (l, r) => Err(mismatch(op, &l, &r)),
        },
        Sub | Mul | Div => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(match op {
                Sub => a - b,
                Mul => a * b,
                _ => a / b,
            })),
            _ => Err(mismatch(op, &l, &r)),
        },
        Lt | Gt | Le | Ge => {
            let ordering = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, &l, &r)),
            };
            let result = match ordering {
                Some(o) => match op {
                    Lt => o.is_lt(),
                    Gt => o.is_gt(),
                    Le => o.is_le(),
                    _ => o.is_ge(),
                },
                // NaN compares false with everything
                None => false,
            };
            Ok(Value::Bool(result))
        }
    }
}

fn mismatch(op: BinaryOp, l: &Value, r: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("cannot apply '{}' to {} and {}", op, l.type_name(), r.type_name()))
}
