//! Main interpreter engine: statement execution and module loading.

use std::collections::HashMap;
use std::rc::Rc;

use kotoba_syntax::ast::{DeclKind, Node, Pattern};
use tracing::{debug, trace};

use crate::builtins::Builtins;
use crate::env::Env;
use crate::error::{Result, RuntimeError};
use crate::flow::Flow;
use crate::module::{Exports, ModuleLoader, NoModules};
use crate::output::{OutputSink, StdoutSink};
use crate::value::{Class, Enumeration, Function, Value};

/// Nesting limit for script calls and instantiations.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

pub struct Interpreter {
    /// Native functions, resolved before user bindings
    pub(crate) builtins: Builtins,
    pub(crate) out: Box<dyn OutputSink>,
    loader: Box<dyn ModuleLoader>,
    /// Exports of every module loaded so far
    modules: HashMap<String, Exports>,
    /// Modules currently being evaluated, outermost first
    loading: Vec<String>,
    pub(crate) call_depth: usize,
    pub(crate) max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            builtins: Builtins::standard(),
            out: Box::new(StdoutSink),
            loader: Box::new(NoModules),
            modules: HashMap::new(),
            loading: Vec::new(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_output(mut self, out: impl OutputSink + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Forget every cached module.
    pub fn reset(&mut self) {
        self.modules.clear();
        self.loading.clear();
        self.call_depth = 0;
    }

    pub fn builtin_names(&self) -> Vec<String> {
        self.builtins.names()
    }

    /// Run a program in a fresh root scope.
    pub fn run(&mut self, program: &Node) -> Result<Option<Value>> {
        self.run_with_env(program, &Env::new_root())
    }

    /// Run a program in `env`. The result is the value of a top-level `返却`, if any.
    pub fn run_with_env(&mut self, program: &Node, env: &Env) -> Result<Option<Value>> {
        match program {
            Node::Program { statements } => self.execute(statements, env),
            other => self.execute(std::slice::from_ref(other), env),
        }
    }

    /// Execute statements in order against `env`, stopping at the first return.
    pub fn execute(&mut self, statements: &[Node], env: &Env) -> Result<Option<Value>> {
        match self.exec_block(statements, env)? {
            Flow::Normal => Ok(None),
            Flow::Return(v) => Ok(Some(v)),
        }
    }

    pub(crate) fn exec_block(&mut self, body: &[Node], env: &Env) -> Result<Flow> {
        for stmt in body {
            if let Flow::Return(v) = self.exec_stmt(stmt, env)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Node, env: &Env) -> Result<Flow> {
        trace!(kind = stmt.kind_name(), "exec");
        match stmt {
            Node::FunctionDeclaration { name, params, body } => {
                debug!(name = %name, params = params.len(), "declare function");
                let func = Function { name: name.clone(), params: params.clone(), body: body.clone(), closure: env.clone() };
                env.define(name.clone(), Value::Function(Rc::new(func)));
                Ok(Flow::Normal)
            }
            Node::VariableDeclaration { kind, name, value } => {
                let v = self.evaluate(value, env)?;
                if let Some((owner, field)) = name.rsplit_once('.') {
                    self.set_member(owner, field, v, env)?;
                } else {
                    match kind {
                        DeclKind::Let => env.define(name.clone(), v),
                        DeclKind::Var => env.set_or_define(name, v),
                    }
                }
                Ok(Flow::Normal)
            }
            Node::ClassDeclaration { name, super_class, body } => {
                self.declare_class(name, super_class.as_deref(), body, env)?;
                Ok(Flow::Normal)
            }
            Node::EnumDeclaration { name, values } => {
                debug!(name = %name, variants = values.len(), "declare enum");
                env.define(name.clone(), Value::Enum(Rc::new(Enumeration::new(name.clone(), values.clone()))));
                Ok(Flow::Normal)
            }
            Node::StaticMethodDeclaration { class_name, name, body } => {
                let class = match env.get(class_name) {
                    Some(Value::Class(c)) => c,
                    _ => return Err(RuntimeError::UnknownClass(class_name.clone())),
                };
                attach_static(&class, name, body, env);
                Ok(Flow::Normal)
            }
            Node::NewExpression { .. } | Node::CallExpression { .. } | Node::TypeCheck { .. } => {
                self.evaluate(stmt, env)?;
                Ok(Flow::Normal)
            }
            Node::IfStatement { condition, consequent, alternate } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.exec_block(consequent, &env.child())
                } else if let Some(alt) = alternate {
                    self.exec_block(alt, &env.child())
                } else {
                    Ok(Flow::Normal)
                }
            }
            Node::PatternMatching { expression, cases } => {
                let subject = self.evaluate(expression, env)?;
                for case in cases {
                    let matched = match &case.pattern {
                        Pattern::Default => true,
                        Pattern::Value(p) => self.evaluate(p, env)? == subject,
                    };
                    if !matched {
                        continue;
                    }
                    if let Some(guard) = &case.guard {
                        if !self.evaluate(guard, env)?.is_truthy() {
                            continue;
                        }
                    }
                    return self.exec_block(&case.body, &env.child());
                }
                Ok(Flow::Normal)
            }
            Node::LoopStatement { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    if let Flow::Return(v) = self.exec_block(body, &env.child())? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            Node::TryCatchStatement { try_block, catch_param, catch_block } => {
                match self.exec_block(try_block, &env.child()) {
                    Err(RuntimeError::Exception(thrown)) => {
                        debug!(value = %thrown, "caught exception");
                        let scope = env.child();
                        scope.define(catch_param.clone(), thrown);
                        self.exec_block(catch_block, &scope)
                    }
                    other => other,
                }
            }
            Node::ImportStatement { module_name } => {
                for (name, value) in self.load_module(module_name)? {
                    env.define(name, value);
                }
                Ok(Flow::Normal)
            }
            Node::ExportStatement { name, value } => {
                let v = self.evaluate(value, env)?;
                env.define(name.clone(), v);
                env.mark_exported(name);
                Ok(Flow::Normal)
            }
            Node::ReturnStatement { value } => Ok(Flow::Return(self.evaluate(value, env)?)),
            Node::ThrowStatement { value } => Err(RuntimeError::Exception(self.evaluate(value, env)?)),
            Node::Program { .. } | Node::BinaryExpression { .. } | Node::Identifier { .. } | Node::Literal { .. } => {
                Err(RuntimeError::UnknownNodeKind(stmt.kind_name().to_string()))
            }
        }
    }

    fn declare_class(&mut self, name: &str, super_class: Option<&str>, body: &[Node], env: &Env) -> Result<()> {
        let super_class = match super_class {
            Some(s) => match env.get(s) {
                Some(Value::Class(c)) => Some(c),
                _ => return Err(RuntimeError::UnknownClass(s.to_string())),
            },
            None => None,
        };
        let mut members = Vec::new();
        let mut methods = HashMap::new();
        let mut statics = Vec::new();
        for member in body {
            match member {
                Node::FunctionDeclaration { name, params, body } => {
                    let method = Function { name: name.clone(), params: params.clone(), body: body.clone(), closure: env.clone() };
                    methods.insert(name.clone(), Rc::new(method));
                }
                Node::StaticMethodDeclaration { class_name, name: method, body } => {
                    if class_name != name {
                        return Err(RuntimeError::type_error(format!(
                            "static method '{}.{}' declared inside class '{}'",
                            class_name, method, name
                        )));
                    }
                    statics.push((method, body));
                }
                Node::ReturnStatement { .. } => {
                    return Err(RuntimeError::type_error(format!("返却 is not allowed in the body of class '{}'", name)));
                }
                other => members.push(other.clone()),
            }
        }
        debug!(name = %name, methods = methods.len(), statics = statics.len(), "declare class");
        let class = Rc::new(Class {
            name: name.to_string(),
            super_class,
            members,
            methods,
            statics: Default::default(),
            env: env.clone(),
        });
        for (method, body) in statics {
            attach_static(&class, method, body, env);
        }
        env.define(name, Value::Class(class));
        Ok(())
    }

    /// The `loadModule` hook: run a module once and hand back its bindings.
    pub fn load_module(&mut self, name: &str) -> Result<Exports> {
        if let Some(exports) = self.modules.get(name) {
            return Ok(exports.clone());
        }
        if self.loading.iter().any(|m| m == name) {
            let chain = self.loading.join(" -> ");
            return Err(RuntimeError::module(format!("cyclic import of '{}' ({} -> {})", name, chain, name)));
        }
        debug!(module = %name, "import");
        self.loading.push(name.to_string());
        let result = self.evaluate_module(name);
        self.loading.pop();
        let exports = result?;
        self.modules.insert(name.to_string(), exports.clone());
        Ok(exports)
    }

    fn evaluate_module(&mut self, name: &str) -> Result<Exports> {
        let statements = self.loader.load(name)?;
        let env = Env::new_root();
        self.execute(&statements, &env)?;
        Ok(env.vars_snapshot().into_iter().collect())
    }
}

fn attach_static(class: &Rc<Class>, name: &str, body: &[Node], env: &Env) {
    debug!(class = %class.name, name = %name, "attach static method");
    let func = Function { name: format!("{}.{}", class.name, name), params: Vec::new(), body: body.to_vec(), closure: env.clone() };
    class.statics.borrow_mut().insert(name.to_string(), Rc::new(func));
}
