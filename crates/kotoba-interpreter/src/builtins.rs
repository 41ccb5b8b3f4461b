//! Native functions callable from scripts.
//!
//! The registry is plain data handed to the interpreter, so an embedder can
//! start from [`Builtins::standard`], add its own entries, or begin empty.

use std::collections::HashMap;

use crate::env::Env;
use crate::error::{Result, RuntimeError};
use crate::output::OutputSink;
use crate::value::Value;

/// What a native function can reach while it runs.
pub struct CallContext<'a> {
    pub out: &'a mut dyn OutputSink,
    /// Scope of the call site
    pub env: &'a Env,
}

pub type NativeFn = fn(&mut CallContext<'_>, Vec<Value>) -> Result<Value>;

#[derive(Clone)]
pub struct Builtins {
    table: HashMap<String, NativeFn>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

impl Builtins {
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// 表示, 調査, 長さ, 連結 and 含む.
    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        builtins
            .register("表示", call_print)
            .register("調査", call_inspect)
            .register("長さ", call_length)
            .register("連結", call_concat)
            .register("含む", call_contains);
        builtins
    }

    pub fn register(&mut self, name: impl Into<String>, f: NativeFn) -> &mut Self {
        self.table.insert(name.into(), f);
        self
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.table.get(name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.keys().cloned().collect();
        names.sort();
        names
    }
}

fn expect_arity(name: &str, args: &[Value], n: usize) -> Result<()> {
    if args.len() != n {
        return Err(RuntimeError::type_error(format!("{} expects {} argument(s), got {}", name, n, args.len())));
    }
    Ok(())
}

fn call_print(ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
    expect_arity("表示", &args, 1)?;
    ctx.out.emit(&args[0]);
    Ok(Value::Unit)
}

/// Dump every visible binding as one string.
fn call_inspect(ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
    expect_arity("調査", &args, 0)?;
    let lines: Vec<String> = ctx
        .env
        .visible()
        .into_iter()
        .map(|(name, value, exported)| {
            if exported {
                format!("{} = {} [公開]", name, value)
            } else {
                format!("{} = {}", name, value)
            }
        })
        .collect();
    ctx.out.emit(&Value::Str(lines.join("\n")));
    Ok(Value::Unit)
}

fn call_length(_ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
    expect_arity("長さ", &args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(RuntimeError::type_error(format!("長さ expects a string, got {}", other.type_name()))),
    }
}

fn call_concat(_ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
    if args.is_empty() {
        return Err(RuntimeError::type_error("連結 expects at least 1 argument"));
    }
    Ok(Value::Str(args.iter().map(|v| v.to_string()).collect()))
}

fn call_contains(_ctx: &mut CallContext<'_>, args: Vec<Value>) -> Result<Value> {
    expect_arity("含む", &args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(Value::Bool(haystack.contains(needle.as_str()))),
        (a, b) => Err(RuntimeError::type_error(format!(
            "含む expects two strings, got {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}
