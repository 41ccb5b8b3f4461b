//! Environment and bindings for the Kotoba interpreter.
//!
//! Scopes are shared, parent-linked and mutable: a child never copies its
//! parent's bindings, so a write through any handle is seen by every closure
//! holding the same scope.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

#[derive(Default)]
struct Scope {
    /// Variables defined in this scope
    vars: HashMap<String, Value>,
    /// Names bound with `公開`
    exported: HashSet<String>,
    /// Enclosing scope (None for a root scope)
    parent: Option<Env>,
    /// `定義` never rebinds past this scope
    sealed: bool,
}

/// A handle to one scope in the chain. Cloning shares the scope.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
    pub fn new_root() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Env {
        Env(Rc::new(RefCell::new(Scope { parent: Some(self.clone()), ..Scope::default() })))
    }

    /// A child whose `定義` bindings stay local even when an outer scope
    /// has the same name. Used for class member bodies.
    pub fn sealed_child(&self) -> Env {
        Env(Rc::new(RefCell::new(Scope { parent: Some(self.clone()), sealed: true, ..Scope::default() })))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let scope = self.0.borrow();
        match scope.vars.get(name) {
            Some(v) => Some(v.clone()),
            None => scope.parent.as_ref().and_then(|p| p.get(name)),
        }
    }

    /// Bind in this scope, shadowing any outer binding.
    pub fn define(&self, name: impl Into<String>, val: Value) {
        self.0.borrow_mut().vars.insert(name.into(), val);
    }

    /// `定義` semantics: mutate the nearest binding, or define here if there is none.
    pub fn set_or_define(&self, name: &str, val: Value) {
        match self.owner(name) {
            Some(owner) => owner.define(name, val),
            None => self.define(name, val),
        }
    }

    fn owner(&self, name: &str) -> Option<Env> {
        let scope = self.0.borrow();
        if scope.vars.contains_key(name) {
            Some(self.clone())
        } else if scope.sealed {
            None
        } else {
            scope.parent.as_ref().and_then(|p| p.owner(name))
        }
    }

    pub fn mark_exported(&self, name: &str) {
        self.0.borrow_mut().exported.insert(name.to_string());
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.0.borrow().exported.contains(name)
    }

    /// Bindings of this scope only, sorted by name.
    pub fn vars_snapshot(&self) -> Vec<(String, Value)> {
        let mut vars: Vec<(String, Value)> =
            self.0.borrow().vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    /// Every binding visible from here, innermost scope first. Shadowed
    /// bindings are skipped; the flag marks exported names.
    pub fn visible(&self) -> Vec<(String, Value, bool)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut current = Some(self.clone());
        while let Some(env) = current {
            for (name, value) in env.vars_snapshot() {
                if seen.insert(name.clone()) {
                    let exported = env.is_exported(&name);
                    out.push((name, value, exported));
                }
            }
            current = env.0.borrow().parent.clone();
        }
        out
    }
}

impl fmt::Debug for Env {
    // Values can hold their own defining scope, so only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<&String> = scope.vars.keys().collect();
        names.sort();
        f.debug_struct("Env").field("vars", &names).field("has_parent", &scope.parent.is_some()).finish()
    }
}
