//! The `取込` hook: turning a module name into its statements.

use std::collections::HashMap;

use kotoba_syntax::ast::Node;

use crate::error::{Result, RuntimeError};
use crate::value::Value;

/// Bindings a module makes available to its importer.
pub type Exports = HashMap<String, Value>;

/// Resolves a module name to its lowered top-level statements.
///
/// Caching and cycle detection are done by the interpreter; a loader only
/// has to find and compile the source.
pub trait ModuleLoader {
    fn load(&mut self, name: &str) -> Result<Vec<Node>>;
}

/// Rejects every import.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoModules;

impl ModuleLoader for NoModules {
    fn load(&mut self, name: &str) -> Result<Vec<Node>> {
        Err(RuntimeError::module(format!("cannot import '{}': no module loader configured", name)))
    }
}

/// Modules held in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct MemoryModules {
    modules: HashMap<String, Vec<Node>>,
}

impl MemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. A `Program` node is unwrapped into its statements.
    pub fn insert(&mut self, name: impl Into<String>, module: Node) {
        let statements = match module {
            Node::Program { statements } => statements,
            other => vec![other],
        };
        self.modules.insert(name.into(), statements);
    }

    pub fn with_module(mut self, name: impl Into<String>, module: Node) -> Self {
        self.insert(name, module);
        self
    }
}

impl ModuleLoader for MemoryModules {
    fn load(&mut self, name: &str) -> Result<Vec<Node>> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::module(format!("module '{}' not found", name)))
    }
}
