use std::fs;
use std::path::PathBuf;

use kotoba_interpreter::{ModuleLoader, Result, RuntimeError};
use kotoba_syntax::ast::Node;
use tracing::debug;

use crate::pipeline;

pub const EXTENSION: &str = "ktb";

/// Finds `<dir>/<name>.ktb` along a search path and compiles it.
pub struct FileLoader {
    search_path: Vec<PathBuf>,
}

impl FileLoader {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(|dir| dir.join(format!("{}.{}", name, EXTENSION)))
            .find(|candidate| candidate.is_file())
    }
}

impl ModuleLoader for FileLoader {
    fn load(&mut self, name: &str) -> Result<Vec<Node>> {
        let Some(path) = self.resolve(name) else {
            let dirs: Vec<String> = self.search_path.iter().map(|d| d.display().to_string()).collect();
            return Err(RuntimeError::module(format!(
                "module '{}' not found (searched: {})",
                name,
                if dirs.is_empty() { "<nothing>".to_string() } else { dirs.join(", ") }
            )));
        };
        debug!(module = %name, path = %path.display(), "loading module file");
        let source = fs::read_to_string(&path)
            .map_err(|e| RuntimeError::module(format!("Failed to read {}: {}", path.display(), e)))?;
        let program = pipeline::compile(&source)
            .map_err(|e| RuntimeError::module(format!("{} in {}: {}", e.kind.label(), path.display(), e)))?;
        match program {
            Node::Program { statements } => Ok(statements),
            other => Ok(vec![other]),
        }
    }
}
