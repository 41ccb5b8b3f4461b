//! Runtime errors raised while executing a program.

use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// The interpreter was handed a node it cannot execute in that position.
    #[error("Unknown node kind '{0}'")]
    UnknownNodeKind(String),

    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("Unknown class '{0}'")]
    UnknownClass(String),

    #[error("Type error: {0}")]
    TypeError(String),

    /// A value raised by `投げる`. The only kind a script can catch.
    #[error("Uncaught exception: {0}")]
    Exception(Value),

    #[error("Module error: {0}")]
    Module(String),

    /// Script calls nested deeper than the interpreter's limit.
    #[error("Stack overflow: call depth exceeded {depth}")]
    StackOverflow { depth: usize },
}

impl RuntimeError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        RuntimeError::TypeError(msg.into())
    }

    pub fn module(msg: impl Into<String>) -> Self {
        RuntimeError::Module(msg.into())
    }

    /// Short label used by the CLI when rendering the error.
    pub fn label(&self) -> &'static str {
        match self {
            RuntimeError::UnknownNodeKind(_) => "Internal error",
            RuntimeError::UndefinedVariable(_) => "Name error",
            RuntimeError::UnknownClass(_) => "Name error",
            RuntimeError::TypeError(_) => "Type error",
            RuntimeError::Exception(_) => "Uncaught exception",
            RuntimeError::Module(_) => "Module error",
            RuntimeError::StackOverflow { .. } => "Stack overflow",
        }
    }
}

/// Convenient alias for interpreter results.
pub type Result<T> = std::result::Result<T, RuntimeError>;
