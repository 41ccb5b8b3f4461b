//! Control flow for the interpreter.

use crate::value::Value;

#[derive(Debug)]
pub(crate) enum Flow {
    /// Fall through to the next statement
    Normal,
    /// Unwind to the enclosing call (or end the program) with the given value
    Return(Value),
}
