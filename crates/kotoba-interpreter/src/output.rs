//! Where `表示` output goes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

pub trait OutputSink {
    fn emit(&mut self, value: &Value);
}

/// Prints each value on its own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, value: &Value) {
        println!("{}", value);
    }
}

/// Records emitted values. Clones share the same buffer, so a test can keep
/// one handle while the interpreter owns the other.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink(Rc<RefCell<Vec<Value>>>);

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().iter().map(|v| v.to_string()).collect()
    }
}

impl OutputSink for CaptureSink {
    fn emit(&mut self, value: &Value) {
        self.0.borrow_mut().push(value.clone());
    }
}
