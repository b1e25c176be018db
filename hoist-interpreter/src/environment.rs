//! Variable storage: one global frame plus a stack of call frames

use rustc_hash::FxHashMap;

use crate::error::{InterpreterError, InterpreterResult};
use crate::value::Value;

/// Bindings of one scope. Every variable a function declares, in any of
/// its nested bodies, lives in the function's single frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    bindings: FxHashMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` unless it is already bound, so a local redeclaring a
    /// parameter keeps the argument value.
    pub fn declare(&mut self, name: &str, value: Value) {
        self.bindings.entry(name.to_string()).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).copied()
    }

    /// Update an existing binding; returns false when `name` is not bound
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    globals: Frame,
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new(globals: Frame) -> Self {
        Self {
            globals,
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Number of active calls
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn lookup(&self, name: &str) -> InterpreterResult<Value> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| InterpreterError::NameError(name.to_string()))
    }

    pub fn assign(&mut self, name: &str, value: Value) -> InterpreterResult<()> {
        if let Some(frame) = self.frames.last_mut() {
            if frame.set(name, value) {
                return Ok(());
            }
        }
        if self.globals.set(name, value) {
            Ok(())
        } else {
            Err(InterpreterError::NameError(name.to_string()))
        }
    }
}
