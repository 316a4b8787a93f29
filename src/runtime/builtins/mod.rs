//! Built-in function table.
//!
//! Every built-in receives its arguments as a stack: the last argument is
//! on top and is popped first. Each returns a value, nothing, or the exit
//! signal.

mod colour;
mod image;
mod palette;
mod quantize;
mod session;

use std::collections::BTreeMap;

use crate::error::{MipaError, Result};
use crate::quantize::{ColourStrategy, Quantizer};
use crate::types::{Colour, Image, Palette};

use super::state::ProgramState;
use super::value::{Handle, Value, ValueType};

/// What a built-in produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Value(Handle),
    Nothing,
    /// Stop evaluating statements.
    Exit,
}

impl Outcome {
    pub fn value(value: impl Into<Value>) -> Self {
        Outcome::Value(Handle::new(value))
    }
}

pub type Builtin = fn(&mut ProgramState, &mut Vec<Handle>) -> Result<Outcome>;

/// Name to function table.
pub struct Builtins {
    table: BTreeMap<&'static str, Builtin>,
}

impl Builtins {
    /// Every built-in the language ships with.
    pub fn standard() -> Self {
        let mut table = BTreeMap::new();
        for (name, f) in colour::BUILTINS
            .iter()
            .chain(palette::BUILTINS)
            .chain(quantize::BUILTINS)
            .chain(image::BUILTINS)
            .chain(session::BUILTINS)
        {
            table.insert(*name, *f);
        }
        Self { table }
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.table.get(name).copied()
    }

    /// Look up and invoke `name`.
    pub fn call(&self, name: &str, state: &mut ProgramState, args: &mut Vec<Handle>) -> Result<Outcome> {
        let f = self
            .get(name)
            .ok_or_else(|| MipaError::UnknownFunction(name.to_string()))?;
        f(state, args)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.keys().copied()
    }
}

/// Fail unless exactly `n` arguments were passed.
pub fn assert_arity(stack: &[Handle], n: usize) -> Result<()> {
    if stack.len() != n {
        return Err(MipaError::Arity {
            expected: n.to_string(),
            actual: stack.len(),
        });
    }
    Ok(())
}

/// Fail unless between `min` and `max` arguments were passed.
pub fn assert_arity_range(stack: &[Handle], min: usize, max: usize) -> Result<()> {
    if stack.len() < min || stack.len() > max {
        return Err(MipaError::Arity {
            expected: format!("{} to {}", min, max),
            actual: stack.len(),
        });
    }
    Ok(())
}

/// Fail unless at least `min` arguments were passed.
pub fn assert_arity_min(stack: &[Handle], min: usize) -> Result<()> {
    if stack.len() < min {
        return Err(MipaError::Arity {
            expected: format!("at least {}", min),
            actual: stack.len(),
        });
    }
    Ok(())
}

/// Fail with a type error unless `value` has tag `expected`.
pub fn assert_type(value: &Handle, expected: ValueType) -> Result<()> {
    let actual = value.value_type();
    if actual != expected {
        return Err(MipaError::type_error(expected, actual));
    }
    Ok(())
}

pub(crate) fn pop(stack: &mut Vec<Handle>) -> Result<Handle> {
    stack.pop().ok_or(MipaError::Arity {
        expected: "more".to_string(),
        actual: 0,
    })
}

pub(crate) fn pop_number(stack: &mut Vec<Handle>) -> Result<f32> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Number(n) => Ok(*n),
        other => Err(MipaError::type_error(ValueType::Number, other.value_type())),
    }
}

/// A number that must be a non-negative integer count.
pub(crate) fn pop_count(stack: &mut Vec<Handle>) -> Result<u32> {
    let n = pop_number(stack)?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(MipaError::type_error("non-negative integer", n));
    }
    Ok(n as u32)
}

pub(crate) fn pop_string(stack: &mut Vec<Handle>) -> Result<String> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::String(s) => Ok(s.clone()),
        other => Err(MipaError::type_error(ValueType::String, other.value_type())),
    }
}

pub(crate) fn pop_colour(stack: &mut Vec<Handle>) -> Result<Colour> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Colour(c) => Ok(*c),
        other => Err(MipaError::type_error(ValueType::Colour, other.value_type())),
    }
}

pub(crate) fn pop_palette(stack: &mut Vec<Handle>) -> Result<Palette> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Palette(p) => Ok(p.clone()),
        other => Err(MipaError::type_error(ValueType::Palette, other.value_type())),
    }
}

/// Pop an image by reference, for built-ins that rewrite it in place.
pub(crate) fn pop_image(stack: &mut Vec<Handle>) -> Result<Handle> {
    let handle = pop(stack)?;
    assert_type(&handle, ValueType::Image)?;
    Ok(handle)
}

/// Borrow the image behind `handle`.
pub(crate) fn with_image<T>(handle: &Handle, f: impl FnOnce(&Image) -> T) -> Result<T> {
    let value = handle.read();
    match &*value {
        Value::Image(image) => Ok(f(image)),
        other => Err(MipaError::type_error(ValueType::Image, other.value_type())),
    }
}

/// Rewrite the image behind `handle` in place.
pub(crate) fn with_image_mut<T>(handle: &Handle, f: impl FnOnce(&mut Image) -> T) -> Result<T> {
    let mut value = handle.write();
    match &mut *value {
        Value::Image(image) => Ok(f(image)),
        other => Err(MipaError::type_error(ValueType::Image, other.value_type())),
    }
}

pub(crate) fn pop_strategy(stack: &mut Vec<Handle>) -> Result<ColourStrategy> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Strategy(s) => Ok(s.clone()),
        other => Err(MipaError::type_error(ValueType::Strategy, other.value_type())),
    }
}

pub(crate) fn pop_quantizer(stack: &mut Vec<Handle>) -> Result<Quantizer> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Quantizer(q) => Ok(q.clone()),
        other => Err(MipaError::type_error(ValueType::Quantizer, other.value_type())),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for calling built-ins the way the evaluator does.

    use super::*;

    /// Push `args` in order and call `name`.
    pub fn call(state: &mut ProgramState, name: &str, args: Vec<Value>) -> Result<Outcome> {
        let mut stack: Vec<Handle> = args.into_iter().map(Handle::new).collect();
        Builtins::standard().call(name, state, &mut stack)
    }

    /// Like [`call`], expecting a value back.
    pub fn eval(state: &mut ProgramState, name: &str, args: Vec<Value>) -> Value {
        match call(state, name, args) {
            Ok(Outcome::Value(h)) => h.read().clone(),
            other => panic!("{name} returned {other:?}"),
        }
    }
}
