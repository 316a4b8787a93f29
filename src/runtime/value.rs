//! Runtime values and the shared handles that bind them to names.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::quantize::{ColourStrategy, Quantizer};
use crate::types::{Colour, Image, Palette};

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    String,
    Colour,
    Palette,
    Image,
    Strategy,
    Quantizer,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Colour => "colour",
            ValueType::Palette => "palette",
            ValueType::Image => "image",
            ValueType::Strategy => "colour_strategy",
            ValueType::Quantizer => "quantizer",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every datum a script can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    String(String),
    Colour(Colour),
    Palette(Palette),
    Image(Image),
    Strategy(ColourStrategy),
    Quantizer(Quantizer),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Colour(_) => ValueType::Colour,
            Value::Palette(_) => ValueType::Palette,
            Value::Image(_) => ValueType::Image,
            Value::Strategy(_) => ValueType::Strategy,
            Value::Quantizer(_) => ValueType::Quantizer,
        }
    }

    /// Human-readable rendering; strings are quoted.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Colour(c) => write!(f, "{}", c),
            Value::Palette(p) => write!(f, "{}", p),
            Value::Image(img) => write!(f, "<image {}x{}>", img.width(), img.height()),
            Value::Strategy(s) => write!(f, "{}", s),
            Value::Quantizer(q) => write!(f, "{}", q),
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Colour> for Value {
    fn from(c: Colour) -> Self {
        Value::Colour(c)
    }
}

impl From<Palette> for Value {
    fn from(p: Palette) -> Self {
        Value::Palette(p)
    }
}

impl From<Image> for Value {
    fn from(img: Image) -> Self {
        Value::Image(img)
    }
}

impl From<ColourStrategy> for Value {
    fn from(s: ColourStrategy) -> Self {
        Value::Strategy(s)
    }
}

impl From<Quantizer> for Value {
    fn from(q: Quantizer) -> Self {
        Value::Quantizer(q)
    }
}

/// A counted, shareable reference to a value.
///
/// Cloning a handle shares the value; [`Handle::deep_copy`] duplicates it.
/// The reference count is the number of live clones: bindings, save-stack
/// entries, pending constants and the display slot each hold one.
#[derive(Debug, Clone)]
pub struct Handle(Arc<RwLock<Value>>);

impl Handle {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Shared access. A panic in another holder does not poison the value.
    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live references to the value.
    pub fn count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Whether both handles reference the same value.
    pub fn same(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// An independent value with a count of one.
    pub fn deep_copy(&self) -> Handle {
        Handle::new(self.read().clone())
    }

    pub fn value_type(&self) -> ValueType {
        self.read().value_type()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::Picker;
    use crate::types::canvas;

    #[test]
    fn test_tags_never_change_on_copy() {
        let values: Vec<Value> = vec![
            2.5f32.into(),
            "x".into(),
            Colour::WHITE.into(),
            Palette::new().into(),
            canvas(1, 1, Colour::BLACK).into(),
            ColourStrategy::Identity.into(),
            Quantizer::Direct.into(),
        ];
        for value in values {
            let handle = Handle::new(value.clone());
            assert_eq!(handle.deep_copy().value_type(), value.value_type());
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Number(3.0).render(), "3");
        assert_eq!(Value::String("hi".into()).render(), "\"hi\"");
        assert_eq!(Value::Image(canvas(4, 2, Colour::BLACK)).render(), "<image 4x2>");
        let strategy = ColourStrategy::closest(
            Palette::from_colours(vec![Colour::BLACK, Colour::WHITE]),
            Picker::Hue,
        );
        insta::assert_snapshot!(Value::Strategy(strategy).render(), @"closest_hue(2 colours)");
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = Handle::new(Palette::from_colours(vec![Colour::BLACK]));
        let copy = original.deep_copy();
        assert_eq!(copy.count(), 1);
        assert!(!copy.same(&original));

        if let Value::Palette(p) = &mut *copy.write() {
            p.push(Colour::WHITE);
        }
        assert_eq!(original.read().render(), "[#000000]");
        assert_eq!(copy.read().render(), "[#000000, #FFFFFF]");
    }

    #[test]
    fn test_clone_shares() {
        let a = Handle::new(1.0f32);
        let b = a.clone();
        assert_eq!(a.count(), 2);
        *b.write() = Value::Number(2.0);
        assert_eq!(*a.read(), Value::Number(2.0));
        drop(b);
        assert_eq!(a.count(), 1);
    }
}
