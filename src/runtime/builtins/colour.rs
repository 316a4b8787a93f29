//! Colour constructors, accessors and per-colour transforms.
//!
//! Transforms accept a colour or a palette; palettes are transformed
//! element-wise.

use crate::error::{MipaError, Result};
use crate::runtime::state::ProgramState;
use crate::runtime::value::{Handle, Value};
use crate::types::{Colour, Hsv};

use super::{assert_arity, assert_arity_range, pop, pop_colour, pop_number, pop_string, Builtin, Outcome};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("rgb", rgb),
    ("hsv", hsv),
    ("hex", hex),
    ("hue", hue),
    ("sat", sat),
    ("val", val),
    ("brightness", brightness),
    ("shift", shift),
    ("lighten", lighten),
    ("darken", darken),
    ("saturate", saturate),
    ("desaturate", desaturate),
    ("set_sat", set_sat),
    ("gray", gray),
    ("mix", mix),
];

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Pop a colour or palette and transform every colour in it.
fn map_colours(stack: &mut Vec<Handle>, f: impl Fn(Colour) -> Colour) -> Result<Outcome> {
    let target = pop(stack)?;
    let value = target.read();
    match &*value {
        Value::Colour(c) => Ok(Outcome::value(f(*c))),
        Value::Palette(p) => Ok(Outcome::value(p.map(f))),
        other => Err(MipaError::type_error("colour or palette", other.value_type())),
    }
}

/// `rgb(r, g, b[, a])`
fn rgb(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 3, 4)?;
    let a = if stack.len() == 4 { channel(pop_number(stack)?) } else { 255 };
    let b = channel(pop_number(stack)?);
    let g = channel(pop_number(stack)?);
    let r = channel(pop_number(stack)?);
    Ok(Outcome::value(Colour::new(r, g, b, a)))
}

/// `hsv(h, s, v[, a])` with hue in degrees and `s`, `v` in `[0, 1]`.
fn hsv(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 3, 4)?;
    let a = if stack.len() == 4 { channel(pop_number(stack)?) } else { 255 };
    let v = pop_number(stack)?;
    let s = pop_number(stack)?;
    let h = pop_number(stack)?;
    Ok(Outcome::value(Hsv::new(h, s, v, a).to_colour()))
}

/// `hex("#rrggbb")`
fn hex(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let text = pop_string(stack)?;
    Ok(Outcome::value(Colour::from_hex(&text)?))
}

fn hsv_component(stack: &mut Vec<Handle>, f: fn(Hsv) -> f32) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let colour = pop_colour(stack)?;
    Ok(Outcome::value(f(colour.to_hsv())))
}

fn hue(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    hsv_component(stack, |hsv| hsv.h)
}

fn sat(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    hsv_component(stack, |hsv| hsv.s)
}

fn val(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    hsv_component(stack, |hsv| hsv.v)
}

/// Perceptual gray value in `[0, 1)`.
fn brightness(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop_colour(stack)?.gray_value()))
}

/// `shift(c|p, degrees)`
fn shift(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let degrees = pop_number(stack)?;
    map_colours(stack, |c| c.shift_hue(degrees))
}

/// `lighten(c|p, percent)`
fn lighten(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let percent = pop_number(stack)?;
    map_colours(stack, |c| c.adjust_lightness(percent))
}

fn darken(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let percent = pop_number(stack)?;
    map_colours(stack, |c| c.adjust_lightness(-percent))
}

fn saturate(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let percent = pop_number(stack)?;
    map_colours(stack, |c| c.adjust_saturation(percent))
}

fn desaturate(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let percent = pop_number(stack)?;
    map_colours(stack, |c| c.adjust_saturation(-percent))
}

/// `set_sat(c|p, t)` replaces HSV saturation.
fn set_sat(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let t = pop_number(stack)?;
    map_colours(stack, |c| c.with_saturation(t))
}

fn gray(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    map_colours(stack, Colour::gray_scale)
}

/// `mix(a, b, t)`: `t = 0` is `a`, `t = 1` is `b`.
fn mix(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 3)?;
    let t = pop_number(stack)?;
    let to = pop_colour(stack)?;
    let from = pop_colour(stack)?;
    Ok(Outcome::value(from.lerp(to, t)))
}
