//! Image I/O, display binding and image processing.
//!
//! `normalize`, `outline` and `quantize` rewrite their image in place; the
//! other filters return a new image.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::process::{self, PixelSelector};
use crate::render::{load_image, save_image};
use crate::runtime::state::ProgramState;
use crate::runtime::value::Handle;
use crate::types::{canvas as blank_canvas, Colour};

use super::{
    assert_arity, assert_arity_range, pop_colour, pop_count, pop_image, pop_number, pop_string,
    with_image, with_image_mut, Builtin, Outcome,
};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("load", load),
    ("save", save),
    ("show", show),
    ("normalize", normalize),
    ("outline", outline),
    ("pixelize", pixelize),
    ("blur", blur),
    ("canvas", canvas),
    ("width", width),
    ("height", height),
];

fn load(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let path = pop_string(stack)?;
    Ok(Outcome::value(load_image(Path::new(&path))?))
}

/// `save(image, path)` returns the image.
fn save(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let path = pop_string(stack)?;
    let image = pop_image(stack)?;
    with_image(&image, |img| save_image(img, Path::new(&path)))??;
    Ok(Outcome::Value(image))
}

/// Bind the image to the live display.
fn show(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let image = pop_image(stack)?;
    state.show(image.clone())?;
    Ok(Outcome::Value(image))
}

fn normalize(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let image = pop_image(stack)?;
    with_image_mut(&image, process::normalize)?;
    state.maybe_refresh(&image);
    Ok(Outcome::Value(image))
}

/// `outline(image, strength)`
fn outline(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let strength = pop_number(stack)?;
    let image = pop_image(stack)?;
    with_image_mut(&image, |img| process::outline(img, strength))?;
    state.maybe_refresh(&image);
    Ok(Outcome::Value(image))
}

/// `pixelize(image, max_w, max_h[, selector])`
fn pixelize(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 3, 4)?;
    let selector = if stack.len() == 4 {
        pop_string(stack)?
    } else {
        state
            .config_string("cfg_selector")
            .unwrap_or_else(|| Config::default().selector)
    };
    let selector: PixelSelector = selector.parse()?;
    let max_height = pop_count(stack)?;
    let max_width = pop_count(stack)?;
    let image = pop_image(stack)?;
    let out = with_image(&image, |img| process::pixelize(img, max_width, max_height, selector))?;
    Ok(Outcome::value(out))
}

/// `blur(image[, times])`
fn blur(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 1, 2)?;
    let times = if stack.len() == 2 { pop_count(stack)? } else { 1 };
    let image = pop_image(stack)?;
    let out = with_image(&image, |img| process::blur(img, times as usize))?;
    Ok(Outcome::value(out))
}

/// `canvas(w, h[, colour])`, white unless a colour is given.
fn canvas(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 2, 3)?;
    let fill = if stack.len() == 3 { pop_colour(stack)? } else { Colour::WHITE };
    let height = pop_count(stack)?;
    let width = pop_count(stack)?;
    Ok(Outcome::value(blank_canvas(width, height, fill)))
}

fn width(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let image = pop_image(stack)?;
    Ok(Outcome::value(with_image(&image, |img| img.width() as f32)?))
}

fn height(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let image = pop_image(stack)?;
    Ok(Outcome::value(with_image(&image, |img| img.height() as f32)?))
}
