//! Colour strategies, quantizers and `quantize`.

use crate::config::Config;
use crate::error::Result;
use crate::quantize::{ColourStrategy, Picker, Quantizer, Sparsity};
use crate::runtime::state::ProgramState;
use crate::runtime::value::Handle;
use crate::types::BuiltinMatrices;

use super::{
    assert_arity, assert_arity_range, pop_count, pop_image, pop_number, pop_palette,
    pop_quantizer, pop_strategy, pop_string, with_image_mut, Builtin, Outcome,
};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("closest_rgb", closest_rgb),
    ("closest_gray", closest_gray),
    ("closest_hue", closest_hue),
    ("identity", identity),
    ("discrete_rgb", discrete_rgb),
    ("discrete_hsv", discrete_hsv),
    ("direct", direct),
    ("dither_fs", dither_fs),
    ("dither_ord", dither_ord),
    ("quantize", quantize),
];

fn closest(stack: &mut Vec<Handle>, picker: Picker) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let palette = pop_palette(stack)?;
    Ok(Outcome::value(ColourStrategy::closest(palette, picker)))
}

fn closest_rgb(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    closest(stack, Picker::Rgb)
}

fn closest_gray(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    closest(stack, Picker::Gray)
}

fn closest_hue(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    closest(stack, Picker::Hue)
}

fn identity(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 0)?;
    Ok(Outcome::value(ColourStrategy::Identity))
}

/// `discrete_rgb(levels)` or `discrete_rgb(r, g, b)`.
fn discrete_rgb(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 1, 3)?;
    let [r, g, b] = pop_levels(stack)?;
    Ok(Outcome::value(ColourStrategy::discrete_rgb(r, g, b)))
}

fn discrete_hsv(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 3)?;
    let [h, s, v] = pop_levels(stack)?;
    Ok(Outcome::value(ColourStrategy::discrete_hsv(h, s, v)))
}

/// One count for all three channels, or three counts in channel order.
fn pop_levels(stack: &mut Vec<Handle>) -> Result<[u32; 3]> {
    if stack.len() == 1 {
        let n = pop_count(stack)?;
        return Ok([n; 3]);
    }
    assert_arity(stack, 3)?;
    let c = pop_count(stack)?;
    let b = pop_count(stack)?;
    let a = pop_count(stack)?;
    Ok([a, b, c])
}

fn direct(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 0)?;
    Ok(Outcome::value(Quantizer::Direct))
}

fn default_threshold(state: &ProgramState) -> f32 {
    state
        .config_number("cfg_threshold")
        .unwrap_or(Config::default().threshold)
}

/// `dither_fs([threshold])`
fn dither_fs(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 0, 1)?;
    let threshold = if stack.len() == 1 {
        pop_number(stack)?
    } else {
        default_threshold(state)
    };
    Ok(Outcome::value(Quantizer::floyd_steinberg(threshold)))
}

/// `dither_ord([matrix, sparsity, threshold])`
///
/// Without a sparsity the strategy passed to `quantize` picks one, falling
/// back to `cfg_sparsity`.
fn dither_ord(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 0, 3)?;
    let threshold = if stack.len() == 3 {
        pop_number(stack)?
    } else {
        default_threshold(state)
    };
    let sparsity = if stack.len() == 2 {
        Sparsity::Fixed(pop_number(stack)?)
    } else {
        Sparsity::Auto {
            fallback: state
                .config_number("cfg_sparsity")
                .unwrap_or(Config::default().sparsity),
        }
    };
    let name = if stack.len() == 1 {
        pop_string(stack)?
    } else {
        state
            .config_string("cfg_matrix")
            .unwrap_or_else(|| Config::default().matrix)
    };
    let matrix = BuiltinMatrices::resolve(&name)?;
    Ok(Outcome::value(Quantizer::ordered(matrix, sparsity, threshold)))
}

/// `quantize(image, strategy, quantizer)` rewrites the image in place and
/// returns it.
fn quantize(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 3)?;
    let quantizer = pop_quantizer(stack)?;
    let strategy = pop_strategy(stack)?;
    let image = pop_image(stack)?;
    with_image_mut(&image, |img| quantizer.apply(img, &strategy))?;
    state.maybe_refresh(&image);
    Ok(Outcome::Value(image))
}
