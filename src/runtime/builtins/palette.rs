//! Palette construction, queries, generation and palette files.

use std::path::Path;

use crate::error::{MipaError, Result};
use crate::parser::read_palette;
use crate::process::{extract as extract_palette, ExtractMethod};
use crate::render::{write_palette, write_swatch};
use crate::runtime::state::ProgramState;
use crate::runtime::value::{Handle, Value, ValueType};
use crate::types::{Palette, Scheme, Spectre};

use super::{
    assert_arity, assert_arity_range, pop, pop_colour, pop_count, pop_image, pop_number,
    pop_palette, pop_string, with_image, Builtin, Outcome,
};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("palette", palette),
    ("at", at),
    ("len", len),
    ("gradient", gradient),
    ("sort_gray", sort_gray),
    ("dedup", dedup),
    ("reverse", reverse),
    ("scheme", scheme),
    ("spectre", spectre),
    ("extract", extract),
    ("load_palette", load_palette),
    ("save_palette", save_palette),
    ("swatch", swatch),
];

/// Cuts (median) or cube divisions (simple) when `extract` gets no depth.
const DEFAULT_EXTRACT_DEPTH: u32 = 3;

/// Swatch rows when none are given.
const DEFAULT_SWATCH_ROWS: u32 = 1;

/// Pop a colour or palette as a palette.
fn pop_colours(stack: &mut Vec<Handle>) -> Result<Palette> {
    let handle = pop(stack)?;
    let value = handle.read();
    match &*value {
        Value::Colour(c) => Ok(Palette::from_colours(vec![*c])),
        Value::Palette(p) => Ok(p.clone()),
        other => Err(MipaError::type_error("colour or palette", other.value_type())),
    }
}

/// `palette(c|p, ...)` concatenates its arguments in the order written.
fn palette(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    let mut parts = Vec::with_capacity(stack.len());
    while !stack.is_empty() {
        parts.push(pop_colours(stack)?);
    }

    let mut out = Palette::new();
    for part in parts.iter().rev() {
        out.extend_from(part);
    }
    Ok(Outcome::value(out))
}

/// `at(p, i)`
fn at(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let index = pop_number(stack)? as i64;
    let palette = pop_palette(stack)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| palette.get(i))
        .map(|colour| Outcome::value(colour))
        .ok_or(MipaError::OutOfRange {
            index,
            len: palette.len(),
        })
}

fn len(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop_palette(stack)?.len() as f32))
}

/// `gradient(from, to, steps)`; either end may be a single colour.
fn gradient(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 3)?;
    let steps = pop_count(stack)?;
    let to = pop_colours(stack)?;
    let from = pop_colours(stack)?;
    Ok(Outcome::value(from.gradient(&to, steps as usize)))
}

fn sort_gray(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop_palette(stack)?.gray_sorted()))
}

fn dedup(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop_palette(stack)?.dedup()))
}

fn reverse(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop_palette(stack)?.reversed()))
}

/// `scheme(colour, "triadic")`
fn scheme(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let name: Scheme = pop_string(stack)?.parse()?;
    let main = pop_colour(stack)?;
    Ok(Outcome::value(Palette::scheme(main, name)))
}

/// `spectre(p, inter, disparity[, layout])`
fn spectre(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 3, 4)?;
    let layout = if stack.len() == 4 {
        pop_string(stack)?.parse()?
    } else {
        Spectre::default()
    };
    let disparity = pop_number(stack)?;
    let inter = pop_count(stack)?;
    let base = pop_palette(stack)?;
    Ok(Outcome::value(base.spectre(inter as usize, disparity, layout)))
}

/// `extract(image[, method, depth, allow_unexistent])`
fn extract(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 1, 4)?;
    let allow = if stack.len() == 4 { pop_number(stack)? != 0.0 } else { false };
    let depth = if stack.len() == 3 { pop_count(stack)? } else { DEFAULT_EXTRACT_DEPTH };
    let method: ExtractMethod = if stack.len() == 2 {
        pop_string(stack)?.parse()?
    } else {
        ExtractMethod::default()
    };
    let depth = method.check_depth(depth)?;
    let image = pop_image(stack)?;
    let palette = with_image(&image, |img| extract_palette(img, method, depth, allow))?;
    Ok(Outcome::value(palette))
}

fn load_palette(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let path = pop_string(stack)?;
    Ok(Outcome::value(read_palette(Path::new(&path))?))
}

/// `save_palette(p, path)` returns the palette unchanged.
fn save_palette(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let path = pop_string(stack)?;
    let handle = pop(stack)?;
    match &*handle.read() {
        Value::Palette(p) => write_palette(p, Path::new(&path))?,
        other => return Err(MipaError::type_error(ValueType::Palette, other.value_type())),
    }
    Ok(Outcome::Value(handle))
}

/// `swatch(p, path[, rows])` writes a swatch PNG and returns the palette.
fn swatch(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_range(stack, 2, 3)?;
    let rows = if stack.len() == 3 { pop_count(stack)? } else { DEFAULT_SWATCH_ROWS };
    let path = pop_string(stack)?;
    let handle = pop(stack)?;
    match &*handle.read() {
        Value::Palette(p) => write_swatch(p, Path::new(&path), rows)?,
        other => return Err(MipaError::type_error(ValueType::Palette, other.value_type())),
    }
    Ok(Outcome::Value(handle))
}

#[cfg(test)]
mod tests {
    use crate::error::MipaError;
    use crate::runtime::builtins::testing::{call, eval};
    use crate::runtime::state::ProgramState;
    use crate::runtime::value::Value;
    use crate::types::{canvas, Colour, Palette};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const RED: Colour = Colour::rgb(255, 0, 0);
    const GREEN: Colour = Colour::rgb(0, 255, 0);
    const BLUE: Colour = Colour::rgb(0, 0, 255);

    fn pal(colours: &[Colour]) -> Value {
        Value::Palette(Palette::from_colours(colours.to_vec()))
    }

    #[test]
    fn test_palette_flattens_in_argument_order() {
        let mut state = ProgramState::captured();
        let out = eval(
            &mut state,
            "palette",
            vec![Value::Colour(RED), pal(&[GREEN, BLUE]), Value::Colour(Colour::BLACK)],
        );
        assert_eq!(out, pal(&[RED, GREEN, BLUE, Colour::BLACK]));
    }

    #[test]
    fn test_palette_rejects_numbers() {
        let mut state = ProgramState::captured();
        assert!(matches!(
            call(&mut state, "palette", vec![Value::Number(1.0)]),
            Err(MipaError::Type { .. })
        ));
    }

    #[test]
    fn test_at_and_out_of_range() {
        let mut state = ProgramState::captured();
        let p = pal(&[RED, GREEN]);
        assert_eq!(eval(&mut state, "at", vec![p.clone(), Value::Number(1.0)]), Value::Colour(GREEN));
        let err = call(&mut state, "at", vec![p.clone(), Value::Number(2.0)]).unwrap_err();
        assert!(matches!(err, MipaError::OutOfRange { index: 2, len: 2 }));
        assert!(call(&mut state, "at", vec![p, Value::Number(-1.0)]).is_err());
    }

    #[test]
    fn test_gradient_accepts_colours() {
        let mut state = ProgramState::captured();
        let out = eval(
            &mut state,
            "gradient",
            vec![Value::Colour(Colour::BLACK), Value::Colour(Colour::WHITE), Value::Number(1.0)],
        );
        assert_eq!(out, pal(&[Colour::BLACK, Colour::rgb(128, 128, 128), Colour::WHITE]));
    }

    #[test]
    fn test_scheme_by_name() {
        let mut state = ProgramState::captured();
        let out = eval(&mut state, "scheme", vec![Value::Colour(RED), Value::String("mono".into())]);
        assert_eq!(out, pal(&[RED]));
        assert!(call(&mut state, "scheme", vec![Value::Colour(RED), Value::String("wild".into())]).is_err());
    }

    #[test]
    fn test_extract_defaults() {
        let mut state = ProgramState::captured();
        let image = Value::Image(canvas(4, 4, RED));
        assert_eq!(eval(&mut state, "extract", vec![image.clone()]), pal(&[RED]));
        assert_eq!(
            eval(&mut state, "extract", vec![image, Value::String("simple".into())]),
            pal(&[RED])
        );
    }

    #[test]
    fn test_extract_rejects_huge_depth() {
        let mut state = ProgramState::captured();
        let image = Value::Image(canvas(2, 2, Colour::BLACK));
        for method in ["simple", "median"] {
            let err = call(
                &mut state,
                "extract",
                vec![
                    image.clone(),
                    Value::String(method.into()),
                    Value::Number(3_000_000.0),
                    Value::Number(0.0),
                ],
            )
            .unwrap_err();
            assert!(matches!(err, MipaError::Limit { .. }), "{method}: {err}");
        }
    }

    #[test]
    fn test_palette_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.palette");
        let path_value = Value::String(path.to_string_lossy().into_owned());
        let mut state = ProgramState::captured();

        let saved = eval(&mut state, "save_palette", vec![pal(&[RED, GREEN, BLUE]), path_value.clone()]);
        assert_eq!(saved, pal(&[RED, GREEN, BLUE]));
        assert_eq!(eval(&mut state, "load_palette", vec![path_value]), pal(&[RED, GREEN, BLUE]));
    }

    #[test]
    fn test_swatch_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("swatch.png");
        let mut state = ProgramState::captured();
        eval(
            &mut state,
            "swatch",
            vec![pal(&[RED, GREEN]), Value::String(path.to_string_lossy().into_owned())],
        );
        assert!(path.is_file());
    }
}
