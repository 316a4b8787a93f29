//! Bindings, save-stacks, diagnostics and termination.

use crate::error::Result;
use crate::runtime::state::ProgramState;
use crate::runtime::value::{Handle, Value};

use super::{assert_arity, assert_arity_min, pop, pop_string, Builtin, Outcome};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("copy", copy),
    ("type", type_of),
    ("print", print),
    ("env", env),
    ("stack", stack),
    ("push", push),
    ("pop", pop_saved),
    ("set", set),
    ("get", get),
    ("unset", unset),
    ("exit", exit),
    ("quit", exit),
];

/// An independent copy with its own lifetime.
fn copy(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::Value(pop(stack)?.deep_copy()))
}

fn type_of(_: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    Ok(Outcome::value(pop(stack)?.value_type().name()))
}

/// `print(a, b, ...)` writes one space-separated line. Strings are written
/// without quotes.
fn print(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    let line = stack
        .drain(..)
        .map(|handle| {
            let value = handle.read();
            match &*value {
                Value::String(s) => s.clone(),
                other => other.render(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    state.emit(line);
    Ok(Outcome::Nothing)
}

/// One `name = value` line per binding, sorted by name.
fn env(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 0)?;
    let lines: Vec<String> = state
        .symbols()
        .map(|(name, handle)| format!("{} = {}", name, handle))
        .collect();
    for line in lines {
        state.emit(line);
    }
    Ok(Outcome::Nothing)
}

/// One line per saved name, oldest entry first.
fn stack(state: &mut ProgramState, args: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(args, 0)?;
    let lines: Vec<String> = state
        .saved_stacks()
        .map(|(name, saved)| {
            let entries: Vec<String> = saved.iter().map(Handle::to_string).collect();
            format!("{}: [{}]", name, entries.join(", "))
        })
        .collect();
    for line in lines {
        state.emit(line);
    }
    Ok(Outcome::Nothing)
}

/// `push("a", "b")` saves each name, last argument first.
fn push(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_min(stack, 1)?;
    while !stack.is_empty() {
        let name = pop_string(stack)?;
        state.push(&name)?;
    }
    Ok(Outcome::Nothing)
}

/// `pop("a", "b")` restores each name, last argument first.
fn pop_saved(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity_min(stack, 1)?;
    while !stack.is_empty() {
        let name = pop_string(stack)?;
        state.pop(&name)?;
    }
    Ok(Outcome::Nothing)
}

/// `set("name", value)` binds by computed name and returns the value.
fn set(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 2)?;
    let value = pop(stack)?;
    let name = pop_string(stack)?;
    state.set(&name, value.clone())?;
    Ok(Outcome::Value(value))
}

fn get(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let name = pop_string(stack)?;
    Ok(Outcome::Value(state.get(&name)?))
}

fn unset(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 1)?;
    let name = pop_string(stack)?;
    state.unset(&name);
    Ok(Outcome::Nothing)
}

fn exit(state: &mut ProgramState, stack: &mut Vec<Handle>) -> Result<Outcome> {
    assert_arity(stack, 0)?;
    state.finish();
    Ok(Outcome::Exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MipaError;
    use crate::runtime::builtins::testing::{call, eval};
    use crate::types::{Colour, Palette};
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn test_print_unquotes_strings() {
        let mut state = ProgramState::captured();
        call(&mut state, "print", vec![s("n ="), Value::Number(2.5), s("done")]).unwrap();
        assert_eq!(state.take_output(), "n = 2.5 done\n");
    }

    #[test]
    fn test_env_lists_sorted_bindings() {
        let mut state = ProgramState::captured();
        state.set("b", Handle::new(s("x"))).unwrap();
        state.set("a", Handle::new(Colour::WHITE)).unwrap();
        call(&mut state, "env", vec![]).unwrap();
        assert_eq!(state.take_output(), "a = #FFFFFF\nb = \"x\"\n");
    }

    #[test]
    fn test_push_pop_round_trip() {
        let mut state = ProgramState::captured();
        state.set("p", Handle::new(Palette::from_colours(vec![Colour::BLACK]))).unwrap();
        call(&mut state, "push", vec![s("p")]).unwrap();
        state.set("p", Handle::new(1.0f32)).unwrap();

        call(&mut state, "stack", vec![]).unwrap();
        assert_eq!(state.take_output(), "p: [[#000000]]\n");

        call(&mut state, "pop", vec![s("p")]).unwrap();
        assert_eq!(*state.get("p").unwrap().read(), Value::Palette(Palette::from_colours(vec![Colour::BLACK])));
        assert!(matches!(
            call(&mut state, "pop", vec![s("p")]),
            Err(MipaError::EmptySavedStack(n)) if n == "p"
        ));
    }

    #[test]
    fn test_pop_many_in_pop_order() {
        let mut state = ProgramState::captured();
        state.set("a", Handle::new(1.0f32)).unwrap();
        call(&mut state, "push", vec![s("a")]).unwrap();
        // "b" is handled first and fails before "a" is touched
        let err = call(&mut state, "pop", vec![s("a"), s("b")]).unwrap_err();
        assert!(matches!(err, MipaError::EmptySavedStack(n) if n == "b"));
        assert_eq!(state.saved_stacks().count(), 1);
    }

    #[test]
    fn test_set_get_unset_by_name() {
        let mut state = ProgramState::captured();
        assert_eq!(eval(&mut state, "set", vec![s("x"), Value::Number(3.0)]), Value::Number(3.0));
        assert_eq!(eval(&mut state, "get", vec![s("x")]), Value::Number(3.0));
        call(&mut state, "unset", vec![s("x")]).unwrap();
        call(&mut state, "unset", vec![s("x")]).unwrap();
        assert!(matches!(
            call(&mut state, "get", vec![s("x")]),
            Err(MipaError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn test_copy_and_type() {
        let mut state = ProgramState::captured();
        assert_eq!(eval(&mut state, "type", vec![Value::Number(1.0)]), s("number"));
        assert_eq!(eval(&mut state, "copy", vec![s("z")]), s("z"));
    }

    #[test]
    fn test_exit_and_quit() {
        for name in ["exit", "quit"] {
            let mut state = ProgramState::captured();
            assert!(matches!(call(&mut state, name, vec![]), Ok(Outcome::Exit)));
            assert!(state.is_finished());
        }
    }
}
