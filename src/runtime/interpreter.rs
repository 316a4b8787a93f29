//! Statement evaluation against a [`ProgramState`].

use std::thread::JoinHandle;

use crate::config::Config;
use crate::error::{MipaError, Result};
use crate::parser::{Expr, Location, Parser, Statement};
use crate::types::Image;

use super::builtins::{Builtins, Outcome};
use super::state::{ProgramState, MAX_PREVIEW_SCALE, SCALE_CONFIG};
use super::value::{Handle, Value};

/// What the host loop should do after a statement.
#[derive(Debug, Clone)]
pub enum Flow {
    /// Keep going. Carries the statement's value, if it had one.
    Continue(Option<Handle>),
    /// `exit` or `quit` ran.
    Exit,
}

/// Evaluates parsed statements one at a time.
pub struct Interpreter {
    state: ProgramState,
    builtins: Builtins,
    sweeper: Option<JoinHandle<usize>>,
}

impl Interpreter {
    pub fn new(state: ProgramState) -> Self {
        Self {
            state,
            builtins: Builtins::standard(),
            sweeper: None,
        }
    }

    /// Interpreter writing to stdout with `cfg_*` seeded from `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut state = ProgramState::new();
        state.configure(config);
        Self::new(state)
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ProgramState {
        &mut self.state
    }

    /// Evaluate one statement, then sweep its constants and queue a garbage
    /// sweep. The sweep runs whether or not the statement failed.
    pub fn execute(&mut self, statement: &Statement) -> Result<Flow> {
        let result = self.run_statement(statement);
        self.end_statement();
        result
    }

    fn run_statement(&mut self, statement: &Statement) -> Result<Flow> {
        match statement {
            Statement::Assign { name, value } => match self.eval(value)? {
                Outcome::Value(handle) => {
                    self.state.set(name, handle.clone())?;
                    Ok(Flow::Continue(Some(handle)))
                }
                Outcome::Nothing => Err(MipaError::type_error("a value", "nothing")),
                Outcome::Exit => Ok(Flow::Exit),
            },
            Statement::Expr(expr) => match self.eval(expr)? {
                Outcome::Value(handle) => Ok(Flow::Continue(Some(handle))),
                Outcome::Nothing => Ok(Flow::Continue(None)),
                Outcome::Exit => Ok(Flow::Exit),
            },
        }
    }

    /// Arguments are evaluated left to right and pushed, so the callee pops
    /// the last one first.
    fn eval(&mut self, expr: &Expr) -> Result<Outcome> {
        let handle = match expr {
            Expr::Number(n) => Handle::new(*n),
            Expr::Str(s) => Handle::new(s.as_str()),
            Expr::Colour(c) => Handle::new(*c),
            Expr::Var(name) => return Ok(Outcome::Value(self.state.get(name)?)),
            Expr::Call { name, args } => {
                let mut stack = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg)? {
                        Outcome::Value(handle) => stack.push(handle),
                        Outcome::Nothing => {
                            return Err(MipaError::type_error("a value", "nothing"));
                        }
                        Outcome::Exit => return Ok(Outcome::Exit),
                    }
                }
                match self.builtins.call(name, &mut self.state, &mut stack)? {
                    Outcome::Value(handle) => handle,
                    other => return Ok(other),
                }
            }
        };
        Ok(Outcome::Value(self.state.set_constant(handle)))
    }

    fn end_statement(&mut self) {
        self.state.gb_constants();
        self.join_sweeper();
        self.sweeper = Some(self.state.spawn_gb());
    }

    fn join_sweeper(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            // a panicking sweep only loses its own garbage
            let _ = sweeper.join();
        }
    }

    /// Snapshot of the displayed image and the preview scale, if the display
    /// changed since the last call. The scale is `cfg_scale` clamped to
    /// `1..=MAX_PREVIEW_SCALE`.
    pub fn take_frame(&mut self) -> Option<(Image, u32)> {
        let handle = self.state.take_refresh()?;
        let image = match &*handle.read() {
            Value::Image(image) => image.clone(),
            _ => return None,
        };
        let scale = self
            .state
            .config_number(SCALE_CONFIG)
            .map_or(1, |s| s.clamp(1.0, MAX_PREVIEW_SCALE as f32) as u32);
        Some((image, scale))
    }

    /// Run every statement of `source`, handing each result to `after`
    /// together with where the statement started (unknown for parse
    /// errors). Stops early on `exit`.
    pub fn run_source(
        &mut self,
        source: &str,
        mut after: impl FnMut(&mut Self, Option<Location>, Result<Flow>),
    ) -> Flow {
        for parsed in Parser::new(source) {
            let (at, result) = match parsed {
                Ok(statement) => (Some(statement.at), self.execute(&statement.value)),
                Err(e) => (None, Err(e)),
            };
            let exit = matches!(result, Ok(Flow::Exit));
            after(self, at, result);
            if exit || self.state.is_finished() {
                return Flow::Exit;
            }
        }
        Flow::Continue(None)
    }

    /// Wait for the last sweep and free whatever is still queued.
    pub fn shutdown(&mut self) -> usize {
        self.join_sweeper();
        self.state.gb()
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.join_sweeper();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use crate::types::{canvas, Colour};
    use pretty_assertions::assert_eq;

    fn interpreter() -> Interpreter {
        let mut state = ProgramState::captured();
        state.configure(&Config::default());
        Interpreter::new(state)
    }

    /// Run `source`, collecting error messages.
    fn run(interp: &mut Interpreter, source: &str) -> Vec<String> {
        let mut errors = Vec::new();
        interp.run_source(source, |_, _, result| {
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        });
        errors
    }

    fn get(interp: &Interpreter, name: &str) -> Value {
        interp.state().get(name).unwrap().read().clone()
    }

    #[test]
    fn test_assignment_and_calls() {
        let mut interp = interpreter();
        let errors = run(&mut interp, "red = rgb(255, 0, 0)\nh = red.hue");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(get(&interp, "red"), Value::Colour(Colour::rgb(255, 0, 0)));
        assert_eq!(get(&interp, "h"), Value::Number(0.0));
    }

    #[test]
    fn test_errors_do_not_stop_later_statements() {
        let mut interp = interpreter();
        let errors = run(&mut interp, "a = nope\nb = rgb(1)\nc = 1 +\nd = 4");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "Undefined variable nope");
        assert_eq!(get(&interp, "d"), Value::Number(4.0));
    }

    #[test]
    fn test_nothing_is_not_an_argument() {
        let mut interp = interpreter();
        let errors = run(&mut interp, "x = print(\"hi\")");
        assert_eq!(errors, vec!["Type error: expected a value, got nothing".to_string()]);
        assert_eq!(interp.state_mut().take_output(), "hi\n");
        assert!(!interp.state().contains("x"));
    }

    #[test]
    fn test_exit_stops_evaluation() {
        let mut interp = interpreter();
        let mut seen = 0;
        let flow = interp.run_source("a = 1; exit(); b = 2", |_, _, _| seen += 1);
        assert!(matches!(flow, Flow::Exit));
        assert_eq!(seen, 2);
        assert!(!interp.state().contains("b"));
    }

    #[test]
    fn test_literals_are_released_after_statement() {
        let mut interp = interpreter();
        let statements = parse_script("p = palette(#000000, #ffffff)").unwrap();
        let Ok(Flow::Continue(Some(p))) = interp.execute(&statements[0].value) else {
            panic!("assignment should yield its value");
        };
        // the binding plus this test's clone
        assert_eq!(p.count(), 2);
    }

    #[test]
    fn test_rebinding_queues_garbage_for_sweeper() {
        let mut interp = interpreter();
        run(&mut interp, "x = canvas(2, 2)\nx = 1");
        assert_eq!(interp.shutdown() + interp.state().pending_garbage(), 0);
    }

    #[test]
    fn test_quantize_refreshes_shown_image() {
        let mut interp = interpreter();
        let errors = run(
            &mut interp,
            "img = canvas(2, 2, #808080)\nshow(img)\nbw = palette(#000000, #ffffff)",
        );
        assert!(errors.is_empty(), "{errors:?}");
        let (frame, scale) = interp.take_frame().unwrap();
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(scale, 4);
        assert!(interp.take_frame().is_none());

        run(&mut interp, "quantize(img, bw.closest_rgb, direct())");
        let (frame, _) = interp.take_frame().unwrap();
        assert_eq!(frame, canvas(2, 2, Colour::WHITE));
    }

    #[test]
    fn test_frame_scale_is_clamped() {
        let mut interp = interpreter();
        run(&mut interp, "img = canvas(1, 1)\nshow(img)\ncfg_scale = 100000000");
        let (_, scale) = interp.take_frame().unwrap();
        assert_eq!(scale, MAX_PREVIEW_SCALE);

        run(&mut interp, "cfg_scale = -5");
        let (_, scale) = interp.take_frame().unwrap();
        assert_eq!(scale, 1);
    }

    #[test]
    fn test_display_keeps_image_type() {
        let mut interp = interpreter();
        let errors = run(&mut interp, "img = canvas(1, 1)\nshow(img)\nimg = 3\ncfg_scale = \"big\"");
        assert_eq!(
            errors,
            vec![
                "img is currently displayed and must store an image".to_string(),
                "Configuration cfg_scale must store a number, got string".to_string(),
            ]
        );
    }

    #[test]
    fn test_push_pop_restores_snapshot() {
        let mut interp = interpreter();
        let errors = run(
            &mut interp,
            "p = palette(#ff0000)\npush(\"p\")\np = p.shift(120)\npop(\"p\")",
        );
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            get(&interp, "p").render(),
            "[#FF0000]"
        );
    }
}
