//! Program state: bindings, save-stacks, constants, garbage and the
//! display slot.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::error::{MipaError, Result};

use super::value::{Handle, Value, ValueType};

/// Names with this prefix are configuration: rebinding must keep the type.
pub const CONFIG_PREFIX: &str = "cfg_";

/// Rebinding this configuration name refreshes the display.
pub const SCALE_CONFIG: &str = "cfg_scale";

/// Preview scales are clamped to `1..=MAX_PREVIEW_SCALE`.
pub const MAX_PREVIEW_SCALE: u32 = 64;

/// Handles whose last binding went away, waiting for a sweep.
type GarbageList = Arc<Mutex<Vec<Handle>>>;

/// Where `print`, `env` and `stack` write.
#[derive(Debug)]
enum Output {
    Stdout,
    Captured(String),
}

/// The environment a session evaluates against.
#[derive(Debug)]
pub struct ProgramState {
    symbols: BTreeMap<String, Handle>,
    saved: BTreeMap<String, Vec<Handle>>,
    constants: Vec<Handle>,
    garbage: GarbageList,
    display: Option<Handle>,
    dirty: bool,
    finished: bool,
    output: Output,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramState {
    /// Empty state writing to stdout.
    pub fn new() -> Self {
        Self {
            symbols: BTreeMap::new(),
            saved: BTreeMap::new(),
            constants: Vec::new(),
            garbage: Arc::default(),
            display: None,
            dirty: false,
            finished: false,
            output: Output::Stdout,
        }
    }

    /// State whose output is kept in memory; see [`ProgramState::take_output`].
    pub fn captured() -> Self {
        Self {
            output: Output::Captured(String::new()),
            ..Self::new()
        }
    }

    /// Seed the `cfg_*` bindings from `config`.
    pub fn configure(&mut self, config: &Config) {
        let seeds: [(&str, Value); 5] = [
            ("cfg_scale", Value::Number(config.scale as f32)),
            ("cfg_matrix", Value::String(config.matrix.clone())),
            ("cfg_sparsity", Value::Number(config.sparsity)),
            ("cfg_threshold", Value::Number(config.threshold)),
            ("cfg_selector", Value::String(config.selector.clone())),
        ];
        for (name, value) in seeds {
            self.symbols.insert(name.to_string(), Handle::new(value));
        }
    }

    /// Current binding of `name`.
    pub fn get(&self, name: &str) -> Result<Handle> {
        self.symbols
            .get(name)
            .cloned()
            .ok_or_else(|| MipaError::UndefinedVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Bind `name` to `value`, retiring the previous binding.
    ///
    /// A name holding the displayed image only accepts images and moves the
    /// display along. Configuration names keep their type.
    pub fn set(&mut self, name: &str, value: Handle) -> Result<()> {
        if let Some(old) = self.symbols.get(name) {
            if old.same(&value) {
                return Ok(());
            }
            let displayed = self.display.as_ref().is_some_and(|d| d.same(old));
            if displayed && value.value_type() != ValueType::Image {
                return Err(MipaError::DisplayTypeMismatch(name.to_string()));
            }
            if name.starts_with(CONFIG_PREFIX) && old.value_type() != value.value_type() {
                return Err(MipaError::ConfigTypeMismatch {
                    name: name.to_string(),
                    expected: old.value_type().to_string(),
                    actual: value.value_type().to_string(),
                });
            }
            if displayed {
                self.display = Some(value.clone());
                self.dirty = true;
            }
        }
        if name == SCALE_CONFIG {
            self.dirty = true;
        }

        if let Some(old) = self.symbols.insert(name.to_string(), value) {
            self.retire(old);
        }
        Ok(())
    }

    /// Remove the binding of `name`. Absent names are ignored.
    pub fn unset(&mut self, name: &str) {
        if let Some(old) = self.symbols.remove(name) {
            self.retire(old);
        }
    }

    /// Drop one reference; the last binding goes to the garbage list.
    ///
    /// The display slot counts as a binding, so a shown image is never
    /// queued.
    fn retire(&mut self, handle: Handle) {
        if handle.count() == 1 {
            self.garbage
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(handle);
        }
    }

    /// Stash a copy of the current binding of `name`.
    pub fn push(&mut self, name: &str) -> Result<()> {
        let snapshot = self.get(name)?.deep_copy();
        self.saved.entry(name.to_string()).or_default().push(snapshot);
        Ok(())
    }

    /// Restore the most recently pushed copy of `name`.
    pub fn pop(&mut self, name: &str) -> Result<()> {
        let handle = self
            .saved
            .get_mut(name)
            .and_then(Vec::pop)
            .ok_or_else(|| MipaError::EmptySavedStack(name.to_string()))?;

        if let Err(e) = self.set(name, handle.clone()) {
            self.saved.entry(name.to_string()).or_default().push(handle);
            return Err(e);
        }
        if self.saved.get(name).is_some_and(Vec::is_empty) {
            self.saved.remove(name);
        }
        Ok(())
    }

    /// Keep `value` alive until the end of the current statement.
    pub fn set_constant(&mut self, value: Handle) -> Handle {
        self.constants.push(value.clone());
        value
    }

    /// Release every constant of the finished statement. Values nothing
    /// else references are freed on the spot.
    pub fn gb_constants(&mut self) {
        self.constants.clear();
    }

    /// Free everything on the garbage list. Returns how many values went.
    pub fn gb(&self) -> usize {
        sweep(&self.garbage)
    }

    /// Run [`ProgramState::gb`] on a short-lived thread.
    ///
    /// The sweeper only sees the garbage list, so evaluation can carry on
    /// while it runs.
    pub fn spawn_gb(&self) -> JoinHandle<usize> {
        let garbage = Arc::clone(&self.garbage);
        thread::spawn(move || sweep(&garbage))
    }

    /// Number of values waiting on the garbage list.
    pub fn pending_garbage(&self) -> usize {
        self.garbage.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Bind `image` to the display slot.
    pub fn show(&mut self, image: Handle) -> Result<()> {
        let actual = image.value_type();
        if actual != ValueType::Image {
            return Err(MipaError::type_error(ValueType::Image, actual));
        }
        self.display = Some(image);
        self.dirty = true;
        Ok(())
    }

    /// Mark the display dirty if `image` is the displayed one.
    pub fn maybe_refresh(&mut self, image: &Handle) {
        if self.display.as_ref().is_some_and(|d| d.same(image)) {
            self.dirty = true;
        }
    }

    pub fn for_display(&self) -> Option<&Handle> {
        self.display.as_ref()
    }

    pub fn should_refresh(&self) -> bool {
        self.dirty && self.display.is_some()
    }

    /// The displayed image if it needs redrawing, clearing the flag.
    pub fn take_refresh(&mut self) -> Option<Handle> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.display.clone()
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Handle)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn saved_stacks(&self) -> impl Iterator<Item = (&str, &[Handle])> {
        self.saved.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn config_number(&self, name: &str) -> Option<f32> {
        match &*self.symbols.get(name)?.read() {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn config_string(&self, name: &str) -> Option<String> {
        match &*self.symbols.get(name)?.read() {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Write one line of program output.
    pub fn emit(&mut self, line: impl Display) {
        match &mut self.output {
            Output::Stdout => {
                let _ = writeln!(io::stdout().lock(), "{}", line);
            }
            Output::Captured(buf) => {
                buf.push_str(&line.to_string());
                buf.push('\n');
            }
        }
    }

    /// Drain captured output. Empty when writing to stdout.
    pub fn take_output(&mut self) -> String {
        match &mut self.output {
            Output::Captured(buf) => std::mem::take(buf),
            Output::Stdout => String::new(),
        }
    }
}

fn sweep(garbage: &GarbageList) -> usize {
    let doomed = std::mem::take(&mut *garbage.lock().unwrap_or_else(PoisonError::into_inner));
    doomed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{canvas, Colour};

    fn image() -> Handle {
        Handle::new(canvas(2, 2, Colour::BLACK))
    }

    #[test]
    fn test_get_undefined() {
        let state = ProgramState::new();
        assert!(matches!(state.get("x"), Err(MipaError::UndefinedVariable(n)) if n == "x"));
    }

    #[test]
    fn test_set_unset_restores_count() {
        let mut state = ProgramState::new();
        let v = Handle::new(1.0f32);
        let before = v.count();

        state.set("x", v.clone()).unwrap();
        assert_eq!(v.count(), before + 1);
        state.unset("x");
        assert_eq!(v.count(), before);
        state.unset("x");
        assert_eq!(v.count(), before);
        assert_eq!(state.pending_garbage(), 0);
    }

    #[test]
    fn test_last_binding_goes_to_garbage() {
        let mut state = ProgramState::new();
        state.set("x", Handle::new(1.0f32)).unwrap();
        state.set("x", Handle::new(2.0f32)).unwrap();
        assert_eq!(state.pending_garbage(), 1);
        state.unset("x");
        assert_eq!(state.pending_garbage(), 2);
        assert_eq!(state.gb(), 2);
        assert_eq!(state.pending_garbage(), 0);
    }

    #[test]
    fn test_spawned_sweep() {
        let mut state = ProgramState::new();
        state.set("x", Handle::new("a")).unwrap();
        state.unset("x");
        let sweeper = state.spawn_gb();
        state.set("y", Handle::new("b")).unwrap();
        assert_eq!(sweeper.join().unwrap(), 1);
        assert_eq!(*state.get("y").unwrap().read(), Value::String("b".into()));
    }

    #[test]
    fn test_push_stores_a_copy() {
        let mut state = ProgramState::new();
        state.set("x", Handle::new(1.0f32)).unwrap();
        state.push("x").unwrap();

        *state.get("x").unwrap().write() = Value::Number(99.0);
        state.pop("x").unwrap();
        assert_eq!(*state.get("x").unwrap().read(), Value::Number(1.0));
    }

    #[test]
    fn test_pop_empty_stack() {
        let mut state = ProgramState::new();
        state.set("x", Handle::new(1.0f32)).unwrap();
        assert!(matches!(state.pop("x"), Err(MipaError::EmptySavedStack(_))));
        state.push("x").unwrap();
        state.pop("x").unwrap();
        assert!(state.pop("x").is_err());
        assert_eq!(state.saved_stacks().count(), 0);
    }

    #[test]
    fn test_constants_released() {
        let mut state = ProgramState::new();
        let c = state.set_constant(Handle::new(5.0f32));
        assert_eq!(c.count(), 2);
        state.gb_constants();
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_display_binding_rules() {
        let mut state = ProgramState::new();
        let img = image();
        state.set("img", img.clone()).unwrap();
        state.show(img.clone()).unwrap();
        assert!(state.take_refresh().is_some());
        assert!(state.take_refresh().is_none());

        let err = state.set("img", Handle::new(1.0f32)).unwrap_err();
        assert!(matches!(err, MipaError::DisplayTypeMismatch(_)));

        let other = image();
        state.set("img", other.clone()).unwrap();
        assert!(state.for_display().unwrap().same(&other));
        assert!(state.should_refresh());
    }

    #[test]
    fn test_show_rejects_non_image() {
        let mut state = ProgramState::new();
        assert!(matches!(state.show(Handle::new(1.0f32)), Err(MipaError::Type { .. })));
    }

    #[test]
    fn test_maybe_refresh_only_for_displayed() {
        let mut state = ProgramState::new();
        let shown = image();
        state.show(shown.clone()).unwrap();
        state.take_refresh();

        state.maybe_refresh(&image());
        assert!(!state.should_refresh());
        state.maybe_refresh(&shown);
        assert!(state.should_refresh());
    }

    #[test]
    fn test_config_keeps_type() {
        let mut state = ProgramState::new();
        state.configure(&Config::default());

        let err = state.set("cfg_matrix", Handle::new(2.0f32)).unwrap_err();
        assert!(matches!(err, MipaError::ConfigTypeMismatch { .. }));
        state.set("cfg_matrix", Handle::new("heart")).unwrap();
        assert_eq!(state.config_string("cfg_matrix").as_deref(), Some("heart"));
    }

    #[test]
    fn test_scale_marks_dirty() {
        let mut state = ProgramState::new();
        state.configure(&Config::default());
        state.show(image()).unwrap();
        state.take_refresh();

        state.set(SCALE_CONFIG, Handle::new(8.0f32)).unwrap();
        assert!(state.should_refresh());
        assert_eq!(state.config_number(SCALE_CONFIG), Some(8.0));
    }

    #[test]
    fn test_captured_output() {
        let mut state = ProgramState::captured();
        state.emit("hello");
        state.emit(3);
        assert_eq!(state.take_output(), "hello\n3\n");
        assert_eq!(state.take_output(), "");
    }
}
