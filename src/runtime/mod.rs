//! The execution runtime: values, program state, built-ins and the
//! statement evaluator.

pub mod builtins;
mod interpreter;
mod state;
mod value;

pub use builtins::{Builtin, Builtins, Outcome};
pub use interpreter::{Flow, Interpreter};
pub use state::{ProgramState, CONFIG_PREFIX, MAX_PREVIEW_SCALE, SCALE_CONFIG};
pub use value::{Handle, Value, ValueType};
