use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mipa operations
#[derive(Error, Diagnostic, Debug)]
pub enum MipaError {
    #[error("Expected {expected} argument(s), got {actual}")]
    #[diagnostic(code(mipa::arity))]
    Arity { expected: String, actual: usize },

    #[error("Type error: expected {expected}, got {actual}")]
    #[diagnostic(code(mipa::type_error))]
    Type {
        expected: String,
        actual: String,
    },

    #[error("Undefined variable {0}")]
    #[diagnostic(code(mipa::undefined))]
    UndefinedVariable(String),

    #[error("Unknown function {0}")]
    #[diagnostic(code(mipa::unknown_function), help("Run env() to list bindings"))]
    UnknownFunction(String),

    #[error("No saved values for {0}")]
    #[diagnostic(code(mipa::empty_stack), help("Use push(\"name\") before pop(\"name\")"))]
    EmptySavedStack(String),

    #[error("Unknown dither matrix: {name}")]
    #[diagnostic(code(mipa::matrix))]
    UnknownMatrix {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown pixel selector: {0}")]
    #[diagnostic(code(mipa::selector), help("Available selectors: avg, med, min, max"))]
    UnknownPixelSelector(String),

    #[error("{0} is currently displayed and must store an image")]
    #[diagnostic(code(mipa::display))]
    DisplayTypeMismatch(String),

    #[error("Configuration {name} must store a {expected}, got {actual}")]
    #[diagnostic(code(mipa::config_type))]
    ConfigTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Index {index} out of range for palette of {len}")]
    #[diagnostic(code(mipa::range))]
    OutOfRange { index: i64, len: usize },

    #[error("{what} must be at most {max}, got {actual}")]
    #[diagnostic(code(mipa::limit))]
    Limit {
        what: String,
        max: u64,
        actual: String,
    },

    #[error("Image error with {path}: {message}")]
    #[diagnostic(code(mipa::image_io))]
    ImageIo {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    #[diagnostic(code(mipa::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mipa::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(mipa::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(mipa::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl MipaError {
    /// Shorthand for a `Type` error from two displayable tags.
    pub fn type_error(expected: impl ToString, actual: impl ToString) -> Self {
        MipaError::Type {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Shorthand for a `Limit` error.
    pub fn limit(what: impl ToString, max: u64, actual: impl ToString) -> Self {
        MipaError::Limit {
            what: what.to_string(),
            max,
            actual: actual.to_string(),
        }
    }

    /// Whether the statement loop can report this error and carry on.
    ///
    /// Only failures of the startup machinery (configuration and the
    /// filesystem around it) are fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MipaError::Config { .. })
    }
}

pub type Result<T> = std::result::Result<T, MipaError>;
