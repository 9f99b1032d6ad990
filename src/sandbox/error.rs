//! Script Errors
//!
//! Everything that can abort a sandboxed script. None of these escape
//! the runner: they are rendered as a single `Execution Error` line.

use thiserror::Error;

use super::value::Value;

#[derive(Error, Debug, Clone)]
pub enum ScriptError {
    #[error("SyntaxError: {message} (line {line}, column {column})")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// A value raised by `throw`, a failing built-in, or `process.exit`.
    #[error("{}", .0.error_message())]
    Thrown(Value),

    /// A loop-iteration or call-depth cap was exceeded.
    #[error("{0}")]
    Limit(String),
}

impl ScriptError {
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        ScriptError::Syntax { message: message.into(), line, column }
    }

    /// Raise an `Error` object carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        ScriptError::Thrown(Value::error_object("Error", message.into()))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        ScriptError::Thrown(Value::error_object("TypeError", message.into()))
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        ScriptError::Thrown(Value::error_object("ReferenceError", message.into()))
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        ScriptError::Thrown(Value::error_object("RangeError", message.into()))
    }
}

pub type ScriptResult<T> = Result<T, ScriptError>;
