use thiserror::Error;

/// xtui unified error type
#[derive(Error, Debug)]
pub enum XtuiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Export to {format} failed: {message}")]
    Export { format: String, message: String },

    #[error("Command `{command}` failed: {message}")]
    Subprocess { command: String, message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Operation timed out")]
    Timeout,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type XtuiResult<T> = Result<T, XtuiError>;

impl XtuiError {
    pub fn terminal(err: impl std::fmt::Display) -> Self {
        Self::Terminal(err.to_string())
    }

    pub fn subprocess(command: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Subprocess {
            command: command.into(),
            message: err.to_string(),
        }
    }
}
