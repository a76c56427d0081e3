use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Malformed pillar array, unknown symbol, or a bad hidden-stem list.
    InvalidInput(String),
}

impl ChartError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ChartError::InvalidInput(msg.into())
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for ChartError {}

pub type Result<T> = std::result::Result<T, ChartError>;
