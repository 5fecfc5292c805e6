// Configuration errors

use std::any::Any;
use thiserror::Error;

use crate::{BoxError, ErrorDomain, MimicError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    Parse(String),

    /// An environment variable held a value that is not a boolean
    #[error("Invalid value {value:?} for {variable}: expected true, false, 1 or 0")]
    InvalidFlag { variable: String, value: String },
}

impl MimicError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Parse(_) => "CONFIG_PARSE",
            ConfigError::InvalidFlag { .. } => "CONFIG_INVALID_FLAG",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<ConfigError> for BoxError {
    fn from(err: ConfigError) -> Self {
        Box::new(err)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
