// Assertion result errors

use std::any::Any;
use thiserror::Error;

use crate::{BoxError, ErrorDomain, MimicError};

/// Errors returned by the accessors of a verification result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionResultError {
    /// The result set holds no calls
    #[error("no matching calls to {signature} were found")]
    NoCalls { signature: String },
}

impl MimicError for AssertionResultError {
    fn error_code(&self) -> &'static str {
        match self {
            AssertionResultError::NoCalls { .. } => "ASSERTION_NO_CALLS",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Assertion
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<AssertionResultError> for BoxError {
    fn from(err: AssertionResultError) -> Self {
        Box::new(err)
    }
}

pub type AssertionResult<T> = Result<T, AssertionResultError>;
