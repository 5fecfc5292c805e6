// Stub resolution errors
// Raised by the stub registry when a lookup cannot produce a value

use std::any::Any;
use thiserror::Error;

use crate::{BoxError, ErrorDomain, MimicError};

/// Errors produced while resolving a stubbed value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StubError {
    /// No registration matched the lookup
    #[error("{}", no_stub_message(.owner, .signature, .input_type, .output_type, .registry_empty, .registry_dump))]
    NoStub {
        owner: String,
        signature: String,
        input_type: String,
        output_type: String,
        registry_empty: bool,
        registry_dump: String,
    },

    /// The stored value's type differs from the one requested under the same key
    #[error("stored output for {signature} is not a {expected}; this is a bug in mimic, not in the test")]
    IncorrectOutputType { signature: String, expected: String },

    /// The stored closure's type differs from the one requested under the same key
    #[error("stored closure for {signature} is not a {expected}; this is a bug in mimic, not in the test")]
    IncorrectClosureType { signature: String, expected: String },

    /// A stubbed error could not be converted to the member's error type
    #[error("stubbed error for {signature} is a {found}, but the member fails with {expected}")]
    IncorrectErrorType {
        signature: String,
        expected: String,
        found: String,
    },

    /// A failing stub was registered for a member that cannot fail
    #[error("{signature} was stubbed with an error, but the member cannot report errors; stub a value instead")]
    ErrorOnInfalliblePath { signature: String },
}

fn no_stub_message(
    owner: &str,
    signature: &str,
    input_type: &str,
    output_type: &str,
    registry_empty: &bool,
    registry_dump: &str,
) -> String {
    if *registry_empty {
        format!(
            "no stubs were registered on {owner}; stub {signature} before calling it"
        )
    } else {
        format!(
            "no stub registered on {owner} for {signature} with input type {input_type} and output type {output_type}\nregistered stubs:\n{registry_dump}"
        )
    }
}

impl MimicError for StubError {
    fn error_code(&self) -> &'static str {
        match self {
            StubError::NoStub { .. } => "STUB_NOT_FOUND",
            StubError::IncorrectOutputType { .. } => "STUB_INCORRECT_OUTPUT_TYPE",
            StubError::IncorrectClosureType { .. } => "STUB_INCORRECT_CLOSURE_TYPE",
            StubError::IncorrectErrorType { .. } => "STUB_INCORRECT_ERROR_TYPE",
            StubError::ErrorOnInfalliblePath { .. } => "STUB_ERROR_ON_INFALLIBLE_PATH",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Stub
    }

    fn is_fatal(&self) -> bool {
        matches!(
            self,
            StubError::IncorrectOutputType { .. }
                | StubError::IncorrectClosureType { .. }
                | StubError::ErrorOnInfalliblePath { .. }
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<StubError> for BoxError {
    fn from(err: StubError) -> Self {
        Box::new(err)
    }
}

/// Convenient Result type for stub resolution
pub type StubResult<T> = Result<T, StubError>;
