// Mimic error handling
// Central location for the error types shared by the mimic crates

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

// Re-export common error handling tools for convenience
pub use anyhow;
pub use thiserror;

mod assertion;
mod common;
mod config;
mod ledger;
mod scope;
mod stub;

pub use assertion::{AssertionResult, AssertionResultError};
pub use common::*;
pub use config::{ConfigError, ConfigResult};
pub use ledger::{LedgerError, LedgerResult};
pub use scope::{ScopeError, ScopeResult};
pub use stub::{StubError, StubResult};

/// Error domains representing the components of the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Stub,
    Ledger,
    Assertion,
    Scope,
    Config,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Stub => write!(f, "stub"),
            ErrorDomain::Ledger => write!(f, "ledger"),
            ErrorDomain::Assertion => write!(f, "assertion"),
            ErrorDomain::Scope => write!(f, "scope"),
            ErrorDomain::Config => write!(f, "config"),
        }
    }
}

/// Standard error message format for structured rendering
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: String,
    pub domain: ErrorDomain,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorMessage {
    /// Build the structured form of any mimic error
    pub fn from_error(err: &dyn MimicError) -> Self {
        Self {
            code: err.error_code().to_string(),
            domain: err.domain(),
            message: err.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Base trait for all errors raised by the mimic runtime.
pub trait MimicError: StdError + fmt::Debug + fmt::Display + Send + Sync + Any + 'static {
    /// Returns a unique static string code for this error.
    fn error_code(&self) -> &'static str;

    /// The component that raised the error.
    fn domain(&self) -> ErrorDomain;

    /// Whether the error marks an unrecoverable condition.
    ///
    /// Fatal errors indicate either a broken contract between generated code
    /// and the runtime, or a bug in the runtime itself. Callers that cannot
    /// propagate them must abort with the error's message.
    fn is_fatal(&self) -> bool {
        false
    }

    /// Returns this error as a `&dyn Any` to allow downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shorthand for a boxed MimicError
pub type BoxError = Box<dyn MimicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_error() {
        let err = AssertionResultError::NoCalls {
            signature: "fetch(id:)".to_string(),
        };
        let message = ErrorMessage::from_error(&err);

        assert_eq!(message.code, "ASSERTION_NO_CALLS");
        assert_eq!(message.domain, ErrorDomain::Assertion);
        assert!(message.message.contains("fetch(id:)"));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["domain"], "Assertion");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_box_error_downcast() {
        let boxed: BoxError = ScopeError::NotProvisioned {
            type_name: "Clock".to_string(),
        }
        .into();

        assert!(boxed.is_fatal());
        let scope = boxed.as_any().downcast_ref::<ScopeError>();
        assert!(matches!(scope, Some(ScopeError::NotProvisioned { .. })));
    }

    #[test]
    fn test_runtime_domains_have_producers() {
        let errors: Vec<BoxError> = vec![
            StubError::ErrorOnInfalliblePath {
                signature: "load()".to_string(),
            }
            .into(),
            LedgerError::AbbreviatedSignature {
                owner: "StoreMock".to_string(),
                signature: "load".to_string(),
            }
            .into(),
            no_calls_error("load()").into(),
            not_provisioned_error("Store").into(),
        ];
        let domains: Vec<ErrorDomain> = errors.iter().map(|err| err.domain()).collect();
        assert_eq!(
            domains,
            vec![
                ErrorDomain::Stub,
                ErrorDomain::Ledger,
                ErrorDomain::Assertion,
                ErrorDomain::Scope,
            ]
        );
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(ErrorDomain::Stub.to_string(), "stub");
        assert_eq!(ErrorDomain::Ledger.to_string(), "ledger");
        assert_eq!(ErrorDomain::Config.to_string(), "config");
    }
}
