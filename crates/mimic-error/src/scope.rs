// Static scope errors
// Raised when type-level recording is used outside of a provisioned scope

use std::any::Any;
use thiserror::Error;

use crate::{BoxError, ErrorDomain, MimicError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// No scope token is alive for the type
    #[error("static members of {type_name} were used without a provisioned scope; call StaticRegistry::provision::<{type_name}>() in the test before touching them")]
    NotProvisioned { type_name: String },

    /// The token was replaced by a newer one for the same type
    #[error("the static scope for {type_name} was replaced by a newer one")]
    Invalidated { type_name: String },
}

impl MimicError for ScopeError {
    fn error_code(&self) -> &'static str {
        match self {
            ScopeError::NotProvisioned { .. } => "SCOPE_NOT_PROVISIONED",
            ScopeError::Invalidated { .. } => "SCOPE_INVALIDATED",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Scope
    }

    fn is_fatal(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<ScopeError> for BoxError {
    fn from(err: ScopeError) -> Self {
        Box::new(err)
    }
}

pub type ScopeResult<T> = Result<T, ScopeError>;
