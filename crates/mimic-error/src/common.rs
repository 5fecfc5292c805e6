// Common error helpers
// Constructors and the abort path used where an error cannot be propagated

use crate::{AssertionResultError, MimicError, ScopeError};

/// Create a "no calls" error for the given signature
pub fn no_calls_error(signature: impl Into<String>) -> AssertionResultError {
    AssertionResultError::NoCalls {
        signature: signature.into(),
    }
}

/// Create a "not provisioned" error for the given type name
pub fn not_provisioned_error(type_name: impl Into<String>) -> ScopeError {
    ScopeError::NotProvisioned {
        type_name: type_name.into(),
    }
}

/// Abort the current thread with the error's message.
///
/// Used on paths that have no error channel, such as resolving a value for a
/// mocked member that cannot fail. The panic message carries the error code so
/// test output can be grepped for it.
#[track_caller]
pub fn abort(err: &dyn MimicError) -> ! {
    panic!("[{}] {}", err.error_code(), err)
}
