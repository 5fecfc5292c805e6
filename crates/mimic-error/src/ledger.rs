// Call ledger errors
// Raised when a call cannot be appended without breaking the log's ordering

use std::any::Any;
use thiserror::Error;

use crate::{BoxError, ErrorDomain, MimicError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Calls are always recorded under the member's full signature
    #[error("calls to {owner} must be recorded with a full signature, got {signature}")]
    AbbreviatedSignature { owner: String, signature: String },

    /// No timestamp after the last recorded one is representable
    #[error("the clock of {owner} is exhausted; no time follows {last}ns")]
    ClockExhausted { owner: String, last: u64 },
}

impl MimicError for LedgerError {
    fn error_code(&self) -> &'static str {
        match self {
            LedgerError::AbbreviatedSignature { .. } => "LEDGER_ABBREVIATED_SIGNATURE",
            LedgerError::ClockExhausted { .. } => "LEDGER_CLOCK_EXHAUSTED",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Ledger
    }

    fn is_fatal(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<LedgerError> for BoxError {
    fn from(err: LedgerError) -> Self {
        Box::new(err)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
