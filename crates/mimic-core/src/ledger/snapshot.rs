// Serializable ledger snapshots

use serde::{Deserialize, Serialize};

use crate::call::{ErasedCall, Timestamp};
use crate::signature::Signature;

/// Flattened view of one recorded call, for diagnostics and JSON dumps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSummary {
    pub id: u64,
    pub signature: Signature,
    pub input: String,
    pub input_type: String,
    pub output_type: String,
    pub time: Timestamp,
}

impl CallSummary {
    pub fn from_call(call: &dyn ErasedCall) -> Self {
        Self {
            id: call.id(),
            signature: call.signature().clone(),
            input: call.input_description(),
            input_type: call.input_type().name(),
            output_type: call.output_type().name(),
            time: call.time(),
        }
    }
}
