// Call filtering
// Selective retrieval of recorded calls based on various criteria

use crate::call::{ErasedCall, Timestamp, TypeTag};
use crate::signature::Signature;

/// Filter for recorded calls
#[derive(Debug, Clone, Default)]
pub struct CallFilter {
    /// Filter by signature, using the abbreviation-tolerant match
    pub signature: Option<Signature>,
    /// Filter by recorded input type
    pub input_type: Option<TypeTag>,
    /// Filter by output type
    pub output_type: Option<TypeTag>,
    /// Only calls recorded at or after this time
    pub start_time: Option<Timestamp>,
    /// Only calls recorded at or before this time
    pub end_time: Option<Timestamp>,
    /// Only calls with an id strictly greater than this one
    pub after_id: Option<u64>,
    /// Maximum number of calls to return
    pub limit: Option<usize>,
}

impl CallFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, signature: impl Into<Signature>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Restrict to calls recorded with exactly these input and output types
    pub fn with_types<I: 'static, O: 'static>(mut self) -> Self {
        self.input_type = Some(TypeTag::of::<I>());
        self.output_type = Some(TypeTag::of::<O>());
        self
    }

    pub fn with_time_range(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn after(mut self, id: u64) -> Self {
        self.after_id = Some(id);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a call matches this filter
    pub fn matches(&self, call: &dyn ErasedCall) -> bool {
        if let Some(signature) = &self.signature {
            if !signature.matches(call.signature()) {
                return false;
            }
        }

        if let Some(input_type) = &self.input_type {
            if call.input_type() != *input_type {
                return false;
            }
        }

        if let Some(output_type) = &self.output_type {
            if call.output_type() != *output_type {
                return false;
            }
        }

        if let Some(start) = self.start_time {
            if call.time() < start {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if call.time() > end {
                return false;
            }
        }

        if let Some(after) = self.after_id {
            if call.id() <= after {
                return false;
            }
        }

        true
    }
}
