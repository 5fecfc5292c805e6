// Mimic Core Library
//
// This library provides the runtime behind generated test doubles: recording
// calls, resolving stubbed values and verifying what happened.

// Re-export error types from mimic-error
pub use mimic_error as error;

// Signatures
// Member signatures and the name-only matching used for abbreviated forms
pub mod signature;

// Calls
// Typed call records, their type-erased view and runtime type tags
pub mod call;

// Call Ledger
// Append-only log of invocations, filtered queries and live subscriptions
pub mod ledger;

// Stub Registry
// Fixed outputs, fixed errors and closures keyed by signature and types
pub mod stub;

// Verification
// Assertive and fluent checks over a ledger, with pluggable failure reporting
pub mod verify;

// Mock Handle
pub mod mock;

// Static Scopes
// Per-type mocks for static members, provisioned through an explicit registry
pub mod scope;

// Configuration
pub mod config;

// Test Logging
pub mod test_logging;

pub use call::{DynInput, ErasedCall, RecordedCall, Timestamp, TypeTag};
pub use config::MockConfig;
pub use ledger::{CallFilter, CallStream, CallSummary, Ledger};
pub use mock::Mock;
pub use scope::{StaticRegistry, StaticScope};
pub use signature::Signature;
pub use stub::{Property, StubKey, StubRegistry};
pub use verify::{
    CallCountRange, CallMatches, CollectingReporter, FailureReporter, PanicReporter,
    SourceLocation, TracingReporter, Verifier,
};
