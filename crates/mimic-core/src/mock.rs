// Mock handle
//
// A `Mock` pairs one ledger with one stub registry for a mocked type. Generated
// mock members call `invoke` (or `invoke_fallible`) once per invocation: the
// call is recorded first, then the stubbed value is resolved.

use std::fmt;
use std::sync::Arc;

use mimic_error::{StubError, StubResult};

use crate::call::RecordedCall;
use crate::config::MockConfig;
use crate::ledger::Ledger;
use crate::signature::Signature;
use crate::stub::{Property, StubRegistry};
use crate::verify::Verifier;

/// Recording and stubbing state of one mock instance
#[derive(Clone)]
pub struct Mock {
    name: Arc<str>,
    ledger: Ledger,
    stubs: Arc<StubRegistry>,
    config: MockConfig,
}

impl Mock {
    /// Create a mock with the default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MockConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: MockConfig) -> Self {
        let name: String = name.into();
        Self {
            ledger: Ledger::new(name.clone()),
            stubs: Arc::new(StubRegistry::new(name.clone())),
            name: name.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stubs(&self) -> &StubRegistry {
        &self.stubs
    }

    /// Record a call without resolving a value, for members returning `()`
    pub fn record<I>(&self, signature: impl Into<Signature>, input: I) -> Arc<RecordedCall<I, ()>>
    where
        I: fmt::Debug + Send + Sync + 'static,
    {
        let signature = signature.into();
        self.trace_invocation(&signature);
        self.ledger.record::<I, ()>(signature, input)
    }

    /// Record the call and return its stubbed value; aborts without a stub
    #[track_caller]
    pub fn invoke<I, O>(&self, signature: impl Into<Signature>, input: I) -> O
    where
        I: Clone + fmt::Debug + Send + Sync + 'static,
        O: Clone + Send + Sync + 'static,
    {
        let signature = signature.into();
        self.trace_invocation(&signature);
        self.ledger.record::<I, O>(signature.clone(), input.clone());
        self.stubs.resolve::<I, O>(signature, input)
    }

    /// Record the call and return its stubbed value, reporting a missing stub
    pub fn try_invoke<I, O>(&self, signature: impl Into<Signature>, input: I) -> StubResult<O>
    where
        I: Clone + fmt::Debug + Send + Sync + 'static,
        O: Clone + Send + Sync + 'static,
    {
        let signature = signature.into();
        self.trace_invocation(&signature);
        self.ledger.record::<I, O>(signature.clone(), input.clone());
        self.stubs.try_resolve::<I, O>(signature, input)
    }

    /// Record the call and return its stubbed value or error
    #[track_caller]
    pub fn invoke_fallible<I, O, E>(
        &self,
        signature: impl Into<Signature>,
        input: I,
    ) -> Result<O, E>
    where
        I: Clone + fmt::Debug + Send + Sync + 'static,
        O: Clone + Send + Sync + 'static,
        E: From<StubError> + Clone + 'static,
    {
        let signature = signature.into();
        self.trace_invocation(&signature);
        self.ledger.record::<I, O>(signature.clone(), input.clone());
        self.stubs.resolve_fallible::<I, O, E>(signature, input)
    }

    fn trace_invocation(&self, signature: &Signature) {
        if self.config.log_calls {
            tracing::debug!(mock = %self.name, signature = %signature, "invoked");
        }
    }

    pub fn stub_output<I, O>(&self, signature: impl Into<Signature>, output: O)
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
    {
        self.stubs.register_output::<I, O>(signature, output);
    }

    pub fn stub_error<I, O, E>(&self, signature: impl Into<Signature>, error: E)
    where
        I: 'static,
        O: 'static,
        E: fmt::Display + Clone + Send + Sync + 'static,
    {
        self.stubs.register_error::<I, O, E>(signature, error);
    }

    pub fn stub_with<I, O, F>(&self, signature: impl Into<Signature>, closure: F)
    where
        I: 'static,
        O: 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        self.stubs.register_dynamic::<I, O, F>(signature, closure);
    }

    pub fn stub_with_fallible<I, O, E, F>(&self, signature: impl Into<Signature>, closure: F)
    where
        I: 'static,
        O: 'static,
        E: 'static,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        self.stubs
            .register_dynamic_fallible::<I, O, E, F>(signature, closure);
    }

    /// Accessors for a stubbed property
    pub fn property<T>(&self, name: impl Into<String>) -> Property<'_, T>
    where
        T: Clone + fmt::Debug + Send + Sync + 'static,
    {
        Property::new(name, &self.stubs, &self.ledger)
    }

    /// Verifier over this mock's ledger, configured from the mock's config
    pub fn verify(&self) -> Verifier {
        Verifier::with_config(self.ledger.clone(), &self.config)
    }

    /// Recorded calls followed by registered stubs
    pub fn dump(&self) -> String {
        format!(
            "{}\nrecorded calls:\n{}\nregistered stubs:\n{}",
            self.name,
            self.ledger.dump(),
            self.stubs.dump()
        )
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("name", &self.name)
            .field("calls", &self.ledger.call_count())
            .field("stubs", &self.stubs.len())
            .finish()
    }
}
