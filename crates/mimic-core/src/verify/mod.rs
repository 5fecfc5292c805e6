// Verification layer
//
// Answers "was this called" questions against a ledger. Failed expectations go
// to a `FailureReporter` instead of interrupting control flow, so one test can
// surface several independent failures.

use std::fmt;
use std::sync::Arc;

use crate::call::{downcast_call, is_call_of, ErasedCall, RecordedCall, TypeTag};
use crate::config::MockConfig;
use crate::ledger::Ledger;
use crate::signature::Signature;

pub mod matches;
pub mod range;
pub mod reporter;

pub use matches::{AnyAmount, CallMatches, Single, SomeAmount};
pub use range::CallCountRange;
pub use reporter::{
    CollectingReporter, Failure, FailureReporter, PanicReporter, SourceLocation, TracingReporter,
};

/// Verification entry point for one ledger
#[derive(Clone)]
pub struct Verifier {
    ledger: Ledger,
    reporter: Arc<dyn FailureReporter>,
    exclusive: bool,
    include_ledger_dump: bool,
}

impl Verifier {
    /// Verifier reporting through `PanicReporter`, in exclusive mode
    pub fn new(ledger: Ledger) -> Self {
        Self::with_config(ledger, &MockConfig::default())
    }

    pub fn with_config(ledger: Ledger, config: &MockConfig) -> Self {
        Self {
            ledger,
            reporter: Arc::new(PanicReporter),
            exclusive: config.exclusive_by_default,
            include_ledger_dump: config.include_ledger_dump,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Also flag calls to the same signature made with other types
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Append the ledger dump to failure messages
    pub fn with_ledger_dump(mut self, include: bool) -> Self {
        self.include_ledger_dump = include;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn report(&self, message: String, location: &SourceLocation) {
        let message = if self.include_ledger_dump {
            format!("{}\nrecorded calls:\n{}", message, self.ledger.dump())
        } else {
            message
        };
        self.reporter.report(&message, location);
    }

    /// Calls to `signature` of type `(I, O)`, with the two-tier diagnostics
    /// for "never called" and "never called with these types".
    fn typed_calls<I, O>(
        &self,
        signature: &Signature,
        location: &SourceLocation,
    ) -> (Vec<Arc<dyn ErasedCall>>, Vec<Arc<RecordedCall<I, O>>>)
    where
        I: Clone + Send + Sync + 'static,
        O: 'static,
    {
        let all = self.ledger.calls_matching(signature);
        if all.is_empty() {
            self.report(format!("no calls to {} were recorded", signature), location);
            return (all, Vec::new());
        }

        let typed: Vec<_> = all.iter().filter_map(downcast_call::<I, O>).collect();
        if typed.is_empty() {
            self.report(
                format!(
                    "no calls to {} with input type {} and output type {} were recorded",
                    signature,
                    TypeTag::of::<I>(),
                    TypeTag::of::<O>()
                ),
                location,
            );
        }
        (all, typed)
    }

    /// In exclusive mode, report calls to the signature made with other types
    fn check_exclusive<I: 'static, O: 'static>(
        &self,
        signature: &Signature,
        all: &[Arc<dyn ErasedCall>],
        location: &SourceLocation,
    ) {
        if !self.exclusive {
            return;
        }
        let unexpected: Vec<String> = all
            .iter()
            .filter(|call| !is_call_of::<I, O>(call.as_ref()))
            .map(|call| format!("  {}", call.debug_description()))
            .collect();
        if unexpected.is_empty() {
            return;
        }
        tracing::warn!(
            signature = %signature,
            count = unexpected.len(),
            "unexpected calls with other types"
        );
        self.report(
            format!(
                "found {} unexpected call(s) to {} with types other than input {} and output {}:\n{}",
                unexpected.len(),
                signature,
                TypeTag::of::<I>(),
                TypeTag::of::<O>(),
                unexpected.join("\n")
            ),
            location,
        );
    }

    fn finish<I, O>(
        &self,
        signature: Signature,
        all: &[Arc<dyn ErasedCall>],
        matched: Vec<Arc<RecordedCall<I, O>>>,
        location: &SourceLocation,
    ) -> CallMatches<I, O>
    where
        I: 'static,
        O: 'static,
    {
        if !matched.is_empty() {
            self.check_exclusive::<I, O>(&signature, all, location);
        }
        CallMatches::new(signature, matched, Arc::clone(&self.reporter))
    }

    /// Calls to `signature` with input `I` and output `O`
    #[track_caller]
    pub fn expect_called<I, O>(&self, signature: impl Into<Signature>) -> CallMatches<I, O>
    where
        I: Clone + Send + Sync + 'static,
        O: 'static,
    {
        let location = SourceLocation::caller();
        let signature = signature.into();
        let (all, typed) = self.typed_calls::<I, O>(&signature, &location);
        self.finish(signature, &all, typed, &location)
    }

    /// Calls to `signature` whose input equals `expected`.
    ///
    /// Tuple inputs compare component-wise, stopping at the first mismatch.
    #[track_caller]
    pub fn expect_called_with<I, O>(
        &self,
        signature: impl Into<Signature>,
        expected: &I,
    ) -> CallMatches<I, O>
    where
        I: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
        O: 'static,
    {
        let location = SourceLocation::caller();
        let signature = signature.into();
        let (all, typed) = self.typed_calls::<I, O>(&signature, &location);
        if typed.is_empty() {
            return self.finish(signature, &all, typed, &location);
        }

        let matched: Vec<_> = typed
            .iter()
            .filter(|call| call.input() == expected)
            .cloned()
            .collect();
        if matched.is_empty() {
            let recorded: Vec<String> = typed
                .iter()
                .map(|call| format!("+{:?}", call.input()))
                .collect();
            self.report(
                format!(
                    "no calls to {} with the expected input were recorded\n-{:?}\n{}",
                    signature,
                    expected,
                    recorded.join("\n")
                ),
                &location,
            );
        }
        self.finish(signature, &all, matched, &location)
    }

    /// Calls to `signature` whose input satisfies `predicate`
    #[track_caller]
    pub fn expect_called_matching<I, O, P>(
        &self,
        signature: impl Into<Signature>,
        description: &str,
        predicate: P,
    ) -> CallMatches<I, O>
    where
        I: Clone + fmt::Debug + Send + Sync + 'static,
        O: 'static,
        P: Fn(&I) -> bool,
    {
        let location = SourceLocation::caller();
        let signature = signature.into();
        let (all, typed) = self.typed_calls::<I, O>(&signature, &location);
        if typed.is_empty() {
            return self.finish(signature, &all, typed, &location);
        }

        let matched: Vec<_> = typed
            .iter()
            .filter(|call| predicate(call.input()))
            .cloned()
            .collect();
        if matched.is_empty() {
            let recorded: Vec<String> = typed
                .iter()
                .map(|call| format!("+{:?}", call.input()))
                .collect();
            self.report(
                format!(
                    "no calls to {} matching {} were recorded\n{}",
                    signature,
                    description,
                    recorded.join("\n")
                ),
                &location,
            );
        }
        self.finish(signature, &all, matched, &location)
    }

    /// Report a failure unless `signature` was called with any types
    #[track_caller]
    pub fn was_called(&self, signature: impl Into<Signature>) {
        let signature = signature.into();
        if self.ledger.call_count_matching(&signature) == 0 {
            self.report(
                format!("no calls to {} were recorded", signature),
                &SourceLocation::caller(),
            );
        }
    }

    /// Report a failure unless `signature` was called with input `expected`
    #[track_caller]
    pub fn was_called_with<I, O>(&self, signature: impl Into<Signature>, expected: &I)
    where
        I: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
        O: 'static,
    {
        let _ = self.expect_called_with::<I, O>(signature, expected);
    }

    /// Report a failure if `signature` was called at all
    #[track_caller]
    pub fn was_not_called(&self, signature: impl Into<Signature>) {
        let signature = signature.into();
        let count = self.ledger.call_count_matching(&signature);
        if count > 0 {
            self.report(
                format!("{} to {} {} recorded", plural_calls(count), signature, were(count)),
                &SourceLocation::caller(),
            );
        }
    }

    /// Report a failure if `signature` was called with input `I` and output `O`
    #[track_caller]
    pub fn was_not_called_typed<I, O>(&self, signature: impl Into<Signature>)
    where
        I: Clone + Send + Sync + 'static,
        O: 'static,
    {
        let signature = signature.into();
        let count = self.ledger.calls_matching_typed::<I, O>(&signature).len();
        if count > 0 {
            self.report(
                format!(
                    "{} to {} with input type {} and output type {} {} recorded",
                    plural_calls(count),
                    signature,
                    TypeTag::of::<I>(),
                    TypeTag::of::<O>(),
                    were(count)
                ),
                &SourceLocation::caller(),
            );
        }
    }
}

fn plural_calls(count: usize) -> String {
    if count == 1 {
        "1 call".to_string()
    } else {
        format!("{} calls", count)
    }
}

fn were(count: usize) -> &'static str {
    if count == 1 {
        "was"
    } else {
        "were"
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("ledger", &self.ledger)
            .field("exclusive", &self.exclusive)
            .field("include_ledger_dump", &self.include_ledger_dump)
            .finish()
    }
}
