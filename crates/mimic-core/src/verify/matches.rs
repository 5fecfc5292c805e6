// Verification results
//
// `CallMatches` carries the calls found by a verification so refinements like
// `exactly_once()` work on the same set without querying the ledger again. The
// `M` parameter records which refinement has been applied.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use mimic_error::{no_calls_error, AssertionResult};

use crate::call::RecordedCall;
use crate::signature::Signature;
use crate::verify::range::CallCountRange;
use crate::verify::reporter::{FailureReporter, SourceLocation};

/// No count has been asserted yet
#[derive(Debug)]
pub struct AnyAmount;

/// Exactly one call was asserted
#[derive(Debug)]
pub struct Single;

/// A specific count or range was asserted
#[derive(Debug)]
pub struct SomeAmount;

/// Calls matching a verification, refined by `M`
pub struct CallMatches<I, O, M = AnyAmount> {
    signature: Signature,
    calls: Vec<Arc<RecordedCall<I, O>>>,
    reporter: Arc<dyn FailureReporter>,
    _mode: PhantomData<M>,
}

pub(crate) fn times(count: usize) -> String {
    if count == 1 {
        "1 time".to_string()
    } else {
        format!("{} times", count)
    }
}

impl<I, O, M> CallMatches<I, O, M> {
    fn refine<N>(self) -> CallMatches<I, O, N> {
        CallMatches {
            signature: self.signature,
            calls: self.calls,
            reporter: self.reporter,
            _mode: PhantomData,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Every matching call, in recording order
    pub fn matching_calls(&self) -> &[Arc<RecordedCall<I, O>>] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn get_first_matching_call(&self) -> AssertionResult<Arc<RecordedCall<I, O>>> {
        self.calls
            .first()
            .cloned()
            .ok_or_else(|| no_calls_error(self.signature.text()))
    }

    pub fn get_last_matching_call(&self) -> AssertionResult<Arc<RecordedCall<I, O>>> {
        self.calls
            .last()
            .cloned()
            .ok_or_else(|| no_calls_error(self.signature.text()))
    }

    /// Recorded inputs of the matching calls
    pub fn inputs(&self) -> impl Iterator<Item = &I> + '_ {
        self.calls.iter().map(|call| call.input())
    }
}

impl<I, O> CallMatches<I, O, AnyAmount> {
    pub(crate) fn new(
        signature: Signature,
        calls: Vec<Arc<RecordedCall<I, O>>>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self {
            signature,
            calls,
            reporter,
            _mode: PhantomData,
        }
    }

    /// Report a failure unless exactly one call matched
    #[track_caller]
    pub fn exactly_once(self) -> CallMatches<I, O, Single> {
        let count = self.calls.len();
        if count != 1 {
            self.reporter.report(
                &format!(
                    "expected {} to be called exactly once, but it was called {}",
                    self.signature,
                    times(count)
                ),
                &SourceLocation::caller(),
            );
        }
        self.refine()
    }

    /// Report a failure unless exactly `expected` calls matched.
    ///
    /// Zero is rejected; assert that a member was not called with
    /// `Verifier::was_not_called` instead.
    #[track_caller]
    pub fn occurring(self, expected: usize) -> CallMatches<I, O, SomeAmount> {
        assert!(
            expected > 0,
            "occurring(0) is not a valid expectation for {}; use was_not_called instead",
            self.signature
        );
        let count = self.calls.len();
        if count != expected {
            self.reporter.report(
                &format!(
                    "expected {} to be called {}, but it was called {}",
                    self.signature,
                    times(expected),
                    times(count)
                ),
                &SourceLocation::caller(),
            );
        }
        self.refine()
    }

    /// Report a failure unless the number of matching calls is in `range`
    #[track_caller]
    pub fn occurring_within(
        self,
        range: impl Into<CallCountRange>,
    ) -> CallMatches<I, O, SomeAmount> {
        let range = range.into();
        let count = self.calls.len();
        if !range.contains(count) {
            self.reporter.report(
                &format!(
                    "expected {} to be called {} times, but it was called {}",
                    self.signature,
                    range.describe(),
                    times(count)
                ),
                &SourceLocation::caller(),
            );
        }
        self.refine()
    }
}

impl<I, O> CallMatches<I, O, Single> {
    /// The single matching call, if the expectation held
    pub fn matching_call(&self) -> Option<&Arc<RecordedCall<I, O>>> {
        self.calls.first()
    }

    pub fn get_matching_call(&self) -> AssertionResult<Arc<RecordedCall<I, O>>> {
        self.get_first_matching_call()
    }
}

impl<I, O, M> fmt::Debug for CallMatches<I, O, M>
where
    I: fmt::Debug + 'static,
    O: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallMatches")
            .field("signature", &self.signature)
            .field("calls", &self.calls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Timestamp;
    use crate::verify::reporter::CollectingReporter;
    use mimic_error::AssertionResultError;

    fn call_set(count: u64, reporter: &CollectingReporter) -> CallMatches<u8, ()> {
        let calls = (1..=count)
            .map(|id| {
                Arc::new(RecordedCall::new(
                    Signature::new("poll()"),
                    id as u8,
                    Timestamp(id),
                    id,
                ))
            })
            .collect();
        CallMatches::new(Signature::new("poll()"), calls, Arc::new(reporter.clone()))
    }

    #[test]
    fn test_exactly_once() {
        let reporter = CollectingReporter::new();
        let single = call_set(1, &reporter).exactly_once();
        assert!(reporter.is_empty());
        assert_eq!(*single.get_matching_call().unwrap().input(), 1);
        assert_eq!(single.matching_call().unwrap().id(), 1);

        call_set(2, &reporter).exactly_once();
        assert_eq!(
            reporter.messages(),
            vec!["expected poll() to be called exactly once, but it was called 2 times"]
        );
    }

    #[test]
    fn test_occurring() {
        let reporter = CollectingReporter::new();
        call_set(3, &reporter).occurring(3);
        assert!(reporter.is_empty());
        call_set(3, &reporter).occurring(1);
        assert_eq!(
            reporter.messages(),
            vec!["expected poll() to be called 1 time, but it was called 3 times"]
        );
    }

    #[test]
    #[should_panic(expected = "use was_not_called instead")]
    fn test_occurring_zero_is_rejected() {
        let reporter = CollectingReporter::new();
        call_set(0, &reporter).occurring(0);
    }

    #[test]
    fn test_occurring_within() {
        let reporter = CollectingReporter::new();
        call_set(3, &reporter).occurring_within(2..=3);
        assert!(reporter.is_empty());

        call_set(3, &reporter).occurring_within(0..=2);
        call_set(5, &reporter).occurring_within(..4);
        call_set(1, &reporter).occurring_within(4..);
        call_set(3, &reporter).occurring_within(..=2);
        assert_eq!(
            reporter.messages(),
            vec![
                "expected poll() to be called within 0..=2 times, but it was called 3 times",
                "expected poll() to be called fewer than 4 times, but it was called 5 times",
                "expected poll() to be called at least 4 times, but it was called 1 time",
                "expected poll() to be called up to 2 times, but it was called 3 times",
            ]
        );
    }

    #[test]
    fn test_accessors_on_empty_set() {
        let reporter = CollectingReporter::new();
        let none = call_set(0, &reporter);
        assert!(matches!(
            none.get_first_matching_call(),
            Err(AssertionResultError::NoCalls { .. })
        ));
        assert!(none.get_last_matching_call().is_err());
        let single = none.exactly_once();
        assert!(single.matching_call().is_none());
        assert!(single.get_matching_call().is_err());
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_first_and_last() {
        let reporter = CollectingReporter::new();
        let set = call_set(3, &reporter);
        assert_eq!(set.get_first_matching_call().unwrap().id(), 1);
        assert_eq!(set.get_last_matching_call().unwrap().id(), 3);
        assert_eq!(set.inputs().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
