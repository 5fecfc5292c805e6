// Failure reporting
//
// Verification never returns errors for failed expectations; it hands a
// message and the caller's source location to a reporter, which decides how
// the failure surfaces.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use parking_lot::Mutex;

/// Where a verification was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Location of the code calling into the verification API
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Sink for verification failures
pub trait FailureReporter: Send + Sync {
    fn report(&self, message: &str, location: &SourceLocation);
}

impl<F> FailureReporter for F
where
    F: Fn(&str, &SourceLocation) + Send + Sync,
{
    fn report(&self, message: &str, location: &SourceLocation) {
        self(message, location)
    }
}

/// Fails the current test by panicking
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn report(&self, message: &str, location: &SourceLocation) {
        panic!("{}\n  at {}", message, location);
    }
}

/// Logs failures through `tracing` and lets the test continue
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, message: &str, location: &SourceLocation) {
        tracing::error!(%location, "{}", message);
    }
}

/// One reported failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub location: SourceLocation,
}

/// Accumulates failures so a test can check several expectations at once
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        self.failures.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.failures
            .lock()
            .iter()
            .map(|failure| failure.message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Remove and return every collected failure
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.lock())
    }

    /// Panic with every collected failure, if there are any
    #[track_caller]
    pub fn finish(&self) {
        let failures = self.take();
        if failures.is_empty() {
            return;
        }
        let rendered: Vec<String> = failures
            .iter()
            .map(|failure| format!("{}\n  at {}", failure.message, failure.location))
            .collect();
        panic!(
            "{} verification failure(s):\n{}",
            failures.len(),
            rendered.join("\n")
        );
    }
}

impl FailureReporter for CollectingReporter {
    fn report(&self, message: &str, location: &SourceLocation) {
        self.failures.lock().push(Failure {
            message: message.to_string(),
            location: *location,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        let location = SourceLocation::caller();
        reporter.report("first", &location);
        reporter.report("second", &location);

        assert_eq!(reporter.messages(), vec!["first", "second"]);
        assert_eq!(reporter.failures()[0].location.file, file!());
        assert_eq!(reporter.take().len(), 2);
        assert!(reporter.is_empty());
        reporter.finish();
    }

    #[test]
    #[should_panic(expected = "2 verification failure(s)")]
    fn test_finish_panics_with_all_failures() {
        let reporter = CollectingReporter::new();
        let location = SourceLocation::caller();
        reporter.report("first", &location);
        reporter.report("second", &location);
        reporter.finish();
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter =
            move |message: &str, _: &SourceLocation| sink.lock().push(message.to_string());
        reporter.report("boom", &SourceLocation::caller());
        assert_eq!(seen.lock().as_slice(), ["boom".to_string()]);
    }

    #[test]
    #[should_panic(expected = "not called")]
    fn test_panic_reporter() {
        PanicReporter.report("not called", &SourceLocation::caller());
    }
}
