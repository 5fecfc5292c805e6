//! Mock Scenario Tests
//!
//! These tests drive a hand-written mock shaped like generated code: every
//! member records the call and resolves its stubbed value through `Mock`.

use std::sync::Arc;

use anyhow::Result;
use mimic_core::error::StubError;
use mimic_core::{CollectingReporter, Mock, MockConfig, Verifier};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
enum ServiceError {
    #[error("service unavailable")]
    Unavailable,
    #[error(transparent)]
    Stub(#[from] StubError),
}

trait WeatherService {
    fn temperature(&self, city: &str) -> u32;
    fn forecast(&self, city: &str, days: u8) -> Result<Vec<i32>, ServiceError>;
    fn report(&self, reading: f64);
}

struct WeatherServiceMock {
    mock: Mock,
}

impl WeatherServiceMock {
    fn new() -> Self {
        Self {
            mock: Mock::new("WeatherServiceMock"),
        }
    }
}

impl WeatherService for WeatherServiceMock {
    fn temperature(&self, city: &str) -> u32 {
        self.mock.invoke("temperature(city:)", city.to_string())
    }

    fn forecast(&self, city: &str, days: u8) -> Result<Vec<i32>, ServiceError> {
        self.mock
            .invoke_fallible("forecast(city:days:)", (city.to_string(), days))
    }

    fn report(&self, reading: f64) {
        self.mock.record("report(_:)", reading);
    }
}

fn collecting(mock: &Mock) -> (Verifier, CollectingReporter) {
    let reporter = CollectingReporter::new();
    let verifier = mock
        .verify()
        .with_reporter(Arc::new(reporter.clone()))
        .with_ledger_dump(false);
    (verifier, reporter)
}

#[test]
fn test_round_trip() -> Result<()> {
    let service = WeatherServiceMock::new();
    service
        .mock
        .stub_output::<String, u32>("temperature(city:)", 72);

    assert_eq!(service.temperature("x"), 72);

    let (verify, reporter) = collecting(&service.mock);
    let calls =
        verify.expect_called_with::<String, u32>("temperature(city:)", &"x".to_string());
    assert_eq!(calls.len(), 1);
    let call = calls.exactly_once().get_matching_call()?;
    assert_eq!(call.input(), "x");
    assert!(reporter.is_empty());
    Ok(())
}

#[test]
fn test_not_called() {
    let service = WeatherServiceMock::new();
    let (verify, reporter) = collecting(&service.mock);

    verify.was_not_called("report(_:)");
    assert!(reporter.is_empty());

    service.report(3.5);
    verify.was_not_called("report(_:)");
    assert_eq!(reporter.messages(), vec!["1 call to report(_:) was recorded"]);
}

#[test]
fn test_range_descriptions() {
    let service = WeatherServiceMock::new();
    service.mock.stub_output::<String, u32>("temperature", 60);
    for city in ["a", "b", "c"] {
        service.temperature(city);
    }

    let (verify, reporter) = collecting(&service.mock);
    verify
        .expect_called::<String, u32>("temperature(city:)")
        .occurring_within(2..=3);
    assert!(reporter.is_empty());

    verify
        .expect_called::<String, u32>("temperature(city:)")
        .occurring_within(0..=2);
    verify
        .expect_called::<String, u32>("temperature(city:)")
        .occurring_within(..3);
    verify
        .expect_called::<String, u32>("temperature(city:)")
        .occurring_within(4..);

    let messages = reporter.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("within 0..=2"));
    assert!(!messages[0].contains("up to 2"));
    assert!(messages[1].contains("fewer than 3"));
    assert!(messages[2].contains("at least 4"));
}

#[test]
fn test_wrong_type_is_not_reported_as_never_called() {
    let mock = Mock::new("LoggerMock");
    mock.record("log(_:)", true);
    mock.record("log(_:)", "message".to_string());
    mock.record("log(_:)", 7_i64);

    let (verify, reporter) = collecting(&mock);
    verify.expect_called::<f64, ()>("log(_:)");
    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("with input type f64"));
    assert_ne!(messages[0], "no calls to log(_:) were recorded");
}

#[test]
fn test_exclusivity() {
    let mock = Mock::new("LoggerMock");
    mock.record("log(_:)", 1_i64);
    mock.record("log(_:)", "stray".to_string());

    let (verify, reporter) = collecting(&mock);
    let calls = verify.expect_called::<i64, ()>("log(_:)");
    assert_eq!(calls.len(), 1);
    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("unexpected call(s)"));
    assert!(messages[0].contains("\"stray\""));

    let relaxed = Mock::with_config("LoggerMock", MockConfig::new().with_exclusive(false));
    relaxed.record("log(_:)", 1_i64);
    relaxed.record("log(_:)", "stray".to_string());
    let (verify, reporter) = collecting(&relaxed);
    verify.expect_called::<i64, ()>("log(_:)").exactly_once();
    assert!(reporter.is_empty());
}

#[test]
fn test_stub_fallback() {
    let service = WeatherServiceMock::new();
    service.mock.stub_output::<String, u32>("temperature", 50);
    assert_eq!(service.temperature("oslo"), 50);

    service
        .mock
        .stub_output::<String, u32>("temperature(city:)", 80);
    assert_eq!(service.temperature("oslo"), 80);
}

#[test]
fn test_fallible_member() -> Result<()> {
    let service = WeatherServiceMock::new();
    assert!(matches!(
        service.forecast("rome", 3),
        Err(ServiceError::Stub(StubError::NoStub {
            registry_empty: true,
            ..
        }))
    ));

    service.mock.stub_error::<(String, u8), Vec<i32>, _>(
        "forecast(city:days:)",
        ServiceError::Unavailable,
    );
    assert_eq!(service.forecast("rome", 3), Err(ServiceError::Unavailable));

    service
        .mock
        .stub_with::<(String, u8), Vec<i32>, _>("forecast(city:days:)", |(_, days)| {
            vec![20; days as usize]
        });
    assert_eq!(service.forecast("rome", 2)?, vec![20, 20]);

    let (verify, reporter) = collecting(&service.mock);
    verify
        .expect_called_matching::<(String, u8), Vec<i32>, _>(
            "forecast",
            "a two day forecast",
            |(_, days)| *days == 2,
        )
        .exactly_once();
    verify
        .expect_called::<(String, u8), Vec<i32>>("forecast(city:days:)")
        .occurring(3);
    assert!(reporter.is_empty());
    Ok(())
}

#[test]
#[should_panic(expected = "no stubs were registered on WeatherServiceMock")]
fn test_missing_stub_on_infallible_member_aborts() {
    let service = WeatherServiceMock::new();
    service.temperature("paris");
}

#[test]
#[should_panic(expected = "registered stubs:")]
fn test_missing_stub_lists_registered_stubs() {
    let service = WeatherServiceMock::new();
    service
        .mock
        .stub_output::<String, u64>("temperature(city:)", 10);
    service.temperature("paris");
}

#[test]
fn test_soft_assertions_accumulate() {
    let service = WeatherServiceMock::new();
    let (verify, reporter) = collecting(&service.mock);

    verify.was_called("temperature");
    verify.was_called("report");
    verify.expect_called::<f64, ()>("report(_:)").exactly_once();
    assert_eq!(reporter.len(), 4);

    let failures = reporter.take();
    assert!(failures
        .iter()
        .all(|failure| failure.location.file.ends_with("mock_scenarios.rs")));
    reporter.finish();
}

#[test]
fn test_call_order_queries() {
    let service = WeatherServiceMock::new();
    service.report(1.0);
    service.report(2.0);
    service.mock.record("reset()", ());

    let ledger = service.mock.ledger();
    let first = ledger.first_call().expect("first call");
    let second = ledger.call_after(first.as_ref()).expect("second call");
    assert_eq!(second.id(), 2);
    assert!(second.time() > first.time());
    assert_eq!(ledger.last_call().expect("last call").signature().text(), "reset()");
    assert!(ledger.call_after(ledger.last_call().expect("last call").as_ref()).is_none());
}
