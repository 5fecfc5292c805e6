//! Logging helpers for tests that exercise mocks

use std::io;
use std::sync::{Arc, Once};

use parking_lot::Mutex;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

static INIT: Once = Once::new();
static DEBUG_INIT: Once = Once::new();

/// Initialize test logging with info level (called once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = init_tracing_subscriber("info");
    });
}

/// Initialize test logging with debug level, which includes every recorded call
pub fn init_debug_logging() {
    DEBUG_INIT.call_once(|| {
        let _ = init_tracing_subscriber("debug");
    });
}

fn init_tracing_subscriber(level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let fmt_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_level(true)
        .with_test_writer();
    tracing::subscriber::set_global_default(Registry::default().with(env_filter).with(fmt_layer))?;

    Ok(())
}

/// Captures formatted log output so tests can assert on it
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriber writing events at `level` and above into this capture
    pub fn subscriber(&self, level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
        fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::new(level))
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .finish()
    }

    /// Run `f` with this capture as the thread's default subscriber
    pub fn capture<R>(&self, level: &str, f: impl FnOnce() -> R) -> R {
        tracing::subscriber::with_default(self.subscriber(level), f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.contents().contains(text)
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Writer handed out by `LogCapture`
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
