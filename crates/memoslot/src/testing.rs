// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test utilities for log validation.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// Formatted log output of the current thread, collected for assertions.
///
/// Capture starts with [`LogCapture::start`] and lasts until the returned guard is dropped.
/// Events from other threads are not collected.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Installs a thread-local subscriber writing into a fresh buffer.
    #[must_use]
    pub fn start() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber =
            tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(capture.clone()).with_ansi(false));
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Returns everything captured so far.
    #[must_use]
    pub fn output(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Counts the occurrences of `needle` in the captured output.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.output().matches(needle).count()
    }

    /// Panics with the full output unless it contains `expected`.
    pub fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(output.contains(expected), "expected '{expected}' in log output:\n{output}");
    }

    /// Panics with the full output if it contains `unexpected`.
    pub fn assert_not_contains(&self, unexpected: &str) {
        let output = self.output();
        assert!(!output.contains(unexpected), "did not expect '{unexpected}' in log output:\n{output}");
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
