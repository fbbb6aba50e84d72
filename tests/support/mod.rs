/*!
Test supports module.

*/

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use texconform::{HarnessContext, Reporter};

static TRACING: Once = Once::new();

/// Installs the fmt subscriber once for the whole test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Builds a harness context, or `None` when the host has no usable
/// display; callers return early in that case.
pub fn build_context() -> Option<HarnessContext> {
    HarnessContext::new().ok()
}

/// Directory holding the binary test fixtures.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixture")
}

/// Reporter recording every lifecycle event for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub description: Option<String>,
    pub steps: Vec<String>,
    pub checks: Vec<(bool, String)>,
    pub fatal: Vec<String>,
    pub finished: bool,
}

impl RecordingReporter {
    pub fn new() -> RecordingReporter {
        RecordingReporter::default()
    }

    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|(passed, _)| !passed)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn begin_description(&mut self, description: &str) {
        self.description = Some(description.to_owned());
    }

    fn log_step(&mut self, message: &str) {
        self.steps.push(message.to_owned());
    }

    fn check(&mut self, passed: bool, message: &str) {
        self.checks.push((passed, message.to_owned()));
    }

    fn report_failure(&mut self, message: &str) {
        self.fatal.push(message.to_owned());
    }

    fn failures(&self) -> usize {
        self.fatal.len() + self.checks.iter().filter(|(passed, _)| !passed).count()
    }

    fn finish(&mut self) {
        assert!(!self.finished, "finish must be called exactly once");
        self.finished = true;
    }
}
