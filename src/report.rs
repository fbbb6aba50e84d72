//! Test-lifecycle reporting surface.
//!
//! Verification mismatches accumulate; a run keeps going through all
//! remaining faces, cases and sources so one execution surfaces every
//! discrepancy.

use tracing::{debug, error, info};

/// Sink for a run's lifecycle events.
pub trait Reporter {
    /// Called once, before any GL work, with a description of the run.
    fn begin_description(&mut self, description: &str);

    /// A progress line.
    fn log_step(&mut self, message: &str);

    /// Outcome of one assertion (pixel-rect equality or error-state
    /// check). A failed check does not stop the run.
    fn check(&mut self, passed: bool, message: &str);

    /// A fatal failure; the run terminates after reporting it.
    fn report_failure(&mut self, message: &str);

    /// Number of failed checks and fatal failures so far.
    fn failures(&self) -> usize;

    /// Called exactly once, after the terminal state is reached.
    fn finish(&mut self);
}

/// Reporter logging through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    checks: usize,
    failures: usize,
}

impl ConsoleReporter {
    /// A reporter with empty counters.
    pub fn new() -> ConsoleReporter {
        ConsoleReporter::default()
    }

    /// Number of assertions seen so far.
    pub fn checks(&self) -> usize {
        self.checks
    }
}

impl Reporter for ConsoleReporter {
    fn begin_description(&mut self, description: &str) {
        info!("{}", description);
    }

    fn log_step(&mut self, message: &str) {
        debug!("{}", message);
    }

    fn check(&mut self, passed: bool, message: &str) {
        self.checks += 1;
        if passed {
            debug!("PASS: {}", message);
        } else {
            self.failures += 1;
            error!("FAIL: {}", message);
        }
    }

    fn report_failure(&mut self, message: &str) {
        self.failures += 1;
        error!("{}", message);
    }

    fn failures(&self) -> usize {
        self.failures
    }

    fn finish(&mut self) {
        info!(
            checks = self.checks,
            failures = self.failures,
            "run finished"
        );
    }
}
