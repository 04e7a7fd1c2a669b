//! Run report.

use chrono::{DateTime, Duration, Utc};
use reseal_core::time::{elapsed_since, pretty_duration};
use reseal_types::{ControllerRef, Reporter, RotationOutcome, RunMode, SealedSecretRef};
use serde::Serialize;

/// Outcome of one inventoried secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// The secret
    pub secret: SealedSecretRef,
    /// What happened to it
    #[serde(flatten)]
    pub outcome: RotationOutcome,
}

/// Ordered record of every secret a run attempted.
///
/// Purely observational: nothing in the run consults it to decide what
/// to do next.
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    mode: RunMode,
    controller: ControllerRef,
    entries: Vec<ReportEntry>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl RotationReport {
    /// Start an empty report.
    pub fn new(mode: RunMode, controller: ControllerRef) -> Self {
        Self {
            mode,
            controller,
            entries: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Append the outcome for `secret`.
    pub fn record(&mut self, secret: SealedSecretRef, outcome: RotationOutcome) {
        self.entries.push(ReportEntry { secret, outcome });
    }

    /// Mark the run finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run mode the report was produced under.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Every entry, in processing order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Secrets rotated (or simulated), in processing order.
    pub fn processed(&self) -> impl Iterator<Item = &SealedSecretRef> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_success())
            .map(|e| &e.secret)
    }

    /// Failed secrets with their reasons, in processing order.
    pub fn failures(&self) -> impl Iterator<Item = (&SealedSecretRef, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.reason().map(|reason| (&e.secret, reason)))
    }

    /// Number of successful entries.
    pub fn processed_count(&self) -> usize {
        self.processed().count()
    }

    /// Number of failed entries.
    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.processed_count()
    }

    /// Wall time of the run, up to now if it has not finished.
    pub fn duration(&self) -> Duration {
        match self.finished_at {
            Some(finished) => finished.signed_duration_since(self.started_at),
            None => elapsed_since(self.started_at),
        }
    }

    /// Narrate the summary through `reporter`.
    pub fn render(&self, reporter: &dyn Reporter) {
        reporter.section("Rotation Complete");

        let verb = if self.mode.is_dry_run() { "simulated" } else { "processed" };
        reporter.info(&format!(
            "Total SealedSecrets {}: {}",
            verb,
            self.processed_count()
        ));
        for secret in self.processed() {
            reporter.success(&format!("{} {}", secret, verb));
        }

        if self.failed_count() > 0 {
            reporter.info(&format!("Total SealedSecrets failed: {}", self.failed_count()));
            for (secret, reason) in self.failures() {
                reporter.error(&format!("{}: {}", secret, reason));
            }
        }

        reporter.info(&format!(
            "Finished in {} using controller {}",
            pretty_duration(self.duration()),
            self.controller
        ));
    }
}
