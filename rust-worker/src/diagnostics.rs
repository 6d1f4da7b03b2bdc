//! Diagnostics channel for recoverable per-message failures.
//!
//! The handler reports through a `Diagnostics` value it is given at
//! construction, so tests can observe failures without capturing process
//! output.

use std::sync::Mutex;

use tracing::error;

use crate::error::HandleError;

/// Maximum number of raw bytes included in a failure report.
const PREVIEW_LEN: usize = 500;

/// Receives one report per failed message.
pub trait Diagnostics: Send + Sync {
    /// Report that `raw` could not be relayed.
    fn report(&self, raw: &str, failure: &HandleError);
}

/// Default channel: structured `error!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, raw: &str, failure: &HandleError) {
        match failure {
            HandleError::Decode(e) => {
                error!(
                    error = %e,
                    syntax_error = e.is_syntax(),
                    body_length = raw.len(),
                    body_preview = %preview(raw),
                    "relay_message_decode_failed"
                );
            }
            HandleError::Delivery(e) => {
                error!(
                    error = %e,
                    body_length = raw.len(),
                    "relay_message_delivery_failed"
                );
            }
        }
    }
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: &'static str,
    pub error: String,
    pub raw: String,
}

/// In-memory channel that keeps every report, for tests and embedding.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    reports: Mutex<Vec<Report>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports received so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, raw: &str, failure: &HandleError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(Report {
                kind: failure.kind(),
                error: failure.to_string(),
                raw: raw.to_string(),
            });
        }
    }
}

/// First `PREVIEW_LEN` bytes of `raw`, cut on a char boundary.
fn preview(raw: &str) -> &str {
    if raw.len() <= PREVIEW_LEN {
        return raw;
    }
    let mut end = PREVIEW_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;

    #[test]
    fn test_collecting_diagnostics_records() {
        let diagnostics = CollectingDiagnostics::new();
        assert!(diagnostics.is_empty());

        let failure = HandleError::from(DeliveryError::Rejected("down".to_string()));
        diagnostics.report("{}", &failure);

        let reports = diagnostics.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, "relay_message_delivery_failed");
        assert_eq!(reports[0].raw, "{}");
    }

    #[test]
    fn test_tracing_diagnostics_does_not_panic() {
        let failure = HandleError::from(crate::message::decode("{invalid-json}").unwrap_err());
        TracingDiagnostics.report("{invalid-json}", &failure);
    }

    #[test]
    fn test_preview_respects_char_boundary() {
        let raw = "é".repeat(400);
        let p = preview(&raw);
        assert!(p.len() <= PREVIEW_LEN);
        assert!(raw.starts_with(p));
        assert_eq!(preview("short"), "short");
    }
}
