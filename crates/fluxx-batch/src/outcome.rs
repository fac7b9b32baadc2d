//! Per-operation outcomes and batch progress.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operation::RecordId;

/// Result of one operation.
///
/// Exactly one of `id` and `error` is set: `id` on success, `error` on
/// permanent failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub index: usize,
    pub id: Option<RecordId>,
    pub error: Option<String>,
}

impl Outcome {
    pub fn success(index: usize, id: RecordId) -> Self {
        Self {
            index,
            id: Some(id),
            error: None,
        }
    }

    pub fn failure(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Snapshot of batch progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: &Outcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_done(&self) -> bool {
        self.completed() >= self.total
    }

    /// Completion percentage; an empty batch is complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed() as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%), {} succeeded, {} failed",
            self.completed(),
            self.total,
            self.percent(),
            self.succeeded,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_json_shape() {
        let ok = Outcome::success(0, RecordId::Int(101));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"index": 0, "id": 101, "error": null})
        );

        let failed = Outcome::failure(3, "invalid field");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"index": 3, "id": null, "error": "invalid field"})
        );
        assert!(!failed.is_success());
    }

    #[test]
    fn test_progress() {
        let mut progress = Progress::new(4);
        progress.record(&Outcome::success(0, RecordId::Int(1)));
        progress.record(&Outcome::failure(1, "boom"));

        assert_eq!(progress.completed(), 2);
        assert_eq!(progress.percent(), 50.0);
        assert!(!progress.is_done());
        assert_eq!(
            progress.to_string(),
            "2/4 (50.0%), 1 succeeded, 1 failed"
        );

        assert_eq!(Progress::new(0).percent(), 100.0);
        assert!(Progress::new(0).is_done());
    }
}
