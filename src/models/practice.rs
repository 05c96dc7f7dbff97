use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Legacy practice-time log entry, keyed by timestamp rather than by slot.
///
/// The boolean arrays on [`super::Student`] are the canonical record of
/// practice sessions; this log predates them and is kept as a separate,
/// unsupported surface. The two representations are never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeHour {
    pub id: Uuid,
    /// Either 0.5 or 1.0 hours.
    pub duration: f64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for logging a practice hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePracticeHourInput {
    pub duration: f64,
}

impl CreatePracticeHourInput {
    /// Only half-hour and full-hour sessions exist.
    pub fn is_valid_duration(&self) -> bool {
        self.duration == 0.5 || self.duration == 1.0
    }
}
