use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion state reported with every progress write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CompletionStatus {
    pub fn from_percent(percent: f64, completion_threshold: f64) -> Self {
        if percent >= completion_threshold {
            CompletionStatus::Completed
        } else if percent > 0.0 {
            CompletionStatus::InProgress
        } else {
            CompletionStatus::NotStarted
        }
    }
}

/// A playback position reported by the host, in seconds and percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub time: f64,
    pub percent: f64,
}

impl ProgressSample {
    /// Builds a sample, clamping percent to 0..=100 and rejecting non-finite input.
    pub fn new(time: f64, percent: f64) -> Self {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self { time, percent }
    }

    /// Derives a sample from a position and a total duration, both in seconds.
    pub fn from_position(time: f64, duration: f64) -> Self {
        let percent = if duration > 0.0 {
            time / duration * 100.0
        } else {
            0.0
        };
        Self::new(time, percent)
    }

    pub fn status(&self, completion_threshold: f64) -> CompletionStatus {
        CompletionStatus::from_percent(self.percent, completion_threshold)
    }
}

/// Body of an authenticated lesson progress upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressUpdate {
    pub video_time_position: f64,
    /// 0-100
    pub chapter_progress: u8,
    pub completion_status: CompletionStatus,
    pub timestamp: DateTime<Utc>,
}

impl LessonProgressUpdate {
    pub fn from_sample(
        sample: &ProgressSample,
        completion_threshold: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            video_time_position: sample.time,
            chapter_progress: sample.percent.round().clamp(0.0, 100.0) as u8,
            completion_status: sample.status(completion_threshold),
            timestamp,
        }
    }
}

/// Unload-time variant of the upsert. The credential travels in the body
/// because the teardown transport cannot rely on custom headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnloadFlushPayload {
    #[serde(flatten)]
    pub update: LessonProgressUpdate,
    pub access_token: String,
    pub unload_flush: bool,
    pub session_id: Uuid,
}

impl UnloadFlushPayload {
    pub fn new(update: LessonProgressUpdate, access_token: String, session_id: Uuid) -> Self {
        Self {
            update,
            access_token,
            unload_flush: true,
            session_id,
        }
    }
}
