use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CourseId, LessonId, ModuleId};

/// A leaf unit of course content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    /// Ordinal position within the owning module
    pub position: u32,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub progress_percent: f64,
    /// Last known playback offset in seconds
    #[serde(default)]
    pub last_video_time: f64,
}

impl Lesson {
    pub fn new(id: impl Into<LessonId>, title: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
            duration_minutes: 0.0,
            is_completed: false,
            progress_percent: 0.0,
            last_video_time: 0.0,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_progress(mut self, percent: f64) -> Self {
        self.progress_percent = percent;
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self.progress_percent = 100.0;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_minutes * 60.0).unwrap_or(Duration::ZERO)
    }

    /// A lesson counts as complete when flagged or when its progress reached the threshold.
    pub fn is_complete(&self, completion_threshold: f64) -> bool {
        self.is_completed || self.progress_percent >= completion_threshold
    }
}

/// An ordered container of lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    pub position: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn new(id: impl Into<ModuleId>, title: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
            lessons: Vec::new(),
        }
    }

    pub fn with_lessons(mut self, lessons: Vec<Lesson>) -> Self {
        self.lessons = lessons;
        self
    }
}

/// Course layout as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStructure {
    pub course_id: CourseId,
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Server-persisted record of where the learner left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMarker {
    pub last_lesson_id: LessonId,
    #[serde(default)]
    pub last_lesson_progress_percent: f64,
    #[serde(default)]
    pub last_video_time_position: f64,
    pub last_watched_at: DateTime<Utc>,
}

impl ResumeMarker {
    pub fn new(lesson_id: impl Into<LessonId>, percent: f64, time_position: f64) -> Self {
        Self {
            last_lesson_id: lesson_id.into(),
            last_lesson_progress_percent: percent,
            last_video_time_position: time_position,
            last_watched_at: Utc::now(),
        }
    }
}

/// Lesson to open on load and the offset to seek to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePoint {
    pub lesson_id: LessonId,
    pub start_at: Duration,
}

/// Aggregate completion numbers for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl CourseProgressSummary {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}
