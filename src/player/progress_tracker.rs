use std::collections::HashSet;
use tokio::time::Instant;
use tracing::trace;

use crate::config::TrackingConfig;
use crate::models::{LessonId, ProgressSample};

/// Host document visibility as reported by the embedding surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Values from the last accepted write for the active lesson.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleState {
    pub percent: f64,
    pub time: f64,
    pub sent_at: Instant,
}

/// Outcome of evaluating one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleDecision {
    /// Persist this sample. `newly_completed` is set when the sample moved
    /// the lesson into the completed set.
    Write {
        lesson_id: LessonId,
        sample: ProgressSample,
        newly_completed: bool,
    },
    /// Too close to the last accepted write
    Throttled,
    /// Background documents never produce writes
    Hidden,
    NoActiveLesson,
}

/// Decides which playback samples become progress writes.
///
/// Owns the throttle state and the optimistic completed-lessons set. The set
/// only grows: it is seeded from the course load and extended as soon as a
/// sample crosses the completion threshold, before the server confirms. It
/// may briefly disagree with the server and converges on the next
/// successful write.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: TrackingConfig,
    active_lesson: Option<LessonId>,
    last_sent: Option<ThrottleState>,
    completed: HashSet<LessonId>,
}

impl ProgressTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            active_lesson: None,
            last_sent: None,
            completed: HashSet::new(),
        }
    }

    /// Seed the completed set from loaded course data
    pub fn with_completed(mut self, completed: impl IntoIterator<Item = LessonId>) -> Self {
        self.completed.extend(completed);
        self
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn active_lesson(&self) -> Option<&LessonId> {
        self.active_lesson.as_ref()
    }

    /// Switch lessons. The new lesson starts with no throttle history.
    pub fn set_active_lesson(&mut self, lesson_id: LessonId) {
        self.active_lesson = Some(lesson_id);
        self.reset_throttle();
    }

    pub fn clear_active_lesson(&mut self) {
        self.active_lesson = None;
        self.reset_throttle();
    }

    fn reset_throttle(&mut self) {
        self.last_sent = None;
    }

    pub fn throttle_state(&self) -> Option<&ThrottleState> {
        self.last_sent.as_ref()
    }

    pub fn completed_lessons(&self) -> &HashSet<LessonId> {
        &self.completed
    }

    pub fn is_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed.contains(lesson_id)
    }

    /// Returns true if the lesson was not already known as complete
    pub fn mark_completed(&mut self, lesson_id: LessonId) -> bool {
        self.completed.insert(lesson_id)
    }

    pub fn is_completion(&self, percent: f64) -> bool {
        percent >= self.config.completion_threshold_percent
    }

    /// Check if a sample qualifies for a write based on throttle state
    pub fn should_write(&self, sample: &ProgressSample, now: Instant) -> bool {
        if self.is_completion(sample.percent) {
            return true;
        }

        let Some(last) = self.last_sent else {
            return true;
        };

        let interval_elapsed =
            now.saturating_duration_since(last.sent_at) >= self.config.min_write_interval();
        let percent_moved = (sample.percent - last.percent).abs() >= self.config.min_percent_delta;
        let time_moved = (sample.time - last.time).abs() >= self.config.min_time_delta_secs;

        interval_elapsed && (percent_moved || time_moved)
    }

    /// Evaluate a sample for the active lesson and record it when accepted
    pub fn evaluate(
        &mut self,
        sample: ProgressSample,
        visibility: Visibility,
        now: Instant,
    ) -> SampleDecision {
        if visibility == Visibility::Hidden {
            trace!("Dropping sample while hidden: {:?}", sample);
            return SampleDecision::Hidden;
        }

        let Some(lesson_id) = self.active_lesson.clone() else {
            return SampleDecision::NoActiveLesson;
        };

        if !self.should_write(&sample, now) {
            trace!("Throttled sample for lesson {}: {:?}", lesson_id, sample);
            return SampleDecision::Throttled;
        }

        self.last_sent = Some(ThrottleState {
            percent: sample.percent,
            time: sample.time,
            sent_at: now,
        });

        let newly_completed =
            self.is_completion(sample.percent) && self.completed.insert(lesson_id.clone());

        SampleDecision::Write {
            lesson_id,
            sample,
            newly_completed,
        }
    }
}
