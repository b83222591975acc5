use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::models::{LessonId, ProgressSample};

/// Periodic checkpoint timer bound to the lesson that was active when it was
/// armed. Ticks carry that lesson id so the owner can discard stale ones.
#[derive(Debug)]
pub struct AutosaveTimer {
    lesson_id: LessonId,
    interval: Interval,
}

impl AutosaveTimer {
    pub fn start(lesson_id: LessonId, period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            lesson_id,
            interval,
        }
    }

    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    /// Cancel safe: can be used as a `select!` branch
    pub async fn tick(&mut self) -> LessonId {
        self.interval.tick().await;
        self.lesson_id.clone()
    }
}

/// Re-derive a sample from the last known position. Nothing is produced until
/// a position and a usable duration are known.
pub fn derive_sample(current_time: Option<f64>, duration: Duration) -> Option<ProgressSample> {
    let time = current_time?;
    let duration = duration.as_secs_f64();
    if duration <= 0.0 {
        return None;
    }
    Some(ProgressSample::from_position(time, duration))
}
