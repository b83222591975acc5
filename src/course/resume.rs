use std::time::Duration;
use tracing::debug;

use super::index::LessonIndex;
use crate::models::{LessonId, ResumeMarker, ResumePoint};

/// Pick the lesson a learner should land on.
///
/// Rules, in priority order:
/// 1. With a marker whose lesson is in the index: a completed marker lesson
///    (flag set, or marker/index percent at the completion threshold) with a
///    successor advances to the successor; otherwise the first incomplete
///    lesson; otherwise the last lesson.
/// 2. Without a usable marker: the first incomplete lesson, else the first lesson.
/// 3. An empty index falls back to the explicitly requested lesson.
///
/// Returns `None` only when there are no lessons and nothing was requested.
pub fn resolve_initial_lesson(
    marker: Option<&ResumeMarker>,
    index: &LessonIndex,
    requested: Option<&LessonId>,
) -> Option<LessonId> {
    if index.is_empty() {
        if requested.is_some() {
            debug!("Course has no lessons, using requested lesson");
        }
        return requested.cloned();
    }

    let threshold = index.completion_threshold();

    if let Some(marker) = marker
        && let Some(lesson) = index.get(&marker.last_lesson_id)
    {
        let marker_complete = lesson.is_complete(threshold)
            || marker.last_lesson_progress_percent >= threshold;

        if marker_complete && let Some(next) = index.next(&lesson.id) {
            debug!("Resume lesson {} is complete, advancing to {}", lesson.id, next.id);
            return Some(next.id.clone());
        }

        if let Some(incomplete) = index.first_incomplete() {
            return Some(incomplete.id.clone());
        }

        return index.last().map(|lesson| lesson.id.clone());
    }

    if let Some(marker) = marker {
        debug!(
            "Resume lesson {} is not part of this course, ignoring marker",
            marker.last_lesson_id
        );
    }

    index
        .first_incomplete()
        .or_else(|| index.first())
        .map(|lesson| lesson.id.clone())
}

/// Resolve the initial lesson plus the offset to seek to.
///
/// Playback resumes mid-lesson only when the resolved lesson is the marker's
/// own lesson, it is not complete, and the saved position is at least
/// `resume_threshold`.
pub fn resolve_resume_point(
    marker: Option<&ResumeMarker>,
    index: &LessonIndex,
    requested: Option<&LessonId>,
    resume_threshold: Duration,
) -> Option<ResumePoint> {
    let lesson_id = resolve_initial_lesson(marker, index, requested)?;
    let start_at = marker
        .filter(|marker| marker.last_lesson_id == lesson_id)
        .filter(|marker| {
            marker.last_lesson_progress_percent < index.completion_threshold()
                && !index.is_complete(&lesson_id)
        })
        .and_then(|marker| Duration::try_from_secs_f64(marker.last_video_time_position).ok())
        .filter(|start_at| *start_at >= resume_threshold)
        .unwrap_or(Duration::ZERO);

    Some(ResumePoint {
        lesson_id,
        start_at,
    })
}
