use course_player::Visibility;
use course_player::models::{CompletionStatus, LessonId};
use std::time::Duration;
use tokio::time::sleep;

use crate::common::*;

async fn started() -> TestEngine {
    let engine = EngineBuilder::new(Fixtures::fresh_course()).build();
    engine.handle.initialize(None).await.unwrap();
    engine
}

// Hidden documents never feed the throttle, completion samples included.
// The hide transition itself is covered separately by the unload flush.
#[tokio::test(start_paused = true)]
async fn test_hidden_drops_completion_samples() {
    let engine = started().await;
    engine.handle.set_visibility(Visibility::Hidden);

    engine.sample(590.0, 98.0).await;

    assert!(engine.backend.writes().is_empty());
    assert!(engine.recorder.completions().is_empty());
    let snapshot = engine.handle.snapshot().await.unwrap();
    assert!(snapshot.completed_lessons.is_empty());
    assert_eq!(snapshot.visibility, Visibility::Hidden);

    engine.handle.set_visibility(Visibility::Visible);
    engine.sample(590.0, 98.0).await;
    assert_eq!(engine.backend.writes().len(), 1);
    assert_eq!(engine.recorder.completions(), vec![LessonId::new("L1")]);
}

#[tokio::test(start_paused = true)]
async fn test_hiding_discards_pending_sample() {
    let engine = started().await;

    engine.handle.report_progress(60.0, 10.0);
    engine.handle.set_visibility(Visibility::Hidden);
    sleep(Duration::from_secs(2)).await;
    engine.settle().await;

    assert!(engine.backend.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hide_flushes_current_position() {
    let engine = started().await;
    engine.handle.set_media_duration(600.0);
    engine.sample(120.0, 20.0).await;

    engine.handle.set_visibility(Visibility::Hidden);
    engine.settle().await;

    let flushes = engine.backend.flushes();
    assert_eq!(flushes.len(), 1);
    let payload = &flushes[0].payload;
    assert_eq!(flushes[0].lesson_id, LessonId::new("L1"));
    assert!(payload.unload_flush);
    assert_eq!(payload.access_token, "token-abc");
    assert_eq!(payload.update.video_time_position, 120.0);
    assert_eq!(payload.update.chapter_progress, 20);

    // Repeated hidden reports are not transitions
    engine.handle.set_visibility(Visibility::Hidden);
    engine.settle().await;
    assert_eq!(engine.backend.flushes().len(), 1);

    engine.handle.set_visibility(Visibility::Visible);
    engine.handle.set_visibility(Visibility::Hidden);
    engine.settle().await;
    let flushes = engine.backend.flushes();
    assert_eq!(flushes.len(), 2);
    assert_eq!(flushes[0].payload.session_id, flushes[1].payload.session_id);
}

#[tokio::test(start_paused = true)]
async fn test_page_hide_flushes_without_completing() {
    let engine = started().await;
    engine.handle.set_media_duration(600.0);
    engine.sample(120.0, 20.0).await;

    engine.handle.report_progress(590.0, 98.0);
    engine.handle.page_hide();
    engine.settle().await;

    let flushes = engine.backend.flushes();
    assert_eq!(flushes.len(), 1);
    assert_eq!(flushes[0].payload.update.video_time_position, 590.0);
    assert_eq!(
        flushes[0].payload.update.completion_status,
        CompletionStatus::Completed
    );
    assert!(engine.recorder.completions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_skipped_without_cached_credential() {
    let engine = started().await;

    engine.handle.report_progress(30.0, 5.0);
    engine.handle.page_hide();
    engine.handle.set_visibility(Visibility::Hidden);
    engine.settle().await;

    assert!(engine.backend.flushes().is_empty());
    assert!(engine.recorder.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_skipped_before_any_position() {
    let engine = started().await;
    engine.sample(30.0, 5.0).await;
    engine.handle.select_lesson(LessonId::new("L2")).await.unwrap();

    engine.handle.page_hide();
    engine.settle().await;

    assert!(engine.backend.flushes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_oversized_media_duration_falls_back_to_catalogue() {
    let engine = started().await;
    engine.handle.set_media_duration(1e25);
    engine.handle.set_media_duration(f64::INFINITY);
    engine.sample(120.0, 20.0).await;

    engine.handle.set_visibility(Visibility::Hidden);
    engine.settle().await;

    // L1 is ten minutes in the catalogue
    let flushes = engine.backend.flushes();
    assert_eq!(flushes.len(), 1);
    assert_eq!(flushes[0].payload.update.video_time_position, 120.0);
    assert_eq!(flushes[0].payload.update.chapter_progress, 20);
}
