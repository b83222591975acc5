use course_player::backends::http::ApiError;
use course_player::course::{LessonIndex, resolve_initial_lesson};
use course_player::models::{CompletionStatus, LessonId, LessonProgressUpdate, ProgressSample};
use course_player::player::ProgressPersistence;
use course_player::ErrorCode;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::common::*;

async fn started(builder: EngineBuilder) -> TestEngine {
    let engine = builder.build();
    engine.handle.initialize(None).await.unwrap();
    engine
}

#[tokio::test(start_paused = true)]
async fn test_completion_sample_and_reload() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    engine.sample(590.0, 98.0).await;

    let writes = engine.backend.writes_for("L1");
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].update.chapter_progress, 98);
    assert_eq!(writes[0].update.video_time_position, 590.0);
    assert_eq!(writes[0].update.completion_status, CompletionStatus::Completed);
    assert_eq!(engine.recorder.completions(), vec![LessonId::new("L1")]);

    let snapshot = engine.handle.snapshot().await.unwrap();
    assert!(snapshot.completed_lessons.contains(&LessonId::new("L1")));
    assert!(snapshot.index.is_complete(&LessonId::new("L1")));
    assert_eq!(snapshot.summary.completed, 1);

    // A reload sees the marker on L1 at 98% and moves on
    let marker = Fixtures::marker("L1", 98.0, 590.0);
    let reloaded = LessonIndex::build(&Fixtures::fresh_course().modules, 90.0);
    assert_eq!(
        resolve_initial_lesson(Some(&marker), &reloaded, None),
        Some(LessonId::new("L2"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_samples_collapses_into_one_write() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    for i in 0..100 {
        engine
            .handle
            .report_progress(100.0 + i as f64 * 0.01, 20.0 + i as f64 * 0.01);
        sleep(Duration::from_millis(10)).await;
    }
    sleep(Duration::from_secs(2)).await;
    engine.settle().await;

    assert_eq!(engine.backend.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_throttle_needs_interval_and_movement() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    engine.sample(60.0, 10.0).await;
    assert_eq!(engine.backend.writes().len(), 1);

    // Too soon
    engine.sample(80.0, 14.0).await;
    assert_eq!(engine.backend.writes().len(), 1);

    // Interval elapsed, but barely moved
    sleep(Duration::from_secs(20)).await;
    engine.sample(61.0, 10.2).await;
    assert_eq!(engine.backend.writes().len(), 1);

    engine.sample(90.0, 15.0).await;
    let writes = engine.backend.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].update.video_time_position, 90.0);
    assert_eq!(writes[1].update.completion_status, CompletionStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_completion_bypasses_throttle() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    engine.sample(60.0, 10.0).await;
    engine.sample(540.0, 92.0).await;
    engine.sample(541.0, 92.2).await;

    assert_eq!(engine.backend.writes_for("L1").len(), 3);
    assert_eq!(engine.recorder.completions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_steady_stream_is_evaluated_within_max_wait() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    // Samples every 500ms never leave a quiet second
    for i in 0..12 {
        engine.handle.report_progress(i as f64 * 0.5, i as f64 * 0.1);
        sleep(Duration::from_millis(500)).await;
    }
    engine.settle().await;

    assert_eq!(engine.backend.writes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_writes_carry_credential() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;

    engine.sample(30.0, 5.0).await;

    let writes = engine.backend.writes();
    assert_eq!(writes[0].access_token, "token-abc");
    assert_eq!(writes[0].course_id, Fixtures::course_id());
    assert!(engine.credentials.calls() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_write_failure_keeps_optimistic_completion() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course())).await;
    engine.backend.inject_write_error(ApiError::ServerError {
        status: 503,
        message: "maintenance".to_string(),
    });

    engine.sample(590.0, 98.0).await;

    assert!(engine.backend.writes().is_empty());
    let errors = engine.recorder.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::ProgressWriteFailed);
    assert_eq!(engine.recorder.completions(), vec![LessonId::new("L1")]);

    let snapshot = engine.handle.snapshot().await.unwrap();
    assert!(snapshot.completed_lessons.contains(&LessonId::new("L1")));

    // The next accepted sample converges with the server
    engine.backend.clear_write_error();
    engine.sample(595.0, 99.0).await;

    let stored = engine.backend.stored("L1").unwrap();
    assert_eq!(stored.completion_status, CompletionStatus::Completed);
    assert_eq!(engine.recorder.completions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_session_is_reported() {
    let engine = started(
        EngineBuilder::new(Fixtures::fresh_course()).with_credentials(MockCredentials::signed_out()),
    )
    .await;

    engine.sample(30.0, 5.0).await;

    assert!(engine.backend.writes().is_empty());
    let errors = engine.recorder.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::AuthUnavailable);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_catches_up_after_throttle() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course()).with_autosave(5)).await;

    engine.sample(0.5, 0.1).await;
    // Throttled: too close to the first write
    engine.sample(120.0, 20.0).await;
    assert_eq!(engine.backend.writes().len(), 1);

    sleep(Duration::from_secs(30)).await;
    engine.settle().await;

    let writes = engine.backend.writes_for("L1");
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].update.video_time_position, 120.0);
    assert_eq!(writes[1].update.chapter_progress, 20);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_waits_for_a_position() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course()).with_autosave(5)).await;

    sleep(Duration::from_secs(30)).await;
    engine.settle().await;

    assert!(engine.backend.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_autosave_prefers_media_duration() {
    let engine = started(EngineBuilder::new(Fixtures::fresh_course()).with_autosave(5)).await;
    engine.handle.set_media_duration(1200.0);

    engine.sample(0.5, 0.1).await;
    engine.sample(300.0, 50.0).await;
    sleep(Duration::from_secs(30)).await;
    engine.settle().await;

    let writes = engine.backend.writes_for("L1");
    assert_eq!(writes.len(), 2);
    // 300s of a 1200s media file, not of the 10 minute catalogue length
    assert_eq!(writes[1].update.chapter_progress, 25);
}

#[tokio::test]
async fn test_replayed_payload_leaves_state_unchanged() {
    let backend = Arc::new(MockBackend::new(Fixtures::fresh_course()));
    let persistence = ProgressPersistence::new(backend.clone(), MockCredentials::new("token-abc"));
    let lesson_id = LessonId::new("L2");
    let update = LessonProgressUpdate::from_sample(&ProgressSample::new(300.0, 33.0), 90.0, Utc::now());

    persistence
        .write(&Fixtures::course_id(), &lesson_id, &update)
        .await
        .unwrap();
    let after_first = backend.store_snapshot();

    persistence
        .write(&Fixtures::course_id(), &lesson_id, &update)
        .await
        .unwrap();

    assert_eq!(backend.store_snapshot(), after_first);
    assert_eq!(backend.writes().len(), 2);
}
