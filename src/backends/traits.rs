use async_trait::async_trait;

use super::http::ApiError;
use crate::models::{
    CourseId, CourseStructure, LessonId, LessonProgressUpdate, ResumeMarker, UnloadFlushPayload,
};
use crate::utils::AuthError;

/// Remote course service the progress engine reads from and writes to.
#[async_trait]
pub trait CourseBackend: Send + Sync + std::fmt::Debug {
    /// Last-watched position for the course, `None` for first-time learners
    async fn fetch_resume(&self, course_id: &CourseId) -> Result<Option<ResumeMarker>, ApiError>;

    /// Ordered modules with their lessons and per-lesson progress
    async fn fetch_course_structure(&self, course_id: &CourseId)
    -> Result<CourseStructure, ApiError>;

    /// Idempotent upsert of a lesson's progress. Payloads carry absolute
    /// values and a timestamp, so replays and reordering are harmless.
    async fn write_progress(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: &LessonProgressUpdate,
        access_token: &str,
    ) -> Result<(), ApiError>;

    /// Fire-and-forget delivery used while the host is hiding or tearing down.
    /// Must return immediately; the outcome is never observed.
    fn send_unload_flush(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        payload: UnloadFlushPayload,
    );
}

/// Supplies the current session credential on demand.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// Credential provider backed by a fixed token.
#[derive(Clone)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider with no session, every lookup fails
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self) -> Result<String, AuthError> {
        self.token.clone().ok_or(AuthError::NoSession)
    }
}
