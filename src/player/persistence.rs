use std::sync::{Arc, Mutex};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::backends::traits::{CourseBackend, CredentialProvider};
use crate::models::{CourseId, LessonId, LessonProgressUpdate, UnloadFlushPayload};
use crate::utils::EngineError;

/// Writes progress through the backend and keeps the last credential around
/// for the unload path, which cannot wait for a token lookup.
#[derive(Clone)]
pub struct ProgressPersistence {
    backend: Arc<dyn CourseBackend>,
    credentials: Arc<dyn CredentialProvider>,
    cached_token: Arc<Mutex<Option<String>>>,
    session_id: Uuid,
}

impl std::fmt::Debug for ProgressPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressPersistence")
            .field("backend", &self.backend)
            .field("has_cached_token", &self.cached_token().is_some())
            .field("session_id", &self.session_id)
            .finish()
    }
}

impl ProgressPersistence {
    pub fn new(backend: Arc<dyn CourseBackend>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            backend,
            credentials,
            cached_token: Arc::new(Mutex::new(None)),
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn cached_token(&self) -> Option<String> {
        self.cached_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn cache_token(&self, token: &str) {
        let mut cached = self.cached_token.lock().unwrap_or_else(|e| e.into_inner());
        if cached.as_deref() != Some(token) {
            *cached = Some(token.to_string());
        }
    }

    /// Authenticated upsert. No retry: the next accepted sample tries again.
    pub async fn write(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: &LessonProgressUpdate,
    ) -> Result<(), EngineError> {
        let token = self.credentials.access_token().await?;
        self.cache_token(&token);

        self.backend
            .write_progress(course_id, lesson_id, update, &token)
            .await
            .map_err(|source| EngineError::Write {
                lesson_id: lesson_id.clone(),
                source,
            })?;

        trace!(
            "Persisted progress for lesson {} at {}%",
            lesson_id, update.chapter_progress
        );
        Ok(())
    }

    /// Best-effort final write for hide/unload. Returns whether anything was
    /// dispatched; without a cached credential the flush is skipped silently.
    pub fn flush_on_unload(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: LessonProgressUpdate,
    ) -> bool {
        let Some(token) = self.cached_token() else {
            debug!("Skipping unload flush for lesson {}: no cached credential", lesson_id);
            return false;
        };

        self.backend.send_unload_flush(
            course_id,
            lesson_id,
            UnloadFlushPayload::new(update, token, self.session_id),
        );
        true
    }
}
