use async_trait::async_trait;
use course_player::backends::traits::{CourseBackend, CredentialProvider};
use course_player::models::{
    CourseId, CourseStructure, LessonId, LessonProgressUpdate, ResumeMarker, UnloadFlushPayload,
};
use course_player::{ApiError, AuthError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A write as the mock server saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub update: LessonProgressUpdate,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFlush {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub payload: UnloadFlushPayload,
}

/// In-memory course service. Progress is stored last-write-wins per lesson,
/// so replaying a payload is observable only in the call log.
#[derive(Debug)]
pub struct MockBackend {
    resume: Mutex<Option<ResumeMarker>>,
    structure: Mutex<CourseStructure>,
    store: Mutex<HashMap<LessonId, LessonProgressUpdate>>,
    writes: Mutex<Vec<RecordedWrite>>,
    flushes: Mutex<Vec<RecordedFlush>>,
    resume_errors: Mutex<VecDeque<ApiError>>,
    structure_errors: Mutex<VecDeque<ApiError>>,
    write_error: Mutex<Option<ApiError>>,
    structure_calls: AtomicU32,
    load_delay: Mutex<Duration>,
}

impl MockBackend {
    pub fn new(structure: CourseStructure) -> Self {
        Self {
            resume: Mutex::new(None),
            structure: Mutex::new(structure),
            store: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            flushes: Mutex::new(Vec::new()),
            resume_errors: Mutex::new(VecDeque::new()),
            structure_errors: Mutex::new(VecDeque::new()),
            write_error: Mutex::new(None),
            structure_calls: AtomicU32::new(0),
            load_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn with_resume(self, marker: ResumeMarker) -> Self {
        *self.resume.lock().unwrap() = Some(marker);
        self
    }

    pub fn set_resume(&self, marker: Option<ResumeMarker>) {
        *self.resume.lock().unwrap() = marker;
    }

    /// Queue errors returned by the next structure fetches, one per call
    pub fn fail_structure_with(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.structure_errors.lock().unwrap().extend(errors);
    }

    pub fn fail_resume_with(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.resume_errors.lock().unwrap().extend(errors);
    }

    /// Hold every structure fetch for `delay` before answering
    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = delay;
    }

    pub fn inject_write_error(&self, error: ApiError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn clear_write_error(&self) {
        *self.write_error.lock().unwrap() = None;
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn writes_for(&self, lesson_id: &str) -> Vec<RecordedWrite> {
        let lesson_id = LessonId::new(lesson_id);
        self.writes()
            .into_iter()
            .filter(|write| write.lesson_id == lesson_id)
            .collect()
    }

    pub fn flushes(&self) -> Vec<RecordedFlush> {
        self.flushes.lock().unwrap().clone()
    }

    pub fn stored(&self, lesson_id: &str) -> Option<LessonProgressUpdate> {
        self.store.lock().unwrap().get(&LessonId::new(lesson_id)).cloned()
    }

    pub fn store_snapshot(&self) -> HashMap<LessonId, LessonProgressUpdate> {
        self.store.lock().unwrap().clone()
    }

    pub fn structure_calls(&self) -> u32 {
        self.structure_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CourseBackend for MockBackend {
    async fn fetch_resume(&self, _course_id: &CourseId) -> Result<Option<ResumeMarker>, ApiError> {
        if let Some(error) = self.resume_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.resume.lock().unwrap().clone())
    }

    async fn fetch_course_structure(
        &self,
        _course_id: &CourseId,
    ) -> Result<CourseStructure, ApiError> {
        self.structure_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.load_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.structure_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.structure.lock().unwrap().clone())
    }

    async fn write_progress(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: &LessonProgressUpdate,
        access_token: &str,
    ) -> Result<(), ApiError> {
        if let Some(error) = self.write_error.lock().unwrap().clone() {
            return Err(error);
        }

        self.writes.lock().unwrap().push(RecordedWrite {
            course_id: course_id.clone(),
            lesson_id: lesson_id.clone(),
            update: update.clone(),
            access_token: access_token.to_string(),
        });
        self.store
            .lock()
            .unwrap()
            .insert(lesson_id.clone(), update.clone());
        Ok(())
    }

    fn send_unload_flush(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        payload: UnloadFlushPayload,
    ) {
        self.flushes.lock().unwrap().push(RecordedFlush {
            course_id: course_id.clone(),
            lesson_id: lesson_id.clone(),
            payload,
        });
    }
}

/// Credential provider that counts lookups and can be switched off
#[derive(Debug)]
pub struct MockCredentials {
    token: Mutex<Option<String>>,
    calls: AtomicU32,
}

impl MockCredentials {
    pub fn new(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(Some(token.to_string())),
            calls: AtomicU32::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            token: Mutex::new(None),
            calls: AtomicU32::new(0),
        })
    }

    pub fn sign_out(&self) {
        *self.token.lock().unwrap() = None;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for MockCredentials {
    async fn access_token(&self) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.lock().unwrap().clone().ok_or(AuthError::NoSession)
    }
}
