mod client;
mod errors;
mod progress;


pub use client::{CLIENT_NAME, HttpCourseBackend, create_standard_headers};
pub use errors::ApiError;

use async_trait::async_trait;

use crate::backends::traits::CourseBackend;
use crate::models::{
    CourseId, CourseStructure, LessonId, LessonProgressUpdate, ResumeMarker, UnloadFlushPayload,
};

#[async_trait]
impl CourseBackend for HttpCourseBackend {
    async fn fetch_resume(&self, course_id: &CourseId) -> Result<Option<ResumeMarker>, ApiError> {
        self.get_resume(course_id).await
    }

    async fn fetch_course_structure(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseStructure, ApiError> {
        self.get_course_structure(course_id).await
    }

    async fn write_progress(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: &LessonProgressUpdate,
        access_token: &str,
    ) -> Result<(), ApiError> {
        self.post_progress(course_id, lesson_id, update, access_token)
            .await
    }

    fn send_unload_flush(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        payload: UnloadFlushPayload,
    ) {
        self.post_unload_flush(course_id, lesson_id, payload)
    }
}
