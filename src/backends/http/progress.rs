use tracing::{debug, trace};

use super::client::{HttpCourseBackend, create_standard_headers};
use super::errors::ApiError;
use crate::models::{CourseId, LessonId, LessonProgressUpdate, UnloadFlushPayload};

impl HttpCourseBackend {
    /// Upsert lesson progress with a bearer credential
    pub async fn post_progress(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        update: &LessonProgressUpdate,
        access_token: &str,
    ) -> Result<(), ApiError> {
        let url = self.build_url(&Self::lesson_progress_path(course_id, lesson_id));

        debug!(
            "Posting progress - lesson: {}, position: {:.1}s, progress: {}%",
            lesson_id, update.video_time_position, update.chapter_progress
        );

        let response = self
            .client
            .post(&url)
            .headers(create_standard_headers(Some(access_token))?)
            .json(update)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        Self::check_response(response, "post_progress").await?;
        Ok(())
    }

    /// Spawn a short-lived request that nobody waits on. Delivery is best effort.
    pub fn post_unload_flush(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        payload: UnloadFlushPayload,
    ) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, dropping unload flush");
            return;
        };

        let url = self.build_url(&format!(
            "{}/flush",
            Self::lesson_progress_path(course_id, lesson_id)
        ));
        let request = self
            .client
            .post(&url)
            .timeout(self.unload_flush_timeout)
            .json(&payload);
        let lesson_id = lesson_id.clone();

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => trace!(
                    "Unload flush for lesson {} answered {}",
                    lesson_id,
                    response.status()
                ),
                Err(e) => debug!("Unload flush for lesson {} was lost: {}", lesson_id, e),
            }
        });
    }
}
