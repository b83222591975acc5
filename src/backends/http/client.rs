use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::ApiError;
use crate::backends::traits::CredentialProvider;
use crate::config::NetworkConfig;
use crate::models::{CourseId, CourseStructure, LessonId, ResumeMarker};

/// Characters left unescaped in identifier path segments
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const CLIENT_NAME: &str = "course-player";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the headers shared by every request. A token, when given, is sent as a bearer credential.
pub fn create_standard_headers(auth_token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = auth_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Other("Access token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert("X-Client-Name", HeaderValue::from_static(CLIENT_NAME));
    headers.insert("X-Client-Version", HeaderValue::from_static(CLIENT_VERSION));

    Ok(headers)
}

/// reqwest-backed implementation of the course service contract.
#[derive(Clone)]
pub struct HttpCourseBackend {
    pub(super) client: reqwest::Client,
    pub(super) base_url: String,
    pub(super) unload_flush_timeout: Duration,
    pub(super) credentials: Option<Arc<dyn CredentialProvider>>,
}

impl std::fmt::Debug for HttpCourseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCourseBackend")
            .field("base_url", &self.base_url)
            .field("unload_flush_timeout", &self.unload_flush_timeout)
            .field("has_credentials", &self.credentials.is_some())
            .finish()
    }
}

impl HttpCourseBackend {
    pub fn new(config: &NetworkConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            unload_flush_timeout: config.unload_flush_timeout(),
            credentials: None,
        })
    }

    /// Attach a credential provider used to authenticate the read endpoints
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub(super) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(super) fn course_path(course_id: &CourseId) -> String {
        format!(
            "/courses/{}",
            utf8_percent_encode(course_id.as_str(), PATH_SEGMENT)
        )
    }

    pub(super) fn lesson_progress_path(course_id: &CourseId, lesson_id: &LessonId) -> String {
        format!(
            "{}/lessons/{}/progress",
            Self::course_path(course_id),
            utf8_percent_encode(lesson_id.as_str(), PATH_SEGMENT)
        )
    }

    async fn read_headers(&self) -> Result<HeaderMap, ApiError> {
        let token = match &self.credentials {
            Some(provider) => match provider.access_token().await {
                Ok(token) => Some(token),
                Err(e) => {
                    debug!("Reading anonymously, no credential available: {}", e);
                    None
                }
            },
            None => None,
        };
        create_standard_headers(token.as_deref())
    }

    /// Turn non-success responses into typed errors
    pub(super) async fn check_response(
        response: reqwest::Response,
        operation_name: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        debug!("[{}] Response: {}", operation_name, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            "[{}] Error response - Status: {}, Body: {}",
            operation_name,
            status.as_u16(),
            body
        );
        Err(ApiError::from_status(status.as_u16(), body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation_name: &str,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path);
        debug!("[{}] GET {}", operation_name, url);

        let response = self
            .client
            .get(&url)
            .headers(self.read_headers().await?)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let response = Self::check_response(response, operation_name).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }

    pub async fn get_resume(&self, course_id: &CourseId) -> Result<Option<ResumeMarker>, ApiError> {
        let path = format!("{}/resume", Self::course_path(course_id));

        match self.get_json::<Option<ResumeMarker>>(&path, "get_resume").await {
            Ok(marker) => Ok(marker),
            Err(ApiError::NotFound(_)) => {
                debug!("No resume marker for course {}", course_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_course_structure(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseStructure, ApiError> {
        let path = format!("{}/structure", Self::course_path(course_id));
        self.get_json(&path, "get_course_structure").await
    }
}
