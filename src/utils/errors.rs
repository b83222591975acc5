use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::backends::http::ApiError;
use crate::models::LessonId;

/// Failure to obtain a credential from the host's auth collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No active session")]
    NoSession,

    #[error("Credential provider failed: {0}")]
    Provider(String),
}

/// What the engine was loading when a load error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTarget {
    ResumeMarker,
    CourseStructure,
}

impl std::fmt::Display for LoadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadTarget::ResumeMarker => f.write_str("resume marker"),
            LoadTarget::CourseStructure => f.write_str("course structure"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Failed to load {target}: {source}")]
    Load {
        target: LoadTarget,
        #[source]
        source: ApiError,
    },

    #[error("Failed to write progress for lesson {lesson_id}: {source}")]
    Write {
        lesson_id: LessonId,
        #[source]
        source: ApiError,
    },

    #[error("Authentication unavailable: {0}")]
    Auth(#[from] AuthError),

    #[error("Course has no lessons")]
    NoLessons,

    #[error("Unknown lesson: {0}")]
    UnknownLesson(LessonId),

    #[error("Course player has not been initialized")]
    NotInitialized,

    #[error("Course player engine disconnected")]
    Disconnected,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Stable machine-readable error codes handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    LoadFailed,
    ProgressWriteFailed,
    AuthUnavailable,
    NoLessons,
    UnknownLesson,
    NotInitialized,
    EngineDisconnected,
    InvalidConfig,
}

/// The `{code, message, details}` shape delivered to the error callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Load { .. } => ErrorCode::LoadFailed,
            EngineError::Write { .. } => ErrorCode::ProgressWriteFailed,
            EngineError::Auth(_) => ErrorCode::AuthUnavailable,
            EngineError::NoLessons => ErrorCode::NoLessons,
            EngineError::UnknownLesson(_) => ErrorCode::UnknownLesson,
            EngineError::NotInitialized => ErrorCode::NotInitialized,
            EngineError::Disconnected => ErrorCode::EngineDisconnected,
            EngineError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }

    /// Load failures block the player; everything else is reported and playback continues.
    pub fn is_blocking(&self) -> bool {
        matches!(self, EngineError::Load { .. } | EngineError::NoLessons)
    }

    pub fn report(&self) -> ErrorReport {
        let details = match self {
            EngineError::Load { target, source } => Some(json!({
                "target": target,
                "status": source.status(),
                "transient": source.is_transient(),
            })),
            EngineError::Write { lesson_id, source } => Some(json!({
                "lessonId": lesson_id,
                "status": source.status(),
                "transient": source.is_transient(),
            })),
            EngineError::UnknownLesson(lesson_id) => Some(json!({ "lessonId": lesson_id })),
            _ => None,
        };

        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            details,
        }
    }
}
