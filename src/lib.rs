//! Playback progress and resume engine for video courses.
//!
//! A [`CoursePlayerHandle`] drives one course: it loads the learner's resume
//! marker and the course structure, picks the lesson to open, and turns the
//! stream of playback samples into throttled progress writes.

pub mod backends;
pub mod config;
pub mod course;
pub mod logging;
pub mod models;
pub mod player;
pub mod utils;

pub use backends::{
    ApiError, CourseBackend, CredentialProvider, HttpCourseBackend, StaticCredentials,
};
pub use config::Config;
pub use course::{LessonIndex, resolve_initial_lesson, resolve_resume_point};
pub use models::{CourseId, LessonId, ModuleId};
pub use player::{
    CoursePlayerController, CoursePlayerHandle, EngineStatus, LessonSelection, PlayerSnapshot,
    SelectionReason, Visibility,
};
pub use utils::{AuthError, EngineError, ErrorCode, ErrorReport};
