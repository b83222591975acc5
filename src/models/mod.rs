mod course;
mod identifiers;
mod progress;

pub use course::{CourseProgressSummary, CourseStructure, Lesson, Module, ResumeMarker, ResumePoint};
pub use identifiers::{CourseId, LessonId, ModuleId};
pub use progress::{CompletionStatus, LessonProgressUpdate, ProgressSample, UnloadFlushPayload};
