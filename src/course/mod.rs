pub mod index;
pub mod resume;

pub use index::{IndexedLesson, LessonIndex};
pub use resume::{resolve_initial_lesson, resolve_resume_point};
