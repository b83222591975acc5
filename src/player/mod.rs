pub mod autosave;
pub mod callbacks;
pub mod controller;
pub mod persistence;
pub mod progress_tracker;

pub use callbacks::{LessonSelection, PlayerCallbacks, SelectionReason};
pub use controller::{
    CoursePlayerController, CoursePlayerHandle, EngineStatus, PlayerCommand, PlayerSnapshot,
};
pub use persistence::ProgressPersistence;
pub use progress_tracker::{ProgressTracker, SampleDecision, Visibility};
