use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::LessonId;
use crate::utils::ErrorReport;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Holds at most one host callback. Registering again replaces the previous
/// one, and every emit reads the slot at call time, so timers and spawned
/// writes always reach the latest registration.
pub struct CallbackSlot<T> {
    inner: Arc<RwLock<Option<Callback<T>>>>,
}

impl<T> Clone for CallbackSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T> std::fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl<T> CallbackSlot<T> {
    pub fn set(&self, callback: impl Fn(T) + Send + Sync + 'static) {
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(callback));
    }

    pub fn clear(&self) {
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    pub fn is_registered(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Invoke the current callback, if any. The lock is released before the
    /// callback runs so it may re-register itself.
    pub fn emit(&self, value: T) -> bool {
        let callback = self
            .inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        match callback {
            Some(callback) => {
                callback(value);
                true
            }
            None => false,
        }
    }
}

/// Why a lesson became active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    Resume,
    Navigation,
}

/// Notification sent to the host whenever the active lesson changes.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSelection {
    pub lesson_id: LessonId,
    /// Offset the host should seek to before starting playback
    pub start_at: Duration,
    pub reason: SelectionReason,
}

/// Every hook the host can register on the engine.
#[derive(Debug, Clone, Default)]
pub struct PlayerCallbacks {
    pub on_error: CallbackSlot<ErrorReport>,
    pub on_lesson_selected: CallbackSlot<LessonSelection>,
    pub on_lesson_completed: CallbackSlot<LessonId>,
}
