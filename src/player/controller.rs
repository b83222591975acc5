use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use super::autosave::{self, AutosaveTimer};
use super::callbacks::{LessonSelection, PlayerCallbacks, SelectionReason};
use super::persistence::ProgressPersistence;
use super::progress_tracker::{ProgressTracker, SampleDecision, Visibility};
use crate::backends::retry::RetryPolicy;
use crate::backends::traits::{CourseBackend, CredentialProvider};
use crate::config::Config;
use crate::course::{LessonIndex, resolve_resume_point};
use crate::models::{
    CourseId, CourseProgressSummary, CourseStructure, LessonId, LessonProgressUpdate,
    ProgressSample, ResumeMarker,
};
use crate::utils::{EngineError, ErrorReport, LoadTarget};

/// Commands that can be sent to the course player controller
#[derive(Debug)]
pub enum PlayerCommand {
    /// Load resume data and course structure, then pick the initial lesson
    Initialize {
        requested: Option<LessonId>,
        respond_to: oneshot::Sender<Result<LessonSelection, EngineError>>,
    },
    /// Time update from the playback surface
    Progress(ProgressSample),
    /// Precise media duration in seconds, once the surface knows it
    SetMediaDuration(f64),
    SetVisibility(Visibility),
    /// The host page is being hidden or unloaded
    PageHide,
    SelectLesson {
        lesson_id: LessonId,
        respond_to: oneshot::Sender<Result<LessonSelection, EngineError>>,
    },
    NextLesson {
        respond_to: oneshot::Sender<Result<Option<LessonSelection>, EngineError>>,
    },
    PreviousLesson {
        respond_to: oneshot::Sender<Result<Option<LessonSelection>, EngineError>>,
    },
    /// Report the active lesson as finished without waiting for the throttle
    CompleteActiveLesson {
        respond_to: oneshot::Sender<Result<bool, EngineError>>,
    },
    GetSnapshot {
        respond_to: oneshot::Sender<PlayerSnapshot>,
    },
    /// Stop timers, drain in-flight writes and end the event loop
    Shutdown { respond_to: oneshot::Sender<()> },
}

/// Lifecycle of a course player session
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStatus {
    Idle,
    Loading,
    Ready,
    /// Blocking load failure; the host should show a retry affordance
    Failed(ErrorReport),
    Stopped,
}

/// Read-only view of the engine state at one point in time
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub status: EngineStatus,
    pub active_lesson: Option<LessonId>,
    pub current_time: Option<f64>,
    pub visibility: Visibility,
    pub completed_lessons: HashSet<LessonId>,
    pub index: LessonIndex,
    pub summary: CourseProgressSummary,
}

/// Sample waiting out the debounce window, tagged with the lesson it belongs to
#[derive(Debug)]
struct PendingSample {
    lesson_id: LessonId,
    sample: ProgressSample,
    first_queued: Instant,
    deadline: Instant,
}

/// Single-task actor owning all progress state for one course.
///
/// Everything mutable lives here and is only touched from [`run`](Self::run),
/// one event at a time. Network writes are spawned and never awaited by the
/// loop.
pub struct CoursePlayerController {
    course_id: CourseId,
    config: Config,
    backend: Arc<dyn CourseBackend>,
    persistence: ProgressPersistence,
    callbacks: PlayerCallbacks,
    receiver: mpsc::UnboundedReceiver<PlayerCommand>,
    shutdown: CancellationToken,
    writes: TaskTracker,

    status: EngineStatus,
    index: LessonIndex,
    tracker: ProgressTracker,
    visibility: Visibility,
    current_time: Option<f64>,
    media_duration: Option<Duration>,
    pending: Option<PendingSample>,
    autosave: Option<AutosaveTimer>,
    /// Commands that arrived while a load was in flight
    deferred: VecDeque<PlayerCommand>,
}

impl CoursePlayerController {
    /// Create a new controller and the handle used to drive it
    pub fn new(
        course_id: CourseId,
        config: Config,
        backend: Arc<dyn CourseBackend>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<(CoursePlayerHandle, CoursePlayerController), EngineError> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidConfig(format!("{e:#}")))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let callbacks = PlayerCallbacks::default();
        let shutdown = CancellationToken::new();

        let controller = CoursePlayerController {
            course_id: course_id.clone(),
            persistence: ProgressPersistence::new(Arc::clone(&backend), credentials),
            tracker: ProgressTracker::new(config.tracking.clone()),
            index: LessonIndex::build(&[], config.tracking.completion_threshold_percent),
            config,
            backend,
            callbacks: callbacks.clone(),
            receiver,
            shutdown: shutdown.clone(),
            writes: TaskTracker::new(),
            status: EngineStatus::Idle,
            visibility: Visibility::Visible,
            current_time: None,
            media_duration: None,
            pending: None,
            autosave: None,
            deferred: VecDeque::new(),
        };
        let handle = CoursePlayerHandle {
            course_id,
            sender,
            callbacks,
            shutdown,
        };

        Ok((handle, controller))
    }

    /// Create a controller and run it on the current tokio runtime
    pub fn spawn(
        course_id: CourseId,
        config: Config,
        backend: Arc<dyn CourseBackend>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<CoursePlayerHandle, EngineError> {
        let (handle, controller) = Self::new(course_id, config, backend, credentials)?;
        tokio::spawn(controller.run());
        Ok(handle)
    }

    /// Run the controller event loop
    pub async fn run(mut self) {
        debug!("CoursePlayerController event loop started for course {}", self.course_id);
        let mut shutdown_reply = None;

        loop {
            if let Some(command) = self.deferred.pop_front() {
                if let Some(respond_to) = self.handle_command(command).await {
                    shutdown_reply = Some(respond_to);
                    break;
                }
                continue;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                command = self.receiver.recv() => match command {
                    Some(command) => {
                        if let Some(respond_to) = self.handle_command(command).await {
                            shutdown_reply = Some(respond_to);
                            break;
                        }
                    }
                    None => break,
                },
                _ = wait_for_deadline(self.pending.as_ref().map(|p| p.deadline)) => {
                    self.fire_debounce();
                }
                lesson_id = next_autosave_tick(&mut self.autosave) => {
                    self.on_autosave_tick(lesson_id);
                }
            }
        }

        self.teardown().await;
        if let Some(respond_to) = shutdown_reply {
            let _ = respond_to.send(());
        }
    }

    /// Apply one command. Returns the reply channel when the command asks the
    /// loop to stop.
    async fn handle_command(&mut self, command: PlayerCommand) -> Option<oneshot::Sender<()>> {
        match command {
            PlayerCommand::Initialize {
                requested,
                respond_to,
            } => {
                let result = self.initialize(requested).await;
                let _ = respond_to.send(result);
            }
            PlayerCommand::Progress(sample) => {
                if self.is_ready() {
                    self.current_time = Some(sample.time);
                }
                self.submit_sample(sample);
            }
            PlayerCommand::SetMediaDuration(secs) => match Duration::try_from_secs_f64(secs) {
                Ok(duration) if !duration.is_zero() => self.media_duration = Some(duration),
                _ => debug!("Ignoring unusable media duration {}", secs),
            },
            PlayerCommand::SetVisibility(visibility) => self.set_visibility(visibility),
            PlayerCommand::PageHide => self.flush_on_hide("page hide"),
            PlayerCommand::SelectLesson {
                lesson_id,
                respond_to,
            } => {
                let result = self.select_lesson(lesson_id, SelectionReason::Navigation);
                let _ = respond_to.send(result);
            }
            PlayerCommand::NextLesson { respond_to } => {
                let result = self.step(|index, id| index.next(id).map(|l| l.id.clone()));
                let _ = respond_to.send(result);
            }
            PlayerCommand::PreviousLesson { respond_to } => {
                let result = self.step(|index, id| index.previous(id).map(|l| l.id.clone()));
                let _ = respond_to.send(result);
            }
            PlayerCommand::CompleteActiveLesson { respond_to } => {
                let result = self.complete_active_lesson();
                let _ = respond_to.send(result);
            }
            PlayerCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
            PlayerCommand::Shutdown { respond_to } => return Some(respond_to),
        }
        None
    }

    fn is_ready(&self) -> bool {
        self.status == EngineStatus::Ready
    }

    async fn initialize(
        &mut self,
        requested: Option<LessonId>,
    ) -> Result<LessonSelection, EngineError> {
        info!(course_id = %self.course_id, "Loading course progress");
        self.reset_session();
        self.status = EngineStatus::Loading;

        let load = Self::load_course(
            Arc::clone(&self.backend),
            self.course_id.clone(),
            RetryPolicy::from_config(&self.config.network),
        );
        tokio::pin!(load);

        let shutdown = self.shutdown.clone();
        let loaded = loop {
            tokio::select! {
                loaded = &mut load => break loaded,
                _ = shutdown.cancelled() => break Err(EngineError::Disconnected),
                Some(command) = self.receiver.recv() => self.defer_while_loading(command),
            }
        };

        let (marker, structure) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.fail(e)),
        };

        let index = LessonIndex::build(
            &structure.modules,
            self.config.tracking.completion_threshold_percent,
        );
        let resume_threshold = if self.config.resume.auto_resume {
            Duration::from_secs(self.config.resume.resume_threshold_secs)
        } else {
            Duration::MAX
        };

        let Some(point) =
            resolve_resume_point(marker.as_ref(), &index, requested.as_ref(), resume_threshold)
        else {
            return Err(self.fail(EngineError::NoLessons));
        };

        info!(
            course_id = %self.course_id,
            lessons = index.len(),
            "Resuming at lesson {} ({:?})",
            point.lesson_id,
            point.start_at
        );

        self.tracker =
            ProgressTracker::new(self.config.tracking.clone()).with_completed(index.completed_ids());
        self.index = index;
        self.status = EngineStatus::Ready;

        let selection = LessonSelection {
            lesson_id: point.lesson_id,
            start_at: point.start_at,
            reason: SelectionReason::Resume,
        };
        self.activate(selection.clone());
        Ok(selection)
    }

    /// Samples and media durations sent during a load belong to whatever was
    /// playing before the course resolved, so they are dropped. Everything
    /// else runs once the load settles.
    fn defer_while_loading(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Progress(sample) => {
                trace!("Ignoring sample received while loading: {:?}", sample);
            }
            PlayerCommand::SetMediaDuration(secs) => {
                trace!("Ignoring media duration received while loading: {}", secs);
            }
            command => self.deferred.push_back(command),
        }
    }

    async fn load_course(
        backend: Arc<dyn CourseBackend>,
        course_id: CourseId,
        retry: RetryPolicy,
    ) -> Result<(Option<ResumeMarker>, CourseStructure), EngineError> {
        let backend = &backend;
        let course_id = &course_id;
        let retry = &retry;

        let resume = async {
            retry
                .execute("fetch_resume", || backend.fetch_resume(course_id))
                .await
                .map_err(|source| EngineError::Load {
                    target: LoadTarget::ResumeMarker,
                    source,
                })
        };
        let structure = async {
            retry
                .execute("fetch_course_structure", || {
                    backend.fetch_course_structure(course_id)
                })
                .await
                .map_err(|source| EngineError::Load {
                    target: LoadTarget::CourseStructure,
                    source,
                })
        };

        tokio::try_join!(resume, structure)
    }

    /// Record a blocking failure and tell the host about it
    fn fail(&mut self, error: EngineError) -> EngineError {
        warn!(course_id = %self.course_id, "Course player failed: {}", error);
        let report = error.report();
        self.status = EngineStatus::Failed(report.clone());
        self.callbacks.on_error.emit(report);
        error
    }

    fn reset_session(&mut self) {
        self.pending = None;
        self.autosave = None;
        self.tracker.clear_active_lesson();
        self.current_time = None;
        self.media_duration = None;
    }

    /// Make a lesson active: clear timers bound to the old one, reset the
    /// throttle, restart auto-save, then notify the host.
    fn activate(&mut self, selection: LessonSelection) {
        self.pending = None;
        self.current_time = None;
        self.media_duration = None;
        self.tracker.set_active_lesson(selection.lesson_id.clone());

        self.autosave = self.config.autosave.enabled.then(|| {
            AutosaveTimer::start(selection.lesson_id.clone(), self.config.autosave.interval())
        });

        debug!(
            "Active lesson is now {} ({:?})",
            selection.lesson_id, selection.reason
        );
        self.callbacks.on_lesson_selected.emit(selection);
    }

    fn select_lesson(
        &mut self,
        lesson_id: LessonId,
        reason: SelectionReason,
    ) -> Result<LessonSelection, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotInitialized);
        }

        let lesson = self
            .index
            .get(&lesson_id)
            .ok_or_else(|| EngineError::UnknownLesson(lesson_id.clone()))?;

        let threshold = Duration::from_secs(self.config.resume.resume_threshold_secs);
        let resumable = self.config.resume.auto_resume && !self.index.is_complete(&lesson_id);
        let start_at = Duration::try_from_secs_f64(lesson.last_video_time)
            .ok()
            .filter(|start_at| resumable && *start_at >= threshold)
            .unwrap_or(Duration::ZERO);

        let selection = LessonSelection {
            lesson_id,
            start_at,
            reason,
        };
        self.activate(selection.clone());
        Ok(selection)
    }

    fn step(
        &mut self,
        pick: impl Fn(&LessonIndex, &LessonId) -> Option<LessonId>,
    ) -> Result<Option<LessonSelection>, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotInitialized);
        }
        let Some(active) = self.tracker.active_lesson() else {
            return Ok(None);
        };

        match pick(&self.index, active) {
            Some(target) => self
                .select_lesson(target, SelectionReason::Navigation)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Queue a sample behind the debounce window. Each new sample pushes the
    /// deadline out, bounded by the max wait measured from the first queued one.
    fn submit_sample(&mut self, sample: ProgressSample) {
        if !self.is_ready() {
            trace!("Ignoring sample before initialization: {:?}", sample);
            return;
        }
        if self.visibility == Visibility::Hidden {
            trace!("Ignoring sample while hidden: {:?}", sample);
            return;
        }
        let Some(lesson_id) = self.tracker.active_lesson().cloned() else {
            return;
        };

        let now = Instant::now();
        let first_queued = match &self.pending {
            Some(pending) if pending.lesson_id == lesson_id => pending.first_queued,
            _ => now,
        };
        let deadline = (now + self.config.tracking.debounce())
            .min(first_queued + self.config.tracking.debounce_max_wait());

        self.pending = Some(PendingSample {
            lesson_id,
            sample,
            first_queued,
            deadline,
        });
    }

    fn fire_debounce(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if self.tracker.active_lesson() != Some(&pending.lesson_id) {
            debug!("Discarding sample for inactive lesson {}", pending.lesson_id);
            return;
        }
        self.evaluate(pending.sample);
    }

    /// Run the tracker on a sample and persist it when accepted
    fn evaluate(&mut self, sample: ProgressSample) -> bool {
        match self
            .tracker
            .evaluate(sample, self.visibility, Instant::now())
        {
            SampleDecision::Write {
                lesson_id,
                sample,
                newly_completed,
            } => {
                self.index = self
                    .index
                    .with_lesson_progress(&lesson_id, sample.percent, sample.time);

                if newly_completed {
                    info!(course_id = %self.course_id, "Lesson {} completed", lesson_id);
                    self.index = self.index.with_completed(self.tracker.completed_lessons());
                    self.callbacks.on_lesson_completed.emit(lesson_id.clone());
                }

                self.dispatch_write(lesson_id, sample);
                true
            }
            decision => {
                trace!("Sample not persisted: {:?}", decision);
                false
            }
        }
    }

    fn dispatch_write(&self, lesson_id: LessonId, sample: ProgressSample) {
        let update = LessonProgressUpdate::from_sample(
            &sample,
            self.config.tracking.completion_threshold_percent,
            Utc::now(),
        );
        let persistence = self.persistence.clone();
        let on_error = self.callbacks.on_error.clone();
        let course_id = self.course_id.clone();

        self.writes.spawn(async move {
            if let Err(e) = persistence.write(&course_id, &lesson_id, &update).await {
                warn!("Progress write for lesson {} failed: {}", lesson_id, e);
                on_error.emit(e.report());
            }
        });
    }

    fn on_autosave_tick(&mut self, lesson_id: LessonId) {
        if self.tracker.active_lesson() != Some(&lesson_id) {
            debug!("Discarding auto-save tick for inactive lesson {}", lesson_id);
            return;
        }

        if let Some(sample) = autosave::derive_sample(self.current_time, self.active_duration()) {
            trace!("Auto-save checkpoint for lesson {}: {:?}", lesson_id, sample);
            self.submit_sample(sample);
        }
    }

    /// Host-reported media duration, falling back to the lesson's catalogue duration
    fn active_duration(&self) -> Duration {
        if let Some(duration) = self.media_duration {
            return duration;
        }
        self.tracker
            .active_lesson()
            .and_then(|id| self.index.get(id))
            .map(|lesson| lesson.duration())
            .unwrap_or(Duration::ZERO)
    }

    fn complete_active_lesson(&mut self) -> Result<bool, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotInitialized);
        }
        if self.tracker.active_lesson().is_none() {
            return Ok(false);
        }

        self.pending = None;
        let time = self
            .current_time
            .unwrap_or_else(|| self.active_duration().as_secs_f64());
        Ok(self.evaluate(ProgressSample::new(time, 100.0)))
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        let previous = std::mem::replace(&mut self.visibility, visibility);
        if visibility == Visibility::Hidden && previous != Visibility::Hidden {
            self.pending = None;
            self.flush_on_hide("visibility change");
        }
    }

    /// Unthrottled best-effort checkpoint of the current position
    fn flush_on_hide(&mut self, trigger: &str) {
        let Some(lesson_id) = self.tracker.active_lesson().cloned() else {
            return;
        };
        let Some(time) = self.current_time else {
            debug!("No playback position yet, skipping {} flush", trigger);
            return;
        };

        let duration = self.active_duration();
        let sample = if duration > Duration::ZERO {
            ProgressSample::from_position(time, duration.as_secs_f64())
        } else {
            let percent = self
                .index
                .get(&lesson_id)
                .map(|lesson| lesson.progress_percent)
                .unwrap_or(0.0);
            ProgressSample::new(time, percent)
        };

        let update = LessonProgressUpdate::from_sample(
            &sample,
            self.config.tracking.completion_threshold_percent,
            Utc::now(),
        );
        if self
            .persistence
            .flush_on_unload(&self.course_id, &lesson_id, update)
        {
            debug!("Dispatched {} flush for lesson {}", trigger, lesson_id);
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status.clone(),
            active_lesson: self.tracker.active_lesson().cloned(),
            current_time: self.current_time,
            visibility: self.visibility,
            completed_lessons: self.tracker.completed_lessons().clone(),
            index: self.index.clone(),
            summary: self.index.summary(),
        }
    }

    async fn teardown(&mut self) {
        self.pending = None;
        self.autosave = None;
        self.tracker.clear_active_lesson();
        self.status = EngineStatus::Stopped;

        self.writes.close();
        if timeout(self.config.network.request_timeout(), self.writes.wait())
            .await
            .is_err()
        {
            warn!("Gave up waiting for in-flight progress writes");
        }
        info!(course_id = %self.course_id, "Course player stopped");
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_autosave_tick(timer: &mut Option<AutosaveTimer>) -> LessonId {
    match timer {
        Some(timer) => timer.tick().await,
        None => std::future::pending().await,
    }
}

/// Handle to send commands to the course player controller
#[derive(Clone)]
pub struct CoursePlayerHandle {
    course_id: CourseId,
    sender: mpsc::UnboundedSender<PlayerCommand>,
    callbacks: PlayerCallbacks,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for CoursePlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoursePlayerHandle")
            .field("course_id", &self.course_id)
            .field("sender", &"<UnboundedSender>")
            .finish()
    }
}

impl CoursePlayerHandle {
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    fn send(&self, command: PlayerCommand) {
        if self.sender.send(command).is_err() {
            trace!("Course player stopped, dropping command");
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T, EngineError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .map_err(|_| EngineError::Disconnected)?;
        response.await.map_err(|_| EngineError::Disconnected)
    }

    /// Load the course and resolve where the learner resumes. Load failures
    /// are also delivered to the error callback.
    pub async fn initialize(
        &self,
        requested: Option<LessonId>,
    ) -> Result<LessonSelection, EngineError> {
        self.request(|respond_to| PlayerCommand::Initialize {
            requested,
            respond_to,
        })
        .await?
    }

    /// Push a playback sample. Never fails; a stopped engine drops it.
    pub fn report_progress(&self, time: f64, percent: f64) {
        self.send(PlayerCommand::Progress(ProgressSample::new(time, percent)));
    }

    pub fn set_media_duration(&self, secs: f64) {
        self.send(PlayerCommand::SetMediaDuration(secs));
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.send(PlayerCommand::SetVisibility(visibility));
    }

    pub fn page_hide(&self) {
        self.send(PlayerCommand::PageHide);
    }

    pub async fn select_lesson(&self, lesson_id: LessonId) -> Result<LessonSelection, EngineError> {
        self.request(|respond_to| PlayerCommand::SelectLesson {
            lesson_id,
            respond_to,
        })
        .await?
    }

    /// Move to the following lesson; `None` at the end of the course
    pub async fn next_lesson(&self) -> Result<Option<LessonSelection>, EngineError> {
        self.request(|respond_to| PlayerCommand::NextLesson { respond_to })
            .await?
    }

    /// Move to the preceding lesson; `None` at the start of the course
    pub async fn previous_lesson(&self) -> Result<Option<LessonSelection>, EngineError> {
        self.request(|respond_to| PlayerCommand::PreviousLesson { respond_to })
            .await?
    }

    pub async fn complete_active_lesson(&self) -> Result<bool, EngineError> {
        self.request(|respond_to| PlayerCommand::CompleteActiveLesson { respond_to })
            .await?
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot, EngineError> {
        self.request(|respond_to| PlayerCommand::GetSnapshot { respond_to })
            .await
    }

    pub fn on_error(&self, callback: impl Fn(ErrorReport) + Send + Sync + 'static) {
        self.callbacks.on_error.set(callback);
    }

    pub fn on_lesson_selected(&self, callback: impl Fn(LessonSelection) + Send + Sync + 'static) {
        self.callbacks.on_lesson_selected.set(callback);
    }

    pub fn on_lesson_completed(&self, callback: impl Fn(LessonId) + Send + Sync + 'static) {
        self.callbacks.on_lesson_completed.set(callback);
    }

    /// Stop the engine and wait for in-flight writes to settle
    pub async fn shutdown(&self) {
        let (respond_to, response) = oneshot::channel();
        if self
            .sender
            .send(PlayerCommand::Shutdown { respond_to })
            .is_ok()
        {
            let _ = response.await;
        }
    }

    /// Stop the engine without waiting
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }
}
