//! Turn-based playthrough of a single [`ContentPack`].
//!
//! A [`QuizSession`] walks the pack's tasks in order:
//!
//! ```text
//! AwaitingTask --(auto-play delay)--> InputArmed
//!      |                                  |
//!      +------------(choice)--------------+--> ResultShown --(reveal delay)--+
//!                                                                             |
//!      +------------------- next task <-----------------------------------+--+
//!      |                                                                    |
//! AwaitingTask                                         last task --> Completed --(exit delay)--> exit
//! ```
//!
//! The session never sleeps or spawns anything itself. Delays, audio and
//! navigation go through a [`SessionHost`]; the host calls back into
//! [`QuizSession::on_timer`] and [`QuizSession::on_playback`]. Every timer
//! carries the session generation, which is bumped on each reset, task
//! change and teardown, so a timer that outlives its task is dropped.

pub mod host;
mod playback;

pub use host::{PlaybackEvent, PlaybackTicket, SessionHost, Timer, TimerKind, Utterance, Voice};

use crate::config;
use crate::models::{ContentPack, Task};
use playback::{PlaybackSlot, Source};
use std::time::Duration;

// ---------------------------------------------------------------------------
// SessionConfig / SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Pause between entering a task and starting its audio.
    pub autoplay_delay: Duration,
    /// How long the result of a choice stays on screen.
    pub reveal_delay: Duration,
    /// Pause between completion and the exit signal.
    pub exit_delay: Duration,
    pub voice: Voice,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autoplay_delay: config::AUTOPLAY_DELAY,
            reveal_delay: config::REVEAL_DELAY,
            exit_delay: config::EXIT_DELAY,
            voice: Voice::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pack loaded, the pack has no tasks, or the session was torn down.
    Idle,
    /// A task was just entered; audio starts after the auto-play delay.
    AwaitingTask,
    /// The question is being presented and no choice has been made.
    InputArmed,
    /// A choice is locked in and its correctness is on display.
    ResultShown { correct: bool },
    /// Every task has been answered.
    Completed,
}

// ---------------------------------------------------------------------------
// QuizSession
// ---------------------------------------------------------------------------

pub struct QuizSession<H: SessionHost> {
    host: H,
    config: SessionConfig,
    pack: Option<ContentPack>,
    current_task: usize,
    selection: Option<usize>,
    state: SessionState,
    generation: u64,
    playback: PlaybackSlot,
    exited: bool,
}

impl<H: SessionHost> QuizSession<H> {
    /// An idle session with no pack.
    pub fn new(host: H, config: SessionConfig) -> Self {
        Self {
            host,
            config,
            pack: None,
            current_task: 0,
            selection: None,
            state: SessionState::Idle,
            generation: 0,
            playback: PlaybackSlot::default(),
            exited: false,
        }
    }

    /// A session that has already loaded `pack`.
    pub fn with_pack(host: H, config: SessionConfig, pack: ContentPack) -> Self {
        let mut session = Self::new(host, config);
        session.load(pack);
        session
    }

    /// Switch to `pack` and restart from its first task.
    ///
    /// Pending timers from the previous pack are invalidated and any
    /// playback is cancelled. A pack with no tasks leaves the session idle.
    pub fn load(&mut self, pack: ContentPack) {
        self.generation += 1;
        self.stop_playback();
        self.current_task = 0;
        self.selection = None;
        self.exited = false;

        tracing::info!(pack = %pack.slug, tasks = pack.tasks.len(), "session loaded pack");
        let empty = pack.tasks.is_empty();
        self.pack = Some(pack);
        if empty {
            self.state = SessionState::Idle;
        } else {
            self.enter_task();
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn pack(&self) -> Option<&ContentPack> {
        self.pack.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index of the active task.
    pub fn current_task(&self) -> usize {
        self.current_task
    }

    /// The task on screen, if any.
    pub fn current(&self) -> Option<&Task> {
        if self.state == SessionState::Completed {
            return None;
        }
        self.pack.as_ref()?.tasks.get(self.current_task)
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Correctness of the locked-in choice while the result is shown.
    pub fn is_correct(&self) -> Option<bool> {
        match self.state {
            SessionState::ResultShown { correct } => Some(correct),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_held()
    }

    /// Ticket of the playback currently holding the audio slot.
    pub fn playback_ticket(&self) -> Option<PlaybackTicket> {
        self.playback.holder()
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Whether the exit signal has been sent.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// One-based position and total, e.g. `(2, 3)`.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.pack.as_ref().map(|p| p.tasks.len()).unwrap_or(0);
        ((self.current_task + 1).min(total), total)
    }

    /// Single-task packs hide the progress indicator.
    pub fn shows_progress(&self) -> bool {
        self.progress().1 > 1
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -- Inputs ------------------------------------------------------------

    /// Choose answer `index` for the current task.
    ///
    /// Only the first choice per task counts; later ones, choices outside
    /// the task and choices outside a question return `false` and change
    /// nothing.
    pub fn select(&mut self, index: usize) -> bool {
        if self.selection.is_some()
            || !matches!(
                self.state,
                SessionState::AwaitingTask | SessionState::InputArmed
            )
        {
            return false;
        }
        let Some(task) = self.current() else {
            return false;
        };
        if index >= task.choices.len() {
            return false;
        }

        let correct = task.is_correct_choice(index);
        self.selection = Some(index);
        self.state = SessionState::ResultShown { correct };
        tracing::info!(task = self.current_task, choice = index, correct, "choice locked");
        self.schedule(TimerKind::Advance, self.config.reveal_delay);
        true
    }

    /// Speaker button: stop if something is playing, otherwise replay the
    /// current question.
    pub fn toggle_playback(&mut self) {
        if self.playback.is_held() {
            self.stop_playback();
            return;
        }
        self.start_presentation();
    }

    /// A timer scheduled through the host has fired.
    pub fn on_timer(&mut self, timer: Timer) {
        if timer.generation != self.generation {
            tracing::debug!(?timer, current = self.generation, "discarding stale timer");
            return;
        }

        match (timer.kind, self.state) {
            (TimerKind::AutoPlay, SessionState::AwaitingTask) => {
                self.state = SessionState::InputArmed;
                self.start_presentation();
            }
            (TimerKind::Advance, SessionState::ResultShown { .. }) => self.advance(),
            (TimerKind::Exit, SessionState::Completed) if !self.exited => {
                self.exited = true;
                tracing::info!("session finished; signalling exit");
                self.host.exit();
            }
            (kind, state) => {
                tracing::debug!(?kind, ?state, "timer does not apply in current state");
            }
        }
    }

    /// The host reports the end of a playback it started for `ticket`.
    pub fn on_playback(&mut self, ticket: PlaybackTicket, event: PlaybackEvent) {
        let Some(source) = self.playback.release(ticket) else {
            tracing::debug!(?ticket, ?event, "ignoring event for released playback");
            return;
        };

        if event == PlaybackEvent::Error && source == Source::File {
            tracing::warn!("audio file failed to play; falling back to speech");
            if let Some(text) = self.current().map(|t| t.question_text.clone()) {
                self.speak(text);
            }
        }
    }

    /// End the session: cancel playback and invalidate pending timers.
    ///
    /// Also runs on drop.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.stop_playback();
        self.pack = None;
        self.selection = None;
        self.state = SessionState::Idle;
    }

    // -- Internals ---------------------------------------------------------

    fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        let timer = Timer {
            generation: self.generation,
            kind,
        };
        self.host.schedule(delay, timer);
    }

    fn enter_task(&mut self) {
        self.state = SessionState::AwaitingTask;
        self.schedule(TimerKind::AutoPlay, self.config.autoplay_delay);
    }

    fn advance(&mut self) {
        let total = self.pack.as_ref().map(|p| p.tasks.len()).unwrap_or(0);
        if self.current_task + 1 >= total {
            self.state = SessionState::Completed;
            tracing::info!(tasks = total, "all tasks answered");
            self.schedule(TimerKind::Exit, self.config.exit_delay);
        } else {
            self.current_task += 1;
            self.selection = None;
            self.generation += 1;
            self.enter_task();
        }
    }

    fn stop_playback(&mut self) {
        if self.playback.clear() {
            self.host.cancel_playback();
        }
    }

    /// Play the task's recorded audio, or speak its text when there is no
    /// recording or it cannot start.
    fn start_presentation(&mut self) {
        let Some(task) = self.current() else {
            return;
        };
        let audio_url = task.audio_url.clone().filter(|url| !url.is_empty());
        let text = task.question_text.clone();

        self.stop_playback();

        if let Some(url) = audio_url {
            let ticket = self.playback.acquire(Source::File);
            match self.host.play_file(&url, ticket) {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "audio file could not start; falling back to speech");
                    self.playback.release(ticket);
                }
            }
        }
        self.speak(text);
    }

    fn speak(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        let utterance = Utterance {
            text,
            voice: self.config.voice.clone(),
        };
        let ticket = self.playback.acquire(Source::Speech);
        if let Err(e) = self.host.speak(&utterance, ticket) {
            tracing::warn!(error = %e, "speech synthesis unavailable");
            self.playback.release(ticket);
        }
    }
}

impl<H: SessionHost> Drop for QuizSession<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
