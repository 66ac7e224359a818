//! The seam between a [`QuizSession`](super::QuizSession) and the outside
//! world: timers, audio output, speech synthesis and navigation.

use crate::config;
use crate::error::Result;
use std::time::Duration;

/// Which timed transition a [`Timer`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Start presenting the current question.
    AutoPlay,
    /// Leave the result reveal: next question or completion.
    Advance,
    /// Tell the navigation owner the session is over.
    Exit,
}

/// A scheduled transition, stamped with the session generation that asked
/// for it. Timers from an older generation are discarded when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timer {
    pub(crate) generation: u64,
    pub(crate) kind: TimerKind,
}

impl Timer {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Identifies the holder of the playback slot. Events carrying a ticket
/// that no longer holds the slot are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackTicket(pub(crate) u64);

/// How a playback ended, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Ended,
    Error,
    Stopped,
}

/// Prosody for synthesized speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            lang: config::VOICE_LANG.to_string(),
            rate: config::VOICE_RATE,
            pitch: config::VOICE_PITCH,
            volume: config::VOICE_VOLUME,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Voice,
}

/// Everything a session needs from its environment.
///
/// Completion of timers and playback is reported back through
/// [`QuizSession::on_timer`](super::QuizSession::on_timer) and
/// [`QuizSession::on_playback`](super::QuizSession::on_playback).
pub trait SessionHost {
    /// Fire `timer` after `delay`.
    fn schedule(&mut self, delay: Duration, timer: Timer);

    /// Start playing a recorded audio file. An `Err` means playback could
    /// not even start.
    fn play_file(&mut self, url: &str, ticket: PlaybackTicket) -> Result<()>;

    /// Start speaking `utterance`. An `Err` means synthesis is unavailable.
    fn speak(&mut self, utterance: &Utterance, ticket: PlaybackTicket) -> Result<()>;

    /// Stop whatever audio or speech is playing.
    fn cancel_playback(&mut self);

    /// The session finished; navigate away.
    fn exit(&mut self);
}
