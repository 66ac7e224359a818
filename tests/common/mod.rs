//! Shared fakes and fixtures for the integration tests.
//!
//! - `FakeApi`: a `ContentApi` that counts calls and can be told to fail.
//! - `ManualClock`: a `Clock` that only moves when told to.
//! - `FailingBackend`: a storage backend whose every call errors.
//! - `FakeHost`: a `SessionHost` recording audio calls, with a virtual timer
//!   queue the test fires by hand.

#![allow(dead_code)]

use kids_quiz::session::{PlaybackTicket, SessionHost, Timer, Utterance};
use kids_quiz::{
    Backend, Catalog, CatalogEntry, Clock, ContentApi, PurchaseReceipt, QuizError, Result,
    Verification,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyReply {
    Confirm,
    Deny,
    ServerError,
}

pub struct FakeApi {
    catalog: Catalog,
    failing: AtomicBool,
    reply: Mutex<VerifyReply>,
    pub fetches: AtomicUsize,
    pub verifications: AtomicUsize,
}

impl FakeApi {
    pub fn serving(catalog: Catalog) -> Self {
        Self {
            catalog,
            failing: AtomicBool::new(false),
            reply: Mutex::new(VerifyReply::Confirm),
            fetches: AtomicUsize::new(0),
            verifications: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let api = Self::serving(Vec::new());
        api.set_failing(true);
        api
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: VerifyReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn verify_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl ContentApi for FakeApi {
    fn fetch_catalog(&self) -> Result<Catalog> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(QuizError::NotFound("server unreachable".into()));
        }
        Ok(self.catalog.clone())
    }

    fn verify_purchase(&self, receipt: &PurchaseReceipt) -> Result<Verification> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        let mut extra = serde_json::Map::new();
        extra.insert("productId".into(), json!(receipt.product_id));
        match *self.reply.lock().unwrap() {
            VerifyReply::Confirm => Ok(Verification {
                success: true,
                extra,
            }),
            VerifyReply::Deny => Ok(Verification {
                success: false,
                extra,
            }),
            VerifyReply::ServerError => Err(QuizError::Verification(
                "server responded with 500 Internal Server Error".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// FailingBackend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FailingBackend {
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl Backend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn read(&self, _key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(QuizError::Storage("read refused".into()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(QuizError::Storage("write refused".into()))
    }
}

// ---------------------------------------------------------------------------
// FakeHost
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeHost {
    pub timers: VecDeque<(Duration, Timer)>,
    pub played: Vec<(String, PlaybackTicket)>,
    pub spoken: Vec<(Utterance, PlaybackTicket)>,
    pub cancels: usize,
    pub exits: usize,
    /// Make `play_file` refuse to start.
    pub fail_file: bool,
    /// Make `speak` report synthesis as unavailable.
    pub no_speech: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop_timer(&mut self) -> Timer {
        self.timers.pop_front().expect("no timer scheduled").1
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.timers.back().map(|(d, _)| *d)
    }
}

impl SessionHost for FakeHost {
    fn schedule(&mut self, delay: Duration, timer: Timer) {
        self.timers.push_back((delay, timer));
    }

    fn play_file(&mut self, url: &str, ticket: PlaybackTicket) -> Result<()> {
        if self.fail_file {
            return Err(QuizError::Playback("unsupported format".into()));
        }
        self.played.push((url.to_string(), ticket));
        Ok(())
    }

    fn speak(&mut self, utterance: &Utterance, ticket: PlaybackTicket) -> Result<()> {
        if self.no_speech {
            return Err(QuizError::Playback("speech synthesis unavailable".into()));
        }
        self.spoken.push((utterance.clone(), ticket));
        Ok(())
    }

    fn cancel_playback(&mut self) {
        self.cancels += 1;
    }

    fn exit(&mut self) {
        self.exits += 1;
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Raw choice JSON.
pub fn choice(id: i64, name: &str, is_correct: bool) -> serde_json::Value {
    json!({
        "id": id,
        "item": {
            "id": id + 100,
            "image": format!("http://cdn.test/items/{}.png", id),
            "effect": null,
            "translations": { "ru": { "name": name, "pronunciation": null } }
        },
        "is_correct": is_correct
    })
}

/// Raw question JSON.
pub fn question(
    id: i64,
    text: &str,
    audio: Option<&str>,
    choices: Vec<serde_json::Value>,
) -> serde_json::Value {
    json!({
        "id": id,
        "image": null,
        "order": id,
        "translations": { "ru": { "text": text, "audio": audio } },
        "choices": choices
    })
}

/// Raw catalog entry with a single quiz holding `questions`.
pub fn entry(id: i64, name: &str, questions: Vec<serde_json::Value>) -> CatalogEntry {
    serde_json::from_value(json!({
        "id": id,
        "image": format!("http://cdn.test/categories/{}.png", id),
        "translations": { "ru": { "name": name } },
        "quizzes": [{
            "id": id,
            "translations": { "ru": { "name": format!("Викторина: {}", name), "pronunciation": null } },
            "questions": questions
        }]
    }))
    .unwrap()
}

/// The one-question "Животные" pack: dog (correct) vs cat.
pub fn animals_entry() -> CatalogEntry {
    entry(
        5,
        "Животные",
        vec![question(
            39,
            "Где собака?",
            None,
            vec![choice(77, "Собака", true), choice(78, "Кошка", false)],
        )],
    )
}

/// A three-question pack; the second question has recorded audio.
pub fn fruits_entry() -> CatalogEntry {
    entry(
        7,
        "Фрукты и Ягоды",
        vec![
            question(
                1,
                "Где яблоко?",
                None,
                vec![choice(1, "Яблоко", true), choice(2, "Груша", false)],
            ),
            question(
                2,
                "Где груша?",
                Some("http://cdn.test/audio/pear.mp3"),
                vec![choice(3, "Яблоко", false), choice(4, "Груша", true)],
            ),
            question(
                3,
                "Где вишня?",
                None,
                vec![choice(5, "Слива", false), choice(6, "Вишня", true)],
            ),
        ],
    )
}

pub fn test_catalog() -> Catalog {
    vec![animals_entry(), fruits_entry()]
}
