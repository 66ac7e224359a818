//! End-to-end tests through the `KidsQuiz` entry point.

mod common;

use common::{animals_entry, test_catalog, FakeApi, FakeHost, ManualClock};
use kids_quiz::session::TimerKind;
use kids_quiz::{
    sample, CatalogEntry, HttpApi, KidsQuiz, MemoryBackend, QuizError, SessionConfig,
    SessionState,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn quiz_with(api: Arc<FakeApi>) -> KidsQuiz {
    KidsQuiz::builder()
        .api(api)
        .clock(Arc::new(ManualClock::new()))
        .backends(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// content_pack
// ---------------------------------------------------------------------------

#[test]
fn content_pack_comes_from_catalog() {
    let api = Arc::new(FakeApi::serving(test_catalog()));
    let quiz = quiz_with(api.clone());

    let pack = quiz.content_pack("фрукты-и-ягоды").unwrap();
    assert_eq!(pack.id, 7);
    assert_eq!(pack.tasks.len(), 3);

    // The single-pack lookup shares the cached catalog.
    quiz.content_pack("животные").unwrap();
    assert_eq!(api.fetch_count(), 1);
}

#[test]
fn unknown_slug_falls_back_to_sample_pack() {
    let quiz = quiz_with(Arc::new(FakeApi::serving(test_catalog())));

    let pack = quiz.content_pack("эмоции").unwrap();
    assert_eq!(pack.id, 6);
    assert_eq!(pack.tasks[0].question_text, "Кто здесь веселый?");
}

#[test]
fn slug_unknown_everywhere_is_none() {
    let quiz = quiz_with(Arc::new(FakeApi::serving(test_catalog())));
    assert!(quiz.content_pack("динозавры").is_none());
}

#[test]
fn pack_without_quiz_is_none() {
    let empty: CatalogEntry = serde_json::from_value(json!({
        "id": 30,
        "image": null,
        "translations": { "ru": { "name": "Скоро" } },
        "quizzes": []
    }))
    .unwrap();
    let quiz = quiz_with(Arc::new(FakeApi::serving(vec![empty])));

    assert!(quiz.content_pack("скоро").is_none());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn animals_pack_plays_from_catalog_to_exit() {
    let quiz = quiz_with(Arc::new(FakeApi::serving(vec![animals_entry()])));

    let mut session = quiz
        .start_session("животные", FakeHost::new(), SessionConfig::default())
        .unwrap();
    assert_eq!(session.pack().unwrap().tasks[0].correct_choice, 0);
    assert!(!session.shows_progress());

    let autoplay = session.host_mut().pop_timer();
    session.on_timer(autoplay);
    assert!(session.select(0));
    assert_eq!(session.state(), SessionState::ResultShown { correct: true });

    let reveal = session.host_mut().pop_timer();
    assert_eq!(reveal.kind(), TimerKind::Advance);
    session.on_timer(reveal);
    assert_eq!(session.state(), SessionState::Completed);

    let exit = session.host_mut().pop_timer();
    session.on_timer(exit);
    assert_eq!(session.host().exits, 1);
}

#[test]
fn start_session_for_unknown_pack_is_none() {
    let quiz = quiz_with(Arc::new(FakeApi::serving(test_catalog())));
    assert!(quiz
        .start_session("динозавры", FakeHost::new(), SessionConfig::default())
        .is_none());
}

// ---------------------------------------------------------------------------
// Catalog and summaries
// ---------------------------------------------------------------------------

#[test]
fn summaries_apply_free_pack_and_ownership() {
    let quiz = quiz_with(Arc::new(FakeApi::serving(test_catalog())));
    quiz.store().add_purchase("фрукты-и-ягоды").unwrap();

    let summaries = quiz.summaries();
    assert!(summaries[0].is_free && summaries[0].is_purchased);
    assert!(!summaries[1].is_free && summaries[1].is_purchased);
}

#[test]
fn free_packs_are_configurable() {
    let quiz = KidsQuiz::builder()
        .api(Arc::new(FakeApi::serving(test_catalog())))
        .backends(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
        .free_packs([7])
        .build()
        .unwrap();

    let summaries = quiz.summaries();
    assert!(!summaries[0].is_free);
    assert!(summaries[1].is_free);
}

#[test]
fn refresh_forces_a_new_fetch() {
    let api = Arc::new(FakeApi::serving(test_catalog()));
    let quiz = quiz_with(api.clone());

    quiz.catalog();
    assert!(quiz.is_cache_fresh());
    quiz.refresh();
    assert!(!quiz.is_cache_fresh());
    quiz.catalog();
    assert_eq!(api.fetch_count(), 2);
}

#[test]
fn unreachable_server_serves_sample_catalog() {
    let quiz = KidsQuiz::builder()
        .base_url("http://127.0.0.1:9/api/v1")
        .timeout(Duration::from_secs(2))
        .backends(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
        .build()
        .unwrap();

    assert_eq!(quiz.catalog(), sample::catalog());
    assert_eq!(quiz.content_pack("животные").unwrap().tasks.len(), 3);
}

#[test]
fn offline_mode_uses_sample_catalog() {
    let api = Arc::new(FakeApi::serving(test_catalog()));
    let quiz = KidsQuiz::builder()
        .api(api.clone())
        .backends(Box::new(MemoryBackend::new()), Box::new(MemoryBackend::new()))
        .offline(true)
        .build()
        .unwrap();

    let slugs: Vec<String> = quiz.summaries().into_iter().map(|s| s.slug).collect();
    assert_eq!(slugs, vec!["животные", "эмоции"]);
    assert_eq!(api.fetch_count(), 0);
    assert!(quiz.to_string().contains("offline=true"));
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[test]
fn empty_locale_is_rejected() {
    let result = KidsQuiz::builder().locale("  ").offline(true).build();
    assert!(matches!(result, Err(QuizError::InvalidArgument(_))));
}

#[test]
fn storage_dirs_from_builder_are_used() {
    let tmp = tempfile::tempdir().unwrap();
    let quiz = KidsQuiz::builder()
        .offline(true)
        .storage_dir(tmp.path().join("data"))
        .fallback_dir(tmp.path().join("fallback"))
        .build()
        .unwrap();

    quiz.store().add_purchase("эмоции").unwrap();
    assert!(tmp.path().join("data").join("purchased_content.json").exists());
}

#[test]
fn display_names_endpoint_and_storage() {
    let tmp = tempfile::tempdir().unwrap();
    let quiz = KidsQuiz::builder()
        .base_url("http://quiz.test/api/v1/")
        .storage_dir(tmp.path())
        .fallback_dir(tmp.path().join("fallback"))
        .build()
        .unwrap();

    let shown = quiz.to_string();
    assert!(shown.contains("api=http://quiz.test/api/v1,"));
    assert!(shown.contains("locale=ru"));
    assert!(shown.contains("offline=false"));
}

#[test]
fn http_api_normalizes_base_url() {
    let api = HttpApi::new("http://quiz.test/api/v1//", Duration::from_secs(1));
    assert_eq!(api.base_url(), "http://quiz.test/api/v1");
}
