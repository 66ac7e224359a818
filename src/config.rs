use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://kids.localhost:8765/api/v1";
/// Environment variable that overrides [`DEFAULT_API_BASE`].
pub const API_BASE_ENV: &str = "KIDS_QUIZ_API_URL";

pub const CATALOG_PATH: &str = "quiz/content/";
pub const VERIFY_PATH: &str = "purchases/verify/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_LOCALE: &str = "ru";

/// Packs that are playable without a purchase ("Животные").
pub const FREE_PACK_IDS: &[i64] = &[5];

pub const PURCHASES_KEY: &str = "purchased_content";
pub const CONTENT_PACK_KEY_PREFIX: &str = "content_pack_";

// Session timings
pub const AUTOPLAY_DELAY: Duration = Duration::from_millis(500);
pub const REVEAL_DELAY: Duration = Duration::from_millis(1500);
pub const EXIT_DELAY: Duration = Duration::from_millis(2000);

// Speech synthesis tuned for small children: slow and slightly high.
pub const VOICE_LANG: &str = "ru-RU";
pub const VOICE_RATE: f32 = 0.7;
pub const VOICE_PITCH: f32 = 1.3;
pub const VOICE_VOLUME: f32 = 1.0;

/// Resolve the API base URL, honouring [`API_BASE_ENV`].
pub fn api_base() -> String {
    std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
}

/// Storage key for a saved content pack.
pub fn content_pack_key(slug: &str) -> String {
    format!("{}{}", CONTENT_PACK_KEY_PREFIX, slug)
}

pub fn default_storage_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("kids-quiz")
    } else {
        PathBuf::from(".kids-quiz-data")
    }
}

pub fn default_fallback_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("kids-quiz")
    } else {
        PathBuf::from(".kids-quiz-fallback")
    }
}
