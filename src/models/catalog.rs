use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Locale-keyed translations (`"ru" -> {...}`), ordered so that locale
/// fallback is deterministic.
pub type Translations<T> = BTreeMap<String, T>;

/// The full raw catalog as served by `GET /quiz/content/`.
pub type Catalog = Vec<CatalogEntry>;

/// Pick the translation for `locale`, falling back to the first available one.
pub fn localized<'a, T>(translations: &'a Translations<T>, locale: &str) -> Option<&'a T> {
    translations
        .get(locale)
        .or_else(|| translations.values().next())
}

/// Read an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// CatalogEntry - one themed pack as received from the server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Translations<NameTranslation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quizzes: Vec<Quiz>,
}

impl CatalogEntry {
    /// Display name in `locale`, or an empty string when the entry has no
    /// translations at all.
    pub fn name(&self, locale: &str) -> &str {
        localized(&self.translations, locale)
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    /// The quiz this pack is played with. Additional quizzes are ignored.
    pub fn first_quiz(&self) -> Option<&Quiz> {
        self.quizzes.first()
    }

    /// Number of questions in the first quiz, 0 without one.
    pub fn question_count(&self) -> usize {
        self.first_quiz().map(|q| q.questions.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameTranslation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub pronunciation: Option<String>,
}

// ---------------------------------------------------------------------------
// Quiz / Question / Choice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Translations<NameTranslation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    pub image: Option<String>,
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Translations<QuestionTranslation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionTranslation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item: Item,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_correct: bool,
}

/// The picture a child taps on; shared between questions on the server side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<i64>,
    pub image: Option<String>,
    pub effect: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Translations<NameTranslation>,
}
