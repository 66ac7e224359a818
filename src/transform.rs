//! Raw catalog entry to [`ContentPack`] transformation and slug lookup.
//!
//! Everything here is pure: no I/O, inputs are only borrowed, and the same
//! entry always produces the same pack.

use crate::config;
use crate::models::{
    localized, CatalogEntry, Choice, ContentPack, Question, Task, TaskChoice, NO_CORRECT_CHOICE,
};

/// Derive a pack slug from its display name: lowercase, with every run of
/// whitespace replaced by a single `-`. U+FEFF counts as whitespace, U+0085
/// does not.
///
/// This is the only slug derivation in the crate; lookup and generation
/// both go through it.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if is_separator(ch) {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else {
            slug.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    slug
}

/// Whitespace as the content server counts it: Unicode `White_Space`
/// without U+0085, plus the byte order mark.
fn is_separator(ch: char) -> bool {
    match ch {
        '\u{FEFF}' => true,
        '\u{85}' => false,
        _ => ch.is_whitespace(),
    }
}

/// Slug of a catalog entry, named in `locale`.
pub fn entry_slug(entry: &CatalogEntry, locale: &str) -> String {
    slugify(entry.name(locale))
}

/// Find the entry whose slug equals `slug`. First match wins.
pub fn find_pack_by_slug<'a>(catalog: &'a [CatalogEntry], slug: &str) -> Option<&'a CatalogEntry> {
    find_pack_by_slug_in(catalog, slug, config::DEFAULT_LOCALE)
}

/// [`find_pack_by_slug`] with an explicit locale.
pub fn find_pack_by_slug_in<'a>(
    catalog: &'a [CatalogEntry],
    slug: &str,
    locale: &str,
) -> Option<&'a CatalogEntry> {
    catalog.iter().find(|entry| entry_slug(entry, locale) == slug)
}

/// Transform a catalog entry using the default locale.
///
/// Returns `None` when the entry has no quiz.
pub fn transform(entry: &CatalogEntry) -> Option<ContentPack> {
    transform_in(entry, config::DEFAULT_LOCALE)
}

/// Transform a catalog entry, resolving all texts and audio in `locale`.
///
/// Only the first quiz of the entry is used. Task order follows question
/// order exactly.
pub fn transform_in(entry: &CatalogEntry, locale: &str) -> Option<ContentPack> {
    let quiz = entry.first_quiz()?;
    let name = entry.name(locale).to_string();

    Some(ContentPack {
        id: entry.id,
        slug: slugify(&name),
        name,
        tasks: quiz
            .questions
            .iter()
            .map(|question| transform_question(question, locale))
            .collect(),
    })
}

fn transform_question(question: &Question, locale: &str) -> Task {
    let translation = localized(&question.translations, locale);
    let correct_choice = question
        .choices
        .iter()
        .position(|choice| choice.is_correct)
        .map(|i| i as i64)
        .unwrap_or(NO_CORRECT_CHOICE);

    Task {
        id: question.id,
        question_text: translation.map(|t| t.text.clone()).unwrap_or_default(),
        audio_url: translation.and_then(|t| t.audio.clone()),
        correct_choice,
        choices: question
            .choices
            .iter()
            .map(|choice| transform_choice(choice, locale))
            .collect(),
    }
}

fn transform_choice(choice: &Choice, locale: &str) -> TaskChoice {
    TaskChoice {
        id: choice.id,
        text: localized(&choice.item.translations, locale)
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        image_url: choice.item.image.clone(),
        is_correct: choice.is_correct,
    }
}
