use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::error::GlossaryResult;

use super::languages::fetch_languages;
use super::models::{Language, TermRow, TranslationRow, WideTerm};
use super::seed::seed_if_empty;

pub async fn count_terms(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM glossary_entries")
        .fetch_one(pool)
        .await
}

pub async fn fetch_term(pool: &SqlitePool, term_id: i64) -> sqlx::Result<Option<TermRow>> {
    sqlx::query_as::<_, TermRow>(
        "SELECT id, term, definition, created_at, updated_at FROM glossary_entries WHERE id = ?",
    )
    .bind(term_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_terms(pool: &SqlitePool) -> sqlx::Result<Vec<TermRow>> {
    sqlx::query_as::<_, TermRow>(
        "SELECT id, term, definition, created_at, updated_at FROM glossary_entries ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_translations(pool: &SqlitePool) -> sqlx::Result<Vec<TranslationRow>> {
    sqlx::query_as::<_, TranslationRow>(
        "SELECT id, term_id, language_id, translation, created_at, updated_at
         FROM entry_translations ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
pub async fn translations_for_term(
    pool: &SqlitePool,
    term_id: i64,
) -> sqlx::Result<Vec<TranslationRow>> {
    sqlx::query_as::<_, TranslationRow>(
        "SELECT id, term_id, language_id, translation, created_at, updated_at
         FROM entry_translations WHERE term_id = ? ORDER BY id",
    )
    .bind(term_id)
    .fetch_all(pool)
    .await
}

/// Every term in wide form, sorted by primary text.
///
/// An empty glossary is seeded first. Any database failure yields an empty
/// list rather than an error.
pub async fn list_wide(pool: &SqlitePool) -> Vec<WideTerm> {
    match load_wide(pool).await {
        Ok(terms) => terms,
        Err(err) => {
            error!(?err, "failed to load glossary terms");
            Vec::new()
        }
    }
}

async fn load_wide(pool: &SqlitePool) -> GlossaryResult<Vec<WideTerm>> {
    if count_terms(pool).await? == 0 {
        info!("no terms found, adding default data");
        let result = seed_if_empty(pool).await;
        if !result.success {
            warn!(message = %result.message, "failed to add default data");
        }
    }

    let languages = fetch_languages(pool).await?;
    let mut terms = fetch_terms(pool).await?;
    let translations = fetch_translations(pool).await?;

    terms.sort_by(|a, b| collate(&a.term, &b.term).then(a.id.cmp(&b.id)));
    Ok(assemble_wide_view(&terms, &languages, &translations))
}

/// Fixed collation for the term table: case-insensitive, with the raw text
/// breaking ties so the order is total.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Joins terms with their translations, keeping the order of `terms`.
///
/// When two languages share a key the one whose translation comes later
/// overwrites the other.
pub fn assemble_wide_view(
    terms: &[TermRow],
    languages: &[Language],
    translations: &[TranslationRow],
) -> Vec<WideTerm> {
    let primary = languages.iter().find(|lang| lang.is_primary);
    let by_id: HashMap<i64, &Language> = languages.iter().map(|lang| (lang.id, lang)).collect();

    let mut per_term: HashMap<i64, Vec<&TranslationRow>> = HashMap::new();
    for row in translations {
        per_term.entry(row.term_id).or_default().push(row);
    }

    terms
        .iter()
        .map(|term| {
            let mut view = BTreeMap::new();
            if let Some(primary) = primary {
                view.insert(primary.key.clone(), term.term.clone());
            }
            for row in per_term.get(&term.id).into_iter().flatten() {
                if let Some(language) = by_id.get(&row.language_id) {
                    view.insert(language.key.clone(), row.translation.clone());
                }
            }
            WideTerm {
                term_id: term.id,
                definition: term.definition.clone(),
                updated_at: term.updated_at,
                translations: view,
            }
        })
        .collect()
}

/// Table filter: case-insensitive substring match on one language column.
pub fn filter_wide<'a>(
    terms: &'a [WideTerm],
    language_key: &str,
    needle: &str,
) -> Vec<&'a WideTerm> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return terms.iter().collect();
    }
    let key = language_key.trim().to_lowercase();
    terms
        .iter()
        .filter(|term| {
            term.translations
                .get(&key)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
        .collect()
}
