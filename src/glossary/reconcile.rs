//! Insert, update and delete of glossary entries.
//!
//! Primary-language text lives on the term row. Every other language is a
//! row in `entry_translations`, and a blank value never reaches the table.
//! Translation failures are recorded per language and never abort the
//! operation; only a failure on the term row itself does.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{GlossaryError, GlossaryResult};

use super::languages::fetch_languages;
use super::models::{
    BatchOutcome, Language, OperationResult, RawTermId, TranslationInput, language_key,
};
use super::store::fetch_term;

#[derive(Clone, Debug, Default)]
pub struct EntryChanges<'a> {
    pub primary_text: Option<&'a str>,
    pub definition: Option<&'a str>,
    pub translations: Option<&'a TranslationInput>,
}

/// The language a translation key writes to. Unknown keys and the primary
/// language resolve to nothing and are skipped silently.
fn target_language<'a>(languages: &'a [Language], key: &str) -> Option<&'a Language> {
    let key = language_key(key.trim());
    languages
        .iter()
        .find(|lang| lang.key == key)
        .filter(|lang| !lang.is_primary)
}

pub async fn insert_entry(
    pool: &SqlitePool,
    primary_text: &str,
    definition: &str,
    translations: Option<&TranslationInput>,
) -> OperationResult {
    match try_insert(pool, primary_text, definition, translations).await {
        Ok((term_id, outcome)) => {
            let message = match outcome.applied {
                0 => "Term added without translations".to_string(),
                n => format!("Term added with {n} translation(s)"),
            };
            info!(term_id, translations = outcome.applied, "term added");
            OperationResult::ok(message)
                .with_term_id(term_id)
                .with_outcome(outcome)
        }
        Err(err) => {
            warn!(?err, "failed to add term");
            err.into()
        }
    }
}

async fn try_insert(
    pool: &SqlitePool,
    primary_text: &str,
    definition: &str,
    translations: Option<&TranslationInput>,
) -> GlossaryResult<(i64, BatchOutcome)> {
    let primary_text = primary_text.trim();
    if primary_text.is_empty() {
        return Err(GlossaryError::Validation(
            "Primary term must not be empty".to_string(),
        ));
    }

    let now = Utc::now();
    let term_id: i64 = sqlx::query_scalar(
        "INSERT INTO glossary_entries (term, definition, created_at, updated_at)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(primary_text)
    .bind(definition)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    let mut outcome = BatchOutcome::default();
    let Some(translations) = translations.filter(|t| !t.is_empty()) else {
        return Ok((term_id, outcome));
    };

    let languages = match fetch_languages(pool).await {
        Ok(languages) => languages,
        Err(err) => {
            // The term row exists already; report the translations as skipped.
            warn!(?err, term_id, "failed to load languages for new term");
            for (key, _) in translations.iter() {
                outcome.fail(key, &err);
            }
            return Ok((term_id, outcome));
        }
    };

    for (key, value) in translations.iter() {
        let Some(language) = target_language(&languages, key) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match insert_translation(pool, term_id, language.id, value).await {
            Ok(()) => outcome.applied += 1,
            Err(err) => {
                warn!(?err, term_id, language = %language.name, "failed to add translation");
                outcome.fail(key, err);
            }
        }
    }

    Ok((term_id, outcome))
}

async fn insert_translation(
    pool: &SqlitePool,
    term_id: i64,
    language_id: i64,
    text: &str,
) -> GlossaryResult<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO entry_translations (term_id, language_id, translation, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(term_id)
    .bind(language_id)
    .bind(text)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes a translation, replacing the text of an existing row for the same
/// term and language.
async fn upsert_translation(
    pool: &SqlitePool,
    term_id: i64,
    language_id: i64,
    text: &str,
) -> GlossaryResult<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO entry_translations (term_id, language_id, translation, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (term_id, language_id)
         DO UPDATE SET translation = excluded.translation, updated_at = excluded.updated_at",
    )
    .bind(term_id)
    .bind(language_id)
    .bind(text)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn remove_translation(
    pool: &SqlitePool,
    term_id: i64,
    language_id: i64,
) -> GlossaryResult<u64> {
    let result =
        sqlx::query("DELETE FROM entry_translations WHERE term_id = ? AND language_id = ?")
            .bind(term_id)
            .bind(language_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn update_entry(
    pool: &SqlitePool,
    term_id: &RawTermId,
    changes: EntryChanges<'_>,
) -> OperationResult {
    match try_update(pool, term_id, changes).await {
        Ok((term_id, outcome)) => {
            info!(
                term_id,
                applied = outcome.applied,
                removed = outcome.removed,
                "term updated"
            );
            OperationResult::ok(format!(
                "Term updated with {} translation change(s)",
                outcome.applied
            ))
            .with_outcome(outcome)
        }
        Err(err) => {
            warn!(?err, "failed to update term");
            err.into()
        }
    }
}

async fn try_update(
    pool: &SqlitePool,
    raw_id: &RawTermId,
    changes: EntryChanges<'_>,
) -> GlossaryResult<(i64, BatchOutcome)> {
    let term_id = raw_id.parse()?;
    let term = fetch_term(pool, term_id)
        .await?
        .ok_or(GlossaryError::NotFound(term_id))?;

    let primary_text = match changes.primary_text.map(str::trim) {
        Some("") => {
            return Err(GlossaryError::Validation(
                "Primary term must not be empty".to_string(),
            ));
        }
        other => other,
    };

    // Languages are resolved before any write, so a failed lookup leaves the
    // term untouched.
    let translations = changes.translations.filter(|t| !t.is_empty());
    let languages = match translations {
        Some(_) => fetch_languages(pool).await?,
        None => Vec::new(),
    };

    if primary_text.is_some() || changes.definition.is_some() {
        sqlx::query(
            "UPDATE glossary_entries SET term = ?, definition = ?, updated_at = ? WHERE id = ?",
        )
        .bind(primary_text.unwrap_or(term.term.as_str()))
        .bind(changes.definition.unwrap_or(term.definition.as_str()))
        .bind(Utc::now())
        .bind(term_id)
        .execute(pool)
        .await?;
    }

    let mut outcome = BatchOutcome::default();
    let Some(translations) = translations else {
        return Ok((term_id, outcome));
    };

    for (key, value) in translations.iter() {
        let Some(language) = target_language(&languages, key) else {
            continue;
        };

        let value = value.trim();
        if value.is_empty() {
            match remove_translation(pool, term_id, language.id).await {
                Ok(removed) => outcome.removed += removed as usize,
                Err(err) => {
                    warn!(?err, term_id, language = %language.name, "failed to remove translation");
                    outcome.fail(key, err);
                }
            }
            continue;
        }

        match upsert_translation(pool, term_id, language.id, value).await {
            Ok(()) => outcome.applied += 1,
            Err(err) => {
                warn!(?err, term_id, language = %language.name, "failed to save translation");
                outcome.fail(key, err);
            }
        }
    }

    Ok((term_id, outcome))
}

pub async fn delete_entry(pool: &SqlitePool, term_id: &RawTermId) -> OperationResult {
    match try_delete(pool, term_id).await {
        Ok(term_id) => {
            info!(term_id, "term deleted");
            OperationResult::ok("Term deleted successfully")
        }
        Err(err) => {
            warn!(?err, "failed to delete term");
            err.into()
        }
    }
}

async fn try_delete(pool: &SqlitePool, raw_id: &RawTermId) -> GlossaryResult<i64> {
    let term_id = raw_id.parse()?;
    if fetch_term(pool, term_id).await?.is_none() {
        return Err(GlossaryError::NotFound(term_id));
    }

    // Translations go first so none can outlive the term.
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM entry_translations WHERE term_id = ?")
        .bind(term_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM glossary_entries WHERE id = ?")
        .bind(term_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(term_id)
}
