use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{GlossaryError, GlossaryResult};

use super::models::{Language, LanguageRow, language_key};

pub const PRIMARY_LANGUAGE: &str = "English";
pub const SECONDARY_LANGUAGE: &str = "Spanish";

/// Languages a fresh glossary starts with, primary first.
const BOOTSTRAP_LANGUAGES: &[(&str, bool)] =
    &[(PRIMARY_LANGUAGE, true), (SECONDARY_LANGUAGE, false)];

#[derive(Clone, Debug)]
pub struct DefaultLanguages {
    pub primary: Language,
    pub secondary: Language,
}

pub async fn fetch_languages(pool: &SqlitePool) -> sqlx::Result<Vec<Language>> {
    let rows = sqlx::query_as::<_, LanguageRow>(
        "SELECT id, name, is_primary FROM glossary_languages ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Language::from).collect())
}

/// All languages in registration order.
///
/// This never fails. When the database cannot be read the caller receives
/// the built-in English/Spanish pair instead, which keeps the UI usable but
/// says nothing about what is actually stored. Tests must not read the
/// fallback as proof that those languages exist.
pub async fn list_languages(pool: &SqlitePool) -> Vec<Language> {
    match fetch_languages(pool).await {
        Ok(languages) => languages,
        Err(err) => {
            warn!(?err, "failed to load languages, using built-in fallback");
            fallback_languages()
        }
    }
}

pub fn fallback_languages() -> Vec<Language> {
    vec![
        Language::new(1, PRIMARY_LANGUAGE, true),
        Language::new(2, SECONDARY_LANGUAGE, false),
    ]
}

pub async fn find_by_key(pool: &SqlitePool, key: &str) -> GlossaryResult<Option<Language>> {
    let wanted = language_key(key.trim());
    let languages = fetch_languages(pool).await?;
    Ok(languages.into_iter().find(|lang| lang.key == wanted))
}

pub async fn primary_language(pool: &SqlitePool) -> GlossaryResult<Option<Language>> {
    let row = sqlx::query_as::<_, LanguageRow>(
        "SELECT id, name, is_primary FROM glossary_languages WHERE is_primary = 1 LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Language::from))
}

/// Adds a language to the registry.
///
/// Names must be unique by key, so two languages can never collide in the
/// wide view. The first language of an empty registry becomes primary even
/// when `primary` is false.
pub async fn register_language(
    pool: &SqlitePool,
    name: &str,
    primary: bool,
) -> GlossaryResult<Language> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GlossaryError::Validation(
            "Language name must not be empty".to_string(),
        ));
    }

    let existing = fetch_languages(pool).await?;
    let key = language_key(name);
    if let Some(clash) = existing.iter().find(|lang| lang.key == key) {
        return Err(GlossaryError::Conflict(format!(
            "language key '{key}' is already used by {}",
            clash.name
        )));
    }

    let has_primary = existing.iter().any(|lang| lang.is_primary);
    if primary && has_primary {
        return Err(GlossaryError::Validation(
            "A primary language is already set".to_string(),
        ));
    }
    let is_primary = primary || !has_primary;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO glossary_languages (name, is_primary) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(is_primary)
    .fetch_one(pool)
    .await?;

    info!(%name, id, is_primary, "registered language");
    Ok(Language::new(id, name, is_primary))
}

/// Makes sure the bootstrap languages exist. A language with the same key
/// is reused whatever its casing, so seeding never creates a key collision.
pub async fn ensure_defaults(pool: &SqlitePool) -> GlossaryResult<DefaultLanguages> {
    let mut languages = fetch_languages(pool).await?;

    for (name, wants_primary) in BOOTSTRAP_LANGUAGES {
        let key = language_key(name);
        if languages.iter().any(|lang| lang.key == key) {
            continue;
        }
        let is_primary = *wants_primary && !languages.iter().any(|lang| lang.is_primary);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO glossary_languages (name, is_primary) VALUES (?, ?) RETURNING id",
        )
        .bind(*name)
        .bind(is_primary)
        .fetch_one(pool)
        .await?;
        info!(%name, id, "created default language");
        languages.push(Language::new(id, name, is_primary));
    }

    let primary_key = language_key(PRIMARY_LANGUAGE);
    let secondary_key = language_key(SECONDARY_LANGUAGE);
    let primary = languages
        .iter()
        .find(|lang| lang.key == primary_key && lang.is_primary)
        .cloned();
    let secondary = languages
        .iter()
        .find(|lang| lang.key == secondary_key && !lang.is_primary)
        .cloned();

    match (primary, secondary) {
        (Some(primary), Some(secondary)) => Ok(DefaultLanguages { primary, secondary }),
        _ => Err(GlossaryError::Seed(format!(
            "required languages ({PRIMARY_LANGUAGE} as primary, {SECONDARY_LANGUAGE}) not found in database"
        ))),
    }
}
