use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::error::GlossaryResult;

use super::languages::{DefaultLanguages, ensure_defaults};
use super::models::{BatchOutcome, OperationResult};
use super::store::count_terms;

const DEFAULT_DATA_JSON: &str = include_str!("../../data/default-data.json");

pub const ALREADY_SEEDED_MESSAGE: &str = "Database already contains terms. Default data not added.";

#[derive(Clone, Debug, Deserialize)]
pub struct ReferencePair {
    pub english: String,
    pub spanish: String,
}

pub fn reference_data() -> serde_json::Result<Vec<ReferencePair>> {
    serde_json::from_str(DEFAULT_DATA_JSON)
}

/// Fills an empty glossary with the bundled reference terms.
///
/// Returns a failed result without touching anything when terms already
/// exist, so repeated calls are harmless.
pub async fn seed_if_empty(pool: &SqlitePool) -> OperationResult {
    let pairs = match reference_data() {
        Ok(pairs) => pairs,
        Err(err) => {
            error!(?err, "bundled default data is not valid JSON");
            return OperationResult::failure(format!("Failed to add default data: {err}"));
        }
    };
    seed_pairs(pool, &pairs).await
}

pub async fn seed_pairs(pool: &SqlitePool, pairs: &[ReferencePair]) -> OperationResult {
    match count_terms(pool).await {
        Ok(0) => {}
        Ok(_) => {
            return OperationResult::failure(ALREADY_SEEDED_MESSAGE);
        }
        Err(err) => {
            error!(?err, "failed to count glossary terms");
            return OperationResult::failure(format!("Failed to add default data: {err}"));
        }
    }

    let languages = match ensure_defaults(pool).await {
        Ok(languages) => languages,
        Err(err) => {
            error!(?err, "failed to prepare default languages");
            return OperationResult::failure(err.to_string());
        }
    };

    let mut outcome = BatchOutcome::default();
    for pair in pairs {
        let english = pair.english.trim();
        let spanish = pair.spanish.trim();
        if english.is_empty() || spanish.is_empty() {
            outcome.fail(english, "missing primary or secondary text");
            continue;
        }

        match insert_pair(pool, &languages, english, spanish).await {
            Ok(()) => outcome.applied += 1,
            Err(err) => {
                warn!(?err, term = %english, "failed to insert default term");
                outcome.fail(english, err);
            }
        }
    }

    info!(
        applied = outcome.applied,
        failed = outcome.failures.len(),
        "default data added"
    );
    OperationResult::ok(format!(
        "Successfully added {} terms to the database.",
        outcome.applied
    ))
    .with_outcome(outcome)
}

/// One term plus its secondary translation, all or nothing.
async fn insert_pair(
    pool: &SqlitePool,
    languages: &DefaultLanguages,
    english: &str,
    spanish: &str,
) -> GlossaryResult<()> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let term_id: i64 = sqlx::query_scalar(
        "INSERT INTO glossary_entries (term, definition, created_at, updated_at)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(english)
    .bind(format!("Definition for {english}"))
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO entry_translations (term_id, language_id, translation, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(term_id)
    .bind(languages.secondary.id)
    .bind(spanish)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
