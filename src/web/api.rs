use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::warn;

use crate::glossary::languages::{find_by_key, primary_language};
use crate::glossary::{
    self, EntryChanges, Language, OperationResult, RawTermId, TranslationInput, WideTerm,
};
use crate::web::AppState;

use super::responses::{OperationReply, rejected, reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertEntryRequest {
    #[serde(default)]
    pub primary_term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub translations: Option<TranslationInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub term_id: RawTermId,
    #[serde(default)]
    pub primary_term: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub translations: Option<TranslationInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryRequest {
    pub term_id: RawTermId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLanguageRequest {
    pub name: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TermsQuery {
    pub language: Option<String>,
    pub q: Option<String>,
}

pub async fn list_languages(State(state): State<AppState>) -> Json<Vec<Language>> {
    Json(glossary::list_languages(state.pool_ref()).await)
}

pub async fn register_language(
    State(state): State<AppState>,
    payload: Result<Json<RegisterLanguageRequest>, JsonRejection>,
) -> OperationReply {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    let registered =
        glossary::register_language(state.pool_ref(), &request.name, request.is_primary).await;
    let result = match registered {
        Ok(language) => OperationResult::ok(format!(
            "Language {} registered with key '{}'",
            language.name, language.key
        )),
        Err(err) => err.into(),
    };
    reply(result)
}

/// Wide rows, optionally narrowed to a substring of one language column.
/// The column defaults to the primary language; an unknown column matches
/// nothing.
pub async fn list_terms(
    State(state): State<AppState>,
    Query(query): Query<TermsQuery>,
) -> Json<Vec<WideTerm>> {
    let terms = glossary::list_wide(state.pool_ref()).await;

    let Some(needle) = query.q.as_deref().filter(|q| !q.trim().is_empty()) else {
        return Json(terms);
    };
    let column = match query.language.as_deref() {
        Some(key) => find_by_key(state.pool_ref(), key).await,
        None => primary_language(state.pool_ref()).await,
    };
    let column = match column {
        Ok(Some(language)) => language.key,
        Ok(None) => return Json(Vec::new()),
        Err(err) => {
            warn!(?err, "failed to resolve filter column");
            return Json(Vec::new());
        }
    };

    Json(
        glossary::filter_wide(&terms, &column, needle)
            .into_iter()
            .cloned()
            .collect(),
    )
}

pub async fn seed_defaults(State(state): State<AppState>) -> OperationReply {
    reply(glossary::seed_if_empty(state.pool_ref()).await)
}

pub async fn insert_entry(
    State(state): State<AppState>,
    payload: Result<Json<InsertEntryRequest>, JsonRejection>,
) -> OperationReply {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    reply(
        glossary::insert_entry(
            state.pool_ref(),
            &request.primary_term,
            &request.definition,
            request.translations.as_ref(),
        )
        .await,
    )
}

pub async fn update_entry(
    State(state): State<AppState>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> OperationReply {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    let changes = EntryChanges {
        primary_text: request.primary_term.as_deref(),
        definition: request.definition.as_deref(),
        translations: request.translations.as_ref(),
    };
    reply(glossary::update_entry(state.pool_ref(), &request.term_id, changes).await)
}

pub async fn delete_entry(
    State(state): State<AppState>,
    payload: Result<Json<DeleteEntryRequest>, JsonRejection>,
) -> OperationReply {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    reply(glossary::delete_entry(state.pool_ref(), &request.term_id).await)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::db::Store;

    async fn state() -> AppState {
        AppState::from_store(Store::in_memory().await.expect("store"))
    }

    fn body<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Json<T> {
        Json(serde_json::from_value(value).expect("request body"))
    }

    #[tokio::test]
    async fn crud_round_through_the_api() {
        let state = state().await;
        seed_defaults(State(state.clone())).await;

        let (status, Json(created)) = insert_entry(
            State(state.clone()),
            Ok(body(json!({
                "primaryTerm": "Hello",
                "definition": "",
                "translations": { "spanish": "Hola" }
            }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(created.success, "{}", created.message);
        let term_id = created.term_id.expect("term id");

        let Json(terms) = list_terms(State(state.clone()), Query(TermsQuery::default())).await;
        let row = terms.iter().find(|t| t.term_id == term_id).expect("listed");
        assert_eq!(row.translations["english"], "Hello");
        assert_eq!(row.translations["spanish"], "Hola");

        let (_, Json(updated)) = update_entry(
            State(state.clone()),
            Ok(body(json!({ "termId": term_id.to_string(), "translations": { "spanish": "" } }))),
        )
        .await;
        assert!(updated.success, "{}", updated.message);

        let Json(terms) = list_terms(State(state.clone()), Query(TermsQuery::default())).await;
        let row = terms.iter().find(|t| t.term_id == term_id).expect("listed");
        assert!(!row.translations.contains_key("spanish"));

        let (_, Json(deleted)) = delete_entry(
            State(state.clone()),
            Ok(body(json!({ "termId": term_id }))),
        )
        .await;
        assert!(deleted.success);

        let (_, Json(missing)) = update_entry(
            State(state.clone()),
            Ok(body(json!({ "termId": 999999 }))),
        )
        .await;
        assert!(!missing.success);
        assert!(missing.message.contains("not found"));
    }

    #[tokio::test]
    async fn terms_can_be_filtered_by_column() {
        let state = state().await;
        seed_defaults(State(state.clone())).await;

        let Json(hits) = list_terms(
            State(state.clone()),
            Query(TermsQuery {
                language: Some("spanish".to_string()),
                q: Some("PAGO".to_string()),
            }),
        )
        .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].translations["english"], "Payment");

        let Json(hits) = list_terms(
            State(state.clone()),
            Query(TermsQuery {
                language: None,
                q: Some("pay".to_string()),
            }),
        )
        .await;
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn languages_are_listed_and_registered() {
        let state = state().await;
        seed_defaults(State(state.clone())).await;

        let (_, Json(result)) = register_language(
            State(state.clone()),
            Ok(body(json!({ "name": "French" }))),
        )
        .await;
        assert!(result.success, "{}", result.message);

        let (_, Json(clash)) = register_language(
            State(state.clone()),
            Ok(body(json!({ "name": "FRENCH" }))),
        )
        .await;
        assert!(!clash.success);

        let Json(languages) = list_languages(State(state.clone())).await;
        let keys: Vec<_> = languages.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["english", "spanish", "french"]);
        assert!(languages[0].is_primary);
    }

    #[tokio::test]
    async fn missing_primary_term_is_a_validation_failure() {
        let state = state().await;
        let (status, Json(result)) = insert_entry(
            State(state.clone()),
            Ok(body(json!({ "definition": "no term" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!result.success);
        assert!(result.term_id.is_none());
    }
}
