use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, api, page};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::glossary_page))
        .route("/glossary", post(page::create_term))
        .route("/glossary/delete", post(page::delete_term))
        .route("/glossary/seed", post(page::seed_defaults))
        .route("/healthz", get(healthz))
        .route(
            "/api/languages",
            get(api::list_languages).post(api::register_language),
        )
        .route("/api/terms", get(api::list_terms).post(api::insert_entry))
        .route("/api/terms/update", post(api::update_entry))
        .route("/api/terms/delete", post(api::delete_entry))
        .route("/api/seed", post(api::seed_defaults))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header::CONTENT_TYPE};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::db::Store;

    async fn app() -> Router {
        let store = Store::in_memory().await.expect("store");
        build_router(AppState::from_store(store))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_a_bad_request() {
        let request = post_json("/api/terms/update", r#"{"termId": true}"#);
        let (status, body) = send(app().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Request could not be processed"))
        );
    }

    #[tokio::test]
    async fn missing_field_and_broken_json_are_bad_requests() {
        let (status, body) = send(app().await, post_json("/api/terms/delete", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(app().await, post_json("/api/terms", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/languages")
            .body(Body::from(r#"{"name":"French"}"#))
            .expect("request");
        let (status, body) = send(app().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn well_formed_request_reaches_the_glossary() {
        let (status, body) = send(
            app().await,
            post_json("/api/terms", r#"{"primaryTerm":"Hello","definition":""}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["termId"].is_i64());
    }
}
