use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::warn;

use crate::glossary::OperationResult;

/// Status code and body of every mutating API route.
pub type OperationReply = (StatusCode, Json<OperationResult>);

pub fn reply(result: OperationResult) -> OperationReply {
    (StatusCode::OK, Json(result))
}

/// A request that never reached the glossary core still answers with the
/// `{success, message}` shape, always as 400.
pub fn rejected(rejection: JsonRejection) -> OperationReply {
    warn!(status = %rejection.status(), %rejection, "rejected API request");
    (
        StatusCode::BAD_REQUEST,
        Json(OperationResult::failure(format!(
            "Request could not be processed: {}",
            rejection.body_text()
        ))),
    )
}
