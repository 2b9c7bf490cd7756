use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use catalog_core::EntityKind;
use catalog_infra::Outcome;

use crate::app::errors;

// -------------------------
// Outcome mapping
// -------------------------

/// JSON shape and status for a successful operation.
pub fn outcome_to_response(kind: EntityKind, outcome: Outcome) -> axum::response::Response {
    match outcome {
        Outcome::Created { id } => {
            (StatusCode::CREATED, Json(json!({ "id": id.to_string() }))).into_response()
        }
        Outcome::Found(doc) | Outcome::Updated(doc) => {
            (StatusCode::OK, Json(doc.into_json())).into_response()
        }
        Outcome::Listed(docs) => {
            let items: Vec<_> = docs.into_iter().map(|d| d.into_json()).collect();
            (StatusCode::OK, Json(json!({ "items": items }))).into_response()
        }
        Outcome::Deleted { count } => {
            (StatusCode::OK, Json(json!({ "deleted": count }))).into_response()
        }
        Outcome::NotFound => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no {kind} matches the given key"),
        ),
    }
}
