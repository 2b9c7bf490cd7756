use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Map, Value};

use catalog_core::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let message = err.to_string();
    let code = err.code();
    match err {
        CatalogError::Decode(_) => json_error(StatusCode::BAD_REQUEST, code, message),
        CatalogError::InvalidKey { .. } => json_error(StatusCode::BAD_REQUEST, code, message),
        CatalogError::Validation(errors) => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            "violations",
            json!(errors),
        ),
        CatalogError::Duplicate { .. } => json_error(StatusCode::CONFLICT, code, message),
        CatalogError::InvalidParent { parent, key, .. } => json_error_with(
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            message,
            "parent",
            json!({ "kind": parent, "key": key }),
        ),
        CatalogError::Storage(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, code, message),
    }
}

/// A body the JSON extractor could not turn into the expected payload.
pub fn decode_rejection(rejection: JsonRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection.body_text(), "request body rejected");
    catalog_error_to_response(CatalogError::decode(rejection.body_text()))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn json_error_with(
    status: StatusCode,
    code: &'static str,
    message: String,
    detail_field: &'static str,
    detail: Value,
) -> axum::response::Response {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::from(code));
    body.insert("message".to_string(), Value::from(message));
    body.insert(detail_field.to_string(), detail);
    (status, axum::Json(Value::Object(body))).into_response()
}
