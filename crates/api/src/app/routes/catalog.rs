use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::{get, post},
    Json, Router,
};

use catalog_core::{CatalogEntity, CatalogResult};
use catalog_infra::Outcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// The six operations every entity kind exposes.
pub fn router<E: CatalogEntity>() -> Router {
    Router::new()
        .route(
            "/",
            post(create::<E>)
                .get(list::<E>)
                .put(update::<E>)
                .patch(update_status::<E>),
        )
        .route("/:key", get(get_one::<E>).delete(delete::<E>))
}

fn respond<E: CatalogEntity>(result: CatalogResult<Outcome>) -> axum::response::Response {
    match result {
        Ok(outcome) => dto::outcome_to_response(E::KIND, outcome),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<E::Draft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::decode_rejection(rejection),
    };
    respond::<E>(services.catalog.create::<E>(draft).await)
}

pub async fn list<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond::<E>(services.catalog.list::<E>().await)
}

pub async fn get_one<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    respond::<E>(services.catalog.get::<E>(&key).await)
}

pub async fn update<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<E::Changes>, JsonRejection>,
) -> axum::response::Response {
    let Json(changes) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::decode_rejection(rejection),
    };
    respond::<E>(services.catalog.update::<E>(changes).await)
}

pub async fn update_status<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<E::StatusChanges>, JsonRejection>,
) -> axum::response::Response {
    let Json(changes) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::decode_rejection(rejection),
    };
    respond::<E>(services.catalog.update_status::<E>(changes).await)
}

pub async fn delete<E: CatalogEntity>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    respond::<E>(services.catalog.delete::<E>(&key).await)
}
