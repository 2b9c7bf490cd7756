use axum::Router;

use catalog_entities::{Brand, Category, Product, Subcategory, Variant};

pub mod catalog;
pub mod system;

/// Router for every catalog collection, mounted under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/categories", catalog::router::<Category>())
        .nest("/subcategories", catalog::router::<Subcategory>())
        .nest("/brands", catalog::router::<Brand>())
        .nest("/variants", catalog::router::<Variant>())
        .nest("/products", catalog::router::<Product>())
}
