//! Catalog entities.
//!
//! One module per entity type. Each defines the persisted document, the
//! create/update/status payloads as they arrive over the wire, and the field
//! validators that turn payloads into typed values. No IO happens here.

/// Declares a status-only update payload for one entity: the business key
/// plus the status flag, both required, under the entity's wire names.
macro_rules! status_changes {
    ($(#[$meta:meta])* $name:ident, $key:literal, $status:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, serde::Deserialize)]
        #[serde(default)]
        pub struct $name {
            #[serde(rename = $key)]
            pub key: Option<String>,
            #[serde(rename = $status)]
            pub status: Option<bool>,
        }

        impl catalog_core::Validate for $name {
            type Valid = catalog_core::StatusUpdate;

            fn validate(self) -> Result<Self::Valid, catalog_core::ValidationErrors> {
                let mut v = catalog_core::FieldValidator::new();
                let key = v.key($key, self.key);
                let status = v.flag($status, self.status);
                v.finish(|| {
                    Some(catalog_core::StatusUpdate {
                        key: key?,
                        status: status?,
                    })
                })
            }
        }
    };
}

pub(crate) use status_changes;

pub mod brand;
pub mod category;
pub mod product;
pub mod subcategory;
pub mod variant;

pub use brand::{Brand, BrandChanges, BrandDraft, BrandStatusChanges, BrandUpdate};
pub use category::{Category, CategoryChanges, CategoryDraft, CategoryStatusChanges, CategoryUpdate};
pub use product::{
    Product, ProductChanges, ProductDraft, ProductRefs, ProductRefsPayload, ProductStatusChanges,
    ProductUpdate,
};
pub use subcategory::{
    Subcategory, SubcategoryChanges, SubcategoryDraft, SubcategoryStatusChanges, SubcategoryUpdate,
};
pub use variant::{Variant, VariantChanges, VariantDraft, VariantStatusChanges, VariantUpdate};
