use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use catalog_core::validation::{DESCRIPTION_LENGTH, NAME_LENGTH};
use catalog_core::{
    BusinessKey, CatalogEntity, EntityKind, EntityUpdate, FieldValidator, ParentRef, Validate,
    ValidationErrors,
};

/// A brand listed under a subcategory (and, redundantly, its category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "bid")]
    pub key: BusinessKey,
    #[serde(rename = "scid")]
    pub subcategory: BusinessKey,
    #[serde(rename = "cid")]
    pub category: BusinessKey,
    #[serde(rename = "bname")]
    pub name: String,
    #[serde(rename = "bdesc")]
    pub description: String,
    #[serde(rename = "bcreatedby")]
    pub created_by: String,
    #[serde(rename = "bmodifiedby")]
    pub modified_by: String,
    #[serde(rename = "bstatus", default)]
    pub status: bool,
}

fn brand_parents(subcategory: &BusinessKey, category: &BusinessKey) -> Vec<ParentRef> {
    vec![
        ParentRef::new(EntityKind::Subcategory, subcategory.clone()),
        ParentRef::new(EntityKind::Category, category.clone()),
    ]
}

impl CatalogEntity for Brand {
    const KIND: EntityKind = EntityKind::Brand;

    type Draft = BrandDraft;
    type Changes = BrandChanges;
    type StatusChanges = BrandStatusChanges;
    type Update = BrandUpdate;

    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        brand_parents(&self.subcategory, &self.category)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrandDraft {
    #[serde(rename = "bid")]
    pub key: Option<String>,
    #[serde(rename = "scid")]
    pub subcategory: Option<String>,
    #[serde(rename = "cid")]
    pub category: Option<String>,
    #[serde(rename = "bname")]
    pub name: Option<String>,
    #[serde(rename = "bdesc")]
    pub description: Option<String>,
    #[serde(rename = "bcreatedby")]
    pub created_by: Option<String>,
    #[serde(rename = "bmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "bstatus")]
    pub status: Option<bool>,
}

impl Validate for BrandDraft {
    type Valid = Brand;

    fn validate(self) -> Result<Brand, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("bid", self.key);
        let subcategory = v.key("scid", self.subcategory);
        let category = v.key("cid", self.category);
        let name = v.text("bname", self.name, NAME_LENGTH);
        let description = v.text("bdesc", self.description, DESCRIPTION_LENGTH);
        let created_by = v.text("bcreatedby", self.created_by, NAME_LENGTH);
        let modified_by = v.text("bmodifiedby", self.modified_by, NAME_LENGTH);
        let status = self.status.unwrap_or(false);
        v.finish(|| {
            Some(Brand {
                key: key?,
                subcategory: subcategory?,
                category: category?,
                name: name?,
                description: description?,
                created_by: created_by?,
                modified_by: modified_by?,
                status,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrandChanges {
    #[serde(rename = "bid")]
    pub key: Option<String>,
    #[serde(rename = "scid")]
    pub subcategory: Option<String>,
    #[serde(rename = "cid")]
    pub category: Option<String>,
    #[serde(rename = "bname")]
    pub name: Option<String>,
    #[serde(rename = "bdesc")]
    pub description: Option<String>,
    #[serde(rename = "bmodifiedby")]
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandUpdate {
    pub key: BusinessKey,
    pub subcategory: BusinessKey,
    pub category: BusinessKey,
    pub name: String,
    pub description: String,
    pub modified_by: String,
}

impl Validate for BrandChanges {
    type Valid = BrandUpdate;

    fn validate(self) -> Result<BrandUpdate, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("bid", self.key);
        let subcategory = v.key("scid", self.subcategory);
        let category = v.key("cid", self.category);
        let name = v.text("bname", self.name, NAME_LENGTH);
        let description = v.text("bdesc", self.description, DESCRIPTION_LENGTH);
        let modified_by = v.text("bmodifiedby", self.modified_by, NAME_LENGTH);
        v.finish(|| {
            Some(BrandUpdate {
                key: key?,
                subcategory: subcategory?,
                category: category?,
                name: name?,
                description: description?,
                modified_by: modified_by?,
            })
        })
    }
}

impl EntityUpdate for BrandUpdate {
    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        brand_parents(&self.subcategory, &self.category)
    }

    fn assignments(&self) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert("scid".into(), Value::from(self.subcategory.as_str()));
        set.insert("cid".into(), Value::from(self.category.as_str()));
        set.insert("bname".into(), Value::from(self.name.as_str()));
        set.insert("bdesc".into(), Value::from(self.description.as_str()));
        set.insert("bmodifiedby".into(), Value::from(self.modified_by.as_str()));
        set
    }
}

crate::status_changes!(BrandStatusChanges, "bid", "bstatus");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subcategory_is_checked_before_category() {
        let brand = serde_json::from_value::<BrandDraft>(json!({
            "bid": "B001",
            "scid": "SC01",
            "cid": "C001",
            "bname": "Acme",
            "bdesc": "Acme house brand",
            "bcreatedby": "alice",
            "bmodifiedby": "alice",
        }))
        .unwrap()
        .validate()
        .unwrap();

        let kinds: Vec<_> = brand.parents().into_iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Subcategory, EntityKind::Category]);
    }

    #[test]
    fn missing_parents_are_validation_errors() {
        let err = serde_json::from_value::<BrandDraft>(json!({
            "bid": "B001",
            "bname": "Acme",
            "bdesc": "Acme house brand",
            "bcreatedby": "alice",
            "bmodifiedby": "alice",
        }))
        .unwrap()
        .validate()
        .unwrap_err();

        assert!(err.has_field("scid"));
        assert!(err.has_field("cid"));
        assert_eq!(err.len(), 2);
    }
}
