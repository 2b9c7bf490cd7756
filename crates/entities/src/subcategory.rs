use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use catalog_core::validation::{DESCRIPTION_LENGTH, NAME_LENGTH};
use catalog_core::{
    BusinessKey, CatalogEntity, EntityKind, EntityUpdate, FieldValidator, ParentRef, Validate,
    ValidationErrors,
};

/// Second level of the catalog tree; belongs to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "scid")]
    pub key: BusinessKey,
    #[serde(rename = "cid")]
    pub category: BusinessKey,
    #[serde(rename = "scname")]
    pub name: String,
    #[serde(rename = "scdesc")]
    pub description: String,
    #[serde(rename = "sccreatedby")]
    pub created_by: String,
    #[serde(rename = "scmodifiedby")]
    pub modified_by: String,
    #[serde(rename = "scstatus", default)]
    pub status: bool,
}

impl CatalogEntity for Subcategory {
    const KIND: EntityKind = EntityKind::Subcategory;

    type Draft = SubcategoryDraft;
    type Changes = SubcategoryChanges;
    type StatusChanges = SubcategoryStatusChanges;
    type Update = SubcategoryUpdate;

    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::new(EntityKind::Category, self.category.clone())]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubcategoryDraft {
    #[serde(rename = "scid")]
    pub key: Option<String>,
    #[serde(rename = "cid")]
    pub category: Option<String>,
    #[serde(rename = "scname")]
    pub name: Option<String>,
    #[serde(rename = "scdesc")]
    pub description: Option<String>,
    #[serde(rename = "sccreatedby")]
    pub created_by: Option<String>,
    #[serde(rename = "scmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "scstatus")]
    pub status: Option<bool>,
}

impl Validate for SubcategoryDraft {
    type Valid = Subcategory;

    fn validate(self) -> Result<Subcategory, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("scid", self.key);
        let category = v.key("cid", self.category);
        let name = v.text("scname", self.name, NAME_LENGTH);
        let description = v.text("scdesc", self.description, DESCRIPTION_LENGTH);
        let created_by = v.text("sccreatedby", self.created_by, NAME_LENGTH);
        let modified_by = v.text("scmodifiedby", self.modified_by, NAME_LENGTH);
        let status = self.status.unwrap_or(false);
        v.finish(|| {
            Some(Subcategory {
                key: key?,
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

/// Full-record update payload. The parent category may be reassigned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubcategoryChanges {
    #[serde(rename = "scid")]
    pub key: Option<String>,
    #[serde(rename = "cid")]
    pub category: Option<String>,
    #[serde(rename = "scname")]
    pub name: Option<String>,
    #[serde(rename = "scdesc")]
    pub description: Option<String>,
    #[serde(rename = "scmodifiedby")]
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryUpdate {
    pub key: BusinessKey,
    pub category: BusinessKey,
    pub name: String,
    pub description: String,
    pub modified_by: String,
}

impl Validate for SubcategoryChanges {
    type Valid = SubcategoryUpdate;

    fn validate(self) -> Result<SubcategoryUpdate, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("scid", self.key);
        let category = v.key("cid", self.category);
        let name = v.text("scname", self.name, NAME_LENGTH);
        let description = v.text("scdesc", self.description, DESCRIPTION_LENGTH);
        let modified_by = v.text("scmodifiedby", self.modified_by, NAME_LENGTH);
        v.finish(|| {
            Some(SubcategoryUpdate {
                key: key?,
                category: category?,
                name: name?,
                description: description?,
                modified_by: modified_by?,
            })
        })
    }
}

impl EntityUpdate for SubcategoryUpdate {
    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::new(EntityKind::Category, self.category.clone())]
    }

    fn assignments(&self) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert("cid".into(), Value::from(self.category.as_str()));
        set.insert("scname".into(), Value::from(self.name.as_str()));
        set.insert("scdesc".into(), Value::from(self.description.as_str()));
        set.insert("scmodifiedby".into(), Value::from(self.modified_by.as_str()));
        set
    }
}

crate::status_changes!(SubcategoryStatusChanges, "scid", "scstatus");
