use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use catalog_core::validation::{DESCRIPTION_LENGTH, NAME_LENGTH};
use catalog_core::{BusinessKey, CatalogEntity, EntityKind, EntityUpdate, FieldValidator, Validate, ValidationErrors};

/// Top-level grouping of the catalog. References nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "cid")]
    pub key: BusinessKey,
    #[serde(rename = "cname")]
    pub name: String,
    #[serde(rename = "cdesc")]
    pub description: String,
    #[serde(rename = "ccreatedby")]
    pub created_by: String,
    #[serde(rename = "cmodifiedby")]
    pub modified_by: String,
    #[serde(rename = "cstatus", default)]
    pub status: bool,
}

impl CatalogEntity for Category {
    const KIND: EntityKind = EntityKind::Category;

    type Draft = CategoryDraft;
    type Changes = CategoryChanges;
    type StatusChanges = CategoryStatusChanges;
    type Update = CategoryUpdate;

    fn key(&self) -> &BusinessKey {
        &self.key
    }
}

/// Create payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryDraft {
    #[serde(rename = "cid")]
    pub key: Option<String>,
    #[serde(rename = "cname")]
    pub name: Option<String>,
    #[serde(rename = "cdesc")]
    pub description: Option<String>,
    #[serde(rename = "ccreatedby")]
    pub created_by: Option<String>,
    #[serde(rename = "cmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "cstatus")]
    pub status: Option<bool>,
}

impl Validate for CategoryDraft {
    type Valid = Category;

    fn validate(self) -> Result<Category, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("cid", self.key);
        let name = v.text("cname", self.name, NAME_LENGTH);
        let description = v.text("cdesc", self.description, DESCRIPTION_LENGTH);
        let created_by = v.text("ccreatedby", self.created_by, NAME_LENGTH);
        let modified_by = v.text("cmodifiedby", self.modified_by, NAME_LENGTH);
        let status = self.status.unwrap_or(false);
        v.finish(|| {
            Some(Category {
                key: key?,
                name: name?,
                description: description?,
                created_by: created_by?,
                modified_by: modified_by?,
                status,
            })
        })
    }
}

/// Full-record update payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryChanges {
    #[serde(rename = "cid")]
    pub key: Option<String>,
    #[serde(rename = "cname")]
    pub name: Option<String>,
    #[serde(rename = "cdesc")]
    pub description: Option<String>,
    #[serde(rename = "cmodifiedby")]
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub key: BusinessKey,
    pub name: String,
    pub description: String,
    pub modified_by: String,
}

impl Validate for CategoryChanges {
    type Valid = CategoryUpdate;

    fn validate(self) -> Result<CategoryUpdate, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("cid", self.key);
        let name = v.text("cname", self.name, NAME_LENGTH);
        let description = v.text("cdesc", self.description, DESCRIPTION_LENGTH);
        let modified_by = v.text("cmodifiedby", self.modified_by, NAME_LENGTH);
        v.finish(|| {
            Some(CategoryUpdate {
                key: key?,
                name: name?,
                description: description?,
                modified_by: modified_by?,
            })
        })
    }
}

impl EntityUpdate for CategoryUpdate {
    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn assignments(&self) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert("cname".into(), Value::from(self.name.as_str()));
        set.insert("cdesc".into(), Value::from(self.description.as_str()));
        set.insert("cmodifiedby".into(), Value::from(self.modified_by.as_str()));
        set
    }
}

crate::status_changes!(
    /// Status-only update payload.
    CategoryStatusChanges,
    "cid",
    "cstatus"
);

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ViolationKind;
    use serde_json::json;

    fn draft(body: Value) -> CategoryDraft {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn valid_draft_becomes_category() {
        let category = draft(json!({
            "cid": "C001",
            "cname": "Apparel",
            "cdesc": "Clothing and accessories",
            "ccreatedby": "alice",
            "cmodifiedby": "alice",
        }))
        .validate()
        .unwrap();

        assert_eq!(category.key.as_str(), "C001");
        assert!(!category.status);
        assert!(category.parents().is_empty());
    }

    #[test]
    fn every_broken_field_is_reported() {
        let err = draft(json!({
            "cid": "C_1",
            "cname": "Ap",
            "cdesc": "",
        }))
        .validate()
        .unwrap_err();

        assert!(err.contains("cid", &ViolationKind::NotAlphanumeric));
        assert!(err.contains("cname", &ViolationKind::Length { min: 3, max: 20, actual: 2 }));
        assert!(err.contains("cdesc", &ViolationKind::Required));
        assert!(err.contains("ccreatedby", &ViolationKind::Required));
        assert!(err.contains("cmodifiedby", &ViolationKind::Required));
    }

    #[test]
    fn document_uses_wire_field_names() {
        let category = Category {
            key: BusinessKey::guard("C001").unwrap(),
            name: "Apparel".into(),
            description: "Clothing".into(),
            created_by: "alice".into(),
            modified_by: "bob".into(),
            status: true,
        };
        assert_eq!(
            serde_json::to_value(&category).unwrap(),
            json!({
                "cid": "C001",
                "cname": "Apparel",
                "cdesc": "Clothing",
                "ccreatedby": "alice",
                "cmodifiedby": "bob",
                "cstatus": true,
            })
        );
    }

    #[test]
    fn update_never_assigns_created_by_or_status() {
        let update = serde_json::from_value::<CategoryChanges>(json!({
            "cid": "C001",
            "cname": "Apparel",
            "cdesc": "Clothing and accessories",
            "cmodifiedby": "bob",
        }))
        .unwrap()
        .validate()
        .unwrap();

        let set = update.assignments();
        assert_eq!(set.len(), 3);
        assert!(!set.contains_key("ccreatedby"));
        assert!(!set.contains_key("cstatus"));
        assert!(!set.contains_key("cid"));
    }

    #[test]
    fn status_payload_requires_flag() {
        let err = serde_json::from_value::<CategoryStatusChanges>(json!({ "cid": "C001" }))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.contains("cstatus", &ViolationKind::Required));
    }
}
