use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use catalog_core::validation::{DESCRIPTION_LENGTH, NAME_LENGTH};
use catalog_core::{BusinessKey, CatalogEntity, EntityKind, EntityUpdate, FieldValidator, Validate, ValidationErrors};

/// A product variation (size, colour, pack). References nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "vid")]
    pub key: BusinessKey,
    #[serde(rename = "vname")]
    pub name: String,
    #[serde(rename = "vdesc")]
    pub description: String,
    #[serde(rename = "vcreatedby")]
    pub created_by: String,
    #[serde(rename = "vmodifiedby")]
    pub modified_by: String,
    #[serde(rename = "vstatus", default)]
    pub status: bool,
}

impl CatalogEntity for Variant {
    const KIND: EntityKind = EntityKind::Variant;

    type Draft = VariantDraft;
    type Changes = VariantChanges;
    type StatusChanges = VariantStatusChanges;
    type Update = VariantUpdate;

    fn key(&self) -> &BusinessKey {
        &self.key
    }
}

/// Create payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VariantDraft {
    #[serde(rename = "vid")]
    pub key: Option<String>,
    #[serde(rename = "vname")]
    pub name: Option<String>,
    #[serde(rename = "vdesc")]
    pub description: Option<String>,
    #[serde(rename = "vcreatedby")]
    pub created_by: Option<String>,
    #[serde(rename = "vmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "vstatus")]
    pub status: Option<bool>,
}

impl Validate for VariantDraft {
    type Valid = Variant;

    fn validate(self) -> Result<Variant, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("vid", self.key);
        let name = v.text("vname", self.name, NAME_LENGTH);
        let description = v.text("vdesc", self.description, DESCRIPTION_LENGTH);
        let created_by = v.text("vcreatedby", self.created_by, NAME_LENGTH);
        let modified_by = v.text("vmodifiedby", self.modified_by, NAME_LENGTH);
        let status = self.status.unwrap_or(false);
        v.finish(|| {
            Some(Variant {
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
pub struct VariantChanges {
    #[serde(rename = "vid")]
    pub key: Option<String>,
    #[serde(rename = "vname")]
    pub name: Option<String>,
    #[serde(rename = "vdesc")]
    pub description: Option<String>,
    #[serde(rename = "vmodifiedby")]
    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantUpdate {
    pub key: BusinessKey,
    pub name: String,
    pub description: String,
    pub modified_by: String,
}

impl Validate for VariantChanges {
    type Valid = VariantUpdate;

    fn validate(self) -> Result<VariantUpdate, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("vid", self.key);
        let name = v.text("vname", self.name, NAME_LENGTH);
        let description = v.text("vdesc", self.description, DESCRIPTION_LENGTH);
        let modified_by = v.text("vmodifiedby", self.modified_by, NAME_LENGTH);
        v.finish(|| {
            Some(VariantUpdate {
                key: key?,
                name: name?,
                description: description?,
                modified_by: modified_by?,
            })
        })
    }
}

impl EntityUpdate for VariantUpdate {
    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn assignments(&self) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert("vname".into(), Value::from(self.name.as_str()));
        set.insert("vdesc".into(), Value::from(self.description.as_str()));
        set.insert("vmodifiedby".into(), Value::from(self.modified_by.as_str()));
        set
    }
}

crate::status_changes!(
    /// Status-only update payload.
    VariantStatusChanges,
    "vid",
    "vstatus"
);

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ViolationKind;
    use serde_json::json;

    #[test]
    fn draft_round_trips_into_document() {
        let variant = serde_json::from_value::<VariantDraft>(json!({
            "vid": "V001",
            "vname": "Large",
            "vdesc": "Large size, boxed",
            "vcreatedby": "alice",
            "vmodifiedby": "alice",
            "vstatus": true,
        }))
        .unwrap()
        .validate()
        .unwrap();

        let doc = serde_json::to_value(&variant).unwrap();
        assert_eq!(doc["vid"], "V001");
        assert_eq!(doc["vstatus"], true);
        assert!(variant.parents().is_empty());
    }

    #[test]
    fn overlong_key_is_rejected() {
        let err = serde_json::from_value::<VariantChanges>(json!({
            "vid": "V0000000001",
            "vname": "Large",
            "vdesc": "Large size, boxed",
            "vmodifiedby": "bob",
        }))
        .unwrap()
        .validate()
        .unwrap_err();

        assert_eq!(err.len(), 1);
        assert!(err.contains("vid", &ViolationKind::Length { min: 4, max: 10, actual: 11 }));
    }
}
