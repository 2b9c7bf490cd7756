use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use catalog_core::validation::{DESCRIPTION_LENGTH, NAME_LENGTH};
use catalog_core::{
    BusinessKey, CatalogEntity, EntityKind, EntityUpdate, FieldValidator, ParentRef, Validate,
    ValidationErrors, ViolationKind,
};

/// The four catalog entries a product hangs off, stored nested under `subprod`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRefs {
    #[serde(rename = "categoryid")]
    pub category: BusinessKey,
    #[serde(rename = "subcategoryid")]
    pub subcategory: BusinessKey,
    #[serde(rename = "brandid")]
    pub brand: BusinessKey,
    #[serde(rename = "variantid")]
    pub variant: BusinessKey,
}

impl ProductRefs {
    /// Category, subcategory, brand, variant: the order missing parents are reported in.
    pub fn parents(&self) -> Vec<ParentRef> {
        vec![
            ParentRef::new(EntityKind::Category, self.category.clone()),
            ParentRef::new(EntityKind::Subcategory, self.subcategory.clone()),
            ParentRef::new(EntityKind::Brand, self.brand.clone()),
            ParentRef::new(EntityKind::Variant, self.variant.clone()),
        ]
    }

    fn to_value(&self) -> Value {
        let mut refs = Map::new();
        refs.insert("categoryid".into(), Value::from(self.category.as_str()));
        refs.insert("subcategoryid".into(), Value::from(self.subcategory.as_str()));
        refs.insert("brandid".into(), Value::from(self.brand.as_str()));
        refs.insert("variantid".into(), Value::from(self.variant.as_str()));
        Value::Object(refs)
    }
}

/// A sellable item with stock and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "pid")]
    pub key: BusinessKey,
    #[serde(rename = "pname")]
    pub name: String,
    #[serde(rename = "pdesc")]
    pub description: String,
    #[serde(rename = "pqty")]
    pub quantity: u64,
    #[serde(rename = "pmrp")]
    pub mrp: f64,
    #[serde(rename = "pprice")]
    pub price: f64,
    #[serde(rename = "pcreatedby")]
    pub created_by: String,
    #[serde(rename = "pmodifiedby")]
    pub modified_by: String,
    #[serde(rename = "pstatus", default)]
    pub status: bool,
    #[serde(rename = "subprod")]
    pub refs: ProductRefs,
}

impl CatalogEntity for Product {
    const KIND: EntityKind = EntityKind::Product;

    type Draft = ProductDraft;
    type Changes = ProductChanges;
    type StatusChanges = ProductStatusChanges;
    type Update = ProductUpdate;

    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        self.refs.parents()
    }
}

/// Loosely typed `subprod` object as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductRefsPayload {
    #[serde(rename = "categoryid")]
    pub category: Option<String>,
    #[serde(rename = "subcategoryid")]
    pub subcategory: Option<String>,
    #[serde(rename = "brandid")]
    pub brand: Option<String>,
    #[serde(rename = "variantid")]
    pub variant: Option<String>,
}

fn check_refs(v: &mut FieldValidator, refs: Option<ProductRefsPayload>) -> Option<ProductRefs> {
    let Some(refs) = refs else {
        v.reject("subprod", ViolationKind::Required);
        return None;
    };
    let category = v.key("subprod.categoryid", refs.category);
    let subcategory = v.key("subprod.subcategoryid", refs.subcategory);
    let brand = v.key("subprod.brandid", refs.brand);
    let variant = v.key("subprod.variantid", refs.variant);
    Some(ProductRefs {
        category: category?,
        subcategory: subcategory?,
        brand: brand?,
        variant: variant?,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    #[serde(rename = "pid")]
    pub key: Option<String>,
    #[serde(rename = "pname")]
    pub name: Option<String>,
    #[serde(rename = "pdesc")]
    pub description: Option<String>,
    #[serde(rename = "pqty")]
    pub quantity: Option<Value>,
    #[serde(rename = "pmrp")]
    pub mrp: Option<Value>,
    #[serde(rename = "pprice")]
    pub price: Option<Value>,
    #[serde(rename = "pcreatedby")]
    pub created_by: Option<String>,
    #[serde(rename = "pmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "pstatus")]
    pub status: Option<bool>,
    #[serde(rename = "subprod")]
    pub refs: Option<ProductRefsPayload>,
}

impl Validate for ProductDraft {
    type Valid = Product;

    fn validate(self) -> Result<Product, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("pid", self.key);
        let name = v.text("pname", self.name, NAME_LENGTH);
        let description = v.text("pdesc", self.description, DESCRIPTION_LENGTH);
        let quantity = v.quantity("pqty", self.quantity);
        let mrp = v.amount("pmrp", self.mrp);
        let price = v.amount("pprice", self.price);
        let created_by = v.text("pcreatedby", self.created_by, NAME_LENGTH);
        let modified_by = v.text("pmodifiedby", self.modified_by, NAME_LENGTH);
        let refs = check_refs(&mut v, self.refs);
        let status = self.status.unwrap_or(false);
        v.finish(|| {
            Some(Product {
                key: key?,
                name: name?,
                description: description?,
                quantity: quantity?,
                mrp: mrp?,
                price: price?,
                created_by: created_by?,
                modified_by: modified_by?,
                status,
                refs: refs?,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductChanges {
    #[serde(rename = "pid")]
    pub key: Option<String>,
    #[serde(rename = "pname")]
    pub name: Option<String>,
    #[serde(rename = "pdesc")]
    pub description: Option<String>,
    #[serde(rename = "pqty")]
    pub quantity: Option<Value>,
    #[serde(rename = "pmrp")]
    pub mrp: Option<Value>,
    #[serde(rename = "pprice")]
    pub price: Option<Value>,
    #[serde(rename = "pmodifiedby")]
    pub modified_by: Option<String>,
    #[serde(rename = "subprod")]
    pub refs: Option<ProductRefsPayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub key: BusinessKey,
    pub name: String,
    pub description: String,
    pub quantity: u64,
    pub mrp: f64,
    pub price: f64,
    pub modified_by: String,
    pub refs: ProductRefs,
}

impl Validate for ProductChanges {
    type Valid = ProductUpdate;

    fn validate(self) -> Result<ProductUpdate, ValidationErrors> {
        let mut v = FieldValidator::new();
        let key = v.key("pid", self.key);
        let name = v.text("pname", self.name, NAME_LENGTH);
        let description = v.text("pdesc", self.description, DESCRIPTION_LENGTH);
        let quantity = v.quantity("pqty", self.quantity);
        let mrp = v.amount("pmrp", self.mrp);
        let price = v.amount("pprice", self.price);
        let modified_by = v.text("pmodifiedby", self.modified_by, NAME_LENGTH);
        let refs = check_refs(&mut v, self.refs);
        v.finish(|| {
            Some(ProductUpdate {
                key: key?,
                name: name?,
                description: description?,
                quantity: quantity?,
                mrp: mrp?,
                price: price?,
                modified_by: modified_by?,
                refs: refs?,
            })
        })
    }
}

impl EntityUpdate for ProductUpdate {
    fn key(&self) -> &BusinessKey {
        &self.key
    }

    fn parents(&self) -> Vec<ParentRef> {
        self.refs.parents()
    }

    fn assignments(&self) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert("pname".into(), Value::from(self.name.as_str()));
        set.insert("pdesc".into(), Value::from(self.description.as_str()));
        set.insert("pqty".into(), Value::from(self.quantity));
        set.insert("pmrp".into(), Value::from(self.mrp));
        set.insert("pprice".into(), Value::from(self.price));
        set.insert("pmodifiedby".into(), Value::from(self.modified_by.as_str()));
        set.insert("subprod".into(), self.refs.to_value());
        set
    }
}

crate::status_changes!(ProductStatusChanges, "pid", "pstatus");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "pid": "P001",
            "pname": "Oxford Shirt",
            "pdesc": "Slim fit oxford shirt",
            "pqty": 12,
            "pmrp": 49.5,
            "pprice": 39.0,
            "pcreatedby": "alice",
            "pmodifiedby": "alice",
            "subprod": {
                "categoryid": "C001",
                "subcategoryid": "SC01",
                "brandid": "B001",
                "variantid": "V001",
            },
        })
    }

    #[test]
    fn valid_draft_carries_nested_references() {
        let product = serde_json::from_value::<ProductDraft>(body())
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(product.quantity, 12);
        let kinds: Vec<_> = product.parents().into_iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Category,
                EntityKind::Subcategory,
                EntityKind::Brand,
                EntityKind::Variant,
            ]
        );
    }

    #[test]
    fn non_numeric_stock_is_a_violation_not_a_decode_failure() {
        let mut raw = body();
        raw["pqty"] = json!("twelve");
        raw["pmrp"] = json!(-1);

        let err = serde_json::from_value::<ProductDraft>(raw)
            .unwrap()
            .validate()
            .unwrap_err();

        assert!(err.contains("pqty", &ViolationKind::NotNumeric));
        assert!(err.contains("pmrp", &ViolationKind::Negative));
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn nested_reference_fields_are_named_by_path() {
        let mut raw = body();
        raw["subprod"]["brandid"] = json!("B!");
        let err = serde_json::from_value::<ProductDraft>(raw)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.has_field("subprod.brandid"));

        let mut raw = body();
        raw.as_object_mut().unwrap().remove("subprod");
        let err = serde_json::from_value::<ProductDraft>(raw)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.contains("subprod", &ViolationKind::Required));
    }

    #[test]
    fn update_replaces_nested_references_wholesale() {
        let mut raw = body();
        let obj = raw.as_object_mut().unwrap();
        obj.remove("pcreatedby");
        obj.remove("pstatus");
        let update = serde_json::from_value::<ProductChanges>(raw)
            .unwrap()
            .validate()
            .unwrap();

        let set = update.assignments();
        assert_eq!(set["subprod"]["variantid"], "V001");
        assert!(!set.contains_key("pcreatedby"));
        assert!(!set.contains_key("pstatus"));
    }
}
