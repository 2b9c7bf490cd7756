//! Field validation.
//!
//! Payloads arrive loosely typed (every field optional, numerics as raw JSON)
//! and are turned into strongly typed entities by a [`Validate`] impl. Each
//! impl walks its fields through a [`FieldValidator`], which records every
//! violation instead of stopping at the first one.

use core::ops::RangeInclusive;

use serde::Serialize;
use serde_json::Value;

use crate::id::{is_key_syntax, BusinessKey};

/// Length bounds shared by every business key and parent reference.
pub const KEY_LENGTH: RangeInclusive<usize> = 4..=10;
/// Length bounds for names and audit fields (`createdBy`, `modifiedBy`).
pub const NAME_LENGTH: RangeInclusive<usize> = 3..=20;
/// Length bounds for descriptions.
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 5..=100;

/// Conversion from a request payload into its validated form.
///
/// Pure: no store access, no side effects.
pub trait Validate {
    type Valid;

    fn validate(self) -> Result<Self::Valid, ValidationErrors>;
}

/// The rule a field broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    Length {
        min: usize,
        max: usize,
        actual: usize,
    },
    NotAlphanumeric,
    NotNumeric,
    Negative,
}

impl core::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ViolationKind::Required => f.write_str("is required"),
            ViolationKind::Length { min, max, actual } => {
                write!(f, "length {actual} outside {min}..={max}")
            }
            ViolationKind::NotAlphanumeric => f.write_str("must be alphanumeric"),
            ViolationKind::NotNumeric => f.write_str("must be numeric"),
            ViolationKind::Negative => f.write_str("must not be negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

/// Every violation found in one payload, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `field` broke `kind`.
    pub fn contains(&self, field: &str, kind: &ViolationKind) -> bool {
        self.0.iter().any(|v| v.field == field && &v.kind == kind)
    }

    /// Whether `field` broke any rule.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, v) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", v.field, v.kind)?;
        }
        Ok(())
    }
}

/// Collects violations while extracting typed values from a payload.
///
/// Each check returns `Some(value)` when the field passed and `None` when it
/// did not; [`FieldValidator::finish`] then assembles the typed value only if
/// nothing was recorded.
#[derive(Debug, Default)]
pub struct FieldValidator {
    violations: Vec<FieldViolation>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation found outside the built-in checks.
    pub fn reject(&mut self, field: &'static str, kind: ViolationKind) {
        self.violations.push(FieldViolation { field, kind });
    }

    fn required_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.reject(field, ViolationKind::Required);
                None
            }
        }
    }

    fn within(&mut self, field: &'static str, value: &str, bounds: &RangeInclusive<usize>) -> bool {
        let actual = value.chars().count();
        if bounds.contains(&actual) {
            true
        } else {
            self.reject(
                field,
                ViolationKind::Length {
                    min: *bounds.start(),
                    max: *bounds.end(),
                    actual,
                },
            );
            false
        }
    }

    /// Required alphanumeric key of 4..=10 characters.
    pub fn key(&mut self, field: &'static str, value: Option<String>) -> Option<BusinessKey> {
        let raw = self.required_text(field, value)?;
        let sized = self.within(field, &raw, &KEY_LENGTH);
        if !is_key_syntax(&raw) {
            self.reject(field, ViolationKind::NotAlphanumeric);
            return None;
        }
        if !sized {
            return None;
        }
        BusinessKey::guard(raw).ok()
    }

    /// Required free text within `bounds` characters.
    pub fn text(
        &mut self,
        field: &'static str,
        value: Option<String>,
        bounds: RangeInclusive<usize>,
    ) -> Option<String> {
        let raw = self.required_text(field, value)?;
        self.within(field, &raw, &bounds).then_some(raw)
    }

    /// Required non-negative integer.
    pub fn quantity(&mut self, field: &'static str, value: Option<Value>) -> Option<u64> {
        match value {
            None | Some(Value::Null) => {
                self.reject(field, ViolationKind::Required);
                None
            }
            Some(Value::Number(n)) => {
                if let Some(q) = n.as_u64() {
                    Some(q)
                } else if n.as_i64().is_some() {
                    self.reject(field, ViolationKind::Negative);
                    None
                } else {
                    self.reject(field, ViolationKind::NotNumeric);
                    None
                }
            }
            Some(_) => {
                self.reject(field, ViolationKind::NotNumeric);
                None
            }
        }
    }

    /// Required non-negative number.
    pub fn amount(&mut self, field: &'static str, value: Option<Value>) -> Option<f64> {
        match value {
            None | Some(Value::Null) => {
                self.reject(field, ViolationKind::Required);
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(a) if a >= 0.0 => Some(a),
                Some(_) => {
                    self.reject(field, ViolationKind::Negative);
                    None
                }
                None => {
                    self.reject(field, ViolationKind::NotNumeric);
                    None
                }
            },
            Some(_) => {
                self.reject(field, ViolationKind::NotNumeric);
                None
            }
        }
    }

    /// Required boolean flag.
    pub fn flag(&mut self, field: &'static str, value: Option<bool>) -> Option<bool> {
        if value.is_none() {
            self.reject(field, ViolationKind::Required);
        }
        value
    }

    /// Build the validated value, or report everything recorded so far.
    ///
    /// `build` is expected to succeed whenever no violation was recorded; the
    /// individual checks only return `None` after recording one.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.violations.is_empty() {
            return Err(ValidationErrors(self.violations));
        }
        build().ok_or(ValidationErrors(self.violations))
    }
}
