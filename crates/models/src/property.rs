use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
}

/// Required listing fields, in the order they are checked.
pub const REQUIRED_FIELDS: [(&str, FieldKind); 12] = [
    ("title", FieldKind::Text),
    ("address", FieldKind::Text),
    ("bedrooms", FieldKind::Numeric),
    ("bathrooms", FieldKind::Numeric),
    ("suites", FieldKind::Numeric),
    ("built_area", FieldKind::Numeric),
    ("total_area", FieldKind::Numeric),
    ("price", FieldKind::Numeric),
    ("condition", FieldKind::Text),
    ("description", FieldKind::Text),
    ("cover_image_url", FieldKind::Text),
    ("photos_google_drive_link", FieldKind::Text),
];

/// A single real-estate listing.
///
/// Known fields are typed; anything else the caller sent lands in `extra`
/// and is written back verbatim. Numbers stay `serde_json::Number` so an
/// integer `2` is not rewritten as `2.0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub address: String,
    pub bedrooms: Number,
    pub bathrooms: Number,
    pub suites: Number,
    pub built_area: Number,
    pub total_area: Number,
    pub price: Number,
    pub condition: String,
    pub description: String,
    pub cover_image_url: String,
    pub photos_google_drive_link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Root object of the persisted JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Document {
    pub fn position(&self, id: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }
}

/// Check a candidate payload; returns the first failing field.
pub fn validate(candidate: &Value) -> Result<(), ModelError> {
    let map = candidate
        .as_object()
        .ok_or_else(|| ModelError::Validation("property must be a JSON object".into()))?;
    validate_fields(map)
}

pub fn validate_fields(map: &Map<String, Value>) -> Result<(), ModelError> {
    for (name, kind) in REQUIRED_FIELDS {
        let value = match map.get(name) {
            None | Some(Value::Null) => return Err(required(name)),
            Some(v) => v,
        };
        match (kind, value) {
            (FieldKind::Numeric, Value::Number(_)) => {}
            (FieldKind::Numeric, _) => {
                return Err(ModelError::Validation(format!("{name} must be a number")));
            }
            (FieldKind::Text, Value::String(s)) if s.is_empty() => return Err(required(name)),
            (FieldKind::Text, Value::String(_)) => {}
            (FieldKind::Text, _) => {
                return Err(ModelError::Validation(format!("{name} must be a string")));
            }
        }
    }
    Ok(())
}

fn required(name: &str) -> ModelError {
    ModelError::Validation(format!("{name} is required"))
}

impl Property {
    /// Build a stored record from a validated candidate, forcing `id`.
    pub fn from_candidate(id: String, mut candidate: Map<String, Value>) -> Result<Self, ModelError> {
        validate_fields(&candidate)?;
        candidate.insert("id".into(), Value::String(id));
        serde_json::from_value(Value::Object(candidate))
            .map_err(|e| ModelError::Validation(e.to_string()))
    }

    /// Shallow-merge `patch` over this record. Fields absent from the patch keep
    /// their value, `id` never changes, and the merged result must still validate.
    pub fn merge(&self, patch: Map<String, Value>) -> Result<Self, ModelError> {
        let mut merged = self.to_map()?;
        for (key, value) in patch {
            merged.insert(key, value);
        }
        Self::from_candidate(self.id.clone(), merged)
    }

    pub fn to_map(&self) -> Result<Map<String, Value>, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::Validation("property did not serialize to an object".into())),
            Err(e) => Err(ModelError::Validation(e.to_string())),
        }
    }
}
