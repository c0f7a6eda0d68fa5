//! Form data accumulated across the steps of a flow.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single form field value
///
/// Serialises untagged, so JSON `"text"`, `true` and `null` map directly.
/// JSON numbers are accepted on input and kept as their text form.
/// `Unset` only appears in edits and removes the field when merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS, JsonSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    Unset,
}

/// Wire shapes accepted for a field value
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Unset,
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match RawFieldValue::deserialize(deserializer)? {
            RawFieldValue::Flag(flag) => FieldValue::Flag(flag),
            RawFieldValue::Integer(n) => FieldValue::Text(n.to_string()),
            RawFieldValue::Float(n) => FieldValue::Text(n.to_string()),
            RawFieldValue::Text(text) => FieldValue::Text(text),
            RawFieldValue::Unset => FieldValue::Unset,
        })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Field name to value mapping, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct FormData(BTreeMap<String, FieldValue>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for prefill and tests
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        match value.into() {
            FieldValue::Unset => {
                self.0.remove(name);
            }
            value => {
                self.0.insert(name.to_string(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Trimmed text value; blank text counts as missing
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// Boolean value; text "true"/"false" is accepted for form posts
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(FieldValue::Flag(b)) => Some(*b),
            Some(FieldValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Return a copy with `edits` applied on top; `Unset` edits remove fields
    pub fn merged(&self, edits: &FormData) -> FormData {
        let mut merged = self.clone();
        for (name, value) in &edits.0 {
            merged.set(name, value.clone());
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (name, value) in iter {
            form.set(&name, value);
        }
        form
    }
}
