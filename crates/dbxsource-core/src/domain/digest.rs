//! Canonical content digest
//!
//! Fields are serialized as a JSON object with sorted keys. serde_json's
//! `Map` is ordered by key as long as its `preserve_order` feature stays off,
//! which also keeps nested objects sorted.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::newtypes::ContentDigest;

/// Builder for a content digest over named fields
#[derive(Debug, Default, Clone)]
pub struct DigestFields {
    fields: BTreeMap<&'static str, Value>,
}

impl DigestFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Later calls with the same name replace the value.
    pub fn field(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// Add a field only when a value is present
    pub fn optional(self, name: &'static str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self,
        }
    }

    /// Canonical JSON text (sorted keys, no whitespace)
    pub fn canonical_json(&self) -> String {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        Value::Object(object).to_string()
    }

    pub fn digest(&self) -> ContentDigest {
        ContentDigest::of_bytes(self.canonical_json().as_bytes())
    }
}
