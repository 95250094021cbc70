//! Value, context, and event types shared by every interpreter.
//!
//! Context fields are flat scalars (boolean, number, string) so that a
//! snapshot can be compared field-by-field and serialized identically by
//! independent runtimes. No nested structures are allowed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single context field value.
///
/// Numbers are kept as [`serde_json::Number`] so integers and floats
/// round-trip through JSON without changing representation.
///
/// # Example
///
/// ```rust
/// use lockstep::spec::FieldValue;
///
/// let v: FieldValue = true.into();
/// assert_eq!(v.as_bool(), Some(true));
///
/// let v: FieldValue = "item-0".into();
/// assert_eq!(v.as_str(), Some("item-0"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl FieldValue {
    /// Boolean value, if this field holds one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String value, if this field holds one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value as f64, if this field holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Number(0.into()))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// The flat data record a machine carries alongside its current state.
///
/// Backed by a `BTreeMap` so iteration order and serialization are
/// deterministic, and equality is exact across runtimes.
///
/// # Example
///
/// ```rust
/// use lockstep::spec::Context;
///
/// let mut ctx = Context::new();
/// ctx.set("checked", false);
/// ctx.set("disabled", false);
///
/// ctx.toggle("checked");
/// assert!(ctx.bool_field("checked"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, FieldValue>);

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Write a field, inserting it if absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Boolean field, defaulting to `false` when absent or non-boolean.
    pub fn bool_field(&self, name: &str) -> bool {
        self.get(name).and_then(FieldValue::as_bool).unwrap_or(false)
    }

    /// String field, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// Flip a boolean field in place. Non-boolean fields are left alone.
    pub fn toggle(&mut self, name: &str) {
        if let Some(current) = self.get(name).and_then(FieldValue::as_bool) {
            self.set(name, !current);
        }
    }

    /// Overlay another context's fields onto this one. Overlay values win.
    pub fn merge(&mut self, overlay: &Context) {
        for (name, value) in overlay.iter() {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Iterate fields in deterministic (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keyed bag of values attached to an event, e.g. `{"id": "item-0"}`.
pub type Payload = BTreeMap<String, FieldValue>;

/// An event sent to a machine.
///
/// The payload is opaque to the interpreter core; only named actions
/// interpret it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Event {
    /// Event with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    /// Event carrying a payload.
    pub fn with_payload(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload),
        }
    }

    /// Read one payload field, if the payload carries it.
    pub fn payload_value(&self, key: &str) -> Option<&FieldValue> {
        self.payload.as_ref().and_then(|p| p.get(key))
    }
}
