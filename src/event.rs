//! Invocation event handling.
//!
//! The event is a free-form JSON object; only `username` is read from it.

use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

use crate::error::InputError;

/// The input object the check is invoked with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationEvent(Map<String, Value>);

impl InvocationEvent {
    /// Event carrying only a username.
    pub fn with_username(username: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("username".to_string(), Value::String(username.into()));
        Self(fields)
    }

    /// Parse an event from JSON text. Anything but an object is rejected.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        let fields: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self(fields))
    }

    /// Read an event from a file, or from stdin when `path` is `-`.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let json = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path)?
        };
        Self::from_json(&json)
    }

    /// The `username` field, when present as a string.
    pub fn username(&self) -> Result<&str, InputError> {
        self.0
            .get("username")
            .and_then(Value::as_str)
            .ok_or(InputError::MissingUsername)
    }
}
