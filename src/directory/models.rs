//! Directory data models for the Graph users search.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// One user as returned by Graph: requested attribute name to value.
///
/// Records are passed through untouched, so only the projected attributes
/// (and whatever else Graph decides to add) are present.
pub type UserRecord = Map<String, Value>;

/// Attribute Graph uses to flag an enabled account.
pub const ACCOUNT_ENABLED: &str = "accountEnabled";

/// A single filtered, projected user search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Attribute to search on (e.g. `mail`, `userPrincipalName`, `id`).
    pub search_attribute: String,

    /// Prefix the attribute must start with.
    pub search_value: String,

    /// Attributes to return for each match.
    pub select: Vec<String>,
}

impl UserQuery {
    pub fn new(
        search_attribute: impl Into<String>,
        search_value: impl Into<String>,
        select: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            search_attribute: search_attribute.into(),
            search_value: search_value.into(),
            select: select.into_iter().map(Into::into).collect(),
        }
    }

    /// OData query string, `$filter` then `$select`.
    ///
    /// Attribute and value are spliced in as given. No OData quoting is
    /// applied, so a value containing `'` or `)` changes the expression.
    pub fn query_string(&self) -> String {
        format!(
            "$filter=startswith({},'{}')&$select={}",
            self.search_attribute,
            self.search_value,
            self.select.join(",")
        )
    }
}

/// Envelope of a Graph collection response.
#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
    pub value: Vec<UserRecord>,
}

/// Whether a record's account is enabled.
///
/// Values are judged by truthiness: `false`, `null`, `0`, `""`, `[]` and
/// `{}` are disabled, anything else is enabled. A record without the
/// attribute is not what was asked for.
pub fn is_account_enabled(record: &UserRecord) -> Result<bool, ApiError> {
    match record.get(ACCOUNT_ENABLED) {
        Some(value) => Ok(is_truthy(value)),
        None => Err(ApiError::ParseFailed(format!(
            "user record has no {} attribute",
            ACCOUNT_ENABLED
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
