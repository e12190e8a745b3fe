//! User record echoed by the verify endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// User returned after a successful verification
///
/// Only the access token matters to the login flow; every other field is
/// kept as-is so a caller can hand the record to the rest of the app.
/// The identifier and number are opaque: whatever JSON type the backend
/// uses, they never make the record fail to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Backend identifier
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "opaque_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Verified mobile number
    #[serde(
        rename = "mobileNumber",
        default,
        deserialize_with = "opaque_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile_number: Option<String>,

    /// Session token
    #[serde(
        rename = "accessToken",
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,

    /// Any additional fields the backend sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Creates a record carrying only a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Default::default()
        }
    }

    /// The access token, if present and non-blank
    pub fn session_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

// Any non-null value; strings as-is, everything else as its JSON text
fn opaque_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }))
}

// Strings and numbers only; a structured token is treated as absent
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }))
}
