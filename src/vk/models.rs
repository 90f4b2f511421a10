//! Typed views over raw API payloads
//!
//! The client hands back the untouched `response` value; decoding happens here
//! so a single bad item never poisons the rest of a list.

use crate::neo4j::models::{GroupNode, PersonNode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code the API uses for "too many requests per second".
pub const TOO_MANY_REQUESTS: i64 = 6;

/// Top-level envelope: exactly one of `response` / `error` is expected.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error object embedded in a response body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl ApiErrorBody {
    pub fn is_rate_limit(&self) -> bool {
        self.error_code == TOO_MANY_REQUESTS
    }
}

/// City reference attached to a user profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CityRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A user as returned by `users.get` or an extended user list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
    #[serde(default)]
    pub city: Option<CityRef>,
}

impl UserRecord {
    /// First and last name joined by a space; empty when both are missing.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_person(&self) -> PersonNode {
        PersonNode {
            id: self.id,
            screen_name: self.screen_name.clone().unwrap_or_default(),
            name: self.display_name(),
            city: self
                .city
                .as_ref()
                .and_then(|c| c.title.clone())
                .unwrap_or_default(),
        }
    }
}

/// A community as returned by `groups.get` with `extended=1`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
}

impl GroupRecord {
    pub fn to_group(&self) -> GroupNode {
        GroupNode {
            id: self.id,
            screen_name: self.screen_name.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
        }
    }
}

/// Decode the first profile of a `users.get` payload.
///
/// Returns `None` for a non-list payload, an empty list, or a first element
/// without a usable `id`.
pub fn decode_profile(payload: &Value) -> Option<UserRecord> {
    let first = payload.as_array()?.first()?;
    match serde_json::from_value(first.clone()) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Malformed user profile: {}", e);
            None
        }
    }
}

/// Decode `items` of a `{count, items}` list payload.
///
/// Items that fail to decode are logged and dropped; a payload without an
/// `items` array yields an empty list.
pub fn decode_items<T: DeserializeOwned>(payload: &Value) -> Vec<T> {
    let Some(items) = payload.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Skipping malformed list item: {}", e);
                None
            }
        })
        .collect()
}
