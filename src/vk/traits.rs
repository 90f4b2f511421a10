//! SocialApi trait definition
//!
//! The crawler only ever talks to the remote API through this trait, so tests
//! can script payloads without an HTTP server.

use super::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Remote method names
pub mod methods {
    pub const USERS_GET: &str = "users.get";
    pub const USERS_GET_FOLLOWERS: &str = "users.getFollowers";
    pub const USERS_GET_SUBSCRIPTIONS: &str = "users.getSubscriptions";
    pub const GROUPS_GET: &str = "groups.get";
}

/// Fields requested for every extended list call
const LIST_FIELDS: &str = "screen_name";

/// Fields requested for a single profile
const PROFILE_FIELDS: &str = "screen_name,city";

/// Read-only access to the social network API.
///
/// `call` returns the `response` payload, `Ok(None)` when the API reported an
/// application error or the body was unusable, and `Err` only when no
/// response envelope could be obtained at all.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Call a remote method with the given query parameters.
    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Option<Value>>;

    /// Fetch a user's profile (`users.get`)
    async fn get_user_info(&self, user_id: i64) -> Result<Option<Value>> {
        self.call(
            methods::USERS_GET,
            &[
                ("user_ids", user_id.to_string()),
                ("fields", PROFILE_FIELDS.to_string()),
            ],
        )
        .await
    }

    /// Fetch the users following `user_id`
    async fn get_followers(&self, user_id: i64) -> Result<Option<Value>> {
        self.call(methods::USERS_GET_FOLLOWERS, &list_params(user_id))
            .await
    }

    /// Fetch the users `user_id` subscribes to
    async fn get_subscriptions(&self, user_id: i64) -> Result<Option<Value>> {
        self.call(methods::USERS_GET_SUBSCRIPTIONS, &list_params(user_id))
            .await
    }

    /// Fetch the groups `user_id` is a member of
    async fn get_groups(&self, user_id: i64) -> Result<Option<Value>> {
        self.call(methods::GROUPS_GET, &list_params(user_id)).await
    }
}

fn list_params(user_id: i64) -> [(&'static str, String); 3] {
    [
        ("user_id", user_id.to_string()),
        ("extended", "1".to_string()),
        ("fields", LIST_FIELDS.to_string()),
    ]
}
