//! GraphStore trait definition
//!
//! Defines the abstract interface for all Neo4j graph operations.
//! This trait mirrors the public async methods of `Neo4jClient`,
//! enabling testing with mock implementations.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for all graph database operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Detach and delete every node and relationship
    async fn clear_all(&self) -> Result<()>;

    /// Node and relationship totals
    async fn counts(&self) -> Result<GraphCounts>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create or update a user node keyed by id
    async fn upsert_person(&self, person: &PersonNode) -> Result<PersonRef>;

    /// Create or update a group node keyed by id
    async fn upsert_group(&self, group: &GroupNode) -> Result<GroupRef>;

    /// Merge a `Follow` relationship (`from` follows `to`)
    async fn upsert_follow(&self, from: PersonRef, to: PersonRef) -> Result<()>;

    /// Merge a `Subscribe` relationship to a user or a group
    async fn upsert_subscribe(&self, from: PersonRef, to: SubscriptionTarget) -> Result<()>;

    // ========================================================================
    // Analytics
    // ========================================================================

    /// All users ordered by id
    async fn list_persons(&self) -> Result<Vec<PersonNode>>;

    /// All groups ordered by id
    async fn list_groups(&self) -> Result<Vec<GroupNode>>;

    /// Users with the most followers (count desc, id asc)
    async fn top_followed(&self, limit: i64) -> Result<Vec<FollowerRank>>;

    /// Groups with the most subscribers (count desc, id asc)
    async fn top_groups(&self, limit: i64) -> Result<Vec<GroupRank>>;

    /// Pairs of users following each other
    async fn mutual_followers(&self) -> Result<Vec<PersonPair>>;

    /// Pairs of users subscribed to the same group, one row per group
    async fn common_group_subscriptions(&self) -> Result<Vec<CommonSubscription>>;

    /// Users without outgoing `Follow` and `Subscribe`
    async fn inactive_persons(&self) -> Result<Vec<PersonNode>>;

    /// Mutual followers sharing at least one group
    async fn mutual_followers_with_common_groups(&self) -> Result<Vec<MutualWithGroups>>;
}
