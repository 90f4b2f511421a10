//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    // ========================================================================
    // Maintenance
    // ========================================================================

    async fn clear_all(&self) -> anyhow::Result<()> {
        self.clear_all().await
    }

    async fn counts(&self) -> anyhow::Result<GraphCounts> {
        self.counts().await
    }

    // ========================================================================
    // Writes
    // ========================================================================

    async fn upsert_person(&self, person: &PersonNode) -> anyhow::Result<PersonRef> {
        self.upsert_person(person).await
    }

    async fn upsert_group(&self, group: &GroupNode) -> anyhow::Result<GroupRef> {
        self.upsert_group(group).await
    }

    async fn upsert_follow(&self, from: PersonRef, to: PersonRef) -> anyhow::Result<()> {
        self.upsert_follow(from, to).await
    }

    async fn upsert_subscribe(
        &self,
        from: PersonRef,
        to: SubscriptionTarget,
    ) -> anyhow::Result<()> {
        self.upsert_subscribe(from, to).await
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    async fn list_persons(&self) -> anyhow::Result<Vec<PersonNode>> {
        self.list_persons().await
    }

    async fn list_groups(&self) -> anyhow::Result<Vec<GroupNode>> {
        self.list_groups().await
    }

    async fn top_followed(&self, limit: i64) -> anyhow::Result<Vec<FollowerRank>> {
        self.top_followed(limit).await
    }

    async fn top_groups(&self, limit: i64) -> anyhow::Result<Vec<GroupRank>> {
        self.top_groups(limit).await
    }

    async fn mutual_followers(&self) -> anyhow::Result<Vec<PersonPair>> {
        self.mutual_followers().await
    }

    async fn common_group_subscriptions(&self) -> anyhow::Result<Vec<CommonSubscription>> {
        self.common_group_subscriptions().await
    }

    async fn inactive_persons(&self) -> anyhow::Result<Vec<PersonNode>> {
        self.inactive_persons().await
    }

    async fn mutual_followers_with_common_groups(
        &self,
    ) -> anyhow::Result<Vec<MutualWithGroups>> {
        self.mutual_followers_with_common_groups().await
    }
}
