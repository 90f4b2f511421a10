//! Post-crawl graph analytics
//!
//! A fixed battery of read-only queries run once the crawl has finished.

use crate::neo4j::models::*;
use crate::neo4j::GraphStore;
use anyhow::{Context, Result};
use serde::Serialize;

/// How many entries the ranking queries return
pub const TOP_N: i64 = 5;

/// Results of every analytics query
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    pub persons: Vec<PersonNode>,
    pub groups: Vec<GroupNode>,
    pub top_followed: Vec<FollowerRank>,
    pub top_groups: Vec<GroupRank>,
    pub mutual_followers: Vec<PersonPair>,
    pub common_subscriptions: Vec<CommonSubscription>,
    pub inactive_persons: Vec<PersonNode>,
    pub mutual_followers_with_common_groups: Vec<MutualWithGroups>,
}

impl AnalyticsReport {
    /// Run all queries against the store.
    pub async fn collect(graph: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            persons: graph.list_persons().await.context("Listing users")?,
            groups: graph.list_groups().await.context("Listing groups")?,
            top_followed: graph
                .top_followed(TOP_N)
                .await
                .context("Ranking users by followers")?,
            top_groups: graph
                .top_groups(TOP_N)
                .await
                .context("Ranking groups by subscribers")?,
            mutual_followers: graph
                .mutual_followers()
                .await
                .context("Finding mutual followers")?,
            common_subscriptions: graph
                .common_group_subscriptions()
                .await
                .context("Finding common subscriptions")?,
            inactive_persons: graph
                .inactive_persons()
                .await
                .context("Finding inactive users")?,
            mutual_followers_with_common_groups: graph
                .mutual_followers_with_common_groups()
                .await
                .context("Finding mutual followers with common groups")?,
        })
    }

    /// Log the report: totals and rankings at info, full listings at debug.
    pub fn log(&self) {
        tracing::info!("Total users: {}", self.persons.len());
        tracing::info!("Total groups: {}", self.groups.len());
        tracing::debug!("Users: {:?}", self.persons);
        tracing::debug!("Groups: {:?}", self.groups);

        tracing::info!("Top {} users by followers:", TOP_N);
        for rank in &self.top_followed {
            tracing::info!("  {} ({}): {} followers", rank.name, rank.id, rank.followers);
        }

        tracing::info!("Top {} groups by subscribers:", TOP_N);
        for rank in &self.top_groups {
            tracing::info!("  {} ({}): {} subscribers", rank.name, rank.id, rank.subscribers);
        }

        tracing::info!("Mutual followers: {}", self.mutual_followers.len());
        for pair in &self.mutual_followers {
            tracing::info!("  {}", describe_pair(pair));
        }

        tracing::info!("Common group subscriptions: {}", self.common_subscriptions.len());
        for common in &self.common_subscriptions {
            tracing::info!(
                "  {} via {} ({})",
                describe_pair(&common.pair),
                common.group_name,
                common.group_id
            );
        }

        tracing::info!("Inactive users: {}", self.inactive_persons.len());
        for person in &self.inactive_persons {
            tracing::info!("  {} ({})", person.name, person.id);
        }

        tracing::info!(
            "Mutual followers sharing a group: {}",
            self.mutual_followers_with_common_groups.len()
        );
        for mutual in &self.mutual_followers_with_common_groups {
            tracing::info!(
                "  {} share groups {:?}",
                describe_pair(&mutual.pair),
                mutual.group_ids
            );
        }
    }
}

fn describe_pair(pair: &PersonPair) -> String {
    format!(
        "{} ({}) <-> {} ({})",
        pair.user1_name, pair.user1_id, pair.user2_name, pair.user2_id
    )
}
