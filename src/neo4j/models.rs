//! Neo4j graph models for crawled users, groups and analytics rows

use serde::{Deserialize, Serialize};

// ============================================================================
// Nodes
// ============================================================================

/// A user of the social network (`:User` node, keyed by `id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonNode {
    pub id: i64,
    pub screen_name: String,
    pub name: String,
    pub city: String,
}

/// A community (`:Group` node, keyed by `id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub id: i64,
    pub screen_name: String,
    pub name: String,
}

// ============================================================================
// Node references
// ============================================================================

/// Reference to an upserted `:User` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonRef(pub i64);

/// Reference to an upserted `:Group` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupRef(pub i64);

/// Target of a `Subscribe` relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionTarget {
    Person(PersonRef),
    Group(GroupRef),
}

impl From<PersonRef> for SubscriptionTarget {
    fn from(person: PersonRef) -> Self {
        SubscriptionTarget::Person(person)
    }
}

impl From<GroupRef> for SubscriptionTarget {
    fn from(group: GroupRef) -> Self {
        SubscriptionTarget::Group(group)
    }
}

// ============================================================================
// Counts and analytics rows
// ============================================================================

/// Node and relationship totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub persons: i64,
    pub groups: i64,
    pub follows: i64,
    /// `Subscribe` relationships to users and groups combined
    pub subscriptions: i64,
}

/// A user ranked by inbound `Follow` count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRank {
    pub id: i64,
    pub name: String,
    pub followers: i64,
}

/// A group ranked by inbound `Subscribe` count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRank {
    pub id: i64,
    pub name: String,
    pub subscribers: i64,
}

/// An unordered pair of users, always with `user1_id < user2_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPair {
    pub user1_id: i64,
    pub user1_name: String,
    pub user2_id: i64,
    pub user2_name: String,
}

/// Two users subscribed to the same group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonSubscription {
    #[serde(flatten)]
    pub pair: PersonPair,
    pub group_id: i64,
    pub group_name: String,
}

/// Mutual followers together with the groups they share (ascending ids)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualWithGroups {
    #[serde(flatten)]
    pub pair: PersonPair,
    pub group_ids: Vec<i64>,
}
