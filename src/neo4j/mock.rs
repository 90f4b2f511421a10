//! In-memory mock implementation of GraphStore for testing.
//!
//! Mirrors the MERGE semantics of the Cypher client: nodes are keyed by id,
//! relationships are sets of `(from, to)` pairs and are only created when
//! both endpoints exist. Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub persons: RwLock<BTreeMap<i64, PersonNode>>,
    pub groups: RwLock<BTreeMap<i64, GroupNode>>,

    // Relationships as (from, to) sets
    pub follows: RwLock<BTreeSet<(i64, i64)>>,
    pub person_subscriptions: RwLock<BTreeSet<(i64, i64)>>,
    pub group_subscriptions: RwLock<BTreeSet<(i64, i64)>>,

    /// Number of upsert calls per person id, to observe repeated writes
    pub person_writes: RwLock<HashMap<i64, usize>>,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            persons: RwLock::new(BTreeMap::new()),
            groups: RwLock::new(BTreeMap::new()),
            follows: RwLock::new(BTreeSet::new()),
            person_subscriptions: RwLock::new(BTreeSet::new()),
            group_subscriptions: RwLock::new(BTreeSet::new()),
            person_writes: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a user node.
    pub async fn with_person(self, person: PersonNode) -> Self {
        self.persons.write().await.insert(person.id, person);
        self
    }

    /// Seed a group node.
    pub async fn with_group(self, group: GroupNode) -> Self {
        self.groups.write().await.insert(group.id, group);
        self
    }

    /// Seed a Follow relationship (endpoints must already be seeded).
    pub async fn with_follow(self, from: i64, to: i64) -> Self {
        self.follows.write().await.insert((from, to));
        self
    }

    /// Seed a Subscribe relationship to a group.
    pub async fn with_group_subscription(self, from: i64, group: i64) -> Self {
        self.group_subscriptions.write().await.insert((from, group));
        self
    }

    /// Snapshot of every relationship as (kind, from, to), for whole-graph comparisons.
    pub async fn edge_snapshot(&self) -> Vec<(&'static str, i64, i64)> {
        let mut edges = Vec::new();
        for (from, to) in self.follows.read().await.iter() {
            edges.push(("Follow", *from, *to));
        }
        for (from, to) in self.person_subscriptions.read().await.iter() {
            edges.push(("SubscribeUser", *from, *to));
        }
        for (from, to) in self.group_subscriptions.read().await.iter() {
            edges.push(("SubscribeGroup", *from, *to));
        }
        edges
    }

    async fn name_of(&self, id: i64) -> String {
        self.persons
            .read()
            .await
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    async fn pair(&self, a: i64, b: i64) -> PersonPair {
        PersonPair {
            user1_id: a,
            user1_name: self.name_of(a).await,
            user2_id: b,
            user2_name: self.name_of(b).await,
        }
    }

    /// Mutual pairs as (low id, high id), ascending
    async fn mutual_pairs(&self) -> Vec<(i64, i64)> {
        let follows = self.follows.read().await;
        follows
            .iter()
            .filter(|(a, b)| a < b && follows.contains(&(*b, *a)))
            .copied()
            .collect()
    }

    /// Groups each user subscribes to
    async fn memberships(&self) -> BTreeMap<i64, BTreeSet<i64>> {
        let mut by_user: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
        for (user, group) in self.group_subscriptions.read().await.iter() {
            by_user.entry(*user).or_default().insert(*group);
        }
        by_user
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    // ========================================================================
    // Maintenance
    // ========================================================================

    async fn clear_all(&self) -> Result<()> {
        self.persons.write().await.clear();
        self.groups.write().await.clear();
        self.follows.write().await.clear();
        self.person_subscriptions.write().await.clear();
        self.group_subscriptions.write().await.clear();
        Ok(())
    }

    async fn counts(&self) -> Result<GraphCounts> {
        Ok(GraphCounts {
            persons: self.persons.read().await.len() as i64,
            groups: self.groups.read().await.len() as i64,
            follows: self.follows.read().await.len() as i64,
            subscriptions: (self.person_subscriptions.read().await.len()
                + self.group_subscriptions.read().await.len()) as i64,
        })
    }

    // ========================================================================
    // Writes
    // ========================================================================

    async fn upsert_person(&self, person: &PersonNode) -> Result<PersonRef> {
        self.persons.write().await.insert(person.id, person.clone());
        *self.person_writes.write().await.entry(person.id).or_default() += 1;
        Ok(PersonRef(person.id))
    }

    async fn upsert_group(&self, group: &GroupNode) -> Result<GroupRef> {
        self.groups.write().await.insert(group.id, group.clone());
        Ok(GroupRef(group.id))
    }

    async fn upsert_follow(&self, from: PersonRef, to: PersonRef) -> Result<()> {
        let persons = self.persons.read().await;
        if persons.contains_key(&from.0) && persons.contains_key(&to.0) {
            self.follows.write().await.insert((from.0, to.0));
        }
        Ok(())
    }

    async fn upsert_subscribe(&self, from: PersonRef, to: SubscriptionTarget) -> Result<()> {
        if !self.persons.read().await.contains_key(&from.0) {
            return Ok(());
        }
        match to {
            SubscriptionTarget::Person(PersonRef(id)) => {
                if self.persons.read().await.contains_key(&id) {
                    self.person_subscriptions.write().await.insert((from.0, id));
                }
            }
            SubscriptionTarget::Group(GroupRef(id)) => {
                if self.groups.read().await.contains_key(&id) {
                    self.group_subscriptions.write().await.insert((from.0, id));
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    async fn list_persons(&self) -> Result<Vec<PersonNode>> {
        Ok(self.persons.read().await.values().cloned().collect())
    }

    async fn list_groups(&self) -> Result<Vec<GroupNode>> {
        Ok(self.groups.read().await.values().cloned().collect())
    }

    async fn top_followed(&self, limit: i64) -> Result<Vec<FollowerRank>> {
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for (_, to) in self.follows.read().await.iter() {
            *counts.entry(*to).or_default() += 1;
        }

        let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut result = Vec::new();
        for (id, followers) in ranked.into_iter().take(limit.max(0) as usize) {
            result.push(FollowerRank {
                id,
                name: self.name_of(id).await,
                followers,
            });
        }
        Ok(result)
    }

    async fn top_groups(&self, limit: i64) -> Result<Vec<GroupRank>> {
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for (_, group) in self.group_subscriptions.read().await.iter() {
            *counts.entry(*group).or_default() += 1;
        }

        let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let groups = self.groups.read().await;
        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(id, subscribers)| GroupRank {
                id,
                name: groups.get(&id).map(|g| g.name.clone()).unwrap_or_default(),
                subscribers,
            })
            .collect())
    }

    async fn mutual_followers(&self) -> Result<Vec<PersonPair>> {
        let mut result = Vec::new();
        for (a, b) in self.mutual_pairs().await {
            result.push(self.pair(a, b).await);
        }
        Ok(result)
    }

    async fn common_group_subscriptions(&self) -> Result<Vec<CommonSubscription>> {
        let memberships = self.memberships().await;
        let mut rows = Vec::new();
        for (a, groups_a) in &memberships {
            for (b, groups_b) in memberships.range((a + 1)..) {
                for group_id in groups_a.intersection(groups_b) {
                    rows.push((*a, *b, *group_id));
                }
            }
        }

        let mut result = Vec::with_capacity(rows.len());
        for (a, b, group_id) in rows {
            let group_name = self
                .groups
                .read()
                .await
                .get(&group_id)
                .map(|g| g.name.clone())
                .unwrap_or_default();
            result.push(CommonSubscription {
                pair: self.pair(a, b).await,
                group_id,
                group_name,
            });
        }
        Ok(result)
    }

    async fn inactive_persons(&self) -> Result<Vec<PersonNode>> {
        let mut active: BTreeSet<i64> = BTreeSet::new();
        active.extend(self.follows.read().await.iter().map(|(from, _)| *from));
        active.extend(
            self.person_subscriptions
                .read()
                .await
                .iter()
                .map(|(from, _)| *from),
        );
        active.extend(
            self.group_subscriptions
                .read()
                .await
                .iter()
                .map(|(from, _)| *from),
        );

        Ok(self
            .persons
            .read()
            .await
            .values()
            .filter(|p| !active.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn mutual_followers_with_common_groups(&self) -> Result<Vec<MutualWithGroups>> {
        let memberships = self.memberships().await;
        let mut result = Vec::new();
        for (a, b) in self.mutual_pairs().await {
            let (Some(groups_a), Some(groups_b)) = (memberships.get(&a), memberships.get(&b))
            else {
                continue;
            };
            let group_ids: Vec<i64> = groups_a.intersection(groups_b).copied().collect();
            if group_ids.is_empty() {
                continue;
            }
            result.push(MutualWithGroups {
                pair: self.pair(a, b).await,
                group_ids,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{group, person};

    #[tokio::test]
    async fn test_upsert_person_is_idempotent() {
        let store = MockGraphStore::new();
        store.upsert_person(&person(1, "Old Name")).await.unwrap();
        store.upsert_person(&person(1, "New Name")).await.unwrap();

        let persons = store.list_persons().await.unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "New Name");
    }

    #[tokio::test]
    async fn test_edges_require_both_endpoints() {
        let store = MockGraphStore::new().with_person(person(1, "A")).await;
        store
            .upsert_follow(PersonRef(1), PersonRef(2))
            .await
            .unwrap();
        store
            .upsert_subscribe(PersonRef(1), GroupRef(10).into())
            .await
            .unwrap();

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.follows, 0);
        assert_eq!(counts.subscriptions, 0);
    }

    #[tokio::test]
    async fn test_top_followed_breaks_ties_by_id() {
        let store = MockGraphStore::new();
        for id in 1..=4 {
            store.upsert_person(&person(id, "u")).await.unwrap();
        }
        // 3 has two followers, 2 and 4 one each
        store.upsert_follow(PersonRef(1), PersonRef(3)).await.unwrap();
        store.upsert_follow(PersonRef(2), PersonRef(3)).await.unwrap();
        store.upsert_follow(PersonRef(1), PersonRef(4)).await.unwrap();
        store.upsert_follow(PersonRef(1), PersonRef(2)).await.unwrap();

        let top = store.top_followed(5).await.unwrap();
        let ids: Vec<(i64, i64)> = top.iter().map(|r| (r.id, r.followers)).collect();
        assert_eq!(ids, vec![(3, 2), (2, 1), (4, 1)]);

        let top = store.top_followed(1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_common_subscriptions_and_mutual_with_groups() {
        let store = MockGraphStore::new()
            .with_person(person(1, "A"))
            .await
            .with_person(person(2, "B"))
            .await
            .with_person(person(3, "C"))
            .await
            .with_group(group(10, "G"))
            .await
            .with_group(group(11, "H"))
            .await
            .with_follow(1, 2)
            .await
            .with_follow(2, 1)
            .await
            .with_group_subscription(1, 10)
            .await
            .with_group_subscription(2, 10)
            .await
            .with_group_subscription(2, 11)
            .await
            .with_group_subscription(3, 11)
            .await;

        let common = store.common_group_subscriptions().await.unwrap();
        let rows: Vec<(i64, i64, i64)> = common
            .iter()
            .map(|c| (c.pair.user1_id, c.pair.user2_id, c.group_id))
            .collect();
        assert_eq!(rows, vec![(1, 2, 10), (2, 3, 11)]);

        let mutual = store.mutual_followers_with_common_groups().await.unwrap();
        assert_eq!(mutual.len(), 1);
        assert_eq!(mutual[0].pair.user1_id, 1);
        assert_eq!(mutual[0].pair.user2_id, 2);
        assert_eq!(mutual[0].group_ids, vec![10]);

        let inactive = store.inactive_persons().await.unwrap();
        assert!(inactive.is_empty());
    }
}
