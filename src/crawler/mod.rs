//! Bounded-depth crawl from a seed user into the graph store
//!
//! Traversal is depth-first: for each user the profile is written, then every
//! follower is written and fully explored, then every subscription, and
//! finally the user's groups are attached as leaves. The walk runs on an
//! explicit stack of frames so deep chains never grow the call stack.

use crate::neo4j::models::{PersonNode, PersonRef, SubscriptionTarget};
use crate::neo4j::GraphStore;
use crate::vk::{decode_items, decode_profile, GroupRecord, SocialApi, UserRecord};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Default number of hops explored from the seed
pub const DEFAULT_DEPTH: i32 = 2;

/// Crawl behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Skip users already explored with at least the same remaining depth
    pub dedupe: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self { dedupe: true }
    }
}

/// Counters collected during a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub persons_visited: u64,
    pub persons_skipped: u64,
    pub profiles_failed: u64,
    pub follows_written: u64,
    pub subscriptions_written: u64,
    pub memberships_written: u64,
    pub api_calls: u64,
}

/// Which user list a frame is walking
#[derive(Debug, Clone, Copy)]
enum UserList {
    Followers,
    Subscriptions,
}

/// Where a user's exploration currently stands
enum Phase {
    Followers(VecDeque<UserRecord>),
    Subscriptions(VecDeque<UserRecord>),
    Groups,
}

struct Frame {
    person: PersonRef,
    depth: i32,
    phase: Phase,
}

/// Mutable state of a single crawl
#[derive(Default)]
struct Walk {
    stats: CrawlStats,
    /// Deepest remaining depth each user has been explored with
    explored: HashMap<i64, i32>,
    /// Last profile written per user, re-applied when a revisit is skipped
    profiles: HashMap<i64, PersonNode>,
}

pub struct Crawler {
    api: Arc<dyn SocialApi>,
    graph: Arc<dyn GraphStore>,
    options: CrawlOptions,
}

impl Crawler {
    pub fn new(api: Arc<dyn SocialApi>, graph: Arc<dyn GraphStore>, options: CrawlOptions) -> Self {
        Self {
            api,
            graph,
            options,
        }
    }

    /// Crawl from `person_id` with `depth` hops remaining.
    ///
    /// API failures only prune the affected user or list; store failures abort
    /// the crawl.
    pub async fn visit(&self, person_id: i64, depth: i32) -> Result<CrawlStats> {
        let mut walk = Walk::default();
        let mut stack: Vec<Frame> = Vec::new();

        if let Some(frame) = self.enter(person_id, depth, &mut walk).await? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let mut finished = false;

            let descend = match &mut frame.phase {
                Phase::Followers(items) => match items.pop_front() {
                    Some(follower) => {
                        let child = self.graph.upsert_person(&follower.to_person()).await?;
                        self.graph.upsert_follow(child, frame.person).await?;
                        walk.stats.follows_written += 1;
                        Some((child, frame.depth - 1))
                    }
                    None => {
                        let items = self
                            .fetch_users(frame.person.0, UserList::Subscriptions, &mut walk)
                            .await;
                        frame.phase = Phase::Subscriptions(items);
                        None
                    }
                },
                Phase::Subscriptions(items) => match items.pop_front() {
                    Some(subscription) => {
                        let target = self
                            .graph
                            .upsert_person(&subscription.to_person())
                            .await?;
                        self.graph
                            .upsert_subscribe(frame.person, target.into())
                            .await?;
                        walk.stats.subscriptions_written += 1;
                        Some((target, frame.depth - 1))
                    }
                    None => {
                        frame.phase = Phase::Groups;
                        None
                    }
                },
                Phase::Groups => {
                    self.attach_groups(frame.person, &mut walk).await?;
                    finished = true;
                    None
                }
            };

            if finished {
                stack.pop();
            } else if let Some((child, child_depth)) = descend {
                if let Some(next) = self.enter(child.0, child_depth, &mut walk).await? {
                    stack.push(next);
                }
            }
        }

        tracing::debug!(user_id = person_id, depth, stats = ?walk.stats, "Crawl finished");
        Ok(walk.stats)
    }

    /// Start exploring a user: fetch and store the profile, then load followers.
    ///
    /// Returns `None` when there is nothing to explore: depth exhausted, user
    /// already explored deep enough, or the profile is unavailable.
    async fn enter(&self, person_id: i64, depth: i32, walk: &mut Walk) -> Result<Option<Frame>> {
        if depth <= 0 {
            return Ok(None);
        }

        if self.options.dedupe {
            if let Some(&seen) = walk.explored.get(&person_id) {
                if seen >= depth {
                    tracing::debug!(user_id = person_id, depth, seen, "Already explored, skipping");
                    walk.stats.persons_skipped += 1;
                    // a list entry may just have overwritten profile-only fields
                    if let Some(profile) = walk.profiles.get(&person_id) {
                        self.graph.upsert_person(profile).await?;
                    }
                    return Ok(None);
                }
            }
            walk.explored.insert(person_id, depth);
        }

        walk.stats.api_calls += 1;
        let profile = match self.api.get_user_info(person_id).await {
            Ok(Some(payload)) => decode_profile(&payload),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(user_id = person_id, "Profile request failed: {}", e);
                None
            }
        };

        let Some(user) = profile else {
            tracing::error!(user_id = person_id, "Failed to fetch user profile");
            walk.stats.profiles_failed += 1;
            return Ok(None);
        };

        let node = user.to_person();
        let person = self.graph.upsert_person(&node).await?;
        walk.stats.persons_visited += 1;
        if self.options.dedupe {
            walk.profiles.insert(node.id, node);
        }
        tracing::debug!(user_id = person.0, depth, "Exploring user");

        let followers = self
            .fetch_users(person.0, UserList::Followers, walk)
            .await;

        Ok(Some(Frame {
            person,
            depth,
            phase: Phase::Followers(followers),
        }))
    }

    /// Fetch and store a user's groups
    async fn attach_groups(&self, person: PersonRef, walk: &mut Walk) -> Result<()> {
        walk.stats.api_calls += 1;
        let payload = self.api.get_groups(person.0).await;
        let groups: Vec<GroupRecord> = decode_list(person.0, "groups", payload);

        for record in groups {
            let group = self.graph.upsert_group(&record.to_group()).await?;
            self.graph
                .upsert_subscribe(person, SubscriptionTarget::Group(group))
                .await?;
            walk.stats.memberships_written += 1;
        }
        Ok(())
    }

    async fn fetch_users(
        &self,
        person_id: i64,
        list: UserList,
        walk: &mut Walk,
    ) -> VecDeque<UserRecord> {
        walk.stats.api_calls += 1;
        let (label, payload) = match list {
            UserList::Followers => ("followers", self.api.get_followers(person_id).await),
            UserList::Subscriptions => {
                ("subscriptions", self.api.get_subscriptions(person_id).await)
            }
        };
        decode_list::<UserRecord>(person_id, label, payload).into()
    }
}

/// Turn a list response into records, treating every failure as an empty list.
fn decode_list<T: serde::de::DeserializeOwned>(
    person_id: i64,
    label: &str,
    payload: crate::vk::error::Result<Option<Value>>,
) -> Vec<T> {
    match payload {
        Ok(Some(payload)) => decode_items(&payload),
        Ok(None) => {
            tracing::debug!(user_id = person_id, "No {} available", label);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(user_id = person_id, "Failed to fetch {}: {}", label, e);
            Vec::new()
        }
    }
}
