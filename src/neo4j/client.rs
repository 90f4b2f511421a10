//! Neo4j client for the crawled social graph

use super::models::*;
use anyhow::{Context, Result};
use neo4rs::{query, Graph, Query, Row};
use std::sync::Arc;

const MERGE_FOLLOW: &str = r#"
    MATCH (a:User {id: $from})
    MATCH (b:User {id: $to})
    MERGE (a)-[:Follow]->(b)
"#;

const MERGE_SUBSCRIBE_USER: &str = r#"
    MATCH (a:User {id: $from})
    MATCH (b:User {id: $to})
    MERGE (a)-[:Subscribe]->(b)
"#;

const MERGE_SUBSCRIBE_GROUP: &str = r#"
    MATCH (a:User {id: $from})
    MATCH (b:Group {id: $to})
    MERGE (a)-[:Subscribe]->(b)
"#;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Create the uniqueness constraints backing merge-by-id
    async fn init_schema(&self) -> Result<()> {
        let constraints = [
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT group_id IF NOT EXISTS FOR (g:Group) REQUIRE g.id IS UNIQUE",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Execute a parameterized Cypher query and collect every row
    async fn execute_with_params(&self, q: Query) -> Result<Vec<Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Delete every node and relationship in the database
    pub async fn clear_all(&self) -> Result<()> {
        self.graph
            .run(query("MATCH (n) DETACH DELETE n"))
            .await
            .context("Failed to clear the graph")?;
        tracing::info!("Graph cleared");
        Ok(())
    }

    /// Count nodes and relationships
    pub async fn counts(&self) -> Result<GraphCounts> {
        let q = query(
            r#"
            CALL { MATCH (u:User) RETURN count(u) AS persons }
            CALL { MATCH (g:Group) RETURN count(g) AS groups }
            CALL { MATCH (:User)-[f:Follow]->(:User) RETURN count(f) AS follows }
            CALL { MATCH (:User)-[s:Subscribe]->() RETURN count(s) AS subscriptions }
            RETURN persons, groups, follows, subscriptions
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        let Some(row) = rows.first() else {
            return Ok(GraphCounts::default());
        };

        Ok(GraphCounts {
            persons: row.get("persons")?,
            groups: row.get("groups")?,
            follows: row.get("follows")?,
            subscriptions: row.get("subscriptions")?,
        })
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create or update a user node
    pub async fn upsert_person(&self, person: &PersonNode) -> Result<PersonRef> {
        let q = query(
            r#"
            MERGE (u:User {id: $id})
            SET u.screen_name = $screen_name,
                u.name = $name,
                u.city = $city
            "#,
        )
        .param("id", person.id)
        .param("screen_name", person.screen_name.clone())
        .param("name", person.name.clone())
        .param("city", person.city.clone());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to upsert user {}", person.id))?;
        Ok(PersonRef(person.id))
    }

    /// Create or update a group node
    pub async fn upsert_group(&self, group: &GroupNode) -> Result<GroupRef> {
        let q = query(
            r#"
            MERGE (g:Group {id: $id})
            SET g.screen_name = $screen_name,
                g.name = $name
            "#,
        )
        .param("id", group.id)
        .param("screen_name", group.screen_name.clone())
        .param("name", group.name.clone());

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to upsert group {}", group.id))?;
        Ok(GroupRef(group.id))
    }

    /// Merge a Follow relationship between two users
    pub async fn upsert_follow(&self, from: PersonRef, to: PersonRef) -> Result<()> {
        let q = query(MERGE_FOLLOW).param("from", from.0).param("to", to.0);

        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to link {} Follow {}", from.0, to.0))?;
        Ok(())
    }

    /// Merge a Subscribe relationship to a user or a group
    pub async fn upsert_subscribe(&self, from: PersonRef, to: SubscriptionTarget) -> Result<()> {
        let (cypher, to_id) = match to {
            SubscriptionTarget::Person(PersonRef(id)) => (MERGE_SUBSCRIBE_USER, id),
            SubscriptionTarget::Group(GroupRef(id)) => (MERGE_SUBSCRIBE_GROUP, id),
        };

        let q = query(cypher).param("from", from.0).param("to", to_id);
        self.graph
            .run(q)
            .await
            .with_context(|| format!("Failed to link {} Subscribe {}", from.0, to_id))?;
        Ok(())
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    /// List every user ordered by id
    pub async fn list_persons(&self) -> Result<Vec<PersonNode>> {
        let q = query(
            r#"
            MATCH (u:User)
            RETURN u.id AS id, u.screen_name AS screen_name, u.name AS name, u.city AS city
            ORDER BY id
            "#,
        );

        self.execute_with_params(q)
            .await?
            .iter()
            .map(row_to_person)
            .collect()
    }

    /// List every group ordered by id
    pub async fn list_groups(&self) -> Result<Vec<GroupNode>> {
        let q = query(
            r#"
            MATCH (g:Group)
            RETURN g.id AS id, g.screen_name AS screen_name, g.name AS name
            ORDER BY id
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            groups.push(GroupNode {
                id: row.get("id")?,
                screen_name: row.get::<String>("screen_name").unwrap_or_default(),
                name: row.get::<String>("name").unwrap_or_default(),
            });
        }
        Ok(groups)
    }

    /// Users ranked by inbound Follow
    pub async fn top_followed(&self, limit: i64) -> Result<Vec<FollowerRank>> {
        let q = query(
            r#"
            MATCH (:User)-[r:Follow]->(u:User)
            RETURN u.id AS id, u.name AS name, count(r) AS followers
            ORDER BY followers DESC, id ASC
            LIMIT $limit
            "#,
        )
        .param("limit", limit);

        let rows = self.execute_with_params(q).await?;
        let mut ranks = Vec::with_capacity(rows.len());
        for row in rows {
            ranks.push(FollowerRank {
                id: row.get("id")?,
                name: row.get::<String>("name").unwrap_or_default(),
                followers: row.get("followers")?,
            });
        }
        Ok(ranks)
    }

    /// Groups ranked by inbound Subscribe
    pub async fn top_groups(&self, limit: i64) -> Result<Vec<GroupRank>> {
        let q = query(
            r#"
            MATCH (:User)-[r:Subscribe]->(g:Group)
            RETURN g.id AS id, g.name AS name, count(r) AS subscribers
            ORDER BY subscribers DESC, id ASC
            LIMIT $limit
            "#,
        )
        .param("limit", limit);

        let rows = self.execute_with_params(q).await?;
        let mut ranks = Vec::with_capacity(rows.len());
        for row in rows {
            ranks.push(GroupRank {
                id: row.get("id")?,
                name: row.get::<String>("name").unwrap_or_default(),
                subscribers: row.get("subscribers")?,
            });
        }
        Ok(ranks)
    }

    /// Users following each other, each pair once
    pub async fn mutual_followers(&self) -> Result<Vec<PersonPair>> {
        let q = query(
            r#"
            MATCH (a:User)-[:Follow]->(b:User)-[:Follow]->(a)
            WHERE a.id < b.id
            RETURN a.id AS user1_id, a.name AS user1_name,
                   b.id AS user2_id, b.name AS user2_name
            ORDER BY user1_id, user2_id
            "#,
        );

        self.execute_with_params(q)
            .await?
            .iter()
            .map(row_to_pair)
            .collect()
    }

    /// Pairs of users subscribed to the same group
    pub async fn common_group_subscriptions(&self) -> Result<Vec<CommonSubscription>> {
        let q = query(
            r#"
            MATCH (a:User)-[:Subscribe]->(g:Group)<-[:Subscribe]-(b:User)
            WHERE a.id < b.id
            RETURN a.id AS user1_id, a.name AS user1_name,
                   b.id AS user2_id, b.name AS user2_name,
                   g.id AS group_id, g.name AS group_name
            ORDER BY user1_id, user2_id, group_id
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(CommonSubscription {
                pair: row_to_pair(&row)?,
                group_id: row.get("group_id")?,
                group_name: row.get::<String>("group_name").unwrap_or_default(),
            });
        }
        Ok(result)
    }

    /// Users that neither follow nor subscribe to anything
    pub async fn inactive_persons(&self) -> Result<Vec<PersonNode>> {
        let q = query(
            r#"
            MATCH (u:User)
            WHERE NOT EXISTS { (u)-[:Follow]->() }
              AND NOT EXISTS { (u)-[:Subscribe]->() }
            RETURN u.id AS id, u.screen_name AS screen_name, u.name AS name, u.city AS city
            ORDER BY id
            "#,
        );

        self.execute_with_params(q)
            .await?
            .iter()
            .map(row_to_person)
            .collect()
    }

    /// Mutual followers that share at least one group
    pub async fn mutual_followers_with_common_groups(&self) -> Result<Vec<MutualWithGroups>> {
        let q = query(
            r#"
            MATCH (a:User)-[:Follow]->(b:User)-[:Follow]->(a)
            WHERE a.id < b.id
            MATCH (a)-[:Subscribe]->(g:Group)<-[:Subscribe]-(b)
            WITH a, b, g
            ORDER BY g.id
            WITH a, b, collect(DISTINCT g.id) AS group_ids
            RETURN a.id AS user1_id, a.name AS user1_name,
                   b.id AS user2_id, b.name AS user2_name,
                   group_ids
            ORDER BY user1_id, user2_id
            "#,
        );

        let rows = self.execute_with_params(q).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(MutualWithGroups {
                pair: row_to_pair(&row)?,
                group_ids: row.get("group_ids")?,
            });
        }
        Ok(result)
    }
}

fn row_to_person(row: &Row) -> Result<PersonNode> {
    Ok(PersonNode {
        id: row.get("id")?,
        screen_name: row.get::<String>("screen_name").unwrap_or_default(),
        name: row.get::<String>("name").unwrap_or_default(),
        city: row.get::<String>("city").unwrap_or_default(),
    })
}

fn row_to_pair(row: &Row) -> Result<PersonPair> {
    Ok(PersonPair {
        user1_id: row.get("user1_id")?,
        user1_name: row.get::<String>("user1_name").unwrap_or_default(),
        user2_id: row.get("user2_id")?,
        user2_name: row.get::<String>("user2_name").unwrap_or_default(),
    })
}
