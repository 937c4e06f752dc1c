//! Upstream routing configuration.
//!
//! Maps topic names to the backing cluster that owns them and exposes the
//! address this proxy advertises as its own broker identity. Handlers consult
//! this per request and never cache the results.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use prism_common::{Error, Result};

/// Configuration of one backing cluster.
///
/// Opaque to the dispatch core: handlers pass it through to the upstream
/// connection machinery without interpreting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster name, referenced by forwarding rules
    pub name: String,
    /// Bootstrap servers of the real cluster
    pub bootstrap_servers: String,
    /// Partition count advertised for topics this cluster owns
    pub partition_count: i32,
    /// Topics this cluster declares it hosts
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Routes topics whose name starts with `topic_prefix` to `cluster`.
/// First matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingRule {
    pub topic_prefix: String,
    pub cluster: String,
}

/// Static configuration of the whole mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Host this proxy advertises to clients
    pub advertised_host: String,
    /// Port this proxy advertises to clients
    pub advertised_port: i32,
    /// Backing clusters
    pub clusters: Vec<ClusterConfig>,
    /// Prefix routing rules, evaluated in order
    #[serde(default)]
    pub forwarding_rules: Vec<ForwardingRule>,
}

impl MeshConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: MeshConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the router could not apply deterministically:
    /// duplicate cluster names and rules referencing undeclared clusters.
    pub fn validate(&self) -> Result<()> {
        if self.clusters.is_empty() {
            return Err(Error::Configuration(
                "at least one cluster must be configured".into(),
            ));
        }

        let mut names = HashSet::new();
        for cluster in &self.clusters {
            if !names.insert(cluster.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate cluster name: {}",
                    cluster.name
                )));
            }
        }

        for rule in &self.forwarding_rules {
            if !names.contains(rule.cluster.as_str()) {
                return Err(Error::Configuration(format!(
                    "forwarding rule for prefix '{}' references unknown cluster: {}",
                    rule.topic_prefix, rule.cluster
                )));
            }
        }

        Ok(())
    }
}

/// Read-only topic-to-cluster routing consulted by command handlers.
///
/// Implementations must be safe to query concurrently from multiple in-flight
/// requests; all operations are side-effect-free.
pub trait RoutingConfiguration: Send + Sync {
    /// Cluster that owns the given topic, if any.
    fn cluster_config_for_topic(&self, topic: &str) -> Option<ClusterConfig>;

    /// Host and port this proxy advertises as its own identity.
    fn advertised_address(&self) -> (String, i32);

    /// Topics explicitly declared by the configured clusters, in declaration
    /// order. Feeds metadata requests that omit a topic list.
    fn known_topics(&self) -> Vec<String>;
}

/// Routing backed by a static [`MeshConfig`].
pub struct StaticRoutingConfiguration {
    config: MeshConfig,
}

impl StaticRoutingConfiguration {
    pub fn new(config: MeshConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn cluster_by_name(&self, name: &str) -> Option<&ClusterConfig> {
        self.config.clusters.iter().find(|c| c.name == name)
    }
}

impl RoutingConfiguration for StaticRoutingConfiguration {
    /// Declared topics take precedence over prefix rules; among prefix rules
    /// the first match wins.
    fn cluster_config_for_topic(&self, topic: &str) -> Option<ClusterConfig> {
        if let Some(cluster) = self
            .config
            .clusters
            .iter()
            .find(|c| c.topics.iter().any(|t| t == topic))
        {
            return Some(cluster.clone());
        }

        self.config
            .forwarding_rules
            .iter()
            .find(|rule| topic.starts_with(&rule.topic_prefix))
            .and_then(|rule| self.cluster_by_name(&rule.cluster))
            .cloned()
    }

    fn advertised_address(&self) -> (String, i32) {
        (
            self.config.advertised_host.clone(),
            self.config.advertised_port,
        )
    }

    fn known_topics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut topics = Vec::new();
        for cluster in &self.config.clusters {
            for topic in &cluster.topics {
                if seen.insert(topic.as_str()) {
                    topics.push(topic.clone());
                }
            }
        }
        topics
    }
}
