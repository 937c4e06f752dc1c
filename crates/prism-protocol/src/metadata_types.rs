//! Metadata API types

use serde::{Deserialize, Serialize};

/// Metadata request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRequest {
    /// Topics to fetch metadata for (null for all known topics)
    pub topics: Option<Vec<String>>,
    /// Whether to allow auto topic creation
    pub allow_auto_topic_creation: bool,
}

/// Metadata broker info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBroker {
    /// Node ID
    pub node_id: i32,
    /// Host name or IP
    pub host: String,
    /// Port number
    pub port: i32,
    /// Rack identifier
    pub rack: Option<String>,
}

/// Metadata partition info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPartition {
    /// Error code
    pub error_code: i16,
    /// Partition index
    pub partition_index: i32,
    /// Leader node ID
    pub leader_id: i32,
    /// Replica nodes
    pub replica_nodes: Vec<i32>,
    /// In-sync replica nodes
    pub isr_nodes: Vec<i32>,
}

/// Metadata topic info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTopic {
    /// Error code
    pub error_code: i16,
    /// Topic name
    pub name: String,
    /// Whether topic is internal
    pub is_internal: bool,
    /// Partition metadata
    pub partitions: Vec<MetadataPartition>,
}

/// Metadata response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResponse {
    /// Throttle time in milliseconds
    pub throttle_time_ms: i32,
    /// Broker metadata
    pub brokers: Vec<MetadataBroker>,
    /// Cluster ID
    pub cluster_id: Option<String>,
    /// Controller node ID
    pub controller_id: i32,
    /// Topic metadata
    pub topics: Vec<MetadataTopic>,
}

/// Error codes for Metadata API
pub mod error_codes {
    pub const NONE: i16 = 0;
    pub const UNKNOWN_TOPIC_OR_PARTITION: i16 = 3;
    pub const LEADER_NOT_AVAILABLE: i16 = 5;
    pub const INVALID_TOPIC_EXCEPTION: i16 = 17;
}
