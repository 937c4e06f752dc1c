//! ListOffsets API types
//!
//! Modeled so the parser can produce typed ListOffsets requests; this proxy
//! registers no handler for them and rejects them at dispatch.

use serde::{Deserialize, Serialize};

/// One partition queried for offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOffsetsPartition {
    pub partition_index: i32,
    pub timestamp: i64,
}

/// Partitions of one topic queried for offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOffsetsTopic {
    pub name: String,
    pub partitions: Vec<ListOffsetsPartition>,
}

/// ListOffsets request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOffsetsRequest {
    pub replica_id: i32,
    pub topics: Vec<ListOffsetsTopic>,
}
