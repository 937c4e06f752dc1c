//! ApiVersions API types

use serde::{Deserialize, Serialize};

/// ApiVersions request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionsRequest {
    /// Client software name (v3+)
    pub client_software_name: Option<String>,
    /// Client software version (v3+)
    pub client_software_version: Option<String>,
}

/// Version range advertised for one API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionKey {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

/// ApiVersions response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionsResponse {
    /// Error code
    pub error_code: i16,
    /// Supported APIs, ordered by api key
    pub api_keys: Vec<ApiVersionKey>,
    /// Throttle time in milliseconds
    pub throttle_time_ms: i32,
}
