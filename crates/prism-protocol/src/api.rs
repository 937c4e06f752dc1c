//! Api-key registry and supported version ranges.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kafka API keys the byte parser can produce typed requests for.
///
/// Being listed here means the protocol layer understands the command's shape,
/// not that this proxy answers it: the dispatcher rejects any key without a
/// registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum ApiKey {
    ListOffsets = 2,
    Metadata = 3,
    ApiVersions = 18,
}

impl ApiKey {
    /// Try to create an ApiKey from an i16
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            2 => Some(ApiKey::ListOffsets),
            3 => Some(ApiKey::Metadata),
            18 => Some(ApiKey::ApiVersions),
            _ => None,
        }
    }
}

/// Inclusive version range for an API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: i16,
    pub max: i16,
}

impl VersionRange {
    pub fn contains(&self, version: i16) -> bool {
        self.min <= version && version <= self.max
    }
}

/// Version ranges this proxy answers for.
///
/// The capabilities answer and the dispatch table are both derived from this
/// map, so the advertised command set cannot drift from the registered one.
pub fn supported_api_versions() -> HashMap<ApiKey, VersionRange> {
    let mut versions = HashMap::new();

    versions.insert(ApiKey::ApiVersions, VersionRange { min: 0, max: 3 });
    versions.insert(ApiKey::Metadata, VersionRange { min: 0, max: 8 });

    versions
}
