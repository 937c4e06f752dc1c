//! Typed responses produced by the dispatch core.

use serde::{Deserialize, Serialize};

use crate::api::ApiKey;
use crate::api_versions_types::ApiVersionsResponse;
use crate::metadata_types::MetadataResponse;

/// Response header echoed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub correlation_id: i32,
}

/// Payload of a completed answer, one variant per supported command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponsePayload {
    ApiVersions(ApiVersionsResponse),
    Metadata(MetadataResponse),
}

/// A completed answer, ready for the byte-level encoder.
///
/// Carries the originating api key and version so the encoder can pick the
/// right wire layout; both must match the request header that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub header: ResponseHeader,
    pub api_key: ApiKey,
    pub api_version: i16,
    pub payload: ResponsePayload,
}
