//! Typed request envelope handed to the dispatch core by the byte parser.

use serde::{Deserialize, Serialize};

use crate::api::ApiKey;
use crate::api_versions_types::ApiVersionsRequest;
use crate::list_offsets_types::ListOffsetsRequest;
use crate::metadata_types::MetadataRequest;

/// Kafka request header. Immutable once parsed; the correlation id is opaque
/// and is echoed verbatim in the eventual response.
///
/// `api_key` stays a raw i16 here because parse failures carry headers whose
/// key the protocol layer does not recognize at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

/// One parsed request: header plus command payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<T> {
    pub header: RequestHeader,
    pub payload: T,
}

/// A request whose header was decoded but whose payload was not decodable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParseFailure {
    pub header: RequestHeader,
}

/// Every request shape the byte parser can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedRequest {
    ApiVersions(Request<ApiVersionsRequest>),
    ListOffsets(Request<ListOffsetsRequest>),
    Metadata(Request<MetadataRequest>),
}

impl ParsedRequest {
    pub fn header(&self) -> &RequestHeader {
        match self {
            ParsedRequest::ApiVersions(request) => &request.header,
            ParsedRequest::ListOffsets(request) => &request.header,
            ParsedRequest::Metadata(request) => &request.header,
        }
    }

    /// Canonical api key of the carried command, derived from the variant
    /// rather than the (client-supplied) header.
    pub fn api_key(&self) -> ApiKey {
        match self {
            ParsedRequest::ApiVersions(_) => ApiKey::ApiVersions,
            ParsedRequest::ListOffsets(_) => ApiKey::ListOffsets,
            ParsedRequest::Metadata(_) => ApiKey::Metadata,
        }
    }
}
