//! Typed Kafka-protocol models for the Prism dispatch core.
//!
//! The byte-level parser and encoder live outside this workspace; the types
//! here are the contract between them and the dispatcher. The parser hands the
//! core a [`ParsedRequest`] (or a [`RequestParseFailure`]), and the core hands
//! the encoder a [`Response`].

pub mod api;
pub mod api_versions_types;
pub mod list_offsets_types;
pub mod metadata_types;
pub mod request;
pub mod response;

pub use api::{supported_api_versions, ApiKey, VersionRange};
pub use request::{ParsedRequest, Request, RequestHeader, RequestParseFailure};
pub use response::{Response, ResponseHeader, ResponsePayload};
