//! Request dispatch core of the Prism mesh proxy.
//!
//! Prism impersonates a single Kafka-style broker toward client connections
//! while fanning work out to real backing clusters chosen per topic. This
//! crate is the in-process core of that proxy: it consumes already-parsed
//! requests, routes each to the command handler registered for its api key,
//! tracks the resulting unit of work through its lifecycle, and flushes
//! completed answers back to the connection in arrival order.
//!
//! Byte parsing, response encoding and connection management are external
//! collaborators; nothing in this crate performs I/O on the Kafka wire.

pub mod command_handlers;
pub mod error;
pub mod in_flight;
pub mod request_processor;
pub mod response_queue;
pub mod upstream;

pub use error::DispatchError;
pub use in_flight::{InFlightRequest, RequestLifecycle, RequestListener, RequestState};
pub use request_processor::{HandlerFactory, RequestProcessor};
pub use response_queue::{ChannelResponseSink, OrderedResponseQueue, ResponseSink};
pub use upstream::{
    ClusterConfig, ForwardingRule, MeshConfig, RoutingConfiguration, StaticRoutingConfiguration,
};
