//! Request dispatch.
//!
//! The processor is a pure router: it owns no per-request state, so one
//! instance serves every request of a connection-processing context. Dispatch
//! is a data table from api key to handler factory; supporting a new command
//! is one table entry plus one handler variant, with no change here.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use prism_protocol::api::ApiKey;
use prism_protocol::request::{ParsedRequest, RequestParseFailure};

use crate::command_handlers::{ApiVersionsHandler, MetadataHandler};
use crate::error::DispatchError;
use crate::in_flight::{InFlightRequest, RequestListener};
use crate::upstream::RoutingConfiguration;

/// Builds the in-flight request for one command variant.
pub type HandlerFactory = Box<
    dyn Fn(
            ParsedRequest,
            Arc<dyn RoutingConfiguration>,
            Weak<dyn RequestListener>,
        ) -> Result<Arc<dyn InFlightRequest>, DispatchError>
        + Send
        + Sync,
>;

/// Routes parsed requests to their command handlers.
pub struct RequestProcessor {
    listener: Arc<dyn RequestListener>,
    routing: Arc<dyn RoutingConfiguration>,
    handlers: HashMap<ApiKey, HandlerFactory>,
}

impl RequestProcessor {
    /// Both collaborators outlive the processor: the listener owns response
    /// ordering for the connection, the routing configuration answers topic
    /// lookups for every handler.
    pub fn new(
        listener: Arc<dyn RequestListener>,
        routing: Arc<dyn RoutingConfiguration>,
    ) -> Self {
        Self {
            listener,
            routing,
            handlers: default_handlers(),
        }
    }

    /// Register a handler for one more command. At most one handler per api
    /// key; registering a key again replaces its entry.
    pub fn with_handler(mut self, api_key: ApiKey, factory: HandlerFactory) -> Self {
        self.handlers.insert(api_key, factory);
        self
    }

    /// Api keys with a registered handler, ordered by key.
    pub fn registered_api_keys(&self) -> Vec<ApiKey> {
        let mut keys: Vec<ApiKey> = self.handlers.keys().copied().collect();
        keys.sort_by_key(|key| *key as i16);
        keys
    }

    /// Dispatch one parsed request.
    ///
    /// The listener learns about the in-flight request before its work begins,
    /// so even a synchronous completion cannot signal readiness for a request
    /// the listener has not seen.
    pub fn on_message(&self, request: ParsedRequest) -> Result<(), DispatchError> {
        let api_key = request.api_key();
        let Some(factory) = self.handlers.get(&api_key) else {
            warn!(
                api_key = api_key as i16,
                correlation_id = request.header().correlation_id,
                "rejecting request with no registered handler"
            );
            return Err(DispatchError::UnsupportedRequest {
                api_key: api_key as i16,
            });
        };

        debug!(
            api_key = api_key as i16,
            correlation_id = request.header().correlation_id,
            client_id = request.header().client_id.as_deref(),
            "dispatching request"
        );

        let in_flight = factory(
            request,
            Arc::clone(&self.routing),
            Arc::downgrade(&self.listener),
        )?;
        self.listener.on_request(Arc::clone(&in_flight));
        in_flight.start();
        Ok(())
    }

    /// A payload the parser could not decode can never be answered safely;
    /// the request is rejected without creating an in-flight unit.
    pub fn on_failed_parse(&self, failure: RequestParseFailure) -> Result<(), DispatchError> {
        warn!(
            api_key = failure.header.api_key,
            correlation_id = failure.header.correlation_id,
            "rejecting request with undecodable payload"
        );
        Err(DispatchError::UnknownRequest {
            api_key: failure.header.api_key,
        })
    }
}

fn default_handlers() -> HashMap<ApiKey, HandlerFactory> {
    let mut handlers: HashMap<ApiKey, HandlerFactory> = HashMap::new();

    handlers.insert(
        ApiKey::ApiVersions,
        Box::new(|request, _routing, listener| match request {
            ParsedRequest::ApiVersions(request) => {
                Ok(Arc::new(ApiVersionsHandler::new(request, listener)) as Arc<dyn InFlightRequest>)
            }
            other => Err(DispatchError::UnsupportedRequest {
                api_key: other.api_key() as i16,
            }),
        }),
    );

    handlers.insert(
        ApiKey::Metadata,
        Box::new(|request, routing, listener| match request {
            ParsedRequest::Metadata(request) => {
                Ok(Arc::new(MetadataHandler::new(request, routing, listener))
                    as Arc<dyn InFlightRequest>)
            }
            other => Err(DispatchError::UnsupportedRequest {
                api_key: other.api_key() as i16,
            }),
        }),
    );

    handlers
}
