//! Topic-metadata handler.
//!
//! Aggregates per-topic metadata from the routing configuration and presents
//! this proxy's advertised address as the only broker, so clients see one
//! logical broker regardless of how many clusters sit behind it.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, warn};

use prism_protocol::api::ApiKey;
use prism_protocol::metadata_types::{
    error_codes, MetadataBroker, MetadataPartition, MetadataRequest, MetadataResponse,
    MetadataTopic,
};
use prism_protocol::request::{Request, RequestHeader};
use prism_protocol::response::{Response, ResponseHeader, ResponsePayload};

use crate::error::DispatchError;
use crate::in_flight::{InFlightRequest, RequestLifecycle, RequestListener, RequestState};
use crate::upstream::RoutingConfiguration;

/// Node id under which the proxy advertises itself. Every partition of every
/// owned topic is reported as led by it.
const PROXY_NODE_ID: i32 = 0;

pub struct MetadataHandler {
    lifecycle: RequestLifecycle,
    request: Request<MetadataRequest>,
    routing: Arc<dyn RoutingConfiguration>,
    answer: Mutex<Option<MetadataResponse>>,
}

impl MetadataHandler {
    pub fn new(
        request: Request<MetadataRequest>,
        routing: Arc<dyn RoutingConfiguration>,
        listener: Weak<dyn RequestListener>,
    ) -> Self {
        let lifecycle = RequestLifecycle::new(request.header.clone(), listener);
        Self {
            lifecycle,
            request,
            routing,
            answer: Mutex::new(None),
        }
    }

    fn aggregate(&self) -> MetadataResponse {
        // An omitted topic list asks about every topic the mesh knows of.
        let topics_of_interest = match &self.request.payload.topics {
            Some(topics) => topics.clone(),
            None => self.routing.known_topics(),
        };

        let topics = topics_of_interest
            .iter()
            .map(|topic| self.describe_topic(topic))
            .collect();

        let (host, port) = self.routing.advertised_address();
        MetadataResponse {
            throttle_time_ms: 0,
            brokers: vec![MetadataBroker {
                node_id: PROXY_NODE_ID,
                host,
                port,
                rack: None,
            }],
            cluster_id: None,
            controller_id: PROXY_NODE_ID,
            topics,
        }
    }

    /// A topic without an owning cluster becomes a not-found entry; it never
    /// fails the request or its sibling topics.
    fn describe_topic(&self, topic: &str) -> MetadataTopic {
        match self.routing.cluster_config_for_topic(topic) {
            Some(cluster) => {
                debug!(topic, cluster = %cluster.name, "resolved topic to backing cluster");
                let partitions = (0..cluster.partition_count)
                    .map(|index| MetadataPartition {
                        error_code: error_codes::NONE,
                        partition_index: index,
                        leader_id: PROXY_NODE_ID,
                        replica_nodes: vec![PROXY_NODE_ID],
                        isr_nodes: vec![PROXY_NODE_ID],
                    })
                    .collect();
                MetadataTopic {
                    error_code: error_codes::NONE,
                    name: topic.to_string(),
                    is_internal: false,
                    partitions,
                }
            }
            None => {
                warn!(topic, "no backing cluster owns topic");
                MetadataTopic {
                    error_code: error_codes::UNKNOWN_TOPIC_OR_PARTITION,
                    name: topic.to_string(),
                    is_internal: false,
                    partitions: Vec::new(),
                }
            }
        }
    }
}

impl InFlightRequest for MetadataHandler {
    fn header(&self) -> &RequestHeader {
        self.lifecycle.header()
    }

    fn state(&self) -> RequestState {
        self.lifecycle.state()
    }

    fn start(self: Arc<Self>) {
        self.lifecycle.begin();
        let answer = self.aggregate();
        *self
            .answer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(answer);
        self.lifecycle.mark_ready();
    }

    fn build_answer(&self) -> Result<Response, DispatchError> {
        self.lifecycle.claim_answer()?;
        let answer = self
            .answer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(payload) = answer else {
            // Ready is only reachable after the answer is stored.
            return Err(DispatchError::AnswerNotReady {
                state: self.lifecycle.state(),
            });
        };

        let header = self.lifecycle.header();
        Ok(Response {
            header: ResponseHeader {
                correlation_id: header.correlation_id,
            },
            api_key: ApiKey::Metadata,
            api_version: header.api_version,
            payload: ResponsePayload::Metadata(payload),
        })
    }

    fn abandon(&self) {
        self.lifecycle.abandon();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
