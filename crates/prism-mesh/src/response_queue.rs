//! Per-connection answer ordering.
//!
//! Requests on one connection finish in whatever order their work completes,
//! but answers must leave in arrival order. The queue keeps every in-flight
//! request in an arrival-order FIFO and, on each readiness signal, flushes the
//! longest prefix whose head is ready. Queue mutation and the flush decision
//! are serialized under a single lock, so readiness signals may arrive from
//! any execution context and interleave with new arrivals.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use prism_protocol::response::Response;

use crate::in_flight::{InFlightRequest, RequestListener, RequestState};

/// Destination for completed answers, in flush order.
pub trait ResponseSink: Send + Sync {
    fn deliver(&self, response: Response);
}

/// Sink handing answers to the connection writer over a channel.
pub struct ChannelResponseSink {
    tx: mpsc::UnboundedSender<Response>,
}

impl ChannelResponseSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Response>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ResponseSink for ChannelResponseSink {
    fn deliver(&self, response: Response) {
        if self.tx.send(response).is_err() {
            warn!("connection writer gone; dropping completed answer");
        }
    }
}

/// Arrival-order FIFO of the in-flight requests of one client connection.
pub struct OrderedResponseQueue {
    pending: Mutex<VecDeque<Arc<dyn InFlightRequest>>>,
    sink: Arc<dyn ResponseSink>,
}

impl OrderedResponseQueue {
    pub fn new(sink: Arc<dyn ResponseSink>) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            sink,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    /// Abandon every queued request, for connection teardown. Work still
    /// running is left to finish; its late readiness signals find the queue
    /// empty and are ignored.
    pub fn abandon_all(&self) {
        let abandoned: Vec<Arc<dyn InFlightRequest>> =
            self.lock_pending().drain(..).collect();
        if !abandoned.is_empty() {
            warn!(
                count = abandoned.len(),
                "abandoning in-flight requests on connection teardown"
            );
        }
        for request in abandoned {
            request.abandon();
        }
    }

    /// Flush the longest ready prefix. Holding the lock across the whole pass
    /// keeps flush decisions serialized; delivery itself never blocks.
    fn flush_ready_prefix(&self) {
        let mut pending = self.lock_pending();
        while let Some(head) = pending.front() {
            match head.state() {
                RequestState::Ready => {
                    let head = Arc::clone(head);
                    match head.build_answer() {
                        Ok(response) => {
                            trace!(
                                correlation_id = response.header.correlation_id,
                                "flushing answer"
                            );
                            self.sink.deliver(response);
                        }
                        Err(error) => {
                            // A ready head that cannot answer would wedge the
                            // connection behind it; drop it and keep flushing.
                            warn!(
                                correlation_id = head.header().correlation_id,
                                %error,
                                "dropping request that failed to produce its answer"
                            );
                        }
                    }
                    pending.pop_front();
                }
                RequestState::Created | RequestState::Computing => break,
                RequestState::Answered => {
                    warn!(
                        correlation_id = head.header().correlation_id,
                        "removing already-answered request from queue head"
                    );
                    pending.pop_front();
                }
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<Arc<dyn InFlightRequest>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RequestListener for OrderedResponseQueue {
    fn on_request(&self, request: Arc<dyn InFlightRequest>) {
        debug!(
            correlation_id = request.header().correlation_id,
            api_key = request.header().api_key,
            "enqueueing in-flight request"
        );
        self.lock_pending().push_back(request);
    }

    fn on_request_ready_for_answer(&self) {
        self.flush_ready_prefix();
    }
}
