//! In-flight request lifecycle machinery.
//!
//! Every accepted request becomes one in-flight unit of work that moves
//! through `Created → Computing → Ready → Answered`, never backward. The
//! handler that produced it owns it; the listener and the ordering queue only
//! observe it. Readiness can be signalled from a different execution context
//! than the one that created the request (a backing-cluster continuation), so
//! the state word lives behind a lock and the listener is reached through a
//! weak handle that late completions fail to upgrade once the connection is
//! gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace, warn};

use prism_protocol::request::RequestHeader;
use prism_protocol::response::Response;

use crate::error::DispatchError;

/// Observable lifecycle states of an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Computing,
    Ready,
    Answered,
}

/// Receiver of dispatch results for one client connection.
pub trait RequestListener: Send + Sync {
    /// Called exactly once per accepted request, in arrival order.
    fn on_request(&self, request: Arc<dyn InFlightRequest>);

    /// Called when some request may have become ready. This is a check-now
    /// signal, not a one-to-one event; it may fire more often than requests
    /// become ready.
    fn on_request_ready_for_answer(&self);
}

/// One client request from arrival to answered.
pub trait InFlightRequest: Send + Sync {
    /// The originating header, unmodified since parse.
    fn header(&self) -> &RequestHeader;

    /// Current lifecycle state.
    fn state(&self) -> RequestState;

    /// Begin the handler's work. May complete synchronously or register
    /// continuations that finish on another execution context.
    fn start(self: Arc<Self>);

    /// Produce the answer. Valid only once the request is ready; repeated
    /// calls return the same content.
    fn build_answer(&self) -> Result<Response, DispatchError>;

    /// Drop interest in the answer. Outstanding sub-work is left to complete
    /// and its result discarded.
    fn abandon(&self);

    /// Testing/bookkeeping hook for concrete-variant inspection.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Shared lifecycle core embedded by every command handler.
///
/// Holds the retained header, the guarded state word, the abandoned flag and
/// the weak listener handle, and enforces the forward-only transitions.
pub struct RequestLifecycle {
    header: RequestHeader,
    state: Mutex<RequestState>,
    abandoned: AtomicBool,
    listener: Weak<dyn RequestListener>,
}

impl RequestLifecycle {
    pub fn new(header: RequestHeader, listener: Weak<dyn RequestListener>) -> Self {
        Self {
            header,
            state: Mutex::new(RequestState::Created),
            abandoned: AtomicBool::new(false),
            listener,
        }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn state(&self) -> RequestState {
        *self.lock_state()
    }

    /// `Created → Computing`. A request that is already past `Created` is left
    /// where it is.
    pub fn begin(&self) {
        let mut state = self.lock_state();
        if *state == RequestState::Created {
            *state = RequestState::Computing;
            trace!(
                correlation_id = self.header.correlation_id,
                "request computing"
            );
        }
    }

    /// `Computing → Ready`, then signal the listener.
    ///
    /// Safe to call from any execution context. The signal is skipped for
    /// abandoned requests and for listeners that no longer exist; a second
    /// call is a no-op so a request can never be reported ready twice.
    pub fn mark_ready(&self) {
        {
            let mut state = self.lock_state();
            match *state {
                RequestState::Created | RequestState::Computing => {
                    *state = RequestState::Ready;
                    trace!(
                        correlation_id = self.header.correlation_id,
                        "request ready"
                    );
                }
                RequestState::Ready | RequestState::Answered => {
                    warn!(
                        correlation_id = self.header.correlation_id,
                        state = ?*state,
                        "ignoring repeated ready signal"
                    );
                    return;
                }
            }
        }

        if self.abandoned.load(Ordering::Acquire) {
            debug!(
                correlation_id = self.header.correlation_id,
                "request abandoned; suppressing ready notification"
            );
            return;
        }

        match self.listener.upgrade() {
            Some(listener) => listener.on_request_ready_for_answer(),
            None => warn!(
                correlation_id = self.header.correlation_id,
                "listener gone; dropping ready notification"
            ),
        }
    }

    /// `Ready → Answered`. Guards [`InFlightRequest::build_answer`]: callable
    /// once the request is ready, idempotent once it is answered.
    pub fn claim_answer(&self) -> Result<(), DispatchError> {
        let mut state = self.lock_state();
        match *state {
            RequestState::Ready => {
                *state = RequestState::Answered;
                trace!(
                    correlation_id = self.header.correlation_id,
                    "request answered"
                );
                Ok(())
            }
            RequestState::Answered => Ok(()),
            other => Err(DispatchError::AnswerNotReady { state: other }),
        }
    }

    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
        debug!(
            correlation_id = self.header.correlation_id,
            "request abandoned"
        );
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
