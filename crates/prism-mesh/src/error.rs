//! Dispatch-level errors.

use thiserror::Error;

use crate::in_flight::RequestState;

/// Errors raised by the dispatch core.
///
/// Dispatch failures carry the offending api key as structured data; the
/// display text still names it for operator-facing logs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// A recognized protocol command with no handler registered in this proxy.
    #[error("unsupported api key: {api_key}")]
    UnsupportedRequest { api_key: i16 },

    /// A request whose payload could not be decoded upstream of dispatch.
    #[error("unknown request: api key {api_key}")]
    UnknownRequest { api_key: i16 },

    /// An answer was requested from a request that has not reached ready.
    #[error("answer not ready: request state is {state:?}")]
    AnswerNotReady { state: RequestState },
}
