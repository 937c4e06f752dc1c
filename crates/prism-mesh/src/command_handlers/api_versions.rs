//! Handshake/capabilities handler.

use std::any::Any;
use std::sync::{Arc, Weak};

use tracing::debug;

use prism_protocol::api::{supported_api_versions, ApiKey};
use prism_protocol::api_versions_types::{ApiVersionKey, ApiVersionsRequest, ApiVersionsResponse};
use prism_protocol::request::{Request, RequestHeader};
use prism_protocol::response::{Response, ResponseHeader, ResponsePayload};

use crate::error::DispatchError;
use crate::in_flight::{InFlightRequest, RequestLifecycle, RequestListener, RequestState};

/// Answers capabilities requests from the statically known version ranges of
/// this proxy. Needs no backing-cluster work and never consults the routing
/// configuration, so it is ready the moment it starts.
pub struct ApiVersionsHandler {
    lifecycle: RequestLifecycle,
    request: Request<ApiVersionsRequest>,
}

impl ApiVersionsHandler {
    pub fn new(
        request: Request<ApiVersionsRequest>,
        listener: Weak<dyn RequestListener>,
    ) -> Self {
        let lifecycle = RequestLifecycle::new(request.header.clone(), listener);
        Self { lifecycle, request }
    }

    fn capabilities() -> ApiVersionsResponse {
        let mut api_keys: Vec<ApiVersionKey> = supported_api_versions()
            .iter()
            .map(|(api_key, range)| ApiVersionKey {
                api_key: *api_key as i16,
                min_version: range.min,
                max_version: range.max,
            })
            .collect();
        api_keys.sort_by_key(|key| key.api_key);

        ApiVersionsResponse {
            error_code: 0,
            api_keys,
            throttle_time_ms: 0,
        }
    }
}

impl InFlightRequest for ApiVersionsHandler {
    fn header(&self) -> &RequestHeader {
        self.lifecycle.header()
    }

    fn state(&self) -> RequestState {
        self.lifecycle.state()
    }

    fn start(self: Arc<Self>) {
        debug!(
            correlation_id = self.lifecycle.header().correlation_id,
            client_software = self.request.payload.client_software_name.as_deref(),
            "answering capabilities request"
        );
        self.lifecycle.begin();
        self.lifecycle.mark_ready();
    }

    fn build_answer(&self) -> Result<Response, DispatchError> {
        self.lifecycle.claim_answer()?;
        let header = self.lifecycle.header();
        Ok(Response {
            header: ResponseHeader {
                correlation_id: header.correlation_id,
            },
            api_key: ApiKey::ApiVersions,
            api_version: header.api_version,
            payload: ResponsePayload::ApiVersions(Self::capabilities()),
        })
    }

    fn abandon(&self) {
        self.lifecycle.abandon();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        ready_signals: Mutex<usize>,
    }

    impl RequestListener for RecordingListener {
        fn on_request(&self, _request: Arc<dyn InFlightRequest>) {}

        fn on_request_ready_for_answer(&self) {
            *self.ready_signals.lock().unwrap() += 1;
        }
    }

    fn request() -> Request<ApiVersionsRequest> {
        Request {
            header: RequestHeader {
                api_key: ApiKey::ApiVersions as i16,
                api_version: 2,
                correlation_id: 11,
                client_id: Some("test-client".to_string()),
            },
            payload: ApiVersionsRequest::default(),
        }
    }

    #[test]
    fn is_ready_as_soon_as_it_starts() {
        let listener: Arc<dyn RequestListener> = Arc::new(RecordingListener::default());
        let handler = Arc::new(ApiVersionsHandler::new(request(), Arc::downgrade(&listener)));

        assert_eq!(handler.state(), RequestState::Created);
        Arc::clone(&handler).start();
        assert_eq!(handler.state(), RequestState::Ready);
    }

    #[test]
    fn advertises_the_registered_command_set() {
        let listener: Arc<dyn RequestListener> = Arc::new(RecordingListener::default());
        let handler = Arc::new(ApiVersionsHandler::new(request(), Arc::downgrade(&listener)));
        Arc::clone(&handler).start();

        let answer = handler.build_answer().unwrap();
        assert_eq!(answer.header.correlation_id, 11);
        assert_eq!(answer.api_key, ApiKey::ApiVersions);

        let ResponsePayload::ApiVersions(payload) = answer.payload else {
            panic!("expected capabilities payload");
        };
        assert_eq!(payload.error_code, 0);

        let advertised: Vec<i16> = payload.api_keys.iter().map(|key| key.api_key).collect();
        assert_eq!(advertised, vec![ApiKey::Metadata as i16, ApiKey::ApiVersions as i16]);
    }
}
