//! Answer-ordering tests: arrival order in, arrival order out, whatever the
//! completion order and whichever thread signals readiness.

use std::sync::{Arc, Mutex, Weak};

use proptest::prelude::*;

use prism_mesh::{
    ChannelResponseSink, DispatchError, InFlightRequest, OrderedResponseQueue, RequestLifecycle,
    RequestListener, RequestState, ResponseSink,
};
use prism_protocol::api::ApiKey;
use prism_protocol::api_versions_types::ApiVersionsResponse;
use prism_protocol::request::RequestHeader;
use prism_protocol::response::{Response, ResponseHeader, ResponsePayload};

/// In-flight request whose completion the test controls explicitly.
struct ManualRequest {
    lifecycle: RequestLifecycle,
}

impl ManualRequest {
    fn new(correlation_id: i32, listener: Weak<dyn RequestListener>) -> Arc<Self> {
        let header = RequestHeader {
            api_key: ApiKey::ApiVersions as i16,
            api_version: 0,
            correlation_id,
            client_id: None,
        };
        Arc::new(Self {
            lifecycle: RequestLifecycle::new(header, listener),
        })
    }

    fn complete(&self) {
        self.lifecycle.mark_ready();
    }
}

impl InFlightRequest for ManualRequest {
    fn header(&self) -> &RequestHeader {
        self.lifecycle.header()
    }

    fn state(&self) -> RequestState {
        self.lifecycle.state()
    }

    fn start(self: Arc<Self>) {
        self.lifecycle.begin();
    }

    fn build_answer(&self) -> Result<Response, DispatchError> {
        self.lifecycle.claim_answer()?;
        Ok(Response {
            header: ResponseHeader {
                correlation_id: self.lifecycle.header().correlation_id,
            },
            api_key: ApiKey::ApiVersions,
            api_version: self.lifecycle.header().api_version,
            payload: ResponsePayload::ApiVersions(ApiVersionsResponse {
                error_code: 0,
                api_keys: vec![],
                throttle_time_ms: 0,
            }),
        })
    }

    fn abandon(&self) {
        self.lifecycle.abandon();
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Sink recording flushed correlation ids.
#[derive(Default)]
struct CollectingSink {
    delivered: Mutex<Vec<i32>>,
}

impl CollectingSink {
    fn delivered(&self) -> Vec<i32> {
        self.delivered.lock().unwrap().clone()
    }
}

impl ResponseSink for CollectingSink {
    fn deliver(&self, response: Response) {
        self.delivered
            .lock()
            .unwrap()
            .push(response.header.correlation_id);
    }
}

/// Enqueue and start `count` manual requests, correlation ids `0..count`.
fn arrivals(
    count: usize,
) -> (
    Arc<OrderedResponseQueue>,
    Arc<CollectingSink>,
    Vec<Arc<ManualRequest>>,
) {
    let sink = Arc::new(CollectingSink::default());
    let queue = Arc::new(OrderedResponseQueue::new(sink.clone()));
    let listener: Arc<dyn RequestListener> = queue.clone();

    let requests: Vec<Arc<ManualRequest>> = (0..count)
        .map(|index| ManualRequest::new(index as i32, Arc::downgrade(&listener)))
        .collect();
    for request in &requests {
        queue.on_request(request.clone());
        request.clone().start();
    }

    (queue, sink, requests)
}

#[test]
fn holds_answers_until_the_head_is_ready() {
    let (queue, sink, requests) = arrivals(3);

    // B finishes before A: nothing may leave yet.
    requests[1].complete();
    assert!(sink.delivered().is_empty());
    assert_eq!(queue.pending_count(), 3);

    // A finishes: the ready prefix A, B flushes in one pass.
    requests[0].complete();
    assert_eq!(sink.delivered(), vec![0, 1]);
    assert_eq!(queue.pending_count(), 1);

    requests[2].complete();
    assert_eq!(sink.delivered(), vec![0, 1, 2]);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn readiness_signal_is_a_check_now_signal() {
    let (queue, sink, requests) = arrivals(2);

    // Spurious signals with nothing ready are tolerated.
    queue.on_request_ready_for_answer();
    queue.on_request_ready_for_answer();
    assert!(sink.delivered().is_empty());

    requests[0].complete();
    // And extra signals after a flush change nothing.
    queue.on_request_ready_for_answer();
    assert_eq!(sink.delivered(), vec![0]);

    requests[1].complete();
    assert_eq!(sink.delivered(), vec![0, 1]);
}

#[test]
fn completions_from_other_threads_flush_in_arrival_order() {
    let (queue, sink, requests) = arrivals(4);

    // Complete in reverse, each from its own thread.
    let handles: Vec<_> = requests
        .iter()
        .rev()
        .map(|request| {
            let request = Arc::clone(request);
            std::thread::spawn(move || request.complete())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sink.delivered(), vec![0, 1, 2, 3]);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn teardown_abandons_pending_requests() {
    let (queue, sink, requests) = arrivals(2);

    queue.abandon_all();
    assert_eq!(queue.pending_count(), 0);

    // Work finishing after teardown is discarded, not delivered.
    requests[0].complete();
    requests[1].complete();
    assert!(sink.delivered().is_empty());
    assert!(requests[0].state() == RequestState::Ready);
}

#[tokio::test]
async fn channel_sink_hands_answers_to_the_writer() {
    let (sink, mut rx) = ChannelResponseSink::new();
    let queue = Arc::new(OrderedResponseQueue::new(Arc::new(sink)));
    let listener: Arc<dyn RequestListener> = queue.clone();

    let request = ManualRequest::new(9, Arc::downgrade(&listener));
    queue.on_request(request.clone());
    request.clone().start();
    request.complete();

    let response = rx.recv().await.expect("answer should be delivered");
    assert_eq!(response.header.correlation_id, 9);
    assert_eq!(response.api_key, ApiKey::ApiVersions);
}

fn completion_orders() -> impl Strategy<Value = Vec<usize>> {
    (1usize..8).prop_flat_map(|count| Just((0..count).collect::<Vec<usize>>()).prop_shuffle())
}

proptest! {
    /// Whatever order the work completes in, answers leave in arrival order,
    /// each exactly once.
    #[test]
    fn any_completion_order_flushes_in_arrival_order(order in completion_orders()) {
        let (queue, sink, requests) = arrivals(order.len());

        for &index in &order {
            requests[index].complete();
        }

        let expected: Vec<i32> = (0..order.len() as i32).collect();
        prop_assert_eq!(sink.delivered(), expected);
        prop_assert_eq!(queue.pending_count(), 0);
    }
}
