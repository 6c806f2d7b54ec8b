//! Shared flow fixtures for the integration tests.

use flowdeck_engine::model::{Flow, Request, Response};

/// A minimal GET flow with the given id and no response yet.
pub fn tflow(id: &str) -> Flow {
    Flow {
        id: id.to_string(),
        kind: "http".into(),
        intercepted: false,
        marked: String::new(),
        modified: false,
        is_replay: None,
        request: Request {
            method: "GET".into(),
            scheme: "http".into(),
            host: "example.com".into(),
            port: 80,
            path: "/".into(),
            pretty_host: String::new(),
            http_version: "HTTP/1.1".into(),
            content_length: None,
            timestamp_start: 1.0,
            timestamp_end: None,
        },
        response: None,
        error: None,
        client_conn: None,
        server_conn: None,
    }
}

/// A flow that has completed with the given status at `timestamp_end`.
pub fn tflow_done(id: &str, status_code: u16, timestamp_end: f64) -> Flow {
    let mut flow = tflow(id);
    flow.response = Some(Response {
        status_code,
        reason: String::new(),
        http_version: "HTTP/1.1".into(),
        content_length: None,
        timestamp_start: Some(1.0),
        timestamp_end: Some(timestamp_end),
    });
    flow
}

/// A completed flow with the given request/response body sizes.
pub fn tflow_sized(id: &str, request_bytes: u64, response_bytes: Option<u64>) -> Flow {
    let mut flow = tflow(id);
    flow.request.content_length = Some(request_bytes);
    if let Some(bytes) = response_bytes {
        let mut done = tflow_done(id, 200, 2.0);
        if let Some(response) = done.response.as_mut() {
            response.content_length = Some(bytes);
        }
        flow.response = done.response;
    }
    flow
}
