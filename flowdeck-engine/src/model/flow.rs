//! Intercepted flow records, as pushed on the wire.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Host and port, as sent on the wire.
pub type Address = (String, u16);

/// One intercepted flow.
///
/// Timestamps are epoch seconds as floats; sizes are bytes. Sub-records
/// that have not happened yet (`response`, `error`) are absent rather than
/// defaulted, and the comparators define how absent values order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub intercepted: bool,
    /// Marker label; empty when unmarked.
    #[serde(default)]
    pub marked: String,
    #[serde(default)]
    pub modified: bool,
    /// `"request"` or `"response"` while a replay is in flight.
    #[serde(default)]
    pub is_replay: Option<String>,
    pub request: Request,
    #[serde(default)]
    pub response: Option<Response>,
    #[serde(default)]
    pub error: Option<FlowError>,
    #[serde(default)]
    pub client_conn: Option<Connection>,
    #[serde(default)]
    pub server_conn: Option<Connection>,
}

fn default_kind() -> String {
    "http".to_string()
}

impl Flow {
    /// Wall-clock duration from first request byte to last response byte.
    /// `None` until a response has completed.
    pub fn duration(&self) -> Option<f64> {
        let end = self.response.as_ref()?.timestamp_end?;
        Some(end - self.request.timestamp_start)
    }

    /// Request plus response body sizes; an absent or unsized response
    /// contributes zero.
    pub fn total_size(&self) -> u64 {
        let request = self.request.content_length.unwrap_or(0);
        let response = self
            .response
            .as_ref()
            .and_then(|r| r.content_length)
            .unwrap_or(0);
        request + response
    }
}

impl Entity for Flow {
    fn id(&self) -> String {
        self.id.clone()
    }
}

/// The request half of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Display host (Host header when it differs from the connected host).
    #[serde(default)]
    pub pretty_host: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default, rename = "contentLength")]
    pub content_length: Option<u64>,
    pub timestamp_start: f64,
    #[serde(default)]
    pub timestamp_end: Option<f64>,
}

impl Request {
    /// Display URL: scheme, display host, port (elided when it is the
    /// scheme default), path.
    pub fn pretty_url(&self) -> String {
        let host = if self.pretty_host.is_empty() {
            &self.host
        } else {
            &self.pretty_host
        };
        let default_port = matches!(
            (self.scheme.as_str(), self.port),
            ("http", 80) | ("https", 443)
        );
        if default_port {
            format!("{}://{}{}", self.scheme, host, self.path)
        } else {
            format!("{}://{}:{}{}", self.scheme, host, self.port, self.path)
        }
    }
}

/// The response half of a flow, absent until one arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default, rename = "contentLength")]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub timestamp_start: Option<f64>,
    #[serde(default)]
    pub timestamp_end: Option<f64>,
}

/// A transport- or protocol-level failure attached to a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowError {
    pub msg: String,
    #[serde(default)]
    pub timestamp: f64,
}

/// Connection endpoints and TLS facts for one side of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub peername: Option<Address>,
    #[serde(default)]
    pub sockname: Option<Address>,
    #[serde(default)]
    pub tls_established: bool,
    #[serde(default)]
    pub sni: Option<String>,
    #[serde(default)]
    pub tls_version: Option<String>,
    #[serde(default)]
    pub timestamp_start: Option<f64>,
    #[serde(default)]
    pub timestamp_end: Option<f64>,
}
