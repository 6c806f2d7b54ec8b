//! Outbound REST actions against the capture backend.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

/// REST client for flow actions.
///
/// Every action is fire-and-confirm: success mutates nothing locally,
/// because the authoritative change arrives as a stream event. Failures
/// surface as [`ClientError::RequestFailed`] for the caller to report.
///
/// Cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// let client = ActionClient::builder()
///     .base_url("http://127.0.0.1:8081")
///     .build()?;
/// client.resume("flow-id").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ActionClient {
    inner: Arc<ActionClientInner>,
}

#[derive(Debug)]
struct ActionClientInner {
    base_url: String,
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl ActionClient {
    /// Creates a new builder.
    pub fn builder() -> ActionClientBuilder {
        ActionClientBuilder::default()
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // -------------------------------------------------------------------------
    // Interception control
    // -------------------------------------------------------------------------

    /// Let an intercepted flow continue.
    pub async fn resume(&self, id: &str) -> Result<(), ClientError> {
        self.post_empty(&format!("flows/{id}/resume")).await
    }

    /// Let every intercepted flow continue.
    pub async fn resume_all(&self) -> Result<(), ClientError> {
        self.post_empty("flows/resume").await
    }

    /// Kill an intercepted flow.
    pub async fn kill(&self, id: &str) -> Result<(), ClientError> {
        self.post_empty(&format!("flows/{id}/kill")).await
    }

    /// Kill every intercepted flow.
    pub async fn kill_all(&self) -> Result<(), ClientError> {
        self.post_empty("flows/kill").await
    }

    // -------------------------------------------------------------------------
    // Flow mutation
    // -------------------------------------------------------------------------

    /// Delete a flow from the backend collection.
    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let request = self.http().delete(self.url(&format!("flows/{id}")));
        check(self.send(request).await?).await?;
        Ok(())
    }

    /// Duplicate a flow.
    pub async fn duplicate(&self, id: &str) -> Result<(), ClientError> {
        self.post_empty(&format!("flows/{id}/duplicate")).await
    }

    /// Replay a flow's request.
    pub async fn replay(&self, id: &str) -> Result<(), ClientError> {
        self.post_empty(&format!("flows/{id}/replay")).await
    }

    /// Revert local modifications to a flow.
    pub async fn revert(&self, id: &str) -> Result<(), ClientError> {
        self.post_empty(&format!("flows/{id}/revert")).await
    }

    /// Update a single field of a flow.
    pub async fn update(&self, id: &str, field: &str, value: Value) -> Result<(), ClientError> {
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value);
        let request = self
            .http()
            .put(self.url(&format!("flows/{id}")))
            .json(&Value::Object(body));
        check(self.send(request).await?).await?;
        Ok(())
    }

    /// Replace a message body (`field` is `request` or `response`).
    pub async fn upload_content(
        &self,
        id: &str,
        field: &str,
        content: Vec<u8>,
    ) -> Result<(), ClientError> {
        let form = Form::new().part("file", Part::bytes(content).file_name("content"));
        let request = self
            .http()
            .post(self.url(&format!("flows/{id}/{field}/content")))
            .multipart(form);
        check(self.send(request).await?).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Import/export
    // -------------------------------------------------------------------------

    /// Fetch a serialized representation of a flow (e.g. a curl command).
    pub async fn export(&self, id: &str) -> Result<String, ClientError> {
        let request = self.http().post(self.url(&format!("flows/{id}/export")));
        let response = check(self.send(request).await?).await?;
        let body: ExportResponse = response.json().await?;
        Ok(body.export)
    }

    /// Drop every flow on the backend.
    pub async fn clear_all(&self) -> Result<(), ClientError> {
        self.post_empty("clear").await
    }

    /// Stream a dump of all flows.
    pub async fn download_all(
        &self,
    ) -> Result<impl Stream<Item = Result<Bytes, ClientError>>, ClientError> {
        let request = self.http().get(self.url("flows/dump"));
        let response = check(self.send(request).await?).await?;
        Ok(response.bytes_stream().map_err(ClientError::from))
    }

    /// Upload a previously dumped capture; the resulting flows arrive as
    /// ordinary `add` stream events.
    pub async fn upload(&self, dump: Vec<u8>) -> Result<(), ClientError> {
        let form = Form::new().part("file", Part::bytes(dump).file_name("flows"));
        let request = self.http().post(self.url("flows/dump")).multipart(form);
        check(self.send(request).await?).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let request = match self.inner.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        Ok(request.send().await?)
    }

    async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        let request = self.http().post(self.url(path));
        check(self.send(request).await?).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::request_failed(status.as_u16(), message))
    }
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    export: String,
}

/// Builder for [`ActionClient`].
#[derive(Debug, Default)]
pub struct ActionClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ActionClientBuilder {
    /// Set the backend base URL (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client, validating the base URL.
    pub fn build(self) -> Result<ActionClient, ClientError> {
        let Some(base_url) = self.base_url else {
            return Err(ClientError::InvalidUrl("base URL not set".into()));
        };
        Url::parse(&base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        Ok(ActionClient {
            inner: Arc::new(ActionClientInner {
                base_url,
                http: reqwest::Client::new(),
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_trims_trailing_slash() {
        let client = ActionClient::builder()
            .base_url("http://127.0.0.1:8081/")
            .build()
            .unwrap();
        assert_eq!(
            client.url("flows/abc/resume"),
            "http://127.0.0.1:8081/flows/abc/resume"
        );
    }

    #[test]
    fn test_builder_rejects_bad_urls() {
        assert!(matches!(
            ActionClient::builder().build(),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            ActionClient::builder().base_url("not a url").build(),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
