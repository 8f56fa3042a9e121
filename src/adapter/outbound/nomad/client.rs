//! Nomad HTTP API client.
//!
//! Talks to a single agent address:
//! - `GET /v1/allocations`: allocation discovery
//! - `GET /v1/allocation/:id`: allocation detail (job name)
//! - `GET /v1/client/fs/logs/:id`: streamed task logs, forwarded by the agent
//!   to the client node running the allocation
//!
//! List and detail calls carry a per-request timeout and retry on connect and
//! timeout errors. Log streams are unbounded, so they only carry the connect
//! timeout.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::dto::{AllocationDetail, AllocationStub};
use super::frame::FrameDecoder;
use crate::domain::{Allocation, AllocationId};
use crate::error::{Error, Result, StreamError};
use crate::infrastructure::config::nomad::NomadConfig;
use crate::port::{LogStream, LogStreamRequest, Orchestrator};

/// Text Nomad returns when a log request names a task the allocation no
/// longer runs.
const UNKNOWN_TASK_MARKER: &str = "unknown task name";

const TOKEN_HEADER: &str = "X-Nomad-Token";

/// HTTP client for one Nomad agent.
///
/// Cheap to share: `reqwest::Client` pools connections internally.
pub struct NomadClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    retry_max_attempts: u32,
    retry_backoff: Duration,
}

impl NomadClient {
    /// Build a client for `address` with the connection settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the HTTP client cannot be constructed.
    pub fn new(address: Url, config: &NomadConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(address),
            token: config.resolve_token(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// The agent address requests are sent to.
    #[must_use]
    pub fn address(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn get_with_retry<T>(&self, url: Url) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let request = self.authorized(self.http.get(url.clone()).timeout(self.timeout));
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = check_status(response).await?;

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "Nomad request failed, retrying"
        );
        if !self.retry_backoff.is_zero() {
            sleep(self.retry_backoff).await;
        }
    }

    fn logs_url(&self, request: &LogStreamRequest) -> Result<Url> {
        let mut url = self.endpoint(&format!(
            "v1/client/fs/logs/{}",
            request.allocation_id.as_str()
        ))?;
        url.query_pairs_mut()
            .append_pair("task", &request.task)
            .append_pair("type", request.stream.as_str())
            .append_pair("follow", if request.follow { "true" } else { "false" })
            .append_pair("origin", "end")
            .append_pair("offset", &request.offset.to_string());
        Ok(url)
    }
}

#[async_trait]
impl Orchestrator for NomadClient {
    async fn list_allocations(&self) -> Result<Vec<Allocation>> {
        let url = self.endpoint("v1/allocations")?;
        let stubs: Vec<AllocationStub> = self.get_with_retry(url).await?;
        debug!(count = stubs.len(), "Listed allocations");
        Ok(stubs
            .into_iter()
            .map(AllocationStub::into_allocation)
            .collect())
    }

    async fn allocation(&self, id: &AllocationId) -> Result<Allocation> {
        let url = self.endpoint(&format!("v1/allocation/{}", id.as_str()))?;
        let detail: AllocationDetail = self.get_with_retry(url).await?;
        Ok(detail.into_allocation())
    }

    async fn open_logs(
        &self,
        request: LogStreamRequest,
    ) -> std::result::Result<Box<dyn LogStream>, StreamError> {
        let url = self
            .logs_url(&request)
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        debug!(
            allocation = %request.allocation_id,
            task = %request.task,
            stream = %request.stream,
            offset = request.offset,
            "Opening log stream"
        );

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_stream_failure(status.as_u16(), &body));
        }

        Ok(Box::new(NomadLogStream::new(response)))
    }

    fn name(&self) -> &'static str {
        "nomad"
    }
}

/// Map a non-success log response onto a [`StreamError`].
///
/// Nomad has no structured code for "task already gone", so the message text
/// is the only signal.
pub(crate) fn classify_stream_failure(status: u16, body: &str) -> StreamError {
    let message = body.trim().to_string();
    if message.contains(UNKNOWN_TASK_MARKER) {
        debug!(status, message = %message, "Classified log stream failure by message text");
        return StreamError::UnknownTask(message);
    }
    StreamError::Status { status, message }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Streamed log body decoded into payload chunks.
struct NomadLogStream {
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: FrameDecoder,
}

impl NomadLogStream {
    fn new(response: Response) -> Self {
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Self {
            body,
            decoder: FrameDecoder::new(),
        }
    }
}

#[async_trait]
impl LogStream for NomadLogStream {
    async fn next_chunk(&mut self) -> Option<std::result::Result<Vec<u8>, StreamError>> {
        loop {
            match self.decoder.next_frame() {
                Ok(Some(frame)) => {
                    if let Some(event) = &frame.file_event {
                        debug!(event = %event, file = ?frame.file, "Log file event");
                    }
                    match frame.payload() {
                        Ok(payload) if payload.is_empty() => continue,
                        Ok(payload) => return Some(Ok(payload)),
                        Err(e) => return Some(Err(e)),
                    }
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }

            match self.body.next().await {
                Some(Ok(bytes)) => {
                    if let Err(e) = self.decoder.push(&bytes) {
                        return Some(Err(e));
                    }
                }
                Some(Err(e)) => return Some(Err(StreamError::Transport(e.to_string()))),
                None => {
                    if self.decoder.pending() > 0 {
                        debug!(bytes = self.decoder.pending(), "Log stream ended mid-frame");
                    }
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamKind;

    fn client(address: &str) -> NomadClient {
        NomadClient::new(Url::parse(address).unwrap(), &NomadConfig::default()).unwrap()
    }

    #[test]
    fn unknown_task_is_classified_as_gone() {
        let err = classify_stream_failure(500, "unknown task name \"app\"\n");
        assert_eq!(err, StreamError::UnknownTask("unknown task name \"app\"".into()));
        assert!(err.is_task_gone());
    }

    #[test]
    fn other_failures_keep_status() {
        let err = classify_stream_failure(403, "Permission denied");
        assert_eq!(
            err,
            StreamError::Status {
                status: 403,
                message: "Permission denied".into()
            }
        );
        assert!(!err.is_task_gone());
    }

    #[test]
    fn endpoints_respect_path_prefix() {
        let nomad = client("http://proxy.local/nomad");
        assert_eq!(nomad.address().as_str(), "http://proxy.local/nomad/");
        assert_eq!(
            nomad.endpoint("v1/allocations").unwrap().as_str(),
            "http://proxy.local/nomad/v1/allocations"
        );
    }

    #[test]
    fn logs_url_carries_tail_parameters() {
        let nomad = client("http://127.0.0.1:4646");
        let request = LogStreamRequest::tail(AllocationId::new("abc"), "app", StreamKind::Stderr)
            .with_offset(1200);

        let url = nomad.logs_url(&request).unwrap();
        assert_eq!(url.path(), "/v1/client/fs/logs/abc");
        assert_eq!(
            url.query(),
            Some("task=app&type=stderr&follow=true&origin=end&offset=1200")
        );
    }

    #[tokio::test]
    async fn unreachable_agent_is_an_error() {
        let config = NomadConfig {
            retry_max_attempts: 1,
            connect_timeout_ms: 200,
            ..Default::default()
        };
        let nomad = NomadClient::new(Url::parse("http://127.0.0.1:1").unwrap(), &config).unwrap();
        assert!(nomad.list_allocations().await.is_err());
    }
}
