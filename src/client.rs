//! MobSF API client.
//!
//! Low-level HTTP client that handles authentication, timeouts, transport
//! retries and error mapping. The endpoint operations (`upload`, `scan`, ...)
//! live next to the records they decode, under `models`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{multipart, Body, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{MobsfError, Result};
use crate::retry::RetryPolicy;

pub(crate) const UPLOAD_API: &str = "api/v1/upload";
pub(crate) const SCANS_API: &str = "api/v1/scans";
pub(crate) const SCAN_API: &str = "api/v1/scan";
pub(crate) const DELETE_SCAN_API: &str = "api/v1/delete_scan";
pub(crate) const REPORT_PDF_API: &str = "api/v1/download_pdf";
pub(crate) const REPORT_JSON_API: &str = "api/v1/report_json";
pub(crate) const VIEW_SOURCE_API: &str = "api/v1/view_source";

const USER_AGENT: &str = concat!("mobsf-cli/", env!("CARGO_PKG_VERSION"));

/// Size of the pieces an upload body is streamed in.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Low-level MobSF API client.
///
/// Every request carries `Authorization: <api key>` and
/// `Accept: application/json`. Any status other than 200 becomes an
/// [`ErrorCause::InvalidResponse`](crate::ErrorCause::InvalidResponse) error.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use mobsf_cli::MobsfClient;
///
/// # async fn example() -> mobsf_cli::Result<()> {
/// // Create from environment variables
/// let client = MobsfClient::from_env()?;
///
/// // Or configure manually
/// let client = MobsfClient::new("your-api-key", "http://localhost:8000")?;
/// let scans = client.list_scans().await?;
/// println!("{} scans", scans.count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MobsfClient {
    http: Client,
    base_url: Arc<Url>,
    server: Arc<str>,
    timeout: Duration,
    scan_timeout: Duration,
    report_timeout: Duration,
    retry: Arc<RetryPolicy>,
}

impl std::fmt::Debug for MobsfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobsfClient")
            .field("server", &&*self.server)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MobsfClient {
    /// Create a client from `MOBSF_API_KEY` and `MOBSF_SERVER`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured server is not a valid URL.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a client with the given key and server and default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid.
    pub fn new(api_key: &str, server: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key, server))
    }

    /// Create a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the server URL cannot be parsed, the API
    /// key is not a valid header value, or the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let server = config.server.trim_end_matches('/');
        // Joined paths are relative, so the base needs its trailing slash back
        let base_url = Url::parse(&format!("{server}/"))?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| MobsfError::transport(format!("Invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            server: Arc::from(server),
            timeout: config.timeout,
            scan_timeout: config.scan_timeout,
            report_timeout: config.report_timeout,
            retry: Arc::new(config.retry),
        })
    }

    /// The server URL without a trailing slash.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Timeout applied to metadata calls.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn scan_timeout(&self) -> Duration {
        self.scan_timeout
    }

    pub(crate) fn report_timeout(&self) -> Duration {
        self.report_timeout
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub(crate) async fn get(&self, path: &str, timeout: Duration) -> Result<Response> {
        let url = self.base_url.join(path)?;
        self.send(Method::GET, timeout, |_| Ok(self.http.get(url.clone())))
            .await
    }

    /// Make a POST request with a urlencoded form body.
    #[tracing::instrument(skip(self, form))]
    pub(crate) async fn post_form<F: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        form: &F,
        timeout: Duration,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        self.send(Method::POST, timeout, |_| Ok(self.http.post(url.clone()).form(form)))
            .await
    }

    /// Make a multipart POST with a single file part.
    ///
    /// The form is rebuilt from `contents` on every attempt, since a sent
    /// multipart body cannot be replayed. The part is streamed in
    /// [`UPLOAD_CHUNK_SIZE`] pieces and every piece handed to the connection
    /// counts as progress, so `timeout` bounds a stall rather than the whole
    /// transfer.
    #[tracing::instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub(crate) async fn post_file(
        &self,
        path: &str,
        field: &'static str,
        file_name: &str,
        contents: &[u8],
        timeout: Duration,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        self.send(Method::POST, timeout, |progress| {
            let pieces: Vec<Vec<u8>> = contents
                .chunks(UPLOAD_CHUNK_SIZE)
                .map(<[u8]>::to_vec)
                .collect();
            let progress = progress.clone();
            let body = futures::stream::iter(pieces.into_iter().map(move |piece| {
                progress.touch();
                Ok::<_, std::io::Error>(piece)
            }));

            let part = multipart::Part::stream_with_length(
                Body::wrap_stream(body),
                contents.len() as u64,
            )
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
            let form = multipart::Form::new().part(field, part);
            Ok(self.http.post(url.clone()).multipart(form))
        })
        .await
    }

    /// Read a 200 response body, allowing at most `idle` between pieces.
    pub(crate) async fn read_body(mut response: Response, idle: Duration) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = Self::next_chunk(&mut response, idle).await? {
            body.extend_from_slice(chunk.as_ref());
        }
        Ok(body)
    }

    /// Next piece of a response body, or a `TransportError` if nothing
    /// arrives within `idle`.
    pub(crate) async fn next_chunk(
        response: &mut Response,
        idle: Duration,
    ) -> Result<Option<impl AsRef<[u8]>>> {
        match tokio::time::timeout(idle, response.chunk()).await {
            Ok(chunk) => chunk.map_err(MobsfError::from),
            Err(_) => Err(MobsfError::transport(format!(
                "Response body stalled for {idle:?}"
            ))),
        }
    }

    /// Decode a 200 response body as JSON into `T`.
    pub(crate) async fn decode_json<T: DeserializeOwned>(
        response: Response,
        idle: Duration,
    ) -> Result<T> {
        let body = Self::read_body(response, idle).await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        crate::models::decode(value)
    }

    /// Send a request, retrying per the policy, then check the status.
    ///
    /// Each attempt may go `idle` without progress before it is abandoned.
    /// Progress is the start of the attempt plus anything `build` reports
    /// through the [`Progress`] it is handed.
    async fn send<B>(&self, method: Method, idle: Duration, build: B) -> Result<Response>
    where
        B: Fn(&Progress) -> Result<RequestBuilder>,
    {
        let mut retries = 0;

        loop {
            let progress = Progress::start();
            let request = build(&progress)?;

            let Some(outcome) = within_idle(request.send(), &progress, idle).await else {
                if self.retry.should_retry_timeout(&method, retries) {
                    retries += 1;
                    let delay = self.retry.backoff(retries);
                    tracing::warn!(?idle, retries, ?delay, "request stalled, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(MobsfError::transport(format!(
                    "Request timed out after {idle:?} without progress"
                )));
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(%status, url = %response.url(), "response received");

                    if self.retry.should_retry_status(&method, status, retries) {
                        retries += 1;
                        let delay = self.retry.delay_for(retries, status, response.headers());
                        tracing::warn!(%status, retries, ?delay, "transient status, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Self::check_response(response, idle).await;
                }
                Err(err) => {
                    if self.retry.should_retry_error(&method, &err, retries) {
                        retries += 1;
                        let delay = self.retry.backoff(retries);
                        tracing::warn!(error = %err, retries, ?delay, "request failed, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(MobsfError::transport(err.to_string()));
                }
            }
        }
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response, idle: Duration) -> Result<Response> {
        let status = response.status();

        if status == StatusCode::OK {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status, idle).await;
        Err(MobsfError::http_status(status.as_u16(), message))
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode, idle: Duration) -> String {
        match Self::read_body(response, idle).await {
            Ok(body) => error_message_from_body(&String::from_utf8_lossy(&body), status.as_u16()),
            Err(_) => format!("HTTP {}", status.as_u16()),
        }
    }
}

/// Last moment an in-flight request moved bytes.
#[derive(Debug, Clone)]
pub(crate) struct Progress {
    origin: Instant,
    elapsed_ms: Arc<AtomicU64>,
}

impl Progress {
    fn start() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record progress now.
    pub(crate) fn touch(&self) {
        let elapsed = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    fn last(&self) -> Instant {
        self.origin + Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }
}

/// Drive `future` to completion unless `progress` stays still for `idle`.
async fn within_idle<F: Future>(future: F, progress: &Progress, idle: Duration) -> Option<F::Output> {
    tokio::pin!(future);

    loop {
        let deadline = progress.last() + idle;
        tokio::select! {
            output = &mut future => return Some(output),
            () = tokio::time::sleep_until(deadline) => {
                if progress.last() + idle <= Instant::now() {
                    return None;
                }
            }
        }
    }
}

/// Message for a non-200 body: the JSON `error` field, else the raw text,
/// else `HTTP <status>`.
pub(crate) fn error_message_from_body(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
            return err.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
