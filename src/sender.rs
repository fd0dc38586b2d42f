//! HTTP Request Sender
//!
//! A generic request sender wrapping `reqwest`: method normalization,
//! parameter encoding, default-header merging, optional file-backed cookie
//! persistence, and capture of the most recent response's headers, body and
//! transport error state.
//!
//! One call, one attempt: there is no retry or backoff at this layer, and
//! HTTP error statuses (4xx/5xx) are returned as ordinary bodies. Only
//! transport-level failures produce an `Err`.
//!
//! A sender keeps exactly one [`RequestOutcome`]; each call overwrites it.
//! Concurrent requests on one instance are out of contract — use one sender
//! per concurrent flow.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, warn};

use crate::error::{ConfigurationError, Error, TransportError};
use crate::urls;

/// User-Agent reported by the default header set.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_7_5) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/27.0.1453.110 Safari/537.36";

/// HTTP method accepted by the sender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Normalize arbitrary caller input to exactly GET or POST. Anything
    /// that is not `GET` (case-insensitive) is treated as `POST`.
    pub fn normalize(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("GET") {
            Self::Get
        } else {
            Self::Post
        }
    }
}

/// Request parameters.
#[derive(Clone, Debug, Default)]
pub enum Params {
    /// No parameters; the URL and body are sent unmodified.
    #[default]
    None,
    /// Ordered key/value pairs. URL-encoded into the query for GET, sent as
    /// multipart form fields for POST.
    Pairs(Vec<(String, String)>),
    /// A pre-encoded string. Appended verbatim to the query for GET, sent
    /// as the body as-is for POST (the caller owns any content-type
    /// expectations).
    Raw(String),
}

impl Params {
    /// Build [`Params::Pairs`] from anything iterable as key/value pairs.
    pub fn pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Pairs(pairs) => pairs.is_empty(),
            Self::Raw(raw) => raw.is_empty(),
        }
    }

    /// Query-string rendering of the parameters.
    pub fn to_query(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Pairs(pairs) => urls::encode_pairs(pairs),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// Cookie jar behaviour for a sender instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CookieMode {
    /// No jar; cookies are neither stored nor replayed.
    #[default]
    Disabled,
    /// A process-unique temporary file backs the jar.
    TempFile,
    /// The given path backs the jar, shared across sender instances that
    /// name the same file.
    File(PathBuf),
}

/// Transport options applied when the sender builds its HTTP client.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Overall request timeout.
    pub timeout: Duration,
    /// Negotiate gzip/deflate response compression.
    pub compression: bool,
    /// Follow redirects automatically.
    pub follow_redirects: bool,
    /// Record the outgoing header block on each request.
    pub capture_request_headers: bool,
    /// User-Agent sent in the default header set.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            compression: true,
            follow_redirects: true,
            capture_request_headers: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// What the sender retained from the most recent request.
#[derive(Clone, Debug, Default)]
pub struct RequestOutcome {
    raw: String,
    header_len: usize,
    request_headers: String,
    status: u16,
    error: Option<TransportError>,
}

impl RequestOutcome {
    fn success(request_headers: String, status: u16, header_text: String, body: &str) -> Self {
        let header_len = header_text.len();
        let mut raw = header_text;
        raw.push_str(body);
        Self {
            raw,
            header_len,
            request_headers,
            status,
            error: None,
        }
    }

    fn failed(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Header block of the response, split from the raw capture by byte
    /// offset. Empty when the request failed.
    pub fn headers(&self) -> &str {
        self.raw.get(..self.header_len).unwrap_or("")
    }

    /// Body of the response. Empty when the request failed.
    pub fn body(&self) -> &str {
        self.raw.get(self.header_len..).unwrap_or("")
    }

    /// Rendered header block of the outgoing request, when capture was
    /// enabled. Empty when no request completed.
    pub fn request_headers(&self) -> &str {
        &self.request_headers
    }

    /// HTTP status of the response; `0` when the request failed before a
    /// status was received.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn error(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    /// Numeric error code; `0` is the success sentinel.
    pub fn error_code(&self) -> u32 {
        self.error.as_ref().map(TransportError::code).unwrap_or(0)
    }

    /// Error message; empty on success.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Request execution seam, letting the OAuth2 client swap the real sender
/// for a scripted one in tests.
#[async_trait]
pub trait SendRequest: Send + Sync {
    /// Send a request and return the raw response body.
    async fn request(
        &self,
        url: &str,
        method: Method,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error>;
}

/// The reqwest-backed request sender.
pub struct HttpRequestSender {
    config: TransportConfig,
    cookie_mode: CookieMode,
    jar: Option<(Arc<CookieStoreMutex>, PathBuf)>,
    client: reqwest::Client,
    last: Mutex<RequestOutcome>,
}

impl HttpRequestSender {
    /// Create a sender with default transport options and no cookie jar.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a sender with explicit transport options.
    pub fn with_config(config: TransportConfig) -> Result<Self, Error> {
        let client = build_client(&config, None)?;
        Ok(Self {
            config,
            cookie_mode: CookieMode::Disabled,
            jar: None,
            client,
            last: Mutex::new(RequestOutcome::default()),
        })
    }

    /// Transport options the sender was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Switch the cookie jar mode. Takes effect on the next request.
    ///
    /// Calling with the current mode keeps the existing jar; switching away
    /// from [`CookieMode::Disabled`] allocates a fresh one, so a
    /// disable/enable cycle starts empty.
    pub fn use_cookie(&mut self, mode: CookieMode) -> Result<(), Error> {
        if mode == self.cookie_mode {
            return Ok(());
        }

        self.jar = match &mode {
            CookieMode::Disabled => None,
            CookieMode::TempFile => {
                let path = temp_cookie_path();
                Some((load_jar(&path)?, path))
            }
            CookieMode::File(path) => Some((load_jar(path)?, path.clone())),
        };
        self.cookie_mode = mode;
        self.client = build_client(&self.config, self.jar.as_ref().map(|(jar, _)| jar.clone()))?;
        Ok(())
    }

    /// Path of the active cookie jar file, if a jar is enabled.
    pub fn cookie_file(&self) -> Option<&Path> {
        self.jar.as_ref().map(|(_, path)| path.as_path())
    }

    /// Send a GET request. Convenience wrapper over [`Self::request`].
    pub async fn get(
        &self,
        url: &str,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error> {
        self.request(url, Method::Get, params, headers).await
    }

    /// Send a POST request. Convenience wrapper over [`Self::request`].
    pub async fn post(
        &self,
        url: &str,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error> {
        self.request(url, Method::Post, params, headers).await
    }

    /// Send a request and return the raw response body.
    ///
    /// GET parameters are appended to the query string (`?` when the URL has
    /// none, `&` otherwise); POST pairs are sent as multipart form fields
    /// and raw strings as a pre-encoded body. Caller headers are merged
    /// after the default set; overlapping names are both sent, and which
    /// one wins is provider-dependent.
    pub async fn request(
        &self,
        url: &str,
        method: Method,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error> {
        match self.dispatch(url, method, params, headers).await {
            Ok(outcome) => {
                let body = outcome.body().to_string();
                debug!(status = outcome.status(), "request completed");
                *self.last.lock().unwrap() = outcome;
                self.persist_cookies();
                Ok(body)
            }
            Err(error) => {
                debug!(code = error.code(), "request failed");
                *self.last.lock().unwrap() = RequestOutcome::failed(error.clone());
                Err(Error::Transport(error))
            }
        }
    }

    async fn dispatch(
        &self,
        url: &str,
        method: Method,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<RequestOutcome, TransportError> {
        let header_map = self.merged_headers(headers)?;

        let builder = match method {
            Method::Get => self.client.get(append_query(url, &params)),
            Method::Post => match params {
                Params::None => self.client.post(url),
                Params::Pairs(pairs) => {
                    let mut form = reqwest::multipart::Form::new();
                    for (key, value) in pairs {
                        form = form.text(key, value);
                    }
                    self.client.post(url).multipart(form)
                }
                Params::Raw(body) => self.client.post(url).body(body),
            },
        };

        let request = builder
            .headers(header_map)
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: e.to_string(),
            })?;

        let request_headers = if self.config.capture_request_headers {
            render_request_headers(method, &request)
        } else {
            String::new()
        };

        debug!(method = method.as_str(), "dispatching request");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let header_text = render_response_headers(&response);
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    timeout: self.config.timeout,
                }
            } else {
                TransportError::BodyRead {
                    message: e.to_string(),
                }
            }
        })?;

        Ok(RequestOutcome::success(
            request_headers,
            status.as_u16(),
            header_text,
            &body,
        ))
    }

    fn map_send_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                timeout: self.config.timeout,
            }
        } else if error.is_builder() || error.is_request() {
            TransportError::InvalidRequest {
                message: error.to_string(),
            }
        } else {
            TransportError::ConnectionFailed {
                message: error.to_string(),
            }
        }
    }

    /// Default header set followed by caller headers. Duplicate names are
    /// kept, not collapsed.
    fn merged_headers(
        &self,
        caller: Vec<(String, String)>,
    ) -> Result<HeaderMap, TransportError> {
        let mut merged: Vec<(String, String)> = vec![
            ("Accept-Language".to_string(), "en-US,en;q=0.8".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
            ("Cache-Control".to_string(), "max-age=0".to_string()),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        merged.extend(caller);

        let mut map = HeaderMap::new();
        for (name, value) in &merged {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                TransportError::InvalidRequest {
                    message: format!("invalid header name: {name}"),
                }
            })?;
            let value =
                HeaderValue::from_str(value).map_err(|_| TransportError::InvalidRequest {
                    message: format!("invalid value for header {name:?}"),
                })?;
            map.append(name, value);
        }
        Ok(map)
    }

    fn persist_cookies(&self) {
        let Some((jar, path)) = &self.jar else {
            return;
        };
        let result = std::fs::File::create(path)
            .map_err(|e| e.to_string())
            .and_then(|file| {
                let mut writer = std::io::BufWriter::new(file);
                let store = jar.lock().unwrap();
                cookie_store::serde::json::save(&store, &mut writer).map_err(|e| e.to_string())
            });
        if let Err(message) = result {
            // A jar write failure must not fail an otherwise complete request.
            warn!(path = %path.display(), %message, "cookie jar write failed");
        }
    }

    /// Error code of the most recent request; `0` on success.
    pub fn last_error_code(&self) -> u32 {
        self.last.lock().unwrap().error_code()
    }

    /// Error message of the most recent request; empty on success.
    pub fn last_error_message(&self) -> String {
        self.last.lock().unwrap().error_message()
    }

    /// Rendered request header block of the most recent request; empty if
    /// none completed or capture is disabled.
    pub fn last_request_headers(&self) -> String {
        self.last.lock().unwrap().request_headers().to_string()
    }

    /// Response header block of the most recent request; empty on failure.
    pub fn last_response_headers(&self) -> String {
        self.last.lock().unwrap().headers().to_string()
    }

    /// Response body of the most recent request; empty on failure.
    pub fn last_response_body(&self) -> String {
        self.last.lock().unwrap().body().to_string()
    }

    /// HTTP status of the most recent request; `0` on failure.
    pub fn last_status(&self) -> u16 {
        self.last.lock().unwrap().status()
    }

    /// Full capture of the most recent request.
    pub fn last_outcome(&self) -> RequestOutcome {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl SendRequest for HttpRequestSender {
    async fn request(
        &self,
        url: &str,
        method: Method,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error> {
        HttpRequestSender::request(self, url, method, params, headers).await
    }
}

fn build_client(
    config: &TransportConfig,
    jar: Option<Arc<CookieStoreMutex>>,
) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder().timeout(config.timeout).redirect(
        if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        },
    );

    if !config.compression {
        builder = builder.no_gzip().no_deflate();
    }
    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }

    builder.build().map_err(|e| {
        Error::Transport(TransportError::InvalidRequest {
            message: e.to_string(),
        })
    })
}

fn load_jar(path: &Path) -> Result<Arc<CookieStoreMutex>, Error> {
    let store = if path.exists() {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Configuration(ConfigurationError::CookieJar {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        cookie_store::serde::json::load(std::io::BufReader::new(file)).map_err(|e| {
            Error::Configuration(ConfigurationError::CookieJar {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?
    } else {
        cookie_store::CookieStore::default()
    };
    Ok(Arc::new(CookieStoreMutex::new(store)))
}

fn temp_cookie_path() -> PathBuf {
    let unique: u64 = rand::random();
    std::env::temp_dir().join(format!(
        "oauth2-sender-{}-{unique:016x}.cookies",
        std::process::id()
    ))
}

fn append_query(url: &str, params: &Params) -> String {
    let query = params.to_query();
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}

fn render_request_headers(method: Method, request: &reqwest::Request) -> String {
    let mut text = format!("{} {} HTTP/1.1\r\n", method.as_str(), request.url());
    for (name, value) in request.headers() {
        text.push_str(name.as_str());
        text.push_str(": ");
        text.push_str(value.to_str().unwrap_or(""));
        text.push_str("\r\n");
    }
    text.push_str("\r\n");
    text
}

fn render_response_headers(response: &reqwest::Response) -> String {
    let status = response.status();
    let mut text = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in response.headers() {
        text.push_str(name.as_str());
        text.push_str(": ");
        text.push_str(value.to_str().unwrap_or(""));
        text.push_str("\r\n");
    }
    text.push_str("\r\n");
    text
}

/// Scripted sender for tests: records every request and replays queued
/// responses in FIFO order.
#[derive(Default)]
pub struct MockRequestSender {
    responses: Mutex<Vec<Result<String, TransportError>>>,
    history: Mutex<Vec<RecordedRequest>>,
}

/// A request as seen by [`MockRequestSender`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub method: Method,
    pub params: Params,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Parameter pairs of the request; empty for `None`/`Raw` params.
    pub fn param_pairs(&self) -> Vec<(String, String)> {
        match &self.params {
            Params::Pairs(pairs) => pairs.clone(),
            _ => Vec::new(),
        }
    }

    /// First value of a header, by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl MockRequestSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body to return.
    pub fn queue_response(&self, body: impl Into<String>) -> &Self {
        self.responses.lock().unwrap().push(Ok(body.into()));
        self
    }

    /// Queue a transport failure to return.
    pub fn queue_error(&self, error: TransportError) -> &Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.history.lock().unwrap().clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SendRequest for MockRequestSender {
    async fn request(
        &self,
        url: &str,
        method: Method,
        params: Params,
        headers: Vec<(String, String)>,
    ) -> Result<String, Error> {
        self.history.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            method,
            params,
            headers,
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::Transport(TransportError::ConnectionFailed {
                message: "no scripted response available".to_string(),
            }));
        }
        responses.remove(0).map_err(Error::Transport)
    }
}
