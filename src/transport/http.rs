use crate::params::Parameters;
use crate::transport::error_classification::{check_response, no_response};
use crate::transport::interceptors::{OutputInterceptor, PassthroughInterceptor, ResponseInterceptor};
use crate::transport::pagination::collect_body;
use crate::transport::{cancellable, TransportError};
use crate::types::FileUpload;
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwap;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Proxy, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument, Span};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Reduce a Canvas address to its site root, ending in `/`.
///
/// A trailing `api/v1` (or `api`) is dropped so callers can pass either the
/// site URL or the API URL.
pub fn normalize_base_url(url: &str) -> String {
    let mut parts: Vec<&str> = url.split('/').collect();
    if parts.len() > 1 && parts.last() == Some(&"") {
        parts.pop();
    }
    if parts.last().is_some_and(|p| p.eq_ignore_ascii_case("v1")) {
        parts.pop();
    }
    if parts.last().is_some_and(|p| p.eq_ignore_ascii_case("api")) {
        parts.pop();
    }
    format!("{}/", parts.join("/"))
}

/// Builder for [`Connection`].
pub struct ConnectionBuilder {
    base_url: String,
    token: String,
    timeout: Option<Duration>,
    proxy: Option<String>,
    response_interceptor: Option<Arc<dyn ResponseInterceptor>>,
    output_interceptor: Option<Arc<dyn OutputInterceptor>>,
    logger: Option<Span>,
}

impl ConnectionBuilder {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: None,
            proxy: None,
            response_interceptor: None,
            output_interceptor: None,
            logger: None,
        }
    }

    /// Request timeout. Defaults to `CANVAS_HTTP_TIMEOUT_SECS`, or 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route all traffic through a proxy. Defaults to `CANVAS_PROXY_URL` when set.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptor = Some(interceptor);
        self
    }

    pub fn output_interceptor(mut self, interceptor: Arc<dyn OutputInterceptor>) -> Self {
        self.output_interceptor = Some(interceptor);
        self
    }

    pub fn logger(mut self, span: Span) -> Self {
        self.logger = Some(span);
        self
    }

    pub fn build(self) -> Result<Connection> {
        if self.base_url.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "A base URL is required",
                ErrorContext::new()
                    .with_field_path("connection.base_url")
                    .with_source("connection_builder"),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "An access token is required",
                ErrorContext::new()
                    .with_field_path("connection.token")
                    .with_source("connection_builder"),
            ));
        }

        let timeout = self.timeout.unwrap_or_else(|| {
            Duration::from_secs(
                env::var("CANVAS_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            )
        });
        let proxy = self.proxy.or_else(|| env::var("CANVAS_PROXY_URL").ok());

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.trim())).map_err(|_| {
            Error::configuration_with_context(
                "Access token contains characters that are not valid in a header",
                ErrorContext::new().with_field_path("connection.token"),
            )
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = http_client(
            reqwest::Client::builder().default_headers(headers),
            timeout,
            proxy.as_deref(),
        )?;
        // Storage endpoints must not see the token and answer with redirects
        // that the upload protocol handles itself.
        let upload_client = http_client(
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()),
            timeout,
            proxy.as_deref(),
        )?;

        Ok(Connection {
            client,
            upload_client,
            base_url: normalize_base_url(self.base_url.trim()),
            logger: ArcSwap::from_pointee(self.logger.unwrap_or_else(Span::none)),
            response_interceptor: self
                .response_interceptor
                .unwrap_or_else(|| Arc::new(PassthroughInterceptor)),
            output_interceptor: self.output_interceptor,
        })
    }
}

fn http_client(
    builder: reqwest::ClientBuilder,
    timeout: Duration,
    proxy: Option<&str>,
) -> Result<reqwest::Client> {
    let mut builder = builder.timeout(timeout);
    if let Some(proxy_url) = proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid proxy URL: {}", e),
                ErrorContext::new().with_field_path("connection.proxy"),
            )
        })?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))
}

/// An authenticated connection to one Canvas site.
///
/// Shared by every resource client. Apart from the logging span, nothing can
/// change after construction.
pub struct Connection {
    client: reqwest::Client,
    pub(crate) upload_client: reqwest::Client,
    base_url: String,
    logger: ArcSwap<Span>,
    response_interceptor: Arc<dyn ResponseInterceptor>,
    output_interceptor: Option<Arc<dyn OutputInterceptor>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        ConnectionBuilder::new(base_url, token).build()
    }

    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the span every subsequent request runs in.
    pub fn update_logger(&self, span: Span) {
        self.logger.store(Arc::new(span));
    }

    pub fn logger(&self) -> Span {
        Span::clone(&self.logger.load())
    }

    pub(crate) fn response_interceptor(&self) -> &dyn ResponseInterceptor {
        self.response_interceptor.as_ref()
    }

    /// Absolute URLs pass through untouched; anything else is resolved against the base.
    pub fn ensure_absolute_uri(&self, url: &str) -> String {
        if url::Url::parse(url).is_ok() {
            return url.to_string();
        }
        let path = url.strip_prefix('/').unwrap_or(url);
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and, if asked, turn a failure status into an error.
    pub(crate) async fn send(
        &self,
        client: &reqwest::Client,
        method: Method,
        url: &str,
        configure: impl FnOnce(RequestBuilder) -> RequestBuilder,
        throw_on_failure: bool,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let uri = self.ensure_absolute_uri(url);
        let request = configure(client.request(method.clone(), &uri));

        async move {
            debug!(method = %method, url = %uri, "Sending request");
            let response = cancellable(cancel, async {
                request.send().await.map_err(|e| no_response(url, e))
            })
            .await?;
            debug!(method = %method, url = %uri, status = %response.status(), "Received response");
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if throw_on_failure {
                check_response(url, response, cancel).await
            } else {
                Ok(response)
            }
        }
        .instrument(self.logger())
        .await
    }

    /// Run the response interceptor and buffer the whole body.
    pub(crate) async fn read_body(
        &self,
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let body = cancellable(cancel, self.response_interceptor.intercept(response)).await?;
        collect_body(body, cancel).await
    }

    /// GET `url`. The body is left unread for the caller.
    pub async fn get(
        &self,
        url: &str,
        throw_on_failure: bool,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        self.send(&self.client, Method::GET, url, |r| r, throw_on_failure, cancel)
            .await
    }

    /// GET a single entity, treating any failure status as "not found".
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        url: &str,
        parameters: &Parameters,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let full_url = parameters.append_to(url);
        debug!(item = std::any::type_name::<T>(), url = %full_url, "Retrieving entity");
        let response = self.get(&full_url, false, cancel).await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), url = %full_url, "Entity not retrieved");
            return Ok(None);
        }
        let body = self.read_body(response, cancel).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(serde_json::from_slice::<Option<T>>(&body)?)
    }

    pub async fn post_json<T, B>(&self, url: &str, body: &B, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, url, body, cancel).await
    }

    pub async fn put_json<T, B>(&self, url: &str, body: &B, cancel: &CancellationToken) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, url, body, cancel).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        parameters: &Parameters,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let response = self.post(url, parameters, true, cancel).await?;
        self.deserialize_optional(response, cancel).await
    }

    pub async fn put_form<T: DeserializeOwned>(
        &self,
        url: &str,
        parameters: &Parameters,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let response = self.put(url, parameters, true, cancel).await?;
        self.deserialize_optional(response, cancel).await
    }

    /// POST `form` as `application/x-www-form-urlencoded`.
    pub async fn post(
        &self,
        url: &str,
        form: &Parameters,
        throw_on_failure: bool,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let pairs = form.as_pairs();
        self.send(&self.client, Method::POST, url, |r| r.form(&pairs), throw_on_failure, cancel)
            .await
    }

    /// PUT `form` as `application/x-www-form-urlencoded`.
    pub async fn put(
        &self,
        url: &str,
        form: &Parameters,
        throw_on_failure: bool,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let pairs = form.as_pairs();
        self.send(&self.client, Method::PUT, url, |r| r.form(&pairs), throw_on_failure, cancel)
            .await
    }

    /// POST a multipart body: every `form` value as a text field, then the file.
    pub async fn post_multipart(
        &self,
        url: &str,
        file_field: &str,
        file: FileUpload,
        form: &Parameters,
        throw_on_failure: bool,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let multipart = multipart_form(form.iter().map(|p| (p.name.clone(), p.value.clone())), file_field, file)?;
        self.send(
            &self.client,
            Method::POST,
            url,
            |r| r.multipart(multipart),
            throw_on_failure,
            cancel,
        )
        .await
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = Bytes::from(serde_json::to_vec(body)?);
        if let Some(interceptor) = &self.output_interceptor {
            interceptor.inspect(url, &payload).await;
        }
        let response = self
            .send(
                &self.client,
                method,
                url,
                |r| r.header(CONTENT_TYPE, "application/json").body(payload),
                true,
                cancel,
            )
            .await?;
        self.deserialize_optional(response, cancel).await
    }

    /// Deserialize a write response; an empty or unreadable body gives `None`.
    async fn deserialize_optional<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let body = self.read_body(response, cancel).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<Option<T>>(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(item = std::any::type_name::<T>(), error = %e, "Response body could not be deserialized");
                Ok(None)
            }
        }
    }
}

pub(crate) fn multipart_form(
    fields: impl IntoIterator<Item = (String, String)>,
    file_field: &str,
    file: FileUpload,
) -> Result<reqwest::multipart::Form> {
    let form = fields
        .into_iter()
        .fold(reqwest::multipart::Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part(file_field.to_string(), file.into_part()?))
}
