//! Hooks for inspecting traffic without touching the connection logic.
//!
//! A [`ResponseInterceptor`] owns the conversion from a response into the byte
//! stream that gets deserialized, so it may buffer, log or rewrite the body. An
//! [`OutputInterceptor`] sees every serialized JSON request body before it is
//! sent.

use crate::transport::TransportError;
use crate::{BoxStream, Error};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(&self, response: reqwest::Response) -> crate::Result<BoxStream<'static, Bytes>>;
}

#[async_trait]
pub trait OutputInterceptor: Send + Sync {
    async fn inspect(&self, url: &str, body: &Bytes);
}

/// Streams the body straight from the socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughInterceptor;

#[async_trait]
impl ResponseInterceptor for PassthroughInterceptor {
    async fn intercept(&self, response: reqwest::Response) -> crate::Result<BoxStream<'static, Bytes>> {
        let body = response
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(body))
    }
}

/// Logs JSON response bodies at debug level.
///
/// JSON bodies are buffered before logging, so pages are no longer decoded
/// incrementally. Other bodies stream through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingResponseInterceptor;

#[async_trait]
impl ResponseInterceptor for LoggingResponseInterceptor {
    async fn intercept(&self, response: reqwest::Response) -> crate::Result<BoxStream<'static, Bytes>> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|ct| ct.split(';').next())
            .map(|media| media.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false);
        if !is_json {
            debug!("Received non-JSON data");
            return PassthroughInterceptor.intercept(response).await;
        }

        let body = response.bytes().await.map_err(TransportError::Http)?;
        debug!(content = %String::from_utf8_lossy(&body), "Received JSON data");
        Ok(Box::pin(stream::once(async move { Ok(body) })))
    }
}

/// Logs outgoing JSON bodies at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingOutputInterceptor;

#[async_trait]
impl OutputInterceptor for LoggingOutputInterceptor {
    async fn inspect(&self, url: &str, body: &Bytes) {
        debug!(url = %url, body = %String::from_utf8_lossy(body), "Sending JSON data");
    }
}
