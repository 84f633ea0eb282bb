//! HTTP plumbing between the resource clients and a Canvas instance.
//!
//! [`Connection`] is the only type the resource clients talk to. Everything
//! else here supports it: streaming array decoding, `Link` pagination, error
//! classification, the upload protocol and the interception hooks.

mod decode;
mod error_classification;
mod http;
pub mod interceptors;
mod pagination;
mod upload;

pub use decode::JsonArrayDecoder;
pub use error_classification::classify_failure;
pub use http::{normalize_base_url, Connection, ConnectionBuilder};
pub use interceptors::{
    LoggingOutputInterceptor, LoggingResponseInterceptor, OutputInterceptor,
    PassthroughInterceptor, ResponseInterceptor,
};
pub use pagination::next_link;
pub use upload::FileUploadToken;

use crate::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Run `fut` unless `cancel` fires first.
///
/// The token is checked before polling and raced against the future, so an
/// already-cancelled token never starts the work.
pub(crate) async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        out = fut => out,
    }
}
