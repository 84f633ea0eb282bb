//! Turning non-success responses into [`Error`] values.
//!
//! Canvas reports failures in two shapes: a flat `errors` list, or an `errors`
//! object mapping field names to lists. Anything else is kept as raw content.

use crate::transport::{cancellable, TransportError};
use crate::types::ApiErrorDetail;
use crate::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

pub(crate) const NO_RESPONSE_MESSAGE: &str = "Something went wrong while calling Canvas";

#[derive(Deserialize)]
struct ErrorList {
    errors: Vec<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorMap {
    errors: BTreeMap<String, Vec<ApiErrorDetail>>,
}

/// Classify a failed response from its status and buffered body.
pub fn classify_failure(url: &str, status: StatusCode, body: &[u8]) -> Error {
    let message = format!("Canvas returned a non-success response code [{}]", status);

    if let Ok(list) = serde_json::from_slice::<ErrorList>(body) {
        return Error::Canvas {
            url: url.to_string(),
            status: status.as_u16(),
            message,
            errors: list.errors,
        };
    }

    if let Ok(map) = serde_json::from_slice::<ErrorMap>(body) {
        return Error::Canvas {
            url: url.to_string(),
            status: status.as_u16(),
            message,
            errors: map.errors.into_values().flatten().collect(),
        };
    }

    Error::Http {
        url: url.to_string(),
        status: status.as_u16(),
        message,
        content: String::from_utf8_lossy(body).into_owned(),
    }
}

pub(crate) fn no_response(url: &str, source: reqwest::Error) -> Error {
    Error::NoResponse {
        url: url.to_string(),
        message: NO_RESPONSE_MESSAGE.to_string(),
        source,
    }
}

/// Pass successful responses through; buffer and classify everything else.
pub(crate) async fn check_response(
    url: &str,
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = cancellable(cancel, async {
        response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))
    })
    .await?;
    Err(classify_failure(url, status, &body))
}
