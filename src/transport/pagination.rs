//! Lazy traversal of paginated list endpoints.

use crate::transport::{cancellable, Connection, JsonArrayDecoder, TransportError};
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The URL of the `rel="next"` entry of a `Link` header, if there is one.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|entry| {
            let (target, params) = entry.split_once(';')?;
            if params.trim() != r#"rel="next""# {
                return None;
            }
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            (!target.is_empty()).then(|| target.to_string())
        })
}

struct Cursor {
    next: Option<String>,
    page: usize,
    body: Option<BoxStream<'static, Bytes>>,
    decoder: JsonArrayDecoder,
    pending: VecDeque<Vec<u8>>,
}

impl Connection {
    /// Stream every item of a paginated list, fetching pages as they are needed.
    ///
    /// At most `max_pages` pages are requested. Null items are skipped. A failed
    /// page yields one error and ends the stream.
    pub fn list<'a, T>(
        &'a self,
        url: &str,
        settings: &(impl crate::settings::Paged + ?Sized),
        cancel: &CancellationToken,
    ) -> BoxStream<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        let first = settings.to_parameters().append_to(url);
        let max_pages = settings.max_pages();
        let cancel = cancel.clone();
        debug!(item = std::any::type_name::<T>(), url = %first, "Listing entities");

        let start = Cursor {
            next: Some(first),
            page: 0,
            body: None,
            decoder: JsonArrayDecoder::new(),
            pending: VecDeque::new(),
        };

        let items = stream::unfold(Some(start), move |state| {
            let cancel = cancel.clone();
            async move {
                let mut cursor = state?;
                loop {
                    if let Some(raw) = cursor.pending.pop_front() {
                        match serde_json::from_slice::<Option<T>>(&raw) {
                            Ok(Some(item)) => return Some((Ok(item), Some(cursor))),
                            Ok(None) => continue,
                            Err(e) => return Some((Err(Error::Serialization(e)), None)),
                        }
                    }

                    if let Some(body) = cursor.body.as_mut() {
                        let chunk = cancellable(&cancel, async { Ok(body.next().await) }).await;
                        match chunk {
                            Ok(Some(Ok(chunk))) => match cursor.decoder.push(&chunk) {
                                Ok(elements) => cursor.pending.extend(elements),
                                Err(e) => return Some((Err(e), None)),
                            },
                            Ok(Some(Err(e))) | Err(e) => return Some((Err(e), None)),
                            Ok(None) => {
                                if let Err(e) = cursor.decoder.finish() {
                                    return Some((Err(e), None));
                                }
                                cursor.body = None;
                            }
                        }
                        continue;
                    }

                    if cursor.page >= max_pages {
                        return None;
                    }
                    let url = cursor.next.take().filter(|u| !u.is_empty())?;
                    cursor.page += 1;

                    match self.open_page(&url, &cancel).await {
                        Ok((next, body)) => {
                            cursor.next = next;
                            cursor.body = Some(body);
                            cursor.decoder = JsonArrayDecoder::new();
                        }
                        Err(e) => return Some((Err(e), None)),
                    }
                }
            }
        });

        Box::pin(items)
    }

    /// Like [`Connection::list`], for endpoints that wrap each page's array in
    /// an object under `field`.
    pub fn list_enveloped<'a, T>(
        &'a self,
        url: &str,
        settings: &(impl crate::settings::Paged + ?Sized),
        field: &'a str,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        let first = settings.to_parameters().append_to(url);
        let max_pages = settings.max_pages();
        let cancel = cancel.clone();
        debug!(item = std::any::type_name::<T>(), url = %first, field, "Listing enveloped entities");

        let pages = stream::unfold((Some(first), 0usize), move |(next, page)| {
            let cancel = cancel.clone();
            async move {
                if page >= max_pages {
                    return None;
                }
                let url = next.filter(|u| !u.is_empty())?;
                match self.read_enveloped_page::<T>(&url, field, &cancel).await {
                    Ok((next, items)) => Some((Ok(items), (next, page + 1))),
                    // Stop after reporting the failure.
                    Err(e) => Some((Err(e), (None, max_pages))),
                }
            }
        });

        Box::pin(
            pages
                .map(|page: Result<Vec<T>>| match page {
                    Ok(items) => stream::iter(items.into_iter().map(Ok)).left_stream(),
                    Err(e) => stream::once(async move { Err(e) }).right_stream(),
                })
                .flatten(),
        )
    }

    async fn open_page(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<(Option<String>, BoxStream<'static, Bytes>)> {
        let response = self.get(url, true, cancel).await?;
        let next = next_link(response.headers());
        let body = cancellable(cancel, self.response_interceptor().intercept(response)).await?;
        Ok((next, body))
    }

    async fn read_enveloped_page<T: DeserializeOwned>(
        &self,
        url: &str,
        field: &str,
        cancel: &CancellationToken,
    ) -> Result<(Option<String>, Vec<T>)> {
        let (next, body) = self.open_page(url, cancel).await?;
        let bytes = collect_body(body, cancel).await?;
        let mut envelope: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&bytes)?;
        let items = match envelope.remove(field) {
            Some(value) => serde_json::from_value::<Vec<Option<T>>>(value)?,
            None => {
                return Err(Error::Transport(TransportError::Other(format!(
                    "response is missing the '{}' field",
                    field
                ))))
            }
        };
        Ok((next, items.into_iter().flatten().collect()))
    }
}

/// Drain a body stream into memory, checking for cancellation between chunks.
pub(crate) async fn collect_body(
    mut body: BoxStream<'static, Bytes>,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = cancellable(cancel, async { Ok(body.next().await) }).await? {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}
