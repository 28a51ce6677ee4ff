//! HTTP `ChunkSource` implementation.
//!
//! This source executes a caller-built request and streams the response body as it arrives.
//!
//! Notes:
//! - Request construction (method, headers, body, auth) is the caller's business; this source
//!   only executes the request it is given.
//! - Non-success statuses end the stream with an error before any body bytes are yielded.
//! - Cancellation is best-effort: dropping the stream drops the underlying body stream.

use std::io;

use bytes::Bytes;
use futures_util::stream;
use reqwest::{Client, Request, Response};
use url::Url;

use super::{ChunkSource, ChunkStream};
use crate::FeedError;

/// Streaming HTTP response body source.
pub struct HttpChunkSource {
    url: Url,
    client: Client,
    request: Request,
}

impl HttpChunkSource {
    /// Create a new HTTP source from a prepared request.
    ///
    /// Pass a custom `reqwest::Client` to configure timeouts, proxies, TLS, etc.
    pub fn new(client: Client, request: Request) -> Self {
        Self {
            url: request.url().clone(),
            client,
            request,
        }
    }

    /// Convenience constructor for a plain `GET` using `reqwest::Client::new()`.
    pub fn get(url: Url) -> Self {
        let client = Client::new();
        let request = Request::new(reqwest::Method::GET, url);
        Self::new(client, request)
    }
}

enum HttpState {
    Pending(Client, Request),
    Streaming(Response),
}

fn to_io(e: FeedError) -> io::Error {
    io::Error::other(e)
}

impl ChunkSource for HttpChunkSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn url(&self) -> Option<&Url> {
        Some(&self.url)
    }

    fn into_stream(self: Box<Self>) -> ChunkStream {
        let Self {
            url,
            client,
            request,
        } = *self;
        tracing::debug!(%url, "starting HTTP chunk stream");

        let s = stream::try_unfold(HttpState::Pending(client, request), |state| async move {
            // Lazily execute the request on the first poll.
            let mut resp = match state {
                HttpState::Pending(client, request) => {
                    match client.execute(request).await.and_then(Response::error_for_status) {
                        Ok(resp) => resp,
                        Err(e) => return Err(to_io(e.into())),
                    }
                }
                HttpState::Streaming(resp) => resp,
            };

            let next: io::Result<Option<(Bytes, HttpState)>> = match resp.chunk().await {
                Ok(Some(chunk)) => Ok(Some((chunk, HttpState::Streaming(resp)))),
                Ok(None) => Ok(None),
                Err(e) => Err(to_io(e.into())),
            };
            next
        });

        Box::pin(s)
    }
}
