//! Default transport over hyper's pooled HTTP/1 client

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderValue, Request, header};
use http_body_util::{BodyExt, Full, Limited};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::{OutboundMessage, Transport, TransportResponse};
use crate::config::{ConfigDefaults, SoapConfig};
use crate::error::{self, Result};

/// Plain HTTP transport honouring the configured timeout and body limit
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
    max_response_bytes: usize,
    user_agent: HeaderValue,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns a configuration error if the user agent is not a valid header.
    pub fn new(config: &SoapConfig) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(error::configuration)?;
        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            client,
            timeout: config.timeout,
            max_response_bytes: config.max_response_bytes,
            user_agent,
        })
    }

    /// Transport for settings already known to be valid.
    ///
    /// Falls back to the default user agent if `config.user_agent` is not a
    /// valid header value.
    #[must_use]
    pub fn with_defaults(config: &SoapConfig) -> Self {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(ConfigDefaults::DEFAULT_USER_AGENT));

        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            timeout: config.timeout,
            max_response_bytes: config.max_response_bytes,
            user_agent,
        }
    }

    async fn round_trip(&self, message: OutboundMessage) -> Result<TransportResponse> {
        let url = message.url.clone();
        let mut builder = Request::post(url.as_str());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(message.headers);
            headers.insert(header::USER_AGENT, self.user_agent.clone());
        }
        let request = builder
            .body(Full::new(Bytes::from(message.body)))
            .map_err(|e| error::transport(e).with_url(url.clone()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| error::transport(e).with_url(url.clone()))?;
        let status = response.status();

        let body = Limited::new(response.into_body(), self.max_response_bytes)
            .collect()
            .await
            .map_err(|e| error::transport(e).with_url(url.clone()))?
            .to_bytes();

        tracing::debug!(
            target: "xsoap::transport",
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Response received"
        );

        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<TransportResponse>> {
        Box::pin(async move {
            let url = message.url.clone();
            match tokio::time::timeout(self.timeout, self.round_trip(message)).await {
                Ok(result) => result,
                Err(elapsed) => {
                    tracing::warn!(
                        target: "xsoap::transport",
                        url = %url,
                        timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                        "Request timed out"
                    );
                    Err(error::timeout(elapsed).with_url(url))
                }
            }
        })
    }
}
