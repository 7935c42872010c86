//! Transport collaborator
//!
//! A transport turns one outbound message into a status code and a fully
//! buffered body. Retries, TLS and authentication are its own business.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use url::Url;

use crate::error::{self, Result};
use crate::soap::SoapVersion;

pub mod http_transport;

pub use http_transport::HttpTransport;

/// Header carrying the SOAP 1.1 action
pub const SOAP_ACTION: &str = "soapaction";

/// Everything a transport needs to deliver one envelope
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub url: Url,
    pub body: String,
    pub headers: HeaderMap,
}

impl OutboundMessage {
    /// Message with the content type and action headers of `version`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `action` is not a valid header value.
    pub fn new(url: Url, body: String, version: SoapVersion, action: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let content_type =
            HeaderValue::from_str(&version.content_type(action)).map_err(error::configuration)?;
        headers.insert(header::CONTENT_TYPE, content_type);

        if let Some(soap_action) = version.soap_action_header(action) {
            let value = HeaderValue::from_str(&soap_action).map_err(error::configuration)?;
            headers.insert(SOAP_ACTION, value);
        }

        Ok(Self { url, body, headers })
    }
}

/// Status and body returned by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends outbound messages
pub trait Transport: Send + Sync + 'static {
    fn send(&self, message: OutboundMessage) -> BoxFuture<'_, Result<TransportResponse>>;
}
