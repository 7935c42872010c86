//! Core `SoapBuilder` structures
//!
//! The type parameter tracks whether an envelope has been chosen; only a
//! builder in the [`EnvelopeSet`] state exposes the terminal methods.

use std::fmt;
use std::sync::Arc;

use xsoap_client::{Envelope, RawEnvelope, SoapClient, SoapVersion};

/// State marker indicating no envelope has been set
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeNotSet;

/// State carrying the envelope to send
#[derive(Clone)]
pub struct EnvelopeSet {
    pub(crate) envelope: Arc<dyn Envelope>,
}

impl fmt::Debug for EnvelopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeSet")
            .field("version", &self.envelope.version())
            .finish_non_exhaustive()
    }
}

/// Builder for SOAP requests
///
/// Type parameter `S` tracks the envelope state:
/// - `EnvelopeNotSet`: envelope methods available
/// - `EnvelopeSet`: ready for `post` / `post_list`
#[derive(Clone)]
pub struct SoapBuilder<S = EnvelopeNotSet> {
    pub(crate) client: SoapClient,
    pub(crate) version: SoapVersion,
    pub(crate) action: Option<String>,
    pub(crate) debug_enabled: bool,
    pub(crate) state: S,
}

impl SoapBuilder<EnvelopeNotSet> {
    /// Start building a request on a shared client
    #[must_use]
    pub fn new(client: &SoapClient) -> Self {
        Self {
            client: client.clone(),
            version: SoapVersion::default(),
            action: None,
            debug_enabled: false,
            state: EnvelopeNotSet,
        }
    }

    /// Protocol version used when wrapping a bare body
    #[must_use]
    pub fn version(mut self, version: SoapVersion) -> Self {
        self.version = version;
        self
    }

    /// Wrap `body` in an envelope of the configured version
    #[must_use]
    pub fn body(self, body: &str) -> SoapBuilder<EnvelopeSet> {
        let envelope = RawEnvelope::wrap_body(self.version, body);
        self.envelope(envelope)
    }

    /// Send a caller-built envelope as is
    #[must_use]
    pub fn envelope(self, envelope: impl Envelope) -> SoapBuilder<EnvelopeSet> {
        SoapBuilder {
            client: self.client,
            version: envelope.version(),
            action: self.action,
            debug_enabled: self.debug_enabled,
            state: EnvelopeSet {
                envelope: Arc::new(envelope),
            },
        }
    }
}

impl<S> SoapBuilder<S> {
    /// Set the SOAP action
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Capture request and response text and log each step
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Client the request will run on
    #[inline]
    #[must_use]
    pub fn client(&self) -> &SoapClient {
        &self.client
    }
}

impl<S: fmt::Debug> fmt::Debug for SoapBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapBuilder")
            .field("version", &self.version)
            .field("action", &self.action)
            .field("debug_enabled", &self.debug_enabled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
