//! Request and transport configuration
//!
//! `SoapConfig` carries the settings shared by the pipeline and the default
//! HTTP transport. Values are checked through [`Validator`] before a client is
//! built from them.

use std::time::Duration;

pub mod validation;

pub use validation::{ConfigDefaults, ConfigValidator, ConfigurationError, Validator};

/// SOAP client configuration
#[derive(Debug, Clone)]
pub struct SoapConfig {
    /// Transport round-trip timeout
    pub timeout: Duration,

    /// Default bound for `Request::get`
    pub get_timeout: Duration,

    /// Retain outbound and inbound XML text on request handles
    pub debug_capture: bool,

    /// User agent string sent by the HTTP transport
    pub user_agent: String,

    /// Status code that announces a protocol fault body
    pub fault_status: u16,

    /// Largest response body the HTTP transport will buffer
    pub max_response_bytes: usize,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            timeout: ConfigDefaults::DEFAULT_TIMEOUT,
            get_timeout: ConfigDefaults::DEFAULT_GET_TIMEOUT,
            debug_capture: false,
            user_agent: ConfigDefaults::DEFAULT_USER_AGENT.to_string(),
            fault_status: ConfigDefaults::DEFAULT_FAULT_STATUS,
            max_response_bytes: ConfigDefaults::DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl SoapConfig {
    /// Start from the defaults and adjust fluently
    #[must_use]
    pub fn builder() -> SoapConfigBuilder {
        SoapConfigBuilder {
            config: SoapConfig::default(),
        }
    }

    /// Whether `status` is the designated protocol-fault status
    #[inline]
    #[must_use]
    pub fn is_fault_status(&self, status: http::StatusCode) -> bool {
        status.as_u16() == self.fault_status
    }
}

impl Validator for SoapConfig {
    fn validate(&self) -> validation::ConfigResult<()> {
        ConfigValidator::validate_timeout(self.timeout, "timeout")?;
        ConfigValidator::validate_timeout(self.get_timeout, "get_timeout")?;
        ConfigValidator::validate_user_agent(&self.user_agent)?;
        ConfigValidator::validate_range(self.fault_status, 100, 599, "fault_status")?;
        ConfigValidator::validate_buffer_size(self.max_response_bytes, "max_response_bytes")?;
        Ok(())
    }
}

/// Fluent builder for [`SoapConfig`]
#[derive(Debug, Clone)]
pub struct SoapConfigBuilder {
    config: SoapConfig,
}

impl SoapConfigBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn get_timeout(mut self, timeout: Duration) -> Self {
        self.config.get_timeout = timeout;
        self
    }

    #[must_use]
    pub fn debug_capture(mut self, enabled: bool) -> Self {
        self.config.debug_capture = enabled;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn fault_status(mut self, status: u16) -> Self {
        self.config.fault_status = status;
        self
    }

    #[must_use]
    pub fn max_response_bytes(mut self, limit: usize) -> Self {
        self.config.max_response_bytes = limit;
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    ///
    /// Returns the first failed validation as a `ConfigurationError`.
    pub fn build(self) -> validation::ConfigResult<SoapConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
