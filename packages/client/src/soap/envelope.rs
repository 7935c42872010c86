//! Outbound envelope collaborator
//!
//! The pipeline only needs an envelope's XML text and protocol version; how
//! the text is produced is up to the implementor.

use std::fmt;

/// SOAP protocol version of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoapVersion {
    #[default]
    Soap11,
    Soap12,
}

impl SoapVersion {
    /// Namespace of the envelope elements
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "http://schemas.xmlsoap.org/soap/envelope/",
            SoapVersion::Soap12 => "http://www.w3.org/2003/05/soap-envelope",
        }
    }

    /// Content type of a request, carrying the action for SOAP 1.2
    #[must_use]
    pub fn content_type(self, action: Option<&str>) -> String {
        match (self, action) {
            (SoapVersion::Soap11, _) => "text/xml; charset=utf-8".to_string(),
            (SoapVersion::Soap12, None) => "application/soap+xml; charset=utf-8".to_string(),
            (SoapVersion::Soap12, Some(action)) => {
                format!("application/soap+xml; charset=utf-8; action=\"{action}\"")
            }
        }
    }

    /// Value of the `SOAPAction` header; only SOAP 1.1 sends one
    #[must_use]
    pub fn soap_action_header(self, action: Option<&str>) -> Option<String> {
        match self {
            SoapVersion::Soap11 => Some(format!("\"{}\"", action.unwrap_or_default())),
            SoapVersion::Soap12 => None,
        }
    }
}

impl fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoapVersion::Soap11 => f.write_str("SOAP 1.1"),
            SoapVersion::Soap12 => f.write_str("SOAP 1.2"),
        }
    }
}

/// A value that renders itself as an outbound envelope
pub trait Envelope: Send + Sync + 'static {
    fn to_xml(&self) -> String;

    fn version(&self) -> SoapVersion {
        SoapVersion::Soap11
    }
}

/// Envelope whose XML text is already rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEnvelope {
    xml: String,
    version: SoapVersion,
}

impl RawEnvelope {
    #[must_use]
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            version: SoapVersion::Soap11,
        }
    }

    #[must_use]
    pub fn soap12(xml: impl Into<String>) -> Self {
        Self {
            xml: xml.into(),
            version: SoapVersion::Soap12,
        }
    }

    /// Wrap `body` in a bare envelope of the given version
    #[must_use]
    pub fn wrap_body(version: SoapVersion, body: &str) -> Self {
        let xml = format!(
            "<soapenv:Envelope xmlns:soapenv=\"{ns}\"><soapenv:Header/>\
             <soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>",
            ns = version.namespace()
        );
        Self { xml, version }
    }
}

impl Envelope for RawEnvelope {
    fn to_xml(&self) -> String {
        self.xml.clone()
    }

    fn version(&self) -> SoapVersion {
        self.version
    }
}

impl Envelope for String {
    fn to_xml(&self) -> String {
        self.clone()
    }
}
