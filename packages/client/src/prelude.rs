//! Types needed to declare bindings and run requests

pub use crate::client::SoapClient;
pub use crate::config::SoapConfig;
pub use crate::error::{Error, Result};
pub use crate::parser::{Declaration, ItemObserver, ListParser, Parser, XmlObject, XmlValue};
pub use crate::request::{ListRequest, ObjectRequest, Outcome, Request, RequestState, SoapObserver};
pub use crate::soap::{Envelope, RawEnvelope, Soap11Fault, Soap12Fault, SoapVersion};
pub use crate::transport::{OutboundMessage, Transport, TransportResponse};

pub use ::http::StatusCode;
pub use url::Url;
