//! # xsoap client
//!
//! Streaming SOAP response materialization driven by a constrained XPath
//! dialect, plus a cancellable request pipeline.
//!
//! ## Features
//!
//! - **Declarative bindings**: each target type lists its root and field
//!   patterns once through [`XmlObject`]
//! - **Streaming**: responses are matched event by event against compiled
//!   pattern tables, no document tree is built
//! - **Nested and repeated elements** with per-chain cached sub-parsers
//! - **Incremental lists**: items are announced as soon as they are parsed
//! - **One terminal outcome per request**: completed, faulted, errored or
//!   cancelled
//!
//! ## Usage
//!
//! ```rust,no_run
//! use xsoap_client::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Item {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl XmlObject for Item {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.root("//Envelope/Body/GetItemsResponse/item")
//!             .constructor(Self::default)
//!             .text("id", "id", |item: &mut Self, v: i32| item.id = v)
//!             .text("name", "name", |item: &mut Self, v: String| item.name = v);
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let client = SoapClient::new();
//! let url = Url::parse("http://localhost:8080/items").map_err(xsoap_client::error::usage)?;
//! let envelope = RawEnvelope::wrap_body(SoapVersion::Soap11, "<GetItems/>");
//!
//! let mut request = client
//!     .list_request::<Item, Soap11Fault>(url, envelope)?
//!     .with_action("urn:GetItems")?;
//! request.execute()?;
//!
//! if let Outcome::Completed(items) = request.wait().await? {
//!     println!("{} items", items.len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod request;
pub mod soap;
pub mod transport;
pub mod xpath;

pub use client::{ClientStats, ClientStatsSnapshot, SoapClient};
pub use config::{ConfigurationError, SoapConfig};
pub use error::{Error, Kind, Result};
pub use parser::{
    Declaration, ItemObserver, ListParser, Parser, ResponseParser, ScalarKind, Value, XmlObject,
    XmlValue,
};
pub use request::{ListRequest, ObjectRequest, Outcome, Request, RequestState, SoapObserver};
pub use soap::{Envelope, FaultReason, RawEnvelope, Soap11Fault, Soap12Fault, SoapVersion};
pub use transport::{HttpTransport, OutboundMessage, Transport, TransportResponse};
pub use xpath::{PathChain, PathStep, Pattern, XPathParser, XPathRepository};
