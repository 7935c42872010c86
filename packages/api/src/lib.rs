//! xsoap public API
//!
//! Fluent entry point over [`xsoap_client`]: pick an envelope, name the
//! action, then post to a URL to get a request handle bound to a target type.
//!
//! ```no_run
//! use xsoap::{Soap, XmlObject, Declaration};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Quote {
//!     price: f64,
//! }
//!
//! impl XmlObject for Quote {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.root("//Envelope/Body/GetQuoteResponse")
//!             .constructor(Self::default)
//!             .text("price", "price", |q: &mut Self, v: f64| q.price = v);
//!     }
//! }
//!
//! # async fn run() -> xsoap::Result<()> {
//! let mut request = Soap::builder()
//!     .action("urn:GetQuote")
//!     .body("<GetQuote><symbol>ACME</symbol></GetQuote>")
//!     .post::<Quote>("http://localhost:8080/quotes")?;
//!
//! request.execute()?;
//! let outcome = request.wait().await?;
//! println!("{:?}", outcome.completed().map(|q| q.price));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

use std::sync::OnceLock;

pub mod builder;

pub use builder::*;

pub use xsoap_client::{
    Declaration, Envelope, Error, ItemObserver, ListRequest, ObjectRequest, Outcome, RawEnvelope,
    Request, RequestState, Result, Soap11Fault, Soap12Fault, SoapClient, SoapConfig,
    SoapObserver, SoapVersion, Transport, XmlObject, XmlValue,
};

static GLOBAL_CLIENT: OnceLock<SoapClient> = OnceLock::new();

/// Process-wide client used by builders that were not given one
pub fn global_client() -> &'static SoapClient {
    GLOBAL_CLIENT.get_or_init(|| {
        log::debug!("xsoap: initializing global client");
        SoapClient::default()
    })
}

/// Main entry point providing static builder methods
pub struct Soap;

impl Soap {
    /// Builder over the global client
    #[must_use]
    pub fn builder() -> SoapBuilder {
        SoapBuilder::new(global_client())
    }

    /// Builder over a caller-supplied client
    #[must_use]
    pub fn with_client(client: &SoapClient) -> SoapBuilder {
        SoapBuilder::new(client)
    }
}

/// Shorthand for [`Soap::builder`]
#[must_use]
pub fn soap() -> SoapBuilder {
    Soap::builder()
}
