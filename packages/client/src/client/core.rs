//! SOAP client
//!
//! Holds the configuration, the transport and a registry of compiled parsers
//! so each target type's pattern table is built once and shared by every
//! request that needs it.

use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use url::Url;

use super::stats::{ClientStats, ClientStatsSnapshot};
use crate::config::{SoapConfig, Validator};
use crate::error::{self, Result};
use crate::parser::{ListParser, Parser, XmlObject};
use crate::request::{ListRequest, ObjectRequest, Request};
use crate::soap::Envelope;
use crate::transport::{HttpTransport, Transport};

/// Entry point for building requests
#[derive(Clone)]
pub struct SoapClient {
    config: Arc<SoapConfig>,
    transport: Arc<dyn Transport>,
    parsers: Arc<DashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    stats: Arc<ClientStats>,
}

impl Default for SoapClient {
    fn default() -> Self {
        let config = SoapConfig::default();
        let transport = HttpTransport::with_defaults(&config);
        Self::assemble(config, Arc::new(transport))
    }
}

impl SoapClient {
    /// Client with default settings over [`HttpTransport`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_config(config: SoapConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Client over a caller-supplied transport
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_transport(config: SoapConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: SoapConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            parsers: Arc::new(DashMap::new()),
            stats: Arc::new(ClientStats::default()),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SoapConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> ClientStatsSnapshot {
        self.stats.snapshot()
    }

    /// Shared parser for `T`, compiled on first use
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `T`'s declaration does not compile.
    pub fn parser<T: XmlObject>(&self) -> Result<Arc<Parser<T>>> {
        self.cached(Parser::<T>::new)
    }

    /// Shared list parser for `T`, compiled on first use
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `T`'s declaration does not compile.
    pub fn list_parser<T: XmlObject>(&self) -> Result<Arc<ListParser<T>>> {
        self.cached(ListParser::<T>::new)
    }

    fn cached<P, B>(&self, build: B) -> Result<Arc<P>>
    where
        P: Send + Sync + 'static,
        B: FnOnce() -> Result<P>,
    {
        let key = TypeId::of::<P>();
        if let Some(existing) = self.parsers.get(&key) {
            let existing = Arc::clone(existing.value());
            if let Ok(parser) = existing.downcast::<P>() {
                self.stats.parser_cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(parser);
            }
        }

        let parser = Arc::new(build()?);
        self.stats.parsers_compiled.fetch_add(1, Ordering::Relaxed);
        let entry = self
            .parsers
            .entry(key)
            .or_insert_with(|| Arc::clone(&parser) as Arc<dyn Any + Send + Sync>);
        Arc::clone(entry.value())
            .downcast::<P>()
            .map_err(|_| error::configuration("parser registry holds a mismatched type"))
    }

    /// Request for a single `T`, with `F` as the fault shape
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `T` or `F` does not compile.
    pub fn request<T, F>(&self, url: Url, envelope: impl Envelope) -> Result<ObjectRequest<T, F>>
    where
        T: XmlObject,
        F: XmlObject,
    {
        let parser = self.parser::<T>()?;
        self.build(url, Arc::new(envelope), parser)
    }

    /// Request for a list of `T`, with `F` as the fault shape
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `T` or `F` does not compile.
    pub fn list_request<T, F>(&self, url: Url, envelope: impl Envelope) -> Result<ListRequest<T, F>>
    where
        T: XmlObject + Clone,
        F: XmlObject,
    {
        let parser = self.list_parser::<T>()?;
        self.build(url, Arc::new(envelope), parser)
    }

    /// Request around any response parser
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `F` does not compile.
    pub fn build<P, F>(
        &self,
        url: Url,
        envelope: Arc<dyn Envelope>,
        parser: Arc<P>,
    ) -> Result<Request<P, F>>
    where
        P: crate::parser::ResponseParser,
        F: XmlObject,
    {
        let fault_parser = self.parser::<F>()?;
        self.stats.requests_created.fetch_add(1, Ordering::Relaxed);
        Ok(Request::new(
            url,
            envelope,
            parser,
            fault_parser,
            Arc::clone(&self.transport),
            Arc::clone(&self.config),
        ))
    }
}

impl std::fmt::Debug for SoapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoapClient")
            .field("config", &self.config)
            .field("parsers", &self.parsers.len())
            .finish_non_exhaustive()
    }
}
