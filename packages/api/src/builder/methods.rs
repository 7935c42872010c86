//! Terminal methods turning a configured builder into a request handle

use std::sync::Arc;

use url::Url;
use xsoap_client::{
    ListParser, ListRequest, ObjectRequest, Request, Result, Soap11Fault, XmlObject, error,
};

use crate::builder::core::{EnvelopeSet, SoapBuilder};

impl SoapBuilder<EnvelopeSet> {
    /// Request for a single `T` with SOAP 1.1 faults
    ///
    /// # Errors
    ///
    /// Returns a usage error for an invalid URL and a configuration error if
    /// `T` does not compile or the action is not a valid header value.
    pub fn post<T: XmlObject>(self, url: &str) -> Result<ObjectRequest<T, Soap11Fault>> {
        self.post_with_fault::<T, Soap11Fault>(url)
    }

    /// Request for a single `T` with fault shape `F`
    ///
    /// # Errors
    ///
    /// See [`SoapBuilder::post`].
    pub fn post_with_fault<T: XmlObject, F: XmlObject>(
        self,
        url: &str,
    ) -> Result<ObjectRequest<T, F>> {
        let url = parse_url(url)?;
        if self.debug_enabled {
            log::debug!("xsoap builder: POST {url} expecting {}", std::any::type_name::<T>());
        }
        let parser = self.client.parser::<T>()?;
        let request = self.client.build(url, Arc::clone(&self.state.envelope), parser)?;
        self.finish(request)
    }

    /// Request for a list of `T` with SOAP 1.1 faults
    ///
    /// # Errors
    ///
    /// See [`SoapBuilder::post`].
    pub fn post_list<T: XmlObject + Clone>(self, url: &str) -> Result<ListRequest<T, Soap11Fault>> {
        self.post_list_with_fault::<T, Soap11Fault>(url)
    }

    /// Request for a list of `T` with fault shape `F`
    ///
    /// # Errors
    ///
    /// See [`SoapBuilder::post`].
    pub fn post_list_with_fault<T: XmlObject + Clone, F: XmlObject>(
        self,
        url: &str,
    ) -> Result<ListRequest<T, F>> {
        let url = parse_url(url)?;
        if self.debug_enabled {
            log::debug!(
                "xsoap builder: POST {url} expecting list of {}",
                std::any::type_name::<T>()
            );
        }
        let parser: Arc<ListParser<T>> = self.client.list_parser::<T>()?;
        let request = self.client.build(url, Arc::clone(&self.state.envelope), parser)?;
        self.finish(request)
    }

    fn finish<P, F>(self, request: Request<P, F>) -> Result<Request<P, F>>
    where
        P: xsoap_client::ResponseParser,
        F: XmlObject,
    {
        let capture = self.debug_enabled || self.client.config().debug_capture;
        let mut request = request.with_debug_capture(capture);
        if let Some(action) = self.action {
            if self.debug_enabled {
                log::debug!("xsoap builder: action {action}");
            }
            request = request.with_action(action)?;
        }
        Ok(request)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    url.parse::<Url>().map_err(|e| {
        log::warn!("xsoap builder: invalid URL '{url}': {e}");
        error::usage(e)
    })
}
