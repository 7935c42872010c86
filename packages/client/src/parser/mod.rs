//! Streaming materialization of typed objects from XML
//!
//! Target types declare their bindings once ([`XmlObject`]); [`Parser`] and
//! [`ListParser`] compile them into pattern tables and drive them with an
//! [`XmlEvents`] cursor.

use std::io::BufRead;

pub mod coercion;
pub mod declaration;
pub mod engine;
pub mod events;
pub mod list;

pub use coercion::{CoercionError, ScalarKind, Value, XmlValue};
pub use declaration::{Declaration, XmlObject};
pub use engine::Parser;
pub use events::{NIL_ATTRIBUTE, Node, XmlEvents};
pub use list::{ItemObserver, ListParser};

use crate::error::Result;

/// Common face of the parsers a request can run
pub trait ResponseParser: Send + Sync + 'static {
    /// Terminal value of a successful parse
    type Output: Send + 'static;
    /// Value announced while parsing is still in progress
    type Item: Send + 'static;

    /// Parse a complete response body
    ///
    /// # Errors
    ///
    /// Returns a data-format error when the body cannot be materialized.
    fn parse_body(
        &self,
        source: &mut dyn BufRead,
        on_item: &mut dyn FnMut(Self::Item),
    ) -> Result<Self::Output>;
}

impl<T: XmlObject> ResponseParser for Parser<T> {
    type Output = T;
    type Item = ();

    fn parse_body(&self, source: &mut dyn BufRead, _on_item: &mut dyn FnMut(())) -> Result<T> {
        self.parse(source)
    }
}

impl<T: XmlObject + Clone> ResponseParser for ListParser<T> {
    type Output = Vec<T>;
    type Item = T;

    fn parse_body(&self, source: &mut dyn BufRead, on_item: &mut dyn FnMut(T)) -> Result<Vec<T>> {
        self.parse_with(source, &mut |item| on_item(item.clone()))
    }
}
