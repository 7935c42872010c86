//! List-shaped materialization
//!
//! Every element matching the item type's root, anywhere in the document,
//! becomes one list entry. Entries are announced as soon as they are
//! appended, so long responses can be consumed incrementally.

use std::io::BufRead;
use std::sync::{Arc, RwLock};

use super::declaration::XmlObject;
use super::engine::Parser;
use super::events::{Node, XmlEvents};
use crate::error::Result;
use crate::xpath::PathChain;

/// Receives list items in document order
pub trait ItemObserver<T>: Send + Sync {
    fn on_new_item(&self, item: &T);
}

/// Parser for a sequence of `T` spread through one document
pub struct ListParser<T> {
    item: Parser<T>,
    observers: RwLock<Vec<Arc<dyn ItemObserver<T>>>>,
}

impl<T: XmlObject> ListParser<T> {
    /// Items are found at the roots `T` declares
    ///
    /// # Errors
    ///
    /// See [`Parser::new`].
    pub fn new() -> Result<Self> {
        Ok(Self::from_parser(Parser::new()?))
    }

    /// Items are found at `roots`
    ///
    /// # Errors
    ///
    /// See [`Parser::with_roots`].
    pub fn with_roots(roots: Vec<PathChain>) -> Result<Self> {
        Ok(Self::from_parser(Parser::with_roots(roots)?))
    }

    fn from_parser(item: Parser<T>) -> Self {
        Self {
            item,
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Parser used for each item
    #[inline]
    #[must_use]
    pub fn item_parser(&self) -> &Parser<T> {
        &self.item
    }

    pub fn register_item_observer(&self, observer: Arc<dyn ItemObserver<T>>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    /// Returns whether `observer` was registered
    pub fn deregister_item_observer(&self, observer: &Arc<dyn ItemObserver<T>>) -> bool {
        let Ok(mut observers) = self.observers.write() else {
            return false;
        };
        let before = observers.len();
        observers.retain(|registered| !Arc::ptr_eq(registered, observer));
        observers.len() != before
    }

    /// Parse every item in `source`
    ///
    /// # Errors
    ///
    /// Returns a data-format error for malformed XML, premature end of input
    /// inside an item or text that fails coercion.
    pub fn parse(&self, source: &mut dyn BufRead) -> Result<Vec<T>> {
        self.parse_with(source, &mut |_| {})
    }

    /// Convenience wrapper over [`ListParser::parse`]
    ///
    /// # Errors
    ///
    /// See [`ListParser::parse`].
    pub fn parse_str(&self, xml: &str) -> Result<Vec<T>> {
        let mut source = xml.as_bytes();
        self.parse(&mut source)
    }

    /// Parse every item, handing each to `on_item` right after it is appended
    ///
    /// # Errors
    ///
    /// See [`ListParser::parse`].
    pub fn parse_with(
        &self,
        source: &mut dyn BufRead,
        on_item: &mut dyn FnMut(&T),
    ) -> Result<Vec<T>> {
        let mut events = XmlEvents::new(source);
        let mut items = Vec::new();

        loop {
            match events.next_node()? {
                Node::Start if self.item.is_root(events.current()) => {
                    items.push(self.item.parse_here(&mut events)?);
                    if let Some(item) = items.last() {
                        self.notify(item);
                        on_item(item);
                    }
                }
                Node::Eof => break,
                _ => {}
            }
        }

        tracing::debug!(
            target: "xsoap::engine",
            items = items.len(),
            "List parse finished"
        );
        Ok(items)
    }

    fn notify(&self, item: &T) {
        if let Ok(observers) = self.observers.read() {
            for observer in observers.iter() {
                observer.on_new_item(item);
            }
        }
    }
}

impl<T> std::fmt::Debug for ListParser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observers = self.observers.read().map(|o| o.len()).unwrap_or_default();
        f.debug_struct("ListParser")
            .field("item", &self.item)
            .field("observers", &observers)
            .finish()
    }
}
