//! Pull cursor over XML parse events
//!
//! Wraps a `quick_xml::Reader` and keeps the chain of currently open
//! elements, each step carrying the element's attributes as predicates so the
//! chain can be looked up directly in a pattern table. Text of the innermost
//! element is accumulated until its end tag.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{self, Result};
use crate::xpath::{PathChain, PathStep, local_name};

/// Default nil marker, matched by local name (`xsi:nil`)
pub const NIL_ATTRIBUTE: &str = "nil";

/// What the cursor stopped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// An element opened; [`XmlEvents::current`] ends with it
    Start,
    /// An element closed; it is still the leaf of [`XmlEvents::current`]
    End,
    /// The document is exhausted
    Eof,
}

pub struct XmlEvents<'a> {
    reader: Reader<&'a mut dyn BufRead>,
    buf: Vec<u8>,
    chain: PathChain,
    texts: Vec<String>,
    closing: bool,
}

impl<'a> XmlEvents<'a> {
    pub fn new(source: &'a mut dyn BufRead) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;

        Self {
            reader,
            buf: Vec::with_capacity(1024),
            chain: PathChain::absolute(Vec::new()),
            texts: Vec::new(),
            closing: false,
        }
    }

    /// Advance to the next start tag, end tag or end of input
    ///
    /// # Errors
    ///
    /// Returns a data-format error for malformed XML or unknown entities.
    pub fn next_node(&mut self) -> Result<Node> {
        if self.closing {
            self.chain.pop();
            self.texts.pop();
            self.closing = false;
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    self.chain.push(open_step(&start)?);
                    self.texts.push(String::new());
                    return Ok(Node::Start);
                }
                Event::End(_) => {
                    if self.chain.is_empty() {
                        return Err(error::data_format("end tag without matching start"));
                    }
                    self.closing = true;
                    return Ok(Node::End);
                }
                Event::Text(text) => {
                    if let Some(current) = self.texts.last_mut() {
                        current.push_str(decode(&text)?);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(current) = self.texts.last_mut() {
                        current.push_str(decode(&cdata)?);
                    }
                }
                Event::GeneralRef(reference) => {
                    let resolved = resolve_reference(decode(&reference)?)?;
                    if let Some(current) = self.texts.last_mut() {
                        current.push_str(&resolved);
                    }
                }
                Event::Eof => return Ok(Node::Eof),
                _ => {}
            }
        }
    }

    /// Consume the rest of the element that just started
    ///
    /// # Errors
    ///
    /// Returns a data-format error if the document ends first.
    pub fn skip_element(&mut self) -> Result<()> {
        let depth = self.depth();
        loop {
            match self.next_node()? {
                Node::End if self.depth() == depth => return Ok(()),
                Node::Eof => {
                    return Err(error::data_format(format!(
                        "document ended inside {}",
                        self.chain
                    )));
                }
                _ => {}
            }
        }
    }

    /// Chain of open elements, root first
    #[inline]
    #[must_use]
    pub fn current(&self) -> &PathChain {
        &self.chain
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Text collected so far for the innermost element
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        self.texts.last().map_or("", String::as_str)
    }

    /// Attribute of the innermost element, by local name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.chain.leaf().and_then(|leaf| leaf.predicate(name))
    }

    /// Whether the innermost element carries `marker="true"` or `marker="1"`
    #[must_use]
    pub fn is_nil(&self, marker: &str) -> bool {
        self.attribute(marker)
            .is_some_and(|value| matches!(value.trim(), "true" | "1"))
    }
}

/// Step for an opening tag: local name plus attributes, `xmlns` excluded
fn open_step(start: &BytesStart<'_>) -> Result<PathStep> {
    let qualified = start.name();
    let mut step = PathStep::new(local_name(decode(qualified.as_ref())?));

    for attribute in start.attributes() {
        let attribute = attribute.map_err(error::data_format)?;
        let key = decode(attribute.key.as_ref())?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = quick_xml::escape::unescape(decode(&attribute.value)?)
            .map_err(error::data_format)?
            .into_owned();
        step.add_predicate(local_name(&key), value);
    }

    Ok(step)
}

/// Input must be UTF-8; anything else is malformed
fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(error::data_format)
}

fn resolve_reference(name: &str) -> Result<String> {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        Some(u32::from_str_radix(hex, 16).ok())
    } else {
        name.strip_prefix('#').map(|decimal| decimal.parse::<u32>().ok())
    };

    match code {
        Some(code) => code
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| error::data_format(format!("invalid character reference &{name};"))),
        None => quick_xml::escape::resolve_predefined_entity(name)
            .map(str::to_string)
            .ok_or_else(|| error::data_format(format!("unknown entity &{name};"))),
    }
}
