//! Single-object materialization
//!
//! A [`Parser`] owns the compiled pattern table of one target type. Each
//! parse call walks the event stream in three phases: it skips ahead until
//! a root chain matches, fills a fresh instance while inside the root, and
//! returns the instance at the root's end tag.

use std::any::Any;
use std::io::BufRead;
use std::sync::Arc;

use dashmap::DashMap;

use super::declaration::{BindingKind, Declaration, FieldDeclaration, XmlObject};
use super::events::{NIL_ATTRIBUTE, Node, XmlEvents};
use crate::error::{self, Result};
use crate::xpath::{PathChain, Pattern, XPathParser, XPathRepository};

pub(crate) struct FieldBinding<T> {
    field: &'static str,
    kind: BindingKind<T>,
    nil_attribute: Option<String>,
}

impl<T> FieldBinding<T> {
    fn nil_marker(&self) -> &str {
        self.nil_attribute.as_deref().unwrap_or(NIL_ATTRIBUTE)
    }
}

/// Parsers for nested types, keyed by the absolute chain they are rooted at
#[derive(Default)]
pub(crate) struct NestedParsers {
    parsers: DashMap<PathChain, Arc<dyn Any + Send + Sync>>,
}

impl NestedParsers {
    /// Cached parser for `U` rooted at `chain`, built on first request
    pub(crate) fn get_or_build<U: XmlObject>(&self, chain: &PathChain) -> Result<Arc<Parser<U>>> {
        let entry = self
            .parsers
            .entry(chain.clone())
            .or_try_insert_with(|| {
                tracing::debug!(
                    target: "xsoap::engine",
                    nested_type = std::any::type_name::<U>(),
                    root = %chain,
                    "Building nested parser"
                );
                Parser::<U>::with_roots(vec![chain.clone()])
                    .map(|parser| Arc::new(parser) as Arc<dyn Any + Send + Sync>)
            })?;
        let cached = Arc::clone(entry.value());
        drop(entry);

        cached.downcast::<Parser<U>>().map_err(|_| {
            error::configuration(format!(
                "chain {chain} is already bound to a parser for another type"
            ))
        })
    }

    fn len(&self) -> usize {
        self.parsers.len()
    }
}

/// Compiled pattern table and constructor for `T`
pub struct Parser<T> {
    type_name: &'static str,
    root_chains: Vec<PathChain>,
    roots: XPathRepository<()>,
    fields: XPathRepository<Arc<FieldBinding<T>>>,
    selects_attributes: bool,
    constructor: fn() -> T,
    nested: NestedParsers,
}

impl<T: XmlObject> Parser<T> {
    /// Build a parser rooted at the roots `T` declares
    ///
    /// # Errors
    ///
    /// Returns a configuration error for missing roots or constructor,
    /// unparsable patterns, unsupported field types and duplicate bindings.
    pub fn new() -> Result<Self> {
        let decl = declare::<T>();
        if decl.roots.is_empty() {
            return Err(error::configuration(format!(
                "{} declares no root pattern",
                std::any::type_name::<T>()
            )));
        }

        let mut roots = Vec::with_capacity(decl.roots.len());
        for pattern in &decl.roots {
            let chain = XPathParser::compile_root(pattern)?;
            if !roots.contains(&chain) {
                roots.push(chain);
            }
        }
        Self::build(decl, roots)
    }

    /// Build a parser rooted at `roots` instead of the declared roots
    ///
    /// # Errors
    ///
    /// Same as [`Parser::new`], plus an error when `roots` is empty.
    pub fn with_roots(roots: Vec<PathChain>) -> Result<Self> {
        if roots.is_empty() || roots.iter().any(|root| root.is_relative() || root.is_empty()) {
            return Err(error::configuration(format!(
                "{} needs at least one absolute root chain",
                std::any::type_name::<T>()
            )));
        }
        Self::build(declare::<T>(), roots)
    }

    fn build(decl: Declaration<T>, root_chains: Vec<PathChain>) -> Result<Self> {
        let type_name = std::any::type_name::<T>();
        let constructor = decl.constructor.ok_or_else(|| {
            error::configuration(format!("{type_name} declares no constructor"))
        })?;

        let mut roots = XPathRepository::new();
        for root in &root_chains {
            roots.put(root.clone(), ());
        }

        let mut fields: XPathRepository<Arc<FieldBinding<T>>> = XPathRepository::new();
        let mut selects_attributes = false;

        for FieldDeclaration {
            field,
            pattern,
            value_type,
            kind,
            nil_attribute,
        } in decl.fields
        {
            if let BindingKind::Text(text) = &kind
                && text.kind.is_none()
                && !text.transformed
            {
                return Err(error::configuration(format!(
                    "field `{field}` of {type_name} has type {value_type} with no text coercion and no transform"
                )));
            }

            let compiled = XPathParser::compile(&pattern)?;
            if matches!(compiled, Pattern::RootAttribute(_)) {
                selects_attributes = true;
            }

            let resolved = compiled.resolve(&root_chains);
            if matches!(kind, BindingKind::Object(_))
                && !resolved.iter().all(|chain| is_below_root(chain, &root_chains))
            {
                return Err(error::configuration(format!(
                    "object field `{field}` of {type_name} must select an element below the root, got `{pattern}`"
                )));
            }

            let binding = Arc::new(FieldBinding {
                field,
                kind,
                nil_attribute,
            });

            for chain in resolved {
                selects_attributes |= chain.leaf().and_then(|leaf| leaf.attribute()).is_some();
                if let Some(other) = fields.put(chain.clone(), Arc::clone(&binding)) {
                    return Err(error::configuration(format!(
                        "fields `{}` and `{field}` of {type_name} both bind {chain}",
                        other.field
                    )));
                }
            }
        }

        tracing::debug!(
            target: "xsoap::engine",
            type_name,
            roots = root_chains.len(),
            patterns = fields.len(),
            "Compiled pattern table"
        );

        Ok(Self {
            type_name,
            root_chains,
            roots,
            fields,
            selects_attributes,
            constructor,
            nested: NestedParsers::default(),
        })
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[PathChain] {
        &self.root_chains
    }

    /// Absolute chains of the pattern table, in registration order
    #[must_use]
    pub fn patterns(&self) -> Vec<&PathChain> {
        self.fields.keys()
    }

    /// Field bound at exactly `chain`, if any
    #[must_use]
    pub fn field_at(&self, chain: &PathChain) -> Option<&'static str> {
        self.fields.get(chain).map(|binding| binding.field)
    }

    /// Whether `chain` is one of this parser's roots
    #[inline]
    #[must_use]
    pub fn is_root(&self, chain: &PathChain) -> bool {
        self.roots.get(chain).is_some()
    }

    /// Number of nested parsers built so far
    #[must_use]
    pub fn nested_count(&self) -> usize {
        self.nested.len()
    }

    /// Parser used for nested objects rooted at `chain`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `U` cannot be compiled or `chain` is
    /// already cached for a different type.
    pub fn nested_parser<U: XmlObject>(&self, chain: &PathChain) -> Result<Arc<Parser<U>>> {
        self.nested.get_or_build::<U>(chain)
    }

    /// Parse the first element matching a root out of `source`
    ///
    /// # Errors
    ///
    /// Returns a data-format error for malformed XML, a document without a
    /// matching root, premature end of input or text that fails coercion.
    pub fn parse(&self, source: &mut dyn BufRead) -> Result<T> {
        let mut events = XmlEvents::new(source);
        self.parse_events(&mut events)
    }

    /// Convenience wrapper over [`Parser::parse`]
    ///
    /// # Errors
    ///
    /// See [`Parser::parse`].
    pub fn parse_str(&self, xml: &str) -> Result<T> {
        let mut source = xml.as_bytes();
        self.parse(&mut source)
    }

    /// Skip ahead to the next root and materialize it
    ///
    /// # Errors
    ///
    /// See [`Parser::parse`].
    pub fn parse_events(&self, events: &mut XmlEvents<'_>) -> Result<T> {
        loop {
            match events.next_node()? {
                Node::Start if self.is_root(events.current()) => return self.parse_here(events),
                Node::Eof => {
                    return Err(error::data_format(format!(
                        "no element matched a root of {}",
                        self.type_name
                    )));
                }
                _ => {}
            }
        }
    }

    /// Whether `body` contains an element matching one of the roots
    #[must_use]
    pub fn matches_document(&self, body: &[u8]) -> bool {
        let mut source = body;
        let mut events = XmlEvents::new(&mut source);
        loop {
            match events.next_node() {
                Ok(Node::Start) if self.is_root(events.current()) => return true,
                Ok(Node::Eof) | Err(_) => return false,
                Ok(_) => {}
            }
        }
    }

    /// Materialize the element the cursor just opened
    pub(crate) fn parse_here(&self, events: &mut XmlEvents<'_>) -> Result<T> {
        let mut object = (self.constructor)();
        let depth = events.depth();
        let mut pending: Vec<(usize, Arc<FieldBinding<T>>)> = Vec::new();

        tracing::trace!(
            target: "xsoap::engine",
            type_name = self.type_name,
            root = %events.current(),
            "Root matched"
        );

        self.on_start(events, &mut object, &mut pending, true)?;

        loop {
            match events.next_node()? {
                Node::Start => self.on_start(events, &mut object, &mut pending, false)?,
                Node::End => {
                    if pending.last().is_some_and(|(at, _)| *at == events.depth())
                        && let Some((_, binding)) = pending.pop()
                        && let BindingKind::Text(text) = &binding.kind
                    {
                        text.apply(&mut object, events.text())?;
                    }
                    if events.depth() == depth {
                        return Ok(object);
                    }
                }
                Node::Eof => {
                    return Err(error::data_format(format!(
                        "document ended inside {} while reading {}",
                        events.current(),
                        self.type_name
                    )));
                }
            }
        }
    }

    fn on_start(
        &self,
        events: &mut XmlEvents<'_>,
        object: &mut T,
        pending: &mut Vec<(usize, Arc<FieldBinding<T>>)>,
        at_root: bool,
    ) -> Result<()> {
        if self.selects_attributes {
            self.apply_attributes(events, object)?;
        }

        let Some((chain, binding)) = self.fields.get_full_record(events.current()) else {
            return Ok(());
        };
        let nil = events.is_nil(binding.nil_marker());

        match &binding.kind {
            BindingKind::Text(text) if nil => {
                if !text.apply_nil(object) {
                    tracing::trace!(
                        target: "xsoap::engine",
                        field = binding.field,
                        "Nil element for a field without a null value"
                    );
                }
            }
            BindingKind::Text(_) => pending.push((events.depth(), Arc::clone(binding))),
            // Looser absolute chains can still match the root; never re-enter it
            BindingKind::Object(_) if at_root => {}
            BindingKind::Object(_) if nil => events.skip_element()?,
            BindingKind::Object(nested) => {
                tracing::trace!(
                    target: "xsoap::engine",
                    field = binding.field,
                    nested_type = nested.type_name,
                    at = %chain,
                    "Delegating subtree"
                );
                nested.delegate(&self.nested, chain, events, object)?;
            }
        }

        Ok(())
    }

    fn apply_attributes(&self, events: &XmlEvents<'_>, object: &mut T) -> Result<()> {
        let current = events.current();
        let Some(leaf) = current.leaf() else {
            return Ok(());
        };

        for (name, value) in leaf.predicates() {
            if let Some(binding) = self.fields.get(&current.selecting(name))
                && let BindingKind::Text(text) = &binding.kind
            {
                text.apply(object, value)?;
            }
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("type_name", &self.type_name)
            .field("roots", &self.root_chains.len())
            .field("patterns", &self.fields.len())
            .field("nested", &self.nested.len())
            .finish_non_exhaustive()
    }
}

/// Whether `chain` names an element other than one of the roots
fn is_below_root(chain: &PathChain, roots: &[PathChain]) -> bool {
    !roots.contains(chain) && chain.leaf().is_some_and(|leaf| leaf.attribute().is_none())
}

fn declare<T: XmlObject>() -> Declaration<T> {
    let mut decl = Declaration::new();
    T::declare(&mut decl);
    decl
}
