//! Per-type binding declarations
//!
//! A target type describes itself once through [`XmlObject::declare`]. The
//! collected patterns and setters are compiled into a pattern table by
//! [`Parser`](super::Parser), which rejects anything it cannot honour before
//! a single document is read.

use std::sync::Arc;

use super::coercion::{ScalarKind, XmlValue};
use super::engine::NestedParsers;
use super::events::XmlEvents;
use crate::error::{self, BoxError, Result};
use crate::xpath::PathChain;

/// A type that can be materialized from XML
pub trait XmlObject: Sized + Send + 'static {
    fn declare(decl: &mut Declaration<Self>);
}

pub(crate) type TextApply<T> = Box<dyn Fn(&mut T, &str) -> Result<()> + Send + Sync>;
pub(crate) type NilApply<T> = Box<dyn Fn(&mut T) -> bool + Send + Sync>;
pub(crate) type Delegate<T> =
    Box<dyn Fn(&NestedParsers, &PathChain, &mut XmlEvents<'_>, &mut T) -> Result<()> + Send + Sync>;

/// Setter for a field filled from element or attribute text
pub(crate) struct TextBinding<T> {
    pub(crate) kind: Option<ScalarKind>,
    pub(crate) transformed: bool,
    apply: TextApply<T>,
    nil: NilApply<T>,
}

impl<T> TextBinding<T> {
    /// Store `raw` into the field; empty text leaves the field untouched
    pub(crate) fn apply(&self, target: &mut T, raw: &str) -> Result<()> {
        let text = match self.kind {
            Some(kind) if !self.transformed && !kind.trims_text() => raw,
            _ => raw.trim(),
        };
        if text.is_empty() {
            return Ok(());
        }
        (self.apply)(target, text)
    }

    /// Store the null-equivalent; returns false when the field has none
    pub(crate) fn apply_nil(&self, target: &mut T) -> bool {
        (self.nil)(target)
    }
}

/// Hand-off of a subtree to the parser of a nested type
pub(crate) struct ObjectBinding<T> {
    pub(crate) type_name: &'static str,
    delegate: Delegate<T>,
}

impl<T> ObjectBinding<T> {
    pub(crate) fn delegate(
        &self,
        nested: &NestedParsers,
        chain: &PathChain,
        events: &mut XmlEvents<'_>,
        target: &mut T,
    ) -> Result<()> {
        (self.delegate)(nested, chain, events, target)
    }
}

pub(crate) enum BindingKind<T> {
    Text(TextBinding<T>),
    Object(ObjectBinding<T>),
}

pub(crate) struct FieldDeclaration<T> {
    pub(crate) field: &'static str,
    pub(crate) pattern: String,
    pub(crate) value_type: &'static str,
    pub(crate) kind: BindingKind<T>,
    pub(crate) nil_attribute: Option<String>,
}

/// Root patterns, constructor and field bindings of one target type
pub struct Declaration<T> {
    pub(crate) roots: Vec<String>,
    pub(crate) constructor: Option<fn() -> T>,
    pub(crate) fields: Vec<FieldDeclaration<T>>,
}

impl<T: 'static> Declaration<T> {
    pub(crate) fn new() -> Self {
        Self {
            roots: Vec::new(),
            constructor: None,
            fields: Vec::new(),
        }
    }

    /// Add an absolute root pattern; repeat for alternative roots
    pub fn root(&mut self, pattern: &str) -> &mut Self {
        self.roots.push(pattern.to_string());
        self
    }

    /// Zero-argument constructor for fresh instances
    pub fn constructor(&mut self, constructor: fn() -> T) -> &mut Self {
        self.constructor = Some(constructor);
        self
    }

    /// Bind a scalar field coerced by its [`ScalarKind`].
    ///
    /// List fields of scalars bind with an appending setter.
    pub fn text<V, S>(&mut self, field: &'static str, pattern: &str, setter: S) -> &mut Self
    where
        V: XmlValue,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter = Arc::new(setter);
        let nil_setter = Arc::clone(&setter);

        let apply: TextApply<T> = Box::new(move |target, text| {
            let kind = V::kind().ok_or_else(|| {
                error::configuration(format!("field `{field}` has no text coercion"))
            })?;
            let value = kind.coerce(text)?;
            let typed = V::from_value(value).ok_or_else(|| {
                error::data_format(format!("field `{field}` cannot hold a {kind:?} value"))
            })?;
            setter(target, typed);
            Ok(())
        });

        self.push_text::<V>(field, pattern, V::kind(), false, apply, nil_setter)
    }

    /// Bind a field whose text goes through a custom transform
    pub fn text_with<V, X, E, S>(
        &mut self,
        field: &'static str,
        pattern: &str,
        transform: X,
        setter: S,
    ) -> &mut Self
    where
        V: XmlValue,
        X: Fn(&str) -> std::result::Result<V, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter = Arc::new(setter);
        let nil_setter = Arc::clone(&setter);

        let apply: TextApply<T> = Box::new(move |target, text| {
            let value = transform(text).map_err(error::data_format)?;
            setter(target, value);
            Ok(())
        });

        self.push_text::<V>(field, pattern, V::kind(), true, apply, nil_setter)
    }

    /// Bind a nested object; list fields bind with an appending setter
    pub fn object<U, S>(&mut self, field: &'static str, pattern: &str, setter: S) -> &mut Self
    where
        U: XmlObject,
        S: Fn(&mut T, U) + Send + Sync + 'static,
    {
        let delegate: Delegate<T> = Box::new(move |nested, chain, events, target| {
            let parser = nested.get_or_build::<U>(chain)?;
            let value = parser.parse_here(events)?;
            setter(target, value);
            Ok(())
        });

        self.fields.push(FieldDeclaration {
            field,
            pattern: pattern.to_string(),
            value_type: std::any::type_name::<U>(),
            kind: BindingKind::Object(ObjectBinding {
                type_name: std::any::type_name::<U>(),
                delegate,
            }),
            nil_attribute: None,
        });
        self
    }

    /// Use attribute `name` as the nil marker of the most recent field
    pub fn nil_attribute(&mut self, name: &str) -> &mut Self {
        if let Some(last) = self.fields.last_mut() {
            last.nil_attribute = Some(crate::xpath::local_name(name).to_string());
        }
        self
    }

    fn push_text<V: XmlValue>(
        &mut self,
        field: &'static str,
        pattern: &str,
        kind: Option<ScalarKind>,
        transformed: bool,
        apply: TextApply<T>,
        setter: Arc<dyn Fn(&mut T, V) + Send + Sync>,
    ) -> &mut Self {
        let nil: NilApply<T> = Box::new(move |target| match V::null() {
            Some(null) => {
                setter(target, null);
                true
            }
            None => false,
        });

        self.fields.push(FieldDeclaration {
            field,
            pattern: pattern.to_string(),
            value_type: std::any::type_name::<V>(),
            kind: BindingKind::Text(TextBinding {
                kind,
                transformed,
                apply,
                nil,
            }),
            nil_attribute: None,
        });
        self
    }
}
