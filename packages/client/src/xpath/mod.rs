//! Constrained XPath model for streaming matches
//!
//! Only ancestor-chain element names, attribute equality predicates and a
//! trailing attribute selector are supported. Patterns are compiled once and
//! matched against the live element stack of a parse.

pub mod chain;
pub mod compiler;
pub mod repository;
pub mod step;

pub use chain::PathChain;
pub use compiler::{Pattern, PatternError, XPathParser};
pub use repository::XPathRepository;
pub use step::PathStep;

/// Strip a namespace prefix from a qualified name
#[inline]
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl From<PatternError> for crate::error::Error {
    fn from(err: PatternError) -> Self {
        crate::error::configuration(err)
    }
}
