//! Single location step of a path chain
//!
//! A step names one element, optionally constrains it with attribute equality
//! predicates and optionally selects one of its attributes.

use std::collections::BTreeMap;
use std::fmt;

/// One element step: name, required predicates and selected attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathStep {
    name: String,
    predicates: BTreeMap<String, String>,
    attribute: Option<String>,
}

impl PathStep {
    /// Create a step matching elements with the given local name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicates: BTreeMap::new(),
            attribute: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a required `@name='value'` predicate, replacing any previous value
    pub fn add_predicate(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.predicates.insert(name.into(), value.into());
    }

    /// Builder form of [`PathStep::add_predicate`]
    #[must_use]
    pub fn with_predicate(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_predicate(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn predicates(&self) -> &BTreeMap<String, String> {
        &self.predicates
    }

    #[inline]
    #[must_use]
    pub fn predicate(&self, name: &str) -> Option<&str> {
        self.predicates.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, attribute: Option<String>) {
        self.attribute = attribute;
    }

    /// Builder form of [`PathStep::set_attribute`]
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Number of constraints this step places on a candidate
    #[inline]
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.predicates.len() + usize::from(self.attribute.is_some())
    }

    /// Whether `candidate` satisfies this step.
    ///
    /// Names must be equal, every predicate of `self` must be present on the
    /// candidate with the same value (extra candidate predicates are ignored)
    /// and the selected attributes must be equal, including both absent.
    #[must_use]
    pub fn matches(&self, candidate: &PathStep) -> bool {
        if self.name != candidate.name {
            return false;
        }

        let predicates_hold = self
            .predicates
            .iter()
            .all(|(key, value)| candidate.predicates.get(key) == Some(value));

        predicates_hold && self.attribute == candidate.attribute
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.predicates.is_empty() {
            f.write_str("[")?;
            for (index, (key, value)) in self.predicates.iter().enumerate() {
                if index > 0 {
                    f.write_str(" and ")?;
                }
                write!(f, "@{key}={value}")?;
            }
            f.write_str("]")?;
        }

        if let Some(ref attribute) = self.attribute {
            write!(f, "/@{attribute}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_may_carry_extra_predicates() {
        let pattern = PathStep::new("item").with_predicate("type", "book");
        let candidate = PathStep::new("item")
            .with_predicate("type", "book")
            .with_predicate("lang", "en");

        assert!(pattern.matches(&candidate));
        assert!(!candidate.matches(&pattern));
    }

    #[test]
    fn test_predicate_value_must_be_equal() {
        let pattern = PathStep::new("item").with_predicate("type", "book");
        let candidate = PathStep::new("item").with_predicate("type", "film");
        assert!(!pattern.matches(&candidate));
    }

    #[test]
    fn test_attribute_selection_is_exact() {
        let plain = PathStep::new("item");
        let selected = PathStep::new("item").with_attribute("id");

        assert!(plain.matches(&PathStep::new("item")));
        assert!(!plain.matches(&selected));
        assert!(!selected.matches(&plain));
        assert!(selected.matches(&PathStep::new("item").with_attribute("id")));
        assert!(!selected.matches(&PathStep::new("item").with_attribute("ref")));
    }

    #[test]
    fn test_display_is_canonical() {
        let step = PathStep::new("item")
            .with_predicate("type", "book")
            .with_predicate("lang", "en")
            .with_attribute("id");
        assert_eq!(step.to_string(), "item[@lang=en and @type=book]/@id");
    }
}
