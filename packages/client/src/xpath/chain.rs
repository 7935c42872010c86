//! Root-to-leaf chains of path steps
//!
//! Chains are immutable values: equality and hashing cover every step, so two
//! chains ending in the same leaf under different prefixes stay distinct keys.

use std::fmt;

use super::step::PathStep;

/// An ordered root-to-leaf sequence of [`PathStep`]s
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathChain {
    steps: Vec<PathStep>,
    relative: bool,
}

impl PathChain {
    /// Chain anchored at the document root
    #[must_use]
    pub fn absolute(steps: Vec<PathStep>) -> Self {
        Self {
            steps,
            relative: false,
        }
    }

    /// Chain to be spliced under a binding root before use
    #[must_use]
    pub fn relative(steps: Vec<PathStep>) -> Self {
        Self {
            steps,
            relative: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Chain without its leaf step, or `None` for a single-step chain
    #[must_use]
    pub fn parent(&self) -> Option<PathChain> {
        if self.steps.len() < 2 {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
            relative: self.relative,
        })
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// Copy of this chain placed under `root`.
    ///
    /// The result is absolute when `root` is; `self` is left untouched so one
    /// relative prototype can be spliced under several alternative roots.
    #[must_use]
    pub fn under(&self, root: &PathChain) -> PathChain {
        let mut steps = Vec::with_capacity(root.len() + self.len());
        steps.extend(root.steps.iter().cloned());
        steps.extend(self.steps.iter().cloned());
        Self {
            steps,
            relative: root.relative,
        }
    }

    /// Copy of this chain whose leaf selects `attribute`
    #[must_use]
    pub fn selecting(&self, attribute: &str) -> PathChain {
        let mut chain = self.clone();
        if let Some(leaf) = chain.steps.last_mut() {
            leaf.set_attribute(Some(attribute.to_string()));
        }
        chain
    }

    /// Whether `candidate` is matched by this chain step for step.
    ///
    /// Both chains must have the same length; the walk runs from the leaf back
    /// to the root so mismatches near the cursor are found first.
    #[must_use]
    pub fn matches(&self, candidate: &PathChain) -> bool {
        self.steps.len() == candidate.steps.len()
            && self
                .steps
                .iter()
                .rev()
                .zip(candidate.steps.iter().rev())
                .all(|(pattern, step)| pattern.matches(step))
    }

    /// Sum of the constraints of every step
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.steps.iter().map(PathStep::specificity).sum()
    }
}

impl fmt::Display for PathChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 || !self.relative {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
