//! Pattern index mapping absolute chains to payloads
//!
//! Lookups are bucketed by chain length and leaf name, then scanned with the
//! step-level predicate test; exact keys live in a hash map for `put`/`remove`.

use hashbrown::HashMap;

use super::chain::PathChain;

struct Record<V> {
    value: V,
    order: u64,
}

/// Map from compiled [`PathChain`]s to arbitrary payloads
pub struct XPathRepository<V> {
    entries: HashMap<PathChain, Record<V>>,
    buckets: HashMap<(usize, String), Vec<PathChain>>,
    next_order: u64,
}

impl<V> Default for XPathRepository<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> XPathRepository<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            buckets: HashMap::new(),
            next_order: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `value` under `chain`, returning the value it replaced
    pub fn put(&mut self, chain: PathChain, value: V) -> Option<V> {
        if let Some(record) = self.entries.get_mut(&chain) {
            return Some(std::mem::replace(&mut record.value, value));
        }

        if let Some(key) = bucket_key(&chain) {
            self.buckets.entry(key).or_default().push(chain.clone());
        }
        let order = self.next_order;
        self.next_order += 1;
        self.entries.insert(chain, Record { value, order });
        None
    }

    /// Remove the entry stored under exactly `chain`
    pub fn remove(&mut self, chain: &PathChain) -> Option<V> {
        let record = self.entries.remove(chain)?;
        if let Some(key) = bucket_key(chain)
            && let Some(bucket) = self.buckets.get_mut(&key)
        {
            bucket.retain(|stored| stored != chain);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        Some(record.value)
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, chain: &PathChain) -> bool {
        self.entries.contains_key(chain)
    }

    /// Payload whose stored chain matches `candidate`
    #[must_use]
    pub fn get(&self, candidate: &PathChain) -> Option<&V> {
        self.get_full_record(candidate).map(|(_, value)| value)
    }

    /// Stored `(chain, payload)` pair matching `candidate` step for step.
    ///
    /// When several stored chains match, the most constrained one wins and
    /// ties go to the earliest registration.
    #[must_use]
    pub fn get_full_record(&self, candidate: &PathChain) -> Option<(&PathChain, &V)> {
        let key = bucket_key(candidate)?;
        let bucket = self.buckets.get(&key)?;

        bucket
            .iter()
            .filter(|stored| stored.matches(candidate))
            .filter_map(|stored| self.entries.get_key_value(stored))
            .min_by(|(left_chain, left), (right_chain, right)| {
                right_chain
                    .specificity()
                    .cmp(&left_chain.specificity())
                    .then(left.order.cmp(&right.order))
            })
            .map(|(chain, record)| (chain, &record.value))
    }

    /// Stored chains in registration order
    #[must_use]
    pub fn keys(&self) -> Vec<&PathChain> {
        let mut keys: Vec<(&PathChain, u64)> = self
            .entries
            .iter()
            .map(|(chain, record)| (chain, record.order))
            .collect();
        keys.sort_by_key(|(_, order)| *order);
        keys.into_iter().map(|(chain, _)| chain).collect()
    }
}

fn bucket_key(chain: &PathChain) -> Option<(usize, String)> {
    chain.leaf().map(|leaf| (chain.len(), leaf.name().to_string()))
}
