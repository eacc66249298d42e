use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Partial order between two vector clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOrdering {
    Before,
    After,
    Concurrent,
    Equal,
}

/// Per-node logical timestamp map. Values are non-negative integers;
/// `tick` is monotonic per node, `merge` is pointwise max, and `compare`
/// is pointwise dominance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock(BTreeMap<String, u64>);

impl VectorClock {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }

    pub fn get(&self, node: &str) -> u64 {
        self.0.get(node).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    /// Increment the counter for `node` and return the new value.
    pub fn tick(&mut self, node: &str) -> u64 {
        let entry = self.0.entry(node.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Pointwise max of two clocks; does not mutate either operand.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (node, &value) in other.0.iter() {
            let entry = merged.entry(node.clone()).or_insert(0);
            *entry = (*entry).max(value);
        }
        Self(merged)
    }

    /// True if `self` dominates `other`: every entry of self is >= the
    /// corresponding entry of other, over the union of both key sets.
    pub fn dominates(&self, other: &Self) -> bool {
        let keys = self.0.keys().chain(other.0.keys());
        keys.into_iter().all(|k| self.get(k) >= other.get(k))
    }

    pub fn compare(&self, other: &Self) -> ClockOrdering {
        if self == other {
            return ClockOrdering::Equal;
        }
        let self_dominates = self.dominates(other);
        let other_dominates = other.dominates(self);
        match (self_dominates, other_dominates) {
            (true, true) => ClockOrdering::Equal,
            (true, false) => ClockOrdering::After,
            (false, true) => ClockOrdering::Before,
            (false, false) => ClockOrdering::Concurrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_clock_compares_equal() {
        let mut a = VectorClock::new();
        a.tick("n1");
        assert_eq!(a.compare(&a.clone()), ClockOrdering::Equal);
    }

    #[test]
    fn tick_makes_self_after() {
        let mut a = VectorClock::new();
        a.tick("n1");
        let mut b = a.clone();
        a.tick("n1");
        assert_eq!(a.compare(&b), ClockOrdering::After);
        assert_eq!(b.compare(&a), ClockOrdering::Before);
        b.tick("n1");
        assert_eq!(a.compare(&b), ClockOrdering::Equal);
    }

    #[test]
    fn merge_dominates_both_inputs() {
        let mut a = VectorClock::new();
        a.tick("n1");
        let mut b = VectorClock::new();
        b.tick("n2");
        let merged = a.merge(&b);
        assert!(merged.dominates(&a));
        assert!(merged.dominates(&b));
    }

    #[test]
    fn disjoint_nodes_are_concurrent() {
        let mut a = VectorClock::new();
        a.tick("n1");
        let mut b = VectorClock::new();
        b.tick("n2");
        assert_eq!(a.compare(&b), ClockOrdering::Concurrent);
    }
}
