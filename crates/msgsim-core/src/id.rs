//! Strongly-typed node identifier.

use std::fmt;

/// Identifies a node (processor) within a simulated network.
///
/// Ids are dense: a network of `n` nodes uses `NodeId(0)..NodeId(n - 1)`.
/// An id is assigned once at construction and never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The id as a `usize` index into per-node tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_raw_value() {
        assert_eq!(NodeId(7).index(), 7);
        assert_eq!(NodeId::from(3u32), NodeId(3));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(NodeId(42).to_string(), "42");
    }

    #[test]
    fn ordering_follows_raw_value() {
        let mut ids = vec![NodeId(3), NodeId(0), NodeId(2)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(0), NodeId(2), NodeId(3)]);
    }
}
