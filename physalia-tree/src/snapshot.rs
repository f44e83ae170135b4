//! JSON snapshots of a spanning tree.
//!
//! The snapshot captures the builder's counters and per-node arrays plus
//! the derived views (twilight list, root, children map) in one
//! serializable object, so downstream tooling can consume a finished
//! tree without re-running ingestion. Field order below is the wire
//! order.

use std::io::{Read, Write};

use physalia_core::{PhysaliaError, Result};
use serde::{Deserialize, Serialize};

use crate::spanning::{MaxSpanningTree, NodeId};

/// Serializable snapshot of a [`MaxSpanningTree`].
///
/// The per-node arrays run over the full capacity; `children` only
/// covers ids up to `max_seen_id`, each list sorted by child score
/// descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub links_processed: u64,
    pub links_added: u64,
    pub links_rejected: u64,
    pub max_seen_id: NodeId,
    pub parents: Vec<NodeId>,
    pub scores: Vec<i32>,
    pub raw_scores: Vec<i32>,
    pub locations: Vec<i32>,
    pub lengths: Vec<i32>,
    pub twilight_nodes: Vec<NodeId>,
    pub root: NodeId,
    pub children: Vec<Vec<NodeId>>,
}

impl TreeSnapshot {
    /// Serialize as pretty-printed JSON.
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PhysaliaError::Other(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let snapshot: TreeSnapshot =
            serde_json::from_reader(reader).map_err(|e| PhysaliaError::Parse(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        let n = self.parents.len();
        if self.scores.len() != n
            || self.raw_scores.len() != n
            || self.locations.len() != n
            || self.lengths.len() != n
        {
            return Err(PhysaliaError::Parse(
                "snapshot arrays have mismatched lengths".into(),
            ));
        }
        if self.parents.iter().any(|&p| p >= n) {
            return Err(PhysaliaError::Parse(
                "snapshot parent id out of range".into(),
            ));
        }
        Ok(())
    }
}

impl MaxSpanningTree {
    /// Capture the current tree state, computing the derived views with
    /// the given twilight threshold.
    pub fn snapshot(&self, twilight_threshold: i32) -> TreeSnapshot {
        TreeSnapshot {
            links_processed: self.links_processed(),
            links_added: self.links_added(),
            links_rejected: self.links_rejected(),
            max_seen_id: self.max_seen_id(),
            parents: self.parents.clone(),
            scores: self.scores.clone(),
            raw_scores: self.raw_scores.clone(),
            locations: self.locations.clone(),
            lengths: self.lengths.clone(),
            twilight_nodes: self.twilight_nodes(twilight_threshold),
            root: self.find_root(),
            children: self.children_map(),
        }
    }

    /// Rebuild a tree from a previously captured snapshot. The restored
    /// builder continues accepting links where the snapshot left off.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot's arrays are inconsistent.
    pub fn from_snapshot(snapshot: &TreeSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let mut tree = MaxSpanningTree::new(snapshot.parents.len());
        tree.parents.copy_from_slice(&snapshot.parents);
        tree.scores.copy_from_slice(&snapshot.scores);
        tree.raw_scores.copy_from_slice(&snapshot.raw_scores);
        tree.locations.copy_from_slice(&snapshot.locations);
        tree.lengths.copy_from_slice(&snapshot.lengths);
        tree.max_seen_id = snapshot.max_seen_id.min(tree.capacity().saturating_sub(1));
        tree.links_processed = snapshot.links_processed;
        tree.links_added = snapshot.links_added;
        tree.links_rejected = snapshot.links_rejected;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spanning::DEFAULT_TWILIGHT_THRESHOLD;

    fn sample_tree() -> MaxSpanningTree {
        let mut tree = MaxSpanningTree::new(6);
        tree.add_link(1, 2, 350, 350, 10, 100).unwrap();
        tree.add_link(2, 3, 120, 120, 20, 200).unwrap();
        tree.add_link(4, 3, 80, 80, 30, 300).unwrap();
        tree
    }

    #[test]
    fn snapshot_captures_counters_and_views() {
        let tree = sample_tree();
        let snapshot = tree.snapshot(DEFAULT_TWILIGHT_THRESHOLD);

        assert_eq!(snapshot.links_processed, 3);
        assert_eq!(snapshot.links_added, 3);
        assert_eq!(snapshot.links_rejected, 0);
        assert_eq!(snapshot.max_seen_id, 4);
        assert_eq!(snapshot.parents.len(), 6);
        assert_eq!(snapshot.twilight_nodes, vec![2, 4]);
        assert_eq!(snapshot.root, tree.find_root());
        assert_eq!(snapshot.children, tree.children_map());
    }

    #[test]
    fn json_keys_keep_wire_order() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        tree.snapshot(DEFAULT_TWILIGHT_THRESHOLD)
            .to_json_writer(&mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();

        let keys = [
            "links_processed",
            "links_added",
            "links_rejected",
            "max_seen_id",
            "parents",
            "scores",
            "raw_scores",
            "locations",
            "lengths",
            "twilight_nodes",
            "root",
            "children",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| text.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn round_trip_through_json() {
        let tree = sample_tree();
        let snapshot = tree.snapshot(DEFAULT_TWILIGHT_THRESHOLD);

        let mut buf = Vec::new();
        snapshot.to_json_writer(&mut buf).unwrap();
        let restored = TreeSnapshot::from_json_reader(buf.as_slice()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn restored_tree_keeps_accepting_links() {
        let tree = sample_tree();
        let snapshot = tree.snapshot(DEFAULT_TWILIGHT_THRESHOLD);

        let mut restored = MaxSpanningTree::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.parents(), tree.parents());
        assert_eq!(restored.links_processed(), 3);

        // The restored builder behaves like the original would.
        assert!(!restored.add_link(1, 3, 50, 50, 0, 0).unwrap());
        assert_eq!(restored.links_rejected(), 1);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let tree = sample_tree();
        let mut snapshot = tree.snapshot(DEFAULT_TWILIGHT_THRESHOLD);
        snapshot.scores.pop();
        assert!(MaxSpanningTree::from_snapshot(&snapshot).is_err());
    }
}
