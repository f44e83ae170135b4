//! Online maximum spanning tree construction for the Physalia
//! similarity-network toolkit.
//!
//! Ingests weighted links between nodes in arbitrary order and maintains
//! a spanning forest that always keeps the heavier edge on any cycle,
//! plus the post-processing views downstream tooling consumes: the
//! low-confidence ("twilight") node list, a score-ordered children map,
//! root selection, JSON snapshots and ASCII rendering.
//!
//! # Quick start
//!
//! ```
//! use physalia_tree::MaxSpanningTree;
//!
//! let mut tree = MaxSpanningTree::new(5);
//! tree.add_link(1, 2, 10, 10, 0, 0).unwrap();
//! tree.add_link(2, 3, 20, 20, 0, 0).unwrap();
//! // Closing the cycle with a weaker edge leaves the tree unchanged.
//! assert!(!tree.add_link(1, 3, 5, 5, 0, 0).unwrap());
//! assert_eq!(tree.links_rejected(), 1);
//! ```

pub mod drawing;
pub mod snapshot;
pub mod spanning;

pub use drawing::{write_ascii_tree, AsciiTreeOptions};
pub use snapshot::TreeSnapshot;
pub use spanning::{Link, MaxSpanningTree, NodeId, DEFAULT_TWILIGHT_THRESHOLD};
