//! Online maximum spanning tree over weighted similarity links.
//!
//! Uses parallel-array storage: node `v`'s incoming edge lives at index
//! `v` of `parents`/`scores`/`raw_scores`/`locations`/`lengths`. Node 0
//! is a reserved sentinel: parents default to it, every upward walk
//! terminates there, and it doubles as the synthetic super-root joining
//! all components. A node is attached iff its score is non-negative; a
//! node whose parent is itself is an explicitly detached self-root.
//!
//! Links arrive in arbitrary order. Each candidate edge closes a cycle
//! with the unique tree path between its endpoints; the lowest-scored
//! edge on that cycle is dropped, so the retained tree always keeps the
//! heavier edge between any pair of connected nodes.

use std::mem;

use physalia_core::{PhysaliaError, Result};

/// Index into the builder's node arrays.
pub type NodeId = usize;

/// Score below which an attached node counts as low-confidence.
pub const DEFAULT_TWILIGHT_THRESHOLD: i32 = 300;

/// One attached edge, child side, as reported by [`MaxSpanningTree::sorted_links`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub child: NodeId,
    pub parent: NodeId,
    pub score: i32,
    pub raw_score: i32,
    pub location: i32,
    pub length: i32,
}

/// Which cycle edge lost the weakest-link scan.
enum Weakest {
    /// The candidate edge itself: reject it.
    New,
    /// The edge at this position of the walk path from endpoint `a`.
    SideA(usize),
    /// The edge at this position of the walk path from endpoint `b`.
    SideB(usize),
}

/// An online maximum spanning tree with fixed node capacity.
#[derive(Debug, Clone)]
pub struct MaxSpanningTree {
    pub(crate) parents: Vec<NodeId>,
    pub(crate) scores: Vec<i32>,
    pub(crate) raw_scores: Vec<i32>,
    pub(crate) locations: Vec<i32>,
    pub(crate) lengths: Vec<i32>,

    pub(crate) max_seen_id: NodeId,
    pub(crate) links_processed: u64,
    pub(crate) links_added: u64,
    pub(crate) links_rejected: u64,

    // Walk state, reused across calls. Stamps carry the search
    // generation so stale entries from prior walks are ignored without
    // clearing; the u64 generation cannot wrap over a builder lifetime.
    search_id: u64,
    stamp_a: Vec<u64>,
    stamp_b: Vec<u64>,
    pos_a: Vec<usize>,
    pos_b: Vec<usize>,
    path_a: Vec<NodeId>,
    path_b: Vec<NodeId>,
}

impl MaxSpanningTree {
    /// Create a builder for node ids in `[0, capacity)`. All arrays are
    /// allocated once, up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            parents: vec![0; capacity],
            scores: vec![-1; capacity],
            raw_scores: vec![-1; capacity],
            locations: vec![-1; capacity],
            lengths: vec![-1; capacity],
            max_seen_id: 0,
            links_processed: 0,
            links_added: 0,
            links_rejected: 0,
            search_id: 0,
            stamp_a: vec![0; capacity],
            stamp_b: vec![0; capacity],
            pos_a: vec![0; capacity],
            pos_b: vec![0; capacity],
            path_a: Vec::new(),
            path_b: Vec::new(),
        }
    }

    /// Maximum number of nodes this builder can hold.
    pub fn capacity(&self) -> usize {
        self.parents.len()
    }

    /// Largest node id referenced so far.
    pub fn max_seen_id(&self) -> NodeId {
        self.max_seen_id
    }

    /// Number of links offered via [`add_link`](Self::add_link),
    /// including self-loops.
    pub fn links_processed(&self) -> u64 {
        self.links_processed
    }

    /// Number of links accepted into the tree.
    pub fn links_added(&self) -> u64 {
        self.links_added
    }

    /// Number of links rejected for being the weakest edge on their cycle.
    pub fn links_rejected(&self) -> u64 {
        self.links_rejected
    }

    /// Parent of each node (0 when unset).
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Score of each node's edge to its parent (-1 when unset).
    pub fn scores(&self) -> &[i32] {
        &self.scores
    }

    /// Unadjusted score of each node's edge (-1 when unset).
    pub fn raw_scores(&self) -> &[i32] {
        &self.raw_scores
    }

    /// Opaque location attribute of each node's edge (-1 when unset).
    pub fn locations(&self) -> &[i32] {
        &self.locations
    }

    /// Opaque length attribute of each node's edge (-1 when unset).
    pub fn lengths(&self) -> &[i32] {
        &self.lengths
    }

    /// True if `node` currently carries an edge to its parent.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.scores.get(node).is_some_and(|&s| s >= 0)
    }

    /// Offer an edge between `node_a` and `node_b`.
    ///
    /// Returns `Ok(true)` if the edge was accepted (possibly displacing a
    /// weaker edge on the cycle it closes), `Ok(false)` if it was the
    /// weakest edge on that cycle or a self-loop. The candidate loses
    /// score ties against incumbent edges.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is outside `[0, capacity)`; counters
    /// are untouched in that case.
    pub fn add_link(
        &mut self,
        node_a: NodeId,
        node_b: NodeId,
        score: i32,
        raw_score: i32,
        location: i32,
        length: i32,
    ) -> Result<bool> {
        let capacity = self.capacity();
        if node_a >= capacity || node_b >= capacity {
            return Err(PhysaliaError::InvalidInput(format!(
                "node id {} out of range (capacity {})",
                node_a.max(node_b),
                capacity
            )));
        }

        self.links_processed += 1;
        self.max_seen_id = self.max_seen_id.max(node_a).max(node_b);

        if node_a == node_b {
            return Ok(false);
        }

        self.walk_to_meet(node_a, node_b);

        match self.weakest_link_in_cycle(score) {
            Weakest::New => {
                self.links_rejected += 1;
                Ok(false)
            }
            Weakest::SideA(position) => {
                let path = mem::take(&mut self.path_a);
                self.reverse_prefix(&path, position);
                self.path_a = path;
                self.set_link(node_a, node_b, score, raw_score, location, length);
                self.links_added += 1;
                Ok(true)
            }
            Weakest::SideB(position) => {
                let path = mem::take(&mut self.path_b);
                self.reverse_prefix(&path, position);
                self.path_b = path;
                self.set_link(node_b, node_a, score, raw_score, location, length);
                self.links_added += 1;
                Ok(true)
            }
        }
    }

    /// Walk from both endpoints toward the root in lockstep, recording
    /// each side's path in `path_a`/`path_b`, until one side lands on a
    /// node already stamped by the other. The opposite path is truncated
    /// at the stamped position so both paths stop just short of the
    /// meeting node.
    ///
    /// Node 0 parks a side without entering its path; if both sides park
    /// there the components touch only at the sentinel, which is then
    /// the meeting node with both paths complete.
    fn walk_to_meet(&mut self, node_a: NodeId, node_b: NodeId) -> NodeId {
        self.search_id += 1;
        self.path_a.clear();
        self.path_b.clear();

        let mut current_a = node_a;
        let mut current_b = node_b;
        let mut a_active = true;
        let mut b_active = true;

        loop {
            if a_active {
                if self.stamp_b[current_a] == self.search_id {
                    let meeting_index = self.pos_b[current_a];
                    self.path_b.truncate(meeting_index);
                    return current_a;
                }
                self.stamp_a[current_a] = self.search_id;
                self.pos_a[current_a] = self.path_a.len();
                if current_a == 0 {
                    a_active = false;
                } else {
                    self.path_a.push(current_a);
                    current_a = self.parents[current_a];
                }
            }

            if b_active {
                if self.stamp_a[current_b] == self.search_id {
                    let meeting_index = self.pos_a[current_b];
                    self.path_a.truncate(meeting_index);
                    return current_b;
                }
                self.stamp_b[current_b] = self.search_id;
                self.pos_b[current_b] = self.path_b.len();
                if current_b == 0 {
                    b_active = false;
                } else {
                    self.path_b.push(current_b);
                    current_b = self.parents[current_b];
                }
            }

            if !a_active && !b_active {
                return 0;
            }
        }
    }

    /// Find the lowest-scored edge on the cycle formed by the two walk
    /// paths and the candidate edge. The scan is seeded with the
    /// candidate's score and uses strict `<`, so the candidate loses
    /// ties. Detached walk endpoints contribute their -1 sentinel, which
    /// is what lets a fresh component attach at no cost.
    fn weakest_link_in_cycle(&self, new_score: i32) -> Weakest {
        let mut min_score = new_score;
        let mut weakest = Weakest::New;

        for (i, &node) in self.path_a.iter().enumerate() {
            if self.scores[node] < min_score {
                min_score = self.scores[node];
                weakest = Weakest::SideA(i);
            }
        }
        for (i, &node) in self.path_b.iter().enumerate() {
            if self.scores[node] < min_score {
                min_score = self.scores[node];
                weakest = Weakest::SideB(i);
            }
        }

        weakest
    }

    /// Reverse the orientation of `path[0..=up_to]`: each node inherits
    /// the edge attributes of its predecessor and points back at it, so
    /// every edge keeps its weight with flipped direction. `path[0]`
    /// becomes a self-root, ready for the replacement edge.
    fn reverse_prefix(&mut self, path: &[NodeId], up_to: usize) {
        for i in (1..=up_to).rev() {
            let current = path[i];
            let prev = path[i - 1];
            self.set_link(
                current,
                prev,
                self.scores[prev],
                self.raw_scores[prev],
                self.locations[prev],
                self.lengths[prev],
            );
        }

        let head = path[0];
        self.set_link(head, head, -1, -1, -1, -1);
    }

    fn set_link(
        &mut self,
        node: NodeId,
        parent: NodeId,
        score: i32,
        raw_score: i32,
        location: i32,
        length: i32,
    ) {
        self.parents[node] = parent;
        self.scores[node] = score;
        self.raw_scores[node] = raw_score;
        self.locations[node] = location;
        self.lengths[node] = length;

        self.max_seen_id = self.max_seen_id.max(node).max(parent);
    }

    /// Upper bound for post-processing loops: only ids up to
    /// `max_seen_id` can carry data.
    pub(crate) fn bound(&self) -> usize {
        (self.max_seen_id + 1).min(self.capacity())
    }

    /// Attached nodes whose score lies in `[0, threshold)`, sorted by
    /// score descending (ties keep ascending id order).
    pub fn twilight_nodes(&self, threshold: i32) -> Vec<NodeId> {
        let mut twilight: Vec<NodeId> = (0..self.bound())
            .filter(|&i| self.scores[i] >= 0 && self.scores[i] < threshold)
            .collect();
        twilight.sort_by(|&a, &b| self.scores[b].cmp(&self.scores[a]));
        twilight
    }

    /// Child lists indexed by parent, each sorted by child score
    /// descending. The outer list covers ids up to `max_seen_id`.
    pub fn children_map(&self) -> Vec<Vec<NodeId>> {
        let limit = self.bound();
        let mut children = self.raw_children_map(limit);
        for list in &mut children {
            list.sort_by(|&a, &b| self.scores[b].cmp(&self.scores[a]));
        }
        children
    }

    fn raw_children_map(&self, limit: usize) -> Vec<Vec<NodeId>> {
        let mut children = vec![Vec::new(); limit];
        for i in 0..limit {
            if self.scores[i] >= 0 {
                let parent = self.parents[i];
                if parent < limit {
                    children[parent].push(i);
                }
            }
        }
        children
    }

    /// Pick the tree root: among nodes that are either detached or
    /// self-roots, the one with the most transitive descendants (the
    /// first such candidate wins ties). Defaults to 0 when no candidate
    /// exists.
    pub fn find_root(&self) -> NodeId {
        let limit = self.bound();
        let roots: Vec<NodeId> = (0..limit)
            .filter(|&i| self.scores[i] < 0 || self.parents[i] == i)
            .collect();

        if roots.is_empty() {
            return 0;
        }
        if roots.len() == 1 {
            return roots[0];
        }

        let children = self.raw_children_map(limit);
        let mut best_root = roots[0];
        let mut max_descendants = descendant_count(&children, best_root);
        for &root in &roots[1..] {
            let count = descendant_count(&children, root);
            if count > max_descendants {
                max_descendants = count;
                best_root = root;
            }
        }
        best_root
    }

    /// All attached edges, sorted by score descending.
    pub fn sorted_links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = (0..self.bound())
            .filter(|&i| self.scores[i] >= 0)
            .map(|i| Link {
                child: i,
                parent: self.parents[i],
                score: self.scores[i],
                raw_score: self.raw_scores[i],
                location: self.locations[i],
                length: self.lengths[i],
            })
            .collect();
        links.sort_by(|a, b| b.score.cmp(&a.score));
        links
    }
}

fn descendant_count(children: &[Vec<NodeId>], node: NodeId) -> usize {
    let mut count = children[node].len();
    for &child in &children[node] {
        count += descendant_count(children, child);
    }
    count
}
