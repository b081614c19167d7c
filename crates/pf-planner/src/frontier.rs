//! Search tree arena and the best-first frontier.
//!
//! Search nodes live in a flat `Vec`; a node's parent is an index into it, so
//! the tree needs no shared ownership and is dropped wholesale at the end of
//! a call.
//!
//! The frontier orders arena indices by `weight1 + weight2`, ascending.  A
//! plain heap does not order equal keys, so every push also takes the next
//! value of a monotonically increasing sequence number and equal scores pop
//! first-in first-out.  A node pushed again after its destination changed
//! takes a fresh number and queues behind existing equal-score entries.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::{Index, IndexMut};

use pf_core::VertexId;
use pf_graph::TotalF64;

/// One node of the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Arena index of the parent; `None` for the root.
    pub parent:  Option<usize>,
    pub vertex:  VertexId,
    /// Cumulative haversine cost from the start vertex.
    pub weight1: f64,
    /// Shortest-path distance to the assigned destination.
    pub weight2: f64,
    /// Index into the call's destination set; `None` only for the root.
    pub dest:    Option<usize>,
}

impl SearchNode {
    pub fn root(vertex: VertexId) -> Self {
        Self { parent: None, vertex, weight1: 0.0, weight2: 0.0, dest: None }
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.weight1 + self.weight2
    }
}

#[derive(Default)]
pub struct SearchArena {
    nodes: Vec<SearchNode>,
}

impl SearchArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: SearchNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Vertices from the root down to `idx`, inclusive.
    pub fn path_to(&self, idx: usize) -> Vec<VertexId> {
        let mut path = Vec::new();
        let mut cur = Some(idx);
        while let Some(i) = cur {
            path.push(self.nodes[i].vertex);
            cur = self.nodes[i].parent;
        }
        path.reverse();
        path
    }
}

impl Index<usize> for SearchArena {
    type Output = SearchNode;
    fn index(&self, idx: usize) -> &SearchNode {
        &self.nodes[idx]
    }
}

impl IndexMut<usize> for SearchArena {
    fn index_mut(&mut self, idx: usize) -> &mut SearchNode {
        &mut self.nodes[idx]
    }
}

/// Min-priority queue of arena indices keyed by `(score, sequence)`.
#[derive(Default)]
pub struct Frontier {
    heap:     BinaryHeap<Reverse<(TotalF64, u64, usize)>>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `idx` under the node's current score.
    pub fn push(&mut self, arena: &SearchArena, idx: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((TotalF64(arena[idx].score()), seq, idx)));
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse((_, _, idx))| idx)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
