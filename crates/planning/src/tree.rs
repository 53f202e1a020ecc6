//! # Vertex Store
//!
//! [`Tree`] keeps planning vertices in a k-d index over their poses and
//! records directed parent to child edges with a cost. Vertices are only
//! dropped through [`Tree::remove`], which also drops every incident edge, so
//! an edge endpoint always names a stored vertex.

use crate::error::TreeError;
use crate::kdtree::KdTree;
use crate::vertex::{Vertex, VertexId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Axis-aligned box in joint space, bounds inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub lo: Vec<f64>,
    pub hi: Vec<f64>,
}

impl Region {
    /// # Panics
    ///
    /// Panics if the bounds differ in length.
    #[must_use]
    pub fn new(lo: Vec<f64>, hi: Vec<f64>) -> Self {
        assert_eq!(lo.len(), hi.len(), "region bounds must have equal length");
        Self { lo, hi }
    }

    /// Cube of half-width `radius` centred on `center`.
    #[must_use]
    pub fn around(center: &[f64], radius: f64) -> Self {
        Self {
            lo: center.iter().map(|c| c - radius).collect(),
            hi: center.iter().map(|c| c + radius).collect(),
        }
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.lo.len()
    }

    #[must_use]
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.dims()
            && point
                .iter()
                .zip(self.lo.iter().zip(&self.hi))
                .all(|(p, (lo, hi))| lo <= p && p <= hi)
    }
}

#[derive(Debug)]
pub struct Tree {
    dims: usize,
    index: KdTree,
    /// Indexed by k-d slot; `None` once removed.
    vertices: Vec<Option<Vertex>>,
    slots: HashMap<VertexId, usize>,
    edges: BTreeMap<(VertexId, VertexId), f64>,
    /// Same edges keyed `(child, parent)`.
    parents: BTreeSet<(VertexId, VertexId)>,
}

impl Tree {
    #[must_use]
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            index: KdTree::new(dims),
            vertices: Vec::new(),
            slots: HashMap::new(),
            edges: BTreeMap::new(),
            parents: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    fn check_dims(&self, got: usize) -> Result<(), TreeError> {
        if got == self.dims {
            Ok(())
        } else {
            Err(TreeError::DimensionMismatch {
                expected: self.dims,
                got,
            })
        }
    }

    /// Store `vertex` and return its index key.
    ///
    /// # Errors
    ///
    /// `DuplicateVertex` if the id is already stored, `DimensionMismatch` if
    /// the pose has the wrong length.
    pub fn insert(&mut self, vertex: Vertex) -> Result<usize, TreeError> {
        self.check_dims(vertex.th.len())?;
        if self.slots.contains_key(&vertex.id) {
            return Err(TreeError::DuplicateVertex(vertex.id));
        }
        let slot = self.index.insert(vertex.th.clone());
        debug_assert_eq!(slot, self.vertices.len());
        self.slots.insert(vertex.id, slot);
        tracing::trace!(id = %vertex.id, slot, "vertex inserted");
        self.vertices.push(Some(vertex));
        Ok(slot)
    }

    #[must_use]
    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.slots
            .get(&id)
            .and_then(|&slot| self.vertices[slot].as_ref())
    }

    #[must_use]
    pub fn contains(&self, id: VertexId) -> bool {
        self.slots.contains_key(&id)
    }

    /// # Errors
    ///
    /// `UnknownVertex` if `id` is not stored.
    pub fn set_tag(&mut self, id: VertexId, tag: bool) -> Result<(), TreeError> {
        let slot = *self.slots.get(&id).ok_or(TreeError::UnknownVertex(id))?;
        match self.vertices[slot].as_mut() {
            Some(vertex) => {
                vertex.tag = tag;
                Ok(())
            }
            None => Err(TreeError::UnknownVertex(id)),
        }
    }

    /// Up to `k` stored vertices closest to `query`, nearest first, ties in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `query` has the wrong length.
    pub fn nearest(&self, query: &[f64], k: usize) -> Result<Vec<(&Vertex, f64)>, TreeError> {
        self.check_dims(query.len())?;
        Ok(self
            .index
            .nearest(query, k)
            .into_iter()
            .filter_map(|(slot, dist)| self.vertices[slot].as_ref().map(|v| (v, dist)))
            .collect())
    }

    /// Stored vertices whose pose lies inside `region`, in insertion order.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the region has the wrong dimension.
    pub fn range_query(&self, region: &Region) -> Result<Vec<&Vertex>, TreeError> {
        self.check_dims(region.dims())?;
        Ok(self
            .index
            .range(&region.lo, &region.hi)
            .into_iter()
            .filter_map(|slot| self.vertices[slot].as_ref())
            .collect())
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record a directed edge, replacing the cost of an existing one.
    ///
    /// # Errors
    ///
    /// `DanglingEdge` if either endpoint is not stored.
    pub fn add_edge(&mut self, parent: VertexId, child: VertexId, cost: f64) -> Result<(), TreeError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(TreeError::DanglingEdge { parent, child });
        }
        self.edges.insert((parent, child), cost);
        self.parents.insert((child, parent));
        Ok(())
    }

    /// Children of `id` with edge costs, ordered by child id.
    ///
    /// # Errors
    ///
    /// `UnknownVertex` if `id` is not stored.
    pub fn neighbors(&self, id: VertexId) -> Result<Vec<(VertexId, f64)>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownVertex(id));
        }
        Ok(self
            .edges
            .range((id, VertexId(0))..=(id, VertexId(u64::MAX)))
            .map(|(&(_, child), &cost)| (child, cost))
            .collect())
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// First parent recorded for `id`, by parent id.
    #[must_use]
    pub fn parent_of(&self, id: VertexId) -> Option<(VertexId, f64)> {
        let &(_, parent) = self
            .parents
            .range((id, VertexId(0))..=(id, VertexId(u64::MAX)))
            .next()?;
        self.edges.get(&(parent, id)).map(|&cost| (parent, cost))
    }

    /// Ids from the root of `id`'s ancestry down to `id`.
    ///
    /// # Errors
    ///
    /// `UnknownVertex` if `id` is not stored.
    pub fn path_to(&self, id: VertexId) -> Result<Vec<VertexId>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownVertex(id));
        }
        let mut path = vec![id];
        let mut seen = HashSet::from([id]);
        let mut cursor = id;
        while let Some((parent, _)) = self.parent_of(cursor) {
            // parent edges may form a cycle if callers add them by hand
            if !seen.insert(parent) {
                break;
            }
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Drop `id` and every edge touching it.
    ///
    /// # Errors
    ///
    /// `UnknownVertex` if `id` is not stored.
    pub fn remove(&mut self, id: VertexId) -> Result<Vertex, TreeError> {
        let slot = self.slots.remove(&id).ok_or(TreeError::UnknownVertex(id))?;
        self.index.remove(slot);
        self.edges
            .retain(|&(parent, child), _| parent != id && child != id);
        self.parents
            .retain(|&(child, parent)| parent != id && child != id);
        self.vertices[slot].take().ok_or(TreeError::UnknownVertex(id))
    }

    /// Stored vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().flatten()
    }
}
