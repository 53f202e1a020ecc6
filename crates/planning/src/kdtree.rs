//! Incremental k-d tree over fixed-dimensional points.
//!
//! Points are never moved once inserted; removal leaves a tombstone so slot
//! numbers stay stable. Slots are handed out in insertion order, which is
//! also the tie-break order for equidistant neighbors.

use std::cmp::Ordering;

#[derive(Clone, Debug)]
struct Node {
    point: Vec<f64>,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
    live: bool,
}

#[derive(Clone, Debug)]
pub struct KdTree {
    dims: usize,
    nodes: Vec<Node>,
    root: Option<usize>,
    live: usize,
}

fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn by_distance_then_slot(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl KdTree {
    /// # Panics
    ///
    /// Panics if `dims` is zero.
    #[must_use]
    pub fn new(dims: usize) -> Self {
        assert!(dims > 0, "k-d tree needs at least one dimension");
        Self {
            dims,
            nodes: Vec::new(),
            root: None,
            live: 0,
        }
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of points not removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert `point` and return its slot.
    pub fn insert(&mut self, point: Vec<f64>) -> usize {
        debug_assert_eq!(point.len(), self.dims);
        let slot = self.nodes.len();

        let mut parent = None;
        let mut cursor = self.root;
        let mut depth = 0;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            let go_left = point[node.axis] < node.point[node.axis];
            parent = Some((idx, go_left));
            cursor = if go_left { node.left } else { node.right };
            depth += 1;
        }

        self.nodes.push(Node {
            point,
            axis: depth % self.dims,
            left: None,
            right: None,
            live: true,
        });
        match parent {
            None => self.root = Some(slot),
            Some((idx, true)) => self.nodes[idx].left = Some(slot),
            Some((idx, false)) => self.nodes[idx].right = Some(slot),
        }
        self.live += 1;
        slot
    }

    /// Tombstone `slot`. Returns false if it was unknown or already removed.
    pub fn remove(&mut self, slot: usize) -> bool {
        match self.nodes.get_mut(slot) {
            Some(node) if node.live => {
                node.live = false;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Up to `k` live slots closest to `query` with their Euclidean distance,
    /// nearest first, equal distances in slot order.
    #[must_use]
    pub fn nearest(&self, query: &[f64], k: usize) -> Vec<(usize, f64)> {
        debug_assert_eq!(query.len(), self.dims);
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k.min(self.live) + 1);
        if k > 0 {
            if let Some(root) = self.root {
                self.search(root, query, k, &mut best);
            }
        }
        best.into_iter().map(|(d, slot)| (slot, d.sqrt())).collect()
    }

    fn search(&self, idx: usize, query: &[f64], k: usize, best: &mut Vec<(f64, usize)>) {
        let node = &self.nodes[idx];
        if node.live {
            let candidate = (dist_sq(&node.point, query), idx);
            let pos = best.partition_point(|b| by_distance_then_slot(b, &candidate) == Ordering::Less);
            if pos < k {
                best.insert(pos, candidate);
                best.truncate(k);
            }
        }

        let diff = query[node.axis] - node.point[node.axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(near) = near {
            self.search(near, query, k, best);
        }
        if let Some(far) = far {
            let worst = best.last().map_or(f64::INFINITY, |b| b.0);
            if best.len() < k || diff * diff <= worst {
                self.search(far, query, k, best);
            }
        }
    }

    /// Live slots inside the closed box `[lo, hi]`, in slot order.
    #[must_use]
    pub fn range(&self, lo: &[f64], hi: &[f64]) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            let inside = node
                .point
                .iter()
                .zip(lo.iter().zip(hi))
                .all(|(p, (l, h))| *l <= *p && *p <= *h);
            if node.live && inside {
                found.push(idx);
            }
            let split = node.point[node.axis];
            if let Some(left) = node.left {
                if lo[node.axis] < split {
                    stack.push(left);
                }
            }
            if let Some(right) = node.right {
                if hi[node.axis] >= split {
                    stack.push(right);
                }
            }
        }
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_points(rng: &fastrand::Rng, n: usize, dims: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| (0..dims).map(|_| rng.f64() * 2.0 - 1.0).collect())
            .collect()
    }

    fn brute_force(points: &[Vec<f64>], query: &[f64], k: usize) -> Vec<usize> {
        let mut all: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (dist_sq(p, query), i))
            .collect();
        all.sort_by(by_distance_then_slot);
        all.into_iter().take(k).map(|(_, i)| i).collect()
    }

    #[test]
    fn nearest_matches_brute_force() {
        let rng = fastrand::Rng::with_seed(3);
        let points = random_points(&rng, 300, 5);
        let mut tree = KdTree::new(5);
        for p in &points {
            tree.insert(p.clone());
        }

        for query in random_points(&rng, 25, 5) {
            let got: Vec<usize> = tree.nearest(&query, 7).into_iter().map(|(s, _)| s).collect();
            assert_eq!(got, brute_force(&points, &query, 7));
        }
    }

    #[test]
    fn ties_resolve_in_insertion_order() {
        let mut tree = KdTree::new(2);
        tree.insert(vec![1.0, 0.0]);
        tree.insert(vec![-1.0, 0.0]);
        tree.insert(vec![0.0, 1.0]);
        tree.insert(vec![0.0, -1.0]);

        let got = tree.nearest(&[0.0, 0.0], 3);
        assert_eq!(got.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(got.iter().all(|(_, d)| (*d - 1.0).abs() < 1e-12));
    }

    #[test]
    fn removed_points_are_skipped() {
        let mut tree = KdTree::new(1);
        for x in [0.0, 1.0, 2.0, 3.0] {
            tree.insert(vec![x]);
        }
        assert!(tree.remove(1));
        assert!(!tree.remove(1));
        assert_eq!(tree.len(), 3);

        let got: Vec<usize> = tree.nearest(&[1.1], 2).into_iter().map(|(s, _)| s).collect();
        assert_eq!(got, vec![2, 0]);
        assert_eq!(tree.range(&[0.5], &[3.0]), vec![2, 3]);
    }

    #[test]
    fn range_matches_brute_force() {
        let rng = fastrand::Rng::with_seed(9);
        let points = random_points(&rng, 200, 3);
        let mut tree = KdTree::new(3);
        for p in &points {
            tree.insert(p.clone());
        }
        let (lo, hi) = ([-0.3, -0.5, 0.0], [0.4, 0.2, 0.9]);
        let expected: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.iter().zip(lo.iter().zip(&hi)).all(|(x, (l, h))| l <= x && x <= h))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(tree.range(&lo, &hi), expected);
    }

    #[test]
    fn empty_tree_and_zero_k() {
        let mut tree = KdTree::new(2);
        assert!(tree.nearest(&[0.0, 0.0], 3).is_empty());
        tree.insert(vec![0.0, 0.0]);
        assert!(tree.nearest(&[0.0, 0.0], 0).is_empty());
    }
}
