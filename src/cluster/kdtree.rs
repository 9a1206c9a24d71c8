//! Static K-D tree over projected coordinates
//!
//! The tree is laid out implicitly in a flat array: the median of every
//! range sits in its middle slot and the halves on either side are split on
//! the other axis. Ranges of at most `node_size` entries are left unsorted
//! and scanned linearly.

/// Coordinate in projected (unit square) space, `[x, y]`
pub type Coord = [f64; 2];

/// KD-Tree implementation for efficient spatial queries
///
/// Coordinates are separated from ids. Queries return ids, which are
/// positions in the slice the tree was built from.
pub struct KDTree {
    ids: Vec<usize>,
    coords: Vec<Coord>,
    node_size: usize,
}

impl KDTree {
    /// Builds a tree from the given coordinates
    ///
    /// `node_size` is the bucket size below which ranges are not split any
    /// further; it must be at least 1.
    pub fn new(coords: &[Coord], node_size: usize) -> KDTree {
        let mut entries: Vec<(usize, Coord)> = coords.iter().copied().enumerate().collect();
        let node_size = node_size.max(1);

        sort_kd(&mut entries, node_size, 0);

        let (ids, coords) = entries.into_iter().unzip();
        KDTree {
            ids,
            coords,
            node_size,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Finds ids of all entries inside the `[min, max]` rectangle (edges included)
    ///
    /// To avoid allocation, the `nodes` vector can be pre-allocated with a larger
    /// capacity and re-used across multiple calls.
    pub fn range(&self, min: Coord, max: Coord, mut nodes: Vec<usize>) -> Vec<usize> {
        if !self.is_empty() {
            self.range_recursive(0, self.ids.len() - 1, 0, min, max, &mut nodes);
        }
        nodes
    }

    fn range_recursive(
        &self,
        left: usize,
        right: usize,
        axis: usize,
        min: Coord,
        max: Coord,
        nodes: &mut Vec<usize>,
    ) {
        let inside =
            |c: &Coord| c[0] >= min[0] && c[0] <= max[0] && c[1] >= min[1] && c[1] <= max[1];

        if right - left <= self.node_size {
            for i in left..=right {
                if inside(&self.coords[i]) {
                    nodes.push(self.ids[i]);
                }
            }
            return;
        }

        let m = (left + right) / 2;
        let c = self.coords[m];
        if inside(&c) {
            nodes.push(self.ids[m]);
        }

        if min[axis] <= c[axis] {
            self.range_recursive(left, m - 1, 1 - axis, min, max, nodes);
        }
        if max[axis] >= c[axis] {
            self.range_recursive(m + 1, right, 1 - axis, min, max, nodes);
        }
    }

    /// Finds ids of all entries within distance `r` of `pt` (boundary included)
    pub fn within(&self, pt: Coord, r: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if r < 0.0 || self.is_empty() {
            return nodes;
        }
        self.within_recursive(0, self.ids.len() - 1, 0, pt, r, &mut nodes);
        nodes
    }

    fn within_recursive(
        &self,
        left: usize,
        right: usize,
        axis: usize,
        pt: Coord,
        r: f64,
        nodes: &mut Vec<usize>,
    ) {
        let r2 = r * r;

        if right - left <= self.node_size {
            for i in left..=right {
                if sq_dist(&self.coords[i], &pt) <= r2 {
                    nodes.push(self.ids[i]);
                }
            }
            return;
        }

        let m = (left + right) / 2;
        let c = self.coords[m];
        if sq_dist(&c, &pt) <= r2 {
            nodes.push(self.ids[m]);
        }

        if pt[axis] - r <= c[axis] {
            self.within_recursive(left, m - 1, 1 - axis, pt, r, nodes);
        }
        if pt[axis] + r >= c[axis] {
            self.within_recursive(m + 1, right, 1 - axis, pt, r, nodes);
        }
    }
}

/// Returns squared euclidean distance between two coordinates
pub fn sq_dist(a: &Coord, b: &Coord) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Recursively places the median of `entries` on `axis` in the middle slot,
/// with smaller values before it and greater or equal values after it
fn sort_kd(entries: &mut [(usize, Coord)], node_size: usize, axis: usize) {
    if entries.len() <= node_size + 1 {
        return;
    }

    let m = (entries.len() - 1) / 2;
    entries.select_nth_unstable_by(m, |a, b| {
        a.1[axis]
            .partial_cmp(&b.1[axis])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let (left, rest) = entries.split_at_mut(m);
    sort_kd(left, node_size, 1 - axis);
    sort_kd(&mut rest[1..], node_size, 1 - axis);
}
