use bitvec::prelude::*;
use log::debug;

use super::error::{ClusterError, Result};
use super::kdtree::{Coord, KDTree};
use super::point::{BoundingBox, Cluster, ClusterNode, LatLon, Point, PointList};
use super::projection::{lat_y, lng_x, wrap_lng};

// Hierarchical greedy clustering, one pass per zoom level:
//
// level[maxZoom+1] = all input points, projected
// for z = maxZoom downto minZoom
//    r = radius / (extent * 2^z)
//    for each node P of level[z+1] in sequence order
//       if P is claimed, skip
//       claim P
//       Neighbors = unclaimed nodes of level[z+1] within r of P
//       if count(P + Neighbors) > count(P) and >= minPoints
//          claim Neighbors, emit new cluster (P + Neighbors) into level[z]
//          at the count-weighted mean lat/lon of its members
//       else
//          claim Neighbors, emit P and Neighbors unchanged into level[z]

/// Highest zoom level the index accepts
pub const MAX_ZOOM_LIMIT: i32 = 30;

/// Options controlling how points are clustered
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOptions {
    /// Cluster radius in pixels
    pub radius: f64,
    /// Tile extent the radius is measured against
    pub extent: f64,
    /// Minimum number of points to form a cluster
    pub min_points: usize,
    /// Lowest zoom level clusters are generated for
    pub min_zoom: i32,
    /// Highest zoom level clusters are generated for
    pub max_zoom: i32,
    /// KD-tree bucket size
    pub node_size: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            radius: 40.0,
            extent: 512.0,
            min_points: 2,
            min_zoom: 0,
            max_zoom: 16,
            node_size: 64,
        }
    }
}

impl ClusterOptions {
    fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ClusterError::InvalidOptions(msg));

        if self.min_zoom < 0 || self.min_zoom > self.max_zoom {
            return fail(format!(
                "zoom range {}..{} is empty or negative",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.max_zoom > MAX_ZOOM_LIMIT {
            return fail(format!("max zoom {} is above {}", self.max_zoom, MAX_ZOOM_LIMIT));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return fail(format!(
                "radius {} must be finite and non-negative",
                self.radius
            ));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return fail(format!("extent {} must be finite and positive", self.extent));
        }
        if self.node_size == 0 {
            return fail("node size must be at least 1".to_string());
        }
        Ok(())
    }
}

/// What a level entry stands for
#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeRef {
    /// Index into the input points
    Leaf(usize),
    /// Index into the cluster records
    Cluster(usize),
}

#[derive(Debug, Clone)]
struct LevelNode {
    /// Projected `centroid`
    pos: Coord,
    centroid: LatLon,
    point_count: usize,
    node: NodeRef,
}

/// All nodes visible at one zoom level, with a tree over their positions
struct Level {
    nodes: Vec<LevelNode>,
    tree: KDTree,
}

impl Level {
    fn new(nodes: Vec<LevelNode>, node_size: usize) -> Level {
        let coords: Vec<Coord> = nodes.iter().map(|n| n.pos).collect();
        let tree = KDTree::new(&coords, node_size);
        Level { nodes, tree }
    }
}

/// A cluster created during the build
#[derive(Debug, Clone)]
struct ClusterRecord {
    centroid: LatLon,
    point_count: usize,
    /// Zoom level the cluster was formed at
    zoom: i32,
    /// Nodes of level `zoom + 1` merged into this cluster, seed first
    children: Vec<NodeRef>,
}

/// Immutable hierarchical index of points for map marker clustering
///
/// Built once per data set; queries never mutate it, so a built index can be
/// shared between threads.
pub struct SpatialClusterIndex {
    options: ClusterOptions,
    points: PointList,
    clusters: Vec<ClusterRecord>,
    /// `levels[z - min_zoom]` for `z` in `min_zoom..=max_zoom + 1`
    levels: Vec<Level>,
}

impl SpatialClusterIndex {
    /// Builds the index for the given points
    ///
    /// # Errors
    ///
    /// - [`ClusterError::InvalidOptions`] for inconsistent options
    /// - [`ClusterError::InvalidInput`] for the first point with out of range coordinates
    pub fn build(points: &[Point], options: ClusterOptions) -> Result<SpatialClusterIndex> {
        options.validate()?;

        for (index, p) in points.iter().enumerate() {
            if !p.is_valid() {
                return Err(ClusterError::InvalidInput {
                    index,
                    id: p.id.clone(),
                    latitude: p.latitude,
                    longitude: p.longitude,
                });
            }
        }

        let leaves: Vec<LevelNode> = points
            .iter()
            .enumerate()
            .map(|(i, p)| LevelNode {
                pos: [lng_x(p.longitude), lat_y(p.latitude)],
                centroid: LatLon {
                    lat: p.latitude,
                    lon: p.longitude,
                },
                point_count: 1,
                node: NodeRef::Leaf(i),
            })
            .collect();

        let mut clusters = Vec::new();
        let mut levels = Vec::with_capacity((options.max_zoom - options.min_zoom + 2) as usize);
        let mut current = Level::new(leaves, options.node_size);

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let nodes = cluster_level(&current, zoom, &options, &mut clusters);
            debug!("zoom {}: {} -> {} nodes", zoom, current.tree.len(), nodes.len());
            levels.push(current);
            current = Level::new(nodes, options.node_size);
        }
        levels.push(current);
        levels.reverse();

        debug!(
            "built cluster index: {} points, {} clusters, zoom {}..{}",
            points.len(),
            clusters.len(),
            options.min_zoom,
            options.max_zoom
        );

        Ok(SpatialClusterIndex {
            options,
            points: points.to_vec(),
            clusters,
            levels,
        })
    }

    /// Options the index was built with
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the index was built from no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns clusters and single points visible inside `bbox` at `zoom`
    ///
    /// `zoom` is clamped into the configured zoom range. A box whose west
    /// edge is east of its east edge crosses the antimeridian.
    pub fn get_clusters(&self, bbox: &BoundingBox, zoom: i32) -> Vec<ClusterNode> {
        // an edge exactly on 180 stays east, wrapping would move it to -180
        let edge = |lng: f64| if lng == 180.0 { 180.0 } else { wrap_lng(lng) };
        let mut min_lng = edge(bbox.west);
        let mut max_lng = edge(bbox.east);
        let min_lat = bbox.south.clamp(-90.0, 90.0);
        let max_lat = bbox.north.clamp(-90.0, 90.0);

        if bbox.east - bbox.west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            let eastern = BoundingBox::new(min_lng, min_lat, 180.0, max_lat);
            let western = BoundingBox::new(-180.0, min_lat, max_lng, max_lat);
            let mut nodes = self.get_clusters(&eastern, zoom);
            nodes.extend(self.get_clusters(&western, zoom));
            return nodes;
        }

        let bounds = BoundingBox::new(min_lng, min_lat, max_lng, max_lat);
        let level = self.level(zoom);
        let ids = level.tree.range(
            [lng_x(min_lng), lat_y(max_lat)],
            [lng_x(max_lng), lat_y(min_lat)],
            Vec::new(),
        );

        ids.into_iter()
            .map(|id| &level.nodes[id])
            .filter(|n| bounds.contains(n.centroid))
            .map(|n| self.materialize(n.node))
            .collect()
    }

    /// Returns up to `limit` points contained in the cluster, depth first
    ///
    /// # Errors
    ///
    /// [`ClusterError::UnknownCluster`] if `cluster_id` is not a cluster of this index
    pub fn get_leaves(&self, cluster_id: usize, limit: usize) -> Result<Vec<Point>> {
        self.get_leaves_page(cluster_id, limit, 0)
    }

    /// Like [`get_leaves`](Self::get_leaves), skipping the first `offset` leaves
    pub fn get_leaves_page(
        &self,
        cluster_id: usize,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Point>> {
        let record = self.record(cluster_id)?;
        let mut leaves = Vec::new();
        let mut skipped = 0;
        self.append_leaves(record, limit, offset, &mut skipped, &mut leaves);
        Ok(leaves)
    }

    fn append_leaves(
        &self,
        record: &ClusterRecord,
        limit: usize,
        offset: usize,
        skipped: &mut usize,
        leaves: &mut Vec<Point>,
    ) {
        for child in &record.children {
            if leaves.len() >= limit {
                return;
            }
            match *child {
                NodeRef::Leaf(i) => {
                    if *skipped < offset {
                        *skipped += 1;
                    } else {
                        leaves.push(self.points[i].clone());
                    }
                }
                NodeRef::Cluster(c) => {
                    let sub = &self.clusters[c];
                    if *skipped + sub.point_count <= offset {
                        // whole subtree falls before the page
                        *skipped += sub.point_count;
                    } else {
                        self.append_leaves(sub, limit, offset, skipped, leaves);
                    }
                }
            }
        }
    }

    /// Returns the nodes merged to form the cluster, one zoom level finer
    ///
    /// # Errors
    ///
    /// [`ClusterError::UnknownCluster`] if `cluster_id` is not a cluster of this index
    pub fn get_children(&self, cluster_id: usize) -> Result<Vec<ClusterNode>> {
        let record = self.record(cluster_id)?;
        Ok(record
            .children
            .iter()
            .map(|&child| self.materialize(child))
            .collect())
    }

    /// Returns the zoom at which the cluster splits into its children
    ///
    /// # Errors
    ///
    /// [`ClusterError::UnknownCluster`] if `cluster_id` is not a cluster of this index
    pub fn get_cluster_expansion_zoom(&self, cluster_id: usize) -> Result<i32> {
        let record = self.record(cluster_id)?;
        Ok(record.zoom + 1)
    }

    fn record(&self, cluster_id: usize) -> Result<&ClusterRecord> {
        self.clusters
            .get(cluster_id)
            .ok_or(ClusterError::UnknownCluster(cluster_id))
    }

    fn level(&self, zoom: i32) -> &Level {
        let zoom = zoom.clamp(self.options.min_zoom, self.options.max_zoom);
        &self.levels[(zoom - self.options.min_zoom) as usize]
    }

    fn materialize(&self, node: NodeRef) -> ClusterNode {
        match node {
            NodeRef::Leaf(i) => ClusterNode::Leaf(self.points[i].clone()),
            NodeRef::Cluster(c) => {
                let record = &self.clusters[c];
                ClusterNode::Cluster(Cluster {
                    id: c,
                    centroid: record.centroid,
                    point_count: record.point_count,
                })
            }
        }
    }
}

/// Clusters the nodes of `finer` (level `zoom + 1`) into the nodes of level `zoom`
///
/// New cluster records are appended to `clusters`.
fn cluster_level(
    finer: &Level,
    zoom: i32,
    options: &ClusterOptions,
    clusters: &mut Vec<ClusterRecord>,
) -> Vec<LevelNode> {
    let r = options.radius / (options.extent * 2f64.powi(zoom));
    let nodes = &finer.nodes;
    let mut claimed = bitvec![0; nodes.len()];
    let mut next = Vec::with_capacity(nodes.len());
    let mut neighbors = Vec::new();

    for i in 0..nodes.len() {
        if claimed[i] {
            continue;
        }
        claimed.set(i, true);

        let seed = &nodes[i];
        neighbors.clear();
        neighbors = finer.tree.within(seed.pos, r, neighbors);

        let mut point_count = seed.point_count;
        for &j in &neighbors {
            if !claimed[j] {
                point_count += nodes[j].point_count;
            }
        }

        if point_count > seed.point_count && point_count >= options.min_points {
            let mut wlat = seed.centroid.lat * seed.point_count as f64;
            let mut wlon = seed.centroid.lon * seed.point_count as f64;
            let mut children = vec![seed.node];

            for &j in &neighbors {
                if claimed[j] {
                    continue;
                }
                claimed.set(j, true);
                let n = &nodes[j];
                wlat += n.centroid.lat * n.point_count as f64;
                wlon += n.centroid.lon * n.point_count as f64;
                children.push(n.node);
            }

            let centroid = LatLon {
                lat: wlat / point_count as f64,
                lon: wlon / point_count as f64,
            };
            let id = clusters.len();
            clusters.push(ClusterRecord {
                centroid,
                point_count,
                zoom,
                children,
            });
            next.push(LevelNode {
                pos: [lng_x(centroid.lon), lat_y(centroid.lat)],
                centroid,
                point_count,
                node: NodeRef::Cluster(id),
            });
        } else {
            next.push(seed.clone());

            if point_count > seed.point_count {
                for &j in &neighbors {
                    if claimed[j] {
                        continue;
                    }
                    claimed.set(j, true);
                    next.push(nodes[j].clone());
                }
            }
        }
    }

    next
}
