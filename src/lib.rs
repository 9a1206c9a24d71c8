//! Hierarchical clustering of geo points into map markers
//!
//! [`cluster::SpatialClusterIndex`] is built once for a set of points and
//! answers viewport queries: which clusters and single points are visible in a
//! bounding box at a zoom level, and which points a cluster stands for.

pub mod cluster;
