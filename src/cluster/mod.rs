//! Package cluster implements hierarchical map marker clustering on (lat, lon)
//! using one K-D Tree per zoom level
pub mod error;
pub mod index;
pub mod kdtree;
pub mod point;
pub mod projection;
pub mod viewport;

#[cfg(test)]
mod projection_test;
#[cfg(test)]
mod viewport_test;

pub use error::ClusterError;
pub use index::{ClusterOptions, SpatialClusterIndex};
pub use point::{BoundingBox, Cluster, ClusterNode, LatLon, Point, PointList};
pub use viewport::Region;
