//! Input records and query result types

use std::str::FromStr;

use super::error::{ClusterError, Result};

/// Point is an input record with a geographic coordinate
///
/// The index copies points at build time; callers keep ownership of theirs.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Cluster represents an aggregate of nearby points at some zoom level
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Cluster ID, valid for the index that returned it
    pub id: usize,
    /// Weighted mean of the merged points
    pub centroid: LatLon,
    /// Number of leaf points transitively merged into this cluster
    pub point_count: usize,
}

/// A single marker returned by a cluster query
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterNode {
    Leaf(Point),
    Cluster(Cluster),
}

impl Point {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        label: impl Into<String>,
    ) -> Self {
        Point {
            id: id.into(),
            latitude,
            longitude,
            label: label.into(),
        }
    }

    /// Checks that latitude is in [-90, 90] and longitude in [-180, 180]
    ///
    /// NaN coordinates are rejected.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl ClusterNode {
    /// Number of leaf points represented by this node
    pub fn point_count(&self) -> usize {
        match self {
            ClusterNode::Leaf(_) => 1,
            ClusterNode::Cluster(c) => c.point_count,
        }
    }

    /// Marker position
    pub fn position(&self) -> LatLon {
        match self {
            ClusterNode::Leaf(p) => LatLon {
                lat: p.latitude,
                lon: p.longitude,
            },
            ClusterNode::Cluster(c) => c.centroid,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, ClusterNode::Cluster(_))
    }
}

/// Rectangle in degrees
///
/// `west > east` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub const WORLD: BoundingBox = BoundingBox {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        BoundingBox {
            west,
            south,
            east,
            north,
        }
    }

    /// Checks if the point lies inside the box (edges included)
    pub fn contains(&self, pos: LatLon) -> bool {
        let lat_ok = pos.lat >= self.south && pos.lat <= self.north;
        let lon_ok = if self.west <= self.east {
            pos.lon >= self.west && pos.lon <= self.east
        } else {
            pos.lon >= self.west || pos.lon <= self.east
        };
        lat_ok && lon_ok
    }
}

impl FromStr for BoundingBox {
    type Err = ClusterError;

    /// Parses `west,south,east,north`
    fn from_str(s: &str) -> Result<Self> {
        let v = parse_floats(s, 4)?;
        Ok(BoundingBox::new(v[0], v[1], v[2], v[3]))
    }
}

/// Parses exactly `n` comma separated floats
pub(crate) fn parse_floats(s: &str, n: usize) -> Result<Vec<f64>> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| ClusterError::Parse(format!("{:?}: {}", part.trim(), e)))
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != n {
        return Err(ClusterError::Parse(format!(
            "expected {} comma separated numbers, got {}",
            n,
            values.len()
        )));
    }
    Ok(values)
}
