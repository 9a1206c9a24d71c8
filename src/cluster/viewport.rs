//! Conversion of a visible map region into cluster query arguments

use std::str::FromStr;

use super::error::{ClusterError, Result};
use super::point::{BoundingBox, parse_floats};

/// Visible map region: center plus the spans it covers, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Result<Self> {
        if !(latitude_delta > 0.0 && longitude_delta > 0.0) {
            return Err(ClusterError::Parse(format!(
                "region deltas must be positive, got {}/{}",
                latitude_delta, longitude_delta
            )));
        }
        Ok(Region {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        })
    }

    /// Bounding box covered by the region
    ///
    /// The longitude edges are not wrapped, [`SpatialClusterIndex::get_clusters`]
    /// normalizes them.
    ///
    /// [`SpatialClusterIndex::get_clusters`]: super::index::SpatialClusterIndex::get_clusters
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.longitude - self.longitude_delta / 2.0,
            self.latitude - self.latitude_delta / 2.0,
            self.longitude + self.longitude_delta / 2.0,
            self.latitude + self.latitude_delta / 2.0,
        )
    }

    /// Integer zoom level matching the longitude span
    ///
    /// A span of 360 degrees maps to -1; the index clamps the result into its
    /// own zoom range.
    pub fn zoom(&self) -> i32 {
        ((360.0 / self.longitude_delta).log2() - 1.0).floor() as i32
    }
}

impl FromStr for Region {
    type Err = ClusterError;

    /// Parses `latitude,longitude,latitude_delta,longitude_delta`
    fn from_str(s: &str) -> Result<Self> {
        let v = parse_floats(s, 4)?;
        Region::new(v[0], v[1], v[2], v[3])
    }
}
