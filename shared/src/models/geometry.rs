//! GeoJSON-shaped geometry handles
//!
//! The platform does not parse shapefile binaries itself; drawn and imported
//! parcels arrive as GeoJSON geometries with a pre-computed area in m².

use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// A GeoJSON geometry restricted to the polygon kinds a parcel can carry.
///
/// Shapefile imports sometimes produce `MultiPolygon` features; only the
/// first polygon's exterior ring is used for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Rings of `[longitude, latitude]` pairs; the first ring is the exterior
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Geometry {
    /// The exterior ring of the (first) polygon, if any
    pub fn exterior_ring(&self) -> Option<&[[f64; 2]]> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.first().map(|r| r.as_slice()),
            Geometry::MultiPolygon { coordinates } => coordinates
                .first()
                .and_then(|p| p.first())
                .map(|r| r.as_slice()),
        }
    }

    /// Vertex-average centroid of the exterior ring, for display only.
    ///
    /// GeoJSON rings repeat the first vertex as the last; the duplicate is
    /// skipped so it does not bias the average.
    pub fn centroid(&self) -> Option<GpsCoordinates> {
        let ring = self.exterior_ring()?;
        let vertices = if ring.len() > 1 && ring.first() == ring.last() {
            &ring[..ring.len() - 1]
        } else {
            ring
        };
        if vertices.is_empty() {
            return None;
        }
        let n = vertices.len() as f64;
        let (sum_lng, sum_lat) = vertices
            .iter()
            .fold((0.0, 0.0), |(lng, lat), v| (lng + v[0], lat + v[1]));
        Some(GpsCoordinates::new(sum_lat / n, sum_lng / n))
    }
}
