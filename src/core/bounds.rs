use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The latitude/longitude rectangle currently visible in the map viewport.
///
/// Always built wholesale from two corners; the constructors order the
/// components so that `min_lat <= max_lat` and `min_lng <= max_lng`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Creates a bounding box from the north-east and south-west visible corners
    pub fn from_corners(north_east: LatLng, south_west: LatLng) -> Self {
        Self {
            min_lat: south_west.lat.min(north_east.lat),
            max_lat: south_west.lat.max(north_east.lat),
            min_lng: south_west.lng.min(north_east.lng),
            max_lng: south_west.lng.max(north_east.lng),
        }
    }

    /// Checks that the ordering invariant holds and every component is finite
    pub fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lng, self.max_lng]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lng <= self.max_lng
    }

    /// Checks if the box contains a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.max_lat, self.max_lng)
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.min_lat, self.min_lng)
    }

    /// The labeled lines of the textual bounds readout, in display order
    pub fn readout_lines(&self) -> [(&'static str, f64); 4] {
        [
            ("minLat", self.min_lat),
            ("maxLat", self.max_lat),
            ("minLng", self.min_lng),
            ("maxLng", self.max_lng),
        ]
    }
}

impl From<&LatLngBounds> for BoundingBox {
    fn from(bounds: &LatLngBounds) -> Self {
        Self::from_corners(bounds.north_east, bounds.south_west)
    }
}

impl From<BoundingBox> for LatLngBounds {
    fn from(bbox: BoundingBox) -> Self {
        LatLngBounds::new(bbox.south_west(), bbox.north_east())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, value)) in self.readout_lines().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}
