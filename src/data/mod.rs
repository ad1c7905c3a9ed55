pub mod generator;

use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// A labeled geographic coordinate with an associated navigation URL.
///
/// Points are immutable once generated; identity is the index in the
/// generated sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub url: String,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Whether both coordinates are finite and therefore placeable
    pub fn is_placeable(&self) -> bool {
        self.position().is_finite()
    }
}
