//! Engine-wide defaults for the marker map.
//! Keeping them in a single place makes it easier to tweak magic numbers.

use crate::core::geo::LatLng;

/// Tokyo Station, the default origin for generated points and the map center.
pub const DEFAULT_ORIGIN: LatLng = LatLng {
    lat: 35.681236,
    lng: 139.767125,
};

/// Initial zoom level of the map surface.
pub const DEFAULT_ZOOM: f64 = 14.0;

/// Zoom limits of the map surface.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 20.0;

/// Number of markers generated at startup.
pub const DEFAULT_MARKER_COUNT: usize = 10_000;

/// Full width of the random offset window, in degrees, on each axis.
/// Offsets are drawn from `[-spread / 2, spread / 2)`.
pub const POINT_SPREAD_DEGREES: f64 = 0.05;

/// Prefix of the sequential marker titles (`Marker-1`, `Marker-2`, ...).
pub const MARKER_TITLE_PREFIX: &str = "Marker-";

/// Base that marker titles are appended to when deriving their URL.
pub const MARKER_URL_BASE: &str = "https://example.com/";

/// Caption shown under the coordinates in every marker popup.
pub const POPUP_CAPTION: &str = "Click to open the camera view.";

/// Default square tile size in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Map surface region size in pixels (the height is fixed).
pub const SURFACE_WIDTH_PX: f64 = 1200.0;
pub const SURFACE_HEIGHT_PX: f64 = 600.0;

/// Marker icon default size.
pub const MARKER_ICON_SIZE: (f64, f64) = (25.0, 41.0);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (f64, f64) = (12.0, 41.0);

/// Environment variable holding the map provider API key.
pub const API_KEY_ENV: &str = "CLUSTERMAP_API_KEY";

/// Optional overrides for the generated marker count and initial zoom.
pub const MARKER_COUNT_ENV: &str = "CLUSTERMAP_MARKER_COUNT";
pub const ZOOM_ENV: &str = "CLUSTERMAP_ZOOM";
