use crate::core::{
    constants::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE},
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Pixel origin for coordinate transformations (to avoid precision issues)
    pixel_origin: Option<Point>,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let mut viewport = Self {
            center: Self::clamp_center(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            pixel_origin: None,
        };
        viewport.update_pixel_origin();
        viewport
    }

    /// Sets the center of the viewport, clamping latitude to the projectable range
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::clamp_center(center);
        self.update_pixel_origin();
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.update_pixel_origin();
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.update_pixel_origin();
    }

    /// Centers on `bounds` at the highest whole zoom level that shows all of
    /// it inside the viewport minus `padding` pixels on every side
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: f64) {
        let nw = self.project(&LatLng::new(bounds.north_east.lat, bounds.south_west.lng), Some(0.0));
        let se = self.project(&LatLng::new(bounds.south_west.lat, bounds.north_east.lng), Some(0.0));

        let span_x = (se.x - nw.x).abs().max(f64::EPSILON);
        let span_y = (se.y - nw.y).abs().max(f64::EPSILON);
        let available_x = (self.size.x - 2.0 * padding).max(1.0);
        let available_y = (self.size.y - 2.0 * padding).max(1.0);

        let zoom = (available_x / span_x).min(available_y / span_y).log2().floor();
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.set_center(bounds.center());
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    /// (Web Mercator, EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE * 2_f64.powf(z);

        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = (PI / 4.0 + lat_lng.lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;

        let pixel_x = (x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE * 2_f64.powf(z);

        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Gets or calculates the pixel origin for this viewport
    pub fn get_pixel_origin(&self) -> Point {
        self.pixel_origin
            .unwrap_or_else(|| self.project(&self.center, None).floor())
    }

    fn update_pixel_origin(&mut self) {
        self.pixel_origin = Some(self.project(&self.center, None).floor());
    }

    /// Converts a geographical coordinate to screen pixel coordinates (container relative)
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let layer_point = self.lat_lng_to_layer_point(lat_lng);
        self.layer_point_to_container_point(&layer_point)
    }

    /// Converts screen pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let layer_point = self.container_point_to_layer_point(pixel);
        self.layer_point_to_lat_lng(&layer_point)
    }

    /// Converts LatLng to layer point (relative to pixel origin)
    pub fn lat_lng_to_layer_point(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.get_pixel_origin())
    }

    /// Converts layer point back to LatLng
    pub fn layer_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.unproject(&point.add(&self.get_pixel_origin()), None)
    }

    pub fn layer_point_to_container_point(&self, point: &Point) -> Point {
        Point::new(point.x + self.size.x / 2.0, point.y + self.size.y / 2.0)
    }

    pub fn container_point_to_layer_point(&self, point: &Point) -> Point {
        Point::new(point.x - self.size.x / 2.0, point.y - self.size.y / 2.0)
    }

    /// Pans the viewport by a screen-space drag delta; content follows the pointer.
    /// Returns the layer-space delta actually applied to the center.
    pub fn pan(&mut self, delta: Point) -> Point {
        let current_layer_point = self.lat_lng_to_layer_point(&self.center);
        let new_layer_point = current_layer_point.subtract(&delta);

        let new_center = self.layer_point_to_lat_lng(&new_layer_point);
        self.set_center(new_center);

        let actual_new_layer_point = self.lat_lng_to_layer_point(&self.center);
        actual_new_layer_point.subtract(&current_layer_point)
    }

    /// Zooms the viewport to a specific level, keeping `focus_point` (screen
    /// coordinates) over the same geographic location when given
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus_point {
            Some(focus_screen) => {
                let focus_latlng = self.pixel_to_lat_lng(&focus_screen);

                self.zoom = new_zoom;
                self.update_pixel_origin();

                // Shift the center so the focus location lands back under the pointer
                let drifted = self.lat_lng_to_pixel(&focus_latlng);
                let offset = drifted.subtract(&focus_screen);
                self.pan(Point::new(-offset.x, -offset.y));
            }
            None => self.set_zoom(new_zoom),
        }
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    fn clamp_center(center: LatLng) -> LatLng {
        LatLng::new(center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), center.lng)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokyo() -> Viewport {
        Viewport::new(LatLng::new(35.681236, 139.767125), 14.0, Point::new(1200.0, 600.0))
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = tokyo();
        assert_eq!(viewport.zoom, 14.0);
        assert_eq!(viewport.center.lat, 35.681236);
        assert_eq!(viewport.size.x, 1200.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center_lat_lng = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));
        assert!(center_lat_lng.lat.abs() < 0.01);
        assert!(center_lat_lng.lng.abs() < 0.01);
    }

    #[test]
    fn test_bounds_surround_center() {
        let viewport = tokyo();
        let bounds = viewport.bounds();

        assert!(bounds.contains(&viewport.center));
        assert!(bounds.south_west.lat < bounds.north_east.lat);
        assert!(bounds.south_west.lng < bounds.north_east.lng);
        // 1200 px at zoom 14 covers roughly 0.1 degrees of longitude
        assert!((bounds.north_east.lng - bounds.south_west.lng - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = tokyo();

        viewport.set_zoom(-3.0);
        assert_eq!(viewport.zoom, MIN_ZOOM);

        viewport.set_zoom(42.0);
        assert_eq!(viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_fit_bounds_shows_whole_area() {
        let mut viewport = tokyo();
        let target = LatLngBounds::from_coords(35.675, 139.760, 35.685, 139.775);

        viewport.fit_bounds(&target, 0.0);

        assert!(viewport.zoom > 14.0);
        let visible = viewport.bounds();
        assert!(visible.contains(&target.south_west));
        assert!(visible.contains(&target.north_east));

        // One more level would no longer fit
        let mut closer = viewport.clone();
        closer.set_zoom(viewport.zoom + 1.0);
        let closer_bounds = closer.bounds();
        assert!(
            !closer_bounds.contains(&target.south_west) || !closer_bounds.contains(&target.north_east)
        );
    }

    #[test]
    fn test_fit_bounds_on_single_point_stops_at_max_zoom() {
        let mut viewport = tokyo();
        let spot = LatLng::new(35.68, 139.76);

        viewport.fit_bounds(&LatLngBounds::from_point(spot), 20.0);

        assert_eq!(viewport.zoom, MAX_ZOOM);
        assert!((viewport.center.lat - spot.lat).abs() < 1e-9);
        assert!((viewport.center.lng - spot.lng).abs() < 1e-9);
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut viewport = tokyo();
        let start_center = viewport.center;

        // Dragging right reveals what lies to the west
        viewport.pan(Point::new(100.0, 0.0));
        assert!(viewport.center.lng < start_center.lng);
        assert!((viewport.center.lat - start_center.lat).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_around_focus_point() {
        let mut viewport = tokyo();
        let focus = Point::new(900.0, 150.0);
        let anchored = viewport.pixel_to_lat_lng(&focus);

        viewport.zoom_to(16.0, Some(focus));

        assert_eq!(viewport.zoom, 16.0);
        let after = viewport.lat_lng_to_pixel(&anchored);
        assert!(after.distance_to(&focus) < 2.0);
    }
}
