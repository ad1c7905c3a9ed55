//! Configuration for the marker map view
//!
//! Defaults reproduce the demo view (Tokyo Station, zoom 14, ten thousand
//! markers). Only the provider credential is required at runtime; the other
//! knobs can be overridden from the environment.

use crate::{
    core::{
        constants::{
            API_KEY_ENV, DEFAULT_MARKER_COUNT, DEFAULT_ORIGIN, DEFAULT_ZOOM, MARKER_COUNT_ENV,
            MARKER_TITLE_PREFIX, MARKER_URL_BASE, MAX_ZOOM, MIN_ZOOM, POINT_SPREAD_DEGREES,
            SURFACE_HEIGHT_PX, SURFACE_WIDTH_PX, ZOOM_ENV,
        },
        geo::{LatLng, Point},
    },
    MapError, Result,
};

/// Settings for the synthetic point set
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub origin: LatLng,
    /// Full width of the offset window in degrees, per axis
    pub spread: f64,
    pub title_prefix: String,
    pub url_base: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            spread: POINT_SPREAD_DEGREES,
            title_prefix: MARKER_TITLE_PREFIX.to_string(),
            url_base: MARKER_URL_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Map provider API key. `None` leaves the map surface unable to load.
    pub api_key: Option<String>,
    pub center: LatLng,
    pub zoom: f64,
    /// Size of the map region in pixels
    pub surface_size: Point,
    pub marker_count: usize,
    pub generator: GeneratorConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            center: DEFAULT_ORIGIN,
            zoom: DEFAULT_ZOOM,
            surface_size: Point::new(SURFACE_WIDTH_PX, SURFACE_HEIGHT_PX),
            marker_count: DEFAULT_MARKER_COUNT,
            generator: GeneratorConfig::default(),
        }
    }
}

impl MapConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if let Some(raw) = lookup(MARKER_COUNT_ENV) {
            config.marker_count = raw.trim().parse::<usize>().map_err(|e| {
                MapError::Config(format!("{} must be a non-negative integer: {}", MARKER_COUNT_ENV, e))
            })?;
        }

        if let Some(raw) = lookup(ZOOM_ENV) {
            let zoom = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| MapError::Config(format!("{} must be a number: {}", ZOOM_ENV, e)))?;
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                return Err(MapError::Config(format!(
                    "{} must be within {}..={}, got {}",
                    ZOOM_ENV, MIN_ZOOM, MAX_ZOOM, zoom
                ))
                .into());
            }
            config.zoom = zoom;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_marker_count(mut self, count: usize) -> Self {
        self.marker_count = count;
        self
    }

    /// The provider credential, or the error the shell reports when it is absent
    pub fn credential(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MapError::MissingCredential(API_KEY_ENV.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.center, DEFAULT_ORIGIN);
        assert_eq!(config.zoom, 14.0);
        assert_eq!(config.marker_count, 10_000);
        assert_eq!(config.surface_size.y, 600.0);
        assert!(config.credential().is_err());
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let config = MapConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, " abc123 "),
            (MARKER_COUNT_ENV, "250"),
            (ZOOM_ENV, "12.5"),
        ]))
        .unwrap();

        assert_eq!(config.credential().unwrap(), "abc123");
        assert_eq!(config.marker_count, 250);
        assert_eq!(config.zoom, 12.5);
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = MapConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(config.api_key.is_none());

        let err = config.credential().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MapError>(),
            Some(MapError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_rejects_bad_overrides() {
        assert!(MapConfig::from_lookup(lookup_from(&[(MARKER_COUNT_ENV, "-3")])).is_err());
        assert!(MapConfig::from_lookup(lookup_from(&[(ZOOM_ENV, "high")])).is_err());
        assert!(MapConfig::from_lookup(lookup_from(&[(ZOOM_ENV, "42")])).is_err());
    }
}
