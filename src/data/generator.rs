use crate::{core::config::GeneratorConfig, data::GeoPoint};
use rand::Rng;

/// Produces synthetic labeled points scattered around a fixed origin
#[derive(Debug, Clone, Default)]
pub struct PointGenerator {
    config: GeneratorConfig,
}

impl PointGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates `count` points from the thread-local random source
    pub fn generate(&self, count: usize) -> Vec<GeoPoint> {
        self.generate_with(count, &mut rand::thread_rng())
    }

    /// Generates `count` points from the given random source.
    ///
    /// Each axis gets an independent offset of `(u - 0.5) * spread` with `u`
    /// uniform in `[0, 1)`. Titles are `<prefix><i + 1>`; URLs append the
    /// title to the configured base.
    pub fn generate_with<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<GeoPoint> {
        let GeneratorConfig {
            origin,
            spread,
            title_prefix,
            url_base,
        } = &self.config;

        (0..count)
            .map(|i| {
                let lat = origin.lat + (rng.gen::<f64>() - 0.5) * spread;
                let lng = origin.lng + (rng.gen::<f64>() - 0.5) * spread;
                let title = format!("{}{}", title_prefix, i + 1);
                let url = format!("{}{}", url_base, title);
                GeoPoint::new(lat, lng, title, url)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{DEFAULT_ORIGIN, POINT_SPREAD_DEGREES};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generates_exact_count() {
        let generator = PointGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0usize, 1, 2, 57, 1000] {
            assert_eq!(generator.generate_with(n, &mut rng).len(), n);
        }
    }

    #[test]
    fn test_points_stay_within_offset_window() {
        let generator = PointGenerator::default();
        let half = POINT_SPREAD_DEGREES / 2.0;
        let points = generator.generate_with(5000, &mut StdRng::seed_from_u64(42));

        for p in &points {
            assert!((p.lat - DEFAULT_ORIGIN.lat).abs() <= half, "{:?}", p);
            assert!((p.lng - DEFAULT_ORIGIN.lng).abs() <= half, "{:?}", p);
            assert!(p.is_placeable());
        }
    }

    #[test]
    fn test_titles_and_urls_are_sequential() {
        let points = PointGenerator::default().generate(25);

        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.title, format!("Marker-{}", i + 1));
            assert_eq!(p.url, format!("https://example.com/{}", p.title));
        }
    }

    #[test]
    fn test_custom_origin_and_base() {
        let config = GeneratorConfig {
            origin: crate::core::geo::LatLng::new(0.0, 0.0),
            spread: 1.0,
            title_prefix: "Cam-".to_string(),
            url_base: "https://cams.local/view/".to_string(),
        };
        let points = PointGenerator::new(config).generate_with(3, &mut StdRng::seed_from_u64(1));

        assert_eq!(points[2].title, "Cam-3");
        assert_eq!(points[2].url, "https://cams.local/view/Cam-3");
        assert!(points.iter().all(|p| p.lat.abs() <= 0.5 && p.lng.abs() <= 0.5));
    }
}
