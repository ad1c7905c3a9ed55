use crate::{
    data::GeoPoint,
    layers::marker::{MarkerAction, MarkerHandle},
    spatial::{
        clustering::{ClusterCapability, OverlayId},
        overlay::ClusterOverlay,
    },
    surface::{ListenerId, MapSurface},
    Result,
};

/// Outcome of one overlay installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallReport {
    pub overlay: OverlayId,
    pub generation: u64,
    pub installed: usize,
    /// Points dropped because their coordinates were not finite
    pub skipped: usize,
}

/// Owns the single active [`ClusterOverlay`] and swaps it as a unit
pub struct ClusterCoordinator<C: ClusterCapability> {
    capability: C,
    active: Option<ClusterOverlay>,
    generation: u64,
}

impl<C: ClusterCapability> ClusterCoordinator<C> {
    pub fn new(capability: C) -> Self {
        Self {
            capability,
            active: None,
            generation: 0,
        }
    }

    /// Replaces the active overlay with one built from `points`.
    ///
    /// The previous overlay is cleared before any new marker is placed. On
    /// failure every marker bound in this call is released again and no
    /// overlay is left active.
    pub fn install(&mut self, surface: &mut dyn MapSurface, points: &[GeoPoint]) -> Result<InstallReport> {
        self.teardown(surface);
        self.generation += 1;

        let mut handles = Vec::with_capacity(points.len());
        let mut skipped = 0;
        for (index, point) in points.iter().enumerate() {
            if !point.is_placeable() {
                log::warn!(
                    "skipping {} with non-finite coordinates ({}, {})",
                    point.title,
                    point.lat,
                    point.lng
                );
                skipped += 1;
                continue;
            }

            match MarkerHandle::bind(index, point, surface) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    Self::release_all(handles, surface);
                    return Err(e);
                }
            }
        }

        let overlay = match self.capability.install(surface, &handles) {
            Ok(overlay) => overlay,
            Err(e) => {
                Self::release_all(handles, surface);
                return Err(e);
            }
        };

        let report = InstallReport {
            overlay,
            generation: self.generation,
            installed: handles.len(),
            skipped,
        };
        self.active = Some(ClusterOverlay::new(overlay, self.generation, handles));

        log::info!(
            "installed {} with {} markers (generation {}, {} skipped)",
            overlay,
            report.installed,
            report.generation,
            report.skipped
        );
        Ok(report)
    }

    /// Clears the active overlay, if any
    pub fn teardown(&mut self, surface: &mut dyn MapSurface) {
        if let Some(previous) = self.active.take() {
            log::debug!(
                "clearing {} ({} markers, generation {})",
                previous.id(),
                previous.len(),
                previous.generation()
            );
            previous.dispose(&mut self.capability, surface);
        }
    }

    /// Resolves a fired listener against the active overlay
    pub fn route(&self, listener: ListenerId) -> Option<MarkerAction> {
        self.active.as_ref()?.route(listener)
    }

    pub fn active(&self) -> Option<&ClusterOverlay> {
        self.active.as_ref()
    }

    pub fn live_marker_count(&self) -> usize {
        self.active.as_ref().map_or(0, ClusterOverlay::len)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub fn capability_mut(&mut self) -> &mut C {
        &mut self.capability
    }

    fn release_all(handles: Vec<MarkerHandle>, surface: &mut dyn MapSurface) {
        for handle in handles {
            handle.release(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::config::MapConfig,
        spatial::clustering::GridClusterer,
        surface::headless::HeadlessSurface,
        MapError,
    };
    use crossbeam_channel::unbounded;

    fn loaded_surface() -> HeadlessSurface {
        let (tx, _rx) = unbounded();
        let mut surface =
            HeadlessSurface::new(&MapConfig::default().with_api_key("k"), tx).unwrap();
        surface.load();
        surface
    }

    fn points(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| {
                let title = format!("Marker-{}", i + 1);
                GeoPoint::new(
                    35.68 + i as f64 * 1e-4,
                    139.76,
                    title.clone(),
                    format!("https://example.com/{}", title),
                )
            })
            .collect()
    }

    /// Clustering capability that always refuses
    struct FailingClusterer;

    impl ClusterCapability for FailingClusterer {
        fn install(&mut self, _: &mut dyn MapSurface, _: &[MarkerHandle]) -> Result<OverlayId> {
            Err(MapError::Cluster("refused".to_string()).into())
        }

        fn clear(&mut self, _: &mut dyn MapSurface, _: OverlayId) {}
    }

    #[test]
    fn test_reinstall_does_not_leak_markers() {
        let mut surface = loaded_surface();
        let mut coordinator = ClusterCoordinator::new(GridClusterer::default());
        let set = points(40);

        let first = coordinator.install(&mut surface, &set).unwrap();
        let second = coordinator.install(&mut surface, &set).unwrap();

        assert_eq!(second.installed, 40);
        assert_ne!(first.overlay, second.overlay);
        assert_eq!(surface.marker_count(), 40);
        assert_eq!(surface.listener_count(), 120);
        assert_eq!(surface.popup_count(), 40);
        assert_eq!(coordinator.capability().overlay_count(), 1);
        assert_eq!(coordinator.capability().marker_count(first.overlay), None);
    }

    #[test]
    fn test_empty_install_is_valid() {
        let mut surface = loaded_surface();
        let mut coordinator = ClusterCoordinator::new(GridClusterer::default());

        let report = coordinator.install(&mut surface, &[]).unwrap();
        assert_eq!(report.installed, 0);
        assert!(coordinator.active().unwrap().is_empty());
        assert_eq!(surface.marker_count(), 0);
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let mut surface = loaded_surface();
        let mut coordinator = ClusterCoordinator::new(GridClusterer::default());
        let mut set = points(5);
        set[2].lng = f64::INFINITY;

        let report = coordinator.install(&mut surface, &set).unwrap();
        assert_eq!(report.installed, 4);
        assert_eq!(report.skipped, 1);
        assert!(coordinator
            .active()
            .unwrap()
            .handles()
            .iter()
            .all(|h| h.index() != 2));
    }

    #[test]
    fn test_failed_install_leaves_nothing_behind() {
        let mut surface = loaded_surface();
        let mut coordinator = ClusterCoordinator::new(FailingClusterer);

        assert!(coordinator.install(&mut surface, &points(10)).is_err());
        assert!(coordinator.active().is_none());
        assert_eq!(surface.marker_count(), 0);
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_stale_listener_routes_nowhere() {
        let mut surface = loaded_surface();
        let mut coordinator = ClusterCoordinator::new(GridClusterer::default());

        coordinator.install(&mut surface, &points(1)).unwrap();
        let stale = coordinator.active().unwrap().handles()[0].subscriptions()[0].listener;
        assert!(coordinator.route(stale).is_some());

        coordinator.install(&mut surface, &points(1)).unwrap();
        assert!(coordinator.route(stale).is_none());
    }
}
