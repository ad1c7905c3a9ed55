use crate::prelude::HashMap;
use crate::{
    core::{geo::LatLng, viewport::Viewport},
    layers::marker::MarkerHandle,
    spatial::index::{SpatialIndex, SpatialItem},
    surface::{MapSurface, MarkerId},
    MapError, Result,
};

/// Handle to one marker collection installed through a [`ClusterCapability`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// External clustering capability.
///
/// It receives the complete marker set of a generation in one call and owns
/// the visual grouping; the caller only keeps the returned overlay id.
pub trait ClusterCapability {
    /// Groups `markers` into a new overlay on `surface`
    fn install(&mut self, surface: &mut dyn MapSurface, markers: &[MarkerHandle]) -> Result<OverlayId>;

    /// Detaches every marker of `overlay`; unknown ids are ignored
    fn clear(&mut self, surface: &mut dyn MapSurface, overlay: OverlayId);
}

/// Represents a cluster of markers
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Unique identifier for the cluster
    pub id: String,
    /// Mean position of the members
    pub center: LatLng,
    /// Markers in this cluster
    pub markers: Vec<MarkerId>,
    /// Zoom level at which this cluster was created
    pub zoom_level: f64,
}

impl Cluster {
    fn new(id: String, items: &[&SpatialItem<MarkerId>], zoom_level: f64) -> Self {
        let count = items.len().max(1) as f64;
        let (lat_sum, lng_sum) = items.iter().fold((0.0, 0.0), |(lat, lng), item| {
            (lat + item.position.lat, lng + item.position.lng)
        });
        let mut markers: Vec<MarkerId> = items.iter().map(|item| item.data).collect();
        markers.sort();

        Self {
            id,
            center: LatLng::new(lat_sum / count, lng_sum / count),
            markers,
            zoom_level,
        }
    }

    /// Create cluster ID for grid cells
    fn cell_id(grid_x: i64, grid_y: i64, chunk_index: Option<usize>) -> String {
        match chunk_index {
            Some(chunk) => format!("cluster_{}_{}__{}", grid_x, grid_y, chunk),
            None => format!("cluster_{}_{}", grid_x, grid_y),
        }
    }

    /// Get the number of markers in the cluster
    pub fn count(&self) -> usize {
        self.markers.len()
    }

    /// Check if this is a single-marker cluster
    pub fn is_single(&self) -> bool {
        self.markers.len() == 1
    }

    /// Radius in pixels of the round cluster icon; grows with the member count
    pub fn icon_radius(&self) -> f64 {
        14.0 + (self.count().max(1) as f64).log10() * 6.0
    }
}

/// Configuration for clustering
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Zoom level from which every marker is shown individually
    pub disable_clustering_at_zoom: f64,
    /// Maximum number of markers in a single cluster
    pub max_cluster_size: usize,
    /// Grid size for clustering (in pixels)
    pub grid_size: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            disable_clustering_at_zoom: 18.0,
            max_cluster_size: 500,
            grid_size: 60.0,
        }
    }
}

/// Grid-based clustering capability.
///
/// Each installed overlay keeps an R-tree of its marker positions; clusters
/// are computed on demand for a viewport by bucketing the visible markers
/// into square pixel cells.
pub struct GridClusterer {
    config: ClusteringConfig,
    overlays: HashMap<OverlayId, SpatialIndex<MarkerId>>,
    next_overlay: u64,
}

impl GridClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            overlays: HashMap::default(),
            next_overlay: 1,
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClusteringConfig) {
        self.config = config;
    }

    /// Number of overlays currently installed
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Number of markers held by an overlay, `None` if it is not installed
    pub fn marker_count(&self, overlay: OverlayId) -> Option<usize> {
        self.overlays.get(&overlay).map(|index| index.len())
    }

    /// Clusters of `overlay` intersecting the viewport
    pub fn clusters(&self, overlay: OverlayId, viewport: &Viewport) -> Vec<Cluster> {
        let index = match self.overlays.get(&overlay) {
            Some(index) => index,
            None => return Vec::new(),
        };

        let zoom_level = viewport.zoom;
        let items = index.query(&viewport.bounds());

        if zoom_level >= self.config.disable_clustering_at_zoom {
            let mut singles: Vec<Cluster> = items
                .iter()
                .map(|item| Cluster::new(format!("single_{}", item.data.0), &[*item], zoom_level))
                .collect();
            singles.sort_by(|a, b| a.markers.cmp(&b.markers));
            return singles;
        }

        // Group items by grid cell in world pixel space
        let grid_size = self.config.grid_size.max(1.0);
        let mut cells: HashMap<(i64, i64), Vec<&SpatialItem<MarkerId>>> = HashMap::default();
        cells.reserve((items.len() / 4).max(16));
        for item in items {
            let pixel = viewport.project(&item.position, None);
            let cell = (
                (pixel.x / grid_size).floor() as i64,
                (pixel.y / grid_size).floor() as i64,
            );
            cells.entry(cell).or_default().push(item);
        }

        let mut keys: Vec<(i64, i64)> = cells.keys().copied().collect();
        keys.sort();

        let max_size = self.config.max_cluster_size.max(1);
        let mut clusters = Vec::with_capacity(keys.len());
        for (grid_x, grid_y) in keys {
            let mut cell_items = cells.remove(&(grid_x, grid_y)).unwrap_or_default();
            cell_items.sort_by_key(|item| item.data);

            if cell_items.len() <= max_size {
                let id = Cluster::cell_id(grid_x, grid_y, None);
                clusters.push(Cluster::new(id, &cell_items, zoom_level));
            } else {
                // Too many markers - split into multiple clusters
                for (i, chunk) in cell_items.chunks(max_size).enumerate() {
                    let id = Cluster::cell_id(grid_x, grid_y, Some(i));
                    clusters.push(Cluster::new(id, chunk, zoom_level));
                }
            }
        }

        clusters
    }
}

impl Default for GridClusterer {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}

impl ClusterCapability for GridClusterer {
    fn install(&mut self, surface: &mut dyn MapSurface, markers: &[MarkerHandle]) -> Result<OverlayId> {
        if !surface.is_ready() {
            return Err(MapError::Cluster("surface is not ready".to_string()).into());
        }

        let items = markers
            .iter()
            .map(|handle| SpatialItem::new(handle.position(), handle.marker()))
            .collect();
        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;
        self.overlays.insert(id, SpatialIndex::bulk_load(items));

        log::debug!("{} clustering {} markers", id, markers.len());
        Ok(id)
    }

    fn clear(&mut self, _surface: &mut dyn MapSurface, overlay: OverlayId) {
        if self.overlays.remove(&overlay).is_some() {
            log::debug!("{} cleared", overlay);
        }
    }
}
