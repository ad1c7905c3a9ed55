//! Prelude module for common clustermap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use clustermap::prelude::*;`

pub use crate::core::{
    bounds::BoundingBox,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point},
    tracker::ViewportTracker,
    viewport::Viewport,
};

pub use crate::data::{generator::PointGenerator, GeoPoint};

pub use crate::input::{InputEvent, MapEvent, MarkerEvent, MouseButton};

pub use crate::layers::marker::{MarkerAction, MarkerHandle};

pub use crate::spatial::{
    clustering::{Cluster, ClusterCapability, ClusteringConfig, GridClusterer, OverlayId},
    coordinator::{ClusterCoordinator, InstallReport},
    index::{SpatialIndex, SpatialItem},
    overlay::ClusterOverlay,
};

pub use crate::surface::{
    headless::HeadlessSurface, ListenerId, MapSurface, MarkerId, PopupId, VisibleRect,
};

pub use crate::controller::{ControllerState, MarkerSetController};

pub use crate::navigation::{LogNavigator, Navigator, RecordingNavigator};

pub use crate::ui::{
    popup::{Popup, PopupContent, PopupManager},
    shell::{ShellState, ViewShell},
};

#[cfg(feature = "egui")]
pub use crate::ui::widget::{MapView, MapViewStyle};

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
