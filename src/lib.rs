//! # clustermap
//!
//! A clustered marker map controller.
//!
//! The crate generates a labeled point set, binds each point to an
//! interactive marker (hover popup, click navigation), installs the whole set
//! as a single clustered overlay and keeps the visible bounding box in sync
//! with the user's pan and zoom. Map rendering, clustering visuals and
//! navigation are reached through capability traits so any map widget can
//! host the controller.

pub mod controller;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod navigation;
pub mod prelude;
pub mod spatial;
pub mod surface;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::BoundingBox,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point},
    tracker::ViewportTracker,
    viewport::Viewport,
};

pub use controller::{ControllerState, MarkerSetController};

pub use data::{generator::PointGenerator, GeoPoint};

pub use input::{InputEvent, MapEvent, MarkerEvent};

pub use layers::marker::{MarkerAction, MarkerHandle};

pub use navigation::{LogNavigator, Navigator, RecordingNavigator};

pub use spatial::{
    clustering::{ClusterCapability, GridClusterer, OverlayId},
    coordinator::{ClusterCoordinator, InstallReport},
    overlay::ClusterOverlay,
};

pub use surface::{headless::HeadlessSurface, ListenerId, MapSurface, MarkerId, PopupId, VisibleRect};

pub use ui::{popup::PopupContent, shell::{ShellState, ViewShell}};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Missing map provider credential: set {0}")]
    MissingCredential(String),

    #[error("Invalid map provider credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Map surface is not ready")]
    SurfaceNotReady,

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Cluster error: {0}")]
    Cluster(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
