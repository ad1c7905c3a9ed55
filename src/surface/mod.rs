//! The map capability consumed by the marker controller.
//!
//! A [`MapSurface`] is the interactive map widget: it places marker glyphs,
//! owns popups, reports its visible rectangle and fires listeners. The
//! controller only talks to it through this trait, so a browser widget, the
//! in-memory [`headless::HeadlessSurface`] or a test double can host it.

pub mod headless;

use crate::{
    core::geo::LatLng, input::MarkerEvent, ui::popup::PopupContent, Result,
};
use serde::{Deserialize, Serialize};

macro_rules! surface_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

surface_id!(
    /// A marker glyph placed on the surface
    MarkerId,
    "marker"
);
surface_id!(
    /// A popup (info window) owned by the surface
    PopupId,
    "popup"
);
surface_id!(
    /// One event subscription on one marker; removable by id
    ListenerId,
    "listener"
);

/// The visible corners of the map, as reported by the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRect {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

impl VisibleRect {
    pub fn new(north_east: LatLng, south_west: LatLng) -> Self {
        Self {
            north_east,
            south_west,
        }
    }
}

/// Interactive map widget capability
pub trait MapSurface {
    /// Whether the surface finished loading
    fn is_ready(&self) -> bool;

    /// Current visible rectangle; `None` while the surface cannot report one
    fn visible_rect(&self) -> Option<VisibleRect>;

    /// Places a marker glyph at `position`
    fn add_marker(&mut self, position: LatLng) -> Result<MarkerId>;

    /// Removes a marker glyph; unknown ids are ignored
    fn remove_marker(&mut self, marker: MarkerId);

    /// Creates a hidden popup holding `content`
    fn create_popup(&mut self, content: PopupContent) -> Result<PopupId>;

    /// Shows a popup anchored to a marker
    fn open_popup(&mut self, popup: PopupId, anchor: MarkerId, should_focus: bool) -> Result<()>;

    /// Hides a popup; closing a hidden popup is a no-op
    fn close_popup(&mut self, popup: PopupId);

    /// Destroys a popup; unknown ids are ignored
    fn remove_popup(&mut self, popup: PopupId);

    /// Subscribes to `event` on `marker`; the surface posts the returned id when it fires
    fn subscribe(&mut self, marker: MarkerId, event: MarkerEvent) -> Result<ListenerId>;

    /// Releases a subscription; unknown ids are ignored
    fn unsubscribe(&mut self, listener: ListenerId);

    /// Number of marker glyphs currently placed
    fn marker_count(&self) -> usize;
}
