//! The spatial marker-set controller.
//!
//! Ties the point set, the [`ClusterCoordinator`] and the
//! [`ViewportTracker`] together and reacts to surface events:
//!
//! ```text
//! Uninitialized --ready--> Installing --overlay + first bounds--> Ready
//! Ready --points replaced--> Installing
//! Ready --viewport changed--> Ready
//! ```

use crate::{
    core::{bounds::BoundingBox, tracker::ViewportTracker},
    data::GeoPoint,
    input::MapEvent,
    layers::marker::MarkerAction,
    navigation::Navigator,
    spatial::{
        clustering::ClusterCapability,
        coordinator::{ClusterCoordinator, InstallReport},
    },
    surface::{ListenerId, MapSurface},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No surface has been handed over yet
    Uninitialized,
    /// Binding markers and installing the overlay
    Installing,
    /// Overlay installed and bounds tracked
    Ready,
}

pub struct MarkerSetController<C: ClusterCapability> {
    state: ControllerState,
    coordinator: ClusterCoordinator<C>,
    tracker: ViewportTracker,
    points: Vec<GeoPoint>,
}

impl<C: ClusterCapability> MarkerSetController<C> {
    pub fn new(capability: C) -> Self {
        Self {
            state: ControllerState::Uninitialized,
            coordinator: ClusterCoordinator::new(capability),
            tracker: ViewportTracker::new(),
            points: Vec::new(),
        }
    }

    pub fn with_points(mut self, points: Vec<GeoPoint>) -> Self {
        self.points = points;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.tracker.current()
    }

    pub fn tracker(&self) -> &ViewportTracker {
        &self.tracker
    }

    pub fn coordinator(&self) -> &ClusterCoordinator<C> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ClusterCoordinator<C> {
        &mut self.coordinator
    }

    /// Routes one queued surface event to its handler
    pub fn handle(
        &mut self,
        event: MapEvent,
        surface: &mut dyn MapSurface,
        navigator: &mut dyn Navigator,
    ) -> Result<()> {
        match event {
            MapEvent::Ready => self.on_map_ready(surface).map(|_| ()),
            MapEvent::ViewportChanged => {
                self.on_viewport_changed(surface);
                Ok(())
            }
            MapEvent::Listener { listener, .. } => {
                self.on_listener(listener, surface, navigator).map(|_| ())
            }
        }
    }

    /// The surface became available: install the current point set
    pub fn on_map_ready(&mut self, surface: &mut dyn MapSurface) -> Result<InstallReport> {
        log::debug!("map surface ready");
        self.install(surface)
    }

    /// Replaces the point set; reinstalls right away when a surface is available
    pub fn set_points(
        &mut self,
        points: Vec<GeoPoint>,
        surface: Option<&mut dyn MapSurface>,
    ) -> Result<Option<InstallReport>> {
        self.points = points;
        match surface {
            Some(surface) if surface.is_ready() => self.install(surface).map(Some),
            _ => Ok(None),
        }
    }

    /// Recomputes the bounds after a pan, zoom or resize.
    /// Ignored until the surface has been handed over.
    pub fn on_viewport_changed(&mut self, surface: &dyn MapSurface) -> Option<BoundingBox> {
        if self.state == ControllerState::Uninitialized {
            return None;
        }
        self.refresh_bounds(surface)
    }

    /// Executes the action bound to a fired listener.
    /// Listeners of replaced overlays resolve to nothing.
    pub fn on_listener(
        &mut self,
        listener: ListenerId,
        surface: &mut dyn MapSurface,
        navigator: &mut dyn Navigator,
    ) -> Result<Option<MarkerAction>> {
        let action = match self.coordinator.route(listener) {
            Some(action) => action,
            None => {
                log::debug!("{} is not bound to the active overlay", listener);
                return Ok(None);
            }
        };

        match &action {
            MarkerAction::OpenPopup { popup, anchor } => surface.open_popup(*popup, *anchor, false)?,
            MarkerAction::ClosePopup { popup } => surface.close_popup(*popup),
            MarkerAction::Navigate { url } => navigator.navigate(url)?,
        }
        Ok(Some(action))
    }

    /// Removes the overlay and forgets the surface; bounds are kept
    pub fn teardown(&mut self, surface: &mut dyn MapSurface) {
        self.coordinator.teardown(surface);
        self.state = ControllerState::Uninitialized;
    }

    fn install(&mut self, surface: &mut dyn MapSurface) -> Result<InstallReport> {
        self.state = ControllerState::Installing;
        match self.coordinator.install(surface, &self.points) {
            Ok(report) => {
                self.refresh_bounds(surface);
                self.state = ControllerState::Ready;
                Ok(report)
            }
            Err(e) => {
                log::warn!("marker installation failed: {}", e);
                self.state = ControllerState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Single bounds update path for both post-install and viewport changes
    fn refresh_bounds(&mut self, surface: &dyn MapSurface) -> Option<BoundingBox> {
        self.tracker.refresh(surface)
    }
}
