//! The view shell: owns the map surface, its event queue and the
//! controller, and produces the bounds readout.

use crate::prelude::HashSet;
use crate::{
    core::{
        bounds::BoundingBox,
        config::MapConfig,
        geo::{LatLngBounds, Point},
    },
    controller::{ControllerState, MarkerSetController},
    data::GeoPoint,
    input::{InputEvent, MapEvent, MouseButton},
    navigation::Navigator,
    spatial::{
        clustering::{Cluster, ClusterCapability, GridClusterer},
        coordinator::InstallReport,
    },
    surface::{headless::HeadlessSurface, MapSurface, MarkerId},
    Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Heading printed above the bounds readout
pub const BOUNDS_HEADING: &str = "Current map bounds";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellState {
    /// Surface created, waiting for its ready event
    Loading,
    /// Markers installed and interactive
    Live,
    /// The surface could not load; the message is shown in its place
    Degraded(String),
}

pub struct ViewShell<S, C, N>
where
    S: MapSurface,
    C: ClusterCapability,
    N: Navigator,
{
    config: MapConfig,
    state: ShellState,
    surface: Option<S>,
    controller: MarkerSetController<C>,
    navigator: N,
    events: Receiver<MapEvent>,
}

impl<S, C, N> ViewShell<S, C, N>
where
    S: MapSurface,
    C: ClusterCapability,
    N: Navigator,
{
    /// Creates the shell and asks `build` for a surface wired to the shell's
    /// event queue. A missing credential or a failing build leaves the shell
    /// in [`ShellState::Degraded`] instead of erroring.
    pub fn launch<F>(
        config: MapConfig,
        capability: C,
        navigator: N,
        points: Vec<GeoPoint>,
        build: F,
    ) -> Self
    where
        F: FnOnce(&MapConfig, Sender<MapEvent>) -> Result<S>,
    {
        let (sender, events) = unbounded();
        let controller = MarkerSetController::new(capability).with_points(points);

        let built = config.credential().and_then(|_| build(&config, sender));
        let (surface, state) = match built {
            Ok(surface) => (Some(surface), ShellState::Loading),
            Err(e) => {
                log::warn!("map surface failed to load: {}", e);
                (None, ShellState::Degraded(format!("Map failed to load: {}", e)))
            }
        };

        Self {
            config,
            state,
            surface,
            controller,
            navigator,
            events,
        }
    }

    /// Drains the event queue, dispatching each event to the controller.
    ///
    /// Runs of viewport changes collapse into one bounds read at the end of
    /// the batch. Returns the number of events dispatched.
    pub fn pump(&mut self) -> usize {
        let Some(surface) = self.surface.as_mut() else {
            // Nothing can post without a surface
            return 0;
        };

        let mut dispatched = 0;
        let mut viewport_dirty = false;

        while let Ok(event) = self.events.try_recv() {
            if event == MapEvent::ViewportChanged {
                viewport_dirty = true;
                continue;
            }

            let result = self.controller.handle(event, surface, &mut self.navigator);
            dispatched += 1;

            match (event, result) {
                (MapEvent::Ready, outcome) => self.state = Self::install_state(outcome),
                (_, Err(e)) => log::warn!("failed to handle {:?}: {}", event, e),
                _ => {}
            }
        }

        if viewport_dirty {
            self.controller.on_viewport_changed(surface);
            dispatched += 1;
        }

        dispatched
    }

    /// Swaps in a new point set, reinstalling immediately when the surface
    /// is ready. The shell state follows the outcome of that reinstall.
    pub fn replace_points(&mut self, points: Vec<GeoPoint>) -> Result<Option<InstallReport>> {
        let surface = self.surface.as_mut().map(|s| s as &mut dyn MapSurface);
        let result = self.controller.set_points(points, surface);
        match &result {
            Ok(Some(_)) => self.state = ShellState::Live,
            Ok(None) => {}
            Err(e) => self.state = ShellState::Degraded(Self::marker_failure(e.as_ref())),
        }
        result
    }

    fn install_state(outcome: Result<()>) -> ShellState {
        match outcome {
            Ok(()) => ShellState::Live,
            Err(e) => ShellState::Degraded(Self::marker_failure(e.as_ref())),
        }
    }

    fn marker_failure(e: &(dyn std::error::Error + Send + Sync)) -> String {
        format!("Map failed to load markers: {}", e)
    }

    /// Removes every marker from the surface
    pub fn teardown(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            self.controller.teardown(surface);
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.controller.bounds()
    }

    /// The bounds text block, present only once bounds were computed
    pub fn bounds_readout(&self) -> Option<String> {
        self.controller
            .tracker()
            .readout()
            .map(|lines| format!("{}\n{}", BOUNDS_HEADING, lines))
    }

    /// Plain-text rendering of the whole view
    pub fn render_text(&self) -> String {
        let size = self.config.surface_size;
        let region = match &self.state {
            ShellState::Loading => "Loading map...".to_string(),
            ShellState::Degraded(message) => message.clone(),
            ShellState::Live => format!(
                "[map {}x{} px, {} markers]",
                size.x,
                size.y,
                self.controller.coordinator().live_marker_count()
            ),
        };

        match self.bounds_readout() {
            Some(readout) => format!("{}\n\n{}", region, readout),
            None => region,
        }
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn controller(&self) -> &MarkerSetController<C> {
        &self.controller
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

impl<C, N> ViewShell<HeadlessSurface, C, N>
where
    C: ClusterCapability,
    N: Navigator,
{
    /// Launches a shell over a [`HeadlessSurface`] and loads it
    pub fn headless(config: MapConfig, capability: C, navigator: N, points: Vec<GeoPoint>) -> Self {
        Self::launch(config, capability, navigator, points, |config, sender| {
            let mut surface = HeadlessSurface::new(config, sender)?;
            surface.load();
            Ok(surface)
        })
    }

    /// Feeds one pointer event to the surface and dispatches what it caused
    pub fn handle_input(&mut self, event: &InputEvent) -> usize {
        match self.surface.as_mut() {
            Some(surface) => surface.handle_input(event),
            None => return 0,
        }
        self.pump()
    }
}

impl<N: Navigator> ViewShell<HeadlessSurface, GridClusterer, N> {
    /// Clusters of the active overlay for the current viewport
    pub fn clusters(&self) -> Vec<Cluster> {
        let (Some(surface), Some(overlay)) =
            (self.surface.as_ref(), self.controller.coordinator().active())
        else {
            return Vec::new();
        };
        self.controller
            .coordinator()
            .capability()
            .clusters(overlay.id(), surface.viewport())
    }

    /// The multi-marker cluster whose icon covers `position` (container pixels)
    pub fn cluster_at(&self, position: &Point) -> Option<Cluster> {
        let surface = self.surface.as_ref()?;
        let viewport = surface.viewport();
        self.clusters()
            .into_iter()
            .filter(|c| !c.is_single())
            .map(|c| {
                let distance = viewport.lat_lng_to_pixel(&c.center).distance_to(position);
                (c, distance)
            })
            .filter(|(c, distance)| *distance <= c.icon_radius())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// A primary click: zooms into a cluster icon when one is hit, otherwise
    /// clicks whatever marker lies under the pointer
    pub fn click(&mut self, position: Point) -> usize {
        let Some(cluster) = self.cluster_at(&position) else {
            return self.handle_input(&InputEvent::Click {
                position,
                button: MouseButton::Left,
            });
        };

        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };
        let mut members = cluster
            .markers
            .iter()
            .filter_map(|m| surface.marker_position(*m));
        let Some(first) = members.next() else {
            return 0;
        };
        let mut bounds = LatLngBounds::from_point(first);
        for position in members {
            bounds.extend(&position);
        }

        log::debug!("zooming into {} ({} markers)", cluster.id, cluster.count());
        surface.fit_bounds(&bounds);
        let dispatched = self.pump();
        self.sync_cluster_visibility();
        dispatched
    }

    /// Hides markers folded into multi-marker clusters from hit testing.
    /// Returns the clusters it was computed from.
    pub fn sync_cluster_visibility(&mut self) -> Vec<Cluster> {
        let clusters = self.clusters();
        let hidden: HashSet<MarkerId> = clusters
            .iter()
            .filter(|c| !c.is_single())
            .flat_map(|c| c.markers.iter().copied())
            .collect();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_hidden(hidden);
        }
        clusters
    }
}
