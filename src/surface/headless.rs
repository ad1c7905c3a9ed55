//! In-memory map surface driven by a Web Mercator [`Viewport`].
//!
//! Used by the desktop viewer and by tests. It accepts raw pointer input,
//! hit-tests marker glyphs, fires subscribed listeners onto the host event
//! queue and reports the visible rectangle once loaded.

use crate::prelude::{HashMap, HashSet};
use crate::{
    core::{
        config::MapConfig,
        constants::{MARKER_ICON_ANCHOR, MARKER_ICON_SIZE},
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{InputEvent, MapEvent, MarkerEvent, MouseButton},
    spatial::index::SpatialIndex,
    surface::{ListenerId, MapSurface, MarkerId, PopupId, VisibleRect},
    ui::popup::{Popup, PopupContent, PopupManager},
    MapError, Result,
};
use crossbeam_channel::Sender;

/// Zoom levels applied per unit of scroll delta
const ZOOM_PER_SCROLL: f64 = 1.0;

/// Margin kept around bounds framed by [`HeadlessSurface::fit_bounds`]
const FIT_PADDING_PX: f64 = 40.0;

pub struct HeadlessSurface {
    viewport: Viewport,
    ready: bool,
    markers: HashMap<MarkerId, LatLng>,
    index: SpatialIndex<MarkerId>,
    /// Markers currently folded into a cluster icon; not hit-testable
    hidden: HashSet<MarkerId>,
    popups: PopupManager,
    listeners: HashMap<ListenerId, (MarkerId, MarkerEvent)>,
    /// Subscriptions per marker, so firing never scans every listener
    listeners_by_marker: HashMap<MarkerId, Vec<ListenerId>>,
    hovered: Option<MarkerId>,
    next_id: u64,
    events: Sender<MapEvent>,
}

impl HeadlessSurface {
    /// Creates an unloaded surface. Fails when the provider credential is
    /// missing or malformed, the way a hosted map refuses to initialize.
    pub fn new(config: &MapConfig, events: Sender<MapEvent>) -> Result<Self> {
        let key = config.credential()?;
        if key.chars().any(char::is_whitespace) {
            return Err(MapError::InvalidCredential("key contains whitespace".to_string()).into());
        }

        Ok(Self {
            viewport: Viewport::new(config.center, config.zoom, config.surface_size),
            ready: false,
            markers: HashMap::default(),
            index: SpatialIndex::new(),
            hidden: HashSet::default(),
            popups: PopupManager::new(),
            listeners: HashMap::default(),
            listeners_by_marker: HashMap::default(),
            hovered: None,
            next_id: 1,
            events,
        })
    }

    /// Finishes loading and posts [`MapEvent::Ready`]
    pub fn load(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        log::debug!("headless surface loaded at {:?} z{}", self.viewport.center, self.viewport.zoom);
        self.post(MapEvent::Ready);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Marker positions, for renderers
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, LatLng)> + '_ {
        self.markers.iter().map(|(id, pos)| (*id, *pos))
    }

    pub fn marker_position(&self, marker: MarkerId) -> Option<LatLng> {
        self.markers.get(&marker).copied()
    }

    pub fn popup(&self, popup: PopupId) -> Option<&Popup> {
        self.popups.get(popup)
    }

    pub fn open_popups(&self) -> Vec<&Popup> {
        self.popups.visible()
    }

    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn hovered(&self) -> Option<MarkerId> {
        self.hovered
    }

    /// Replaces the set of markers hidden behind cluster icons
    pub fn set_hidden(&mut self, hidden: HashSet<MarkerId>) {
        if let Some(current) = self.hovered {
            if hidden.contains(&current) {
                self.hovered = None;
                self.fire(current, MarkerEvent::HoverLeave);
            }
        }
        self.hidden = hidden;
    }

    /// Frames `bounds` at the closest zoom that shows all of it
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        self.viewport.fit_bounds(bounds, FIT_PADDING_PX);
        log::debug!("fitted view to {:?} at z{}", bounds, self.viewport.zoom);
        self.post(MapEvent::ViewportChanged);
    }

    /// Applies one pointer event from the hosting window
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::MouseMove { position } => {
                let hit = self.hit_test(position);
                self.set_hovered(hit);
            }
            InputEvent::MouseLeave => self.set_hovered(None),
            InputEvent::Click {
                position,
                button: MouseButton::Left,
            } => {
                if let Some(marker) = self.hit_test(position) {
                    self.fire(marker, MarkerEvent::Click);
                }
            }
            InputEvent::Click { .. } => {}
            InputEvent::Drag { delta } => {
                self.viewport.pan(*delta);
                self.post(MapEvent::ViewportChanged);
            }
            InputEvent::Scroll { delta, position } => {
                let target = self.viewport.zoom + delta * ZOOM_PER_SCROLL;
                self.viewport.zoom_to(target, Some(*position));
                self.post(MapEvent::ViewportChanged);
            }
            InputEvent::Resize { size } => {
                self.viewport.set_size(*size);
                self.post(MapEvent::ViewportChanged);
            }
        }
    }

    /// Topmost visible marker whose icon covers `position` (container pixels)
    pub fn hit_test(&self, position: &Point) -> Option<MarkerId> {
        let (width, height) = MARKER_ICON_SIZE;
        let (anchor_x, anchor_y) = MARKER_ICON_ANCHOR;

        // A marker is hit when the pointer lies in its icon, which sits above
        // and around the anchor; search the anchors that could produce that.
        let nw = self.viewport.pixel_to_lat_lng(&Point::new(
            position.x - (width - anchor_x),
            position.y,
        ));
        let se = self.viewport.pixel_to_lat_lng(&Point::new(
            position.x + anchor_x,
            position.y + anchor_y,
        ));
        let search = LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng);

        self.index
            .query(&search)
            .into_iter()
            .filter(|item| !self.hidden.contains(&item.data))
            .map(|item| {
                let anchor = self.viewport.lat_lng_to_pixel(&item.position);
                let icon_center = Point::new(anchor.x, anchor.y - height / 2.0);
                (item.data, icon_center.distance_to(position))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(id, _)| id)
    }

    fn set_hovered(&mut self, hit: Option<MarkerId>) {
        if hit == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            self.fire(previous, MarkerEvent::HoverLeave);
        }
        if let Some(current) = hit {
            self.fire(current, MarkerEvent::HoverEnter);
        }
        self.hovered = hit;
    }

    /// Posts one queue entry per listener subscribed to `event` on `marker`
    fn fire(&self, marker: MarkerId, event: MarkerEvent) {
        let Some(subscribed) = self.listeners_by_marker.get(&marker) else {
            return;
        };
        let mut matching: Vec<ListenerId> = subscribed
            .iter()
            .copied()
            .filter(|id| self.listeners.get(id).is_some_and(|(_, e)| *e == event))
            .collect();
        matching.sort();

        for listener in matching {
            self.post(MapEvent::Listener {
                listener,
                marker,
                event,
            });
        }
    }

    fn post(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            log::debug!("event queue closed, dropping {:?}", event);
        }
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MapSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn visible_rect(&self) -> Option<VisibleRect> {
        if !self.ready {
            return None;
        }
        let bounds = self.viewport.bounds();
        Some(VisibleRect::new(bounds.north_east, bounds.south_west))
    }

    fn add_marker(&mut self, position: LatLng) -> Result<MarkerId> {
        if !self.ready {
            return Err(MapError::SurfaceNotReady.into());
        }
        if !position.is_finite() {
            return Err(MapError::InvalidCoordinates(format!("{:?}", position)).into());
        }
        let id = MarkerId(self.allocate());
        self.markers.insert(id, position);
        self.index.insert(position, id);
        Ok(id)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if let Some(position) = self.markers.remove(&marker) {
            self.index.remove(position, marker);
            self.hidden.remove(&marker);
            if self.hovered == Some(marker) {
                self.hovered = None;
            }
            for listener in self.listeners_by_marker.remove(&marker).unwrap_or_default() {
                self.listeners.remove(&listener);
            }
        }
    }

    fn create_popup(&mut self, content: PopupContent) -> Result<PopupId> {
        let id = PopupId(self.allocate());
        self.popups.add_popup(Popup::new(id, content));
        Ok(id)
    }

    fn open_popup(&mut self, popup: PopupId, anchor: MarkerId, should_focus: bool) -> Result<()> {
        if !self.markers.contains_key(&anchor) {
            return Err(MapError::Surface(format!("cannot anchor {} to unknown {}", popup, anchor)).into());
        }
        if !self.popups.show_popup(popup, anchor, should_focus) {
            return Err(MapError::Surface(format!("unknown {}", popup)).into());
        }
        Ok(())
    }

    fn close_popup(&mut self, popup: PopupId) {
        self.popups.hide_popup(popup);
    }

    fn remove_popup(&mut self, popup: PopupId) {
        self.popups.remove_popup(popup);
    }

    fn subscribe(&mut self, marker: MarkerId, event: MarkerEvent) -> Result<ListenerId> {
        if !self.markers.contains_key(&marker) {
            return Err(MapError::Surface(format!("cannot subscribe to unknown {}", marker)).into());
        }
        let id = ListenerId(self.allocate());
        self.listeners.insert(id, (marker, event));
        self.listeners_by_marker.entry(marker).or_default().push(id);
        Ok(id)
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        let Some((marker, _)) = self.listeners.remove(&listener) else {
            return;
        };
        if let Some(subscribed) = self.listeners_by_marker.get_mut(&marker) {
            subscribed.retain(|id| *id != listener);
            if subscribed.is_empty() {
                self.listeners_by_marker.remove(&marker);
            }
        }
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
