#![allow(dead_code)]

use clustermap::{
    core::geo::LatLng,
    input::MarkerEvent,
    surface::{ListenerId, MapSurface, MarkerId, PopupId, VisibleRect},
    ui::popup::PopupContent,
    MapError, Result,
};
use std::collections::BTreeMap;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct MockPopup {
    pub content: PopupContent,
    pub open_on: Option<MarkerId>,
    pub focused: bool,
}

/// Map surface double that records every call and reports a settable rectangle
#[derive(Debug, Default)]
pub struct MockSurface {
    pub ready: bool,
    pub rect: Option<VisibleRect>,
    pub markers: BTreeMap<MarkerId, LatLng>,
    pub popups: BTreeMap<PopupId, MockPopup>,
    pub listeners: BTreeMap<ListenerId, (MarkerId, MarkerEvent)>,
    next_id: u64,
}

impl MockSurface {
    pub fn ready_with_rect(north_east: (f64, f64), south_west: (f64, f64)) -> Self {
        Self {
            ready: true,
            rect: Some(VisibleRect::new(
                LatLng::new(north_east.0, north_east.1),
                LatLng::new(south_west.0, south_west.1),
            )),
            ..Default::default()
        }
    }

    pub fn tokyo() -> Self {
        Self::ready_with_rect((35.70, 139.80), (35.66, 139.73))
    }

    /// Listeners that a real surface would fire for `event` on `marker`
    pub fn listeners_for(&self, marker: MarkerId, event: MarkerEvent) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, (m, e))| *m == marker && *e == event)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn open_popups(&self) -> Vec<(&PopupId, &MockPopup)> {
        self.popups.iter().filter(|(_, p)| p.open_on.is_some()).collect()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MapSurface for MockSurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn visible_rect(&self) -> Option<VisibleRect> {
        self.rect
    }

    fn add_marker(&mut self, position: LatLng) -> Result<MarkerId> {
        if !self.ready {
            return Err(MapError::SurfaceNotReady.into());
        }
        let id = MarkerId(self.allocate());
        self.markers.insert(id, position);
        Ok(id)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn create_popup(&mut self, content: PopupContent) -> Result<PopupId> {
        let id = PopupId(self.allocate());
        self.popups.insert(
            id,
            MockPopup {
                content,
                open_on: None,
                focused: false,
            },
        );
        Ok(id)
    }

    fn open_popup(&mut self, popup: PopupId, anchor: MarkerId, should_focus: bool) -> Result<()> {
        let entry = self
            .popups
            .get_mut(&popup)
            .ok_or_else(|| MapError::Surface(format!("unknown {}", popup)))?;
        entry.open_on = Some(anchor);
        entry.focused = should_focus;
        Ok(())
    }

    fn close_popup(&mut self, popup: PopupId) {
        if let Some(entry) = self.popups.get_mut(&popup) {
            entry.open_on = None;
            entry.focused = false;
        }
    }

    fn remove_popup(&mut self, popup: PopupId) {
        self.popups.remove(&popup);
    }

    fn subscribe(&mut self, marker: MarkerId, event: MarkerEvent) -> Result<ListenerId> {
        if !self.markers.contains_key(&marker) {
            return Err(MapError::Surface(format!("unknown {}", marker)).into());
        }
        let id = ListenerId(self.allocate());
        self.listeners.insert(id, (marker, event));
        Ok(id)
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
