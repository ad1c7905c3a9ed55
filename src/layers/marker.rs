//! Marker interaction binding.
//!
//! Every point becomes a [`MarkerHandle`]: one glyph, one hidden popup and
//! three listener subscriptions. Handlers are not closures; each listener id
//! maps to a [`MarkerAction`] that the controller executes, so subscriptions
//! stay inspectable and removable.

use crate::{
    core::geo::LatLng,
    data::GeoPoint,
    input::MarkerEvent,
    surface::{ListenerId, MapSurface, MarkerId, PopupId},
    ui::popup::PopupContent,
    MapError, Result,
};

/// What a fired listener asks the controller to do
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerAction {
    /// Show the popup anchored to its marker without taking focus
    OpenPopup { popup: PopupId, anchor: MarkerId },
    ClosePopup { popup: PopupId },
    /// Full-page navigation replacing the current view
    Navigate { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subscription {
    pub listener: ListenerId,
    pub event: MarkerEvent,
}

/// The live interactive object for one [`GeoPoint`]
#[derive(Debug)]
pub struct MarkerHandle {
    index: usize,
    position: LatLng,
    title: String,
    url: String,
    marker: MarkerId,
    popup: PopupId,
    subscriptions: [Subscription; 3],
}

impl MarkerHandle {
    /// Places `point` on `surface` with its popup and listeners.
    ///
    /// Non-finite coordinates are rejected before anything touches the
    /// surface. If a later step fails, whatever was already created is
    /// removed again.
    pub fn bind(index: usize, point: &GeoPoint, surface: &mut dyn MapSurface) -> Result<Self> {
        if !point.is_placeable() {
            return Err(MapError::InvalidCoordinates(format!(
                "{} at ({}, {})",
                point.title, point.lat, point.lng
            ))
            .into());
        }

        let position = point.position();
        let marker = surface.add_marker(position)?;

        let popup = match surface.create_popup(PopupContent::for_point(point)) {
            Ok(popup) => popup,
            Err(e) => {
                surface.remove_marker(marker);
                return Err(e);
            }
        };

        let mut subscriptions = Vec::with_capacity(MarkerEvent::ALL.len());
        for event in MarkerEvent::ALL {
            match surface.subscribe(marker, event) {
                Ok(listener) => subscriptions.push(Subscription { listener, event }),
                Err(e) => {
                    for sub in &subscriptions {
                        surface.unsubscribe(sub.listener);
                    }
                    surface.remove_popup(popup);
                    surface.remove_marker(marker);
                    return Err(e);
                }
            }
        }

        let subscriptions = [subscriptions[0], subscriptions[1], subscriptions[2]];

        Ok(Self {
            index,
            position,
            title: point.title.clone(),
            url: point.url.clone(),
            marker,
            popup,
            subscriptions,
        })
    }

    /// Position of the point in the generated sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn marker(&self) -> MarkerId {
        self.marker
    }

    pub fn popup(&self) -> PopupId {
        self.popup
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// The action bound to `listener`, if it belongs to this marker
    pub fn action_for(&self, listener: ListenerId) -> Option<MarkerAction> {
        let sub = self.subscriptions.iter().find(|s| s.listener == listener)?;
        Some(match sub.event {
            MarkerEvent::HoverEnter => MarkerAction::OpenPopup {
                popup: self.popup,
                anchor: self.marker,
            },
            MarkerEvent::HoverLeave => MarkerAction::ClosePopup { popup: self.popup },
            MarkerEvent::Click => MarkerAction::Navigate {
                url: self.url.clone(),
            },
        })
    }

    /// Releases every subscription, the popup and the glyph
    pub fn release(self, surface: &mut dyn MapSurface) {
        for sub in &self.subscriptions {
            surface.unsubscribe(sub.listener);
        }
        surface.close_popup(self.popup);
        surface.remove_popup(self.popup);
        surface.remove_marker(self.marker);
    }
}
