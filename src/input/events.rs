use crate::{
    core::geo::Point,
    surface::{ListenerId, MarkerId},
};
use serde::{Deserialize, Serialize};

/// Raw pointer input delivered by the hosting window to a map surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click {
        position: Point,
        button: MouseButton,
    },
    /// Mouse move (position in container pixels)
    MouseMove { position: Point },
    /// Pointer left the map container
    MouseLeave,
    /// Drag in progress
    Drag { delta: Point },
    /// Scroll wheel or pinch zoom
    Scroll { delta: f64, position: Point },
    /// Viewport/window resize
    Resize { size: Point },
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Interactions a marker listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerEvent {
    HoverEnter,
    HoverLeave,
    Click,
}

impl MarkerEvent {
    pub const ALL: [MarkerEvent; 3] = [
        MarkerEvent::HoverEnter,
        MarkerEvent::HoverLeave,
        MarkerEvent::Click,
    ];
}

impl std::fmt::Display for MarkerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerEvent::HoverEnter => write!(f, "mouseover"),
            MarkerEvent::HoverLeave => write!(f, "mouseout"),
            MarkerEvent::Click => write!(f, "click"),
        }
    }
}

/// Lifecycle and interaction events a map surface posts to its host queue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// The surface finished initializing and can accept markers
    Ready,
    /// Center, zoom or size changed
    ViewportChanged,
    /// A subscribed listener fired
    Listener {
        listener: ListenerId,
        marker: MarkerId,
        event: MarkerEvent,
    },
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position, .. } => Some(*position),
            InputEvent::MouseMove { position } => Some(*position),
            InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Checks whether this event can move the viewport
    pub fn is_viewport_event(&self) -> bool {
        matches!(
            self,
            InputEvent::Drag { .. } | InputEvent::Scroll { .. } | InputEvent::Resize { .. }
        )
    }
}
