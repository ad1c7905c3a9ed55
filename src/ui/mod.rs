pub mod popup;
pub mod shell;

#[cfg(feature = "egui")]
pub mod widget;

pub use popup::{Popup, PopupContent, PopupManager};

pub use shell::{ShellState, ViewShell, BOUNDS_HEADING};

#[cfg(feature = "egui")]
pub use widget::{bounds_panel, MapView, MapViewStyle};
