pub mod events;

// Re-export the essential types
pub use events::{InputEvent, MapEvent, MarkerEvent, MouseButton};
