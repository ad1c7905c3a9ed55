pub mod clustering;
pub mod coordinator;
pub mod index;
pub mod overlay;
