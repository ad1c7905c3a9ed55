use crate::{core::bounds::BoundingBox, surface::MapSurface};

/// Keeps the last known visible [`BoundingBox`] of a map surface.
///
/// Reads are fail-soft: a surface that cannot report its rectangle yet
/// leaves the previous value untouched.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    current: Option<BoundingBox>,
    updates: u64,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the bounds from the surface's visible corners.
    /// Returns the new value, or `None` when nothing changed.
    pub fn refresh(&mut self, surface: &dyn MapSurface) -> Option<BoundingBox> {
        let rect = surface.visible_rect()?;
        // Checked before ordering: f64::min/max drop NaN operands
        if !rect.north_east.is_finite() || !rect.south_west.is_finite() {
            log::debug!("ignoring non-finite visible rect {:?}", rect);
            return None;
        }
        let bbox = BoundingBox::from_corners(rect.north_east, rect.south_west);
        debug_assert!(bbox.is_valid());

        if self.current.is_none() {
            log::info!("Current map bounds: {:?}", bbox);
        } else {
            log::debug!("Current map bounds: {:?}", bbox);
        }
        self.current = Some(bbox);
        self.updates += 1;
        Some(bbox)
    }

    pub fn current(&self) -> Option<&BoundingBox> {
        self.current.as_ref()
    }

    /// Number of successful refreshes so far
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Text block for display, present once bounds were computed
    pub fn readout(&self) -> Option<String> {
        self.current.map(|bbox| bbox.to_string())
    }
}
