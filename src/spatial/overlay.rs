use crate::prelude::HashMap;
use crate::{
    layers::marker::{MarkerAction, MarkerHandle},
    spatial::clustering::{ClusterCapability, OverlayId},
    surface::{ListenerId, MapSurface},
};

/// The clustered marker set currently installed on a surface.
///
/// Owns every [`MarkerHandle`] of one point-set generation and routes fired
/// listener ids back to the handle that subscribed them.
#[derive(Debug)]
pub struct ClusterOverlay {
    id: OverlayId,
    generation: u64,
    handles: Vec<MarkerHandle>,
    routes: HashMap<ListenerId, usize>,
}

impl ClusterOverlay {
    pub fn new(id: OverlayId, generation: u64, handles: Vec<MarkerHandle>) -> Self {
        let mut routes = HashMap::default();
        routes.reserve(handles.len() * 3);
        for (slot, handle) in handles.iter().enumerate() {
            for sub in handle.subscriptions() {
                routes.insert(sub.listener, slot);
            }
        }

        Self {
            id,
            generation,
            handles,
            routes,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handles(&self) -> &[MarkerHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Action bound to a fired listener; `None` for listeners of other generations
    pub fn route(&self, listener: ListenerId) -> Option<MarkerAction> {
        let slot = *self.routes.get(&listener)?;
        self.handles.get(slot)?.action_for(listener)
    }

    /// Detaches the overlay from the clustering capability, then releases every handle
    pub fn dispose<C>(self, capability: &mut C, surface: &mut dyn MapSurface)
    where
        C: ClusterCapability + ?Sized,
    {
        capability.clear(surface, self.id);
        for handle in self.handles {
            handle.release(surface);
        }
    }
}
