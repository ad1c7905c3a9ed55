use crate::core::geo::{LatLng, LatLngBounds};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point item that can be indexed via an R-tree
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub position: LatLng,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(position: LatLng, data: T) -> Self {
        Self { position, data }
    }

    fn coords(&self) -> [f64; 2] {
        [self.position.lng, self.position.lat]
    }
}

impl<T: PartialEq> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.position == other.position
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords())
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [x, y] = self.coords();
        let dx = x - point[0];
        let dy = y - point[1];
        dx * dx + dy * dy
    }
}

fn envelope_of(bounds: &LatLngBounds) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bounds.south_west.lng, bounds.south_west.lat],
        [bounds.north_east.lng, bounds.north_east.lat],
    )
}

/// R-tree index over geographic points (x = longitude, y = latitude)
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
}

impl<T: PartialEq> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
        }
    }

    /// Builds an index in one pass; faster than repeated inserts for large sets
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        Self {
            rtree: RTree::bulk_load(items),
        }
    }

    pub fn insert(&mut self, position: LatLng, data: T) {
        self.rtree.insert(SpatialItem::new(position, data));
    }

    /// Removes one item matching both position and data
    pub fn remove(&mut self, position: LatLng, data: T) -> bool {
        self.rtree.remove(&SpatialItem::new(position, data)).is_some()
    }

    /// Items inside the bounds (edges inclusive)
    pub fn query(&self, bounds: &LatLngBounds) -> Vec<&SpatialItem<T>> {
        self.rtree
            .locate_in_envelope(&envelope_of(bounds))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

impl<T: PartialEq> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_remove() {
        let mut index = SpatialIndex::new();
        index.insert(LatLng::new(35.68, 139.76), 1u64);
        index.insert(LatLng::new(35.69, 139.77), 2u64);
        index.insert(LatLng::new(36.50, 140.00), 3u64);

        let bounds = LatLngBounds::from_coords(35.66, 139.73, 35.70, 139.80);
        let mut hits: Vec<u64> = index.query(&bounds).iter().map(|i| i.data).collect();
        hits.sort();
        assert_eq!(hits, vec![1, 2]);

        assert!(index.remove(LatLng::new(35.68, 139.76), 1));
        assert!(!index.remove(LatLng::new(35.68, 139.76), 1));
        assert_eq!(index.len(), 2);
    }
}
