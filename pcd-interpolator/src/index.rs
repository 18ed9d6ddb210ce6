use std::collections::TryReserveError;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::filter::FilteredPoint;

// Positions are stored as (northing, easting).
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPoint {
    position: [f64; 2],
    value: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dn = self.position[0] - point[0];
        let de = self.position[1] - point[1];
        dn * dn + de * de
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub distance_sq: f64,
    pub value: f64,
}

/// Read-only nearest-neighbour index over the filtered points of one file.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    pub fn build(points: &[FilteredPoint]) -> Result<Self, TryReserveError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(points.len())?;
        entries.extend(points.iter().map(|p| IndexedPoint {
            position: [p.y, p.x],
            value: p.value,
        }));

        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `out` with up to `k` neighbours of the query position, nearest first.
    pub fn nearest_into(&self, northing: f64, easting: f64, k: usize, out: &mut Vec<Neighbour>) {
        out.clear();
        out.extend(
            self.tree
                .nearest_neighbor_iter_with_distance_2(&[northing, easting])
                .take(k)
                .map(|(point, distance_sq)| Neighbour {
                    distance_sq,
                    value: point.value,
                }),
        );
    }

    #[cfg(test)]
    fn nearest(&self, northing: f64, easting: f64, k: usize) -> Vec<Neighbour> {
        let mut out = Vec::with_capacity(k.min(self.len()));
        self.nearest_into(northing, easting, k, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64, value: f64) -> FilteredPoint {
        FilteredPoint { x, y, value }
    }

    #[test]
    fn nearest_is_sorted_by_distance() {
        let index = SpatialIndex::build(&[
            point(5.0, 0.0, 5.0),
            point(1.0, 0.0, 1.0),
            point(3.0, 0.0, 3.0),
            point(0.0, 2.0, 2.0),
        ])
        .unwrap();
        assert_eq!(index.len(), 4);

        let found = index.nearest(0.0, 0.0, 3);
        let values: Vec<f64> = found.iter().map(|n| n.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(found[0].distance_sq, 1.0);
        assert_eq!(found[1].distance_sq, 4.0);
        assert_eq!(found[2].distance_sq, 9.0);
    }

    #[test]
    fn axis_order_is_northing_easting() {
        let index = SpatialIndex::build(&[point(10.0, 0.0, 1.0), point(0.0, 10.0, 2.0)]).unwrap();
        // query near (x = 0, y = 10)
        let found = index.nearest(10.0, 0.0, 1);
        assert_eq!(found[0].value, 2.0);
        assert_eq!(found[0].distance_sq, 0.0);
    }

    #[test]
    fn returns_fewer_than_k_when_small() {
        let index = SpatialIndex::build(&[point(0.0, 0.0, 1.0), point(1.0, 1.0, 2.0)]).unwrap();
        assert_eq!(index.nearest(0.0, 0.0, 8).len(), 2);

        let empty = SpatialIndex::build(&[]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.nearest(0.0, 0.0, 8).is_empty());
    }

    #[test]
    fn keeps_duplicate_positions() {
        let points: Vec<FilteredPoint> = (0..100).map(|i| point(2.0, 2.0, i as f64)).collect();
        let index = SpatialIndex::build(&points).unwrap();
        assert_eq!(index.len(), 100);

        let found = index.nearest(2.0, 2.0, 10);
        assert_eq!(found.len(), 10);
        assert!(found.iter().all(|n| n.distance_sq == 0.0));
    }

    #[test]
    fn nearest_into_reuses_buffer() {
        let index = SpatialIndex::build(&[point(0.0, 0.0, 1.0), point(3.0, 4.0, 2.0)]).unwrap();
        let mut buf = vec![Neighbour {
            distance_sq: 99.0,
            value: 99.0,
        }];
        index.nearest_into(4.0, 3.0, 2, &mut buf);
        assert_eq!(
            buf,
            vec![
                Neighbour {
                    distance_sq: 0.0,
                    value: 2.0
                },
                Neighbour {
                    distance_sq: 25.0,
                    value: 1.0
                },
            ]
        );
    }
}
