//! Nearest-point search over the clicked points of a line.

use crate::model::Point3;

/// Closest point to a query, with its position in the searched slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index into the searched points.
    pub index: usize,
    /// The matching point, equal to `points[index]`.
    pub point: Point3,
    /// Euclidean distance from the query.
    pub distance: f64,
}

/// Find the point closest to `query`.
///
/// Returns None when `points` is empty. When several points are equally close
/// the one with the lowest index wins.
pub fn nearest(points: &[Point3], query: Point3) -> Option<Nearest> {
    points
        .iter()
        .enumerate()
        .fold(None, |best: Option<Nearest>, (index, &point)| {
            let distance = point.distance(query);
            match best {
                Some(current) if distance.is_nan() || current.distance <= distance => Some(current),
                _ => Some(Nearest {
                    index,
                    point,
                    distance,
                }),
            }
        })
}

/// Like [`nearest`], but also yields None when there is no query.
pub fn nearest_to(points: &[Point3], query: Option<Point3>) -> Option<Nearest> {
    query.and_then(|q| nearest(points, q))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(0.0, 10.0, 10.0),
        ]
    }

    #[test]
    fn test_empty_points_has_no_result() {
        assert!(nearest(&[], Point3::new(1.0, 2.0, 3.0)).is_none());
    }

    #[test]
    fn test_absent_query_has_no_result() {
        assert!(nearest_to(&sample(), None).is_none());
        assert!(nearest_to(&sample(), Some(Point3::new(0.0, 9.0, 1.0))).is_some());
    }

    #[test]
    fn test_returned_point_matches_index() {
        let points = sample();
        for query in [
            Point3::new(0.0, 9.0, 1.0),
            Point3::new(4.0, 4.0, 4.0),
            Point3::new(-3.0, -3.0, 0.0),
            Point3::new(0.0, 11.0, 12.0),
        ] {
            let found = nearest(&points, query).unwrap();
            assert!(found.index < points.len());
            assert_eq!(found.point, points[found.index]);
        }
    }

    #[test]
    fn test_query_on_existing_point() {
        let points = sample();
        for (i, p) in points.iter().enumerate() {
            let found = nearest(&points, *p).unwrap();
            assert_eq!(found.index, i);
            assert_eq!(found.point, *p);
            assert_eq!(found.distance, 0.0);
        }
    }

    #[test]
    fn test_ties_prefer_lowest_index() {
        let points = vec![
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let found = nearest(&points, Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(found.distance, 1.0);
    }

    #[test]
    fn test_uses_all_three_axes() {
        let points = vec![Point3::new(10.0, 0.0, 0.0), Point3::new(0.0, 3.0, 3.0)];
        let found = nearest(&points, Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(found.index, 1);
    }
}
