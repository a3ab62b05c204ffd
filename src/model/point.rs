//! 3D points and ordered point sets.

use std::ops::Index;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::constants::COORD_DIMS;

/// A coordinate in the image stack: `(plane, x, y)`.
///
/// `plane` is the optical plane index through the stack, `x` and `y` are the
/// two in-slice (coronal) axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub plane: f64,
    pub x: f64,
    pub y: f64,
}

impl Point3 {
    pub const fn new(plane: f64, x: f64, y: f64) -> Self {
        Self { plane, x, y }
    }

    /// Build a point from a raw coordinate slice.
    /// Returns None unless the slice has exactly three components.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        match coords {
            [plane, x, y] => Some(Self::new(*plane, *x, *y)),
            _ => None,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.plane, self.x, self.y]
    }

    pub fn add(self, other: Point3) -> Self {
        Self::new(self.plane + other.plane, self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point3) -> Self {
        Self::new(self.plane - other.plane, self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.plane * factor, self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Point3) -> f64 {
        self.plane * other.plane + self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance, all axes weighted equally.
    pub fn distance(self, other: Point3) -> f64 {
        self.sub(other).norm()
    }

    /// Apply `f` to every component.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.plane), f(self.x), f(self.y))
    }

    /// Round every component to `decimals` places, ties to even.
    pub fn round_decimals(self, decimals: i32) -> Self {
        let factor = 10f64.powi(decimals);
        self.map(|v| (v * factor).round_ties_even() / factor)
    }

    /// Lexicographic order over `(plane, x, y)` using IEEE total ordering.
    pub fn total_cmp(&self, other: &Point3) -> std::cmp::Ordering {
        self.plane
            .total_cmp(&other.plane)
            .then(self.x.total_cmp(&other.x))
            .then(self.y.total_cmp(&other.y))
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([plane, x, y]: [f64; 3]) -> Self {
        Self::new(plane, x, y)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

/// Ordered sequence of points making up one annotation line.
///
/// Order matters (it defines the piecewise segments) and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSet {
    points: Vec<Point3>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: Point3) {
        self.points.push(point);
    }

    /// Insert at `index`, clamped to the end of the set.
    pub fn insert(&mut self, index: usize, point: Point3) {
        let index = index.min(self.points.len());
        self.points.insert(index, point);
    }

    /// Remove the point at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<Point3> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point3> {
        self.points.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Point3] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }

    /// Mean of all points, None for an empty set.
    pub fn centroid(&self) -> Option<Point3> {
        centroid(&self.points)
    }

    /// Copy into an `(n, 3)` array, one row per point.
    pub fn to_array(&self) -> Array2<f64> {
        points_to_array(&self.points)
    }

    /// Build from an `(n, 3)` array. Returns None for any other column count.
    pub fn from_array(array: ArrayView2<'_, f64>) -> Option<Self> {
        if array.ncols() != COORD_DIMS {
            return None;
        }
        let points = array
            .rows()
            .into_iter()
            .map(|row| Point3::new(row[0], row[1], row[2]))
            .collect();
        Some(Self { points })
    }
}

impl Index<usize> for PointSet {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        &self.points[index]
    }
}

impl From<Vec<Point3>> for PointSet {
    fn from(points: Vec<Point3>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point3> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Mean of a slice of points, None when empty.
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Point3::default(), |acc, &p| acc.add(p));
    Some(sum.scale(1.0 / points.len() as f64))
}

/// Copy a slice of points into an `(n, 3)` array.
pub fn points_to_array(points: &[Point3]) -> Array2<f64> {
    Array2::from_shape_fn((points.len(), COORD_DIMS), |(row, col)| {
        points[row].to_array()[col]
    })
}
