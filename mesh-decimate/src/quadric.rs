//! Quadric error metric in combined position + UV space.
//!
//! Each face contributes a "squared distance to the face's plane in 5D"
//! quadric over (x, y, z, u, v), stored as a symmetric 6x6 homogeneous
//! matrix. Summing the quadrics of the faces around a vertex gives the
//! error metric minimized by the placement solver.
//!
//! Quadrics are accumulated per *wedge*: a `(vertex, texcoord slot)` pair.
//! A vertex on a texture seam carries one wedge per UV chart touching it,
//! so the two sides of a seam keep independent metrics.

use hashbrown::HashMap;
use nalgebra::{Matrix5, Matrix6, Point2, Point3, Vector5, Vector6};

/// Threshold below which a face's 5D edge basis is considered degenerate.
const DEGENERATE_SQ: f64 = 1e-24;

/// Lift a position and texture coordinate into the combined 5D space.
#[inline]
#[must_use]
pub fn lift(p: Point3<f64>, t: Point2<f64>) -> Vector5<f64> {
    Vector5::new(p.x, p.y, p.z, t.x, t.y)
}

/// Symmetric 6x6 error quadric over homogeneous (x, y, z, u, v, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quadric {
    m: Matrix6<f64>,
}

impl Quadric {
    /// The zero quadric; contributes no error anywhere.
    #[inline]
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Quadric measuring squared distance to the plane of a face whose
    /// corners lift to `p0`, `p1`, `p2` in 5D.
    ///
    /// Builds an orthonormal basis (e1, e2) of the face plane by
    /// Gram-Schmidt on the two edge vectors; degenerate faces yield the
    /// zero quadric.
    #[must_use]
    pub fn from_face(p0: Vector5<f64>, p1: Vector5<f64>, p2: Vector5<f64>) -> Self {
        let d1 = p1 - p0;
        let d2 = p2 - p0;

        let len1_sq = d1.norm_squared();
        if len1_sq < DEGENERATE_SQ {
            return Self::zero();
        }
        let e1 = d1 / len1_sq.sqrt();

        let d2_perp = d2 - e1 * d2.dot(&e1);
        let len2_sq = d2_perp.norm_squared();
        if len2_sq < DEGENERATE_SQ {
            return Self::zero();
        }
        let e2 = d2_perp / len2_sq.sqrt();

        // Squared distance of y to the plane {p0 + s*e1 + t*e2}:
        //   |y - p0|^2 - ((y - p0).e1)^2 - ((y - p0).e2)^2
        // expanded into A, b, c of y^T A y + 2 b^T y + c.
        let a: Matrix5<f64> =
            Matrix5::identity() - e1 * e1.transpose() - e2 * e2.transpose();
        let b: Vector5<f64> = e1 * p0.dot(&e1) + e2 * p0.dot(&e2) - p0;
        let p0e1 = p0.dot(&e1);
        let p0e2 = p0.dot(&e2);
        let c = p0e2.mul_add(-p0e2, p0e1.mul_add(-p0e1, p0.dot(&p0)));

        let mut m = Matrix6::zeros();
        m.fixed_view_mut::<5, 5>(0, 0).copy_from(&a);
        m.fixed_view_mut::<5, 1>(0, 5).copy_from(&b);
        m.fixed_view_mut::<1, 5>(5, 0).copy_from(&b.transpose());
        m[(5, 5)] = c;
        Self { m }
    }

    /// Add another quadric to this one.
    #[inline]
    pub fn add(&mut self, other: &Self) {
        self.m += other.m;
    }

    /// Sum of this quadric and `other`.
    #[inline]
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self { m: self.m + other.m }
    }

    /// Evaluate the quadratic form at a 5D point.
    #[must_use]
    pub fn evaluate(&self, y: &Vector5<f64>) -> f64 {
        let v = Vector6::new(y[0], y[1], y[2], y[3], y[4], 1.0);
        (v.transpose() * self.m * v)[(0, 0)]
    }

    /// The 5x5 quadratic block `A`.
    #[inline]
    #[must_use]
    pub fn a_block(&self) -> Matrix5<f64> {
        self.m.fixed_view::<5, 5>(0, 0).into()
    }

    /// The linear term `b`.
    #[inline]
    #[must_use]
    pub fn b_vec(&self) -> Vector5<f64> {
        self.m.fixed_view::<5, 1>(0, 5).into()
    }

    /// The full homogeneous 6x6 matrix.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Matrix6<f64> {
        &self.m
    }
}

/// Per-wedge quadric storage, keyed by `(vertex, texcoord slot)`.
#[derive(Debug, Clone, Default)]
pub struct WedgeQuadrics {
    map: HashMap<(u32, u32), Quadric>,
}

impl WedgeQuadrics {
    /// Create an empty store with room for `capacity` wedges.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Accumulate a face quadric into the wedge of `vertex` at `texcoord`.
    pub fn accumulate(&mut self, vertex: u32, texcoord: u32, q: &Quadric) {
        self.map
            .entry((vertex, texcoord))
            .or_default()
            .add(q);
    }

    /// The quadric of a wedge, zero if the wedge has never been touched.
    #[must_use]
    pub fn get(&self, vertex: u32, texcoord: u32) -> Quadric {
        self.map
            .get(&(vertex, texcoord))
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite a wedge's quadric.
    pub fn set(&mut self, vertex: u32, texcoord: u32, q: Quadric) {
        self.map.insert((vertex, texcoord), q);
    }

    /// Move every wedge of `dead` onto `survivor`.
    ///
    /// `tc_map` maps dead-side texcoord slots onto the survivor's slots
    /// (derived from the faces adjacent to the collapsed edge). Slots not
    /// in the map keep their texcoord key. When the survivor already owns
    /// the target wedge the quadrics are summed; this is the seam-corner
    /// case where two UV-chart slots merge into one.
    pub fn reparent(&mut self, dead: u32, survivor: u32, tc_map: &HashMap<u32, u32>) {
        let dead_wedges: Vec<((u32, u32), Quadric)> = self
            .map
            .iter()
            .filter(|((v, _), _)| *v == dead)
            .map(|(k, q)| (*k, *q))
            .collect();

        for ((_, tc), q) in dead_wedges {
            self.map.remove(&(dead, tc));
            let target_tc = tc_map.get(&tc).copied().unwrap_or(tc);
            self.map
                .entry((survivor, target_tc))
                .or_default()
                .add(&q);
        }
    }

    /// Number of live wedges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_face() -> Quadric {
        // Unit triangle in the z=0 plane, UVs equal to xy.
        Quadric::from_face(
            lift(Point3::new(0.0, 0.0, 0.0), Point2::new(0.0, 0.0)),
            lift(Point3::new(1.0, 0.0, 0.0), Point2::new(1.0, 0.0)),
            lift(Point3::new(0.0, 1.0, 0.0), Point2::new(0.0, 1.0)),
        )
    }

    #[test]
    fn test_zero_on_the_face_plane() {
        let q = flat_face();
        // Points in the plane of the face (z = 0, uv following xy) have
        // zero error, including outside the triangle itself.
        for (x, y) in [(0.0, 0.0), (0.25, 0.25), (3.0, -2.0)] {
            let v = lift(Point3::new(x, y, 0.0), Point2::new(x, y));
            assert_relative_eq!(q.evaluate(&v), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_offset_measures_squared_distance() {
        let q = flat_face();
        let v = lift(Point3::new(0.2, 0.3, 2.0), Point2::new(0.2, 0.3));
        assert_relative_eq!(q.evaluate(&v), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uv_deviation_is_penalized() {
        let q = flat_face();
        // On the geometric plane but with a UV displaced by 1.
        let v = lift(Point3::new(0.5, 0.5, 0.0), Point2::new(1.5, 0.5));
        assert!(q.evaluate(&v) > 0.1);
    }

    #[test]
    fn test_degenerate_face_is_zero() {
        let p = lift(Point3::new(1.0, 2.0, 3.0), Point2::new(0.5, 0.5));
        let q = Quadric::from_face(p, p, p);
        assert_eq!(q, Quadric::zero());
    }

    #[test]
    fn test_addition_sums_errors() {
        let q1 = flat_face();
        let mut q2 = q1;
        q2.add(&q1);
        let v = lift(Point3::new(0.0, 0.0, 1.0), Point2::new(0.0, 0.0));
        assert_relative_eq!(q2.evaluate(&v), 2.0 * q1.evaluate(&v), epsilon = 1e-12);
    }

    #[test]
    fn test_wedge_accumulate_and_get() {
        let mut wedges = WedgeQuadrics::default();
        let q = flat_face();
        wedges.accumulate(3, 7, &q);
        wedges.accumulate(3, 7, &q);

        let sum = wedges.get(3, 7);
        let v = lift(Point3::new(0.0, 0.0, 1.0), Point2::new(0.0, 0.0));
        assert_relative_eq!(sum.evaluate(&v), 2.0 * q.evaluate(&v), epsilon = 1e-12);
        assert_eq!(wedges.get(3, 8), Quadric::zero());
    }

    #[test]
    fn test_reparent_moves_and_merges() {
        let mut wedges = WedgeQuadrics::default();
        let q = flat_face();
        wedges.accumulate(1, 10, &q);
        wedges.accumulate(2, 20, &q);
        wedges.accumulate(2, 21, &q);

        // Slot 20 of the dead vertex maps onto the survivor's slot 10;
        // slot 21 keeps its key.
        let mut tc_map = HashMap::new();
        tc_map.insert(20u32, 10u32);
        wedges.reparent(2, 1, &tc_map);

        let v = lift(Point3::new(0.0, 0.0, 1.0), Point2::new(0.0, 0.0));
        assert_relative_eq!(
            wedges.get(1, 10).evaluate(&v),
            2.0 * q.evaluate(&v),
            epsilon = 1e-12
        );
        assert_relative_eq!(wedges.get(1, 21).evaluate(&v), q.evaluate(&v), epsilon = 1e-12);
        assert_eq!(wedges.get(2, 20), Quadric::zero());
        assert_eq!(wedges.len(), 2);
    }
}
