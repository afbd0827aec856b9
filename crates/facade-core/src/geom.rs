use crate::error::GeometryError;
use nalgebra::{Matrix3, Point2, Point3, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Shared tolerance for parallel/degenerate tests.
pub const EPSILON: f64 = 1e-5;

/// Plane `normal . x + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Unit<Vector3<f64>>,
    pub offset: f64,
}

impl Plane {
    pub fn from_point_normal(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        let normal = Unit::new_normalize(normal);
        Self {
            offset: -normal.dot(&point.coords),
            normal,
        }
    }

    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Orthogonal projection onto the plane.
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal.into_inner() * self.signed_distance(point)
    }

    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        self.signed_distance(point).abs() <= tolerance
    }
}

/// Fits a plane through `points`: exact for three points, least squares
/// (smallest eigenvector of the scatter matrix) otherwise.
pub fn compute_plane(points: &[Point3<f64>]) -> Result<Plane, GeometryError> {
    if points.len() < 3 {
        return Err(GeometryError::NotEnoughPoints {
            count: points.len(),
        });
    }

    if points.len() == 3 {
        let ab = points[1] - points[0];
        let ac = points[2] - points[0];
        let normal = ab.cross(&ac);
        let scale = ab.norm() * ac.norm();
        if scale == 0.0 || normal.norm() <= EPSILON * scale {
            return Err(GeometryError::Collinear);
        }
        return Ok(Plane::from_point_normal(points[0], normal));
    }

    let centroid = centroid(points);
    let mut scatter = Matrix3::zeros();
    for p in points {
        let d = p - centroid;
        scatter += d * d.transpose();
    }

    let eigen = scatter.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let middle = eigen.eigenvalues[order[1]];
    let largest = eigen.eigenvalues[order[2]];

    // Scatter eigenvalues are squared spreads, hence EPSILON^2.
    if largest <= 0.0 || middle <= EPSILON * EPSILON * largest {
        return Err(GeometryError::Collinear);
    }

    let normal = eigen.eigenvectors.column(order[0]).into_owned();
    Ok(Plane::from_point_normal(centroid, normal))
}

pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Whether segment `a -> a + ad` meets segment `b -> b + bc`.
///
/// Solves `ab = x * ad - y * bc`; the segments meet when both `x` and `y`
/// fall in `[0, 1]`. Near-parallel segments never intersect.
pub fn segments_intersect(
    a: &Point2<f64>,
    ad: &Vector2<f64>,
    b: &Point2<f64>,
    bc: &Vector2<f64>,
) -> bool {
    let denom = cross2(ad, bc);
    if denom > -EPSILON && denom < EPSILON {
        return false;
    }
    let ab = b - a;
    let x = cross2(&ab, bc) / denom;
    let y = cross2(&ab, ad) / denom;
    (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)
}

/// Distance from `p` to segment `[a, b]` and the clamped position of the
/// closest point along it (0 at `a`, 1 at `b`).
pub fn point_segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> (f64, f64) {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return ((p - a).norm(), 0.0);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    ((p - closest).norm(), t)
}

/// Even-odd point in polygon test.
pub fn point_in_polygon(p: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether the quad `[q0, q1, q2, q3]` folds over itself, i.e. side
/// `q0 -> q3` crosses side `q1 -> q2`.
pub fn quad_sides_cross(quad: &[Point2<f64>; 4]) -> bool {
    segments_intersect(&quad[0], &(quad[3] - quad[0]), &quad[1], &(quad[2] - quad[1]))
}
