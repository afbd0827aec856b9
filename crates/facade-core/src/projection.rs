use crate::camera::Camera;
use crate::error::GeometryError;
use crate::geom::{compute_plane, Plane, EPSILON};
use nalgebra::{Point2, Point3};

/// Where a lifted face gets its plane from.
#[derive(Debug, Clone, Copy)]
pub enum FacePlane<'a> {
    /// Project onto a known plane (e.g. the face being extended).
    Given(&'a Plane),
    /// Fit a fresh plane through these 3D support points first.
    Fit(&'a [Point3<f64>]),
}

/// Intersects the camera ray through a camera-plane point with `plane`.
pub fn project_point_on_plane(
    image: &Point2<f64>,
    plane: &Plane,
    camera: &Camera,
) -> Result<Point3<f64>, GeometryError> {
    let ray = camera.ray_through(image);
    let denom = plane.normal.dot(&ray.direction.into_inner());
    if denom.abs() < EPSILON {
        return Err(GeometryError::ParallelRay);
    }
    let t = -plane.signed_distance(&ray.origin) / denom;
    if t <= 0.0 {
        return Err(GeometryError::BehindCamera);
    }
    Ok(ray.origin + ray.direction.into_inner() * t)
}

/// Lifts four camera-plane picks into a planar quad in world space.
pub fn project_face_2d(
    camera: &Camera,
    points: &[Point2<f64>; 4],
    source: FacePlane<'_>,
) -> Result<[Point3<f64>; 4], GeometryError> {
    let fitted;
    let plane = match source {
        FacePlane::Given(plane) => plane,
        FacePlane::Fit(support) => {
            fitted = compute_plane(support)?;
            &fitted
        }
    };

    let mut face = [Point3::origin(); 4];
    for (slot, image) in face.iter_mut().zip(points) {
        *slot = project_point_on_plane(image, plane, camera)?;
    }
    Ok(face)
}
