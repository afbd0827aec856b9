use crate::camera::Camera;
use crate::geom::point_in_polygon;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Vertex indices of a quad face, in winding order.
pub type Quad = [usize; 4];

/// How freely a vertex may be dragged. The ordering matters: drag rules
/// compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MovabilityState {
    /// Shared by several faces (or by none).
    Unmovable,
    /// On a single face that touches another face: may slide in its plane.
    MovableInSamePlane,
    /// On an isolated face: the face plane may be re-fitted.
    MovableRecompute,
}

/// Polygonal mesh as held by a scene store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<Quad>,
}

impl MeshData {
    pub fn new(points: Vec<Point3<f64>>, faces: Vec<Quad>) -> Self {
        Self { points, faces }
    }

    pub fn faces_of_vertex(&self, vertex: usize) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.contains(&vertex))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Structure-from-motion reconstruction points, read-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point3<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<[f32; 3]>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cloud points in front of `camera` whose camera-plane projection falls
    /// inside `polygon`.
    pub fn points_in_polygon(&self, camera: &Camera, polygon: &[Point2<f64>]) -> Vec<Point3<f64>> {
        self.points
            .iter()
            .filter(|p| {
                camera
                    .project(p)
                    .map(|image| point_in_polygon(&image, polygon))
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }
}
