use crate::error::GeometryError;
use crate::geom::EPSILON;
use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Viewport size in pixels. Screen coordinates have their origin at the
/// bottom-left corner, y up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Pinhole camera. The camera looks down its local -Z axis with +Y up;
/// `orientation` rotates camera-local vectors into world space.
///
/// Focal length, aperture and pan share the same film unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub focal_length: f64,
    pub horizontal_aperture: f64,
    #[serde(default = "default_pan")]
    pub pan: Vector2<f64>,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_pan() -> Vector2<f64> {
    Vector2::zeros()
}

fn default_zoom() -> f64 {
    1.0
}

/// A world point expressed against a camera: its position on the unit
/// image plane and its distance along the viewing axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPoint {
    pub image: Point2<f64>,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Camera {
    pub fn new(
        name: impl Into<String>,
        position: Point3<f64>,
        orientation: UnitQuaternion<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            orientation,
            focal_length: 35.0,
            horizontal_aperture: 36.0,
            pan: Vector2::zeros(),
            zoom: 1.0,
        }
    }

    /// Camera at `position` looking at `target`, world +Y as up hint.
    pub fn looking_at(name: impl Into<String>, position: Point3<f64>, target: Point3<f64>) -> Self {
        let forward = target - position;
        // face_towards aligns local +Z with the direction; we look down -Z.
        let orientation = UnitQuaternion::face_towards(&-forward, &Vector3::y());
        Self::new(name, position, orientation)
    }

    pub fn forward(&self) -> Vector3<f64> {
        self.orientation * -Vector3::z()
    }

    pub fn world_to_camera(&self, world: &Point3<f64>) -> Result<CameraPoint, GeometryError> {
        let local = self.orientation.inverse_transform_vector(&(world - self.position));
        let depth = -local.z;
        if depth.abs() < EPSILON {
            return Err(GeometryError::OnCameraPlane);
        }
        Ok(CameraPoint {
            image: Point2::new(local.x / depth, local.y / depth),
            depth,
        })
    }

    pub fn camera_to_world(&self, point: &CameraPoint) -> Point3<f64> {
        let local = Vector3::new(
            point.image.x * point.depth,
            point.image.y * point.depth,
            -point.depth,
        );
        self.position + self.orientation * local
    }

    pub fn ray_through(&self, image: &Point2<f64>) -> Ray {
        let local = Vector3::new(image.x, image.y, -1.0);
        Ray {
            origin: self.position,
            direction: Unit::new_normalize(self.orientation * local),
        }
    }

    /// Film units per pixel for the given viewport.
    fn film_per_pixel(&self, viewport: &Viewport) -> f64 {
        self.horizontal_aperture * self.zoom / viewport.width
    }

    /// Back-projects a screen pixel onto the unit image plane.
    pub fn view_to_camera(&self, cursor: &Point2<f64>, viewport: &Viewport) -> Point2<f64> {
        let scale = self.film_per_pixel(viewport);
        let film = self.pan + (cursor - viewport.center()) * scale;
        Point2::from(film / self.focal_length)
    }

    pub fn camera_to_view(&self, image: &Point2<f64>, viewport: &Viewport) -> Point2<f64> {
        let scale = self.film_per_pixel(viewport);
        let film = image.coords * self.focal_length;
        viewport.center() + (film - self.pan) / scale
    }

    pub fn world_to_view(
        &self,
        world: &Point3<f64>,
        viewport: &Viewport,
    ) -> Result<Point2<f64>, GeometryError> {
        let image = self.project(world)?;
        Ok(self.camera_to_view(&image, viewport))
    }

    /// Camera-plane projection of a world point in front of the camera.
    pub fn project(&self, world: &Point3<f64>) -> Result<Point2<f64>, GeometryError> {
        let cp = self.world_to_camera(world)?;
        if cp.depth < 0.0 {
            return Err(GeometryError::BehindCamera);
        }
        Ok(cp.image)
    }

    pub fn reset_zoom_and_pan(&mut self) {
        self.pan = Vector2::zeros();
        self.zoom = 1.0;
    }
}
