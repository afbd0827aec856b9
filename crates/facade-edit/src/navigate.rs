use facade_core::camera::{Camera, Viewport};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub wheel_step: f64,
    pub min_zoom: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wheel_step: 1.15,
            min_zoom: 1e-4,
        }
    }
}

/// Middle-button pan in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct PanDrag {
    pub camera: String,
    press: Point2<f64>,
    start_pan: Vector2<f64>,
}

impl PanDrag {
    pub fn begin(camera: &Camera, press: Point2<f64>) -> Self {
        Self {
            camera: camera.name.clone(),
            press,
            start_pan: camera.pan,
        }
    }

    /// Keeps the film point under the press position under the cursor.
    pub fn apply(&self, camera: &mut Camera, cursor: &Point2<f64>, viewport: &Viewport) {
        let scale = camera.horizontal_aperture * camera.zoom / viewport.width;
        camera.pan = self.start_pan - (cursor - self.press) * scale;
    }
}

/// Wheel zoom around the cursor. Positive `delta` zooms in.
pub fn zoom_at(
    camera: &mut Camera,
    cursor: &Point2<f64>,
    viewport: &Viewport,
    delta: f64,
    cfg: &NavigationConfig,
) {
    if delta == 0.0 {
        return;
    }
    let previous = camera.zoom;
    let zoom = if delta > 0.0 {
        previous / cfg.wheel_step
    } else {
        previous * cfg.wheel_step
    }
    .max(cfg.min_zoom);

    let before = camera.horizontal_aperture * previous / viewport.width;
    let after = camera.horizontal_aperture * zoom / viewport.width;
    camera.pan += (cursor - viewport.center()) * (before - after);
    camera.zoom = zoom;
}
