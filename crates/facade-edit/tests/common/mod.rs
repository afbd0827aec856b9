#![allow(dead_code)]

use facade_core::camera::{Camera, Viewport};
use facade_core::model::{MeshData, PointCloud};
use facade_core::scene::MemoryScene;
use facade_edit::config::ToolConfig;
use facade_edit::context::ToolContext;
use facade_edit::input::{InputEvent, Key, Modifiers, PointerEvent};
use nalgebra::{Point2, Point3};

pub const VIEWPORT: Viewport = Viewport::new(640.0, 480.0);

pub fn front() -> Camera {
    Camera::looking_at("front", Point3::new(0.0, 0.0, 10.0), Point3::origin())
}

pub fn side() -> Camera {
    Camera::looking_at("side", Point3::new(10.0, 0.0, 10.0), Point3::origin())
}

/// Two quads sharing the edge 1-2.
pub fn strip() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(-2.0, -1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(2.0, -1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2, 3], [1, 4, 5, 2]],
    )
}

pub fn square() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2, 3]],
    )
}

/// Regular grid of points on the plane `z`.
pub fn planar_cloud(z: f64) -> PointCloud {
    let mut points = Vec::new();
    for i in -12..=12 {
        for j in -12..=12 {
            points.push(Point3::new(i as f64 * 0.25, j as f64 * 0.25, z));
        }
    }
    PointCloud::new(points)
}

pub fn scene_with(mesh: &str, data: MeshData) -> MemoryScene {
    MemoryScene::new()
        .with_mesh(mesh, data)
        .with_camera(front())
        .with_camera(side())
}

pub fn tool(scene: &MemoryScene, cloud: PointCloud) -> ToolContext {
    let mut tool = ToolContext::new(ToolConfig::default(), cloud);
    tool.activate(scene);
    tool
}

/// Screen position of a world point in the front view.
pub fn at(p: Point3<f64>) -> Point2<f64> {
    front().world_to_view(&p, &VIEWPORT).unwrap()
}

fn pointer(camera: &str, position: Point2<f64>, modifiers: Modifiers) -> PointerEvent {
    PointerEvent::new(camera, VIEWPORT, position).with_modifiers(modifiers)
}

pub fn hover(position: Point2<f64>) -> InputEvent {
    InputEvent::PointerMove(pointer("front", position, Modifiers::NONE))
}

pub fn press(position: Point2<f64>, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerPress(pointer("front", position, modifiers))
}

pub fn drag(position: Point2<f64>, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerDrag(pointer("front", position, modifiers))
}

pub fn release(position: Point2<f64>, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerRelease(pointer("front", position, modifiers))
}

pub fn drag_in(camera: &str, position: Point2<f64>, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerDrag(pointer(camera, position, modifiers))
}

pub fn release_in(camera: &str, position: Point2<f64>, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerRelease(pointer(camera, position, modifiers))
}

pub fn key(key: Key, modifiers: Modifiers) -> InputEvent {
    InputEvent::KeyPress { key, modifiers }
}

pub fn key_up(key: Key) -> InputEvent {
    InputEvent::KeyRelease {
        key,
        modifiers: Modifiers::NONE,
    }
}

pub fn close(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a - b).norm() < 1e-6
}
