use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const LOCKED: Color = Color::rgba(0.3, 0.3, 0.6, 0.8);
    pub const MOVABLE: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const RECOMPUTE: Color = Color::rgba(0.0, 1.0, 1.0, 0.8);
    pub const FORBIDDEN: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const CURSOR: Color = Color::rgba(1.0, 0.0, 0.0, 0.6);
    pub const PREVIEW: Color = Color::rgba(0.9, 0.5, 0.4, 0.4);
}

/// Screen-space primitive for the host renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawPrimitive {
    Point {
        position: Point2<f64>,
        size: f32,
        color: Color,
    },
    Line {
        a: Point2<f64>,
        b: Point2<f64>,
        color: Color,
    },
    Polygon {
        points: Vec<Point2<f64>>,
        color: Color,
    },
    Circle {
        center: Point2<f64>,
        radius: f64,
        color: Color,
    },
}

/// One frame's worth of primitives. Nothing persists between frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub primitives: Vec<DrawPrimitive>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&mut self, position: Point2<f64>, size: f32, color: Color) {
        self.primitives.push(DrawPrimitive::Point {
            position,
            size,
            color,
        });
    }

    pub fn line(&mut self, a: Point2<f64>, b: Point2<f64>, color: Color) {
        self.primitives.push(DrawPrimitive::Line { a, b, color });
    }

    pub fn polygon(&mut self, points: Vec<Point2<f64>>, color: Color) {
        self.primitives.push(DrawPrimitive::Polygon { points, color });
    }

    pub fn circle(&mut self, center: Point2<f64>, radius: f64, color: Color) {
        self.primitives.push(DrawPrimitive::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn extend(&mut self, other: DrawList) {
        self.primitives.extend(other.primitives);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
