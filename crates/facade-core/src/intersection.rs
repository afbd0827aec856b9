use crate::cache::{MeshCache, MeshCacheEntry};
use crate::camera::{Camera, Viewport};
use crate::geom::point_segment_distance;
use crate::model::Quad;
use nalgebra::{Point2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickConfig {
    /// Screen radius, in pixels, within which a vertex is hovered.
    pub point_radius: f64,
    /// Screen distance, in pixels, within which an edge is hovered.
    pub edge_tolerance: f64,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            point_radius: 10.0,
            edge_tolerance: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionKind {
    None,
    Point,
    Edge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointHit {
    pub mesh: String,
    pub index: usize,
    pub face: Option<Quad>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeHit {
    pub mesh: String,
    pub indices: [usize; 2],
    pub face: Option<Quad>,
    /// Cursor position along the edge, 0 at `indices[0]`, 1 at `indices[1]`.
    pub ratio: f64,
    /// Camera-plane vector from `indices[1]` to `indices[0]`.
    pub height_2d: Vector2<f64>,
    /// World vector from `indices[1]` to `indices[0]`.
    pub height_3d: Vector3<f64>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Intersection {
    #[default]
    None,
    Point(PointHit),
    Edge(EdgeHit),
}

impl Intersection {
    pub fn kind(&self) -> IntersectionKind {
        match self {
            Intersection::None => IntersectionKind::None,
            Intersection::Point(_) => IntersectionKind::Point,
            Intersection::Edge(_) => IntersectionKind::Edge,
        }
    }

    pub fn mesh(&self) -> Option<&str> {
        match self {
            Intersection::None => None,
            Intersection::Point(hit) => Some(&hit.mesh),
            Intersection::Edge(hit) => Some(&hit.mesh),
        }
    }

    pub fn face(&self) -> Option<Quad> {
        match self {
            Intersection::None => None,
            Intersection::Point(hit) => hit.face,
            Intersection::Edge(hit) => hit.face,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Intersection::None)
    }
}

#[derive(Debug, Clone, Copy)]
struct Projected {
    image: Point2<f64>,
    screen: Point2<f64>,
}

fn project_entry(
    entry: &MeshCacheEntry,
    camera: &Camera,
    viewport: &Viewport,
) -> Vec<Option<Projected>> {
    entry
        .points
        .iter()
        .map(|p| {
            let image = camera.project(p).ok()?;
            Some(Projected {
                image,
                screen: camera.camera_to_view(&image, viewport),
            })
        })
        .collect()
}

/// First face containing both edge endpoints.
fn face_of_edge(entry: &MeshCacheEntry, edge: [usize; 2]) -> Option<Quad> {
    let faces = entry.vertex_faces.get(edge[0])?;
    faces
        .iter()
        .filter_map(|&f| entry.faces.get(f))
        .find(|face| face.contains(&edge[1]))
        .copied()
}

/// Hover test of `cursor` against every cached mesh.
///
/// Vertices win over edges. Among candidates the nearest one wins; exact
/// ties keep the first in mesh-path then index order, so the result only
/// depends on the cache and the cursor.
pub fn intersect(
    cache: &MeshCache,
    camera: &Camera,
    viewport: &Viewport,
    cursor: &Point2<f64>,
    cfg: &PickConfig,
) -> Intersection {
    let projections: Vec<(&String, &MeshCacheEntry, Vec<Option<Projected>>)> = cache
        .iter()
        .map(|(mesh, entry)| (mesh, entry, project_entry(entry, camera, viewport)))
        .collect();

    let mut best_point: Option<(f64, &String, &MeshCacheEntry, usize)> = None;
    for (mesh, entry, projected) in &projections {
        for (index, p) in projected.iter().enumerate() {
            let Some(p) = p else { continue };
            let d = (p.screen - cursor).norm();
            if d <= cfg.point_radius && best_point.map_or(true, |(bd, ..)| d < bd) {
                best_point = Some((d, *mesh, *entry, index));
            }
        }
    }

    if let Some((distance, mesh, entry, index)) = best_point {
        return Intersection::Point(PointHit {
            mesh: mesh.clone(),
            index,
            face: entry.first_face_of(index),
            distance,
        });
    }

    // distance, ratio, mesh slot, edge slot
    let mut best_edge: Option<(f64, f64, usize, usize)> = None;
    for (slot, (_, entry, projected)) in projections.iter().enumerate() {
        for (edge_slot, edge) in entry.edges.iter().enumerate() {
            let (Some(a), Some(b)) = (projected[edge[0]], projected[edge[1]]) else {
                continue;
            };
            let (d, ratio) = point_segment_distance(cursor, &a.screen, &b.screen);
            if d <= cfg.edge_tolerance && best_edge.map_or(true, |(bd, ..)| d < bd) {
                best_edge = Some((d, ratio, slot, edge_slot));
            }
        }
    }

    let Some((distance, ratio, slot, edge_slot)) = best_edge else {
        return Intersection::None;
    };
    let (mesh, entry, projected) = &projections[slot];
    let edge = entry.edges[edge_slot];
    // Both endpoints projected, or the edge would have been skipped.
    let (Some(a), Some(b)) = (projected[edge[0]], projected[edge[1]]) else {
        return Intersection::None;
    };

    Intersection::Edge(EdgeHit {
        mesh: (*mesh).clone(),
        indices: edge,
        face: face_of_edge(entry, edge),
        ratio,
        height_2d: a.image - b.image,
        height_3d: entry.points[edge[0]] - entry.points[edge[1]],
        distance,
    })
}
