use crate::command::{EditCommand, VertexMove};
use crate::draw::{Color, DrawList};
use crate::input::{ModifierKey, MouseButton, PointerEvent};
use crate::manipulator::{
    hover_color, pick, DrawContext, EventOutcome, GestureKind, ManipContext, Manipulator,
};
use facade_core::cache::MeshCacheEntry;
use facade_core::camera::Camera;
use facade_core::error::{EditError, GeometryError};
use facade_core::geom::{compute_plane, quad_sides_cross};
use facade_core::intersection::Intersection;
use facade_core::model::{MovabilityState, Quad};
use facade_core::projection::{project_face_2d, project_point_on_plane, FacePlane};
use log::{debug, warn};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::Serialize;

/// Candidate face shown while dragging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewFace {
    pub mesh: String,
    /// Vertex ids, a cyclic rotation of the mesh face.
    pub vertices: Quad,
    pub positions: [Point3<f64>; 4],
    /// Slots of `vertices` written on commit.
    pub commit: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointDrag {
    pub mesh: String,
    pub camera: String,
    pub index: usize,
    pub face: Quad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDrag {
    pub mesh: String,
    pub camera: String,
    pub edge: [usize; 2],
    pub face: Quad,
    /// The two face vertices off the edge, ordered so that
    /// `fixed[0], fixed[1], ..` runs along the face winding.
    pub fixed: [usize; 2],
    pub ratio: f64,
    pub height_2d: Vector2<f64>,
    pub height_3d: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    MovingPoint(PointDrag),
    MovingEdge(EdgeDrag),
}

/// Drags existing vertices and edges of cached meshes.
#[derive(Debug, Clone, Default)]
pub struct MoveManipulator {
    state: MoveState,
    intersection: Intersection,
    preview: Option<PreviewFace>,
}

/// Face vertices not on `edge`, oriented along the face.
pub fn fixed_vertices(face: &Quad, edge: [usize; 2]) -> Option<[usize; 2]> {
    let rest: Vec<usize> = face.iter().copied().filter(|v| !edge.contains(v)).collect();
    let [a, b] = rest[..] else { return None };
    if [a, b] == [face[0], face[3]] {
        Some([b, a])
    } else {
        Some([a, b])
    }
}

/// Rotates a face-ordered array so that it starts at slot `start`.
fn rotate<T: Copy>(items: &[T; 4], start: usize) -> [T; 4] {
    [0, 1, 2, 3].map(|k| items[(start + k) % 4])
}

fn project_quad(
    camera: &Camera,
    positions: &[Point3<f64>; 4],
) -> Result<[Point2<f64>; 4], GeometryError> {
    let mut images = [Point2::origin(); 4];
    for (slot, p) in images.iter_mut().zip(positions) {
        *slot = camera.project(p)?;
    }
    Ok(images)
}

fn movability_allows(key: ModifierKey, states: &[MovabilityState]) -> bool {
    match key {
        ModifierKey::None => false,
        ModifierKey::Ctrl => states.iter().all(|&s| s >= MovabilityState::MovableInSamePlane),
        ModifierKey::Shift => states.iter().all(|&s| s == MovabilityState::MovableRecompute),
    }
}

fn cached<'c>(ctx: &'c ManipContext<'_>, mesh: &str) -> Result<&'c MeshCacheEntry, EditError> {
    ctx.cache.get(mesh).ok_or_else(|| EditError::stale(format!("mesh {mesh}")))
}

/// Current positions of a captured face. The mesh may have been rebuilt
/// since the press.
fn captured_face(
    entry: &MeshCacheEntry,
    mesh: &str,
    face: &Quad,
) -> Result<[Point3<f64>; 4], EditError> {
    entry
        .face_points(face)
        .ok_or_else(|| EditError::stale(format!("face {face:?} of {mesh}")))
}

impl MoveManipulator {
    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn preview(&self) -> Option<&PreviewFace> {
        self.preview.as_ref()
    }

    fn point_preview(
        &self,
        drag: &PointDrag,
        event: &PointerEvent,
        key: ModifierKey,
        ctx: &ManipContext<'_>,
    ) -> Result<PreviewFace, EditError> {
        let entry = cached(ctx, &drag.mesh)?;
        let slot = drag
            .face
            .iter()
            .position(|&v| v == drag.index)
            .ok_or_else(|| EditError::stale(format!("vertex {} of {}", drag.index, drag.mesh)))?;
        let mouse = ctx.camera.view_to_camera(&event.position, &event.viewport);
        let current = captured_face(entry, &drag.mesh, &drag.face)?;

        let (positions, commit) = if key == ModifierKey::Shift {
            let mut images = project_quad(ctx.camera, &current)?;
            images[slot] = mouse;
            let support = ctx.cloud.points_in_polygon(ctx.camera, &images);
            let positions = project_face_2d(ctx.camera, &images, FacePlane::Fit(&support))?;
            (positions, vec![0, 1, 2, 3])
        } else {
            let plane = compute_plane(&current)?;
            let mut positions = current;
            positions[slot] = project_point_on_plane(&mouse, &plane, ctx.camera)?;
            (positions, vec![slot])
        };

        Ok(PreviewFace {
            mesh: drag.mesh.clone(),
            vertices: drag.face,
            positions,
            commit,
        })
    }

    fn edge_preview(
        &self,
        drag: &EdgeDrag,
        event: &PointerEvent,
        key: ModifierKey,
        ctx: &ManipContext<'_>,
    ) -> Result<PreviewFace, EditError> {
        let entry = cached(ctx, &drag.mesh)?;
        let current = captured_face(entry, &drag.mesh, &drag.face)?;
        let start = drag
            .face
            .iter()
            .position(|&v| v == drag.fixed[0])
            .filter(|&k| drag.face[(k + 1) % 4] == drag.fixed[1])
            .ok_or_else(|| EditError::stale(format!("face {:?} of {}", drag.face, drag.mesh)))?;
        let vertices = rotate(&drag.face, start);
        let [e0, _] = drag.edge;

        let mouse = ctx.camera.view_to_camera(&event.position, &event.viewport);
        let image_e0 = mouse + drag.height_2d * drag.ratio;
        let image_e1 = mouse - drag.height_2d * (1.0 - drag.ratio);
        let rotated = rotate(&current, start);
        let anchors = [rotated[0], rotated[1]];

        let (moved_e0, moved_e1) = if key == ModifierKey::Shift {
            let image_of = |v: usize| if v == e0 { image_e0 } else { image_e1 };
            let polygon = [
                ctx.camera.project(&anchors[0])?,
                ctx.camera.project(&anchors[1])?,
                image_of(vertices[2]),
                image_of(vertices[3]),
            ];
            let mut support = ctx.cloud.points_in_polygon(ctx.camera, &polygon);
            support.extend(anchors);
            let plane = compute_plane(&support)?;
            (
                project_point_on_plane(&image_e0, &plane, ctx.camera)?,
                project_point_on_plane(&image_e1, &plane, ctx.camera)?,
            )
        } else {
            let plane = compute_plane(&current)?;
            let moved = project_point_on_plane(&image_e0, &plane, ctx.camera)?;
            (moved, plane.project(&(moved - drag.height_3d)))
        };

        let moved_of = |v: usize| if v == e0 { moved_e0 } else { moved_e1 };
        let mut positions = [anchors[0], anchors[1], moved_of(vertices[2]), moved_of(vertices[3])];
        if quad_sides_cross(&project_quad(ctx.camera, &positions)?) {
            positions.swap(2, 3);
        }

        Ok(PreviewFace {
            mesh: drag.mesh.clone(),
            vertices,
            positions,
            commit: vec![2, 3],
        })
    }

    fn apply_preview(&mut self, result: Result<PreviewFace, EditError>) -> EventOutcome {
        match result {
            Ok(preview) => {
                self.preview = Some(preview);
                EventOutcome::PreviewUpdated
            }
            Err(EditError::StaleReference { what }) => {
                debug!("drag target went stale: {what}");
                self.reset();
                EventOutcome::Cancelled {
                    reason: format!("{what} no longer exists"),
                }
            }
            Err(err) => {
                debug!("preview update skipped: {err}");
                EventOutcome::PreviewRejected { reason: err.to_string() }
            }
        }
    }
}

impl Manipulator for MoveManipulator {
    fn on_pointer_move(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        if self.is_busy() {
            return EventOutcome::Ignored;
        }
        let previous = self.intersection.kind();
        self.intersection = pick(event, ctx);
        if self.intersection.kind() != previous {
            debug!("hover {:?} -> {:?}", previous, self.intersection.kind());
        }
        EventOutcome::Hover {
            kind: self.intersection.kind(),
        }
    }

    fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        if event.button != MouseButton::Left {
            return EventOutcome::Ignored;
        }
        self.preview = None;
        self.intersection = pick(event, ctx);

        match &self.intersection {
            Intersection::Point(hit) => {
                let Some(face) = hit.face else {
                    return EventOutcome::Ignored;
                };
                self.state = MoveState::MovingPoint(PointDrag {
                    mesh: hit.mesh.clone(),
                    camera: event.camera.clone(),
                    index: hit.index,
                    face,
                });
                EventOutcome::GestureStarted {
                    gesture: GestureKind::MovePoint,
                }
            }
            Intersection::Edge(hit) => {
                let Some((face, fixed)) = hit
                    .face
                    .and_then(|face| Some((face, fixed_vertices(&face, hit.indices)?)))
                else {
                    return EventOutcome::Ignored;
                };
                self.state = MoveState::MovingEdge(EdgeDrag {
                    mesh: hit.mesh.clone(),
                    camera: event.camera.clone(),
                    edge: hit.indices,
                    face,
                    fixed,
                    ratio: hit.ratio,
                    height_2d: hit.height_2d,
                    height_3d: hit.height_3d,
                });
                EventOutcome::GestureStarted {
                    gesture: GestureKind::MoveEdge,
                }
            }
            Intersection::None => EventOutcome::Ignored,
        }
    }

    fn on_pointer_drag(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        let key = event.modifiers.key();
        match self.state.clone() {
            MoveState::Idle => EventOutcome::Ignored,
            MoveState::MovingPoint(drag) => {
                let states = ctx.cache.get(&drag.mesh).map(|e| e.movability_of(drag.index));
                if !movability_allows(key, &[states.unwrap_or(MovabilityState::Unmovable)]) {
                    return EventOutcome::PreviewLocked;
                }
                let result = self.point_preview(&drag, event, key, ctx);
                self.apply_preview(result)
            }
            MoveState::MovingEdge(drag) => {
                let states = ctx
                    .cache
                    .get(&drag.mesh)
                    .map(|e| drag.edge.map(|v| e.movability_of(v)))
                    .unwrap_or([MovabilityState::Unmovable; 2]);
                if !movability_allows(key, &states) {
                    return EventOutcome::PreviewLocked;
                }
                let result = self.edge_preview(&drag, event, key, ctx);
                self.apply_preview(result)
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        let state = std::mem::take(&mut self.state);
        let preview = self.preview.take();
        self.intersection = Intersection::None;

        let preview = match (state, preview) {
            (MoveState::Idle, _) => return EventOutcome::Ignored,
            (_, Some(preview)) if event.modifiers.key() != ModifierKey::None => preview,
            _ => return EventOutcome::Discarded,
        };
        let moves: Option<Vec<VertexMove>> = ctx.cache.get(&preview.mesh).and_then(|entry| {
            preview
                .commit
                .iter()
                .map(|&slot| {
                    let index = preview.vertices[slot];
                    Some(VertexMove {
                        index,
                        from: *entry.points.get(index)?,
                        to: preview.positions[slot],
                    })
                })
                .collect()
        });
        let Some(moves) = moves else {
            warn!("{} changed before the drag was committed", preview.mesh);
            return EventOutcome::Cancelled {
                reason: format!("{} no longer matches the preview", preview.mesh),
            };
        };
        ctx.commit(EditCommand::MoveVertices {
            mesh: preview.mesh,
            moves,
        })
    }

    fn on_draw(&self, _cursor: Option<&PointerEvent>, ctx: &DrawContext<'_>) -> DrawList {
        let mut list = DrawList::new();
        let key = ctx.modifiers.key();
        let to_view = |p: &Point3<f64>| ctx.camera.world_to_view(p, &ctx.viewport).ok();

        match &self.intersection {
            Intersection::Point(hit) => {
                if let Some(entry) = ctx.cache.get(&hit.mesh) {
                    if let Some(center) = entry.points.get(hit.index).and_then(to_view) {
                        let color = hover_color(key, &[entry.movability_of(hit.index)]);
                        list.circle(center, ctx.config.pick.point_radius, color);
                        list.point(center, 4.0, color);
                    }
                }
            }
            Intersection::Edge(hit) => {
                if let Some(entry) = ctx.cache.get(&hit.mesh) {
                    let [a, b] = hit.indices;
                    if let (Some(pa), Some(pb)) = (
                        entry.points.get(a).and_then(to_view),
                        entry.points.get(b).and_then(to_view),
                    ) {
                        let states = [entry.movability_of(a), entry.movability_of(b)];
                        let color = hover_color(key, &states);
                        list.line(pa, pb, color);
                    }
                }
            }
            Intersection::None => {}
        }

        if let Some(preview) = &self.preview {
            let outline: Option<Vec<Point2<f64>>> = preview.positions.iter().map(to_view).collect();
            if let Some(outline) = outline {
                for (a, b) in outline.iter().zip(outline.iter().cycle().skip(1)) {
                    list.line(*a, *b, Color::PREVIEW);
                }
                list.polygon(outline, Color::PREVIEW);
            }
        }
        list
    }

    fn reset(&mut self) {
        self.state = MoveState::Idle;
        self.intersection = Intersection::None;
        self.preview = None;
    }

    fn is_busy(&self) -> bool {
        self.state != MoveState::Idle
    }

    fn intersection(&self) -> &Intersection {
        &self.intersection
    }
}
