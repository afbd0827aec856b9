use crate::command::EditCommand;
use crate::draw::{Color, DrawList};
use crate::input::{ModifierKey, MouseButton, PointerEvent};
use crate::manipulator::{pick, DrawContext, EventOutcome, GestureKind, ManipContext, Manipulator};
use facade_core::error::EditError;
use facade_core::geom::{compute_plane, quad_sides_cross, Plane};
use facade_core::intersection::{EdgeHit, Intersection};
use facade_core::projection::{project_face_2d, project_point_on_plane, FacePlane};
use log::{debug, warn};
use nalgebra::{Point2, Point3, Vector2};
use std::f64::consts::FRAC_1_SQRT_2;

/// Dragging a new face out of an existing edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion {
    pub mesh: String,
    pub camera: String,
    pub edge: [usize; 2],
    pub ratio: f64,
    pub height_2d: Vector2<f64>,
    /// Plane of the face the edge belongs to.
    pub plane: Plane,
    /// World positions of the edge endpoints.
    pub anchors: [Point3<f64>; 2],
}

/// Builds new faces, either from four clicks or by extruding an edge.
#[derive(Debug, Clone, Default)]
pub struct CreateFaceManipulator {
    /// Camera-plane positions of the clicks so far.
    clicks: Vec<Point2<f64>>,
    camera: Option<String>,
    intersection: Intersection,
    extrusion: Option<Extrusion>,
    preview: Option<[Point3<f64>; 4]>,
}

impl CreateFaceManipulator {
    pub fn clicks(&self) -> &[Point2<f64>] {
        &self.clicks
    }

    pub fn preview(&self) -> Option<&[Point3<f64>; 4]> {
        self.preview.as_ref()
    }

    fn begin_extrusion(
        hit: &EdgeHit,
        event: &PointerEvent,
        ctx: &ManipContext<'_>,
    ) -> Option<Extrusion> {
        let entry = ctx.cache.get(&hit.mesh)?;
        let face = hit.face?;
        let corners = entry.face_points(&face)?;
        let plane = compute_plane(&corners)
            .map_err(|err| debug!("cannot extrude from degenerate face {face:?}: {err}"))
            .ok()?;
        let [a0, a1] = hit.indices.map(|v| entry.points.get(v).copied());
        Some(Extrusion {
            mesh: hit.mesh.clone(),
            camera: event.camera.clone(),
            edge: hit.indices,
            ratio: hit.ratio,
            height_2d: hit.height_2d,
            plane,
            anchors: [a0?, a1?],
        })
    }

    /// New face `[e0, e1, e1', e0']`, with the moved pair swapped if the
    /// quad would cross itself.
    fn extrusion_preview(
        extrusion: &Extrusion,
        event: &PointerEvent,
        key: ModifierKey,
        ctx: &ManipContext<'_>,
    ) -> Result<[Point3<f64>; 4], EditError> {
        let mouse = ctx.camera.view_to_camera(&event.position, &event.viewport);
        let [a0, a1] = extrusion.anchors;
        let mut images = [
            ctx.camera.project(&a0)?,
            ctx.camera.project(&a1)?,
            mouse - extrusion.height_2d * (1.0 - extrusion.ratio),
            mouse + extrusion.height_2d * extrusion.ratio,
        ];
        if quad_sides_cross(&images) {
            images.swap(2, 3);
        }

        let fitted;
        let plane = if key == ModifierKey::Shift {
            let mut support = ctx.cloud.points_in_polygon(ctx.camera, &images);
            support.extend(extrusion.anchors);
            fitted = compute_plane(&support)?;
            &fitted
        } else {
            &extrusion.plane
        };
        Ok([
            a0,
            a1,
            project_point_on_plane(&images[2], plane, ctx.camera)?,
            project_point_on_plane(&images[3], plane, ctx.camera)?,
        ])
    }

    fn close_face(&mut self, ctx: &mut ManipContext<'_>) -> EventOutcome {
        let clicks = std::mem::take(&mut self.clicks);
        let Ok(quad) = <[Point2<f64>; 4]>::try_from(clicks) else {
            return EventOutcome::Ignored;
        };
        let support = ctx.cloud.points_in_polygon(ctx.camera, &quad);
        let positions = match project_face_2d(ctx.camera, &quad, FacePlane::Fit(&support)) {
            Ok(positions) => positions,
            Err(err) => {
                warn!("face not created: {err} ({} cloud points inside)", support.len());
                return EventOutcome::PreviewRejected { reason: err.to_string() };
            }
        };
        ctx.commit(EditCommand::AddFace {
            mesh: ctx.config.target_mesh.clone(),
            positions,
            added: None,
        })
    }
}

impl Manipulator for CreateFaceManipulator {
    fn on_pointer_move(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        if self.extrusion.is_some() {
            return EventOutcome::Ignored;
        }
        self.intersection = pick(event, ctx);
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
        if self.camera.as_deref() != Some(event.camera.as_str()) {
            self.clicks.clear();
            self.camera = Some(event.camera.clone());
        }
        self.preview = None;

        if self.clicks.is_empty() {
            self.intersection = pick(event, ctx);
            if let Intersection::Edge(hit) = &self.intersection {
                if let Some(extrusion) = Self::begin_extrusion(hit, event, ctx) {
                    self.extrusion = Some(extrusion);
                    return EventOutcome::GestureStarted {
                        gesture: GestureKind::ExtrudeEdge,
                    };
                }
            }
        }

        self.clicks
            .push(ctx.camera.view_to_camera(&event.position, &event.viewport));
        if self.clicks.len() < 4 {
            return EventOutcome::ClickRecorded {
                count: self.clicks.len(),
            };
        }
        self.close_face(ctx)
    }

    fn on_pointer_drag(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        let Some(extrusion) = &self.extrusion else {
            return EventOutcome::Ignored;
        };
        let key = event.modifiers.key();
        if key == ModifierKey::None {
            return EventOutcome::PreviewLocked;
        }
        match Self::extrusion_preview(extrusion, event, key, ctx) {
            Ok(preview) => {
                self.preview = Some(preview);
                EventOutcome::PreviewUpdated
            }
            Err(err) => {
                debug!("extrusion preview skipped: {err}");
                EventOutcome::PreviewRejected { reason: err.to_string() }
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        event: &PointerEvent,
        ctx: &mut ManipContext<'_>,
    ) -> EventOutcome {
        let Some(extrusion) = self.extrusion.take() else {
            return EventOutcome::Ignored;
        };
        self.intersection = Intersection::None;
        match self.preview.take() {
            Some(positions) if event.modifiers.key() != ModifierKey::None => {
                ctx.commit(EditCommand::AddFace {
                    mesh: extrusion.mesh,
                    positions,
                    added: None,
                })
            }
            _ => EventOutcome::Discarded,
        }
    }

    fn on_draw(&self, cursor: Option<&PointerEvent>, ctx: &DrawContext<'_>) -> DrawList {
        let mut list = DrawList::new();

        if let Some(cursor) = cursor {
            let inner = ctx.config.cursor_radius;
            let outer = inner + 10.0;
            for (dx, dy) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
                let dir = Vector2::new(dx, dy) * FRAC_1_SQRT_2;
                list.line(
                    cursor.position + dir * inner,
                    cursor.position + dir * outer,
                    Color::CURSOR,
                );
            }
        }

        if self.camera.as_deref() == Some(ctx.camera.name.as_str()) && !self.clicks.is_empty() {
            let points: Vec<Point2<f64>> = self
                .clicks
                .iter()
                .map(|c| ctx.camera.camera_to_view(c, &ctx.viewport))
                .collect();
            for p in &points {
                list.point(*p, 4.0, Color::CURSOR);
            }
            for pair in points.windows(2) {
                list.line(pair[0], pair[1], Color::CURSOR);
            }
            if points.len() > 2 {
                list.polygon(points, Color::PREVIEW);
            }
        }

        if let Intersection::Edge(hit) = &self.intersection {
            if let Some(entry) = ctx.cache.get(&hit.mesh) {
                let ends: Option<Vec<Point2<f64>>> = hit
                    .indices
                    .iter()
                    .map(|&v| ctx.camera.world_to_view(entry.points.get(v)?, &ctx.viewport).ok())
                    .collect();
                if let Some(ends) = ends {
                    let color = match ctx.modifiers.key() {
                        ModifierKey::None => Color::LOCKED,
                        ModifierKey::Ctrl => Color::MOVABLE,
                        ModifierKey::Shift => Color::RECOMPUTE,
                    };
                    list.line(ends[0], ends[1], color);
                }
            }
        }

        if let Some(preview) = &self.preview {
            let outline: Option<Vec<Point2<f64>>> = preview
                .iter()
                .map(|p| ctx.camera.world_to_view(p, &ctx.viewport).ok())
                .collect();
            if let Some(outline) = outline {
                list.polygon(outline, Color::PREVIEW);
            }
        }
        list
    }

    fn reset(&mut self) {
        self.clicks.clear();
        self.camera = None;
        self.intersection = Intersection::None;
        self.extrusion = None;
        self.preview = None;
    }

    fn is_busy(&self) -> bool {
        self.extrusion.is_some() || !self.clicks.is_empty()
    }

    fn intersection(&self) -> &Intersection {
        &self.intersection
    }
}
