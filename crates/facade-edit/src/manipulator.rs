use crate::command::{CommandHistory, EditCommand};
use crate::config::ToolConfig;
use crate::create::CreateFaceManipulator;
use crate::draw::{Color, DrawList};
use crate::input::{ModifierKey, Modifiers, PointerEvent};
use crate::movement::MoveManipulator;
use facade_core::cache::MeshCache;
use facade_core::camera::{Camera, Viewport};
use facade_core::intersection::{intersect, Intersection, IntersectionKind};
use facade_core::model::{MovabilityState, PointCloud};
use facade_core::scene::Scene;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Move,
    CreateFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    MovePoint,
    MoveEdge,
    ExtrudeEdge,
}

/// What a single event did, reported back to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Ignored,
    Hover { kind: IntersectionKind },
    GestureStarted { gesture: GestureKind },
    PreviewUpdated,
    /// The held modifier does not allow this drag; the preview is kept.
    PreviewLocked,
    /// Degenerate geometry; the previous preview is kept.
    PreviewRejected { reason: String },
    ClickRecorded { count: usize },
    Committed { mesh: String, vertices: Vec<usize> },
    FaceAdded { mesh: String, face: usize },
    Discarded,
    Cancelled { reason: String },
    Navigated,
    ModeChanged { mode: EditMode },
    Undone { mesh: String },
    Redone { mesh: String },
    Failed { error: String },
}

/// Everything a manipulator may touch while handling one pointer event.
pub struct ManipContext<'a> {
    pub scene: &'a mut dyn Scene,
    pub cache: &'a mut MeshCache,
    pub history: &'a mut CommandHistory,
    pub cloud: &'a PointCloud,
    pub camera: &'a Camera,
    pub config: &'a ToolConfig,
}

impl ManipContext<'_> {
    /// Runs `command` through the history and refreshes the touched mesh.
    pub fn commit(&mut self, command: EditCommand) -> EventOutcome {
        let applied = match self.history.execute(command, &mut *self.scene) {
            Ok(applied) => applied.clone(),
            Err(err) => return EventOutcome::Failed { error: err.to_string() },
        };
        let mesh = applied.mesh().to_string();
        if let Err(err) = self.cache.rebuild_one(&*self.scene, &mesh) {
            warn!("cache refresh after commit failed: {err}");
        }
        match applied {
            EditCommand::AddFace {
                added: Some(added), ..
            } => EventOutcome::FaceAdded {
                mesh,
                face: added.face,
            },
            other => EventOutcome::Committed {
                mesh,
                vertices: other.vertices(),
            },
        }
    }
}

/// Read-only view handed to `on_draw`.
pub struct DrawContext<'a> {
    pub cache: &'a MeshCache,
    pub camera: &'a Camera,
    pub viewport: Viewport,
    pub modifiers: Modifiers,
    pub config: &'a ToolConfig,
}

/// Intersection under the pointer of `event`.
pub fn pick(event: &PointerEvent, ctx: &ManipContext<'_>) -> Intersection {
    intersect(
        &*ctx.cache,
        ctx.camera,
        &event.viewport,
        &event.position,
        &ctx.config.pick,
    )
}

/// Hover color of a vertex or edge given the held modifier and the
/// movability of the vertices involved.
pub fn hover_color(key: ModifierKey, states: &[MovabilityState]) -> Color {
    let weakest = states.iter().min().copied().unwrap_or(MovabilityState::Unmovable);
    match key {
        ModifierKey::None => Color::LOCKED,
        ModifierKey::Ctrl if weakest >= MovabilityState::MovableInSamePlane => Color::MOVABLE,
        ModifierKey::Shift if weakest == MovabilityState::MovableRecompute => Color::RECOMPUTE,
        _ => Color::FORBIDDEN,
    }
}

/// Capabilities shared by the interactive tools.
pub trait Manipulator {
    fn on_pointer_move(&mut self, event: &PointerEvent, ctx: &mut ManipContext<'_>) -> EventOutcome;
    fn on_pointer_down(&mut self, event: &PointerEvent, ctx: &mut ManipContext<'_>) -> EventOutcome;
    fn on_pointer_drag(&mut self, event: &PointerEvent, ctx: &mut ManipContext<'_>) -> EventOutcome;
    fn on_pointer_up(&mut self, event: &PointerEvent, ctx: &mut ManipContext<'_>) -> EventOutcome;
    fn on_draw(&self, cursor: Option<&PointerEvent>, ctx: &DrawContext<'_>) -> DrawList;
    /// Drops any gesture, preview and hover state.
    fn reset(&mut self);
    fn is_busy(&self) -> bool;
    fn intersection(&self) -> &Intersection;
}

/// The manipulator bound to the current edit mode.
#[derive(Debug, Clone)]
pub enum ActiveManipulator {
    Move(MoveManipulator),
    CreateFace(CreateFaceManipulator),
}

impl ActiveManipulator {
    pub fn for_mode(mode: EditMode) -> Self {
        match mode {
            EditMode::Move => ActiveManipulator::Move(MoveManipulator::default()),
            EditMode::CreateFace => ActiveManipulator::CreateFace(CreateFaceManipulator::default()),
        }
    }

    pub fn mode(&self) -> EditMode {
        match self {
            ActiveManipulator::Move(_) => EditMode::Move,
            ActiveManipulator::CreateFace(_) => EditMode::CreateFace,
        }
    }

    pub fn as_manipulator(&self) -> &dyn Manipulator {
        match self {
            ActiveManipulator::Move(m) => m,
            ActiveManipulator::CreateFace(m) => m,
        }
    }

    pub fn as_manipulator_mut(&mut self) -> &mut dyn Manipulator {
        match self {
            ActiveManipulator::Move(m) => m,
            ActiveManipulator::CreateFace(m) => m,
        }
    }
}
