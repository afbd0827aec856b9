use crate::command::CommandHistory;
use crate::config::ToolConfig;
use crate::draw::DrawList;
use crate::input::{EventQueue, InputEvent, Key, Modifiers, MouseButton, PointerEvent};
use crate::manipulator::{ActiveManipulator, DrawContext, EditMode, EventOutcome, ManipContext};
use crate::navigate::{zoom_at, PanDrag};
use facade_core::cache::{DisplayCache, MeshCache, RebuildReport};
use facade_core::camera::Camera;
use facade_core::intersection::Intersection;
use facade_core::model::PointCloud;
use facade_core::scene::Scene;
use log::{debug, info, warn};

/// Owns the per-tool state: caches, history and the active manipulator.
/// The scene itself stays with the host and is lent on every call.
#[derive(Debug)]
pub struct ToolContext {
    config: ToolConfig,
    cache: MeshCache,
    displays: DisplayCache,
    history: CommandHistory,
    cloud: PointCloud,
    manipulator: ActiveManipulator,
    modifiers: Modifiers,
    active_camera: Option<String>,
    last_pointer: Option<PointerEvent>,
    pan: Option<PanDrag>,
    queue: EventQueue,
    active: bool,
}

impl ToolContext {
    pub fn new(config: ToolConfig, cloud: PointCloud) -> Self {
        Self {
            config,
            cache: MeshCache::new(),
            displays: DisplayCache::new(),
            history: CommandHistory::new(),
            cloud,
            manipulator: ActiveManipulator::for_mode(EditMode::Move),
            modifiers: Modifiers::NONE,
            active_camera: None,
            last_pointer: None,
            pan: None,
            queue: EventQueue::new(),
            active: false,
        }
    }

    /// Tool switched on: rebuild every mesh cache from the scene.
    pub fn activate(&mut self, scene: &dyn Scene) -> RebuildReport {
        let report = self.cache.rebuild_all(scene);
        self.displays.clear();
        self.active = true;
        info!(
            "tool active: {} meshes cached, {} stale, {} cloud points",
            report.rebuilt,
            report.stale.len(),
            self.cloud.len()
        );
        report
    }

    pub fn deactivate(&mut self) {
        self.manipulator = ActiveManipulator::for_mode(EditMode::Move);
        self.cache.clear();
        self.displays.clear();
        self.pan = None;
        self.last_pointer = None;
        self.active_camera = None;
        self.queue.clear();
        self.active = false;
        debug!("tool deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> EditMode {
        self.manipulator.mode()
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    pub fn displays(&self) -> &DisplayCache {
        &self.displays
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn manipulator(&self) -> &ActiveManipulator {
        &self.manipulator
    }

    pub fn intersection(&self) -> &Intersection {
        self.manipulator.as_manipulator().intersection()
    }

    pub fn is_busy(&self) -> bool {
        self.manipulator.as_manipulator().is_busy()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Handles every queued event in arrival order.
    pub fn pump(&mut self, scene: &mut dyn Scene) -> Vec<EventOutcome> {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop() {
            outcomes.push(self.handle(scene, event));
        }
        outcomes
    }

    pub fn handle(&mut self, scene: &mut dyn Scene, event: InputEvent) -> EventOutcome {
        if !self.active {
            return EventOutcome::Ignored;
        }
        match event {
            InputEvent::PointerMove(pointer) => self.pointer(scene, pointer, PointerPhase::Move),
            InputEvent::PointerPress(pointer) => self.pointer(scene, pointer, PointerPhase::Down),
            InputEvent::PointerDrag(pointer) => self.pointer(scene, pointer, PointerPhase::Drag),
            InputEvent::PointerRelease(pointer) => self.pointer(scene, pointer, PointerPhase::Up),
            InputEvent::Wheel { pointer, delta } => self.wheel(scene, pointer, delta),
            InputEvent::KeyPress { key, modifiers } => {
                self.modifiers = modifiers;
                self.key_press(scene, key)
            }
            InputEvent::KeyRelease { key, modifiers } => {
                self.modifiers = modifiers;
                self.key_release(key)
            }
        }
    }

    /// Draw list for the last known cursor and camera.
    pub fn draw(&mut self, scene: &dyn Scene) -> DrawList {
        let Some(pointer) = self.last_pointer.clone() else {
            return DrawList::new();
        };
        let camera = match self.displays.display(scene, &pointer.camera) {
            Ok(display) => display.camera.clone(),
            Err(_) => return DrawList::new(),
        };
        let ctx = DrawContext {
            cache: &self.cache,
            camera: &camera,
            viewport: pointer.viewport,
            modifiers: self.modifiers,
            config: &self.config,
        };
        self.manipulator.as_manipulator().on_draw(Some(&pointer), &ctx)
    }

    fn cancel_gesture(&mut self, reason: &str) -> Option<EventOutcome> {
        let busy = self.is_busy();
        self.manipulator.as_manipulator_mut().reset();
        busy.then(|| {
            debug!("gesture cancelled: {reason}");
            EventOutcome::Cancelled {
                reason: reason.to_string(),
            }
        })
    }

    fn set_mode(&mut self, mode: EditMode) -> EventOutcome {
        if self.mode() == mode {
            return EventOutcome::Ignored;
        }
        self.manipulator = ActiveManipulator::for_mode(mode);
        info!("edit mode: {mode:?}");
        EventOutcome::ModeChanged { mode }
    }

    fn display_camera(&mut self, scene: &dyn Scene, camera: &str) -> Option<Camera> {
        match self.displays.display(scene, camera) {
            Ok(display) => Some(display.camera.clone()),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    fn pointer(
        &mut self,
        scene: &mut dyn Scene,
        pointer: PointerEvent,
        phase: PointerPhase,
    ) -> EventOutcome {
        self.modifiers = pointer.modifiers;
        self.last_pointer = Some(pointer.clone());

        let switched = self.active_camera.as_deref() != Some(pointer.camera.as_str());
        let cancelled = if switched {
            self.active_camera = Some(pointer.camera.clone());
            self.pan = None;
            self.cancel_gesture("view changed")
        } else {
            None
        };

        let Some(camera) = self.display_camera(&*scene, &pointer.camera) else {
            self.manipulator.as_manipulator_mut().reset();
            return EventOutcome::Failed {
                error: format!("camera {} is not available", pointer.camera),
            };
        };

        if pointer.button == MouseButton::Middle && phase != PointerPhase::Move {
            return self.pan_event(&camera, &pointer, phase);
        }
        if pointer.button == MouseButton::Right && phase != PointerPhase::Move {
            return EventOutcome::Ignored;
        }
        if let Some(cancelled) = cancelled {
            if phase != PointerPhase::Down {
                return cancelled;
            }
        }

        if self.cache.is_out_of_date(&*scene) {
            let report = self.cache.rebuild_all(&*scene);
            debug!("scene changed outside the tool, rebuilt {} meshes", report.rebuilt);
            if let Some(cancelled) = self.cancel_gesture("mesh changed") {
                if phase != PointerPhase::Down {
                    return cancelled;
                }
            }
        }

        let mut ctx = ManipContext {
            scene,
            cache: &mut self.cache,
            history: &mut self.history,
            cloud: &self.cloud,
            camera: &camera,
            config: &self.config,
        };
        let manipulator = self.manipulator.as_manipulator_mut();
        match phase {
            PointerPhase::Move => manipulator.on_pointer_move(&pointer, &mut ctx),
            PointerPhase::Down => manipulator.on_pointer_down(&pointer, &mut ctx),
            PointerPhase::Drag => manipulator.on_pointer_drag(&pointer, &mut ctx),
            PointerPhase::Up => manipulator.on_pointer_up(&pointer, &mut ctx),
        }
    }

    fn pan_event(
        &mut self,
        camera: &Camera,
        pointer: &PointerEvent,
        phase: PointerPhase,
    ) -> EventOutcome {
        match phase {
            PointerPhase::Down => {
                let cancelled = self.cancel_gesture("view navigated");
                self.pan = Some(PanDrag::begin(camera, pointer.position));
                cancelled.unwrap_or(EventOutcome::Navigated)
            }
            PointerPhase::Drag => {
                let Some(pan) = &self.pan else {
                    return EventOutcome::Ignored;
                };
                let Some(display) = self.displays.get_mut(&pan.camera) else {
                    return EventOutcome::Ignored;
                };
                pan.apply(&mut display.camera, &pointer.position, &pointer.viewport);
                EventOutcome::Navigated
            }
            PointerPhase::Up => {
                self.pan = None;
                EventOutcome::Navigated
            }
            PointerPhase::Move => EventOutcome::Ignored,
        }
    }

    fn wheel(&mut self, scene: &mut dyn Scene, pointer: PointerEvent, delta: f64) -> EventOutcome {
        self.last_pointer = Some(pointer.clone());
        let cancelled = self.cancel_gesture("view navigated");
        let navigation = self.config.navigation;
        match self.displays.display(&*scene, &pointer.camera) {
            Ok(display) => {
                zoom_at(
                    &mut display.camera,
                    &pointer.position,
                    &pointer.viewport,
                    delta,
                    &navigation,
                );
                cancelled.unwrap_or(EventOutcome::Navigated)
            }
            Err(err) => EventOutcome::Failed { error: err.to_string() },
        }
    }

    fn key_press(&mut self, scene: &mut dyn Scene, key: Key) -> EventOutcome {
        match key {
            Key::C => self.set_mode(EditMode::CreateFace),
            Key::Escape => self.cancel_gesture("escape").unwrap_or(EventOutcome::Ignored),
            Key::F => {
                let Some(camera) = self.active_camera.clone() else {
                    return EventOutcome::Ignored;
                };
                let cancelled = self.cancel_gesture("view reset");
                match self.displays.display(&*scene, &camera) {
                    Ok(display) => {
                        display.camera.reset_zoom_and_pan();
                        cancelled.unwrap_or(EventOutcome::Navigated)
                    }
                    Err(err) => EventOutcome::Failed { error: err.to_string() },
                }
            }
            Key::Z if self.modifiers.ctrl => self.undo_redo(scene, true),
            Key::Y if self.modifiers.ctrl => self.undo_redo(scene, false),
            _ => EventOutcome::Ignored,
        }
    }

    fn key_release(&mut self, key: Key) -> EventOutcome {
        match key {
            Key::C => self.set_mode(EditMode::Move),
            _ => EventOutcome::Ignored,
        }
    }

    fn undo_redo(&mut self, scene: &mut dyn Scene, undo: bool) -> EventOutcome {
        self.manipulator.as_manipulator_mut().reset();
        let result = if undo {
            self.history.undo(scene)
        } else {
            self.history.redo(scene)
        };
        let mesh = match result {
            Ok(mesh) => mesh,
            Err(err) => {
                debug!("{err}");
                return EventOutcome::Failed { error: err.to_string() };
            }
        };
        if !scene.mesh_ids().contains(&mesh) {
            self.cache.remove(&mesh);
            debug!("{mesh} left the scene, cache entry dropped");
        } else if let Err(err) = self.cache.rebuild_one(&*scene, &mesh) {
            warn!("cache refresh after history step failed: {err}");
        }
        info!("{} on {mesh}", if undo { "undo" } else { "redo" });
        if undo {
            EventOutcome::Undone { mesh }
        } else {
            EventOutcome::Redone { mesh }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerPhase {
    Move,
    Down,
    Drag,
    Up,
}
