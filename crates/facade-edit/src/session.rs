use crate::config::ToolConfig;
use crate::context::ToolContext;
use crate::draw::DrawList;
use crate::input::InputEvent;
use crate::manipulator::{EditMode, EventOutcome};
use facade_core::cache::RebuildReport;
use facade_core::model::PointCloud;
use facade_core::scene::MemoryScene;
use serde::{Deserialize, Serialize};

/// A recorded interaction: the scene it started from and the host events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub scene: MemoryScene,
    #[serde(default)]
    pub point_cloud: PointCloud,
    #[serde(default)]
    pub config: ToolConfig,
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub activation: RebuildReport,
    pub outcomes: Vec<EventOutcome>,
    pub final_mode: EditMode,
    pub undo_depth: usize,
    pub redo_depth: usize,
    /// What the tool would draw after the last event.
    pub overlay: DrawList,
    pub scene: MemoryScene,
}

/// Feeds every event of `session` through a fresh tool.
pub fn replay(session: Session) -> ReplayReport {
    let Session {
        mut scene,
        point_cloud,
        config,
        events,
    } = session;

    let mut tool = ToolContext::new(config, point_cloud);
    let activation = tool.activate(&scene);
    for event in events {
        tool.push(event);
    }
    let outcomes = tool.pump(&mut scene);
    let overlay = tool.draw(&scene);

    ReplayReport {
        activation,
        outcomes,
        final_mode: tool.mode(),
        undo_depth: tool.history().undo_depth(),
        redo_depth: tool.history().redo_depth(),
        overlay,
        scene,
    }
}
