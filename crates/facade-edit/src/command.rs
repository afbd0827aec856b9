use facade_core::error::{EditError, StoreError};
use facade_core::scene::{AddedFace, SceneStore};
use log::{info, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexMove {
    pub index: usize,
    pub from: Point3<f64>,
    pub to: Point3<f64>,
}

/// A reversible edit of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    MoveVertices {
        mesh: String,
        moves: Vec<VertexMove>,
    },
    AddFace {
        mesh: String,
        positions: [Point3<f64>; 4],
        /// Filled in once the store has accepted the face.
        #[serde(default)]
        added: Option<AddedFace>,
    },
}

impl EditCommand {
    pub fn mesh(&self) -> &str {
        match self {
            EditCommand::MoveVertices { mesh, .. } | EditCommand::AddFace { mesh, .. } => mesh,
        }
    }

    /// Vertex indices this command writes.
    pub fn vertices(&self) -> Vec<usize> {
        match self {
            EditCommand::MoveVertices { moves, .. } => moves.iter().map(|m| m.index).collect(),
            EditCommand::AddFace { added, .. } => added
                .as_ref()
                .map(|a| a.vertices.to_vec())
                .unwrap_or_default(),
        }
    }

    fn apply<S: SceneStore + ?Sized>(&mut self, scene: &mut S) -> Result<(), StoreError> {
        match self {
            EditCommand::MoveVertices { mesh, moves } => {
                let positions: BTreeMap<usize, Point3<f64>> =
                    moves.iter().map(|m| (m.index, m.to)).collect();
                scene.commit_vertex_positions(mesh, &positions)
            }
            EditCommand::AddFace { mesh, positions, added } => {
                *added = Some(scene.add_face(mesh, positions)?);
                Ok(())
            }
        }
    }

    fn revert<S: SceneStore + ?Sized>(&mut self, scene: &mut S) -> Result<(), StoreError> {
        match self {
            EditCommand::MoveVertices { mesh, moves } => {
                let positions: BTreeMap<usize, Point3<f64>> =
                    moves.iter().map(|m| (m.index, m.from)).collect();
                scene.commit_vertex_positions(mesh, &positions)
            }
            EditCommand::AddFace { mesh, added, .. } => {
                let Some(face) = added.take() else {
                    return Err(StoreError::Rejected(format!("{mesh}: face was never added")));
                };
                if let Err(err) = scene.remove_face(mesh, &face) {
                    *added = Some(face);
                    return Err(err);
                }
                Ok(())
            }
        }
    }
}

/// Undo/redo stacks of applied commands.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    undo: Vec<EditCommand>,
    redo: Vec<EditCommand>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `command` and records it. A rejected command leaves both
    /// the scene and the history untouched.
    pub fn execute<S: SceneStore + ?Sized>(
        &mut self,
        mut command: EditCommand,
        scene: &mut S,
    ) -> Result<&EditCommand, EditError> {
        command.apply(scene).map_err(|err| {
            warn!("commit on {} rejected: {err}", command.mesh());
            EditError::CommitFailure(err)
        })?;
        info!("committed {} vertices on {}", command.vertices().len(), command.mesh());
        self.redo.clear();
        self.undo.push(command);
        Ok(&self.undo[self.undo.len() - 1])
    }

    /// Reverts the last command and returns the mesh it touched.
    pub fn undo<S: SceneStore + ?Sized>(&mut self, scene: &mut S) -> Result<String, EditError> {
        let mut command = self.undo.pop().ok_or(EditError::NothingToUndo)?;
        if let Err(err) = command.revert(scene) {
            self.undo.push(command);
            return Err(EditError::CommitFailure(err));
        }
        let mesh = command.mesh().to_string();
        self.redo.push(command);
        Ok(mesh)
    }

    pub fn redo<S: SceneStore + ?Sized>(&mut self, scene: &mut S) -> Result<String, EditError> {
        let mut command = self.redo.pop().ok_or(EditError::NothingToRedo)?;
        if let Err(err) = command.apply(scene) {
            self.redo.push(command);
            return Err(EditError::CommitFailure(err));
        }
        let mesh = command.mesh().to_string();
        self.undo.push(command);
        Ok(mesh)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn last(&self) -> Option<&EditCommand> {
        self.undo.last()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
