use crate::cache::{MeshCache, RebuildReport};
use crate::model::MovabilityState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovabilityStats {
    pub unmovable: usize,
    pub movable_in_same_plane: usize,
    pub movable_recompute: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSummary {
    pub mesh: String,
    pub points: usize,
    pub edges: usize,
    pub faces: usize,
    pub loose_vertices: usize,
    pub movability: MovabilityStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSummary {
    pub meshes: Vec<MeshSummary>,
    pub stale: Vec<String>,
    pub warnings: Vec<Warning>,
}

pub fn summarize(cache: &MeshCache, rebuild: &RebuildReport) -> CacheSummary {
    let mut warnings = Vec::new();
    let mut meshes = Vec::new();

    for (mesh, entry) in cache.iter() {
        let count = |state: MovabilityState| {
            entry.movability.iter().filter(|&&m| m == state).count()
        };
        let loose_vertices = entry.vertex_faces.iter().filter(|f| f.is_empty()).count();
        if loose_vertices > 0 {
            warnings.push(Warning {
                code: "loose_vertices".to_string(),
                message: format!(
                    "{mesh}: {loose_vertices} vertices belong to no face and cannot be dragged."
                ),
            });
        }
        meshes.push(MeshSummary {
            mesh: mesh.clone(),
            points: entry.points.len(),
            edges: entry.edges.len(),
            faces: entry.faces.len(),
            loose_vertices,
            movability: MovabilityStats {
                unmovable: count(MovabilityState::Unmovable),
                movable_in_same_plane: count(MovabilityState::MovableInSamePlane),
                movable_recompute: count(MovabilityState::MovableRecompute),
            },
        });
    }

    if meshes.is_empty() {
        warnings.push(Warning {
            code: "no_meshes".to_string(),
            message: "Scene holds no mesh; only face creation is possible.".to_string(),
        });
    }
    for mesh in &rebuild.stale {
        warnings.push(Warning {
            code: "stale_mesh".to_string(),
            message: format!("{mesh}: could not be read from the scene; hover ignores it."),
        });
    }

    CacheSummary {
        meshes,
        stale: rebuild.stale.clone(),
        warnings,
    }
}
