use crate::camera::Camera;
use crate::error::StoreError;
use crate::model::{MeshData, Quad};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrow view of the host scene graph. Mesh storage, transforms and undo
/// belong to the host; the editing core only reads and writes through here.
pub trait SceneStore {
    fn mesh_ids(&self) -> Vec<String>;
    fn vertex_positions(&self, mesh: &str) -> Result<Vec<Point3<f64>>, StoreError>;
    fn face_count(&self, mesh: &str) -> Result<usize, StoreError>;
    fn face_vertices(&self, mesh: &str, face: usize) -> Result<Quad, StoreError>;
    fn connected_faces(&self, mesh: &str, vertex: usize) -> Result<Vec<usize>, StoreError>;

    /// Writes every position or none of them.
    fn commit_vertex_positions(
        &mut self,
        mesh: &str,
        positions: &BTreeMap<usize, Point3<f64>>,
    ) -> Result<(), StoreError>;

    /// Appends a quad, creating `mesh` if needed. Positions close to an
    /// existing vertex reuse it.
    fn add_face(
        &mut self,
        mesh: &str,
        positions: &[Point3<f64>; 4],
    ) -> Result<AddedFace, StoreError>;

    /// Reverts the most recent `add_face`.
    fn remove_face(&mut self, mesh: &str, added: &AddedFace) -> Result<(), StoreError>;
}

pub trait CameraProvider {
    fn camera(&self, id: &str) -> Option<Camera>;
}

/// Everything the tool needs from the host.
pub trait Scene: SceneStore + CameraProvider {}

impl<T: SceneStore + CameraProvider> Scene for T {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedFace {
    pub face: usize,
    pub vertices: Quad,
    pub new_vertices: Vec<usize>,
    pub created_mesh: bool,
}

/// In-memory scene used by the CLI and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryScene {
    #[serde(default)]
    pub meshes: BTreeMap<String, MeshData>,
    #[serde(default)]
    pub cameras: BTreeMap<String, Camera>,
    #[serde(default = "default_merge_tolerance")]
    pub merge_tolerance: f64,
}

fn default_merge_tolerance() -> f64 {
    1e-6
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            meshes: BTreeMap::new(),
            cameras: BTreeMap::new(),
            merge_tolerance: default_merge_tolerance(),
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh(mut self, name: impl Into<String>, mesh: MeshData) -> Self {
        self.meshes.insert(name.into(), mesh);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.cameras.insert(camera.name.clone(), camera);
        self
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshData> {
        self.meshes.get(name)
    }

    pub fn remove_mesh(&mut self, name: &str) -> Option<MeshData> {
        self.meshes.remove(name)
    }

    fn get(&self, mesh: &str) -> Result<&MeshData, StoreError> {
        self.meshes
            .get(mesh)
            .ok_or_else(|| StoreError::MissingMesh(mesh.to_string()))
    }
}

impl SceneStore for MemoryScene {
    fn mesh_ids(&self) -> Vec<String> {
        self.meshes.keys().cloned().collect()
    }

    fn vertex_positions(&self, mesh: &str) -> Result<Vec<Point3<f64>>, StoreError> {
        Ok(self.get(mesh)?.points.clone())
    }

    fn face_count(&self, mesh: &str) -> Result<usize, StoreError> {
        Ok(self.get(mesh)?.faces.len())
    }

    fn face_vertices(&self, mesh: &str, face: usize) -> Result<Quad, StoreError> {
        self.get(mesh)?
            .faces
            .get(face)
            .copied()
            .ok_or_else(|| StoreError::FaceOutOfRange {
                mesh: mesh.to_string(),
                index: face,
            })
    }

    fn connected_faces(&self, mesh: &str, vertex: usize) -> Result<Vec<usize>, StoreError> {
        let data = self.get(mesh)?;
        if vertex >= data.points.len() {
            return Err(StoreError::VertexOutOfRange {
                mesh: mesh.to_string(),
                index: vertex,
            });
        }
        Ok(data.faces_of_vertex(vertex))
    }

    fn commit_vertex_positions(
        &mut self,
        mesh: &str,
        positions: &BTreeMap<usize, Point3<f64>>,
    ) -> Result<(), StoreError> {
        let data = self
            .meshes
            .get_mut(mesh)
            .ok_or_else(|| StoreError::MissingMesh(mesh.to_string()))?;

        // Validate every target before touching any of them.
        for (&index, position) in positions {
            if index >= data.points.len() {
                return Err(StoreError::VertexOutOfRange {
                    mesh: mesh.to_string(),
                    index,
                });
            }
            if !position.iter().all(|c| c.is_finite()) {
                return Err(StoreError::Rejected(format!(
                    "non-finite position for vertex {index}"
                )));
            }
        }

        for (&index, position) in positions {
            data.points[index] = *position;
        }
        Ok(())
    }

    fn add_face(
        &mut self,
        mesh: &str,
        positions: &[Point3<f64>; 4],
    ) -> Result<AddedFace, StoreError> {
        if positions.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(StoreError::Rejected("non-finite face position".to_string()));
        }

        let tolerance = self.merge_tolerance;
        let created_mesh = !self.meshes.contains_key(mesh);
        let data = self.meshes.entry(mesh.to_string()).or_default();

        let mut vertices = [0usize; 4];
        let mut fresh = Vec::new();
        for (slot, position) in vertices.iter_mut().zip(positions) {
            let merged = data
                .points
                .iter()
                .position(|existing| (existing - position).norm() <= tolerance);
            *slot = match merged {
                Some(existing) => existing,
                None => {
                    data.points.push(*position);
                    fresh.push(data.points.len() - 1);
                    data.points.len() - 1
                }
            };
        }

        let mut sorted = vertices;
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            // Roll back the vertices we just appended.
            data.points.truncate(data.points.len() - fresh.len());
            if created_mesh {
                self.meshes.remove(mesh);
            }
            return Err(StoreError::Rejected(
                "face collapses onto repeated vertices".to_string(),
            ));
        }

        data.faces.push(vertices);
        Ok(AddedFace {
            face: data.faces.len() - 1,
            vertices,
            new_vertices: fresh,
            created_mesh,
        })
    }

    fn remove_face(&mut self, mesh: &str, added: &AddedFace) -> Result<(), StoreError> {
        let data = self
            .meshes
            .get_mut(mesh)
            .ok_or_else(|| StoreError::MissingMesh(mesh.to_string()))?;

        if data.faces.len() != added.face + 1 || data.faces[added.face] != added.vertices {
            return Err(StoreError::Rejected(format!(
                "face {} is not the most recent face of {mesh}",
                added.face
            )));
        }
        let trailing = data.points.len().saturating_sub(added.new_vertices.len());
        if added
            .new_vertices
            .iter()
            .enumerate()
            .any(|(i, &v)| v != trailing + i)
        {
            return Err(StoreError::Rejected(format!(
                "vertices added with face {} are no longer trailing",
                added.face
            )));
        }

        data.faces.pop();
        data.points.truncate(trailing);
        if added.created_mesh && data.faces.is_empty() && data.points.is_empty() {
            self.meshes.remove(mesh);
        }
        Ok(())
    }
}

impl CameraProvider for MemoryScene {
    fn camera(&self, id: &str) -> Option<Camera> {
        self.cameras.get(id).cloned()
    }
}
