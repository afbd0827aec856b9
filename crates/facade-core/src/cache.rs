use crate::camera::Camera;
use crate::error::{EditError, StoreError};
use crate::model::{MovabilityState, Quad};
use crate::scene::{CameraProvider, SceneStore};
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Snapshot of one mesh, rebuilt wholesale from the scene store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshCacheEntry {
    pub points: Vec<Point3<f64>>,
    pub edges: Vec<[usize; 2]>,
    pub faces: Vec<Quad>,
    pub vertex_faces: Vec<Vec<usize>>,
    pub movability: Vec<MovabilityState>,
}

impl MeshCacheEntry {
    pub fn from_store<S: SceneStore + ?Sized>(scene: &S, mesh: &str) -> Result<Self, StoreError> {
        let points = scene.vertex_positions(mesh)?;

        let face_count = scene.face_count(mesh)?;
        let mut faces = Vec::with_capacity(face_count);
        for face in 0..face_count {
            let quad = scene.face_vertices(mesh, face)?;
            if let Some(&index) = quad.iter().find(|&&v| v >= points.len()) {
                return Err(StoreError::VertexOutOfRange {
                    mesh: mesh.to_string(),
                    index,
                });
            }
            faces.push(quad);
        }

        let mut vertex_faces = Vec::with_capacity(points.len());
        for vertex in 0..points.len() {
            vertex_faces.push(scene.connected_faces(mesh, vertex)?);
        }

        let edges = derive_edges(&faces);
        let movability = classify_movability(&faces, &vertex_faces);

        Ok(Self {
            points,
            edges,
            faces,
            vertex_faces,
            movability,
        })
    }

    /// First face connected to `vertex`, the face every drag operates on.
    pub fn first_face_of(&self, vertex: usize) -> Option<Quad> {
        let face = *self.vertex_faces.get(vertex)?.first()?;
        self.faces.get(face).copied()
    }

    pub fn movability_of(&self, vertex: usize) -> MovabilityState {
        self.movability
            .get(vertex)
            .copied()
            .unwrap_or(MovabilityState::Unmovable)
    }

    /// Positions of `face`, or `None` if it is no longer a face of this
    /// snapshot.
    pub fn face_points(&self, face: &Quad) -> Option<[Point3<f64>; 4]> {
        if !self.faces.contains(face) {
            return None;
        }
        let [a, b, c, d] = face.map(|v| self.points.get(v).copied());
        Some([a?, b?, c?, d?])
    }
}

/// Unique edges in order of first appearance, oriented as in the first face
/// that lists them.
pub fn derive_edges(faces: &[Quad]) -> Vec<[usize; 2]> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for face in faces {
        for (a, b) in face.iter().copied().circular_tuple_windows() {
            if seen.insert((a.min(b), a.max(b))) {
                edges.push([a, b]);
            }
        }
    }
    edges
}

pub fn classify_movability(faces: &[Quad], vertex_faces: &[Vec<usize>]) -> Vec<MovabilityState> {
    vertex_faces
        .iter()
        .map(|connected| match connected.as_slice() {
            [only] => {
                let shared_neighbour = faces[*only]
                    .iter()
                    .any(|&v| vertex_faces.get(v).map_or(false, |f| f.len() > 1));
                if shared_neighbour {
                    MovabilityState::MovableInSamePlane
                } else {
                    MovabilityState::MovableRecompute
                }
            }
            // Loose vertices have no face to move in.
            _ => MovabilityState::Unmovable,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebuildReport {
    pub rebuilt: usize,
    pub stale: Vec<String>,
}

/// Per-mesh snapshots keyed by mesh path. Only explicit rebuilds mutate it.
#[derive(Debug, Clone, Default)]
pub struct MeshCache {
    entries: BTreeMap<String, MeshCacheEntry>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild_all<S: SceneStore + ?Sized>(&mut self, scene: &S) -> RebuildReport {
        let ids = scene.mesh_ids();
        self.entries.retain(|id, _| ids.contains(id));

        let mut report = RebuildReport::default();
        for id in &ids {
            match self.rebuild_one(scene, id) {
                Ok(()) => report.rebuilt += 1,
                Err(_) => report.stale.push(id.clone()),
            }
        }
        report
    }

    /// Recomputes one entry. On failure the previous entry is left in place.
    pub fn rebuild_one<S: SceneStore + ?Sized>(
        &mut self,
        scene: &S,
        mesh: &str,
    ) -> Result<(), EditError> {
        match MeshCacheEntry::from_store(scene, mesh) {
            Ok(entry) => {
                debug!(
                    "cache rebuilt for {mesh}: {} points, {} edges, {} faces",
                    entry.points.len(),
                    entry.edges.len(),
                    entry.faces.len()
                );
                self.entries.insert(mesh.to_string(), entry);
                Ok(())
            }
            Err(err) => {
                warn!("cannot rebuild cache for {mesh}: {err}");
                Err(EditError::stale(format!("mesh {mesh}: {err}")))
            }
        }
    }

    /// Whether the set of meshes or the topology of any cached mesh differs
    /// from the store.
    pub fn is_out_of_date<S: SceneStore + ?Sized>(&self, scene: &S) -> bool {
        let ids = scene.mesh_ids();
        ids.len() != self.entries.len()
            || ids.iter().any(|id| !self.entries.contains_key(id))
            || self.entries.keys().any(|id| self.is_topology_stale(scene, id))
    }

    /// Whether the store's vertex or face count no longer matches the entry.
    pub fn is_topology_stale<S: SceneStore + ?Sized>(&self, scene: &S, mesh: &str) -> bool {
        let Some(entry) = self.entries.get(mesh) else {
            return true;
        };
        let points = scene.vertex_positions(mesh).map(|p| p.len());
        let faces = scene.face_count(mesh);
        match (points, faces) {
            (Ok(p), Ok(f)) => p != entry.points.len() || f != entry.faces.len(),
            _ => true,
        }
    }

    pub fn get(&self, mesh: &str) -> Option<&MeshCacheEntry> {
        self.entries.get(mesh)
    }

    pub fn remove(&mut self, mesh: &str) -> Option<MeshCacheEntry> {
        self.entries.remove(mesh)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MeshCacheEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// View-specific state for one camera. Pan and zoom live on the cached
/// camera copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    pub camera: Camera,
}

/// Lazily populated per-camera display data, keyed by camera path.
#[derive(Debug, Clone, Default)]
pub struct DisplayCache {
    entries: BTreeMap<String, DisplayData>,
}

impl DisplayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display<P: CameraProvider + ?Sized>(
        &mut self,
        provider: &P,
        camera: &str,
    ) -> Result<&mut DisplayData, EditError> {
        let Some(fresh) = provider.camera(camera) else {
            if self.entries.remove(camera).is_some() {
                warn!("camera {camera} disappeared, dropping its display data");
            }
            return Err(EditError::stale(format!("camera {camera}")));
        };
        Ok(self
            .entries
            .entry(camera.to_string())
            .or_insert_with(|| DisplayData { camera: fresh }))
    }

    pub fn get(&self, camera: &str) -> Option<&DisplayData> {
        self.entries.get(camera)
    }

    pub fn get_mut(&mut self, camera: &str) -> Option<&mut DisplayData> {
        self.entries.get_mut(camera)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_listed_once() {
        let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
        let edges = derive_edges(&faces);
        assert_eq!(7, edges.len());
        assert_eq!([1, 2], edges[1]);
    }
}
