use facade_core::cache::{DisplayCache, MeshCache};
use facade_core::camera::Camera;
use facade_core::model::{MeshData, MovabilityState};
use facade_core::report::summarize;
use facade_core::scene::{MemoryScene, SceneStore};
use nalgebra::Point3;
use std::collections::BTreeMap;

/// Two quads sharing the edge 1-2.
fn strip() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(-2.0, -1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(2.0, -1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2, 3], [1, 4, 5, 2]],
    )
}

fn single() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ],
        vec![[0, 1, 2, 3]],
    )
}

#[test]
fn movability_follows_face_sharing() {
    let scene = MemoryScene::new().with_mesh("strip", strip()).with_mesh("single", single());
    let mut cache = MeshCache::new();
    let report = cache.rebuild_all(&scene);
    assert_eq!(2, report.rebuilt);
    assert!(report.stale.is_empty());

    let strip = cache.get("strip").unwrap();
    assert_eq!(strip.points.len(), strip.movability.len());
    assert_eq!(MovabilityState::Unmovable, strip.movability[1]);
    assert_eq!(MovabilityState::Unmovable, strip.movability[2]);
    for v in [0, 3, 4, 5] {
        assert_eq!(MovabilityState::MovableInSamePlane, strip.movability[v]);
    }
    assert_eq!(7, strip.edges.len());

    let single = cache.get("single").unwrap();
    for v in 0..4 {
        assert_eq!(MovabilityState::MovableRecompute, single.movability[v]);
    }
    // Loose vertex: no face to move in.
    assert_eq!(MovabilityState::Unmovable, single.movability[4]);
    assert_eq!(None, single.first_face_of(4));
}

#[test]
fn rebuild_is_idempotent() {
    let scene = MemoryScene::new().with_mesh("strip", strip());
    let mut cache = MeshCache::new();
    cache.rebuild_one(&scene, "strip").unwrap();
    let first = cache.get("strip").cloned().unwrap();
    cache.rebuild_one(&scene, "strip").unwrap();
    assert_eq!(Some(&first), cache.get("strip"));
}

#[test]
fn rebuild_tracks_committed_positions() {
    let mut scene = MemoryScene::new().with_mesh("single", single());
    let mut cache = MeshCache::new();
    cache.rebuild_all(&scene);

    let target = Point3::new(-1.5, -1.5, 0.0);
    scene
        .commit_vertex_positions("single", &BTreeMap::from([(0, target)]))
        .unwrap();
    assert_eq!(Point3::new(-1.0, -1.0, 0.0), cache.get("single").unwrap().points[0]);
    cache.rebuild_one(&scene, "single").unwrap();
    assert_eq!(target, cache.get("single").unwrap().points[0]);
}

#[test]
fn failed_rebuild_keeps_previous_entry() {
    let mut scene = MemoryScene::new().with_mesh("single", single());
    let mut cache = MeshCache::new();
    cache.rebuild_all(&scene);

    scene.remove_mesh("single");
    assert!(cache.rebuild_one(&scene, "single").is_err());
    assert_eq!(5, cache.get("single").unwrap().points.len());

    // A full rebuild drops meshes the scene no longer lists.
    let report = cache.rebuild_all(&scene);
    assert_eq!(0, report.rebuilt);
    assert!(cache.is_empty());
}

#[test]
fn topology_change_is_detected() {
    let mut scene = MemoryScene::new().with_mesh("single", single());
    let mut cache = MeshCache::new();
    cache.rebuild_all(&scene);
    assert!(!cache.is_topology_stale(&scene, "single"));

    scene
        .add_face(
            "single",
            &[
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(3.0, -1.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        )
        .unwrap();
    assert!(cache.is_topology_stale(&scene, "single"));
}

#[test]
fn display_data_is_created_lazily_and_dropped_with_camera() {
    let mut scene = MemoryScene::new().with_camera(Camera::looking_at(
        "front",
        Point3::new(0.0, 0.0, 10.0),
        Point3::origin(),
    ));
    let mut displays = DisplayCache::new();
    assert!(displays.is_empty());

    displays.display(&scene, "front").unwrap().camera.zoom = 0.5;
    assert_eq!(0.5, displays.display(&scene, "front").unwrap().camera.zoom);
    assert!(displays.display(&scene, "side").is_err());
    assert_eq!(1, displays.len());

    scene.cameras.clear();
    assert!(displays.display(&scene, "front").is_err());
    assert!(displays.is_empty());
}

#[test]
fn summary_flags_loose_vertices() {
    let scene = MemoryScene::new().with_mesh("single", single());
    let mut cache = MeshCache::new();
    let report = cache.rebuild_all(&scene);
    let summary = summarize(&cache, &report);
    assert_eq!(1, summary.meshes.len());
    assert_eq!(1, summary.meshes[0].loose_vertices);
    assert_eq!(4, summary.meshes[0].movability.movable_recompute);
    assert!(summary.warnings.iter().any(|w| w.code == "loose_vertices"));
}

#[test]
fn new_and_removed_meshes_make_the_cache_out_of_date() {
    let mut scene = MemoryScene::new().with_mesh("single", single());
    let mut cache = MeshCache::new();
    cache.rebuild_all(&scene);
    assert!(!cache.is_out_of_date(&scene));

    scene.meshes.insert("annex".to_string(), strip());
    assert!(cache.is_out_of_date(&scene));
    cache.rebuild_all(&scene);
    assert!(!cache.is_out_of_date(&scene));

    scene.remove_mesh("single");
    assert!(cache.is_out_of_date(&scene));
}

#[test]
fn face_points_reject_faces_missing_from_the_snapshot() {
    let scene = MemoryScene::new().with_mesh("strip", strip());
    let mut cache = MeshCache::new();
    cache.rebuild_all(&scene);
    let entry = cache.get("strip").unwrap();

    let points = entry.face_points(&[1, 4, 5, 2]).unwrap();
    assert_eq!(Point3::new(2.0, -1.0, 0.0), points[1]);
    assert_eq!(None, entry.face_points(&[4, 5, 6, 7]));
    assert_eq!(None, entry.face_points(&[0, 1, 2, 4]));
}
