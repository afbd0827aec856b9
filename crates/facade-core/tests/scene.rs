use facade_core::error::StoreError;
use facade_core::model::MeshData;
use facade_core::scene::{MemoryScene, SceneStore};
use nalgebra::Point3;
use std::collections::BTreeMap;

fn unit_quad() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2, 3]],
    )
}

#[test]
fn commit_is_all_or_nothing() {
    let mut scene = MemoryScene::new().with_mesh("wall", unit_quad());
    let positions = BTreeMap::from([
        (0, Point3::new(-1.0, 0.0, 0.0)),
        (9, Point3::new(5.0, 5.0, 5.0)),
    ]);
    assert_eq!(
        Err(StoreError::VertexOutOfRange {
            mesh: "wall".to_string(),
            index: 9
        }),
        scene.commit_vertex_positions("wall", &positions)
    );
    assert_eq!(Point3::new(0.0, 0.0, 0.0), scene.mesh("wall").unwrap().points[0]);

    let nan = BTreeMap::from([(1, Point3::new(f64::NAN, 0.0, 0.0))]);
    assert!(scene.commit_vertex_positions("wall", &nan).is_err());
    assert_eq!(
        Err(StoreError::MissingMesh("roof".to_string())),
        scene.commit_vertex_positions("roof", &BTreeMap::new())
    );
}

#[test]
fn added_face_merges_shared_vertices() {
    let mut scene = MemoryScene::new().with_mesh("wall", unit_quad());
    let added = scene
        .add_face(
            "wall",
            &[
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        )
        .unwrap();
    assert_eq!(1, added.face);
    assert_eq!([1, 4, 5, 2], added.vertices);
    assert_eq!(vec![4, 5], added.new_vertices);
    assert_eq!(vec![0, 1], scene.connected_faces("wall", 1).unwrap());

    scene.remove_face("wall", &added).unwrap();
    assert_eq!(unit_quad(), *scene.mesh("wall").unwrap());
}

#[test]
fn add_face_creates_missing_mesh_and_undo_removes_it() {
    let mut scene = MemoryScene::new();
    let added = scene
        .add_face(
            "facadeMesh",
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
        .unwrap();
    assert!(added.created_mesh);
    assert_eq!(vec!["facadeMesh".to_string()], scene.mesh_ids());

    scene.remove_face("facadeMesh", &added).unwrap();
    assert!(scene.mesh_ids().is_empty());
}

#[test]
fn collapsed_face_is_rejected_without_side_effects() {
    let mut scene = MemoryScene::new().with_mesh("wall", unit_quad());
    let result = scene.add_face(
        "wall",
        &[
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 1.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
        ],
    );
    assert!(matches!(result, Err(StoreError::Rejected(_))));
    assert_eq!(unit_quad(), *scene.mesh("wall").unwrap());
}

#[test]
fn only_the_latest_face_can_be_removed() {
    let mut scene = MemoryScene::new().with_mesh("wall", unit_quad());
    let first = scene
        .add_face(
            "wall",
            &[
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        )
        .unwrap();
    scene
        .add_face(
            "wall",
            &[
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(3.0, 0.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
        )
        .unwrap();
    assert!(scene.remove_face("wall", &first).is_err());
    assert_eq!(3, scene.face_count("wall").unwrap());
}
