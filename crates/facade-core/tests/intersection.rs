use facade_core::cache::MeshCache;
use facade_core::camera::{Camera, Viewport};
use facade_core::intersection::{intersect, Intersection, IntersectionKind, PickConfig};
use facade_core::model::MeshData;
use facade_core::scene::MemoryScene;
use nalgebra::{Point2, Point3, Vector2, Vector3};

const VIEWPORT: Viewport = Viewport::new(640.0, 480.0);

fn square() -> MeshData {
    MeshData::new(
        vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2, 3]],
    )
}

fn front() -> Camera {
    Camera::looking_at("front", Point3::new(0.0, 0.0, 10.0), Point3::origin())
}

fn cached(scene: &MemoryScene) -> MeshCache {
    let mut cache = MeshCache::new();
    cache.rebuild_all(scene);
    cache
}

fn screen(camera: &Camera, p: Point3<f64>) -> Point2<f64> {
    camera.world_to_view(&p, &VIEWPORT).unwrap()
}

#[test]
fn hovering_a_vertex_reports_it_with_its_face() {
    let scene = MemoryScene::new().with_mesh("wall", square());
    let cache = cached(&scene);
    let camera = front();
    let cursor = screen(&camera, Point3::new(-1.0, -1.0, 0.0)) + Vector2::new(2.0, 1.0);

    let hit = intersect(&cache, &camera, &VIEWPORT, &cursor, &PickConfig::default());
    assert_eq!(IntersectionKind::Point, hit.kind());
    let Intersection::Point(point) = hit else {
        panic!("expected a point hit");
    };
    assert_eq!("wall", point.mesh);
    assert_eq!(0, point.index);
    assert_eq!(Some([0, 1, 2, 3]), point.face);
}

#[test]
fn hovering_an_edge_reports_ratio_and_heights() {
    let scene = MemoryScene::new().with_mesh("wall", square());
    let cache = cached(&scene);
    let camera = front();
    let mid = screen(&camera, Point3::new(0.0, -1.0, 0.0));
    let cursor = mid - Vector2::new(0.0, 3.0);

    let hit = intersect(&cache, &camera, &VIEWPORT, &cursor, &PickConfig::default());
    let Intersection::Edge(edge) = hit else {
        panic!("expected an edge hit");
    };
    assert_eq!([0, 1], edge.indices);
    assert_eq!(Some([0, 1, 2, 3]), edge.face);
    assert!((edge.ratio - 0.5).abs() < 1e-9);
    assert!((edge.distance - 3.0).abs() < 1e-9);
    assert!((edge.height_2d - Vector2::new(-0.2, 0.0)).norm() < 1e-12);
    assert_eq!(Vector3::new(-2.0, 0.0, 0.0), edge.height_3d);
}

#[test]
fn far_cursor_misses() {
    let scene = MemoryScene::new().with_mesh("wall", square());
    let cache = cached(&scene);
    let hit = intersect(&cache, &front(), &VIEWPORT, &VIEWPORT.center(), &PickConfig::default());
    assert!(hit.is_none());

    let wide = PickConfig {
        point_radius: 10.0,
        edge_tolerance: 100.0,
    };
    let hit = intersect(&cache, &front(), &VIEWPORT, &VIEWPORT.center(), &wide);
    assert_eq!(IntersectionKind::Edge, hit.kind());
}

#[test]
fn coincident_vertices_resolve_to_first_mesh() {
    let scene = MemoryScene::new().with_mesh("b", square()).with_mesh("a", square());
    let cache = cached(&scene);
    let camera = front();
    let cursor = screen(&camera, Point3::new(1.0, 1.0, 0.0));

    let first = intersect(&cache, &camera, &VIEWPORT, &cursor, &PickConfig::default());
    let second = intersect(&cache, &camera, &VIEWPORT, &cursor, &PickConfig::default());
    assert_eq!(first, second);
    assert_eq!(Some("a"), first.mesh());
    let Intersection::Point(point) = first else {
        panic!("expected a point hit");
    };
    assert_eq!(2, point.index);
}

#[test]
fn points_behind_camera_are_skipped() {
    let mut mesh = square();
    for p in &mut mesh.points {
        p.z = 20.0;
    }
    let scene = MemoryScene::new().with_mesh("wall", mesh);
    let cache = cached(&scene);
    let camera = front();
    for cursor in [VIEWPORT.center(), Point2::new(0.0, 0.0), Point2::new(320.0, 177.0)] {
        assert!(intersect(&cache, &camera, &VIEWPORT, &cursor, &PickConfig::default()).is_none());
    }
}
