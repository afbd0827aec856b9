pub mod cache;
pub mod camera;
pub mod error;
pub mod geom;
pub mod intersection;
pub mod model;
pub mod projection;
pub mod report;
pub mod scene;

pub use cache::{DisplayCache, DisplayData, MeshCache, MeshCacheEntry, RebuildReport};
pub use camera::{Camera, CameraPoint, Viewport};
pub use error::{EditError, GeometryError, StoreError};
pub use geom::Plane;
pub use intersection::{EdgeHit, Intersection, IntersectionKind, PickConfig, PointHit};
pub use model::{MeshData, MovabilityState, PointCloud, Quad};
pub use scene::{AddedFace, CameraProvider, MemoryScene, Scene, SceneStore};
