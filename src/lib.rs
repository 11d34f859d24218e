pub mod geom;
mod id;
pub mod io;
pub mod scene;
pub mod sim;

// Prelude
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use id::{ElementId, IdAllocator};
pub use scene::{Scene, SceneSettings, SceneSnapshot};
pub use sim::element::{Category, Intersection, OpticalElement, RayInteraction};
pub use sim::elements::ElementRecord;
pub use sim::elements::blockers::{Aperture, BandpassFilter, CircleBlocker, LineBlocker};
pub use sim::elements::glass::{
    CircleGlass, HalfPlaneGlass, IdealLens, PolygonGlass, SphericalLens,
};
pub use sim::elements::mirrors::{
    ArcMirror, BeamSplitter, IdealMirror, ParabolicMirror, SegmentMirror,
};
pub use sim::elements::sources::{Beam, PointSource, SingleRaySource};
pub use sim::engine::RaySimulation;
pub use sim::engine::config::{EngineConfig, Observer, ViewMode};
pub use sim::engine::result::{DetectedImage, ImageType, TraceResult, TracedSegment};
pub use sim::ray::SimulationRay;
