/// Scene construction
///
/// This module turns the metadata store into something a viewer can draw:
/// - Projecting (ra, dec) onto the unit sphere (projector.rs)
/// - The perspective camera and its orbit/zoom controls (camera.rs)
/// - Loading records and decoding their artifacts into sprites (assembler.rs)

pub mod assembler;
pub mod camera;
pub mod projector;

pub use assembler::{assemble, Scene, SceneObject, SkippedRecord};
pub use camera::CameraSpec;
pub use projector::project;
