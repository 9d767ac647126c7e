//! Asset parsers and scene assembly.
//! OBJ geometry -> per-material flat vertex streams, MTL -> material library,
//! then both joined into render-ready parts with camera framing.

pub mod diagnostics;
pub mod error;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod scene;

pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, NullSink};
pub use error::{AssetError, AssetResult, FaceIssue};
pub use mesh::{Attribute, GeometryGroup, IndexedMesh, ParsedScene, VertexAttributeStreams};
pub use mtl::{Material, MaterialLibrary, join_libraries, parse_materials, parse_materials_with};
pub use obj::{parse_geometry, parse_geometry_with};
pub use scene::{AssembledScene, RenderPart, assemble_scene, assemble_scene_with};
