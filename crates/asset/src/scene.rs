//! Scene assembly: join parsed geometry with resolved materials and derive
//! camera framing from the overall extents.

use std::collections::HashSet;

use corelib::{
    bounds::Aabb,
    framing::{CameraFraming, FramingPolicy},
};

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, LogSink},
    mesh::{GeometryGroup, ParsedScene, VertexAttributeStreams},
    mtl::{Material, MaterialLibrary},
};

/// One draw call worth of data for the render loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPart {
    /// Material name requested by the geometry group.
    pub material_name: String,
    pub material: Material,
    /// `false` when `material` is the default substitute.
    pub resolved: bool,
    pub streams: VertexAttributeStreams,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssembledScene {
    pub parts: Vec<RenderPart>,
    /// `None` for an empty mesh.
    pub extents: Option<Aabb>,
    pub framing: Option<CameraFraming>,
}

impl AssembledScene {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.streams.vertex_count()).sum()
    }
}

/// Union of the extents of every group, in one pass over all vertices.
pub fn scene_extents(geometries: &[GeometryGroup]) -> Option<Aabb> {
    geometries
        .iter()
        .filter_map(|g| Aabb::from_positions(&g.data.position))
        .reduce(Aabb::union)
}

/// Assemble render parts, reporting unresolved materials through `log`.
pub fn assemble_scene(
    scene: ParsedScene,
    materials: &MaterialLibrary,
    policy: &FramingPolicy,
) -> AssembledScene {
    assemble_scene_with(scene, materials, policy, &mut LogSink)
}

/// Assemble render parts. A material missing from `materials` is replaced by
/// [`Material::default`] and reported once per name to `sink`.
pub fn assemble_scene_with(
    scene: ParsedScene,
    materials: &MaterialLibrary,
    policy: &FramingPolicy,
    sink: &mut dyn DiagnosticSink,
) -> AssembledScene {
    let extents = scene_extents(&scene.geometries);
    let framing = extents.map(|aabb| CameraFraming::from_extents(&aabb, policy));

    let mut reported: HashSet<String> = HashSet::new();
    let parts = scene
        .geometries
        .into_iter()
        .map(|group| {
            let (material, resolved) = match materials.get(&group.material) {
                Some(m) => (m.clone(), true),
                None => {
                    if reported.insert(group.material.clone()) {
                        sink.report(Diagnostic::UnresolvedMaterial {
                            name: group.material.clone(),
                        });
                    }
                    (Material::default(), false)
                }
            };
            RenderPart {
                material_name: group.material,
                material,
                resolved,
                streams: group.data,
            }
        })
        .collect::<Vec<_>>();

    if let Some(f) = &framing {
        log::debug!(
            "Assembled {} part(s): bounding radius {:.4}, offset {:?}, near {:.4}, far {:.4}",
            parts.len(),
            f.bounding_radius,
            f.object_offset,
            f.z_near,
            f.z_far
        );
    }

    AssembledScene {
        parts,
        extents,
        framing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use corelib::vec3;

    fn group(material: &str, position: Vec<f32>) -> GeometryGroup {
        GeometryGroup {
            material: material.to_string(),
            object: None,
            group: None,
            data: VertexAttributeStreams {
                position,
                ..Default::default()
            },
        }
    }

    #[test]
    fn extents_union_of_disjoint_groups() {
        let groups = vec![
            group("a", vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 0.5, 0.5]),
            group("b", vec![4.0, -2.0, 3.0, 5.0, -1.0, 6.0, 4.5, -1.5, 4.0]),
        ];
        let aabb = scene_extents(&groups).expect("extents");
        assert_eq!(aabb.min, vec3(0.0, -2.0, 0.0));
        assert_eq!(aabb.max, vec3(5.0, 1.0, 6.0));
    }

    #[test]
    fn unresolved_material_uses_default_once() {
        let scene = ParsedScene {
            geometries: vec![
                group("missing", vec![0.0; 9]),
                group("known", vec![1.0; 9]),
                group("missing", vec![2.0; 9]),
            ],
            material_libs: vec![],
        };
        let mut lib = MaterialLibrary::new();
        lib.insert(Material {
            diffuse: [0.1, 0.2, 0.3],
            ..Material::named("known")
        });

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let assembled = assemble_scene_with(scene, &lib, &FramingPolicy::default(), &mut diagnostics);
        assert_eq!(assembled.parts.len(), 3);
        assert!(!assembled.parts[0].resolved);
        assert_eq!(assembled.parts[0].material, Material::default());
        assert_eq!(assembled.parts[0].material_name, "missing");
        assert!(assembled.parts[1].resolved);
        assert_eq!(assembled.parts[1].material.diffuse, [0.1, 0.2, 0.3]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnresolvedMaterial {
                name: "missing".to_string()
            }]
        );
    }

    #[test]
    fn empty_scene_has_no_framing() {
        let assembled = assemble_scene(
            ParsedScene::default(),
            &MaterialLibrary::new(),
            &FramingPolicy::default(),
        );
        assert!(assembled.is_empty());
        assert!(assembled.extents.is_none());
        assert!(assembled.framing.is_none());
    }

    #[test]
    fn framing_follows_extents() {
        let scene = ParsedScene {
            geometries: vec![group("m", vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 2.0, 1.0])],
            material_libs: vec![],
        };
        let assembled = assemble_scene_with(
            scene,
            &MaterialLibrary::new(),
            &FramingPolicy::default(),
            &mut NullSink,
        );
        let framing = assembled.framing.expect("framing");
        assert_eq!(framing.object_offset, vec3(-1.0, -1.0, -0.5));
        assert!((framing.bounding_radius - 3.0).abs() < 1e-6);
        assert_eq!(assembled.vertex_count(), 3);
    }
}
