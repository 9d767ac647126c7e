//! MTL material library parser.

use std::collections::{HashMap, hash_map};

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, LogSink},
    error::{AssetError, AssetResult, parse_f32},
};

/// Phong-style material record. Texture maps are kept as file references
/// and never loaded here.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    pub opacity: f32,
    pub optical_density: Option<f32>,
    pub illum: Option<u32>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub normal_map: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse: [1.0, 1.0, 1.0],
            ambient: [0.0, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            shininess: 400.0,
            opacity: 1.0,
            optical_density: None,
            illum: None,
            diffuse_map: None,
            specular_map: None,
            normal_map: None,
        }
    }
}

impl Material {
    /// Default material carrying `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Materials by name. Inserting an existing name replaces it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn insert(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.name.clone(), material)
    }

    /// Add every material of `other`, replacing same-named entries.
    pub fn merge(&mut self, other: MaterialLibrary) {
        self.materials.extend(other.materials);
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> hash_map::Values<'_, String, Material> {
        self.materials.values()
    }
}

/// Join several library texts so one parse sees all of them, in order.
pub fn join_libraries<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parse MTL text, reporting non-fatal findings through `log`.
pub fn parse_materials(text: &str) -> AssetResult<MaterialLibrary> {
    parse_materials_with(text, &mut LogSink)
}

/// Parse MTL text, reporting non-fatal findings to `sink`.
pub fn parse_materials_with(text: &str, sink: &mut dyn DiagnosticSink) -> AssetResult<MaterialLibrary> {
    let mut library = MaterialLibrary::new();
    let mut current: Option<Material> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let rest = trimmed[keyword.len()..].trim();

        if keyword == "newmtl" {
            if rest.is_empty() {
                return Err(AssetError::MissingMaterialName { line: line_no });
            }
            if let Some(done) = current.replace(Material::named(rest)) {
                library.insert(done);
            }
            continue;
        }

        let Some(material) = current.as_mut() else {
            sink.report(Diagnostic::OrphanDirective {
                line: line_no,
                keyword: keyword.to_string(),
            });
            continue;
        };

        match keyword {
            "Kd" => material.diffuse = parse_rgb(parts, line_no, "diffuse color")?,
            "Ka" => material.ambient = parse_rgb(parts, line_no, "ambient color")?,
            "Ks" => material.specular = parse_rgb(parts, line_no, "specular color")?,
            "Ke" => material.emissive = parse_rgb(parts, line_no, "emissive color")?,
            "Ns" => material.shininess = parse_f32(parts.next(), line_no, "shininess")?,
            "d" => material.opacity = parse_f32(parts.next(), line_no, "opacity")?,
            "Tr" => material.opacity = 1.0 - parse_f32(parts.next(), line_no, "transparency")?,
            "Ni" => {
                material.optical_density = Some(parse_f32(parts.next(), line_no, "optical density")?)
            }
            "illum" => {
                let token = parts.next().ok_or(AssetError::MissingValue {
                    line: line_no,
                    what: "illumination model",
                })?;
                let model = token.parse::<u32>().map_err(|_| AssetError::InvalidNumber {
                    line: line_no,
                    what: "illumination model",
                    token: token.to_string(),
                })?;
                material.illum = Some(model);
            }
            "map_Kd" | "map_Ks" | "map_Bump" | "map_bump" | "bump" | "norm" => {
                let Some(file) = map_file(rest) else {
                    sink.report(Diagnostic::MissingArgument {
                        line: line_no,
                        keyword: keyword.to_string(),
                    });
                    continue;
                };
                let slot = match keyword {
                    "map_Kd" => &mut material.diffuse_map,
                    "map_Ks" => &mut material.specular_map,
                    _ => &mut material.normal_map,
                };
                *slot = Some(file);
            }
            other => sink.report(Diagnostic::UnknownDirective {
                line: line_no,
                keyword: other.to_string(),
            }),
        }
    }

    if let Some(done) = current {
        library.insert(done);
    }

    log::debug!("Parsed MTL: {} material(s)", library.len());
    Ok(library)
}

/// Color triple; a single value means a gray `r = g = b`.
fn parse_rgb<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &'static str,
) -> AssetResult<[f32; 3]> {
    let r = parse_f32(parts.next(), line_no, what)?;
    match parts.next() {
        None => Ok([r, r, r]),
        Some(g) => {
            let g = parse_f32(Some(g), line_no, what)?;
            let b = parse_f32(parts.next(), line_no, what)?;
            Ok([r, g, b])
        }
    }
}

/// File name of a texture map directive. Option flags such as
/// `-bm 1 normal.png` precede the file, which is then the last token.
fn map_file(args: &str) -> Option<String> {
    if args.is_empty() {
        None
    } else if args.starts_with('-') {
        args.split_whitespace().last().map(str::to_string)
    } else {
        Some(args.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (MaterialLibrary, Vec<Diagnostic>) {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let lib = parse_materials_with(src, &mut diagnostics).expect("parse");
        (lib, diagnostics)
    }

    #[test]
    fn diffuse_and_opacity_over_defaults() {
        let (lib, diagnostics) = parse("newmtl M\nKd 0.2 0.3 0.4\nd 0.5\n");
        assert!(diagnostics.is_empty());
        assert_eq!(lib.len(), 1);
        assert_eq!(
            lib.get("M"),
            Some(&Material {
                diffuse: [0.2, 0.3, 0.4],
                opacity: 0.5,
                ..Material::named("M")
            })
        );
    }

    #[test]
    fn documented_defaults() {
        let m = Material::default();
        assert_eq!(m.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(m.ambient, [0.0, 0.0, 0.0]);
        assert_eq!(m.specular, [1.0, 1.0, 1.0]);
        assert_eq!(m.emissive, [0.0, 0.0, 0.0]);
        assert_eq!(m.shininess, 400.0);
        assert_eq!(m.opacity, 1.0);
    }

    #[test]
    fn full_material() {
        let src = "\
# Blender MTL File
newmtl bin_metal
Ns 250.000000
Ka 1.000000 1.000000 1.000000
Kd 0.800000 0.100000 0.050000
Ks 0.5
Ke 0.0 0.0 0.1
Ni 1.450000
Tr 0.25
illum 2
map_Kd textures/bin diffuse.png
map_Ks spec.png
map_Bump -bm 0.5 normal.png
";
        let (lib, diagnostics) = parse(src);
        assert!(diagnostics.is_empty());
        let m = lib.get("bin_metal").expect("material");
        assert_eq!(m.shininess, 250.0);
        assert_eq!(m.ambient, [1.0, 1.0, 1.0]);
        assert_eq!(m.diffuse, [0.8, 0.1, 0.05]);
        assert_eq!(m.specular, [0.5, 0.5, 0.5]);
        assert_eq!(m.emissive, [0.0, 0.0, 0.1]);
        assert_eq!(m.optical_density, Some(1.45));
        assert!((m.opacity - 0.75).abs() < 1e-6);
        assert_eq!(m.illum, Some(2));
        assert_eq!(m.diffuse_map.as_deref(), Some("textures/bin diffuse.png"));
        assert_eq!(m.specular_map.as_deref(), Some("spec.png"));
        assert_eq!(m.normal_map.as_deref(), Some("normal.png"));
    }

    #[test]
    fn normal_map_aliases() {
        let src = "newmtl a\nnorm a_normal.png\nnewmtl b\nbump -bm 2.0 b_bump.png\nnewmtl c\nmap_bump c.png\nnewmtl d\nbump\n";
        let (lib, diagnostics) = parse(src);
        assert_eq!(lib.get("a").unwrap().normal_map.as_deref(), Some("a_normal.png"));
        assert_eq!(lib.get("b").unwrap().normal_map.as_deref(), Some("b_bump.png"));
        assert_eq!(lib.get("c").unwrap().normal_map.as_deref(), Some("c.png"));
        assert_eq!(lib.get("d").unwrap().normal_map, None);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingArgument {
                line: 8,
                keyword: "bump".to_string()
            }]
        );
    }

    #[test]
    fn later_definition_wins_across_joined_libraries() {
        let a = "newmtl shared\nKd 1 0 0\nnewmtl only_a\n";
        let b = "newmtl shared\nKd 0 0 1\n";
        let (lib, _) = parse(&join_libraries(&[a, b]));
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("shared").unwrap().diffuse, [0.0, 0.0, 1.0]);
        assert!(lib.get("only_a").is_some());
    }

    #[test]
    fn unknown_and_orphan_directives_are_reported() {
        let (lib, diagnostics) = parse("Kd 1 1 1\nnewmtl M\nPr 0.5\n");
        assert_eq!(lib.get("M"), Some(&Material::named("M")));
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::OrphanDirective {
                    line: 1,
                    keyword: "Kd".to_string()
                },
                Diagnostic::UnknownDirective {
                    line: 3,
                    keyword: "Pr".to_string()
                },
            ]
        );
    }

    #[test]
    fn invalid_values_are_fatal() {
        assert!(matches!(
            parse_materials("newmtl M\nNs shiny\n"),
            Err(AssetError::InvalidNumber { line: 2, .. })
        ));
        assert!(matches!(
            parse_materials("newmtl M\nKd 1 1\n"),
            Err(AssetError::MissingValue { line: 2, .. })
        ));
        assert_eq!(
            parse_materials("newmtl\n"),
            Err(AssetError::MissingMaterialName { line: 1 })
        );
    }

    #[test]
    fn merge_replaces_same_names() {
        let mut lib = parse_materials("newmtl a\nNs 10\n").unwrap();
        lib.merge(parse_materials("newmtl a\nNs 20\nnewmtl b\n").unwrap());
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("a").unwrap().shininess, 20.0);
        assert_eq!(lib.iter().count(), 2);
    }
}
