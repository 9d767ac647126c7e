//! OBJ geometry parser producing per-material flat vertex streams.
//!
//! The parser is an explicit state object folded over the input lines:
//! global pools (`v`, `vn`, `vt`) grow across the whole file while faces are
//! flattened into the group that is current when they appear.

use std::mem;

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink, LogSink},
    error::{AssetError, AssetResult, FaceIssue, parse_f32},
    mesh::{Attribute, GeometryGroup, ParsedScene, VertexAttributeStreams},
};

/// Material of faces that appear before any `usemtl`.
pub const DEFAULT_MATERIAL: &str = "default";

const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_TEXCOORD: [f32; 2] = [0.0, 0.0];

/// Parse OBJ text, reporting non-fatal findings through `log`.
pub fn parse_geometry(text: &str) -> AssetResult<ParsedScene> {
    parse_geometry_with(text, &mut LogSink)
}

/// Parse OBJ text, reporting non-fatal findings to `sink`.
pub fn parse_geometry_with(text: &str, sink: &mut dyn DiagnosticSink) -> AssetResult<ParsedScene> {
    let mut parser = ObjParser::default();
    for (line_no, line) in text.lines().enumerate() {
        parser.step(line_no + 1, line, sink)?;
    }
    let scene = parser.finish(sink);
    log::debug!(
        "Parsed OBJ: {} group(s), {} vertices, {} material lib(s)",
        scene.geometries.len(),
        scene.vertex_count(),
        scene.material_libs.len()
    );
    Ok(scene)
}

/// Global attribute pools. `colors` runs parallel to `positions`.
#[derive(Default)]
struct Pools {
    positions: Vec<[f32; 3]>,
    colors: Vec<Option<[f32; 3]>>,
    normals: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Corner {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

/// Group currently receiving triangles.
struct GroupBuilder {
    material: String,
    object: Option<String>,
    group: Option<String>,
    position: Vec<f32>,
    normal: Option<Vec<f32>>,
    texcoord: Option<Vec<f32>>,
    color: Vec<f32>,
    colored: usize,
    normal_synthesized: bool,
    texcoord_synthesized: bool,
}

impl GroupBuilder {
    fn new(material: String, object: Option<String>, group: Option<String>) -> Self {
        Self {
            material,
            object,
            group,
            position: Vec::new(),
            normal: None,
            texcoord: None,
            color: Vec::new(),
            colored: 0,
            normal_synthesized: false,
            texcoord_synthesized: false,
        }
    }

    fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    fn push_vertex(&mut self, corner: Corner, pools: &Pools, sink: &mut dyn DiagnosticSink) {
        let existing = self.vertex_count();
        self.position.extend_from_slice(&pools.positions[corner.position]);

        let normal = corner.normal.map(|i| pools.normals[i]);
        if push_attribute(&mut self.normal, normal, existing, DEFAULT_NORMAL)
            && !mem::replace(&mut self.normal_synthesized, true)
        {
            sink.report(Diagnostic::SynthesizedAttribute {
                material: self.material.clone(),
                attribute: Attribute::Normal,
            });
        }

        let texcoord = corner.texcoord.map(|i| pools.texcoords[i]);
        if push_attribute(&mut self.texcoord, texcoord, existing, DEFAULT_TEXCOORD)
            && !mem::replace(&mut self.texcoord_synthesized, true)
        {
            sink.report(Diagnostic::SynthesizedAttribute {
                material: self.material.clone(),
                attribute: Attribute::Texcoord,
            });
        }

        if let Some(color) = pools.colors[corner.position] {
            self.color.extend_from_slice(&color);
            self.colored += 1;
        }
    }

    fn finish(self, sink: &mut dyn DiagnosticSink) -> GeometryGroup {
        let vertices = self.vertex_count();
        let color = match self.colored {
            0 => None,
            n if n == vertices => Some(self.color),
            colored => {
                sink.report(Diagnostic::ColorStreamDropped {
                    material: self.material.clone(),
                    colored,
                    vertices,
                });
                None
            }
        };

        GeometryGroup {
            material: self.material,
            object: self.object,
            group: self.group,
            data: VertexAttributeStreams {
                position: self.position,
                normal: self.normal,
                texcoord: self.texcoord,
                color,
            },
        }
    }
}

/// Append one vertex worth of an optional attribute, keeping the stream the
/// same length as the positions. Returns `true` if a default was filled in.
fn push_attribute<const N: usize>(
    stream: &mut Option<Vec<f32>>,
    value: Option<[f32; N]>,
    existing: usize,
    fallback: [f32; N],
) -> bool {
    if let Some(s) = stream.as_mut() {
        s.extend_from_slice(&value.unwrap_or(fallback));
        return value.is_none();
    }
    match value {
        Some(v) => {
            let mut s = fallback.repeat(existing);
            s.extend_from_slice(&v);
            *stream = Some(s);
            existing > 0
        }
        None => false,
    }
}

struct ObjParser {
    pools: Pools,
    current: GroupBuilder,
    groups: Vec<GeometryGroup>,
    material_libs: Vec<String>,
}

impl Default for ObjParser {
    fn default() -> Self {
        Self {
            pools: Pools::default(),
            current: GroupBuilder::new(DEFAULT_MATERIAL.to_string(), None, None),
            groups: Vec::new(),
            material_libs: Vec::new(),
        }
    }
}

impl ObjParser {
    fn step(&mut self, line_no: usize, line: &str, sink: &mut dyn DiagnosticSink) -> AssetResult<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let mut parts = trimmed.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Ok(());
        };
        let rest = trimmed[keyword.len()..].trim();

        match keyword {
            "v" => {
                let fields: Vec<&str> = parts.collect();
                let x = parse_f32(fields.first().copied(), line_no, "x coordinate")?;
                let y = parse_f32(fields.get(1).copied(), line_no, "y coordinate")?;
                let z = parse_f32(fields.get(2).copied(), line_no, "z coordinate")?;
                let color = if fields.len() == 6 {
                    Some([
                        parse_f32(Some(fields[3]), line_no, "red component")?,
                        parse_f32(Some(fields[4]), line_no, "green component")?,
                        parse_f32(Some(fields[5]), line_no, "blue component")?,
                    ])
                } else {
                    None
                };
                self.pools.positions.push([x, y, z]);
                self.pools.colors.push(color);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                self.pools.normals.push([nx, ny, nz]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = match parts.next() {
                    Some(token) => parse_f32(Some(token), line_no, "v coordinate")?,
                    None => 0.0,
                };
                self.pools.texcoords.push([u, v]);
            }
            "f" => self.face(line_no, parts, sink)?,
            "usemtl" => {
                if rest.is_empty() {
                    sink.report(Diagnostic::MissingArgument {
                        line: line_no,
                        keyword: keyword.to_string(),
                    });
                } else {
                    let object = self.current.object.clone();
                    let group = self.current.group.clone();
                    self.switch_group(rest.to_string(), object, group, sink);
                }
            }
            "o" => {
                // A new object starts outside of any group.
                let object = (!rest.is_empty()).then(|| rest.to_string());
                let material = self.current.material.clone();
                self.switch_group(material, object, None, sink);
            }
            "g" => {
                let group = (!rest.is_empty()).then(|| rest.to_string());
                let material = self.current.material.clone();
                let object = self.current.object.clone();
                self.switch_group(material, object, group, sink);
            }
            "mtllib" => {
                for lib in parts {
                    if !self.material_libs.iter().any(|known| known == lib) {
                        self.material_libs.push(lib.to_string());
                    }
                }
            }
            "s" => {}
            other => sink.report(Diagnostic::UnknownDirective {
                line: line_no,
                keyword: other.to_string(),
            }),
        }

        Ok(())
    }

    fn face<'a>(
        &mut self,
        line_no: usize,
        tokens: impl Iterator<Item = &'a str>,
        sink: &mut dyn DiagnosticSink,
    ) -> AssetResult<()> {
        // Resolve every corner before emitting anything so a bad face leaves
        // no partial triangles behind.
        let corners = tokens
            .map(|token| resolve_corner(token, &self.pools, line_no))
            .collect::<AssetResult<Vec<_>>>()?;

        if corners.len() < 3 {
            sink.report(Diagnostic::DegenerateFace {
                line: line_no,
                corners: corners.len(),
            });
            return Ok(());
        }

        // Triangulate fan
        for tri in 1..(corners.len() - 1) {
            for corner in [corners[0], corners[tri], corners[tri + 1]] {
                self.current.push_vertex(corner, &self.pools, sink);
            }
        }
        Ok(())
    }

    fn switch_group(
        &mut self,
        material: String,
        object: Option<String>,
        group: Option<String>,
        sink: &mut dyn DiagnosticSink,
    ) {
        if self.current.material == material
            && self.current.object == object
            && self.current.group == group
        {
            return;
        }
        let finished = mem::replace(&mut self.current, GroupBuilder::new(material, object, group));
        if !finished.is_empty() {
            self.groups.push(finished.finish(sink));
        }
    }

    fn finish(mut self, sink: &mut dyn DiagnosticSink) -> ParsedScene {
        if !self.current.is_empty() {
            self.groups.push(self.current.finish(sink));
        }
        ParsedScene {
            geometries: self.groups,
            material_libs: self.material_libs,
        }
    }
}

fn resolve_corner(token: &str, pools: &Pools, line_no: usize) -> AssetResult<Corner> {
    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => {
            resolve_index(value, Attribute::Position, pools.positions.len(), line_no)?
        }
        _ => {
            return Err(AssetError::MalformedFace {
                line: line_no,
                issue: FaceIssue::MissingPosition(token.to_string()),
            });
        }
    };

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(
            value,
            Attribute::Texcoord,
            pools.texcoords.len(),
            line_no,
        )?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(
            value,
            Attribute::Normal,
            pools.normals.len(),
            line_no,
        )?),
        _ => None,
    };

    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

/// Map a 1-based or negative (relative to the end) OBJ index into `0..len`.
fn resolve_index(token: &str, attribute: Attribute, len: usize, line_no: usize) -> AssetResult<usize> {
    let malformed = |issue| AssetError::MalformedFace {
        line: line_no,
        issue,
    };

    let raw = token
        .parse::<i64>()
        .map_err(|_| malformed(FaceIssue::InvalidIndex(token.to_string())))?;
    if raw == 0 {
        return Err(malformed(FaceIssue::ZeroIndex));
    }
    if len == 0 {
        return Err(malformed(FaceIssue::EmptyPool(attribute)));
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };
    if idx < 0 || idx >= len as i64 {
        return Err(malformed(FaceIssue::OutOfRange {
            attribute,
            index: raw,
            len,
        }));
    }

    Ok(idx as usize)
}
