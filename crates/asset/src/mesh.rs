//! CPU-side mesh representation produced by the OBJ parser.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};

use crate::error::{AssetError, AssetResult};

/// Per-vertex attribute kinds carried by [`VertexAttributeStreams`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    Texcoord,
    Color,
}

impl Attribute {
    /// Number of floats per vertex.
    pub const fn components(self) -> usize {
        match self {
            Attribute::Texcoord => 2,
            Attribute::Position | Attribute::Normal | Attribute::Color => 3,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::Normal => "normal",
            Attribute::Texcoord => "texcoord",
            Attribute::Color => "color",
        })
    }
}

/// Flat, non-indexed vertex streams ready for a vertex buffer.
/// Every present stream holds the same number of vertices as `position`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexAttributeStreams {
    pub position: Vec<f32>,
    pub normal: Option<Vec<f32>>,
    pub texcoord: Option<Vec<f32>>,
    pub color: Option<Vec<f32>>,
}

impl VertexAttributeStreams {
    pub fn stream(&self, attribute: Attribute) -> Option<&[f32]> {
        match attribute {
            Attribute::Position => Some(&self.position),
            Attribute::Normal => self.normal.as_deref(),
            Attribute::Texcoord => self.texcoord.as_deref(),
            Attribute::Color => self.color.as_deref(),
        }
    }

    /// Vertex count of one stream, `None` if the stream is absent.
    pub fn attribute_vertex_count(&self, attribute: Attribute) -> Option<usize> {
        self.stream(attribute)
            .map(|s| s.len() / attribute.components())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.position.len() / Attribute::Position.components()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// `true` when every present stream matches the position vertex count.
    pub fn has_attribute_parity(&self) -> bool {
        let count = self.vertex_count();
        [Attribute::Normal, Attribute::Texcoord, Attribute::Color]
            .into_iter()
            .filter_map(|a| self.stream(a).map(|s| (a, s)))
            .all(|(a, s)| s.len() == count * a.components())
    }

    /// Collapse identical vertices into an indexed mesh.
    /// Fails if the unique vertices do not fit `u32` indices.
    pub fn to_indexed(&self) -> AssetResult<IndexedMesh> {
        let present: Vec<(Attribute, &[f32])> = [
            Attribute::Position,
            Attribute::Normal,
            Attribute::Texcoord,
            Attribute::Color,
        ]
        .into_iter()
        .filter_map(|a| self.stream(a).map(|s| (a, s)))
        .collect();

        let mut unique: HashMap<Vec<u32>, u32> = HashMap::new();
        let mut streams = VertexAttributeStreams {
            position: Vec::new(),
            normal: self.normal.as_ref().map(|_| Vec::new()),
            texcoord: self.texcoord.as_ref().map(|_| Vec::new()),
            color: self.color.as_ref().map(|_| Vec::new()),
        };
        let mut indices = Vec::with_capacity(self.vertex_count());

        for vertex in 0..self.vertex_count() {
            let key: Vec<u32> = present
                .iter()
                .flat_map(|(a, s)| {
                    let n = a.components();
                    s[vertex * n..(vertex + 1) * n].iter().map(|f| f.to_bits())
                })
                .collect();

            let index = match unique.entry(key) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let idx = vertex_index(streams.vertex_count())?;
                    for (a, s) in &present {
                        let n = a.components();
                        let values = &s[vertex * n..(vertex + 1) * n];
                        match a {
                            Attribute::Position => streams.position.extend_from_slice(values),
                            Attribute::Normal => extend(&mut streams.normal, values),
                            Attribute::Texcoord => extend(&mut streams.texcoord, values),
                            Attribute::Color => extend(&mut streams.color, values),
                        }
                    }
                    *entry.insert(idx)
                }
            };
            indices.push(index);
        }

        Ok(IndexedMesh::new(streams, indices))
    }
}

/// Index of the next unique vertex in a `u32` index buffer.
fn vertex_index(count: usize) -> AssetResult<u32> {
    u32::try_from(count).map_err(|_| AssetError::TooManyVertices { count })
}

fn extend(stream: &mut Option<Vec<f32>>, values: &[f32]) {
    if let Some(s) = stream.as_mut() {
        s.extend_from_slice(values);
    }
}

/// Indexed triangle mesh with deduplicated vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedMesh {
    pub streams: VertexAttributeStreams,
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn new(streams: VertexAttributeStreams, indices: Vec<u32>) -> Self {
        Self { streams, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.streams.is_empty() && !self.indices.is_empty()
    }
}

/// Part of the mesh drawn with one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryGroup {
    pub material: String,
    /// Most recent `o` name, if any.
    pub object: Option<String>,
    /// Most recent `g` name within the current object, if any.
    pub group: Option<String>,
    pub data: VertexAttributeStreams,
}

/// Output of the OBJ parser.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedScene {
    pub geometries: Vec<GeometryGroup>,
    /// Referenced `.mtl` files in first-seen order, without duplicates.
    pub material_libs: Vec<String>,
}

impl ParsedScene {
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.geometries.iter().map(|g| g.data.vertex_count()).sum()
    }
}
