/// Geometry primitives shared by every object in a scene
use nalgebra::Point3;

/// A 3D point in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }
}

/// A texture coordinate, stored with `v` flipped to image row order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureVertex {
    pub u: f32,
    pub v: f32,
}

impl TextureVertex {
    /// Build from the `u v` pair as written in an OBJ file
    pub fn from_obj(u: f32, v: f32) -> Self {
        Self { u, v: 1.0 - v }
    }
}

/// One corner of a face: zero-based indices into the shared tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub vertex: usize,
    pub texture: Option<usize>,
}

/// A polygon made of an ordered list of corners
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    pub vertices: Vec<FaceVertex>,
}

impl Face {
    pub fn new(vertices: Vec<FaceVertex>) -> Self {
        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices.iter().map(|fv| fv.vertex)
    }

    pub fn texture_indices(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.vertices.iter().map(|fv| fv.texture)
    }
}

/// A single `f` record slot, tagged by its slash layout.
///
/// Indices are kept exactly as written (1-based, or negative for
/// relative references) until the loader resolves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceToken {
    /// `v`
    Vertex(i64),
    /// `v/vt`
    VertexTexture(i64, i64),
    /// `v/vt/vn`
    VertexTextureNormal(i64, i64, i64),
    /// `v//vn`
    VertexNormal(i64, i64),
}

impl FaceToken {
    pub fn vertex(&self) -> i64 {
        match *self {
            FaceToken::Vertex(v)
            | FaceToken::VertexTexture(v, _)
            | FaceToken::VertexTextureNormal(v, _, _)
            | FaceToken::VertexNormal(v, _) => v,
        }
    }

    pub fn texture(&self) -> Option<i64> {
        match *self {
            FaceToken::VertexTexture(_, vt) | FaceToken::VertexTextureNormal(_, vt, _) => Some(vt),
            FaceToken::Vertex(_) | FaceToken::VertexNormal(_, _) => None,
        }
    }

    pub fn normal(&self) -> Option<i64> {
        match *self {
            FaceToken::VertexTextureNormal(_, _, vn) | FaceToken::VertexNormal(_, vn) => Some(vn),
            FaceToken::Vertex(_) | FaceToken::VertexTexture(_, _) => None,
        }
    }
}
