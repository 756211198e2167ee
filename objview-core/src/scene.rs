/// Scene aggregate: shared geometry tables plus the per-object face lists
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::{ObjError, Result, Table};
use crate::geometry::{Face, TextureVertex, Vertex};

/// Capacity limits enforced while a scene is being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_objects: usize,
    pub max_vertices: usize,
    pub max_texture_vertices: usize,
    pub max_faces_per_object: usize,
    pub max_face_vertices: usize,
    pub max_name_length: usize,
    pub max_line_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_objects: 5,
            max_vertices: 1500,
            max_texture_vertices: 1500,
            max_faces_per_object: 1000,
            max_face_vertices: 4,
            max_name_length: 50,
            max_line_length: 100,
        }
    }
}

/// A growable sequence that refuses to grow past a fixed capacity
#[derive(Debug, Clone, PartialEq)]
pub struct Bounded<T> {
    items: Vec<T>,
    capacity: usize,
    table: Table,
}

impl<T> Bounded<T> {
    pub fn new(table: Table, capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            table,
        }
    }

    /// Append an item, returning its index.
    ///
    /// `line` is only used to annotate the error when the table is full.
    pub fn push(&mut self, item: T, line: usize) -> Result<usize> {
        if self.items.len() >= self.capacity {
            return Err(ObjError::CapacityExceeded {
                line,
                table: self.table,
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }
}

impl<T> Deref for Bounded<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

/// A named group of faces, e.g. a body part or a garment
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    name: String,
    faces: Bounded<Face>,
}

impl Object {
    pub fn new(name: impl Into<String>, max_faces: usize) -> Self {
        Self {
            name: name.into(),
            faces: Bounded::new(Table::Faces, max_faces),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub(crate) fn push_face(&mut self, face: Face, line: usize) -> Result<usize> {
        self.faces.push(face, line)
    }

    /// Texture image this object would use, next to the scene file:
    /// `<dir>/<stem>_<name>.png`
    pub fn texture_path(&self, scene_path: &Path) -> PathBuf {
        let stem = scene_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}_{}.png", stem, self.name);
        match scene_path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// All objects of a scene plus the globally indexed geometry tables
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub(crate) objects: Bounded<Object>,
    pub(crate) vertices: Bounded<Vertex>,
    pub(crate) texture_vertices: Bounded<TextureVertex>,
    pub(crate) limits: Limits,
}

impl Scene {
    pub fn new(limits: Limits) -> Self {
        Self {
            objects: Bounded::new(Table::Objects, limits.max_objects),
            vertices: Bounded::new(Table::Vertices, limits.max_vertices),
            texture_vertices: Bounded::new(Table::TextureVertices, limits.max_texture_vertices),
            limits,
        }
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn texture_vertices(&self) -> &[TextureVertex] {
        &self.texture_vertices
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name() == name)
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(Object::face_count).sum()
    }

    /// Load statistics in the human-readable form printed after loading
    pub fn summary(&self) -> SceneSummary<'_> {
        SceneSummary { scene: self }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

/// Display adapter for [`Scene::summary`]
pub struct SceneSummary<'a> {
    scene: &'a Scene,
}

impl fmt::Display for SceneSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices: {}", self.scene.vertices.len())?;
        for object in self.scene.objects() {
            writeln!(f, "  {} faces: {}", object.name(), object.face_count())?;
        }
        Ok(())
    }
}
