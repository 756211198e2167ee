/// Wireframe traversal of a loaded scene
use nalgebra::Point3;

use crate::scene::Scene;

/// Receiver of draw calls. One call per closed polygon outline.
pub trait LineSink {
    /// Draw a closed loop through `points`, in object space
    fn line_loop(&mut self, points: &[Point3<f32>]);
}

/// Issue one line loop per face: objects in load order, faces in load
/// order, corners in record order.
pub fn draw_wireframe<S: LineSink + ?Sized>(scene: &Scene, sink: &mut S) {
    let vertices = scene.vertices();
    let mut points = Vec::with_capacity(scene.limits().max_face_vertices);

    for object in scene.objects() {
        for face in object.faces() {
            points.clear();
            // Indices were validated when the face was loaded
            points.extend(
                face.vertex_indices()
                    .filter_map(|i| vertices.get(i))
                    .map(|v| v.position),
            );
            sink.line_loop(&points);
        }
    }
}

/// Sink that keeps every loop it receives, in order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSink {
    pub loops: Vec<Vec<Point3<f32>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineSink for RecordingSink {
    fn line_loop(&mut self, points: &[Point3<f32>]) {
        self.loops.push(points.to_vec());
    }
}
