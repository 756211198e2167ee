/// objview core library - OBJ scene loading and wireframe traversal
///
/// This library is independent of any display surface: it loads a scene
/// into bounded tables, provides the camera and transform math, and walks
/// the scene issuing one line loop per face to a line sink.

pub mod error;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod wireframe;

// Re-export commonly used types
pub use error::{ObjError, Result, Table};
pub use geometry::{Face, FaceToken, FaceVertex, TextureVertex, Vertex};
pub use obj::{load_obj, parse_face_token, parse_obj, read_obj};
pub use projection::{project_to_screen, Camera, ProjectionMode, ScreenPoint};
pub use scene::{Limits, Object, Scene};
pub use transform::{SceneRotation, Transform};
pub use wireframe::{draw_wireframe, LineSink, RecordingSink};
