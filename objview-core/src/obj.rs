/// Wavefront OBJ scene loader
///
/// Handles the subset of the format needed for wireframe display:
/// `o`, `v`, `vt` and `f` records. Everything else is skipped.
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use nom::{
    character::complete::{self, char, multispace0, multispace1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, pair, preceded},
    IResult,
};
use tracing::{debug, info, trace};

use crate::error::{ObjError, Result, Table};
use crate::geometry::{Face, FaceToken, FaceVertex, TextureVertex, Vertex};
use crate::scene::{Limits, Object, Scene};

/// Name given to faces that appear before any `o` record
pub const DEFAULT_OBJECT_NAME: &str = "default";

/// Load a scene from an OBJ file on disk
pub fn load_obj(path: impl AsRef<Path>, limits: Limits) -> Result<Scene> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ObjError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ObjError::Io(e),
    })?;

    let scene = read_obj(BufReader::new(file), limits)?;

    for object in scene.objects() {
        let texture = object.texture_path(path);
        debug!(
            object = object.name(),
            faces = object.face_count(),
            texture = %texture.display(),
            "loaded object"
        );
    }
    info!(
        path = %path.display(),
        vertices = scene.vertices().len(),
        texture_vertices = scene.texture_vertices().len(),
        objects = scene.objects().len(),
        faces = scene.face_count(),
        "scene loaded"
    );

    Ok(scene)
}

/// Load a scene from any buffered reader, one record per line
pub fn read_obj<R: BufRead>(reader: R, limits: Limits) -> Result<Scene> {
    let mut loader = SceneLoader::new(limits);
    for (index, line) in reader.lines().enumerate() {
        loader.feed_line(index + 1, &line?)?;
    }
    Ok(loader.finish())
}

/// Parse a scene held in memory
pub fn parse_obj(input: &str, limits: Limits) -> Result<Scene> {
    read_obj(input.as_bytes(), limits)
}

/// Parse one vertex reference of an `f` record (`v`, `v/vt`, `v/vt/vn`
/// or `v//vn`). Returns `None` if the token matches none of these.
pub fn parse_face_token(token: &str) -> Option<FaceToken> {
    all_consuming(face_token)(token).ok().map(|(_, t)| t)
}

fn face_token(input: &str) -> IResult<&str, FaceToken> {
    let start = input;
    let (input, v) = complete::i64(input)?;
    let (input, tail) = opt(preceded(
        char('/'),
        pair(opt(complete::i64), opt(preceded(char('/'), complete::i64))),
    ))(input)?;

    let token = match tail {
        None => FaceToken::Vertex(v),
        Some((Some(vt), None)) => FaceToken::VertexTexture(v, vt),
        Some((Some(vt), Some(vn))) => FaceToken::VertexTextureNormal(v, vt, vn),
        Some((None, Some(vn))) => FaceToken::VertexNormal(v, vn),
        Some((None, None)) => {
            return Err(nom::Err::Error(nom::error::Error::new(
                start,
                nom::error::ErrorKind::Verify,
            )))
        }
    };

    Ok((input, token))
}

/// Whitespace separated floats filling the rest of a record
fn numeric_fields(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, float),
        multispace0,
    ))(input)
}

/// At least `required` numbers; extra components (w, vertex colours) are allowed
fn floats(line: usize, record: &'static str, rest: &str, required: usize) -> Result<Vec<f32>> {
    match numeric_fields(rest) {
        Ok((_, fields)) if fields.len() >= required => Ok(fields),
        _ => Err(malformed(
            line,
            record,
            format!("expected {} numbers, found '{}'", required, rest.trim()),
        )),
    }
}

fn malformed(line: usize, record: &'static str, reason: impl Into<String>) -> ObjError {
    ObjError::Malformed {
        line,
        record,
        reason: reason.into(),
    }
}

/// Turn a 1-based (or negative, relative) OBJ index into a table index
fn resolve_index(raw: i64, count: usize, table: Table, line: usize) -> Result<usize> {
    let out_of_range = || ObjError::IndexOutOfRange {
        line,
        table,
        index: raw,
        count,
    };

    let resolved = match raw {
        0 => return Err(malformed(line, "f", "index 0 is not a valid reference")),
        r if r > 0 => r - 1,
        r => i64::try_from(count).map_err(|_| out_of_range())? + r,
    };

    match usize::try_from(resolved) {
        Ok(index) if index < count => Ok(index),
        _ => Err(out_of_range()),
    }
}

/// Single forward pass over the records of a file
struct SceneLoader {
    scene: Scene,
    ignored: usize,
}

impl SceneLoader {
    fn new(limits: Limits) -> Self {
        Self {
            scene: Scene::new(limits),
            ignored: 0,
        }
    }

    fn feed_line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let line = raw.trim_end();
        let max = self.scene.limits.max_line_length;
        if line.len() > max {
            return Err(ObjError::LineTooLong {
                line: line_no,
                length: line.len(),
                max,
            });
        }

        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        match keyword {
            "o" => self.begin_object(line_no, rest),
            "v" => self.add_vertex(line_no, rest),
            "vt" => self.add_texture_vertex(line_no, rest),
            "f" => self.add_face(line_no, rest),
            _ => {
                self.ignored += 1;
                trace!(line = line_no, keyword, "skipping record");
                Ok(())
            }
        }
    }

    fn begin_object(&mut self, line_no: usize, rest: &str) -> Result<()> {
        let name = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| malformed(line_no, "o", "missing object name"))?;

        let max = self.scene.limits.max_name_length;
        if name.chars().count() > max {
            return Err(ObjError::NameTooLong {
                line: line_no,
                name: name.to_string(),
                max,
            });
        }

        let object = Object::new(name, self.scene.limits.max_faces_per_object);
        self.scene.objects.push(object, line_no)?;
        Ok(())
    }

    fn add_vertex(&mut self, line_no: usize, rest: &str) -> Result<()> {
        let xyz = floats(line_no, "v", rest, 3)?;
        self.scene
            .vertices
            .push(Vertex::new(xyz[0], xyz[1], xyz[2]), line_no)?;
        Ok(())
    }

    fn add_texture_vertex(&mut self, line_no: usize, rest: &str) -> Result<()> {
        let uv = floats(line_no, "vt", rest, 2)?;
        self.scene
            .texture_vertices
            .push(TextureVertex::from_obj(uv[0], uv[1]), line_no)?;
        Ok(())
    }

    fn add_face(&mut self, line_no: usize, rest: &str) -> Result<()> {
        let max = self.scene.limits.max_face_vertices;
        let mut corners = Vec::with_capacity(max);

        for text in rest.split_whitespace() {
            let token = parse_face_token(text).ok_or_else(|| {
                malformed(line_no, "f", format!("bad vertex reference '{}'", text))
            })?;

            if corners.len() >= max {
                return Err(ObjError::CapacityExceeded {
                    line: line_no,
                    table: Table::FaceVertices,
                    capacity: max,
                });
            }

            let vertex = resolve_index(
                token.vertex(),
                self.scene.vertices.len(),
                Table::Vertices,
                line_no,
            )?;
            let texture = token
                .texture()
                .map(|vt| {
                    resolve_index(
                        vt,
                        self.scene.texture_vertices.len(),
                        Table::TextureVertices,
                        line_no,
                    )
                })
                .transpose()?;

            corners.push(FaceVertex { vertex, texture });
        }

        if corners.len() < 3 {
            return Err(malformed(
                line_no,
                "f",
                format!("a face needs at least 3 vertices, found {}", corners.len()),
            ));
        }

        if self.scene.objects.is_empty() {
            let object = Object::new(DEFAULT_OBJECT_NAME, self.scene.limits.max_faces_per_object);
            self.scene.objects.push(object, line_no)?;
        }
        let object = self
            .scene
            .objects
            .last_mut()
            .ok_or_else(|| malformed(line_no, "f", "no object to attach the face to"))?;
        object.push_face(Face::new(corners), line_no)?;
        Ok(())
    }

    fn finish(self) -> Scene {
        if self.ignored > 0 {
            debug!(records = self.ignored, "skipped unsupported records");
        }
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Scene> {
        parse_obj(input, Limits::default())
    }

    const TRIANGLE: &str = "\
o body
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

    #[test]
    fn test_single_object_scene() {
        let scene = parse(TRIANGLE).unwrap();
        assert_eq!(scene.objects().len(), 1);

        let body = &scene.objects()[0];
        assert_eq!(body.name(), "body");
        assert_eq!(body.face_count(), 1);
        assert_eq!(body.faces()[0].vertex_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_vertices_kept_in_file_order() {
        let scene = parse("v 1 2 3\nv 4 5 6\nv -7 8.5 9e1\n").unwrap();
        let points: Vec<_> = scene
            .vertices()
            .iter()
            .map(|v| (v.position.x, v.position.y, v.position.z))
            .collect();
        assert_eq!(points, vec![(1.0, 2.0, 3.0), (4.0, 5.0, 6.0), (-7.0, 8.5, 90.0)]);
    }

    #[test]
    fn test_texture_vertex_v_is_flipped() {
        let scene = parse("vt 0.5 0.25\nvt 0.1 1.0 0.0\n").unwrap();
        let tv = scene.texture_vertices();
        assert_eq!(tv.len(), 2);
        assert!((tv[0].u - 0.5).abs() < 1e-6);
        assert!((tv[0].v - 0.75).abs() < 1e-6);
        assert!(tv[1].v.abs() < 1e-6);
    }

    #[test]
    fn test_full_face_references() {
        let mut input = String::new();
        for i in 0..9 {
            input.push_str(&format!("v {} 0 0\nvt 0 {}\n", i, i));
        }
        input.push_str("o body\nf 1/2/3 4/5/6 7/8/9\n");

        let scene = parse(&input).unwrap();
        let face = &scene.objects()[0].faces()[0];
        assert_eq!(face.vertex_indices().collect::<Vec<_>>(), vec![0, 3, 6]);
        assert_eq!(
            face.texture_indices().collect::<Vec<_>>(),
            vec![Some(1), Some(4), Some(7)]
        );
    }

    #[test]
    fn test_bare_indices_have_no_texture() {
        let scene = parse(TRIANGLE).unwrap();
        let face = &scene.objects()[0].faces()[0];
        assert!(face.texture_indices().all(|t| t.is_none()));
    }

    #[test]
    fn test_normal_only_reference_has_no_texture() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1//1 2//1 3//1\n";
        let scene = parse(input).unwrap();
        let face = &scene.objects()[0].faces()[0];
        assert_eq!(face.vertex_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(face.texture_indices().all(|t| t.is_none()));
    }

    #[test]
    fn test_face_token_shapes() {
        assert_eq!(parse_face_token("7"), Some(FaceToken::Vertex(7)));
        assert_eq!(parse_face_token("7/2"), Some(FaceToken::VertexTexture(7, 2)));
        assert_eq!(
            parse_face_token("7/2/9"),
            Some(FaceToken::VertexTextureNormal(7, 2, 9))
        );
        assert_eq!(parse_face_token("7//9"), Some(FaceToken::VertexNormal(7, 9)));
        assert_eq!(parse_face_token("-1/-2"), Some(FaceToken::VertexTexture(-1, -2)));

        for bad in ["", "/", "7/", "7//", "7/2/", "a", "7/x", "7/2/9/1", "1.5"] {
            assert_eq!(parse_face_token(bad), None, "token {:?}", bad);
        }
    }

    #[test]
    fn test_new_object_starts_with_no_faces() {
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
o first
f 1 2 3
f 3 2 1
o second
";
        let scene = parse(input).unwrap();
        assert_eq!(scene.objects()[0].face_count(), 2);
        assert_eq!(scene.objects()[1].face_count(), 0);
        assert_eq!(
            scene.summary().to_string(),
            "Vertices: 3\n  first faces: 2\n  second faces: 0\n"
        );
    }

    #[test]
    fn test_faces_before_object_use_default() {
        let scene = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(scene.objects()[0].name(), DEFAULT_OBJECT_NAME);
        assert_eq!(scene.objects()[0].face_count(), 1);
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let scene = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf -3 -2 -1\n").unwrap();
        let face = &scene.objects()[0].faces()[0];
        assert_eq!(face.vertex_indices().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_records_and_comments_ignored() {
        let input = "\
# exported scene
mtllib scene.mtl
o body
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
usemtl skin
s off
g group

f 1 2 3\r
";
        let scene = parse(input).unwrap();
        assert_eq!(scene.vertices().len(), 3);
        assert_eq!(scene.objects()[0].face_count(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let err = parse("o body\nv 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                line: 4,
                table: Table::Vertices,
                index: 3,
                count: 2
            }
        ));

        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2/1 3/1\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                table: Table::TextureVertices,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_index_is_malformed() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::Malformed { line: 4, record: "f", .. }));
    }

    #[test]
    fn test_malformed_numbers_are_reported() {
        for input in ["v 1 2\n", "v 1 two 3\n", "v 1 2 3abc\n", "vt 0.5\n"] {
            let err = parse(input).unwrap_err();
            assert!(matches!(err, ObjError::Malformed { line: 1, .. }), "input {:?}", input);
        }
    }

    #[test]
    fn test_extra_vertex_components_accepted() {
        let scene = parse("v 1 2 3 1.0\nv 1 2 3 0.5 0.5 0.5\n").unwrap();
        assert_eq!(scene.vertices().len(), 2);
    }

    #[test]
    fn test_face_vertex_limit() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nv 2 2 0\nf 1 2 3 4 5\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(
            err,
            ObjError::CapacityExceeded {
                line: 6,
                table: Table::FaceVertices,
                capacity: 4
            }
        ));
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::Malformed { line: 3, record: "f", .. }));
    }

    #[test]
    fn test_object_capacity() {
        let limits = Limits {
            max_objects: 2,
            ..Limits::default()
        };
        let err = parse_obj("o a\no b\no c\n", limits).unwrap_err();
        assert!(matches!(
            err,
            ObjError::CapacityExceeded {
                line: 3,
                table: Table::Objects,
                capacity: 2
            }
        ));
    }

    #[test]
    fn test_vertex_capacity() {
        let limits = Limits {
            max_vertices: 2,
            ..Limits::default()
        };
        let err = parse_obj("v 0 0 0\nv 0 0 0\nv 0 0 0\n", limits).unwrap_err();
        assert!(matches!(
            err,
            ObjError::CapacityExceeded {
                table: Table::Vertices,
                ..
            }
        ));
    }

    #[test]
    fn test_face_capacity_per_object() {
        let limits = Limits {
            max_faces_per_object: 1,
            ..Limits::default()
        };
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\no a\nf 1 2 3\no b\nf 1 2 3\nf 1 2 3\n";
        let err = parse_obj(input, limits).unwrap_err();
        assert!(matches!(
            err,
            ObjError::CapacityExceeded {
                line: 8,
                table: Table::Faces,
                capacity: 1
            }
        ));
    }

    #[test]
    fn test_long_line_rejected() {
        let input = format!("o {}\n", "x".repeat(120));
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, ObjError::LineTooLong { line: 1, max: 100, .. }));
    }

    #[test]
    fn test_line_at_length_limit_accepted() {
        let comment = format!("# {}", "x".repeat(98));
        assert_eq!(comment.len(), 100);
        let vertex = format!("v 1.{} 2 3", "0".repeat(92));
        assert_eq!(vertex.len(), 100);

        let scene = parse(&format!("{comment}\n{vertex}\n")).unwrap();
        assert_eq!(scene.vertices().len(), 1);
        assert_eq!(scene.vertices()[0].position.x, 1.0);

        let err = parse(&format!("{vertex}0\n")).unwrap_err();
        assert!(matches!(err, ObjError::LineTooLong { line: 1, length: 101, max: 100 }));
    }

    #[test]
    fn test_object_name_rules() {
        let err = parse("o\n").unwrap_err();
        assert!(matches!(err, ObjError::Malformed { record: "o", .. }));

        let input = format!("o {}\n", "n".repeat(51));
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, ObjError::NameTooLong { max: 50, .. }));

        let name = "n".repeat(50);
        let scene = parse(&format!("o {name}\n")).unwrap();
        assert_eq!(scene.objects()[0].name(), name);

        let scene = parse("o hair extra tokens\n").unwrap();
        assert_eq!(scene.objects()[0].name(), "hair");
    }
}
