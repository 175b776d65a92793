use std::fs::File;
use std::io::Write;

use lumen::reader::parser::load_scene;
use lumen::scene::{ShapeKind, ShapeType};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lumen-e2e-{}-{}", std::process::id(), name))
}

fn write_quad_ply(name: &str) -> String {
    let mut data = Vec::new();
    data.extend_from_slice(b"ply\n");
    data.extend_from_slice(b"format binary_little_endian 1.0\n");
    data.extend_from_slice(b"element vertex 4\n");
    data.extend_from_slice(b"property float x\n");
    data.extend_from_slice(b"property float y\n");
    data.extend_from_slice(b"property float z\n");
    data.extend_from_slice(b"element face 2\n");
    data.extend_from_slice(b"property list uchar int vertex_indices\n");
    data.extend_from_slice(b"end_header\n");

    let verts: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    for v in verts {
        for c in v {
            data.extend_from_slice(&c.to_le_bytes());
        }
    }
    for face in [[0i32, 1, 2], [0, 2, 3]] {
        data.push(3);
        for i in face {
            data.extend_from_slice(&i.to_le_bytes());
        }
    }

    let path = temp_path(name);
    File::create(&path).unwrap().write_all(&data).unwrap();
    path.file_name().unwrap().to_str().unwrap().to_string()
}

#[test]
fn ply_mesh_shape_loads_into_triangle_mesh() {
    let ply_name = write_quad_ply("quad.ply");

    let scene_path = temp_path("plyscene.pbrt");
    let contents = format!(
        "WorldBegin\nShape \"plymesh\" \"string filename\" \"{}\"\nWorldEnd\n",
        ply_name
    );
    File::create(&scene_path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();

    let mut scene = load_scene(scene_path.to_str().unwrap()).unwrap();
    assert_eq!(scene.shapes.len(), 1);
    assert_eq!(scene.shapes[0].kind.shape_type(), ShapeType::PlyMesh);

    scene.load_all_ply_meshes(true).unwrap();

    let ShapeKind::TriangleMesh(mesh) = &scene.shapes[0].kind else {
        panic!("plymesh was not replaced by its triangulation");
    };
    assert_eq!(mesh.num_vertices, 4);
    assert_eq!(mesh.num_indices(), 6);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.p[0..3], [0.0, 0.0, 0.0]);
    assert_eq!(mesh.p[9..12], [0.0, 1.0, 0.0]);
}

#[test]
fn missing_ply_file_is_a_load_error() {
    let scene_path = temp_path("missing-ply.pbrt");
    let contents =
        "WorldBegin\nShape \"plymesh\" \"string filename\" \"does-not-exist.ply\"\nWorldEnd\n";
    File::create(&scene_path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();

    let mut scene = load_scene(scene_path.to_str().unwrap()).unwrap();
    assert!(scene.load_all_ply_meshes(true).is_err());
    // The shape is left as an unloaded plymesh.
    assert_eq!(scene.shapes[0].kind.shape_type(), ShapeType::PlyMesh);
}
