pub mod entities;

pub use entities::*;

use crate::error::{Error, Result};
use crate::{Float, Index};

/// The in-memory scene graph produced by a successful parse. Owns every
/// entity; handles stored inside entities are indices into these vectors
/// and stay valid for the scene's lifetime.
#[derive(Debug, Default, PartialEq)]
pub struct Scene {
    pub start_time: Float,
    pub end_time: Float,

    pub accelerator: Option<Accelerator>,
    pub camera: Option<Camera>,
    pub film: Option<Film>,
    pub filter: Option<Filter>,
    pub integrator: Option<Integrator>,
    pub sampler: Option<Sampler>,

    pub shapes: Vec<Shape>,
    pub objects: Vec<Object>,
    pub instances: Vec<Instance>,
    pub lights: Vec<Light>,
    pub area_lights: Vec<AreaLight>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub mediums: Vec<Medium>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    /// Replaces the shape at `shape_index` with its triangulation, if the
    /// shape type supports one. Returns whether the shape was replaced;
    /// failure to load a referenced PLY file is an error.
    pub fn to_triangle_mesh(&mut self, shape_index: Index) -> Result<bool> {
        let shape = &self.shapes[shape_index as usize];

        let mesh = match &shape.kind {
            ShapeKind::HeightField(heightfield) => heightfield_mesh(heightfield),
            ShapeKind::LoopSubdiv(subdiv) => loop_subdiv_mesh(subdiv),
            ShapeKind::Nurbs(nurbs) => nurbs_mesh(nurbs),
            ShapeKind::PlyMesh(ply) => {
                let mut mesh = crate::ply::load_triangle_mesh(&ply.filename)?;
                mesh.alpha = ply.alpha;
                mesh.shadowalpha = ply.shadowalpha;
                Some(mesh)
            }
            _ => None,
        };

        match mesh {
            Some(mesh) => {
                self.shapes[shape_index as usize].kind = ShapeKind::TriangleMesh(mesh);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Converts every shape whose type appears in `types`. When
    /// `stop_on_first_error` is false, conversion continues past failures
    /// and the first error is reported at the end.
    pub fn shapes_to_triangle_mesh(
        &mut self,
        types: &[ShapeType],
        stop_on_first_error: bool,
    ) -> Result<()> {
        let mut first_error: Option<Error> = None;

        for i in 0..self.shapes.len() {
            if !types.contains(&self.shapes[i].kind.shape_type()) {
                continue;
            }
            match self.to_triangle_mesh(i as Index) {
                Ok(_) => {}
                Err(err) => {
                    if stop_on_first_error {
                        return Err(err);
                    }
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Converts every convertible shape in the scene.
    pub fn all_to_triangle_mesh(&mut self, stop_on_first_error: bool) -> Result<()> {
        self.shapes_to_triangle_mesh(
            &[
                ShapeType::HeightField,
                ShapeType::LoopSubdiv,
                ShapeType::Nurbs,
                ShapeType::PlyMesh,
            ],
            stop_on_first_error,
        )
    }

    /// Loads every `plymesh` shape from disk, replacing it with the
    /// resulting triangle mesh.
    pub fn load_all_ply_meshes(&mut self, stop_on_first_error: bool) -> Result<()> {
        self.shapes_to_triangle_mesh(&[ShapeType::PlyMesh], stop_on_first_error)
    }
}

/// Tessellates the regular grid of a heightfield into its control mesh.
/// The grid spans [0,1]^2 in x and y with `pz` supplying the heights.
fn heightfield_mesh(heightfield: &HeightField) -> Option<TriangleMesh> {
    let nu = heightfield.nu;
    let nv = heightfield.nv;
    if nu < 2 || nv < 2 || heightfield.pz.len() != (nu * nv) as usize {
        return None;
    }

    let mut p = Vec::with_capacity((nu * nv) as usize * 3);
    let mut uv = Vec::with_capacity((nu * nv) as usize * 2);
    for j in 0..nv {
        for i in 0..nu {
            let u = i as Float / (nu - 1) as Float;
            let v = j as Float / (nv - 1) as Float;
            p.extend_from_slice(&[u, v, heightfield.pz[(j * nu + i) as usize]]);
            uv.extend_from_slice(&[u, v]);
        }
    }

    let mut indices = Vec::with_capacity(((nu - 1) * (nv - 1)) as usize * 6);
    for j in 0..(nv - 1) {
        for i in 0..(nu - 1) {
            let v00 = j * nu + i;
            let v10 = v00 + 1;
            let v01 = v00 + nu;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
        }
    }

    Some(TriangleMesh {
        indices,
        num_vertices: (nu * nv) as u32,
        p,
        uv,
        ..TriangleMesh::default()
    })
}

/// The subdivision surface's control cage doubles as its mesh; no
/// subdivision is applied here.
fn loop_subdiv_mesh(subdiv: &LoopSubdiv) -> Option<TriangleMesh> {
    if subdiv.indices.is_empty() || subdiv.p.is_empty() {
        return None;
    }

    Some(TriangleMesh {
        indices: subdiv.indices.clone(),
        num_vertices: (subdiv.p.len() / 3) as u32,
        p: subdiv.p.clone(),
        ..TriangleMesh::default()
    })
}

/// The NURBS control hull as a grid mesh. Weighted control points drop
/// their w coordinate.
fn nurbs_mesh(nurbs: &Nurbs) -> Option<TriangleMesh> {
    let nu = nurbs.nu;
    let nv = nurbs.nv;
    if nu < 2 || nv < 2 {
        return None;
    }

    let num_points = (nu * nv) as usize;
    let p = if !nurbs.p.is_empty() {
        if nurbs.p.len() != num_points * 3 {
            return None;
        }
        nurbs.p.clone()
    } else {
        if nurbs.pw.len() != num_points * 4 {
            return None;
        }
        let mut p = Vec::with_capacity(num_points * 3);
        for point in nurbs.pw.chunks_exact(4) {
            p.extend_from_slice(&point[..3]);
        }
        p
    };

    let mut indices = Vec::with_capacity(((nu - 1) * (nv - 1)) as usize * 6);
    for j in 0..(nv - 1) {
        for i in 0..(nu - 1) {
            let v00 = j * nu + i;
            let v10 = v00 + 1;
            let v01 = v00 + nu;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v10, v11, v00, v11, v01]);
        }
    }

    Some(TriangleMesh {
        indices,
        num_vertices: num_points as u32,
        p,
        ..TriangleMesh::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;
    use crate::INVALID_INDEX;

    fn wrap(kind: ShapeKind) -> Shape {
        Shape {
            shape_to_world: Transform::IDENTITY,
            material: INVALID_INDEX,
            area_light: INVALID_INDEX,
            inside_medium: INVALID_INDEX,
            outside_medium: INVALID_INDEX,
            object: INVALID_INDEX,
            reverse_orientation: false,
            kind,
        }
    }

    #[test]
    fn heightfield_tessellates_to_grid() {
        let mut scene = Scene::new();
        scene.shapes.push(wrap(ShapeKind::HeightField(HeightField {
            nu: 3,
            nv: 2,
            pz: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        })));

        assert!(scene.to_triangle_mesh(0).unwrap());
        let ShapeKind::TriangleMesh(mesh) = &scene.shapes[0].kind else {
            panic!("expected a triangle mesh");
        };
        assert_eq!(mesh.num_vertices, 6);
        // Two cells, two triangles each.
        assert_eq!(mesh.num_triangles(), 4);
        assert!(mesh.indices.iter().all(|&i| (i as u32) < mesh.num_vertices));
    }

    #[test]
    fn loop_subdiv_passes_control_mesh_through() {
        let mut scene = Scene::new();
        scene.shapes.push(wrap(ShapeKind::LoopSubdiv(LoopSubdiv {
            levels: 2,
            indices: vec![0, 1, 2],
            p: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        })));

        assert!(scene.to_triangle_mesh(0).unwrap());
        let ShapeKind::TriangleMesh(mesh) = &scene.shapes[0].kind else {
            panic!("expected a triangle mesh");
        };
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.num_vertices, 3);
    }

    #[test]
    fn weighted_nurbs_drops_w() {
        let mut scene = Scene::new();
        let mut pw = Vec::new();
        for i in 0..4 {
            pw.extend_from_slice(&[i as Float, 0.0, 0.0, 2.0]);
        }
        scene.shapes.push(wrap(ShapeKind::Nurbs(Nurbs {
            nu: 2,
            nv: 2,
            uorder: 2,
            vorder: 2,
            pw,
            ..Nurbs::default()
        })));

        assert!(scene.to_triangle_mesh(0).unwrap());
        let ShapeKind::TriangleMesh(mesh) = &scene.shapes[0].kind else {
            panic!("expected a triangle mesh");
        };
        assert_eq!(mesh.p.len(), 12);
        assert_eq!(mesh.p[3], 1.0);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn sphere_is_not_triangulatable() {
        let mut scene = Scene::new();
        scene
            .shapes
            .push(wrap(ShapeKind::Sphere(Sphere::default())));
        assert!(!scene.to_triangle_mesh(0).unwrap());
    }
}
