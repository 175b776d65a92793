use std::fs::File;
use std::io::Write;

use approx::assert_abs_diff_eq;

use lumen::reader::parser::load_scene;
use lumen::scene::{
    Accelerator, BvhSplit, CameraKind, Film, Filter, FilterKind, Integrator, LightKind,
    MaterialKind, Sampler, Scene, ShapeKind, TextureKind,
};
use lumen::{Loader, INVALID_INDEX};

fn write_temp(name: &str, contents: &str) -> String {
    let path = std::env::temp_dir().join(format!("lumen-parse-{}-{}", std::process::id(), name));
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path.display().to_string()
}

fn parse(name: &str, contents: &str) -> Scene {
    let path = write_temp(name, contents);
    load_scene(&path).unwrap()
}

/// Every handle stored anywhere in the scene refers to an entity of the
/// right kind.
fn check_handles(scene: &Scene) {
    for shape in &scene.shapes {
        if shape.material != INVALID_INDEX {
            assert!((shape.material as usize) < scene.materials.len());
        }
        if shape.area_light != INVALID_INDEX {
            assert!((shape.area_light as usize) < scene.area_lights.len());
        }
        if shape.inside_medium != INVALID_INDEX {
            assert!((shape.inside_medium as usize) < scene.mediums.len());
        }
        if shape.outside_medium != INVALID_INDEX {
            assert!((shape.outside_medium as usize) < scene.mediums.len());
        }
        if shape.object != INVALID_INDEX {
            assert!((shape.object as usize) < scene.objects.len());
        }
    }
    for material in &scene.materials {
        if material.bumpmap != INVALID_INDEX {
            assert!((material.bumpmap as usize) < scene.textures.len());
        }
    }
    for instance in &scene.instances {
        assert!((instance.object as usize) < scene.objects.len());
    }
    for (index, object) in scene.objects.iter().enumerate() {
        let first = object.first_shape as usize;
        let end = first + object.num_shapes as usize;
        assert!(end <= scene.shapes.len());
        for shape in &scene.shapes[first..end] {
            assert_eq!(shape.object, index as u32);
        }
    }
}

#[test]
fn minimal_world_gets_default_singletons() {
    let scene = parse("minimal.pbrt", "WorldBegin\nWorldEnd\n");

    let camera = scene.camera.as_ref().unwrap();
    assert!(matches!(camera.kind, CameraKind::Perspective { .. }));

    let Film::Image {
        xresolution,
        yresolution,
        filename,
        ..
    } = scene.film.as_ref().unwrap();
    assert_eq!((*xresolution, *yresolution), (640, 480));
    assert_eq!(filename, "pbrt.exr");

    assert!(matches!(
        scene.sampler.as_ref().unwrap(),
        Sampler::Halton { pixelsamples: 16 }
    ));

    let filter = scene.filter.as_ref().unwrap();
    assert!(matches!(filter.kind, FilterKind::Box));
    assert_eq!((filter.xwidth, filter.ywidth), (0.5, 0.5));

    assert!(matches!(
        scene.integrator.as_ref().unwrap(),
        Integrator::Path { maxdepth: 5, .. }
    ));

    assert!(matches!(
        scene.accelerator.as_ref().unwrap(),
        Accelerator::Bvh {
            maxnodeprims: 4,
            splitmethod: BvhSplit::Sah,
        }
    ));

    assert!(scene.shapes.is_empty());
    assert!(scene.lights.is_empty());
    assert!(scene.materials.is_empty());
}

#[test]
fn named_material_referenced_by_shape() {
    let scene = parse(
        "named-material.pbrt",
        r#"
MakeNamedMaterial "m1" "string type" "matte" "rgb Kd" [0.8 0.2 0.2]
WorldBegin
  NamedMaterial "m1"
  Shape "sphere" "float radius" 2
WorldEnd
"#,
    );

    assert_eq!(scene.materials.len(), 1);
    let material = &scene.materials[0];
    assert_eq!(material.name.as_deref(), Some("m1"));
    let MaterialKind::Matte(matte) = &material.kind else {
        panic!("expected a matte material");
    };
    assert_eq!(matte.kd.value, [0.8, 0.2, 0.2]);

    assert_eq!(scene.shapes.len(), 1);
    let shape = &scene.shapes[0];
    assert_eq!(shape.material, 0);
    let ShapeKind::Sphere(sphere) = &shape.kind else {
        panic!("expected a sphere");
    };
    assert_eq!(sphere.radius, 2.0);
    assert_eq!(sphere.zmin, -2.0);
    assert_eq!(sphere.zmax, 2.0);

    check_handles(&scene);
}

#[test]
fn instance_references_object() {
    let scene = parse(
        "instance.pbrt",
        r#"
WorldBegin
  ObjectBegin "box"
    Shape "trianglemesh" "integer indices" [0 1 2] "point P" [0 0 0 1 0 0 0 1 0]
  ObjectEnd
  Translate 5 0 0
  ObjectInstance "box"
WorldEnd
"#,
    );

    assert_eq!(scene.objects.len(), 1);
    let object = &scene.objects[0];
    assert_eq!(object.name, "box");
    assert_eq!(object.first_shape, 0);
    assert_eq!(object.num_shapes, 1);

    assert_eq!(scene.shapes.len(), 1);
    assert_eq!(scene.shapes[0].object, 0);

    assert_eq!(scene.instances.len(), 1);
    let instance = &scene.instances[0];
    assert_eq!(instance.object, 0);
    assert_abs_diff_eq!(instance.instance_to_world.start.rows[0][3], 5.0);
    assert_abs_diff_eq!(instance.instance_to_world.start.rows[1][3], 0.0);
    assert_abs_diff_eq!(instance.instance_to_world.start.rows[2][3], 0.0);

    check_handles(&scene);
}

#[test]
fn unknown_object_instance_is_a_no_op() {
    let scene = parse(
        "unknown-instance.pbrt",
        "WorldBegin\nObjectInstance \"nothing\"\nWorldEnd\n",
    );
    assert!(scene.instances.is_empty());
}

#[test]
fn shape_level_material_override() {
    let scene = parse(
        "override.pbrt",
        r#"
MakeNamedMaterial "base" "string type" "plastic" "rgb Kd" [1 0 0]
WorldBegin
  NamedMaterial "base"
  Shape "sphere" "rgb Kd" [0 1 0]
WorldEnd
"#,
    );

    assert_eq!(scene.materials.len(), 2);

    let base = &scene.materials[0];
    assert_eq!(base.name.as_deref(), Some("base"));
    let MaterialKind::Plastic(plastic) = &base.kind else {
        panic!("expected plastic");
    };
    assert_eq!(plastic.kd.value, [1.0, 0.0, 0.0]);

    let shadow = &scene.materials[1];
    assert!(shadow.name.is_none());
    let MaterialKind::Plastic(plastic) = &shadow.kind else {
        panic!("expected plastic");
    };
    assert_eq!(plastic.kd.value, [0.0, 1.0, 0.0]);

    assert_eq!(scene.shapes[0].material, 1);
    check_handles(&scene);
}

#[test]
fn shape_without_overrides_shares_the_active_material() {
    let scene = parse(
        "no-override.pbrt",
        r#"
WorldBegin
  MakeNamedMaterial "base" "string type" "plastic" "rgb Kd" [1 0 0]
  NamedMaterial "base"
  Shape "sphere" "float radius" 3
WorldEnd
"#,
    );

    // "radius" is not an override-eligible parameter for plastic.
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.shapes[0].material, 0);
}

#[test]
fn xyz_spectrum_decodes_to_rgb() {
    let scene = parse(
        "xyz.pbrt",
        "WorldBegin\nLightSource \"point\" \"xyz I\" [0.5 0.5 0.5]\nWorldEnd\n",
    );

    assert_eq!(scene.lights.len(), 1);
    let LightKind::Point { i, .. } = &scene.lights[0].kind else {
        panic!("expected a point light");
    };
    assert_abs_diff_eq!(i[0], 0.602397, epsilon = 1e-5);
    assert_abs_diff_eq!(i[1], 0.474146, epsilon = 1e-5);
    assert_abs_diff_eq!(i[2], 0.454458, epsilon = 1e-5);
}

#[test]
fn spectrum_sidecar_file_terminates_at_eof() {
    let spd_path = write_temp("flat.spd", "400 1.0\n500 1.0\n600 1.0\n700 1.0\n");
    let scene = parse(
        "sidecar.pbrt",
        &format!(
            "WorldBegin\nLightSource \"point\" \"spectrum I\" \"{}\"\nWorldEnd\n",
            spd_path
        ),
    );

    let LightKind::Point { i, .. } = &scene.lights[0].kind else {
        panic!("expected a point light");
    };
    for c in i {
        assert!(c.is_finite());
        assert!(*c > 0.5);
    }
}

#[test]
fn parsing_twice_yields_equal_scenes() {
    let contents = r#"
LookAt 0 0 -5  0 0 0  0 1 0
Camera "perspective" "float fov" 35
WorldBegin
  MakeNamedMaterial "red" "string type" "matte" "rgb Kd" [0.9 0.1 0.1]
  NamedMaterial "red"
  AttributeBegin
    Translate 0 1 0
    Shape "sphere" "float radius" 0.5
  AttributeEnd
  LightSource "distant" "rgb L" [1 1 1]
WorldEnd
"#;
    let a = parse("twice-a.pbrt", contents);
    let b = parse("twice-b.pbrt", contents);
    assert_eq!(a, b);
}

#[test]
fn attribute_pairs_only_leave_an_empty_world() {
    let scene = parse(
        "empty-attrs.pbrt",
        "WorldBegin\nAttributeBegin\nAttributeEnd\nAttributeBegin\nAttributeEnd\nWorldEnd\n",
    );
    assert!(scene.shapes.is_empty());
    assert!(scene.materials.is_empty());
    assert!(scene.textures.is_empty());
    assert!(scene.lights.is_empty());
    assert_eq!(scene.filter.as_ref().unwrap(), &Filter::default());
}

#[test]
fn attribute_scope_restores_material_state() {
    let scene = parse(
        "scopes.pbrt",
        r#"
WorldBegin
  MakeNamedMaterial "outer" "string type" "matte"
  NamedMaterial "outer"
  AttributeBegin
    MakeNamedMaterial "inner" "string type" "mirror"
    NamedMaterial "inner"
    Shape "sphere"
  AttributeEnd
  Shape "sphere"
WorldEnd
"#,
    );

    assert_eq!(scene.shapes.len(), 2);
    // Inside the scope the mirror is active; outside, the outer matte
    // returns.
    assert_eq!(scene.shapes[0].material, 1);
    assert_eq!(scene.shapes[1].material, 0);
}

#[test]
fn texture_pools_are_separated_by_data_type() {
    let scene = parse(
        "texture-pools.pbrt",
        r#"
WorldBegin
  Texture "tex" "float" "constant" "float value" 0.5
  Texture "tex" "spectrum" "constant" "rgb value" [0.2 0.4 0.6]
  Material "matte" "texture Kd" "tex" "texture sigma" "tex"
  Shape "sphere"
WorldEnd
"#,
    );

    assert_eq!(scene.textures.len(), 2);
    let MaterialKind::Matte(matte) = &scene.materials[0].kind else {
        panic!("expected matte");
    };
    // Kd is spectrum-valued so it resolves in the spectrum pool; sigma is
    // float-valued and resolves in the float pool.
    assert_eq!(matte.kd.texture, 1);
    assert_eq!(matte.sigma.texture, 0);
}

#[test]
fn texture_names_shadow_in_inner_scopes() {
    let scene = parse(
        "texture-shadowing.pbrt",
        r#"
WorldBegin
  Texture "t" "spectrum" "constant" "rgb value" [1 0 0]
  AttributeBegin
    Texture "t" "spectrum" "constant" "rgb value" [0 1 0]
    Material "matte" "texture Kd" "t"
    Shape "sphere"
  AttributeEnd
WorldEnd
"#,
    );

    let MaterialKind::Matte(matte) = &scene.materials[0].kind else {
        panic!("expected matte");
    };
    assert_eq!(matte.kd.texture, 1);

    let TextureKind::Constant { value } = &scene.textures[1].kind else {
        panic!("expected constant texture");
    };
    assert_eq!(*value, [0.0, 1.0, 0.0]);
}

#[test]
fn medium_interface_resolves_against_scene_mediums() {
    let scene = parse(
        "mediums.pbrt",
        r#"
MakeNamedMedium "fog" "string type" "homogeneous" "float g" 0.2
WorldBegin
  MediumInterface "fog" ""
  Shape "sphere"
  MediumInterface "missing" "fog"
  Shape "sphere"
WorldEnd
"#,
    );

    assert_eq!(scene.mediums.len(), 1);
    assert_eq!(scene.shapes[0].inside_medium, 0);
    assert_eq!(scene.shapes[0].outside_medium, INVALID_INDEX);
    // Unknown names resolve to INVALID without failing the parse.
    assert_eq!(scene.shapes[1].inside_medium, INVALID_INDEX);
    assert_eq!(scene.shapes[1].outside_medium, 0);
}

#[test]
fn area_light_applies_to_following_shapes_in_scope() {
    let scene = parse(
        "arealight.pbrt",
        r#"
WorldBegin
  AttributeBegin
    AreaLightSource "diffuse" "rgb L" [2 2 2]
    Shape "sphere"
  AttributeEnd
  Shape "sphere"
WorldEnd
"#,
    );

    assert_eq!(scene.area_lights.len(), 1);
    assert_eq!(scene.shapes[0].area_light, 0);
    assert_eq!(scene.shapes[1].area_light, INVALID_INDEX);
}

#[test]
fn active_transform_gates_the_time_samples() {
    let scene = parse(
        "motion.pbrt",
        r#"
WorldBegin
  ActiveTransform StartTime
  Translate 1 0 0
  ActiveTransform All
  Shape "sphere"
WorldEnd
"#,
    );

    let transform = &scene.shapes[0].shape_to_world;
    assert_abs_diff_eq!(transform.start.rows[0][3], 1.0);
    assert_abs_diff_eq!(transform.end.rows[0][3], 0.0);
}

#[test]
fn transform_begin_preserves_attributes() {
    let scene = parse(
        "transform-scope.pbrt",
        r#"
WorldBegin
  MakeNamedMaterial "m" "string type" "matte"
  NamedMaterial "m"
  TransformBegin
    Translate 3 0 0
    Shape "sphere"
  TransformEnd
  Shape "sphere"
WorldEnd
"#,
    );

    assert_abs_diff_eq!(scene.shapes[0].shape_to_world.start.rows[0][3], 3.0);
    assert_abs_diff_eq!(scene.shapes[1].shape_to_world.start.rows[0][3], 0.0);
    // The material assignment survives the transform-only scope.
    assert_eq!(scene.shapes[1].material, 0);
}

#[test]
fn transform_directive_is_column_major() {
    // A column-major translation: the translation components occupy the
    // last four values.
    let scene = parse(
        "column-major.pbrt",
        r#"
WorldBegin
  Transform [1 0 0 0  0 1 0 0  0 0 1 0  7 8 9 1]
  Shape "sphere"
WorldEnd
"#,
    );

    let m = &scene.shapes[0].shape_to_world.start;
    assert_abs_diff_eq!(m.rows[0][3], 7.0);
    assert_abs_diff_eq!(m.rows[1][3], 8.0);
    assert_abs_diff_eq!(m.rows[2][3], 9.0);
}

#[test]
fn camera_stores_inverse_transform() {
    let scene = parse(
        "camera.pbrt",
        "Translate 0 0 -10\nCamera \"perspective\" \"float fov\" 45\nWorldBegin\nWorldEnd\n",
    );

    let camera = scene.camera.as_ref().unwrap();
    // The inverse of a translate by -10 is a translate by +10.
    assert_abs_diff_eq!(camera.camera_to_world.start.rows[2][3], 10.0);
    let CameraKind::Perspective { fov, .. } = &camera.kind else {
        panic!("expected a perspective camera");
    };
    assert_eq!(*fov, 45.0);
}

#[test]
fn second_camera_replaces_the_first() {
    let scene = parse(
        "two-cameras.pbrt",
        "Camera \"perspective\"\nCamera \"orthographic\"\nWorldBegin\nWorldEnd\n",
    );
    assert!(matches!(
        scene.camera.as_ref().unwrap().kind,
        CameraKind::Orthographic { .. }
    ));
}

#[test]
fn named_coordinate_systems_round_trip() {
    let scene = parse(
        "coordsys.pbrt",
        r#"
Translate 1 2 3
CoordinateSystem "spot"
Identity
CoordSysTransform "spot"
WorldBegin
WorldEnd
"#,
    );
    // The camera coordinate system machinery has no observable output
    // here beyond a successful parse.
    assert!(scene.camera.is_some());
}

#[test]
fn world_only_directives_fail_in_preamble() {
    let path = write_temp("gating.pbrt", "Shape \"sphere\"\nWorldBegin\nWorldEnd\n");
    let mut loader = Loader::new();
    assert!(!loader.load(&path));
    let err = loader.error().unwrap();
    assert_eq!(err.line, 1);
    assert!(err.to_string().contains("preamble"));
}

#[test]
fn errors_latch_with_location() {
    let path = write_temp(
        "latch.pbrt",
        "WorldBegin\n  Shape \"sphere\"\n  Bogus\nWorldEnd\n",
    );
    let mut loader = Loader::new();
    assert!(!loader.load(&path));
    let err = loader.error().unwrap();
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 3);
    // The loader stays failed once an error is latched.
    assert!(!loader.load(&path));
    assert!(loader.take_scene().is_none());
}

#[test]
fn include_splices_the_referenced_file() {
    let included = write_temp(
        "included.pbrt",
        "MakeNamedMaterial \"m\" \"string type\" \"matte\"\n",
    );
    let scene = parse(
        "includer.pbrt",
        &format!(
            "WorldBegin\nInclude \"{}\"\nNamedMaterial \"m\"\nShape \"sphere\"\nWorldEnd\n",
            included
        ),
    );
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.shapes[0].material, 0);
}

#[test]
fn unknown_enum_values_take_the_declared_default() {
    // "granite" is not a material type; Material falls back to matte.
    let scene = parse(
        "default-enum.pbrt",
        "WorldBegin\nMaterial \"granite\"\nShape \"sphere\"\nWorldEnd\n",
    );
    assert!(matches!(
        scene.materials[0].kind,
        MaterialKind::Matte(_)
    ));
}

#[test]
fn heterogeneous_medium_validates_density_grid() {
    let path = write_temp(
        "bad-density.pbrt",
        r#"
MakeNamedMedium "smoke" "string type" "heterogeneous"
    "integer nx" 2 "integer ny" 2 "integer nz" 2
    "float density" [1 2 3]
WorldBegin
WorldEnd
"#,
    );
    let mut loader = Loader::new();
    assert!(!loader.load(&path));
}

#[test]
fn triangle_mesh_requires_indices_and_positions() {
    let path = write_temp(
        "mesh-missing.pbrt",
        "WorldBegin\nShape \"trianglemesh\" \"point P\" [0 0 0 1 0 0 0 1 0]\nWorldEnd\n",
    );
    let mut loader = Loader::new();
    assert!(!loader.load(&path));
}

#[test]
fn light_and_shape_counts_accumulate() {
    let scene = parse(
        "counts.pbrt",
        r#"
Sampler "sobol" "integer pixelsamples" 32
Film "image" "integer xresolution" 200 "integer yresolution" 100
WorldBegin
  LightSource "point"
  LightSource "distant"
  Shape "sphere"
  Shape "disk"
  Shape "cylinder"
WorldEnd
"#,
    );

    assert_eq!(scene.lights.len(), 2);
    assert_eq!(scene.shapes.len(), 3);
    assert!(matches!(
        scene.sampler.as_ref().unwrap(),
        Sampler::Sobol { pixelsamples: 32 }
    ));
    let Film::Image {
        xresolution,
        yresolution,
        ..
    } = scene.film.as_ref().unwrap();
    assert_eq!((*xresolution, *yresolution), (200, 100));
    check_handles(&scene);
}
