//! Declarative tables for the directive grammar: one row per directive with
//! its positional-argument pattern and section gating, plus the parameter
//! type declarations. The dispatcher walks these tables instead of
//! hand-rolling per-directive argument parsing.

/// Identifies a directive. The discriminants index nothing; dispatch is by
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementId {
    // Common statements.
    Identity,
    Translate,
    Scale,
    Rotate,
    LookAt,
    CoordinateSystem,
    CoordSysTransform,
    Transform,
    ConcatTransform,
    ActiveTransform,
    MakeNamedMedium,
    MediumInterface,
    Include,
    // World-only statements.
    AttributeBegin,
    AttributeEnd,
    Shape,
    AreaLightSource,
    LightSource,
    Material,
    MakeNamedMaterial,
    NamedMaterial,
    ObjectBegin,
    ObjectEnd,
    ObjectInstance,
    Texture,
    TransformBegin,
    TransformEnd,
    ReverseOrientation,
    WorldEnd,
    // Preamble-only statements.
    Accelerator,
    Camera,
    Film,
    Integrator,
    PixelFilter,
    Sampler,
    TransformTimes,
    WorldBegin,
}

/// One row of the directive table.
///
/// `arg_pattern` encodes the positional arguments: `e` = quoted enum
/// string, `k` = unquoted keyword enum, `f` = float, `s` = quoted string.
/// Unknown enum arguments fall back to the declared default index (-1
/// means there is no sensible default and the handler must cope).
pub struct StatementDeclaration {
    pub id: StatementId,
    pub name: &'static str,
    pub arg_pattern: &'static str,
    pub in_preamble: bool,
    pub in_world: bool,
    pub enum0: Option<&'static [&'static str]>,
    pub enum1: Option<&'static [&'static str]>,
    pub enum0_default: i32,
    pub enum1_default: i32,
}

pub const ACTIVE_TRANSFORM_VALUES: &[&str] = &["StartTime", "EndTime", "All"];
pub const SHAPE_TYPES: &[&str] = &[
    "cone",
    "curve",
    "cylinder",
    "disk",
    "hyperboloid",
    "paraboloid",
    "sphere",
    "trianglemesh",
    "heightfield",
    "loopsubdiv",
    "nurbs",
    "plymesh",
];
pub const AREA_LIGHT_TYPES: &[&str] = &["diffuse"];
pub const LIGHT_TYPES: &[&str] = &[
    "distant",
    "goniometric",
    "infinite",
    "point",
    "projection",
    "spot",
];
pub const MATERIAL_TYPES: &[&str] = &[
    "disney",
    "fourier",
    "glass",
    "hair",
    "kdsubsurface",
    "matte",
    "metal",
    "mirror",
    "mix",
    "none",
    "plastic",
    "substrate",
    "subsurface",
    "translucent",
    "uber",
    "",
];
pub const TEXTURE_DATA_TYPES: &[&str] = &["float", "spectrum", "color"];
// checkerboard appears twice because there are 2D and 3D versions of it;
// the handler disambiguates via the "dimension" parameter.
pub const TEXTURE_TYPES: &[&str] = &[
    "bilerp",
    "checkerboard",
    "checkerboard",
    "constant",
    "dots",
    "fbm",
    "imagemap",
    "marble",
    "mix",
    "scale",
    "uv",
    "windy",
    "wrinkled",
    "ptex",
];
pub const ACCELERATOR_TYPES: &[&str] = &["bvh", "kdtree"];
pub const CAMERA_TYPES: &[&str] = &["perspective", "orthographic", "environment", "realistic"];
pub const FILM_TYPES: &[&str] = &["image"];
pub const INTEGRATOR_TYPES: &[&str] = &[
    "bdpt",
    "directlighting",
    "mlt",
    "path",
    "sppm",
    "whitted",
    "volpath",
    "ambientocclusion",
];
pub const PIXEL_FILTER_TYPES: &[&str] = &["box", "gaussian", "mitchell", "sinc", "triangle"];
pub const SAMPLER_TYPES: &[&str] = &[
    "02sequence",
    "lowdiscrepancy",
    "halton",
    "maxmindist",
    "random",
    "sobol",
    "stratified",
];
pub const MEDIUM_TYPES: &[&str] = &["homogeneous", "heterogeneous"];

pub const LIGHT_SAMPLE_STRATEGIES: &[&str] = &["uniform", "power", "spatial"];
pub const BVH_SPLIT_METHODS: &[&str] = &["sah", "middle", "equal", "hlbvh"];
pub const TEX_COORD_MAPPINGS: &[&str] = &["uv", "spherical", "cylindrical", "planar"];
pub const CHECKERBOARD_AA_MODES: &[&str] = &["closedform", "none"];
pub const WRAP_MODES: &[&str] = &["repeat", "black", "clamp"];
pub const CURVE_BASES: &[&str] = &["bezier", "bspline"];
pub const CURVE_TYPES: &[&str] = &["flat", "ribbon", "cylinder"];

macro_rules! statement {
    ($id:ident, $name:literal, $pattern:literal, $pre:literal, $world:literal) => {
        StatementDeclaration {
            id: StatementId::$id,
            name: $name,
            arg_pattern: $pattern,
            in_preamble: $pre,
            in_world: $world,
            enum0: None,
            enum1: None,
            enum0_default: -1,
            enum1_default: -1,
        }
    };
    ($id:ident, $name:literal, $pattern:literal, $pre:literal, $world:literal, $enum0:expr, $default0:literal) => {
        StatementDeclaration {
            id: StatementId::$id,
            name: $name,
            arg_pattern: $pattern,
            in_preamble: $pre,
            in_world: $world,
            enum0: Some($enum0),
            enum1: None,
            enum0_default: $default0,
            enum1_default: -1,
        }
    };
    ($id:ident, $name:literal, $pattern:literal, $pre:literal, $world:literal, $enum0:expr, $default0:literal, $enum1:expr, $default1:literal) => {
        StatementDeclaration {
            id: StatementId::$id,
            name: $name,
            arg_pattern: $pattern,
            in_preamble: $pre,
            in_world: $world,
            enum0: Some($enum0),
            enum1: Some($enum1),
            enum0_default: $default0,
            enum1_default: $default1,
        }
    };
}

pub static STATEMENTS: &[StatementDeclaration] = &[
    // Common statements, allowed in both the preamble and the world
    // section.
    statement!(Identity, "Identity", "", true, true),
    statement!(Translate, "Translate", "fff", true, true),
    statement!(Scale, "Scale", "fff", true, true),
    statement!(Rotate, "Rotate", "ffff", true, true),
    statement!(LookAt, "LookAt", "fffffffff", true, true),
    statement!(CoordinateSystem, "CoordinateSystem", "s", true, true),
    statement!(CoordSysTransform, "CoordSysTransform", "s", true, true),
    statement!(Transform, "Transform", "ffffffffffffffff", true, true),
    statement!(ConcatTransform, "ConcatTransform", "ffffffffffffffff", true, true),
    // An unrecognized ActiveTransform keyword behaves as "All".
    statement!(ActiveTransform, "ActiveTransform", "k", true, true, ACTIVE_TRANSFORM_VALUES, 2),
    statement!(MakeNamedMedium, "MakeNamedMedium", "s", true, true),
    statement!(MediumInterface, "MediumInterface", "ss", true, true),
    statement!(Include, "Include", "s", true, true),
    // World-only statements.
    statement!(AttributeBegin, "AttributeBegin", "", false, true),
    statement!(AttributeEnd, "AttributeEnd", "", false, true),
    statement!(Shape, "Shape", "e", false, true, SHAPE_TYPES, -1),
    statement!(AreaLightSource, "AreaLightSource", "e", false, true, AREA_LIGHT_TYPES, -1),
    statement!(LightSource, "LightSource", "e", false, true, LIGHT_TYPES, -1),
    statement!(Material, "Material", "e", false, true, MATERIAL_TYPES, 5),
    // Named materials may be declared ahead of WorldBegin so that the
    // world section can reference them immediately.
    statement!(MakeNamedMaterial, "MakeNamedMaterial", "s", true, true),
    statement!(NamedMaterial, "NamedMaterial", "s", false, true),
    statement!(ObjectBegin, "ObjectBegin", "s", false, true),
    statement!(ObjectEnd, "ObjectEnd", "", false, true),
    statement!(ObjectInstance, "ObjectInstance", "s", false, true),
    statement!(Texture, "Texture", "see", false, true, TEXTURE_DATA_TYPES, -1, TEXTURE_TYPES, -1),
    statement!(TransformBegin, "TransformBegin", "", false, true),
    statement!(TransformEnd, "TransformEnd", "", false, true),
    statement!(ReverseOrientation, "ReverseOrientation", "", false, true),
    statement!(WorldEnd, "WorldEnd", "", false, true),
    // Preamble-only statements.
    statement!(Accelerator, "Accelerator", "e", true, false, ACCELERATOR_TYPES, -1),
    statement!(Camera, "Camera", "e", true, false, CAMERA_TYPES, -1),
    statement!(Film, "Film", "e", true, false, FILM_TYPES, -1),
    statement!(Integrator, "Integrator", "e", true, false, INTEGRATOR_TYPES, -1),
    statement!(PixelFilter, "PixelFilter", "e", true, false, PIXEL_FILTER_TYPES, -1),
    statement!(Sampler, "Sampler", "e", true, false, SAMPLER_TYPES, -1),
    statement!(TransformTimes, "TransformTimes", "ff", true, false),
    statement!(WorldBegin, "WorldBegin", "", true, false),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_only_use_known_codes() {
        for statement in STATEMENTS {
            for code in statement.arg_pattern.chars() {
                assert!(
                    matches!(code, 'e' | 'k' | 'f' | 's'),
                    "bad arg code {:?} in {}",
                    code,
                    statement.name
                );
            }
        }
    }

    #[test]
    fn enum_patterns_have_value_lists() {
        for statement in STATEMENTS {
            let enums_needed = statement
                .arg_pattern
                .chars()
                .filter(|c| *c == 'e' || *c == 'k')
                .count();
            let enums_present = statement.enum0.is_some() as usize + statement.enum1.is_some() as usize;
            assert!(
                enums_present >= enums_needed,
                "{} needs {} enum lists",
                statement.name,
                enums_needed
            );
        }
    }

    #[test]
    fn every_directive_is_allowed_somewhere() {
        for statement in STATEMENTS {
            assert!(statement.in_preamble || statement.in_world, "{}", statement.name);
        }
    }
}
