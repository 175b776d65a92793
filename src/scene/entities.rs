//! The typed entities a parsed scene is made of. The file format's class
//! hierarchies map to structs with common fields plus a tagged enum for the
//! per-variant data; back-references between entities are stable [`Index`]
//! handles into the [`super::Scene`]'s vectors, with [`INVALID_INDEX`]
//! meaning "unset".

use crate::math::Transform;
use crate::{Float, Index, INVALID_INDEX};

/// A parameter that may be driven by a float texture. When `texture` is
/// anything other than `INVALID_INDEX` it takes precedence over `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatTex {
    pub texture: Index,
    pub value: Float,
}

impl FloatTex {
    pub fn value(value: Float) -> FloatTex {
        FloatTex {
            texture: INVALID_INDEX,
            value,
        }
    }
}

/// A parameter that may be driven by a spectrum texture. When `texture` is
/// anything other than `INVALID_INDEX` it takes precedence over `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTex {
    pub texture: Index,
    pub value: [Float; 3],
}

impl ColorTex {
    pub fn value(r: Float, g: Float, b: Float) -> ColorTex {
        ColorTex {
            texture: INVALID_INDEX,
            value: [r, g, b],
        }
    }

    pub fn grey(v: Float) -> ColorTex {
        ColorTex::value(v, v, v)
    }
}

//
// Accelerators
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhSplit {
    Sah,
    Middle,
    Equal,
    Hlbvh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Accelerator {
    Bvh {
        maxnodeprims: i32,
        splitmethod: BvhSplit,
    },
    KdTree {
        intersectcost: i32,
        traversalcost: i32,
        emptybonus: Float,
        maxprims: i32,
        maxdepth: i32,
    },
}

impl Default for Accelerator {
    fn default() -> Accelerator {
        Accelerator::Bvh {
            maxnodeprims: 4,
            splitmethod: BvhSplit::Sah,
        }
    }
}

impl Accelerator {
    pub fn default_kd_tree() -> Accelerator {
        Accelerator::KdTree {
            intersectcost: 80,
            traversalcost: 1,
            emptybonus: 0.2,
            maxprims: 1,
            maxdepth: -1,
        }
    }
}

//
// Area lights
//

#[derive(Debug, Clone, PartialEq)]
pub struct AreaLight {
    pub scale: [Float; 3],
    pub kind: AreaLightKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AreaLightKind {
    Diffuse {
        l: [Float; 3],
        twosided: bool,
        samples: i32,
    },
}

impl Default for AreaLight {
    fn default() -> AreaLight {
        AreaLight {
            scale: [1.0, 1.0, 1.0],
            kind: AreaLightKind::Diffuse {
                l: [1.0, 1.0, 1.0],
                twosided: false,
                samples: 1,
            },
        }
    }
}

//
// Cameras
//

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Inverse of the current transform at the `Camera` directive.
    pub camera_to_world: Transform,
    pub shutteropen: Float,
    pub shutterclose: Float,
    pub kind: CameraKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraKind {
    Perspective {
        frameaspectratio: Float,
        screenwindow: [Float; 4],
        lensradius: Float,
        focaldistance: Float,
        fov: Float,
        halffov: Float,
    },
    Orthographic {
        frameaspectratio: Float,
        screenwindow: [Float; 4],
        lensradius: Float,
        focaldistance: Float,
    },
    Environment {
        frameaspectratio: Float,
        screenwindow: [Float; 4],
    },
    Realistic {
        lensfile: String,
        aperturediameter: Float,
        focusdistance: Float,
        simpleweighting: bool,
    },
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            camera_to_world: Transform::IDENTITY,
            shutteropen: 0.0,
            shutterclose: 1.0,
            kind: CameraKind::default_perspective(),
        }
    }
}

impl CameraKind {
    pub fn default_perspective() -> CameraKind {
        CameraKind::Perspective {
            // Zero or less means "compute from the film resolution".
            frameaspectratio: 0.0,
            screenwindow: [0.0, 0.0, 0.0, 0.0],
            lensradius: 0.0,
            focaldistance: 1e30,
            fov: 90.0,
            halffov: 45.0,
        }
    }

    pub fn default_orthographic() -> CameraKind {
        CameraKind::Orthographic {
            frameaspectratio: 1.0,
            screenwindow: [-1.0, 1.0, -1.0, 1.0],
            lensradius: 0.0,
            focaldistance: 1e30,
        }
    }

    pub fn default_environment() -> CameraKind {
        CameraKind::Environment {
            frameaspectratio: 1.0,
            screenwindow: [-1.0, 1.0, -1.0, 1.0],
        }
    }

    pub fn default_realistic() -> CameraKind {
        CameraKind::Realistic {
            lensfile: String::new(),
            aperturediameter: 1.0,
            focusdistance: 10.0,
            simpleweighting: true,
        }
    }
}

//
// Films
//

#[derive(Debug, Clone, PartialEq)]
pub enum Film {
    Image {
        xresolution: i32,
        yresolution: i32,
        cropwindow: [Float; 4],
        scale: Float,
        maxsampleluminance: Float,
        /// Film diagonal, in millimetres.
        diagonal: Float,
        filename: String,
    },
}

impl Default for Film {
    fn default() -> Film {
        Film::Image {
            xresolution: 640,
            yresolution: 480,
            cropwindow: [0.0, 1.0, 0.0, 1.0],
            scale: 1.0,
            maxsampleluminance: Float::INFINITY,
            diagonal: 35.0,
            filename: "pbrt.exr".to_string(),
        }
    }
}

impl Film {
    pub fn resolution(&self) -> (i32, i32) {
        match *self {
            Film::Image {
                xresolution,
                yresolution,
                ..
            } => (xresolution, yresolution),
        }
    }
}

//
// Filters
//

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub xwidth: Float,
    pub ywidth: Float,
    pub kind: FilterKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Box,
    Gaussian { alpha: Float },
    Mitchell { b: Float, c: Float },
    Sinc { tau: Float },
    Triangle,
}

impl Default for Filter {
    fn default() -> Filter {
        // The box filter is the only one whose default widths differ from
        // the common 2.0.
        Filter {
            xwidth: 0.5,
            ywidth: 0.5,
            kind: FilterKind::Box,
        }
    }
}

impl Filter {
    /// Default widths before any `xwidth`/`ywidth` parameter applies.
    pub fn default_widths(kind: &FilterKind) -> (Float, Float) {
        match kind {
            FilterKind::Box => (0.5, 0.5),
            FilterKind::Sinc { .. } => (4.0, 4.0),
            _ => (2.0, 2.0),
        }
    }
}

//
// Integrators
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSampleStrategy {
    Uniform,
    Power,
    Spatial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Integrator {
    Bdpt {
        maxdepth: i32,
        pixelbounds: [i32; 4],
        lightsamplestrategy: LightSampleStrategy,
        visualizestrategies: bool,
        visualizeweights: bool,
    },
    DirectLighting {
        strategy: LightSampleStrategy,
        maxdepth: i32,
        pixelbounds: [i32; 4],
    },
    Mlt {
        maxdepth: i32,
        bootstrapsamples: i32,
        chains: i32,
        mutationsperpixel: i32,
        largestepprobability: Float,
        sigma: Float,
    },
    Path {
        maxdepth: i32,
        pixelbounds: [i32; 4],
        rrthreshold: Float,
        lightsamplestrategy: LightSampleStrategy,
    },
    Sppm {
        maxdepth: i32,
        maxiterations: i32,
        photonsperiteration: i32,
        imagewritefrequency: i32,
        radius: Float,
    },
    Whitted {
        maxdepth: i32,
        pixelbounds: [i32; 4],
    },
    VolPath {
        maxdepth: i32,
        pixelbounds: [i32; 4],
        rrthreshold: Float,
    },
    Ao {
        pixelbounds: [i32; 4],
        cossample: bool,
        nsamples: i32,
    },
}

/// "Whole image" sentinel used by integrator pixel bounds.
pub const WHOLE_IMAGE: [i32; 4] = [0, -1, 0, -1];

impl Default for Integrator {
    fn default() -> Integrator {
        Integrator::Path {
            maxdepth: 5,
            pixelbounds: WHOLE_IMAGE,
            rrthreshold: 1.0,
            lightsamplestrategy: LightSampleStrategy::Spatial,
        }
    }
}

//
// Samplers
//

#[derive(Debug, Clone, PartialEq)]
pub enum Sampler {
    /// `lowdiscrepancy` is an alias kept for backwards compatibility; the
    /// flag records which name the file used.
    ZeroTwoSequence {
        pixelsamples: i32,
        legacy_name: bool,
    },
    Halton {
        pixelsamples: i32,
    },
    MaxMinDist {
        pixelsamples: i32,
    },
    Random {
        pixelsamples: i32,
    },
    Sobol {
        pixelsamples: i32,
    },
    Stratified {
        jitter: bool,
        xsamples: i32,
        ysamples: i32,
    },
}

impl Default for Sampler {
    fn default() -> Sampler {
        Sampler::Halton { pixelsamples: 16 }
    }
}

//
// Lights
//

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub light_to_world: Transform,
    pub scale: [Float; 3],
    pub kind: LightKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Distant {
        l: [Float; 3],
        from: [Float; 3],
        to: [Float; 3],
    },
    Goniometric {
        i: [Float; 3],
        mapname: String,
    },
    Infinite {
        l: [Float; 3],
        samples: i32,
        mapname: String,
    },
    Point {
        i: [Float; 3],
        from: [Float; 3],
    },
    Projection {
        i: [Float; 3],
        fov: Float,
        mapname: String,
    },
    Spot {
        i: [Float; 3],
        from: [Float; 3],
        to: [Float; 3],
        coneangle: Float,
        conedeltaangle: Float,
    },
}

//
// Materials
//

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Set by `MakeNamedMaterial`; anonymous materials (from `Material`
    /// directives or shape-level overrides) have no name.
    pub name: Option<String>,
    pub bumpmap: Index,
    pub kind: MaterialKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    Disney(DisneyMaterial),
    Fourier(FourierMaterial),
    Glass(GlassMaterial),
    Hair(HairMaterial),
    KdSubsurface(KdSubsurfaceMaterial),
    Matte(MatteMaterial),
    Metal(MetalMaterial),
    Mirror(MirrorMaterial),
    Mix(MixMaterial),
    None,
    Plastic(PlasticMaterial),
    Substrate(SubstrateMaterial),
    Subsurface(SubsurfaceMaterial),
    Translucent(TranslucentMaterial),
    Uber(UberMaterial),
}

impl Material {
    pub fn anonymous(kind: MaterialKind) -> Material {
        Material {
            name: None,
            bumpmap: INVALID_INDEX,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisneyMaterial {
    pub color: ColorTex,
    pub anisotropic: FloatTex,
    pub clearcoat: FloatTex,
    pub clearcoatgloss: FloatTex,
    pub eta: FloatTex,
    pub metallic: FloatTex,
    pub roughness: FloatTex,
    pub scatterdistance: ColorTex,
    pub sheen: FloatTex,
    pub sheentint: FloatTex,
    pub spectrans: FloatTex,
    pub speculartint: FloatTex,
    pub thin: bool,
    /// Only used when `thin` is true.
    pub difftrans: ColorTex,
    /// Only used when `thin` is true.
    pub flatness: ColorTex,
}

impl Default for DisneyMaterial {
    fn default() -> DisneyMaterial {
        DisneyMaterial {
            color: ColorTex::grey(0.5),
            anisotropic: FloatTex::value(0.0),
            clearcoat: FloatTex::value(0.0),
            clearcoatgloss: FloatTex::value(1.0),
            eta: FloatTex::value(1.5),
            metallic: FloatTex::value(0.0),
            roughness: FloatTex::value(0.5),
            scatterdistance: ColorTex::grey(0.0),
            sheen: FloatTex::value(0.0),
            sheentint: FloatTex::value(0.5),
            spectrans: FloatTex::value(0.0),
            speculartint: FloatTex::value(0.0),
            thin: false,
            difftrans: ColorTex::grey(1.0),
            flatness: ColorTex::grey(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FourierMaterial {
    pub bsdffile: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlassMaterial {
    pub kr: ColorTex,
    pub kt: ColorTex,
    pub eta: FloatTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for GlassMaterial {
    fn default() -> GlassMaterial {
        GlassMaterial {
            kr: ColorTex::grey(1.0),
            kt: ColorTex::grey(1.0),
            eta: FloatTex::value(1.5),
            uroughness: FloatTex::value(0.0),
            vroughness: FloatTex::value(0.0),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HairMaterial {
    pub sigma_a: ColorTex,
    pub color: ColorTex,
    pub eumelanin: FloatTex,
    pub pheomelanin: FloatTex,
    pub eta: FloatTex,
    pub beta_m: FloatTex,
    pub beta_n: FloatTex,
    pub alpha: FloatTex,
    pub has_sigma_a: bool,
    pub has_color: bool,
}

impl Default for HairMaterial {
    fn default() -> HairMaterial {
        HairMaterial {
            sigma_a: ColorTex::grey(0.0),
            color: ColorTex::grey(0.0),
            eumelanin: FloatTex::value(1.3),
            pheomelanin: FloatTex::value(0.0),
            eta: FloatTex::value(1.55),
            beta_m: FloatTex::value(0.3),
            beta_n: FloatTex::value(0.3),
            alpha: FloatTex::value(2.0),
            has_sigma_a: false,
            has_color: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KdSubsurfaceMaterial {
    pub kd: ColorTex,
    pub mfp: ColorTex,
    pub eta: FloatTex,
    pub kr: ColorTex,
    pub kt: ColorTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for KdSubsurfaceMaterial {
    fn default() -> KdSubsurfaceMaterial {
        KdSubsurfaceMaterial {
            kd: ColorTex::grey(0.5),
            mfp: ColorTex::grey(0.5),
            eta: FloatTex::value(1.3),
            kr: ColorTex::grey(1.0),
            kt: ColorTex::grey(1.0),
            uroughness: FloatTex::value(0.0),
            vroughness: FloatTex::value(0.0),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatteMaterial {
    pub kd: ColorTex,
    pub sigma: FloatTex,
}

impl Default for MatteMaterial {
    fn default() -> MatteMaterial {
        MatteMaterial {
            kd: ColorTex::grey(0.5),
            sigma: FloatTex::value(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetalMaterial {
    pub eta: ColorTex,
    pub k: ColorTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for MetalMaterial {
    fn default() -> MetalMaterial {
        MetalMaterial {
            eta: ColorTex::grey(0.5),
            k: ColorTex::grey(0.5),
            uroughness: FloatTex::value(0.01),
            vroughness: FloatTex::value(0.01),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorMaterial {
    pub kr: ColorTex,
}

impl Default for MirrorMaterial {
    fn default() -> MirrorMaterial {
        MirrorMaterial {
            kr: ColorTex::grey(0.9),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixMaterial {
    pub amount: ColorTex,
    pub namedmaterial1: Index,
    pub namedmaterial2: Index,
}

impl Default for MixMaterial {
    fn default() -> MixMaterial {
        MixMaterial {
            amount: ColorTex::grey(0.5),
            namedmaterial1: INVALID_INDEX,
            namedmaterial2: INVALID_INDEX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlasticMaterial {
    pub kd: ColorTex,
    pub ks: ColorTex,
    pub roughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for PlasticMaterial {
    fn default() -> PlasticMaterial {
        PlasticMaterial {
            kd: ColorTex::grey(0.25),
            ks: ColorTex::grey(0.25),
            roughness: FloatTex::value(0.1),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstrateMaterial {
    pub kd: ColorTex,
    pub ks: ColorTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for SubstrateMaterial {
    fn default() -> SubstrateMaterial {
        SubstrateMaterial {
            kd: ColorTex::grey(0.5),
            ks: ColorTex::grey(0.5),
            uroughness: FloatTex::value(0.1),
            vroughness: FloatTex::value(0.1),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubsurfaceMaterial {
    /// Name of a set of measured scattering coefficients.
    pub coefficients: Option<String>,
    pub sigma_a: ColorTex,
    pub sigma_prime_s: ColorTex,
    pub scale: Float,
    pub eta: FloatTex,
    pub kr: ColorTex,
    pub kt: ColorTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for SubsurfaceMaterial {
    fn default() -> SubsurfaceMaterial {
        SubsurfaceMaterial {
            coefficients: None,
            sigma_a: ColorTex::value(0.0011, 0.0024, 0.014),
            sigma_prime_s: ColorTex::value(2.55, 3.12, 3.77),
            scale: 1.0,
            eta: FloatTex::value(1.33),
            kr: ColorTex::grey(1.0),
            kt: ColorTex::grey(1.0),
            uroughness: FloatTex::value(0.0),
            vroughness: FloatTex::value(0.0),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslucentMaterial {
    pub kd: ColorTex,
    pub ks: ColorTex,
    pub reflect: ColorTex,
    pub transmit: ColorTex,
    pub roughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for TranslucentMaterial {
    fn default() -> TranslucentMaterial {
        TranslucentMaterial {
            kd: ColorTex::grey(0.25),
            ks: ColorTex::grey(0.25),
            reflect: ColorTex::grey(0.5),
            transmit: ColorTex::grey(0.5),
            roughness: FloatTex::value(0.1),
            remaproughness: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UberMaterial {
    pub kd: ColorTex,
    pub ks: ColorTex,
    pub kr: ColorTex,
    pub kt: ColorTex,
    pub eta: FloatTex,
    pub opacity: ColorTex,
    pub uroughness: FloatTex,
    pub vroughness: FloatTex,
    pub remaproughness: bool,
}

impl Default for UberMaterial {
    fn default() -> UberMaterial {
        UberMaterial {
            kd: ColorTex::grey(0.25),
            ks: ColorTex::grey(0.25),
            kr: ColorTex::grey(0.0),
            kt: ColorTex::grey(0.0),
            eta: FloatTex::value(1.5),
            opacity: ColorTex::grey(1.0),
            uroughness: FloatTex::value(0.1),
            vroughness: FloatTex::value(0.1),
            remaproughness: true,
        }
    }
}

//
// Media
//

#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    pub name: String,
    pub sigma_a: [Float; 3],
    pub sigma_s: [Float; 3],
    pub preset: Option<String>,
    pub g: Float,
    pub scale: Float,
    pub kind: MediumKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediumKind {
    Homogeneous,
    Heterogeneous {
        p0: [Float; 3],
        p1: [Float; 3],
        nx: i32,
        ny: i32,
        nz: i32,
        density: Vec<Float>,
    },
}

impl Medium {
    pub fn new(name: &str, kind: MediumKind) -> Medium {
        Medium {
            name: name.to_string(),
            sigma_a: [0.0011, 0.0024, 0.0014],
            sigma_s: [2.55, 3.21, 3.77],
            preset: None,
            g: 0.0,
            scale: 1.0,
            kind,
        }
    }
}

//
// Textures
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureData {
    Float,
    Spectrum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexCoordMapping {
    Uv,
    Spherical,
    Cylindrical,
    Planar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Black,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerboardAaMode {
    ClosedForm,
    None,
}

/// The 2D mapping fields shared by every 2D texture variant.
#[derive(Debug, Clone, PartialEq)]
pub struct UvMapping {
    pub mapping: TexCoordMapping,
    pub uscale: Float,
    pub vscale: Float,
    pub udelta: Float,
    pub vdelta: Float,
    pub v1: [Float; 3],
    pub v2: [Float; 3],
}

impl Default for UvMapping {
    fn default() -> UvMapping {
        UvMapping {
            mapping: TexCoordMapping::Uv,
            uscale: 1.0,
            vscale: 1.0,
            udelta: 0.0,
            vdelta: 0.0,
            v1: [1.0, 0.0, 0.0],
            v2: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    /// Float and spectrum textures occupy disjoint name-resolution pools.
    pub data_type: TextureData,
    pub kind: TextureKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureKind {
    Bilerp {
        uv: UvMapping,
        v00: ColorTex,
        v01: ColorTex,
        v10: ColorTex,
        v11: ColorTex,
    },
    Checkerboard2D {
        uv: UvMapping,
        tex1: ColorTex,
        tex2: ColorTex,
        aamode: CheckerboardAaMode,
    },
    Checkerboard3D {
        object_to_texture: Transform,
        tex1: ColorTex,
        tex2: ColorTex,
    },
    Constant {
        value: [Float; 3],
    },
    Dots {
        uv: UvMapping,
        inside: ColorTex,
        outside: ColorTex,
    },
    Fbm {
        object_to_texture: Transform,
        octaves: i32,
        roughness: Float,
    },
    ImageMap {
        uv: UvMapping,
        filename: String,
        wrap: WrapMode,
        maxanisotropy: Float,
        trilinear: bool,
        scale: Float,
        gamma: bool,
    },
    Marble {
        object_to_texture: Transform,
        octaves: i32,
        roughness: Float,
        scale: Float,
        variation: Float,
    },
    Mix {
        tex1: ColorTex,
        tex2: ColorTex,
        amount: FloatTex,
    },
    Scale {
        tex1: ColorTex,
        tex2: ColorTex,
    },
    Uv {
        uv: UvMapping,
    },
    Windy {
        object_to_texture: Transform,
    },
    Wrinkled {
        object_to_texture: Transform,
        octaves: i32,
        roughness: Float,
    },
    Ptex {
        uv: UvMapping,
        filename: String,
        gamma: Float,
    },
}

//
// Shapes
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Cone,
    Curve,
    Cylinder,
    Disk,
    Hyperboloid,
    Paraboloid,
    Sphere,
    TriangleMesh,
    HeightField,
    LoopSubdiv,
    Nurbs,
    PlyMesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// If the shape is part of an object this is the shape-to-object
    /// transform instead.
    pub shape_to_world: Transform,
    pub material: Index,
    pub area_light: Index,
    pub inside_medium: Index,
    pub outside_medium: Index,
    /// The object this shape belongs to, or `INVALID_INDEX`.
    pub object: Index,
    pub reverse_orientation: bool,
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Cone(Cone),
    Curve(Curve),
    Cylinder(Cylinder),
    Disk(Disk),
    Hyperboloid(Hyperboloid),
    Paraboloid(Paraboloid),
    Sphere(Sphere),
    TriangleMesh(TriangleMesh),
    HeightField(HeightField),
    LoopSubdiv(LoopSubdiv),
    Nurbs(Nurbs),
    PlyMesh(PlyMesh),
}

impl ShapeKind {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Cone(_) => ShapeType::Cone,
            ShapeKind::Curve(_) => ShapeType::Curve,
            ShapeKind::Cylinder(_) => ShapeType::Cylinder,
            ShapeKind::Disk(_) => ShapeType::Disk,
            ShapeKind::Hyperboloid(_) => ShapeType::Hyperboloid,
            ShapeKind::Paraboloid(_) => ShapeType::Paraboloid,
            ShapeKind::Sphere(_) => ShapeType::Sphere,
            ShapeKind::TriangleMesh(_) => ShapeType::TriangleMesh,
            ShapeKind::HeightField(_) => ShapeType::HeightField,
            ShapeKind::LoopSubdiv(_) => ShapeType::LoopSubdiv,
            ShapeKind::Nurbs(_) => ShapeType::Nurbs,
            ShapeKind::PlyMesh(_) => ShapeType::PlyMesh,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    pub radius: Float,
    pub height: Float,
    pub phimax: Float,
}

impl Default for Cone {
    fn default() -> Cone {
        Cone {
            radius: 1.0,
            height: 1.0,
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveBasis {
    Bezier,
    BSpline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    Flat,
    Ribbon,
    Cylinder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub basis: CurveBasis,
    pub degree: u32,
    pub curvetype: CurveType,
    /// Control points, three floats per point.
    pub p: Vec<Float>,
    pub num_segments: u32,
    /// Normals at segment boundaries; only used for ribbon curves, where
    /// there must be exactly `num_segments + 1` of them.
    pub n: Vec<Float>,
    pub width0: Float,
    pub width1: Float,
    pub splitdepth: i32,
}

impl Default for Curve {
    fn default() -> Curve {
        Curve {
            basis: CurveBasis::Bezier,
            degree: 3,
            curvetype: CurveType::Flat,
            p: Vec::new(),
            num_segments: 0,
            n: Vec::new(),
            width0: 1.0,
            width1: 1.0,
            splitdepth: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    pub radius: Float,
    pub zmin: Float,
    pub zmax: Float,
    pub phimax: Float,
}

impl Default for Cylinder {
    fn default() -> Cylinder {
        Cylinder {
            radius: 1.0,
            zmin: -1.0,
            zmax: 1.0,
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disk {
    pub height: Float,
    pub radius: Float,
    pub innerradius: Float,
    pub phimax: Float,
}

impl Default for Disk {
    fn default() -> Disk {
        Disk {
            height: 0.0,
            radius: 1.0,
            innerradius: 0.0,
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeightField {
    pub nu: i32,
    pub nv: i32,
    pub pz: Vec<Float>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hyperboloid {
    pub p1: [Float; 3],
    pub p2: [Float; 3],
    pub phimax: Float,
}

impl Default for Hyperboloid {
    fn default() -> Hyperboloid {
        Hyperboloid {
            p1: [0.0, 0.0, 0.0],
            p2: [1.0, 1.0, 1.0],
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopSubdiv {
    pub levels: i32,
    pub indices: Vec<i32>,
    /// Control points, three floats per point.
    pub p: Vec<Float>,
}

impl Default for LoopSubdiv {
    fn default() -> LoopSubdiv {
        LoopSubdiv {
            levels: 3,
            indices: Vec::new(),
            p: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Nurbs {
    pub nu: i32,
    pub nv: i32,
    pub uorder: i32,
    pub vorder: i32,
    /// `nu + uorder` knots.
    pub uknots: Vec<Float>,
    /// `nv + vorder` knots.
    pub vknots: Vec<Float>,
    pub u0: Float,
    pub v0: Float,
    pub u1: Float,
    pub v1: Float,
    /// `nu * nv` unweighted control points, three floats each. Empty when
    /// `pw` is used instead.
    pub p: Vec<Float>,
    /// `nu * nv` weighted control points, four floats each.
    pub pw: Vec<Float>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paraboloid {
    pub radius: Float,
    pub zmin: Float,
    pub zmax: Float,
    pub phimax: Float,
}

impl Default for Paraboloid {
    fn default() -> Paraboloid {
        Paraboloid {
            radius: 1.0,
            zmin: 0.0,
            zmax: 1.0,
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub radius: Float,
    pub zmin: Float,
    pub zmax: Float,
    pub phimax: Float,
}

impl Default for Sphere {
    fn default() -> Sphere {
        // zmin/zmax get clamped to -radius/+radius once the radius is
        // known.
        Sphere {
            radius: 1.0,
            zmin: -1.0,
            zmax: 1.0,
            phimax: 360.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleMesh {
    pub indices: Vec<i32>,
    /// Vertex positions, three floats per vertex.
    pub p: Vec<Float>,
    /// Vertex normals; empty or `3 * num_vertices` floats.
    pub n: Vec<Float>,
    /// Vertex tangents; empty or `3 * num_vertices` floats.
    pub s: Vec<Float>,
    /// Texture coordinates; empty or `2 * num_vertices` floats.
    pub uv: Vec<Float>,
    pub num_vertices: u32,
    pub alpha: Index,
    pub shadowalpha: Index,
}

impl TriangleMesh {
    pub fn num_indices(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn num_triangles(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlyMesh {
    pub filename: String,
    pub alpha: Index,
    pub shadowalpha: Index,
}

//
// Object instancing
//

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub object_to_instance: Transform,
    /// Shapes belonging to this object occupy the contiguous range
    /// `[first_shape, first_shape + num_shapes)` of the scene's shape
    /// vector.
    pub first_shape: Index,
    pub num_shapes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub instance_to_world: Transform,
    pub object: Index,
    pub material: Index,
    pub area_light: Index,
    pub inside_medium: Index,
    pub outside_medium: Index,
    pub reverse_orientation: bool,
}
