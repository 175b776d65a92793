//! The directive dispatcher and scene-builder handlers. `Parser` drives the
//! tokenizer one statement at a time: positional arguments are parsed
//! against the statement's declared pattern, parameter blocks are collected
//! into the scratch list, and the per-directive handler constructs scene
//! entities from them.

use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::math::{Mat4, TransformStack};
use crate::options::Options;
use crate::scene::entities::*;
use crate::scene::Scene;
use crate::{Float, Index, INVALID_INDEX};

use super::attributes::AttributeStack;
use super::directives::*;
use super::params::{ParamList, ParamType, ParsedParam, PARAM_TYPES};
use super::tokenizer::{resolve_file, Tokenizer};

/// Loads PBRT v3 scene files. The first error encountered is latched; once
/// set, further `load` calls fail without touching the scene.
#[derive(Default)]
pub struct Loader {
    options: Options,
    scene: Option<Scene>,
    error: Option<Error>,
}

impl Loader {
    pub fn new() -> Loader {
        Loader::default()
    }

    pub fn with_options(options: Options) -> Loader {
        Loader {
            options,
            scene: None,
            error: None,
        }
    }

    /// Parses `filename` into a scene. Returns false on failure; the
    /// latched error is available through [`Loader::error`].
    pub fn load(&mut self, filename: &str) -> bool {
        if self.error.is_some() {
            return false;
        }
        match parse_file(filename, &self.options) {
            Ok(scene) => {
                self.scene = Some(scene);
                true
            }
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn take_scene(&mut self) -> Option<Scene> {
        self.scene.take()
    }

    pub fn borrow_scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }
}

/// One-shot parse with default options.
pub fn load_scene(filename: &str) -> Result<Scene> {
    parse_file(filename, &Options::default())
}

fn parse_file(filename: &str, options: &Options) -> Result<Scene> {
    let tokenizer = Tokenizer::open(filename, options)?;
    let mut parser = Parser::new(tokenizer);
    parser.parse()?;
    Ok(parser.scene)
}

enum Arg {
    Enum(i32),
    Float(Float),
    Str(String),
}

struct Parser {
    tokenizer: Tokenizer,
    transforms: TransformStack,
    attributes: AttributeStack,
    args: Vec<Arg>,
    params: ParamList,
    scene: Scene,
    in_world: bool,
    active_object: Index,
    first_object_shape: Index,
}

impl Parser {
    fn new(tokenizer: Tokenizer) -> Parser {
        Parser {
            tokenizer,
            transforms: TransformStack::new(),
            attributes: AttributeStack::new(),
            args: Vec::new(),
            params: ParamList::default(),
            scene: Scene::new(),
            in_world: false,
            active_object: INVALID_INDEX,
            first_object_shape: 0,
        }
    }

    fn parse(&mut self) -> Result<()> {
        crate::color::spectrum::force_init();
        while self.tokenizer.advance()? {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn error(&mut self, kind: ErrorKind) -> Error {
        self.tokenizer.error(kind)
    }

    //
    // Statement-level parsing
    //

    fn parse_statement(&mut self) -> Result<()> {
        let statement = match STATEMENTS
            .iter()
            .find(|s| self.tokenizer.match_keyword(s.name))
        {
            Some(statement) => statement,
            None => return Err(self.error(ErrorKind::UnknownDirective)),
        };

        let allowed = if self.in_world {
            statement.in_world
        } else {
            statement.in_preamble
        };
        if !allowed {
            let section = if self.in_world { "world" } else { "preamble" };
            return Err(self.error(ErrorKind::DirectiveNotAllowed(statement.name, section)));
        }

        self.parse_args(statement)?;
        self.parse_params()?;

        match statement.id {
            StatementId::Identity => self.transforms.identity(),
            StatementId::Translate => {
                let v = self.float_args::<3>();
                self.transforms.translate(v);
            }
            StatementId::Scale => {
                let v = self.float_args::<3>();
                self.transforms.scale(v);
            }
            StatementId::Rotate => {
                let v = self.float_args::<4>();
                self.transforms.rotate(v[0], [v[1], v[2], v[3]]);
            }
            StatementId::LookAt => {
                let v = self.float_args::<9>();
                self.transforms.look_at(
                    [v[0], v[1], v[2]],
                    [v[3], v[4], v[5]],
                    [v[6], v[7], v[8]],
                );
            }
            StatementId::CoordinateSystem => {
                let name = self.string_arg(0).to_string();
                self.transforms.coordinate_system(&name);
            }
            StatementId::CoordSysTransform => {
                let name = self.string_arg(0).to_string();
                if !self.transforms.coord_sys_transform(&name) {
                    return Err(self.error(ErrorKind::UnknownCoordinateSystem(name)));
                }
            }
            // Matrices arrive column-major in the file; the in-memory
            // representation is row-major throughout.
            StatementId::Transform => {
                let m = Mat4::from_columns(self.float_args::<16>());
                self.transforms.transform(m);
            }
            StatementId::ConcatTransform => {
                let m = Mat4::from_columns(self.float_args::<16>());
                self.transforms.concat_transform(m);
            }
            StatementId::ActiveTransform => {
                self.transforms.active = match self.enum_arg(0) {
                    0 => [true, false],
                    1 => [false, true],
                    _ => [true, true],
                };
            }
            StatementId::MakeNamedMedium => self.parse_make_named_medium()?,
            StatementId::MediumInterface => self.parse_medium_interface(),
            StatementId::Include => {
                let path = self.string_arg(0).to_string();
                self.tokenizer.push_file(&path, false)?;
            }
            StatementId::AttributeBegin => {
                if !self.transforms.push() {
                    return Err(self.error(ErrorKind::TransformStackOverflow));
                }
                if !self.attributes.push() {
                    return Err(self.error(ErrorKind::AttributeStackOverflow));
                }
            }
            StatementId::AttributeEnd => {
                if !self.attributes.pop() {
                    return Err(self.error(ErrorKind::AttributeStackUnderflow));
                }
                if !self.transforms.pop() {
                    return Err(self.error(ErrorKind::TransformStackUnderflow));
                }
            }
            StatementId::Shape => self.parse_shape()?,
            StatementId::AreaLightSource => self.parse_area_light_source()?,
            StatementId::LightSource => self.parse_light_source()?,
            StatementId::Material => self.parse_material()?,
            StatementId::MakeNamedMaterial => self.parse_make_named_material()?,
            StatementId::NamedMaterial => {
                let name = self.string_arg(0).to_string();
                let material = self.find_material(&name);
                if material == INVALID_INDEX {
                    warn!("material '{}' is not defined here", name);
                }
                self.attributes.top_mut().active_material = material;
            }
            StatementId::ObjectBegin => self.parse_object_begin()?,
            StatementId::ObjectEnd => self.parse_object_end()?,
            StatementId::ObjectInstance => self.parse_object_instance()?,
            StatementId::Texture => self.parse_texture()?,
            StatementId::TransformBegin => {
                if !self.transforms.push() {
                    return Err(self.error(ErrorKind::TransformStackOverflow));
                }
            }
            StatementId::TransformEnd => {
                if !self.transforms.pop() {
                    return Err(self.error(ErrorKind::TransformStackUnderflow));
                }
            }
            StatementId::ReverseOrientation => {
                let top = self.attributes.top_mut();
                top.reverse_orientation = !top.reverse_orientation;
            }
            StatementId::WorldEnd => self.in_world = false,
            StatementId::Accelerator => self.parse_accelerator()?,
            StatementId::Camera => self.parse_camera()?,
            StatementId::Film => self.parse_film()?,
            StatementId::Integrator => self.parse_integrator()?,
            StatementId::PixelFilter => self.parse_pixel_filter()?,
            StatementId::Sampler => self.parse_sampler()?,
            StatementId::TransformTimes => {
                self.scene.start_time = self.float_arg(0);
                self.scene.end_time = self.float_arg(1);
            }
            StatementId::WorldBegin => {
                self.in_world = true;
                self.transforms.clear();
                self.attributes.clear();
                self.supply_default_singletons();
            }
        }

        Ok(())
    }

    /// Any preamble component the file never configured gets its default
    /// when the world section opens.
    fn supply_default_singletons(&mut self) {
        self.scene.film.get_or_insert_with(Film::default);
        self.scene.sampler.get_or_insert_with(Sampler::default);
        self.scene.camera.get_or_insert_with(Camera::default);
        self.scene.integrator.get_or_insert_with(Integrator::default);
        self.scene.filter.get_or_insert_with(Filter::default);
        self.scene.accelerator.get_or_insert_with(Accelerator::default);
    }

    fn parse_args(&mut self, statement: &StatementDeclaration) -> Result<()> {
        self.args.clear();

        let mut parsed_enum = false;
        let bracketed = self.tokenizer.advance()? && self.tokenizer.match_symbol("[");

        for code in statement.arg_pattern.chars() {
            if !self.tokenizer.advance()? {
                return Err(self.error(ErrorKind::InvalidArguments(statement.name)));
            }

            match code {
                'e' => {
                    let values = if parsed_enum {
                        statement.enum1
                    } else {
                        statement.enum0
                    }
                    .expect("enum arg without a value list");
                    let index = match self.tokenizer.which_string_literal(values)? {
                        Some(i) => i as i32,
                        None => {
                            if parsed_enum {
                                statement.enum1_default
                            } else {
                                statement.enum0_default
                            }
                        }
                    };
                    parsed_enum = true;
                    self.args.push(Arg::Enum(index));
                }
                'k' => {
                    let values = if parsed_enum {
                        statement.enum1
                    } else {
                        statement.enum0
                    }
                    .expect("keyword arg without a value list");
                    let index = match self.tokenizer.which_keyword(values) {
                        Some(i) => i as i32,
                        None => {
                            // Consume the unrecognized keyword and fall
                            // back to the default.
                            let _ = self.tokenizer.identifier();
                            if parsed_enum {
                                statement.enum1_default
                            } else {
                                statement.enum0_default
                            }
                        }
                    };
                    parsed_enum = true;
                    self.args.push(Arg::Enum(index));
                }
                'f' => match self.tokenizer.float_literal() {
                    Some(v) => self.args.push(Arg::Float(v)),
                    None => {
                        return Err(self.error(ErrorKind::InvalidArguments(statement.name)));
                    }
                },
                's' => match self.tokenizer.string_literal()? {
                    Some(s) => self.args.push(Arg::Str(s)),
                    None => {
                        return Err(self.error(ErrorKind::InvalidArguments(statement.name)));
                    }
                },
                _ => unreachable!("invalid arg pattern code"),
            }
        }

        if bracketed && !(self.tokenizer.advance()? && self.tokenizer.match_symbol("]")) {
            return Err(self.error(ErrorKind::InvalidArguments(statement.name)));
        }

        Ok(())
    }

    fn enum_arg(&self, index: usize) -> i32 {
        match self.args[index] {
            Arg::Enum(v) => v,
            _ => panic!("positional arg {} is not an enum", index),
        }
    }

    fn float_arg(&self, index: usize) -> Float {
        match self.args[index] {
            Arg::Float(v) => v,
            _ => panic!("positional arg {} is not a float", index),
        }
    }

    fn string_arg(&self, index: usize) -> &str {
        match &self.args[index] {
            Arg::Str(s) => s,
            _ => panic!("positional arg {} is not a string", index),
        }
    }

    fn float_args<const N: usize>(&self) -> [Float; N] {
        std::array::from_fn(|i| self.float_arg(i))
    }

    //
    // Parameter-block parsing
    //

    fn parse_params(&mut self) -> Result<()> {
        self.params.clear();
        while self.tokenizer.advance()? {
            if !self.tokenizer.match_symbol("\"") {
                break;
            }
            self.parse_param()?;
        }
        Ok(())
    }

    fn parse_param(&mut self) -> Result<()> {
        if !self.tokenizer.match_symbol("\"") || !self.tokenizer.advance()? {
            return Err(self.error(ErrorKind::InvalidParameter));
        }

        let type_index = match (0..PARAM_TYPES.len()).find(|&i| {
            let decl = &PARAM_TYPES[i];
            self.tokenizer.match_keyword(decl.name)
                || decl
                    .alias
                    .is_some_and(|alias| self.tokenizer.match_keyword(alias))
        }) {
            Some(i) => i,
            None => return Err(self.error(ErrorKind::InvalidParameter)),
        };
        let decl = &PARAM_TYPES[type_index];

        if !self.tokenizer.advance()? {
            return Err(self.error(ErrorKind::InvalidParameter));
        }
        let name = match self.tokenizer.identifier() {
            Some(name) => name,
            None => return Err(self.error(ErrorKind::InvalidParameter)),
        };
        if !(self.tokenizer.advance()? && self.tokenizer.match_symbol("\"")) {
            return Err(self.error(ErrorKind::InvalidParameter));
        }

        if !self.tokenizer.advance()? {
            return Err(self.error(ErrorKind::InvalidParameter));
        }

        let mut param = ParsedParam::new(name, decl.ty);
        match decl.ty {
            ParamType::Int => self.parse_ints(&mut param)?,
            ParamType::Float
            | ParamType::Point2
            | ParamType::Point3
            | ParamType::Vector2
            | ParamType::Vector3
            | ParamType::Normal3
            | ParamType::Rgb
            | ParamType::Xyz
            | ParamType::Blackbody => self.parse_floats(&mut param)?,
            ParamType::Samples => self.parse_spectrum(&mut param)?,
            ParamType::String | ParamType::Texture => self.parse_strings(&mut param)?,
            ParamType::Bool => self.parse_bools(&mut param)?,
        }

        if decl.components > 1 && param.count() % decl.components as usize != 0 {
            return Err(self.error(ErrorKind::WrongComponentCount {
                name: param.name,
                type_name: decl.name,
                components: decl.components,
            }));
        }

        self.params.push(param);
        Ok(())
    }

    fn parse_ints(&mut self, param: &mut ParsedParam) -> Result<()> {
        if self.tokenizer.match_symbol("[") {
            self.tokenizer.advance()?;
            while !self.tokenizer.match_symbol("]") {
                match self.tokenizer.int_literal() {
                    Some(v) => param.ints.push(v),
                    None => return Err(self.error(ErrorKind::ExpectedToken("an int or ']'"))),
                }
                self.tokenizer.advance()?;
            }
        } else {
            match self.tokenizer.int_literal() {
                Some(v) => param.ints.push(v),
                None => return Err(self.error(ErrorKind::ExpectedToken("an int"))),
            }
        }
        Ok(())
    }

    fn parse_floats(&mut self, param: &mut ParsedParam) -> Result<()> {
        if self.tokenizer.match_symbol("[") {
            self.tokenizer.advance()?;
            while !self.tokenizer.match_symbol("]") {
                match self.tokenizer.float_literal() {
                    Some(v) => param.floats.push(v),
                    None => return Err(self.error(ErrorKind::ExpectedToken("a float or ']'"))),
                }
                self.tokenizer.advance()?;
            }
        } else {
            match self.tokenizer.float_literal() {
                Some(v) => param.floats.push(v),
                None => return Err(self.error(ErrorKind::ExpectedToken("a float"))),
            }
        }
        Ok(())
    }

    /// A `spectrum` value is either an inline bracketed list of
    /// `(wavelength, value)` pairs or a sidecar filename; the file is
    /// pushed with `report_eof` set because its end terminates the list.
    fn parse_spectrum(&mut self, param: &mut ParsedParam) -> Result<()> {
        let bracketed = self.tokenizer.match_symbol("[");
        if bracketed {
            self.tokenizer.advance()?;
        }

        if let Some(filename) = self.tokenizer.string_literal()? {
            if bracketed && !(self.tokenizer.advance()? && self.tokenizer.match_symbol("]")) {
                return Err(self.error(ErrorKind::UnclosedBracket));
            }
            // Commit the cursor past the value before saving the resume
            // offset for the outer file.
            self.tokenizer.advance()?;

            self.tokenizer.push_file(&filename, true)?;
            while self.tokenizer.advance()? {
                let wavelength = self
                    .tokenizer
                    .float_literal()
                    .ok_or_else(|| self.tokenizer.error(ErrorKind::InvalidSpectrumData))?;
                if !self.tokenizer.advance()? {
                    return Err(self.error(ErrorKind::InvalidSpectrumData));
                }
                let value = self
                    .tokenizer
                    .float_literal()
                    .ok_or_else(|| self.tokenizer.error(ErrorKind::InvalidSpectrumData))?;
                param.floats.push(wavelength);
                param.floats.push(value);
            }
            self.tokenizer.pop_file()?;
            return Ok(());
        }

        if !bracketed {
            return Err(self.error(ErrorKind::ExpectedToken("a '[' or a filename")));
        }

        while self.tokenizer.advance()? {
            if self.tokenizer.match_symbol("]") {
                break;
            }
            let wavelength = self
                .tokenizer
                .float_literal()
                .ok_or_else(|| self.tokenizer.error(ErrorKind::InvalidSpectrumData))?;
            if !self.tokenizer.advance()? {
                return Err(self.error(ErrorKind::InvalidSpectrumData));
            }
            let value = self
                .tokenizer
                .float_literal()
                .ok_or_else(|| self.tokenizer.error(ErrorKind::InvalidSpectrumData))?;
            param.floats.push(wavelength);
            param.floats.push(value);
        }
        Ok(())
    }

    fn parse_strings(&mut self, param: &mut ParsedParam) -> Result<()> {
        if self.tokenizer.match_symbol("[") {
            while self.tokenizer.advance()? {
                if self.tokenizer.match_symbol("]") {
                    return Ok(());
                }
                match self.tokenizer.string_literal()? {
                    Some(s) => param.strings.push(s),
                    None => return Err(self.error(ErrorKind::ExpectedToken("a string"))),
                }
            }
            Err(self.error(ErrorKind::UnclosedBracket))
        } else {
            match self.tokenizer.string_literal()? {
                Some(s) => param.strings.push(s),
                None => return Err(self.error(ErrorKind::ExpectedToken("a string"))),
            }
            Ok(())
        }
    }

    fn parse_bools(&mut self, param: &mut ParsedParam) -> Result<()> {
        const BOOL_VALUES: &[&str] = &["false", "true"];

        if self.tokenizer.match_symbol("[") {
            while self.tokenizer.advance()? {
                if self.tokenizer.match_symbol("]") {
                    return Ok(());
                }
                match self.tokenizer.which_string_literal(BOOL_VALUES)? {
                    Some(i) => param.bools.push(i != 0),
                    None => {
                        return Err(self.error(ErrorKind::InvalidParameterValue("bool")));
                    }
                }
            }
            Err(self.error(ErrorKind::UnclosedBracket))
        } else {
            match self.tokenizer.which_string_literal(BOOL_VALUES)? {
                Some(i) => param.bools.push(i != 0),
                None => return Err(self.error(ErrorKind::InvalidParameterValue("bool"))),
            }
            Ok(())
        }
    }

    //
    // Name resolution against the current scopes
    //

    fn find_texture(&self, name: &str, data_type: TextureData) -> Index {
        if name.is_empty() {
            return INVALID_INDEX;
        }
        for frame in self.attributes.frames_innermost_first() {
            let pool = match data_type {
                TextureData::Float => &frame.float_textures,
                TextureData::Spectrum => &frame.spectrum_textures,
            };
            for &index in pool.iter().rev() {
                if self.scene.textures[index as usize].name == name {
                    return index;
                }
            }
        }
        INVALID_INDEX
    }

    fn find_material(&self, name: &str) -> Index {
        if name.is_empty() {
            return INVALID_INDEX;
        }
        for frame in self.attributes.frames_innermost_first() {
            for &index in frame.materials.iter().rev() {
                if self.scene.materials[index as usize].name.as_deref() == Some(name) {
                    return index;
                }
            }
        }
        INVALID_INDEX
    }

    fn find_medium(&self, name: &str) -> Index {
        if name.is_empty() {
            return INVALID_INDEX;
        }
        for (i, medium) in self.scene.mediums.iter().enumerate().rev() {
            if medium.name == name {
                return i as Index;
            }
        }
        INVALID_INDEX
    }

    fn find_object(&self, name: &str) -> Index {
        if name.is_empty() {
            return INVALID_INDEX;
        }
        for (i, object) in self.scene.objects.iter().enumerate().rev() {
            if object.name == name {
                return i as Index;
            }
        }
        INVALID_INDEX
    }

    //
    // Typed parameter helpers
    //

    /// Applies a `FloatTex` parameter: the textured form wins over the
    /// value form when both are present.
    fn float_tex(&self, name: &str, dest: &mut FloatTex) {
        if let Some(value) = self.params.float(name) {
            dest.value = value;
        }
        if let Some(tex_name) = self.params.texture_name(name) {
            let index = self.find_texture(tex_name, TextureData::Float);
            if index == INVALID_INDEX {
                warn!("float texture '{}' is not defined here", tex_name);
            }
            dest.texture = index;
        }
    }

    fn color_tex(&self, name: &str, dest: &mut ColorTex) {
        if let Some(rgb) = self.params.spectrum(name) {
            dest.value = rgb;
        }
        if let Some(tex_name) = self.params.texture_name(name) {
            let index = self.find_texture(tex_name, TextureData::Spectrum);
            if index == INVALID_INDEX {
                warn!("spectrum texture '{}' is not defined here", tex_name);
            }
            dest.texture = index;
        }
    }

    /// Resolves a `"texture <name>"` parameter to a handle, silently
    /// yielding `INVALID_INDEX` for unknown names.
    fn texture_param(&self, name: &str, data_type: TextureData) -> Option<Index> {
        let tex_name = self.params.texture_name(name)?;
        let index = self.find_texture(tex_name, data_type);
        if index == INVALID_INDEX {
            warn!("texture '{}' is not defined here", tex_name);
        }
        Some(index)
    }

    fn set_if_float(&self, name: &str, dest: &mut Float) {
        if let Some(v) = self.params.float(name) {
            *dest = v;
        }
    }

    fn set_if_int(&self, name: &str, dest: &mut i32) {
        if let Some(v) = self.params.int(name) {
            *dest = v;
        }
    }

    fn set_if_bool(&self, name: &str, dest: &mut bool) {
        if let Some(v) = self.params.boolean(name) {
            *dest = v;
        }
    }

    fn set_if_spectrum(&self, name: &str, dest: &mut [Float; 3]) {
        if let Some(v) = self.params.spectrum(name) {
            *dest = v;
        }
    }

    fn set_if_int_array<const N: usize>(&self, name: &str, dest: &mut [i32; N]) {
        if let Some(v) = self.params.int_array::<N>(name) {
            *dest = v;
        }
    }

    fn set_if_float_array<const N: usize>(
        &self,
        name: &str,
        ty: ParamType,
        dest: &mut [Float; N],
    ) {
        if let Some(v) = self.params.float_array::<N>(name, ty) {
            *dest = v;
        }
    }

    //
    // Directive handlers
    //

    fn parse_make_named_medium(&mut self) -> Result<()> {
        let name = self.string_arg(0).to_string();

        let kind = match self.params.enumeration("type", MEDIUM_TYPES) {
            Some(0) => MediumKind::Homogeneous,
            Some(1) => {
                let mut p0 = [0.0, 0.0, 0.0];
                let mut p1 = [1.0, 1.0, 1.0];
                self.set_if_float_array("p0", ParamType::Point3, &mut p0);
                self.set_if_float_array("p1", ParamType::Point3, &mut p1);

                let mut nx = 1;
                let mut ny = 1;
                let mut nz = 1;
                self.set_if_int("nx", &mut nx);
                self.set_if_int("ny", &mut ny);
                self.set_if_int("nz", &mut nz);
                if nx < 1 || ny < 1 || nz < 1 {
                    return Err(self.error(ErrorKind::InvalidDensityGrid(name)));
                }

                let mut density = Vec::new();
                if let Some(values) = self
                    .params
                    .float_vector("density", ParamType::Float)
                    .map(|v| v.to_vec())
                {
                    if values.len() != (nx * ny * nz) as usize {
                        return Err(self.error(ErrorKind::InvalidDensityGrid(name)));
                    }
                    density = values;
                }

                MediumKind::Heterogeneous {
                    p0,
                    p1,
                    nx,
                    ny,
                    nz,
                    density,
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("medium"))),
        };

        let mut medium = Medium::new(&name, kind);
        self.set_if_spectrum("sigma_a", &mut medium.sigma_a);
        self.set_if_spectrum("sigma_s", &mut medium.sigma_s);
        if let Some(preset) = self.params.string("preset") {
            medium.preset = Some(preset.to_string());
        }
        self.set_if_float("g", &mut medium.g);
        self.set_if_float("scale", &mut medium.scale);

        self.scene.mediums.push(medium);
        Ok(())
    }

    fn parse_medium_interface(&mut self) {
        let inside = self.string_arg(0).to_string();
        let outside = self.string_arg(1).to_string();

        let inside_medium = if self.in_world && !inside.is_empty() {
            let index = self.find_medium(&inside);
            if index == INVALID_INDEX {
                warn!("medium '{}' is not defined here", inside);
            }
            index
        } else {
            INVALID_INDEX
        };

        let outside_medium = if !outside.is_empty() {
            let index = self.find_medium(&outside);
            if index == INVALID_INDEX {
                warn!("medium '{}' is not defined here", outside);
            }
            index
        } else {
            INVALID_INDEX
        };

        let top = self.attributes.top_mut();
        top.inside_medium = inside_medium;
        top.outside_medium = outside_medium;
    }

    fn parse_shape(&mut self) -> Result<()> {
        let kind = match self.enum_arg(0) {
            0 => {
                let mut cone = Cone::default();
                self.set_if_float("radius", &mut cone.radius);
                self.set_if_float("height", &mut cone.height);
                self.set_if_float("phimax", &mut cone.phimax);
                ShapeKind::Cone(cone)
            }
            1 => self.collect_curve()?,
            2 => {
                let mut cylinder = Cylinder::default();
                self.set_if_float("radius", &mut cylinder.radius);
                self.set_if_float("zmin", &mut cylinder.zmin);
                self.set_if_float("zmax", &mut cylinder.zmax);
                self.set_if_float("phimax", &mut cylinder.phimax);
                ShapeKind::Cylinder(cylinder)
            }
            3 => {
                let mut disk = Disk::default();
                self.set_if_float("height", &mut disk.height);
                self.set_if_float("radius", &mut disk.radius);
                self.set_if_float("innerradius", &mut disk.innerradius);
                self.set_if_float("phimax", &mut disk.phimax);
                ShapeKind::Disk(disk)
            }
            4 => {
                let mut hyperboloid = Hyperboloid::default();
                self.set_if_float_array("p1", ParamType::Point3, &mut hyperboloid.p1);
                self.set_if_float_array("p2", ParamType::Point3, &mut hyperboloid.p2);
                self.set_if_float("phimax", &mut hyperboloid.phimax);
                ShapeKind::Hyperboloid(hyperboloid)
            }
            5 => {
                let mut paraboloid = Paraboloid::default();
                self.set_if_float("radius", &mut paraboloid.radius);
                self.set_if_float("zmin", &mut paraboloid.zmin);
                self.set_if_float("zmax", &mut paraboloid.zmax);
                self.set_if_float("phimax", &mut paraboloid.phimax);
                ShapeKind::Paraboloid(paraboloid)
            }
            6 => {
                let mut sphere = Sphere::default();
                self.set_if_float("radius", &mut sphere.radius);
                sphere.zmin = -sphere.radius;
                sphere.zmax = sphere.radius;
                self.set_if_float("zmin", &mut sphere.zmin);
                self.set_if_float("zmax", &mut sphere.zmax);
                self.set_if_float("phimax", &mut sphere.phimax);
                ShapeKind::Sphere(sphere)
            }
            7 => self.collect_triangle_mesh()?,
            8 => self.collect_height_field()?,
            9 => self.collect_loop_subdiv()?,
            10 => self.collect_nurbs()?,
            11 => self.collect_ply_mesh()?,
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("shape"))),
        };

        let material = self.shape_material();
        let top = self.attributes.top();
        let shape = Shape {
            shape_to_world: *self.transforms.top(),
            material,
            area_light: top.area_light,
            inside_medium: top.inside_medium,
            outside_medium: top.outside_medium,
            object: self.active_object,
            reverse_orientation: top.reverse_orientation,
            kind,
        };
        self.scene.shapes.push(shape);
        Ok(())
    }

    /// The shape's material handle. When the directive carries parameters
    /// that override fields of the active material, a nameless shadow copy
    /// with the overrides applied is created and owned by this shape
    /// alone.
    fn shape_material(&mut self) -> Index {
        let active = self.attributes.top().active_material;
        if active == INVALID_INDEX {
            return INVALID_INDEX;
        }

        if !self.has_material_overrides(active) {
            return active;
        }

        let mut material = self.scene.materials[active as usize].clone();
        material.name = None;
        self.apply_material_params(&mut material.kind);
        if let Some(bumpmap) = self.texture_param("bumpmap", TextureData::Float) {
            material.bumpmap = bumpmap;
        }

        let index = self.scene.materials.len() as Index;
        self.scene.materials.push(material);
        index
    }

    fn has_material_overrides(&self, active: Index) -> bool {
        let eligible_floats =
            override_float_names(&self.scene.materials[active as usize].kind);

        self.params.iter().any(|p| match p.ty {
            ParamType::Rgb | ParamType::Xyz | ParamType::Blackbody | ParamType::Samples => true,
            ParamType::Texture => p.name != "alpha" && p.name != "shadowalpha",
            ParamType::Float => eligible_floats.contains(&p.name.as_str()),
            ParamType::Bool => p.name == "remaproughness",
            _ => false,
        })
    }

    fn collect_curve(&mut self) -> Result<ShapeKind> {
        let mut curve = Curve::default();

        if let Some(i) = self.params.enumeration("basis", CURVE_BASES) {
            curve.basis = match i {
                0 => CurveBasis::Bezier,
                _ => CurveBasis::BSpline,
            };
        }
        if let Some(degree) = self.params.int("degree") {
            if degree < 1 {
                return Err(self.error(ErrorKind::InvalidParameterValue("degree")));
            }
            curve.degree = degree as u32;
        }
        if let Some(i) = self.params.enumeration("type", CURVE_TYPES) {
            curve.curvetype = match i {
                0 => CurveType::Flat,
                1 => CurveType::Ribbon,
                _ => CurveType::Cylinder,
            };
        }

        match self.params.float_vector("P", ParamType::Point3) {
            Some(p) => curve.p = p.to_vec(),
            None => return Err(self.error(ErrorKind::MissingParameter("P"))),
        }
        let num_points = (curve.p.len() / 3) as u32;
        curve.num_segments = match curve.basis {
            CurveBasis::Bezier => {
                if num_points < curve.degree + 1
                    || (num_points - 1) % curve.degree != 0
                {
                    return Err(self.error(ErrorKind::InvalidParameterValue("P")));
                }
                (num_points - 1) / curve.degree
            }
            CurveBasis::BSpline => {
                if num_points <= curve.degree {
                    return Err(self.error(ErrorKind::InvalidParameterValue("P")));
                }
                num_points - curve.degree
            }
        };

        if let Some(n) = self
            .params
            .float_vector("N", ParamType::Normal3)
            .map(|v| v.to_vec())
        {
            if n.len() != 3 * (curve.num_segments + 1) as usize {
                return Err(self.error(ErrorKind::InvalidParameterValue("N")));
            }
            curve.n = n;
        }

        if let Some(width) = self.params.float("width") {
            curve.width0 = width;
            curve.width1 = width;
        }
        self.set_if_float("width0", &mut curve.width0);
        self.set_if_float("width1", &mut curve.width1);
        self.set_if_int("splitdepth", &mut curve.splitdepth);

        Ok(ShapeKind::Curve(curve))
    }

    fn collect_triangle_mesh(&mut self) -> Result<ShapeKind> {
        let mut mesh = TriangleMesh::default();

        match self.params.int_vector("indices") {
            Some(indices) => mesh.indices = indices.to_vec(),
            None => return Err(self.error(ErrorKind::MissingParameter("indices"))),
        }
        match self.params.float_vector("P", ParamType::Point3) {
            Some(p) => mesh.p = p.to_vec(),
            None => return Err(self.error(ErrorKind::MissingParameter("P"))),
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(self.error(ErrorKind::InvalidParameterValue("indices")));
        }
        if mesh.p.len() % 3 != 0 {
            return Err(self.error(ErrorKind::InvalidParameterValue("P")));
        }
        mesh.num_vertices = (mesh.p.len() / 3) as u32;

        if let Some(n) = self
            .params
            .float_vector("N", ParamType::Normal3)
            .map(|v| v.to_vec())
        {
            if n.len() != 3 * mesh.num_vertices as usize {
                return Err(self.error(ErrorKind::InvalidParameterValue("N")));
            }
            mesh.n = n;
        }
        if let Some(s) = self
            .params
            .float_vector("S", ParamType::Vector3)
            .map(|v| v.to_vec())
        {
            if s.len() != 3 * mesh.num_vertices as usize {
                return Err(self.error(ErrorKind::InvalidParameterValue("S")));
            }
            mesh.s = s;
        }
        if let Some(uv) = self
            .params
            .find("uv", &[ParamType::Float, ParamType::Point2])
            .map(|p| p.floats.clone())
        {
            if uv.len() != 2 * mesh.num_vertices as usize {
                return Err(self.error(ErrorKind::InvalidParameterValue("uv")));
            }
            mesh.uv = uv;
        }

        if let Some(alpha) = self.texture_param("alpha", TextureData::Float) {
            mesh.alpha = alpha;
        }
        if let Some(shadowalpha) = self.texture_param("shadowalpha", TextureData::Float) {
            mesh.shadowalpha = shadowalpha;
        }

        Ok(ShapeKind::TriangleMesh(mesh))
    }

    fn collect_height_field(&mut self) -> Result<ShapeKind> {
        let nu = self.params.int("nu");
        let nv = self.params.int("nv");
        let (Some(nu), Some(nv)) = (nu, nv) else {
            return Err(self.error(ErrorKind::MissingParameter("nu/nv")));
        };
        if nu < 1 || nv < 1 {
            return Err(self.error(ErrorKind::InvalidParameterValue("nu/nv")));
        }

        let pz = self
            .params
            .float_vector("Pz", ParamType::Float)
            .map(|v| v.to_vec());
        let pz = match pz {
            Some(pz) if pz.len() == (nu * nv) as usize => pz,
            _ => return Err(self.error(ErrorKind::MissingParameter("Pz"))),
        };

        Ok(ShapeKind::HeightField(HeightField { nu, nv, pz }))
    }

    fn collect_loop_subdiv(&mut self) -> Result<ShapeKind> {
        let mut subdiv = LoopSubdiv::default();
        self.set_if_int("levels", &mut subdiv.levels);

        match self.params.int_vector("indices") {
            Some(indices) => subdiv.indices = indices.to_vec(),
            None => return Err(self.error(ErrorKind::MissingParameter("indices"))),
        }
        match self.params.float_vector("P", ParamType::Point3) {
            Some(p) => subdiv.p = p.to_vec(),
            None => return Err(self.error(ErrorKind::MissingParameter("P"))),
        }

        Ok(ShapeKind::LoopSubdiv(subdiv))
    }

    fn collect_nurbs(&mut self) -> Result<ShapeKind> {
        let mut nurbs = Nurbs::default();

        for (name, dest) in [
            ("nu", &mut nurbs.nu),
            ("nv", &mut nurbs.nv),
            ("uorder", &mut nurbs.uorder),
            ("vorder", &mut nurbs.vorder),
        ] {
            match self.params.int(name) {
                Some(v) => *dest = v,
                None => return Err(self.error(ErrorKind::MissingParameter("nu/nv/uorder/vorder"))),
            }
        }
        for (name, dest) in [
            ("u0", &mut nurbs.u0),
            ("v0", &mut nurbs.v0),
            ("u1", &mut nurbs.u1),
            ("v1", &mut nurbs.v1),
        ] {
            match self.params.float(name) {
                Some(v) => *dest = v,
                None => return Err(self.error(ErrorKind::MissingParameter("u0/v0/u1/v1"))),
            }
        }

        let uknot_count = (nurbs.nu + nurbs.uorder).max(0) as usize;
        let vknot_count = (nurbs.nv + nurbs.vorder).max(0) as usize;
        let uknots = self
            .params
            .float_vector("uknots", ParamType::Float)
            .map(|v| v.to_vec());
        match uknots {
            Some(knots) if knots.len() == uknot_count => nurbs.uknots = knots,
            _ => return Err(self.error(ErrorKind::MissingParameter("uknots"))),
        }
        let vknots = self
            .params
            .float_vector("vknots", ParamType::Float)
            .map(|v| v.to_vec());
        match vknots {
            Some(knots) if knots.len() == vknot_count => nurbs.vknots = knots,
            _ => return Err(self.error(ErrorKind::MissingParameter("vknots"))),
        }

        let num_points = (nurbs.nu * nurbs.nv).max(0) as usize;
        if let Some(p) = self
            .params
            .float_vector("P", ParamType::Point3)
            .map(|v| v.to_vec())
        {
            if p.len() != num_points * 3 {
                return Err(self.error(ErrorKind::InvalidParameterValue("P")));
            }
            nurbs.p = p;
        } else if let Some(pw) = self
            .params
            .float_vector("Pw", ParamType::Float)
            .map(|v| v.to_vec())
        {
            if pw.len() != num_points * 4 {
                return Err(self.error(ErrorKind::InvalidParameterValue("Pw")));
            }
            nurbs.pw = pw;
        } else {
            return Err(self.error(ErrorKind::MissingParameter("P or Pw")));
        }

        Ok(ShapeKind::Nurbs(nurbs))
    }

    fn collect_ply_mesh(&mut self) -> Result<ShapeKind> {
        let filename = match self.params.string("filename") {
            Some(filename) => {
                // Mesh files are found relative to the file that references
                // them, which may itself be an include.
                resolve_file(filename, self.tokenizer.filename())
                    .display()
                    .to_string()
            }
            None => return Err(self.error(ErrorKind::MissingParameter("filename"))),
        };

        let mut ply = PlyMesh {
            filename,
            alpha: INVALID_INDEX,
            shadowalpha: INVALID_INDEX,
        };
        if let Some(alpha) = self.texture_param("alpha", TextureData::Float) {
            ply.alpha = alpha;
        }
        if let Some(shadowalpha) = self.texture_param("shadowalpha", TextureData::Float) {
            ply.shadowalpha = shadowalpha;
        }

        Ok(ShapeKind::PlyMesh(ply))
    }

    fn parse_area_light_source(&mut self) -> Result<()> {
        if self.enum_arg(0) != 0 {
            return Err(self.error(ErrorKind::InvalidEnumValue("area light")));
        }

        let mut area_light = AreaLight::default();
        let AreaLightKind::Diffuse {
            l,
            twosided,
            samples,
        } = &mut area_light.kind;
        if let Some(v) = self.params.spectrum("L") {
            *l = v;
        }
        if let Some(v) = self.params.boolean("twosided") {
            *twosided = v;
        }
        if let Some(v) = self.params.int("samples") {
            *samples = v;
        }
        self.set_if_spectrum("scale", &mut area_light.scale);

        let index = self.scene.area_lights.len() as Index;
        self.scene.area_lights.push(area_light);
        self.attributes.top_mut().area_light = index;
        Ok(())
    }

    fn parse_light_source(&mut self) -> Result<()> {
        let kind = match self.enum_arg(0) {
            0 => {
                let mut l = [1.0, 1.0, 1.0];
                let mut from = [0.0, 0.0, 0.0];
                let mut to = [0.0, 0.0, 1.0];
                self.set_if_spectrum("L", &mut l);
                self.set_if_float_array("from", ParamType::Point3, &mut from);
                self.set_if_float_array("to", ParamType::Point3, &mut to);
                LightKind::Distant { l, from, to }
            }
            1 => {
                let mut i = [1.0, 1.0, 1.0];
                self.set_if_spectrum("I", &mut i);
                let mapname = match self.params.string("mapname") {
                    Some(mapname) => mapname.to_string(),
                    None => return Err(self.error(ErrorKind::MissingParameter("mapname"))),
                };
                LightKind::Goniometric { i, mapname }
            }
            2 => {
                let mut l = [1.0, 1.0, 1.0];
                let mut samples = 1;
                self.set_if_spectrum("L", &mut l);
                self.set_if_int("samples", &mut samples);
                let mapname = self.params.string("mapname").unwrap_or("").to_string();
                LightKind::Infinite { l, samples, mapname }
            }
            3 => {
                let mut i = [1.0, 1.0, 1.0];
                let mut from = [0.0, 0.0, 0.0];
                self.set_if_spectrum("I", &mut i);
                self.set_if_float_array("from", ParamType::Point3, &mut from);
                LightKind::Point { i, from }
            }
            4 => {
                let mut i = [1.0, 1.0, 1.0];
                let mut fov = 45.0;
                self.set_if_spectrum("I", &mut i);
                self.set_if_float("fov", &mut fov);
                let mapname = match self.params.string("mapname") {
                    Some(mapname) => mapname.to_string(),
                    None => return Err(self.error(ErrorKind::MissingParameter("mapname"))),
                };
                LightKind::Projection { i, fov, mapname }
            }
            5 => {
                let mut i = [1.0, 1.0, 1.0];
                let mut from = [0.0, 0.0, 0.0];
                let mut to = [0.0, 0.0, 1.0];
                let mut coneangle = 30.0;
                let mut conedeltaangle = 5.0;
                self.set_if_spectrum("I", &mut i);
                self.set_if_float_array("from", ParamType::Point3, &mut from);
                self.set_if_float_array("to", ParamType::Point3, &mut to);
                self.set_if_float("coneangle", &mut coneangle);
                self.set_if_float("conedeltaangle", &mut conedeltaangle);
                LightKind::Spot {
                    i,
                    from,
                    to,
                    coneangle,
                    conedeltaangle,
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("light"))),
        };

        let mut light = Light {
            light_to_world: *self.transforms.top(),
            scale: [1.0, 1.0, 1.0],
            kind,
        };
        self.set_if_spectrum("scale", &mut light.scale);
        self.scene.lights.push(light);
        Ok(())
    }

    fn material_kind_from_index(&mut self, index: i32) -> Result<MaterialKind> {
        // The last table entry is the empty string, another way of saying
        // "none".
        let index = if index == MATERIAL_TYPES.len() as i32 - 1 {
            9
        } else {
            index
        };

        let kind = match index {
            0 => MaterialKind::Disney(DisneyMaterial::default()),
            1 => MaterialKind::Fourier(FourierMaterial::default()),
            2 => MaterialKind::Glass(GlassMaterial::default()),
            3 => MaterialKind::Hair(HairMaterial::default()),
            4 => MaterialKind::KdSubsurface(KdSubsurfaceMaterial::default()),
            5 => MaterialKind::Matte(MatteMaterial::default()),
            6 => MaterialKind::Metal(MetalMaterial::default()),
            7 => MaterialKind::Mirror(MirrorMaterial::default()),
            8 => MaterialKind::Mix(MixMaterial::default()),
            9 => MaterialKind::None,
            10 => MaterialKind::Plastic(PlasticMaterial::default()),
            11 => MaterialKind::Substrate(SubstrateMaterial::default()),
            12 => MaterialKind::Subsurface(SubsurfaceMaterial::default()),
            13 => MaterialKind::Translucent(TranslucentMaterial::default()),
            14 => MaterialKind::Uber(UberMaterial::default()),
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("material"))),
        };
        Ok(kind)
    }

    /// Fills a material's fields from the current parameter list. The same
    /// routine serves creation (over defaults) and shape-level overrides
    /// (over a copy of the active material).
    fn apply_material_params(&self, kind: &mut MaterialKind) {
        match kind {
            MaterialKind::Disney(m) => {
                self.color_tex("color", &mut m.color);
                self.float_tex("anisotropic", &mut m.anisotropic);
                self.float_tex("clearcoat", &mut m.clearcoat);
                self.float_tex("clearcoatgloss", &mut m.clearcoatgloss);
                self.float_tex("eta", &mut m.eta);
                self.float_tex("metallic", &mut m.metallic);
                self.float_tex("roughness", &mut m.roughness);
                self.color_tex("scatterdistance", &mut m.scatterdistance);
                self.float_tex("sheen", &mut m.sheen);
                self.float_tex("sheentint", &mut m.sheentint);
                self.float_tex("spectrans", &mut m.spectrans);
                self.float_tex("speculartint", &mut m.speculartint);
                self.set_if_bool("thin", &mut m.thin);
                self.color_tex("difftrans", &mut m.difftrans);
                self.color_tex("flatness", &mut m.flatness);
            }
            MaterialKind::Fourier(m) => {
                if let Some(bsdffile) = self.params.string("bsdffile") {
                    m.bsdffile = bsdffile.to_string();
                }
            }
            MaterialKind::Glass(m) => {
                self.color_tex("Kr", &mut m.kr);
                self.color_tex("Kt", &mut m.kt);
                self.float_tex("eta", &mut m.eta);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Hair(m) => {
                m.has_sigma_a |= self.params.has("sigma_a");
                m.has_color |= self.params.has("color");
                self.color_tex("sigma_a", &mut m.sigma_a);
                self.color_tex("color", &mut m.color);
                self.float_tex("eumelanin", &mut m.eumelanin);
                self.float_tex("pheomelanin", &mut m.pheomelanin);
                self.float_tex("eta", &mut m.eta);
                self.float_tex("beta_m", &mut m.beta_m);
                self.float_tex("beta_n", &mut m.beta_n);
                self.float_tex("alpha", &mut m.alpha);
            }
            MaterialKind::KdSubsurface(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.color_tex("mfp", &mut m.mfp);
                self.float_tex("eta", &mut m.eta);
                self.color_tex("Kr", &mut m.kr);
                self.color_tex("Kt", &mut m.kt);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Matte(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.float_tex("sigma", &mut m.sigma);
            }
            MaterialKind::Metal(m) => {
                self.color_tex("eta", &mut m.eta);
                self.color_tex("k", &mut m.k);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Mirror(m) => {
                self.color_tex("Kr", &mut m.kr);
            }
            MaterialKind::Mix(m) => {
                self.color_tex("amount", &mut m.amount);
                if let Some(name) = self.params.string("namedmaterial1") {
                    m.namedmaterial1 = self.find_material(name);
                }
                if let Some(name) = self.params.string("namedmaterial2") {
                    m.namedmaterial2 = self.find_material(name);
                }
            }
            MaterialKind::None => {}
            MaterialKind::Plastic(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.color_tex("Ks", &mut m.ks);
                self.float_tex("roughness", &mut m.roughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Substrate(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.color_tex("Ks", &mut m.ks);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Subsurface(m) => {
                if let Some(coefficients) = self.params.string("coefficients") {
                    m.coefficients = Some(coefficients.to_string());
                }
                self.color_tex("sigma_a", &mut m.sigma_a);
                self.color_tex("sigma_prime_s", &mut m.sigma_prime_s);
                self.set_if_float("scale", &mut m.scale);
                self.float_tex("eta", &mut m.eta);
                self.color_tex("Kr", &mut m.kr);
                self.color_tex("Kt", &mut m.kt);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Translucent(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.color_tex("Ks", &mut m.ks);
                self.color_tex("reflect", &mut m.reflect);
                self.color_tex("transmit", &mut m.transmit);
                self.float_tex("roughness", &mut m.roughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
            MaterialKind::Uber(m) => {
                self.color_tex("Kd", &mut m.kd);
                self.color_tex("Ks", &mut m.ks);
                self.color_tex("Kr", &mut m.kr);
                self.color_tex("Kt", &mut m.kt);
                self.float_tex("eta", &mut m.eta);
                self.color_tex("opacity", &mut m.opacity);
                self.float_tex("uroughness", &mut m.uroughness);
                self.float_tex("vroughness", &mut m.vroughness);
                self.set_if_bool("remaproughness", &mut m.remaproughness);
            }
        }
    }

    fn build_material(&mut self, kind_index: i32, name: Option<String>) -> Result<Index> {
        let mut kind = self.material_kind_from_index(kind_index)?;
        self.apply_material_params(&mut kind);

        if let MaterialKind::Fourier(fourier) = &kind {
            if fourier.bsdffile.is_empty() {
                return Err(self.error(ErrorKind::MissingParameter("bsdffile")));
            }
        }

        let mut material = Material {
            name,
            bumpmap: INVALID_INDEX,
            kind,
        };
        if let Some(bumpmap) = self.texture_param("bumpmap", TextureData::Float) {
            material.bumpmap = bumpmap;
        }

        let index = self.scene.materials.len() as Index;
        self.scene.materials.push(material);
        Ok(index)
    }

    fn parse_material(&mut self) -> Result<()> {
        let index = self.build_material(self.enum_arg(0), None)?;
        self.attributes.top_mut().active_material = index;
        Ok(())
    }

    fn parse_make_named_material(&mut self) -> Result<()> {
        let name = self.string_arg(0).to_string();
        let kind_index = match self.params.enumeration("type", MATERIAL_TYPES) {
            Some(i) => i as i32,
            None => return Err(self.error(ErrorKind::InvalidEnumValue("material"))),
        };

        let index = self.build_material(kind_index, Some(name))?;
        self.attributes.top_mut().materials.push(index);
        Ok(())
    }

    fn parse_object_begin(&mut self) -> Result<()> {
        if self.active_object != INVALID_INDEX {
            return Err(self.error(ErrorKind::NestedObject));
        }

        if !self.transforms.push() {
            return Err(self.error(ErrorKind::TransformStackOverflow));
        }
        if !self.attributes.push() {
            return Err(self.error(ErrorKind::AttributeStackOverflow));
        }

        self.first_object_shape = self.scene.shapes.len() as Index;
        let object = Object {
            name: self.string_arg(0).to_string(),
            object_to_instance: *self.transforms.top(),
            first_shape: self.first_object_shape,
            num_shapes: 0,
        };
        self.active_object = self.scene.objects.len() as Index;
        self.scene.objects.push(object);
        Ok(())
    }

    fn parse_object_end(&mut self) -> Result<()> {
        if self.active_object == INVALID_INDEX {
            return Err(self.error(ErrorKind::UnmatchedObjectEnd));
        }

        if !self.attributes.pop() {
            return Err(self.error(ErrorKind::AttributeStackUnderflow));
        }
        if !self.transforms.pop() {
            return Err(self.error(ErrorKind::TransformStackUnderflow));
        }

        let object = &mut self.scene.objects[self.active_object as usize];
        object.num_shapes = self.scene.shapes.len() as u32 - object.first_shape;
        self.active_object = INVALID_INDEX;
        Ok(())
    }

    fn parse_object_instance(&mut self) -> Result<()> {
        if self.active_object != INVALID_INDEX {
            return Err(self.error(ErrorKind::InstanceInObject));
        }

        let name = self.string_arg(0).to_string();
        let object = self.find_object(&name);
        if object == INVALID_INDEX {
            // Referencing an undefined object is tolerated; the instance
            // simply doesn't happen.
            warn!("object '{}' is not defined, ignoring instance", name);
            return Ok(());
        }

        let top = self.attributes.top();
        let instance = Instance {
            instance_to_world: *self.transforms.top(),
            object,
            material: top.active_material,
            area_light: top.area_light,
            inside_medium: top.inside_medium,
            outside_medium: top.outside_medium,
            reverse_orientation: top.reverse_orientation,
        };
        self.scene.instances.push(instance);
        Ok(())
    }

    fn parse_texture(&mut self) -> Result<()> {
        let name = self.string_arg(0).to_string();

        let data_type = match self.enum_arg(1) {
            0 => TextureData::Float,
            // "color" is accepted as an alias for "spectrum".
            1 | 2 => TextureData::Spectrum,
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("texture data"))),
        };

        let kind = match self.enum_arg(2) {
            0 => {
                let mut v00 = ColorTex::grey(0.0);
                let mut v01 = ColorTex::grey(1.0);
                let mut v10 = ColorTex::grey(0.0);
                let mut v11 = ColorTex::grey(1.0);
                self.color_tex("v00", &mut v00);
                self.color_tex("v01", &mut v01);
                self.color_tex("v10", &mut v10);
                self.color_tex("v11", &mut v11);
                TextureKind::Bilerp {
                    uv: self.collect_uv_mapping(),
                    v00,
                    v01,
                    v10,
                    v11,
                }
            }
            1 | 2 => {
                let mut tex1 = ColorTex::grey(1.0);
                let mut tex2 = ColorTex::grey(0.0);
                self.color_tex("tex1", &mut tex1);
                self.color_tex("tex2", &mut tex2);

                let dimension = self.params.int("dimension").unwrap_or(2);
                if dimension == 3 {
                    TextureKind::Checkerboard3D {
                        object_to_texture: *self.transforms.top(),
                        tex1,
                        tex2,
                    }
                } else {
                    let aamode = match self.params.enumeration("aamode", CHECKERBOARD_AA_MODES) {
                        Some(1) => CheckerboardAaMode::None,
                        _ => CheckerboardAaMode::ClosedForm,
                    };
                    TextureKind::Checkerboard2D {
                        uv: self.collect_uv_mapping(),
                        tex1,
                        tex2,
                        aamode,
                    }
                }
            }
            3 => {
                let mut value = [1.0, 1.0, 1.0];
                self.set_if_spectrum("value", &mut value);
                TextureKind::Constant { value }
            }
            4 => {
                let mut inside = ColorTex::grey(1.0);
                let mut outside = ColorTex::grey(0.0);
                self.color_tex("inside", &mut inside);
                self.color_tex("outside", &mut outside);
                TextureKind::Dots {
                    uv: self.collect_uv_mapping(),
                    inside,
                    outside,
                }
            }
            5 => {
                let mut octaves = 8;
                let mut roughness = 0.5;
                self.set_if_int("octaves", &mut octaves);
                self.set_if_float("roughness", &mut roughness);
                TextureKind::Fbm {
                    object_to_texture: *self.transforms.top(),
                    octaves,
                    roughness,
                }
            }
            6 => {
                let filename = match self.params.string("filename") {
                    Some(filename) => filename.to_string(),
                    None => return Err(self.error(ErrorKind::MissingParameter("filename"))),
                };
                let wrap = match self.params.enumeration("wrap", WRAP_MODES) {
                    Some(1) => WrapMode::Black,
                    Some(2) => WrapMode::Clamp,
                    _ => WrapMode::Repeat,
                };
                let mut maxanisotropy = 8.0;
                let mut trilinear = false;
                let mut scale = 1.0;
                let mut gamma = false;
                self.set_if_float("maxanisotropy", &mut maxanisotropy);
                self.set_if_bool("trilinear", &mut trilinear);
                self.set_if_float("scale", &mut scale);
                self.set_if_bool("gamma", &mut gamma);
                TextureKind::ImageMap {
                    uv: self.collect_uv_mapping(),
                    filename,
                    wrap,
                    maxanisotropy,
                    trilinear,
                    scale,
                    gamma,
                }
            }
            7 => {
                let mut octaves = 8;
                let mut roughness = 0.5;
                let mut scale = 1.0;
                let mut variation = 0.2;
                self.set_if_int("octaves", &mut octaves);
                self.set_if_float("roughness", &mut roughness);
                self.set_if_float("scale", &mut scale);
                self.set_if_float("variation", &mut variation);
                TextureKind::Marble {
                    object_to_texture: *self.transforms.top(),
                    octaves,
                    roughness,
                    scale,
                    variation,
                }
            }
            8 => {
                let mut tex1 = ColorTex::grey(1.0);
                let mut tex2 = ColorTex::grey(0.0);
                let mut amount = FloatTex::value(0.5);
                self.color_tex("tex1", &mut tex1);
                self.color_tex("tex2", &mut tex2);
                self.float_tex("amount", &mut amount);
                TextureKind::Mix { tex1, tex2, amount }
            }
            9 => {
                let mut tex1 = ColorTex::grey(1.0);
                let mut tex2 = ColorTex::grey(0.0);
                self.color_tex("tex1", &mut tex1);
                self.color_tex("tex2", &mut tex2);
                TextureKind::Scale { tex1, tex2 }
            }
            10 => TextureKind::Uv {
                uv: self.collect_uv_mapping(),
            },
            11 => TextureKind::Windy {
                object_to_texture: *self.transforms.top(),
            },
            12 => {
                let mut octaves = 8;
                let mut roughness = 0.5;
                self.set_if_int("octaves", &mut octaves);
                self.set_if_float("roughness", &mut roughness);
                TextureKind::Wrinkled {
                    object_to_texture: *self.transforms.top(),
                    octaves,
                    roughness,
                }
            }
            13 => {
                let filename = match self.params.string("filename") {
                    Some(filename) => filename.to_string(),
                    None => return Err(self.error(ErrorKind::MissingParameter("filename"))),
                };
                let mut gamma = 2.2;
                self.set_if_float("gamma", &mut gamma);
                TextureKind::Ptex {
                    uv: self.collect_uv_mapping(),
                    filename,
                    gamma,
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("texture"))),
        };

        let index = self.scene.textures.len() as Index;
        self.scene.textures.push(Texture {
            name,
            data_type,
            kind,
        });

        let top = self.attributes.top_mut();
        match data_type {
            TextureData::Float => top.float_textures.push(index),
            TextureData::Spectrum => top.spectrum_textures.push(index),
        }
        Ok(())
    }

    fn collect_uv_mapping(&self) -> UvMapping {
        let mut uv = UvMapping::default();
        if let Some(i) = self.params.enumeration("mapping", TEX_COORD_MAPPINGS) {
            uv.mapping = match i {
                0 => TexCoordMapping::Uv,
                1 => TexCoordMapping::Spherical,
                2 => TexCoordMapping::Cylindrical,
                _ => TexCoordMapping::Planar,
            };
        }
        self.set_if_float("uscale", &mut uv.uscale);
        self.set_if_float("vscale", &mut uv.vscale);
        self.set_if_float("udelta", &mut uv.udelta);
        self.set_if_float("vdelta", &mut uv.vdelta);
        self.set_if_float_array("v1", ParamType::Vector3, &mut uv.v1);
        self.set_if_float_array("v2", ParamType::Vector3, &mut uv.v2);
        uv
    }

    fn parse_accelerator(&mut self) -> Result<()> {
        let accelerator = match self.enum_arg(0) {
            0 => {
                let mut maxnodeprims = 4;
                self.set_if_int("maxnodeprims", &mut maxnodeprims);
                let splitmethod = match self.params.enumeration("splitmethod", BVH_SPLIT_METHODS) {
                    Some(1) => BvhSplit::Middle,
                    Some(2) => BvhSplit::Equal,
                    Some(3) => BvhSplit::Hlbvh,
                    _ => BvhSplit::Sah,
                };
                Accelerator::Bvh {
                    maxnodeprims,
                    splitmethod,
                }
            }
            1 => {
                let mut accelerator = Accelerator::default_kd_tree();
                let Accelerator::KdTree {
                    intersectcost,
                    traversalcost,
                    emptybonus,
                    maxprims,
                    maxdepth,
                } = &mut accelerator
                else {
                    unreachable!();
                };
                self.set_if_int("intersectcost", intersectcost);
                self.set_if_int("traversalcost", traversalcost);
                self.set_if_float("emptybonus", emptybonus);
                self.set_if_int("maxprims", maxprims);
                self.set_if_int("maxdepth", maxdepth);
                accelerator
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("accelerator"))),
        };

        self.scene.accelerator = Some(accelerator);
        Ok(())
    }

    fn parse_camera(&mut self) -> Result<()> {
        let kind = match self.enum_arg(0) {
            0 => {
                let mut kind = CameraKind::default_perspective();
                let CameraKind::Perspective {
                    frameaspectratio,
                    screenwindow,
                    lensradius,
                    focaldistance,
                    fov,
                    halffov,
                } = &mut kind
                else {
                    unreachable!();
                };
                self.set_if_float("frameaspectratio", frameaspectratio);
                self.set_if_float_array("screenwindow", ParamType::Float, screenwindow);
                self.set_if_float("lensradius", lensradius);
                self.set_if_float("focaldistance", focaldistance);
                self.set_if_float("fov", fov);
                self.set_if_float("halffov", halffov);
                kind
            }
            1 => {
                let mut kind = CameraKind::default_orthographic();
                let CameraKind::Orthographic {
                    frameaspectratio,
                    screenwindow,
                    lensradius,
                    focaldistance,
                } = &mut kind
                else {
                    unreachable!();
                };
                self.set_if_float("frameaspectratio", frameaspectratio);
                self.set_if_float_array("screenwindow", ParamType::Float, screenwindow);
                self.set_if_float("lensradius", lensradius);
                self.set_if_float("focaldistance", focaldistance);
                kind
            }
            2 => {
                let mut kind = CameraKind::default_environment();
                let CameraKind::Environment {
                    frameaspectratio,
                    screenwindow,
                } = &mut kind
                else {
                    unreachable!();
                };
                self.set_if_float("frameaspectratio", frameaspectratio);
                self.set_if_float_array("screenwindow", ParamType::Float, screenwindow);
                kind
            }
            3 => {
                let mut kind = CameraKind::default_realistic();
                let CameraKind::Realistic {
                    lensfile,
                    aperturediameter,
                    focusdistance,
                    simpleweighting,
                } = &mut kind
                else {
                    unreachable!();
                };
                if let Some(file) = self.params.string("lensfile") {
                    *lensfile = file.to_string();
                }
                self.set_if_float("aperturediameter", aperturediameter);
                self.set_if_float("focusdistance", focusdistance);
                self.set_if_bool("simpleweighting", simpleweighting);
                kind
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("camera"))),
        };

        // The stack holds world-to-camera at this point; the scene stores
        // its inverse.
        let camera_to_world = match self.transforms.top().inverse() {
            Some(inverse) => inverse,
            None => return Err(self.error(ErrorKind::NonInvertibleTransform)),
        };

        let mut camera = Camera {
            camera_to_world,
            shutteropen: 0.0,
            shutterclose: 1.0,
            kind,
        };
        self.set_if_float("shutteropen", &mut camera.shutteropen);
        self.set_if_float("shutterclose", &mut camera.shutterclose);

        // Declaring a camera also defines the "camera" coordinate system.
        self.transforms.coordinate_system("camera");

        self.scene.camera = Some(camera);
        Ok(())
    }

    fn parse_film(&mut self) -> Result<()> {
        if self.enum_arg(0) != 0 {
            return Err(self.error(ErrorKind::InvalidEnumValue("film")));
        }

        let mut film = Film::default();
        let Film::Image {
            xresolution,
            yresolution,
            cropwindow,
            scale,
            maxsampleluminance,
            diagonal,
            filename,
        } = &mut film;
        self.set_if_int("xresolution", xresolution);
        self.set_if_int("yresolution", yresolution);
        self.set_if_float_array("cropwindow", ParamType::Float, cropwindow);
        self.set_if_float("scale", scale);
        self.set_if_float("maxsampleluminance", maxsampleluminance);
        self.set_if_float("diagonal", diagonal);
        if let Some(name) = self.params.string("filename") {
            *filename = name.to_string();
        }

        self.scene.film = Some(film);
        Ok(())
    }

    fn parse_integrator(&mut self) -> Result<()> {
        fn strategy(index: Option<usize>, default: LightSampleStrategy) -> LightSampleStrategy {
            match index {
                Some(0) => LightSampleStrategy::Uniform,
                Some(1) => LightSampleStrategy::Power,
                Some(2) => LightSampleStrategy::Spatial,
                _ => default,
            }
        }

        let integrator = match self.enum_arg(0) {
            0 => {
                let mut maxdepth = 5;
                let mut pixelbounds = WHOLE_IMAGE;
                let mut visualizestrategies = false;
                let mut visualizeweights = false;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                self.set_if_bool("visualizestrategies", &mut visualizestrategies);
                self.set_if_bool("visualizeweights", &mut visualizeweights);
                Integrator::Bdpt {
                    maxdepth,
                    pixelbounds,
                    lightsamplestrategy: strategy(
                        self.params
                            .enumeration("lightsamplestrategy", LIGHT_SAMPLE_STRATEGIES),
                        LightSampleStrategy::Power,
                    ),
                    visualizestrategies,
                    visualizeweights,
                }
            }
            1 => {
                let mut maxdepth = 5;
                let mut pixelbounds = WHOLE_IMAGE;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                Integrator::DirectLighting {
                    strategy: strategy(
                        self.params.enumeration("strategy", LIGHT_SAMPLE_STRATEGIES),
                        LightSampleStrategy::Uniform,
                    ),
                    maxdepth,
                    pixelbounds,
                }
            }
            2 => {
                let mut maxdepth = 5;
                let mut bootstrapsamples = 100000;
                let mut chains = 1000;
                let mut mutationsperpixel = 100;
                let mut largestepprobability = 0.3;
                let mut sigma = 0.01;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int("bootstrapsamples", &mut bootstrapsamples);
                self.set_if_int("chains", &mut chains);
                self.set_if_int("mutationsperpixel", &mut mutationsperpixel);
                self.set_if_float("largestepprobability", &mut largestepprobability);
                self.set_if_float("sigma", &mut sigma);
                Integrator::Mlt {
                    maxdepth,
                    bootstrapsamples,
                    chains,
                    mutationsperpixel,
                    largestepprobability,
                    sigma,
                }
            }
            3 => {
                let mut maxdepth = 5;
                let mut pixelbounds = WHOLE_IMAGE;
                let mut rrthreshold = 1.0;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                self.set_if_float("rrthreshold", &mut rrthreshold);
                Integrator::Path {
                    maxdepth,
                    pixelbounds,
                    rrthreshold,
                    lightsamplestrategy: strategy(
                        self.params
                            .enumeration("lightsamplestrategy", LIGHT_SAMPLE_STRATEGIES),
                        LightSampleStrategy::Spatial,
                    ),
                }
            }
            4 => {
                let mut maxdepth = 5;
                let mut maxiterations = 64;
                let mut photonsperiteration = -1;
                let mut imagewritefrequency = 1 << 30;
                let mut radius = 1.0;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int("maxiterations", &mut maxiterations);
                self.set_if_int("photonsperiteration", &mut photonsperiteration);
                self.set_if_int("imagewritefrequency", &mut imagewritefrequency);
                self.set_if_float("radius", &mut radius);
                Integrator::Sppm {
                    maxdepth,
                    maxiterations,
                    photonsperiteration,
                    imagewritefrequency,
                    radius,
                }
            }
            5 => {
                let mut maxdepth = 5;
                let mut pixelbounds = WHOLE_IMAGE;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                Integrator::Whitted {
                    maxdepth,
                    pixelbounds,
                }
            }
            6 => {
                let mut maxdepth = 5;
                let mut pixelbounds = WHOLE_IMAGE;
                let mut rrthreshold = 1.0;
                self.set_if_int("maxdepth", &mut maxdepth);
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                self.set_if_float("rrthreshold", &mut rrthreshold);
                Integrator::VolPath {
                    maxdepth,
                    pixelbounds,
                    rrthreshold,
                }
            }
            7 => {
                let mut pixelbounds = WHOLE_IMAGE;
                let mut cossample = true;
                let mut nsamples = 64;
                self.set_if_int_array("pixelbounds", &mut pixelbounds);
                self.set_if_bool("cossample", &mut cossample);
                self.set_if_int("nsamples", &mut nsamples);
                Integrator::Ao {
                    pixelbounds,
                    cossample,
                    nsamples,
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("integrator"))),
        };

        self.scene.integrator = Some(integrator);
        Ok(())
    }

    fn parse_pixel_filter(&mut self) -> Result<()> {
        let kind = match self.enum_arg(0) {
            0 => FilterKind::Box,
            1 => {
                let mut alpha = 2.0;
                self.set_if_float("alpha", &mut alpha);
                FilterKind::Gaussian { alpha }
            }
            2 => {
                let mut b = 1.0 / 3.0;
                let mut c = 1.0 / 3.0;
                self.set_if_float("B", &mut b);
                self.set_if_float("C", &mut c);
                FilterKind::Mitchell { b, c }
            }
            3 => {
                let mut tau = 3.0;
                self.set_if_float("tau", &mut tau);
                FilterKind::Sinc { tau }
            }
            4 => FilterKind::Triangle,
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("filter"))),
        };

        let (xwidth, ywidth) = Filter::default_widths(&kind);
        let mut filter = Filter {
            xwidth,
            ywidth,
            kind,
        };
        self.set_if_float("xwidth", &mut filter.xwidth);
        self.set_if_float("ywidth", &mut filter.ywidth);

        self.scene.filter = Some(filter);
        Ok(())
    }

    fn parse_sampler(&mut self) -> Result<()> {
        let mut pixelsamples = 16;
        self.set_if_int("pixelsamples", &mut pixelsamples);

        let sampler = match self.enum_arg(0) {
            0 => Sampler::ZeroTwoSequence {
                pixelsamples,
                legacy_name: false,
            },
            1 => Sampler::ZeroTwoSequence {
                pixelsamples,
                legacy_name: true,
            },
            2 => Sampler::Halton { pixelsamples },
            3 => Sampler::MaxMinDist { pixelsamples },
            4 => Sampler::Random { pixelsamples },
            5 => Sampler::Sobol { pixelsamples },
            6 => {
                let mut jitter = true;
                let mut xsamples = 2;
                let mut ysamples = 2;
                self.set_if_bool("jitter", &mut jitter);
                self.set_if_int("xsamples", &mut xsamples);
                self.set_if_int("ysamples", &mut ysamples);
                Sampler::Stratified {
                    jitter,
                    xsamples,
                    ysamples,
                }
            }
            _ => return Err(self.error(ErrorKind::InvalidEnumValue("sampler"))),
        };

        self.scene.sampler = Some(sampler);
        Ok(())
    }
}

/// Float parameters that would override a field of the given material when
/// they appear on a `Shape` directive.
fn override_float_names(kind: &MaterialKind) -> &'static [&'static str] {
    match kind {
        MaterialKind::Disney(_) => &[
            "anisotropic",
            "clearcoat",
            "clearcoatgloss",
            "eta",
            "metallic",
            "roughness",
            "sheen",
            "sheentint",
            "spectrans",
            "speculartint",
        ],
        MaterialKind::Fourier(_) => &[],
        MaterialKind::Glass(_) => &["eta", "uroughness", "vroughness"],
        MaterialKind::Hair(_) => &[
            "eumelanin",
            "pheomelanin",
            "eta",
            "beta_m",
            "beta_n",
            "alpha",
        ],
        MaterialKind::KdSubsurface(_) => &["eta", "uroughness", "vroughness"],
        MaterialKind::Matte(_) => &["sigma"],
        MaterialKind::Metal(_) => &["uroughness", "vroughness"],
        MaterialKind::Mirror(_) => &[],
        MaterialKind::Mix(_) => &[],
        MaterialKind::None => &[],
        MaterialKind::Plastic(_) => &["roughness"],
        MaterialKind::Substrate(_) => &["uroughness", "vroughness"],
        MaterialKind::Subsurface(_) => &["scale", "eta", "uroughness", "vroughness"],
        MaterialKind::Translucent(_) => &["roughness"],
        MaterialKind::Uber(_) => &["eta", "uroughness", "vroughness"],
    }
}
