//! lumen - a parser for PBRT v3 scene files
//! ==========================================
//!
//! For info about the PBRT file format, see:
//! <https://www.pbrt.org/fileformat-v3.html>
//!
//! Loading a file:
//!
//! ```no_run
//! let mut loader = lumen::Loader::new();
//! if loader.load("scene.pbrt") {
//!     let scene = loader.take_scene().unwrap();
//!     // ... process the scene ...
//! } else if let Some(err) = loader.error() {
//!     // [scene.pbrt, line 12, column 3] unknown directive
//!     eprintln!("{}", err);
//! }
//! ```
//!
//! Spectra are always converted to RGB at load time. PLY files are not
//! loaded automatically; call [`Scene::load_all_ply_meshes`] or
//! [`Scene::to_triangle_mesh`] for the shapes you care about.

pub mod color;
pub mod error;
pub mod math;
pub mod options;
pub mod ply;
pub mod reader;
pub mod scene;

pub use error::{Error, ErrorKind, Result};
pub use options::Options;
pub use reader::parser::Loader;
pub use scene::Scene;

/// Floating point type used throughout the crate.
pub type Float = f32;

/// Stable handle into one of the [`Scene`]'s entity vectors.
pub type Index = u32;

/// Sentinel value for an unset handle.
pub const INVALID_INDEX: Index = u32::MAX;
