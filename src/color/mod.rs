pub mod cie;
pub mod spectrum;

pub use spectrum::{blackbody_to_rgb, spectrum_to_rgb, xyz_to_rgb};
