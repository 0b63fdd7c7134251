//! Shared types for the station diorama.
//!
//! # Invariants
//! - A [`Transform`] always composes as rotate, then scale, then translate, then
//!   the camera world matrix.
//! - Colors are 8-bit RGBA; conversions to float vectors are normalized to `0..=1`.

mod types;

pub use types::{Color, Transform, rotation_from_degrees};

pub fn crate_info() -> &'static str {
    "station-common v0.1.0"
}
