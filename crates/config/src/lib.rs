//! Shared configuration for Folio books
//!
//! This crate is the single source of truth for every user-tunable value of a
//! procedural book: the cover and page paper classes, the binding (staple or
//! wire), the build options that trade visual fidelity for render cost and
//! the settings of scripted page turns.
//!
//! All setups deserialize with `#[serde(default)]`, so partial JSON documents
//! are accepted. Setters clamp into the documented ranges; values that arrive
//! through deserialization are brought into range with `clamped()`.

mod auto_turn;
mod binding;
mod book;
mod paper;

pub use auto_turn::*;
pub use binding::*;
pub use book::*;
pub use paper::*;

/// Linear RGBA color.
pub type Color = [f32; 4];

/// Opaque white.
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Opaque red, the default cover color.
pub const RED: Color = [1.0, 0.0, 0.0, 1.0];

/// Clamp an integer setting into an inclusive range.
pub(crate) fn clamp_u32(value: u32, min: u32, max: u32) -> u32 {
    value.clamp(min, max)
}
