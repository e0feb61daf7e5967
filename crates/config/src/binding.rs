//! Binding setups: saddle-stitch staples and spiral wire.

use serde::{Deserialize, Serialize};

use crate::{clamp_u32, Color, WHITE};

pub const MIN_STAPLE_THICKNESS: f32 = 0.01;
pub const MAX_STAPLE_THICKNESS: f32 = 0.1;
pub const MIN_STAPLE_CROWN: f32 = 0.04;
pub const MAX_STAPLE_CROWN: f32 = 0.4;
pub const MIN_STAPLE_COUNT: u32 = 2;
pub const MAX_STAPLE_COUNT: u32 = 10;

pub const MIN_WIRE_THICKNESS: f32 = 0.02;
pub const MAX_WIRE_THICKNESS: f32 = 0.1;
pub const MIN_TWIN_LOOP_COUNT: u32 = 2;
pub const MAX_TWIN_LOOP_COUNT: u32 = 10;

/// Quality range of binder meshes (staples and wire)
pub const MIN_BINDER_QUALITY: u32 = 0;
pub const MAX_BINDER_QUALITY: u32 = 5;

/// Quality range of the paper mesh on the binding side of a stapled book
pub const MIN_BINDING_QUALITY: u32 = 1;
pub const MAX_BINDING_QUALITY: u32 = 5;

/// Staple geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StapleSetup {
    pub color: Color,
    pub thickness: f32,
    /// Length of the top portion of the staple
    pub crown: f32,
    /// Blank space between the staples and the horizontal edges, 0..1
    pub margin: f32,
    /// Number of staples
    pub count: u32,
    /// Mesh quality of the staples
    pub quality: u32,
}

impl Default for StapleSetup {
    fn default() -> Self {
        Self {
            color: WHITE,
            thickness: 0.05,
            crown: 0.2,
            margin: 0.1,
            count: 4,
            quality: 3,
        }
    }
}

impl StapleSetup {
    pub fn clamped(mut self) -> Self {
        self.set_thickness(self.thickness);
        self.set_crown(self.crown);
        self.set_margin(self.margin);
        self.set_count(self.count);
        self.set_quality(self.quality);
        self
    }

    pub fn set_thickness(&mut self, value: f32) {
        self.thickness = value.clamp(MIN_STAPLE_THICKNESS, MAX_STAPLE_THICKNESS);
    }

    pub fn set_crown(&mut self, value: f32) {
        self.crown = value.clamp(MIN_STAPLE_CROWN, MAX_STAPLE_CROWN);
    }

    pub fn set_margin(&mut self, value: f32) {
        self.margin = value.clamp(0.0, 1.0);
    }

    pub fn set_count(&mut self, value: u32) {
        self.count = clamp_u32(value, MIN_STAPLE_COUNT, MAX_STAPLE_COUNT);
    }

    pub fn set_quality(&mut self, value: u32) {
        self.quality = clamp_u32(value, MIN_BINDER_QUALITY, MAX_BINDER_QUALITY);
    }
}

/// Saddle-stitch binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StapleBindingSetup {
    /// Quality of the paper mesh on the binding side
    pub quality: u32,
    pub staple: StapleSetup,
}

impl Default for StapleBindingSetup {
    fn default() -> Self {
        Self {
            quality: 3,
            staple: StapleSetup::default(),
        }
    }
}

impl StapleBindingSetup {
    pub fn clamped(mut self) -> Self {
        self.set_quality(self.quality);
        self.staple = self.staple.clamped();
        self
    }

    pub fn set_quality(&mut self, value: u32) {
        self.quality = clamp_u32(value, MIN_BINDING_QUALITY, MAX_BINDING_QUALITY);
    }
}

/// Spiral wire geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireSetup {
    pub color: Color,
    pub thickness: f32,
    /// Blank space between the wire and the horizontal edges, 0..1
    pub margin: f32,
    /// Space between the two loops of a twin loop, 0..1
    pub twin_loop_space: f32,
    /// Number of twin loops
    pub twin_loop_count: u32,
    /// Mesh quality of the wire
    pub quality: u32,
}

impl Default for WireSetup {
    fn default() -> Self {
        Self {
            color: WHITE,
            thickness: 0.05,
            margin: 0.1,
            twin_loop_space: 0.25,
            twin_loop_count: 4,
            quality: 3,
        }
    }
}

impl WireSetup {
    pub fn clamped(mut self) -> Self {
        self.set_thickness(self.thickness);
        self.set_margin(self.margin);
        self.set_twin_loop_space(self.twin_loop_space);
        self.set_twin_loop_count(self.twin_loop_count);
        self.set_quality(self.quality);
        self
    }

    pub fn set_thickness(&mut self, value: f32) {
        self.thickness = value.clamp(MIN_WIRE_THICKNESS, MAX_WIRE_THICKNESS);
    }

    pub fn set_margin(&mut self, value: f32) {
        self.margin = value.clamp(0.0, 1.0);
    }

    pub fn set_twin_loop_space(&mut self, value: f32) {
        self.twin_loop_space = value.clamp(0.0, 1.0);
    }

    pub fn set_twin_loop_count(&mut self, value: u32) {
        self.twin_loop_count = clamp_u32(value, MIN_TWIN_LOOP_COUNT, MAX_TWIN_LOOP_COUNT);
    }

    pub fn set_quality(&mut self, value: u32) {
        self.quality = clamp_u32(value, MIN_BINDER_QUALITY, MAX_BINDER_QUALITY);
    }
}

/// Spiral wire binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireBindingSetup {
    pub wire: WireSetup,
}

impl WireBindingSetup {
    pub fn clamped(mut self) -> Self {
        self.wire = self.wire.clamped();
        self
    }
}

/// The binding of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingSetup {
    Staple(StapleBindingSetup),
    Wire(WireBindingSetup),
}

impl Default for BindingSetup {
    fn default() -> Self {
        Self::Staple(StapleBindingSetup::default())
    }
}

impl BindingSetup {
    pub fn clamped(self) -> Self {
        match self {
            Self::Staple(setup) => Self::Staple(setup.clamped()),
            Self::Wire(setup) => Self::Wire(setup.clamped()),
        }
    }

    pub fn is_staple(&self) -> bool {
        matches!(self, Self::Staple(_))
    }

    pub fn is_wire(&self) -> bool {
        matches!(self, Self::Wire(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staple_defaults_in_range() {
        let setup = StapleSetup::default();
        assert_eq!(setup.clone().clamped(), setup);
    }

    #[test]
    fn test_wire_setters_clamp() {
        let mut wire = WireSetup::default();
        wire.set_thickness(0.001);
        wire.set_twin_loop_count(40);
        wire.set_quality(7);
        assert_eq!(wire.thickness, MIN_WIRE_THICKNESS);
        assert_eq!(wire.twin_loop_count, MAX_TWIN_LOOP_COUNT);
        assert_eq!(wire.quality, MAX_BINDER_QUALITY);
    }

    #[test]
    fn test_binding_json_tagged() {
        let json = r#"{ "kind": "wire", "wire": { "twin_loop_count": 6 } }"#;
        let binding: BindingSetup = serde_json::from_str(json).unwrap();
        match binding {
            BindingSetup::Wire(setup) => {
                assert_eq!(setup.wire.twin_loop_count, 6);
                assert_eq!(setup.wire.thickness, 0.05);
            }
            BindingSetup::Staple(_) => panic!("expected wire binding"),
        }
    }

    #[test]
    fn test_binding_clamped_from_json() {
        let json = r#"{ "kind": "staple", "quality": 12, "staple": { "count": 1 } }"#;
        let binding: BindingSetup = serde_json::from_str(json).unwrap();
        let BindingSetup::Staple(setup) = binding.clamped() else {
            panic!("expected staple binding");
        };
        assert_eq!(setup.quality, MAX_BINDING_QUALITY);
        assert_eq!(setup.staple.count, MIN_STAPLE_COUNT);
    }
}
