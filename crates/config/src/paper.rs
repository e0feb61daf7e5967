//! Paper class setup (covers and pages).

use serde::{Deserialize, Serialize};

use crate::book::BookDirection;
use crate::{clamp_u32, Color, RED, WHITE};

/// Minimum paper width and height in world units
pub const MIN_PAPER_SIZE: f32 = 1.0;

/// Minimum paper thickness
pub const MIN_PAPER_THICKNESS: f32 = 0.001;

/// Maximum paper thickness
pub const MAX_PAPER_THICKNESS: f32 = 0.1;

/// Lowest paper mesh quality level
pub const MIN_PAPER_QUALITY: u32 = 1;

/// Highest paper mesh quality level
pub const MAX_PAPER_QUALITY: u32 = 5;

/// Largest blank margin around page content, as a fraction of the page
pub const MAX_UV_MARGIN: f32 = 0.25;

/// Blank space around the page content, as fractions of the paper size.
///
/// The stored values are expressed for a left-to-right book. Use
/// [`PaperUvMargin::transform`] to get the margin in paper-local axes for
/// other reading directions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperUvMargin {
    pub left: f32,
    pub right: f32,
    pub down: f32,
    pub up: f32,
}

impl PaperUvMargin {
    pub fn new(left: f32, right: f32, down: f32, up: f32) -> Self {
        Self {
            left: clamp_margin(left),
            right: clamp_margin(right),
            down: clamp_margin(down),
            up: clamp_margin(up),
        }
    }

    /// Margin with every side forced into `[0, MAX_UV_MARGIN]`.
    pub fn clamped(self) -> Self {
        Self::new(self.left, self.right, self.down, self.up)
    }

    pub fn set_left(&mut self, value: f32) {
        self.left = clamp_margin(value);
    }

    pub fn set_right(&mut self, value: f32) {
        self.right = clamp_margin(value);
    }

    pub fn set_down(&mut self, value: f32) {
        self.down = clamp_margin(value);
    }

    pub fn set_up(&mut self, value: f32) {
        self.up = clamp_margin(value);
    }

    /// Remap the margin into paper-local axes for the given reading direction.
    pub fn transform(&self, direction: BookDirection) -> Self {
        match direction {
            BookDirection::LeftToRight => *self,
            BookDirection::RightToLeft => Self {
                left: self.right,
                right: self.left,
                down: self.down,
                up: self.up,
            },
            BookDirection::UpToDown => Self {
                left: self.up,
                right: self.down,
                down: self.left,
                up: self.right,
            },
            BookDirection::DownToUp => Self {
                left: self.down,
                right: self.up,
                down: self.left,
                up: self.right,
            },
        }
    }

    /// Map a paper UV into content UV, stretching the area inside the margin to `[0, 1]`.
    pub fn fix_uv(&self, uv: [f32; 2]) -> [f32; 2] {
        [
            inverse_lerp(self.left, 1.0 - self.right, uv[0]),
            inverse_lerp(self.down, 1.0 - self.up, uv[1]),
        ]
    }
}

fn clamp_margin(value: f32) -> f32 {
    value.clamp(0.0, MAX_UV_MARGIN)
}

fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Setup of one paper class.
///
/// A book has two classes: covers and pages. Width and height are given for a
/// horizontal book; vertical books swap them (see [`PaperSetup::size`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSetup {
    /// Base color multiplied with the page texture
    pub color: Color,
    /// Paper width (distance from the spine to the outer edge)
    pub width: f32,
    /// Paper height (length along the spine)
    pub height: f32,
    pub thickness: f32,
    /// Resistance to bending, 0 = soft, 1 = stiff
    pub stiffness: f32,
    /// Mesh quality of the paper while it is turning
    pub quality: u32,
    pub uv_margin: PaperUvMargin,
}

impl Default for PaperSetup {
    fn default() -> Self {
        Self {
            color: WHITE,
            width: MIN_PAPER_SIZE * 2.0,
            height: MIN_PAPER_SIZE * 2.0,
            thickness: MIN_PAPER_THICKNESS * 2.0,
            stiffness: 0.1,
            quality: 3,
            uv_margin: PaperUvMargin::default(),
        }
    }
}

impl PaperSetup {
    /// Default cover setup: red, 2.1 x 3.1, thick and fairly stiff.
    pub fn cover() -> Self {
        Self {
            color: RED,
            width: 2.1,
            height: 3.1,
            thickness: 0.04,
            stiffness: 0.5,
            ..Self::default()
        }
    }

    /// Default page setup: white, 2 x 3, thin and soft.
    pub fn page() -> Self {
        Self {
            color: WHITE,
            width: 2.0,
            height: 3.0,
            thickness: 0.02,
            stiffness: 0.2,
            ..Self::default()
        }
    }

    /// Setup with every value forced into range.
    pub fn clamped(mut self) -> Self {
        self.set_width(self.width);
        self.set_height(self.height);
        self.set_thickness(self.thickness);
        self.set_stiffness(self.stiffness);
        self.set_quality(self.quality);
        self.uv_margin = self.uv_margin.clamped();
        self
    }

    pub fn set_width(&mut self, value: f32) {
        self.width = value.max(MIN_PAPER_SIZE);
    }

    pub fn set_height(&mut self, value: f32) {
        self.height = value.max(MIN_PAPER_SIZE);
    }

    pub fn set_thickness(&mut self, value: f32) {
        self.thickness = value.clamp(MIN_PAPER_THICKNESS, MAX_PAPER_THICKNESS);
    }

    pub fn set_stiffness(&mut self, value: f32) {
        self.stiffness = value.clamp(0.0, 1.0);
    }

    pub fn set_quality(&mut self, value: u32) {
        self.quality = clamp_u32(value, MIN_PAPER_QUALITY, MAX_PAPER_QUALITY);
    }

    /// Paper size in paper-local axes (x across, y along the spine).
    pub fn size(&self, direction: BookDirection) -> [f32; 2] {
        if direction.is_vertical() {
            [self.height, self.width]
        } else {
            [self.width, self.height]
        }
    }

    /// UV margin in paper-local axes.
    pub fn uv_margin(&self, direction: BookDirection) -> PaperUvMargin {
        self.uv_margin.transform(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classes() {
        let cover = PaperSetup::cover();
        let page = PaperSetup::page();
        assert_eq!(cover.color, RED);
        assert_eq!(cover.thickness, 0.04);
        assert_eq!(page.size(BookDirection::LeftToRight), [2.0, 3.0]);
        assert_eq!(page.quality, 3);
    }

    #[test]
    fn test_vertical_size_swaps() {
        let page = PaperSetup::page();
        assert_eq!(page.size(BookDirection::UpToDown), [3.0, 2.0]);
        assert_eq!(page.size(BookDirection::DownToUp), [3.0, 2.0]);
    }

    #[test]
    fn test_setters_clamp() {
        let mut setup = PaperSetup::default();
        setup.set_width(0.2);
        setup.set_thickness(1.0);
        setup.set_stiffness(-3.0);
        setup.set_quality(9);
        assert_eq!(setup.width, MIN_PAPER_SIZE);
        assert_eq!(setup.thickness, MAX_PAPER_THICKNESS);
        assert_eq!(setup.stiffness, 0.0);
        assert_eq!(setup.quality, MAX_PAPER_QUALITY);
    }

    #[test]
    fn test_margin_transform() {
        let margin = PaperUvMargin::new(0.1, 0.2, 0.05, 0.15);

        let rtl = margin.transform(BookDirection::RightToLeft);
        assert_eq!((rtl.left, rtl.right), (0.2, 0.1));

        let utd = margin.transform(BookDirection::UpToDown);
        assert_eq!((utd.left, utd.right, utd.down, utd.up), (0.15, 0.05, 0.1, 0.2));

        let dtu = margin.transform(BookDirection::DownToUp);
        assert_eq!((dtu.left, dtu.right, dtu.down, dtu.up), (0.05, 0.15, 0.1, 0.2));
    }

    #[test]
    fn test_fix_uv() {
        let margin = PaperUvMargin::new(0.1, 0.1, 0.0, 0.2);
        let uv = margin.fix_uv([0.1, 0.8]);
        assert!((uv[0] - 0.0).abs() < 1e-6);
        assert!((uv[1] - 1.0).abs() < 1e-6);
        let uv = margin.fix_uv([0.5, 0.4]);
        assert!((uv[0] - 0.5).abs() < 1e-6);
        assert!((uv[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_margin_clamps() {
        let margin = PaperUvMargin::new(0.5, -1.0, 0.1, 0.3);
        assert_eq!(margin.left, MAX_UV_MARGIN);
        assert_eq!(margin.right, 0.0);
        assert_eq!(margin.up, MAX_UV_MARGIN);
    }
}
