//! Book-level build options.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

use crate::binding::BindingSetup;
use crate::paper::PaperSetup;

/// Reading direction of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    UpToDown,
    DownToUp,
}

impl BookDirection {
    /// Vertical books turn their pages up or down; the spine runs along X.
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::UpToDown | Self::DownToUp)
    }

    /// Reversed books store their content back to front.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::RightToLeft | Self::DownToUp)
    }
}

/// Options applied when a book is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSetup {
    /// Start open state: 0 = closed on the front cover, 1 = closed on the back
    /// cover, values in between open the book part way.
    pub start_state: f32,
    pub cast_shadows: bool,
    /// Align the book to the local XZ plane, treated as the ground
    pub align_to_ground: bool,
    /// Hide the binder (staples or wire)
    pub hide_binder: bool,
    /// Disable shadows of the resting papers
    pub reduce_shadows: bool,
    /// Give resting papers a single submesh instead of front/back/border
    pub reduce_sub_meshes: bool,
    /// Cut holes into the hidden parts of sandwiched resting papers
    pub reduce_overdraw: bool,
    /// Render the resting page stack with GPU instancing (wire books only)
    pub use_paper_gpu_instancing: bool,
    pub cover_paper: PaperSetup,
    pub page_paper: PaperSetup,
}

impl Default for BookSetup {
    fn default() -> Self {
        Self {
            start_state: 0.0,
            cast_shadows: true,
            align_to_ground: false,
            hide_binder: false,
            reduce_shadows: false,
            reduce_sub_meshes: false,
            reduce_overdraw: false,
            use_paper_gpu_instancing: false,
            cover_paper: PaperSetup::cover(),
            page_paper: PaperSetup::page(),
        }
    }
}

impl BookSetup {
    pub fn clamped(mut self) -> Self {
        self.set_start_state(self.start_state);
        self.cover_paper = self.cover_paper.clamped();
        self.page_paper = self.page_paper.clamped();
        self
    }

    pub fn set_start_state(&mut self, value: f32) {
        self.start_state = value.clamp(0.0, 1.0);
    }
}

/// Complete description of a book: build options plus binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct BookConfig {
    pub book: BookSetup,
    pub binding: BindingSetup,
}

impl BookConfig {
    pub fn clamped(self) -> Self {
        Self {
            book: self.book.clamped(),
            binding: self.binding.clamped(),
        }
    }
}
