//! Folio procedural book engine
//!
//! A book is a stack of papers held by a binding. This crate builds the
//! paper meshes, turns papers along a rolling cylinder and keeps the binding
//! geometry in step with the stack:
//! - [`book::Book`] - The aggregate: build, per-frame update, turning API
//! - [`paper`] - Sheet state machine (turning, falling, mesh variants)
//! - [`pattern`] - Node-based grid patterns with seams, holes and borders
//! - [`binding`] - Staple and wire bindings
//! - [`content`] - Page contents and logical page numbering
//! - [`auto_turn`] - Scripted turn sequences
//! - [`registry::BookRegistry`] - Host-owned registry for cross-book queries
//! - [`instancing`] - GPU instance data of the resting page stack
//!
//! Geometry is produced as plain vertex, normal, UV and index arrays; the
//! `bevy` feature adds conversions to Bevy meshes in `render`.

pub mod auto_turn;
pub mod binding;
pub mod book;
pub mod content;
pub mod error;
pub mod geometry;
pub mod instancing;
pub mod paper;
pub mod pattern;
pub mod pool;
pub mod raycast;
pub mod registry;

#[cfg(feature = "bevy")]
pub mod render;

pub use auto_turn::{AutoTurnDirection, AutoTurnMode, AutoTurnSequence, AutoTurnStep};
pub use binding::{BinderMesh, Binding, BookBound, StapleBound, WireBound};
pub use book::Book;
pub use content::{
    BookContent, ContentId, ContentKind, EmptyPageContent, LivePageContent, PageContent, SpritePageContent,
    Texture, TextureHandle, TextureSt,
};
pub use error::{BookError, PatternError};
pub use instancing::PaperInstance;
pub use paper::{MeshKind, Paper};
pub use pattern::{PaperMeshData, PaperPattern};
pub use raycast::{BookRaycastHit, Ray};
pub use registry::{BookId, BookRegistry};

pub use folio_config as config;
