//! Binding strategies.
//!
//! A bound decides where every paper rests around the spine, builds the paper
//! patterns for its binding geometry and owns the binder mesh (staples or a
//! wire coil). Bounds are created once per build from a [`Binding`] and the
//! [`StackInfo`] of the freshly created papers.

pub mod staple;
pub mod wire;

pub use staple::StapleBound;
pub use wire::WireBound;

use std::fmt;

use glam::{Affine3A, Vec2, Vec3};

use folio_config::{BindingSetup, BookDirection, Color, PaperUvMargin, StapleBindingSetup, WireBindingSetup};

use crate::error::BookError;
use crate::paper::Paper;
use crate::pattern::PaperPattern;
use crate::pool::MeshPools;

/// Summary of the paper stack a bound is built for.
#[derive(Debug, Clone, PartialEq)]
pub struct StackInfo {
    /// Thickness of every paper, front to back
    pub thicknesses: Vec<f32>,
    pub total_thickness: f32,
    pub min_paper_thickness: f32,
    pub max_paper_thickness: f32,
    pub min_paper_width: f32,
    pub min_paper_height: f32,
    pub has_cover: bool,
    pub first_page_paper_index: usize,
    pub align_to_ground: bool,
    pub direction: BookDirection,
    pub cover_thickness: f32,
    pub cover_margin: f32,
    pub page_margin: f32,
}

impl StackInfo {
    /// Measure the stack. Cover and page extremes are sampled from the first
    /// and the middle paper.
    pub fn measure(papers: &[Paper], has_cover: bool, first_page_paper_index: usize) -> Self {
        let thicknesses: Vec<f32> = papers.iter().map(Paper::thickness).collect();
        let (first, middle) = match (papers.first(), papers.get(papers.len() / 2)) {
            (Some(first), Some(middle)) => (first, middle),
            _ => {
                return Self {
                    thicknesses,
                    total_thickness: 0.0,
                    min_paper_thickness: 0.0,
                    max_paper_thickness: 0.0,
                    min_paper_width: 0.0,
                    min_paper_height: 0.0,
                    has_cover,
                    first_page_paper_index,
                    align_to_ground: false,
                    direction: BookDirection::default(),
                    cover_thickness: 0.0,
                    cover_margin: 0.0,
                    page_margin: 0.0,
                };
            }
        };

        let cover = papers.iter().find(|p| p.is_cover()).unwrap_or(first);
        let page = papers.iter().find(|p| !p.is_cover()).unwrap_or(first);

        Self {
            total_thickness: thicknesses.iter().sum(),
            thicknesses,
            min_paper_thickness: first.thickness().min(middle.thickness()),
            max_paper_thickness: first.thickness().max(middle.thickness()),
            min_paper_width: first.size().x.min(middle.size().x),
            min_paper_height: first.size().y.min(middle.size().y),
            has_cover,
            first_page_paper_index,
            align_to_ground: false,
            direction: first.settings().direction,
            cover_thickness: cover.thickness(),
            cover_margin: if has_cover { cover.margin() } else { 0.0 },
            page_margin: page.margin(),
        }
    }

    pub fn paper_count(&self) -> usize {
        self.thicknesses.len()
    }

    /// Summed thickness of the papers from `start` to the back.
    pub fn stack_height(&self, start: usize) -> f32 {
        self.thicknesses.iter().skip(start).sum()
    }
}

/// Inputs of [`BookBound::create_pattern`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRequest {
    /// 0 for lowpoly patterns, the paper quality for highpoly ones
    pub quality: u32,
    pub size: Vec2,
    pub thickness: f32,
    pub uv_margin: PaperUvMargin,
    /// Cut out the faces hidden by the neighboring papers
    pub reduce_overdraw: bool,
    pub reduce_sub_meshes: bool,
}

/// Triangle mesh of the staples or the wire, in binder space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinderMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl BinderMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Which papers need a mesh rebuild after [`BookBound::on_late_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRefresh {
    All,
    /// Only turning and falling papers
    Moving,
}

/// Binding-specific placement of papers around the spine.
pub trait BookBound: fmt::Debug + Send + Sync {
    /// Reject stacks the binding cannot hold.
    fn validate(stack: &StackInfo) -> Result<(), BookError>
    where
        Self: Sized;

    /// Whether every resting lowpoly paper can share one mesh.
    fn use_shared_mesh_data_for_lowpoly(&self) -> bool;

    fn binder_mesh(&self) -> &BinderMesh;

    /// Binder to book root.
    fn binder_transform(&self) -> Affine3A;

    fn binder_color(&self) -> Color;

    fn create_pattern(&self, request: &PatternRequest) -> PaperPattern;

    /// Place a paper at rest on its current stack.
    fn reset_paper_position(&self, papers: &mut [Paper], index: usize);

    /// Place a paper for its current turn progress.
    fn update_paper_position(&self, papers: &mut [Paper], index: usize);

    /// Per-frame binding work before the paper meshes are rebuilt.
    fn on_late_update(&mut self, papers: &mut [Paper], pools: &mut MeshPools) -> MeshRefresh;

    /// Book root position keeping the stack on the ground.
    fn root_position(&self, papers: &[Paper], current: Vec3) -> Vec3;
}

/// The bindings a book can be built with.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Staple(StapleBindingSetup),
    Wire(WireBindingSetup),
}

impl Default for Binding {
    fn default() -> Self {
        Self::Staple(StapleBindingSetup::default())
    }
}

impl From<BindingSetup> for Binding {
    fn from(setup: BindingSetup) -> Self {
        match setup.clamped() {
            BindingSetup::Staple(setup) => Self::Staple(setup),
            BindingSetup::Wire(setup) => Self::Wire(setup),
        }
    }
}

impl Binding {
    pub fn is_staple(&self) -> bool {
        matches!(self, Self::Staple(_))
    }

    pub fn is_wire(&self) -> bool {
        matches!(self, Self::Wire(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Staple(_) => "staple",
            Self::Wire(_) => "wire",
        }
    }

    pub fn validate(&self, stack: &StackInfo) -> Result<(), BookError> {
        match self {
            Self::Staple(_) => StapleBound::validate(stack),
            Self::Wire(_) => WireBound::validate(stack),
        }
    }

    /// Create the bound and move every paper to its rest pose.
    pub fn create_bound(&self, stack: StackInfo, papers: &mut [Paper]) -> Result<Box<dyn BookBound>, BookError> {
        Ok(match self {
            Self::Staple(setup) => Box::new(StapleBound::new(setup, stack, papers)?),
            Self::Wire(setup) => Box::new(WireBound::new(setup, stack, papers)?),
        })
    }
}

/// Point on a circle of `radius` around the spine at `degrees` from +X.
pub(crate) fn spine_point(degrees: f32, radius: f32) -> Vec3 {
    crate::geometry::rot_z(degrees) * Vec3::X * radius
}
