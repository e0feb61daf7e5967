//! The book aggregate.
//!
//! A [`Book`] owns its content, its binding and, once built, the papers, the
//! bound and the mesh pools. The host drives it with [`Book::update`] once per
//! frame and with the turning calls from its input handling. All geometry is
//! expressed in book space; `transform` maps it into the host's world.

use std::collections::HashSet;
use std::sync::Arc;

use glam::{Affine3A, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, warn};

use folio_config::{AutoTurnSetting, AutoTurnSettings, BookConfig, BookDirection, BookSetup, PaperSetup};

use crate::auto_turn::{AutoTurnDirection, AutoTurnSequence, AutoTurnStep, SequenceAction};
use crate::binding::{BinderMesh, Binding, BookBound, MeshRefresh, PatternRequest, StackInfo};
use crate::content::{BookContent, ContentId};
use crate::error::BookError;
use crate::geometry::{lerp, rot_y};
use crate::instancing::{self, PaperInstance};
use crate::paper::{MeshKind, Paper, PaperSettings, PaperStack};
use crate::pattern::{PaperMeshData, PaperPattern};
use crate::pool::{MeshDataRef, MeshPools, PaperMeshDataPool, PoolKind};
use crate::raycast::{BookRaycastHit, Ray};

/// State that only exists while the book is built.
#[derive(Debug)]
struct BuiltBook {
    papers: Vec<Paper>,
    bound: Box<dyn BookBound>,
    pools: MeshPools,
    /// Paper currently turned by the user
    selected: Option<usize>,
    /// Book root inside the book transform
    root: Affine3A,
    /// Shared mesh drawn through instancing, if enabled
    instanced_mesh: Option<MeshDataRef>,
    instances: Vec<PaperInstance>,
}

impl BuiltBook {
    fn stack<'a>(&'a mut self, content: &'a BookContent, parent: Affine3A) -> PaperStack<'a> {
        PaperStack {
            papers: &mut self.papers,
            bound: self.bound.as_ref(),
            pools: &mut self.pools,
            content,
            parent,
        }
    }

    /// Papers the user can grab right now.
    fn front_papers(&self) -> Vec<usize> {
        let n = self.papers.len();
        let mut front = Vec::with_capacity(3);
        if let Some(i) = self.selected {
            if i > 0 {
                front.push(i - 1);
            }
            front.push(i);
            if i + 1 < n {
                front.push(i + 1);
            }
            return front;
        }

        if let Some(i) = self.papers.iter().position(Paper::is_on_right_stack) {
            if i > 0 {
                front.push(i - 1);
            }
            front.push(i);
        } else if n > 0 {
            front.push(n - 1);
        }
        front
    }

    /// Paper sides that are visible or about to become visible, as
    /// `(paper index, back side)` pairs.
    fn active_sides(&self) -> Vec<(usize, bool)> {
        let n = self.papers.len();
        let mut sides = Vec::new();
        let mut add = |side: (usize, bool)| {
            if !sides.contains(&side) {
                sides.push(side);
            }
        };

        for (i, paper) in self.papers.iter().enumerate() {
            if paper.is_falling() || paper.is_turning() {
                if i > 0 {
                    add((i - 1, true));
                }
                add((i, false));
                add((i, true));
                if i + 1 < n {
                    add((i + 1, false));
                }
            } else if paper.is_on_right_stack() {
                if i > 0 {
                    add((i - 1, true));
                }
                add((i, false));
                break;
            }
        }

        if sides.is_empty() && n > 0 {
            sides.push((n - 1, true));
        }
        sides
    }
}

/// A procedural book.
#[derive(Debug)]
pub struct Book {
    setup: BookSetup,
    binding: Option<Binding>,
    content: BookContent,
    /// Book space to world
    transform: Affine3A,
    built: Option<BuiltBook>,

    clock: f32,
    frame_dt: f32,
    was_idle: bool,
    rng: StdRng,
    auto_turn: Option<AutoTurnSequence>,
    auto_turning_end_time: f32,
}

impl Book {
    pub fn new(config: BookConfig, content: BookContent) -> Self {
        let config = config.clamped();
        Self {
            setup: config.book,
            binding: Some(config.binding.into()),
            content,
            transform: Affine3A::IDENTITY,
            built: None,
            clock: 0.0,
            frame_dt: 0.0,
            was_idle: false,
            rng: StdRng::from_os_rng(),
            auto_turn: None,
            auto_turning_end_time: 0.0,
        }
    }

    /// Use a seeded generator for the random auto-turn settings.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn setup(&self) -> &BookSetup {
        &self.setup
    }

    /// Replace the build options. Clears the book.
    pub fn set_setup(&mut self, setup: BookSetup) {
        self.setup = setup.clamped();
        self.clear();
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Replace the binding. Clears the book.
    pub fn set_binding(&mut self, binding: Option<Binding>) {
        self.binding = binding;
        self.clear();
    }

    pub fn content(&self) -> &BookContent {
        &self.content
    }

    /// Content slots stay where they are; call [`Book::refresh_content`] after
    /// changing textures of a built book.
    pub fn content_mut(&mut self) -> &mut BookContent {
        &mut self.content
    }

    /// Replace the content. Clears the book.
    pub fn set_content(&mut self, content: BookContent) {
        self.content = content;
        self.clear();
    }

    pub fn direction(&self) -> BookDirection {
        self.content.direction
    }

    pub fn transform(&self) -> Affine3A {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
        self.was_idle = false;
    }

    /// Seconds accumulated by [`Book::update`].
    pub fn time(&self) -> f32 {
        self.clock
    }

    /// (Re)build every paper, the binding and the mesh pools.
    ///
    /// On failure the book is left cleared.
    pub fn build(&mut self) -> Result<(), BookError> {
        self.clear();
        match self.build_papers() {
            Ok(built) => {
                let count = built.papers.len();
                self.built = Some(built);
                self.was_idle = false;
                self.late_update(0.0, true);
                debug!(papers = count, "Book built");
                Ok(())
            }
            Err(err) => {
                error!(%err, "Book build failed");
                self.clear();
                Err(err)
            }
        }
    }

    fn build_papers(&mut self) -> Result<BuiltBook, BookError> {
        if self.content.is_empty() {
            return Err(BookError::MissingContent);
        }
        let binding = self.binding.clone().ok_or(BookError::MissingBinding)?;
        self.content.init()?;

        let setup = &self.setup;
        let direction = self.content.direction;
        let cover_size = Vec2::from(setup.cover_paper.size(direction));
        let page_size = Vec2::from(setup.page_paper.size(direction));
        let (cover_margin, page_margin) = if page_size.y < cover_size.y {
            (0.0, (cover_size.y - page_size.y) / 2.0)
        } else {
            ((page_size.y - cover_size.y) / 2.0, 0.0)
        };

        let mut covers = self.content.cover_ids();
        let mut pages = self.content.page_ids();
        let mut open_state = setup.start_state;
        if direction.is_reversed() {
            covers.reverse();
            pages.reverse();
            open_state = 1.0 - open_state;
        }

        let has_cover = !covers.is_empty();
        let first_page_paper_index = covers.len() / 4;
        let paper_count = covers.len() / 2 + pages.len() / 2;
        let half_cover_count = covers.len() / 4;
        let flipped_count = lerp(0.0, paper_count as f32, open_state).floor() as usize;
        debug!(
            papers = paper_count,
            covers = covers.len(),
            pages = pages.len(),
            binding = binding.kind(),
            "Building book"
        );

        let cover_settings = paper_settings(setup, &setup.cover_paper, true, cover_margin, direction);
        let page_settings = paper_settings(setup, &setup.page_paper, false, page_margin, direction);

        let mut cover_ids = covers.chunks_exact(2);
        let mut page_ids = pages.chunks_exact(2);
        let mut papers = Vec::with_capacity(paper_count);
        for i in 0..paper_count {
            let is_cover = has_cover && (i < half_cover_count || i >= paper_count - half_cover_count);
            let (ids, settings) = if is_cover {
                (cover_ids.next(), &cover_settings)
            } else {
                (page_ids.next(), &page_settings)
            };
            let Some(&[front, back]) = ids else {
                warn!(index = i, "Paper has no content slots");
                continue;
            };

            let mut paper = Paper::new(i, settings.clone(), front, back);
            if is_cover {
                paper.set_use_back_content_for_sides(i > half_cover_count);
            }
            if i < flipped_count {
                paper.set_flipped(true);
                paper.set_time(1.0);
            }
            papers.push(paper);
        }

        let n = papers.len();
        for (i, paper) in papers.iter_mut().enumerate() {
            paper.set_neighbors(i.checked_sub(1), (i + 1 < n).then_some(i + 1));
            let mid = n / 2;
            paper.set_no_hole(binding.is_staple() && (i + 1 == mid || i == mid));
        }

        let mut stack = StackInfo::measure(&papers, has_cover, first_page_paper_index);
        stack.align_to_ground = setup.align_to_ground;
        let bound = binding.create_bound(stack, &mut papers)?;

        let reduce_overdraw = setup.reduce_overdraw && !pages.is_empty();
        let reduce_sub_meshes = setup.reduce_sub_meshes;
        let shared = bound.use_shared_mesh_data_for_lowpoly();
        let pool = |paper: &PaperSetup, lowpoly: bool, reduce_sub_meshes: bool, reduce_overdraw: bool| {
            let pattern = create_pattern(
                bound.as_ref(),
                &PatternRequest {
                    quality: if lowpoly { 0 } else { paper.quality },
                    size: Vec2::from(paper.size(direction)),
                    thickness: paper.thickness,
                    uv_margin: paper.uv_margin(direction),
                    reduce_overdraw,
                    reduce_sub_meshes,
                },
            );
            PaperMeshDataPool::new(pattern, lowpoly && shared)
        };
        let mut pools = MeshPools {
            page_lowpoly: pool(&setup.page_paper, true, reduce_sub_meshes, false),
            page_lowpoly_hole: reduce_overdraw.then(|| pool(&setup.page_paper, true, reduce_sub_meshes, true)),
            page_highpoly: pool(&setup.page_paper, false, false, false),
            cover_lowpoly: pool(&setup.cover_paper, true, false, false),
            cover_highpoly: pool(&setup.cover_paper, false, false, false),
        };

        let rotation = rot_y(if direction.is_vertical() { 90.0 } else { 0.0 });
        let root = Affine3A::from_rotation_translation(rotation, bound.root_position(&papers, Vec3::ZERO));
        let instancing = reduce_sub_meshes && setup.use_paper_gpu_instancing && binding.is_wire() && pages.len() > 4;
        let instanced_mesh = if !instancing {
            None
        } else if reduce_overdraw {
            pools.acquire(PoolKind::PageLowpolyHole)
        } else {
            pools.acquire(PoolKind::PageLowpoly)
        };

        let mut built = BuiltBook {
            papers,
            bound,
            pools,
            selected: None,
            root,
            instanced_mesh,
            instances: Vec::new(),
        };

        let parent = self.transform * built.root;
        let mut stack = built.stack(&self.content, parent);
        for i in 0..n {
            let (lowpoly, hole, highpoly) = if stack.papers[i].is_cover() {
                (stack.pools.acquire(PoolKind::CoverLowpoly), None, PoolKind::CoverHighpoly)
            } else {
                (
                    stack.pools.acquire(PoolKind::PageLowpoly),
                    stack.pools.acquire(PoolKind::PageLowpolyHole),
                    PoolKind::PageHighpoly,
                )
            };
            let Some(lowpoly) = lowpoly else {
                warn!(index = i, "No lowpoly mesh data for paper");
                continue;
            };
            stack.set_mesh_data(i, lowpoly, hole, highpoly);
        }
        Ok(built)
    }

    /// Drop everything built. Pending auto turns are discarded.
    pub fn clear(&mut self) {
        if self.built.take().is_some() {
            debug!("Book cleared");
        }
        self.auto_turn = None;
        self.auto_turning_end_time = 0.0;
        self.was_idle = false;
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Whether the user is turning a paper. Auto turns do not count.
    pub fn is_turning(&self) -> bool {
        self.built
            .as_ref()
            .and_then(|b| b.selected.map(|i| b.papers[i].is_turning()))
            .unwrap_or(false)
    }

    pub fn is_falling(&self) -> bool {
        self.built
            .as_ref()
            .is_some_and(|b| b.papers.iter().any(Paper::is_falling))
    }

    pub fn is_auto_turning(&self) -> bool {
        self.auto_turning_end_time > self.clock
    }

    pub fn auto_turning_end_time(&self) -> f32 {
        self.auto_turning_end_time
    }

    /// No paper is turning, falling or auto turning.
    pub fn is_idle(&self) -> bool {
        !self.is_turning() && !self.is_falling() && !self.is_auto_turning()
    }

    /// Auto turns scheduled but not started yet.
    pub fn has_pending_auto_turns(&self) -> bool {
        self.auto_turn.is_some()
    }

    pub fn papers(&self) -> &[Paper] {
        self.built.as_ref().map_or(&[], |b| &b.papers)
    }

    /// Mesh data currently shown by a paper.
    pub fn paper_mesh_data(&self, index: usize) -> Option<&PaperMeshData> {
        let built = self.built.as_ref()?;
        let data = built.papers.get(index)?.mesh_data()?;
        built.pools.data(data)
    }

    /// Paper space to world.
    pub fn paper_matrix(&self, index: usize) -> Option<Affine3A> {
        let built = self.built.as_ref()?;
        Some(self.transform * built.root * built.papers.get(index)?.local_matrix())
    }

    /// Book root to world; papers and the binder are children of the root.
    pub fn root_matrix(&self) -> Option<Affine3A> {
        self.built.as_ref().map(|b| self.transform * b.root)
    }

    pub fn binder_mesh(&self) -> Option<&BinderMesh> {
        self.built.as_ref().map(|b| b.bound.binder_mesh())
    }

    /// Binder space to world.
    pub fn binder_matrix(&self) -> Option<Affine3A> {
        self.built
            .as_ref()
            .map(|b| self.transform * b.root * b.bound.binder_transform())
    }

    pub fn binder_color(&self) -> Option<folio_config::Color> {
        self.built.as_ref().map(|b| b.bound.binder_color())
    }

    pub fn is_binder_visible(&self) -> bool {
        self.is_built() && !self.setup.hide_binder
    }

    /// Whether resting interior pages are drawn through [`Book::paper_instances`].
    pub fn uses_paper_instancing(&self) -> bool {
        self.built.as_ref().is_some_and(|b| b.instanced_mesh.is_some())
    }

    /// The one mesh every instance draws.
    pub fn instanced_mesh_data(&self) -> Option<&PaperMeshData> {
        let built = self.built.as_ref()?;
        built.pools.data(built.instanced_mesh?)
    }

    /// Lowpoly variant of the instanced mesh: holed when overdraw is reduced.
    pub fn instanced_mesh_kind(&self) -> Option<MeshKind> {
        let mesh = self.built.as_ref()?.instanced_mesh?;
        Some(if mesh.pool == PoolKind::PageLowpolyHole { MeshKind::LowpolyHole } else { MeshKind::Lowpoly })
    }

    pub fn paper_instances(&self) -> &[PaperInstance] {
        self.built.as_ref().map_or(&[], |b| &b.instances)
    }

    /// Whether the host should skip drawing this paper on its own.
    pub fn is_paper_instanced(&self, index: usize) -> bool {
        self.built
            .as_ref()
            .and_then(|b| Some((b, b.instanced_mesh?)))
            .is_some_and(|(b, mesh)| index < b.papers.len() && instancing::is_instanced(&b.papers, index, mesh))
    }

    /// Advance the book by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.built.is_none() {
            return;
        }
        let dt = dt.max(0.0);
        self.clock += dt;
        self.frame_dt = dt;
        self.poll_auto_turns(dt);
        self.late_update(dt, false);
    }

    /// Settle falling papers, refresh live pages, positions and meshes.
    ///
    /// Skipped while the book stays idle unless `force` is set.
    fn late_update(&mut self, dt: f32, force: bool) {
        let idle = self.is_idle();
        let Some(built) = self.built.as_mut() else {
            return;
        };
        if !force && self.was_idle && idle {
            return;
        }
        self.was_idle = idle;

        let parent = self.transform * built.root;
        let mut stack = built.stack(&self.content, parent);
        for i in 0..stack.papers.len() {
            if stack.papers[i].is_falling() {
                stack.update_falling(i, dt);
            }
        }

        update_live_pages(built, &mut self.content);

        let refresh = built.bound.on_late_update(&mut built.papers, &mut built.pools);
        let position = built.bound.root_position(&built.papers, built.root.translation.into());
        built.root.translation = position.into();

        let parent = self.transform * built.root;
        let mut stack = built.stack(&self.content, parent);
        for i in 0..stack.papers.len() {
            let paper = &stack.papers[i];
            let moving = paper.is_turning() || paper.is_falling() || paper.mesh_kind() == Some(MeshKind::Highpoly);
            if force || refresh == MeshRefresh::All || moving {
                stack.update_mesh(i);
            }
        }

        if let Some(mesh) = built.instanced_mesh {
            built.instances = instancing::collect_instances(&built.papers, &self.content, &parent, mesh);
        }
    }

    /// Grab the front paper hit by a world ray.
    ///
    /// Fails when the book is not built, a paper is already being turned, the
    /// ray misses or the hit point is covered by interactive UI.
    pub fn start_turning(&mut self, ray: &Ray) -> bool {
        if self.is_turning() {
            return false;
        }
        let dt = self.frame_dt;
        let Some(built) = self.built.as_mut() else {
            return false;
        };

        let parent = self.transform * built.root;
        let front = built.front_papers();
        for &i in &front {
            if let Some(hit) = built.papers[i].raycast(ray, &parent) {
                if self.content.get(hit.content).is_point_over_ui(hit.texture_coordinate) {
                    return false;
                }
            }
        }

        for &i in &front {
            if built.papers[i].is_falling() {
                continue;
            }
            if built.stack(&self.content, parent).start_turning(i, ray, dt) {
                built.selected = Some(i);
                self.was_idle = false;
                debug!(paper = i, "Turning started");
                return true;
            }
        }
        false
    }

    /// Drag the turned paper towards a new world ray.
    pub fn update_turning(&mut self, ray: &Ray) {
        let dt = self.frame_dt;
        let Some(built) = self.built.as_mut() else {
            return;
        };
        let Some(i) = built.selected else {
            return;
        };
        let parent = self.transform * built.root;
        built.stack(&self.content, parent).update_turning(i, ray, dt);
    }

    /// Release the turned paper; it falls to the side picked by the release.
    pub fn stop_turning(&mut self) {
        let Some(built) = self.built.as_mut() else {
            return;
        };
        let Some(i) = built.selected.take() else {
            return;
        };
        built.papers[i].stop_turning();
        self.was_idle = false;
        debug!(paper = i, "Turning stopped");
    }

    /// Papers the user can grab right now, nearest first.
    pub fn front_papers(&self) -> Vec<usize> {
        self.built.as_ref().map(BuiltBook::front_papers).unwrap_or_default()
    }

    /// Hit test the front papers.
    pub fn raycast(&self, ray: &Ray) -> Option<BookRaycastHit> {
        let built = self.built.as_ref()?;
        let parent = self.transform * built.root;
        built
            .front_papers()
            .into_iter()
            .find_map(|i| built.papers[i].raycast(ray, &parent))
    }

    /// Texture coordinate of a ray on the paper showing `content`, hit or not.
    pub fn texture_coordinate(&self, ray: &Ray, content: ContentId) -> Vec2 {
        let Some(built) = self.built.as_ref() else {
            return Vec2::ZERO;
        };
        let parent = self.transform * built.root;
        built
            .papers
            .iter()
            .find(|p| p.front_content() == content || p.back_content() == content)
            .map_or(Vec2::ZERO, |p| p.texture_coordinate(ray, &parent))
    }

    /// Logical page indices that are visible or about to become visible.
    pub fn active_page_indices(&self) -> Vec<usize> {
        let Some(built) = self.built.as_ref() else {
            return Vec::new();
        };
        let n = built.papers.len();
        let reversed = self.content.direction.is_reversed();
        let mut indices: Vec<usize> = built
            .active_sides()
            .into_iter()
            .map(|(i, back)| {
                let page = crate::content::page_index(i, back);
                if reversed { n * 2 - page - 1 } else { page }
            })
            .collect();
        if reversed {
            indices.reverse();
        }
        indices
    }

    /// Mean turn progress of all papers: 0 closed on the right, 1 on the left.
    pub fn average_time(&mut self) -> f32 {
        let Some(built) = self.built.as_mut() else {
            return 0.0;
        };
        if built.papers.is_empty() {
            return 0.0;
        }
        let sum: f32 = built
            .papers
            .iter_mut()
            .map(|p| {
                p.update_time();
                p.z_time()
            })
            .sum();
        sum / built.papers.len() as f32
    }

    /// Lay the book open at a logical page without animation.
    ///
    /// Only possible while the book is idle.
    pub fn open_at_page(&mut self, page_index: usize) -> bool {
        if !self.is_idle() {
            return false;
        }
        let Some(built) = self.built.as_mut() else {
            return false;
        };
        let n = built.papers.len();
        let page_index = page_index.min(n * 2 - 1);
        let page_index = if self.content.direction.is_reversed() { n * 2 - page_index - 1 } else { page_index };
        let flipped_count = page_index.div_ceil(2);

        for (i, paper) in built.papers.iter_mut().enumerate() {
            let flipped = i < flipped_count;
            paper.set_flipped(flipped);
            paper.set_time(if flipped { 1.0 } else { 0.0 });
            paper.update_materials(&self.content);
        }
        for i in 0..n {
            built.bound.update_paper_position(&mut built.papers, i);
        }
        let parent = self.transform * built.root;
        let mut stack = built.stack(&self.content, parent);
        for i in 0..n {
            let kind = if stack.need_hole(i) { MeshKind::LowpolyHole } else { MeshKind::Lowpoly };
            stack.try_switch(i, kind);
        }
        debug!(page = page_index, "Book opened at page");
        self.late_update(0.0, true);
        true
    }

    /// Re-read textures and texture transforms of every content, after the
    /// host changed them in place through [`Book::content_mut`].
    pub fn refresh_content(&mut self) -> Result<(), BookError> {
        let built = self.built.as_mut().ok_or(BookError::NotBuilt)?;
        for paper in &mut built.papers {
            paper.update_materials(&self.content);
        }
        self.late_update(0.0, true);
        Ok(())
    }

    fn auto_turn_paper(&self, direction: AutoTurnDirection) -> Option<usize> {
        if self.is_turning() {
            return None;
        }
        let built = self.built.as_ref()?;
        let front = built.front_papers();
        let next = direction.is_next();
        let &i = if next { front.last() } else { front.first() }?;
        let paper = &built.papers[i];
        (!paper.is_turning() && !paper.is_falling() && next == paper.is_on_right_stack()).then_some(i)
    }

    pub fn can_auto_turn(&self, direction: AutoTurnDirection) -> bool {
        self.auto_turn_paper(direction).is_some()
    }

    /// Papers left to turn in `direction`.
    pub fn max_auto_turn_count(&self, direction: AutoTurnDirection) -> usize {
        let Some(i) = self.auto_turn_paper(direction) else {
            return 0;
        };
        let n = self.papers().len();
        1 + if direction.is_next() { n - i - 1 } else { i }
    }

    fn auto_turn_paper_index_time(&self, direction: AutoTurnDirection) -> Option<f32> {
        let i = self.auto_turn_paper(direction)?;
        let n = self.papers().len();
        Some(if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 })
    }

    /// Schedule `count` scripted turns, `delay` seconds apart.
    ///
    /// Replaces any pending sequence. The first turn starts immediately.
    /// Returns false when nothing can turn in `direction`.
    pub fn start_auto_turning(
        &mut self,
        direction: AutoTurnDirection,
        settings: AutoTurnSettings,
        count: usize,
        delay: impl Into<AutoTurnSetting>,
    ) -> bool {
        if !self.is_built() {
            return false;
        }
        self.cancel_pending_auto_turns();

        let count = count.min(self.max_auto_turn_count(direction));
        if count == 0 {
            return false;
        }
        debug!(?direction, count, "Auto turns scheduled");
        self.auto_turn = Some(AutoTurnSequence::new(direction, settings, count, delay.into()));
        self.poll_auto_turns(0.0);
        true
    }

    /// Drop the turns that have not started yet. Papers already falling land
    /// normally.
    pub fn cancel_pending_auto_turns(&mut self) {
        if self.auto_turn.take().is_some() {
            debug!("Pending auto turns cancelled");
        }
    }

    fn poll_auto_turns(&mut self, dt: f32) {
        let Some(mut sequence) = self.auto_turn.take() else {
            return;
        };
        let direction = sequence.direction();
        let paper_index_time = self.auto_turn_paper_index_time(direction);
        let mut elapsed = dt;
        match sequence.poll(&mut elapsed, paper_index_time, &mut self.rng) {
            SequenceAction::Wait => self.auto_turn = Some(sequence),
            SequenceAction::Turn(step) => {
                if self.start_auto_turn_step(direction, step) && !sequence.is_finished() {
                    self.auto_turn = Some(sequence);
                }
            }
            SequenceAction::Finished => {}
        }
    }

    fn start_auto_turn_step(&mut self, direction: AutoTurnDirection, step: AutoTurnStep) -> bool {
        let Some(i) = self.auto_turn_paper(direction) else {
            return false;
        };
        let Some(built) = self.built.as_mut() else {
            return false;
        };
        let parent = self.transform * built.root;
        built
            .stack(&self.content, parent)
            .start_auto_turning(i, step.mode, step.twist, step.bend, step.duration);

        self.auto_turning_end_time = self.auto_turning_end_time.max(self.clock + step.duration);
        self.was_idle = false;
        debug!(paper = i, ?step, "Auto turn started");
        true
    }
}

fn paper_settings(
    setup: &BookSetup,
    paper: &PaperSetup,
    is_cover: bool,
    margin: f32,
    direction: BookDirection,
) -> PaperSettings {
    PaperSettings {
        is_cover,
        size: Vec2::from(paper.size(direction)),
        thickness: paper.thickness,
        stiffness: paper.stiffness,
        margin,
        uv_margin: paper.uv_margin(direction),
        color: paper.color,
        direction,
        cast_shadows: setup.cast_shadows,
        reduce_shadows: setup.reduce_shadows,
    }
}

fn create_pattern(bound: &dyn BookBound, request: &PatternRequest) -> Arc<PaperPattern> {
    let pattern = bound.create_pattern(request);
    if let Err(err) = pattern.validate() {
        warn!(%err, quality = request.quality, "Paper pattern failed validation");
    }
    Arc::new(pattern)
}

/// Tell every content whether its side is in the active window.
fn update_live_pages(built: &BuiltBook, content: &mut BookContent) {
    let active: HashSet<ContentId> = built
        .active_sides()
        .into_iter()
        .map(|(i, back)| {
            let paper = &built.papers[i];
            if back { paper.back_content() } else { paper.front_content() }
        })
        .collect();

    for paper in &built.papers {
        for id in [paper.front_content(), paper.back_content()] {
            if let Some(page) = content.get_mut(id) {
                page.set_active(active.contains(&id));
            }
        }
    }
}
