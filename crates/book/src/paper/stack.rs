//! Operations on a paper that reach beyond the sheet itself.

use glam::{Affine3A, Vec3};
use tracing::{trace, warn};

use super::{MeshKind, Paper, PaperMesh};
use crate::auto_turn::AutoTurnMode;
use crate::binding::BookBound;
use crate::content::BookContent;
use crate::pool::{MeshDataRef, MeshPools, PoolKind};
use crate::raycast::{Plane, Ray};

/// Borrowed view of a built book's papers with everything they need to
/// turn: the binding, the mesh pools and the content.
pub struct PaperStack<'a> {
    pub papers: &'a mut [Paper],
    pub bound: &'a dyn BookBound,
    pub pools: &'a mut MeshPools,
    pub content: &'a BookContent,
    /// Paper parent (book root) to world
    pub parent: Affine3A,
}

impl PaperStack<'_> {
    /// Whether the paper can show its holed lowpoly mesh: it rests between
    /// two non-cover neighbors on the same stack.
    pub fn need_hole(&self, index: usize) -> bool {
        let paper = &self.papers[index];
        if paper.no_hole {
            return false;
        }
        let (Some(prev), Some(next)) = (paper.prev, paper.next) else {
            return false;
        };
        if paper.turning || paper.auto_turning || paper.falling {
            return false;
        }
        let (prev, next) = (&self.papers[prev], &self.papers[next]);
        if prev.is_cover() || next.is_cover() {
            return false;
        }
        let b = paper.is_on_right_stack();
        prev.is_on_right_stack() == b && b == next.is_on_right_stack()
    }

    /// Attach the lowpoly meshes and the highpoly pool of the paper's class.
    pub fn set_mesh_data(
        &mut self,
        index: usize,
        lowpoly: MeshDataRef,
        lowpoly_hole: Option<MeshDataRef>,
        highpoly: PoolKind,
    ) {
        let hole = lowpoly_hole.filter(|_| self.need_hole(index));
        let (current, kind) = match hole {
            Some(hole) => (hole, MeshKind::LowpolyHole),
            None => (lowpoly, MeshKind::Lowpoly),
        };
        let Some(pattern) = self.pools.data(current).map(|d| d.pattern().clone()) else {
            warn!(index, "Paper mesh data is missing from its pool");
            return;
        };

        let paper = &mut self.papers[index];
        paper.mesh = Some(PaperMesh {
            current,
            kind,
            lowpoly,
            lowpoly_hole,
            highpoly,
            pattern,
        });
        paper.cast_shadows = paper.settings.cast_shadows && !paper.settings.reduce_shadows;
        paper.update_materials(self.content);
    }

    /// Swap the shown mesh. A missing or disabled hole mesh falls back to lowpoly.
    pub fn switch(&mut self, index: usize, kind: MeshKind) {
        let paper = &mut self.papers[index];
        let Some(mesh) = paper.mesh.as_mut() else {
            return;
        };

        let kind = if kind == MeshKind::LowpolyHole && (mesh.lowpoly_hole.is_none() || paper.no_hole) {
            MeshKind::Lowpoly
        } else {
            kind
        };
        if mesh.kind == kind {
            return;
        }

        if mesh.kind == MeshKind::Highpoly {
            self.pools.release(mesh.current);
        }

        paper.cast_shadows =
            paper.settings.cast_shadows && !(paper.settings.reduce_shadows && kind != MeshKind::Highpoly);

        let current = match kind {
            MeshKind::Highpoly => self.pools.acquire(mesh.highpoly),
            MeshKind::Lowpoly => Some(mesh.lowpoly),
            MeshKind::LowpolyHole => mesh.lowpoly_hole,
        };
        let Some(current) = current else {
            warn!(index, ?kind, "No mesh data available for paper");
            return;
        };
        let Some(pattern) = self.pools.data(current).map(|d| d.pattern().clone()) else {
            return;
        };

        trace!(index, ?kind, "Switched paper mesh");
        mesh.kind = kind;
        mesh.current = current;
        mesh.pattern = pattern;
    }

    /// Switch a resting paper and refresh its materials.
    pub fn try_switch(&mut self, index: usize, kind: MeshKind) {
        let paper = &self.papers[index];
        if paper.falling || paper.turning {
            return;
        }
        self.switch(index, kind);
        self.papers[index].update_materials(self.content);
    }

    fn switch_neighbors(&mut self, index: usize, kind: MeshKind) {
        let (prev, next) = (self.papers[index].prev, self.papers[index].next);
        for neighbor in [prev, next].into_iter().flatten() {
            self.try_switch(neighbor, kind);
        }
    }

    fn world_matrix(&self, index: usize) -> Affine3A {
        self.parent * self.papers[index].local_matrix()
    }

    /// Grab a paper with a world ray. Returns false if the ray misses it.
    pub fn start_turning(&mut self, index: usize, ray: &Ray, dt: f32) -> bool {
        let world = self.world_matrix(index);
        let local_ray = ray.transformed(&world.inverse());
        let up = world.transform_vector3(Vec3::Y).normalize_or_zero();
        self.papers[index].world_plane = Plane::new(up, world.translation.into());

        let Some(distance) = Plane::XZ.raycast(&local_ray) else {
            return false;
        };
        if !self.papers[index].begin_turn(local_ray.point_at(distance)) {
            return false;
        }

        self.switch(index, MeshKind::Highpoly);
        self.switch_neighbors(index, MeshKind::Lowpoly);

        self.update_turning(index, ray, dt);
        self.papers[index].clamp_handle();
        self.update_cylinder(index);
        true
    }

    /// Drag a turning paper towards the ray's hit on its grab plane.
    pub fn update_turning(&mut self, index: usize, ray: &Ray, dt: f32) {
        if let Some(distance) = self.papers[index].world_plane.raycast(ray) {
            let hit = ray.point_at(distance);
            self.bound.reset_paper_position(self.papers, index);
            let local = self.world_matrix(index).inverse().transform_point3(hit);
            self.papers[index].track_handle(local, dt);
        }
        self.update_base_vertices(index);
    }

    /// Advance a falling paper; settles it and its neighbors at the end.
    pub fn update_falling(&mut self, index: usize, dt: f32) {
        if !self.papers[index].advance_fall(dt) {
            self.update_base_vertices(index);
            return;
        }

        let landed_left = self.papers[index].end_fall();
        self.switch(index, MeshKind::Lowpoly);
        if landed_left {
            self.bound.update_paper_position(self.papers, index);
        }
        self.papers[index].update_materials(self.content);

        let paper = &self.papers[index];
        let neighbor = if paper.is_on_right_stack() { paper.next } else { paper.prev };
        if let Some(neighbor) = neighbor {
            self.try_switch(neighbor, MeshKind::LowpolyHole);
        }

        let paper = &mut self.papers[index];
        if paper.auto_turning {
            paper.update_turning_radius(1.0);
        }
        paper.auto_turning = false;
    }

    /// Start a scripted turn of a resting paper.
    pub fn start_auto_turning(&mut self, index: usize, mode: AutoTurnMode, twist: f32, bend: f32, duration: f32) {
        self.switch(index, MeshKind::Highpoly);
        self.switch_neighbors(index, MeshKind::Lowpoly);

        let surface = mode == AutoTurnMode::Surface;
        self.papers[index].begin_auto_turn(surface, !surface, twist, bend, duration);
    }

    /// Solve the roll and write the rolled grid into the paper's mesh.
    pub fn update_base_vertices(&mut self, index: usize) {
        let paper = &mut self.papers[index];
        paper.clamp_handle();
        self.update_cylinder(index);

        let paper = &mut self.papers[index];
        paper.update_time();
        if !paper.rolling {
            return;
        }

        let cylinder = paper.cylinder;
        let Some(data) = paper.mesh_data().and_then(|r| self.pools.data_mut(r)) else {
            return;
        };
        data.reset_base_vertices();
        for vertex in data.base_vertices_mut() {
            *vertex = cylinder.roll_point(*vertex);
        }
    }

    fn update_cylinder(&mut self, index: usize) {
        self.papers[index].solve_cylinder();
        self.bound.update_paper_position(self.papers, index);
    }

    /// Refresh materials and rebuild the output mesh.
    pub fn update_mesh(&mut self, index: usize) {
        let paper = &mut self.papers[index];
        paper.update_materials(self.content);
        if let Some(data) = paper.mesh_data().and_then(|r| self.pools.data_mut(r)) {
            data.update_mesh();
        }
    }
}
