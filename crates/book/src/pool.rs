//! Acquire/recycle stacks of paper mesh data.
//!
//! Every paper class has a lowpoly pool, an optional holed lowpoly pool and a
//! highpoly pool. Papers hold [`MeshDataRef`] handles; the data itself stays
//! in the pools owned by the book and is dropped with them on rebuild.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::pattern::{PaperMeshData, PaperPattern};

/// Which pool of the book a handle points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    PageLowpoly,
    PageLowpolyHole,
    PageHighpoly,
    CoverLowpoly,
    CoverHighpoly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Shared,
    Item(usize),
}

/// Handle to mesh data stored in [`MeshPools`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshDataRef {
    pub pool: PoolKind,
    slot: Slot,
}

impl MeshDataRef {
    /// Whether every paper using this pool shares the same data.
    pub fn is_shared(&self) -> bool {
        self.slot == Slot::Shared
    }
}

/// Mesh data built from one pattern.
///
/// A shared pool hands the same data to every caller and never recycles. A
/// regular pool pops recycled data or creates new data on demand.
#[derive(Debug)]
pub struct PaperMeshDataPool {
    pattern: Arc<PaperPattern>,
    shared: Option<PaperMeshData>,
    items: Vec<PaperMeshData>,
    free: Vec<usize>,
}

impl PaperMeshDataPool {
    pub fn new(pattern: Arc<PaperPattern>, use_shared_data: bool) -> Self {
        let shared = use_shared_data.then(|| {
            let mut data = PaperMeshData::new(Arc::clone(&pattern));
            data.update_mesh();
            data
        });
        Self {
            pattern,
            shared,
            items: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn pattern(&self) -> &Arc<PaperPattern> {
        &self.pattern
    }

    pub fn uses_shared_data(&self) -> bool {
        self.shared.is_some()
    }

    /// Number of distinct mesh data instances created so far.
    pub fn allocated(&self) -> usize {
        self.items.len() + usize::from(self.shared.is_some())
    }

    fn get(&mut self) -> Slot {
        if self.shared.is_some() {
            return Slot::Shared;
        }
        if let Some(i) = self.free.pop() {
            return Slot::Item(i);
        }
        self.items.push(PaperMeshData::new(Arc::clone(&self.pattern)));
        debug!(count = self.items.len(), "Paper mesh data pool grew");
        Slot::Item(self.items.len() - 1)
    }

    fn free(&mut self, slot: Slot) {
        match slot {
            Slot::Shared => warn!("Shared paper mesh data cannot be recycled"),
            Slot::Item(i) => {
                if !self.free.contains(&i) {
                    self.free.push(i);
                }
            }
        }
    }

    fn data(&self, slot: Slot) -> Option<&PaperMeshData> {
        match slot {
            Slot::Shared => self.shared.as_ref(),
            Slot::Item(i) => self.items.get(i),
        }
    }

    fn data_mut(&mut self, slot: Slot) -> Option<&mut PaperMeshData> {
        match slot {
            Slot::Shared => self.shared.as_mut(),
            Slot::Item(i) => self.items.get_mut(i),
        }
    }
}

/// All mesh data pools of a built book.
#[derive(Debug)]
pub struct MeshPools {
    pub page_lowpoly: PaperMeshDataPool,
    pub page_lowpoly_hole: Option<PaperMeshDataPool>,
    pub page_highpoly: PaperMeshDataPool,
    pub cover_lowpoly: PaperMeshDataPool,
    pub cover_highpoly: PaperMeshDataPool,
}

impl MeshPools {
    pub fn pool(&self, kind: PoolKind) -> Option<&PaperMeshDataPool> {
        match kind {
            PoolKind::PageLowpoly => Some(&self.page_lowpoly),
            PoolKind::PageLowpolyHole => self.page_lowpoly_hole.as_ref(),
            PoolKind::PageHighpoly => Some(&self.page_highpoly),
            PoolKind::CoverLowpoly => Some(&self.cover_lowpoly),
            PoolKind::CoverHighpoly => Some(&self.cover_highpoly),
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> Option<&mut PaperMeshDataPool> {
        match kind {
            PoolKind::PageLowpoly => Some(&mut self.page_lowpoly),
            PoolKind::PageLowpolyHole => self.page_lowpoly_hole.as_mut(),
            PoolKind::PageHighpoly => Some(&mut self.page_highpoly),
            PoolKind::CoverLowpoly => Some(&mut self.cover_lowpoly),
            PoolKind::CoverHighpoly => Some(&mut self.cover_highpoly),
        }
    }

    /// Take mesh data from a pool. `None` if the pool does not exist.
    pub fn acquire(&mut self, kind: PoolKind) -> Option<MeshDataRef> {
        let slot = self.pool_mut(kind)?.get();
        Some(MeshDataRef { pool: kind, slot })
    }

    /// Return mesh data to its pool.
    pub fn release(&mut self, data: MeshDataRef) {
        if let Some(pool) = self.pool_mut(data.pool) {
            pool.free(data.slot);
        }
    }

    pub fn data(&self, data: MeshDataRef) -> Option<&PaperMeshData> {
        self.pool(data.pool)?.data(data.slot)
    }

    pub fn data_mut(&mut self, data: MeshDataRef) -> Option<&mut PaperMeshData> {
        self.pool_mut(data.pool)?.data_mut(data.slot)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pattern::{PaperBorder, PatternBuilder};
    use folio_config::{BookDirection, PaperUvMargin};
    use glam::Vec2;

    fn quad_pattern() -> Arc<PaperPattern> {
        let xs = [0.0, 1.0];
        let zs = [0.0, 1.0];
        let mut pattern = PaperPattern {
            base_x: xs.to_vec(),
            base_z: zs.to_vec(),
            size: Vec2::ONE,
            thickness: 0.01,
            ..Default::default()
        };
        let mut builder = PatternBuilder::new(&xs, &zs, Vec2::ONE, &PaperUvMargin::default(), BookDirection::LeftToRight);
        builder.add_weight(0, 0);
        builder.add_faces(0, 0);
        builder.add_border(PaperBorder::new(0, 0, 1, 1, false, true));
        builder.finish(&mut pattern, true);
        Arc::new(pattern)
    }

    pub(crate) fn pools(shared: bool) -> MeshPools {
        let pattern = quad_pattern();
        MeshPools {
            page_lowpoly: PaperMeshDataPool::new(Arc::clone(&pattern), shared),
            page_lowpoly_hole: None,
            page_highpoly: PaperMeshDataPool::new(Arc::clone(&pattern), false),
            cover_lowpoly: PaperMeshDataPool::new(Arc::clone(&pattern), shared),
            cover_highpoly: PaperMeshDataPool::new(pattern, false),
        }
    }

    #[test]
    fn test_recycle_reuses_data() {
        let mut pools = pools(false);
        let a = pools.acquire(PoolKind::PageHighpoly).unwrap();
        let b = pools.acquire(PoolKind::PageHighpoly).unwrap();
        assert_ne!(a, b);
        pools.release(a);
        let c = pools.acquire(PoolKind::PageHighpoly).unwrap();
        assert_eq!(a, c);
        assert_eq!(pools.page_highpoly.allocated(), 2);
    }

    #[test]
    fn test_shared_pool_hands_out_one_instance() {
        let mut pools = pools(true);
        let a = pools.acquire(PoolKind::PageLowpoly).unwrap();
        let b = pools.acquire(PoolKind::PageLowpoly).unwrap();
        assert_eq!(a, b);
        assert!(a.is_shared());
        assert_eq!(pools.page_lowpoly.allocated(), 1);

        // shared data is built flat up front
        let data = pools.data(a).unwrap();
        assert!(data.normals()[0].abs_diff_eq(glam::Vec3::Y, 1e-5));
    }

    #[test]
    fn test_missing_pool() {
        let mut pools = pools(false);
        assert!(pools.acquire(PoolKind::PageLowpolyHole).is_none());
    }
}
