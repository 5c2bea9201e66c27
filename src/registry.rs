//! Placed blocks, oldest first. Append-only; the last entry is the top.

use crate::error::TowerError;
use crate::geometry::{Axis, Slab};
use crate::host::BlockHandle;

/// Placement order; the base block is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// A block that has been placed on the tower. Never changes after `append`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub handle: BlockHandle,
    pub slab: Slab,
    pub height: f32,
    /// Palette index.
    pub color: usize,
}

impl Block {
    /// Y of the face the next block rests on.
    #[inline]
    pub fn top_face(&self) -> f32 {
        self.slab.position.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
    last_footprint: f32,
}

impl BlockRegistry {
    /// A registry always starts from a base block, so `top()` has something to return.
    pub fn seeded(base: Block, axis: Axis) -> Self {
        let last_footprint = base.slab.footprint.along(axis);
        Self {
            blocks: vec![base],
            last_footprint,
        }
    }

    /// Push a placed block; `axis` is the axis it was trimmed on.
    pub fn append(&mut self, block: Block, axis: Axis) {
        self.last_footprint = block.slab.footprint.along(axis);
        self.blocks.push(block);
    }

    pub fn top(&self) -> Result<&Block, TowerError> {
        self.blocks.last().ok_or(TowerError::EmptyRegistry)
    }

    /// Active-axis size of the most recent commit. Spawned blocks inherit it.
    pub fn last_footprint_size(&self) -> f32 {
        self.last_footprint
    }

    /// Y at which the next block sits.
    pub fn next_spawn_height(&self) -> Result<f32, TowerError> {
        self.top().map(Block::top_face)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Empty the registry, yielding every block so its handle can be released.
    pub fn drain(&mut self) -> impl Iterator<Item = Block> + '_ {
        self.blocks.drain(..)
    }

    /// Start over from a fresh base block.
    pub fn reseed(&mut self, base: Block, axis: Axis) {
        self.blocks.clear();
        self.last_footprint = base.slab.footprint.along(axis);
        self.blocks.push(base);
    }
}
