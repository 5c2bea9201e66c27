//! Collaborator contracts: everything the tower tells the outside world.
//!
//! The simulation never draws, plays sounds or moves a camera itself. It calls
//! these traits and keeps only opaque [`BlockHandle`]s for the renderables.

use crate::geometry::Footprint;
use glam::Vec3;

/// Opaque renderable handle issued by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHandle(pub u64);

/// Input sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub drop_requested: bool,
    /// Only looked at while the game is over.
    pub restart_requested: bool,
}

impl TickInput {
    pub fn drop() -> Self {
        Self {
            drop_requested: true,
            ..Self::default()
        }
    }

    pub fn restart() -> Self {
        Self {
            restart_requested: true,
            ..Self::default()
        }
    }
}

/// Creates, trims and removes block renderables.
pub trait Renderer {
    fn instantiate_block(
        &mut self,
        position: Vec3,
        footprint: Footprint,
        height: f32,
        color: usize,
    ) -> BlockHandle;
    fn destroy_block(&mut self, handle: BlockHandle);
    fn set_footprint(&mut self, handle: BlockHandle, footprint: Footprint, position: Vec3);
}

/// Score text and the game-over banner. Observational only.
pub trait Display {
    fn on_score_changed(&mut self, score: u32);
    fn on_game_over(&mut self, final_score: u32);
}

/// Fire-and-forget celebration hooks.
pub trait Effects {
    fn on_perfect_placement(&mut self, position: Vec3);
}

/// Framing follows the tower top.
pub trait Camera {
    fn on_tower_height_changed(&mut self, height: f32);
}

/// Everything a tower needs from its surroundings.
pub trait Host: Renderer + Display + Effects + Camera {}

impl<T: Renderer + Display + Effects + Camera> Host for T {}

/// Host that ignores every notification; handy for headless runs.
#[derive(Debug, Default)]
pub struct NullHost {
    next_handle: u64,
}

impl Renderer for NullHost {
    fn instantiate_block(&mut self, _: Vec3, _: Footprint, _: f32, _: usize) -> BlockHandle {
        let handle = BlockHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn destroy_block(&mut self, _: BlockHandle) {}

    fn set_footprint(&mut self, _: BlockHandle, _: Footprint, _: Vec3) {}
}

impl Display for NullHost {
    fn on_score_changed(&mut self, _: u32) {}
    fn on_game_over(&mut self, _: u32) {}
}

impl Effects for NullHost {
    fn on_perfect_placement(&mut self, _: Vec3) {}
}

impl Camera for NullHost {
    fn on_tower_height_changed(&mut self, _: f32) {}
}

/// Records every call so tests can assert on the notification stream.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    pub struct RecordingHost {
        next_handle: u64,
        pub live: BTreeMap<BlockHandle, (Vec3, Footprint, usize)>,
        pub destroyed: Vec<BlockHandle>,
        pub scores: Vec<u32>,
        pub game_overs: Vec<u32>,
        pub perfects: Vec<Vec3>,
        pub heights: Vec<f32>,
    }

    impl Renderer for RecordingHost {
        fn instantiate_block(
            &mut self,
            position: Vec3,
            footprint: Footprint,
            _height: f32,
            color: usize,
        ) -> BlockHandle {
            let handle = BlockHandle(self.next_handle);
            self.next_handle += 1;
            self.live.insert(handle, (position, footprint, color));
            handle
        }

        fn destroy_block(&mut self, handle: BlockHandle) {
            self.live.remove(&handle);
            self.destroyed.push(handle);
        }

        fn set_footprint(&mut self, handle: BlockHandle, footprint: Footprint, position: Vec3) {
            if let Some(entry) = self.live.get_mut(&handle) {
                entry.0 = position;
                entry.1 = footprint;
            }
        }
    }

    impl Display for RecordingHost {
        fn on_score_changed(&mut self, score: u32) {
            self.scores.push(score);
        }

        fn on_game_over(&mut self, final_score: u32) {
            self.game_overs.push(final_score);
        }
    }

    impl Effects for RecordingHost {
        fn on_perfect_placement(&mut self, position: Vec3) {
            self.perfects.push(position);
        }
    }

    impl Camera for RecordingHost {
        fn on_tower_height_changed(&mut self, height: f32) {
            self.heights.push(height);
        }
    }
}
