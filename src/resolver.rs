//! Region-transition resolution
//!
//! When the decoder hits an all-FF move mask the replay itself carries no
//! destination; something outside the decoder has to say where the player
//! ended up. That something may render a preview of the last known position
//! and ask an operator, so from the decoder's perspective `resolve` is a
//! blocking suspension point. Answering `None` abandons the rest of the
//! replay, which is a valid, clean end.

use std::collections::VecDeque;

use crate::codec::{RegionId, SegmentId};
use crate::store::RegionNo;

/// Cumulative player position while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPosition {
    pub region: RegionNo,
    pub x: i32,
    pub y: i32,
}

/// Where a region transition landed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStart {
    pub segment_id: SegmentId,
    pub region_id: RegionId,
    pub x: i32,
    pub y: i32,
}

pub trait TransitionResolver {
    /// Supply the player's new region and position, or `None` to stop
    /// decoding. `last` is the position before the transition (absent on
    /// the very first one), useful for rendering a preview.
    fn resolve(&mut self, last: Option<PlayerPosition>) -> Option<RegionStart>;
}

/// Resolver answering from a fixed list of starts; `None` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    starts: VecDeque<RegionStart>,
    calls: u32,
}

impl ScriptedResolver {
    pub fn new(starts: impl IntoIterator<Item = RegionStart>) -> Self {
        Self {
            starts: starts.into_iter().collect(),
            calls: 0,
        }
    }

    /// How many times the decoder asked
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl TransitionResolver for ScriptedResolver {
    fn resolve(&mut self, _last: Option<PlayerPosition>) -> Option<RegionStart> {
        self.calls += 1;
        self.starts.pop_front()
    }
}
