//! Persistence gateway
//!
//! The decoder and the derivation engine turn parsed facts into rows through
//! this trait; everything is upsert-by-natural-key. The crate ships an
//! in-memory implementation ([`MapState`]); a relational backend would
//! implement the same operations.
//!
//! [`MapState`]: crate::state::MapState

use crate::codec::{ColorKey, RegionId, SegmentId, TerrainId};
use crate::error::Result;
use crate::terrain::{BaseMask, DoorMask, WallMask};

/// Region row handle
pub type RegionNo = u32;

/// Tile row handle
pub type TileNo = u32;

/// Tile-component row handle
pub type ComponentNo = u32;

/// Component-terrain row handle
pub type RowNo = u32;

/// One component-terrain row as seen by the derivation engine.
///
/// `protected` is the external "keep effect": other writers may mark rows to
/// exempt them from cleanup, so the engine carries the flag through rather
/// than owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRow {
    pub row: RowNo,
    pub terrain_id: TerrainId,
    pub protected: bool,
}

pub trait MapStore {
    /// Resolve or allocate a region, unique by (segment, region-id)
    fn find_or_create_region(&mut self, segment: SegmentId, region: RegionId) -> Result<RegionNo>;

    /// Resolve or allocate a tile, unique by (region, x, y)
    fn find_or_create_tile(&mut self, region: RegionNo, x: i32, y: i32) -> Result<TileNo>;

    /// Resolve or allocate a tint group, unique by (tile, color-key)
    fn find_or_create_component(&mut self, tile: TileNo, color: ColorKey) -> Result<ComponentNo>;

    /// Resolve or allocate a terrain row, unique by (component, terrain-id)
    fn find_or_create_row(&mut self, component: ComponentNo, terrain: TerrainId) -> Result<RowNo>;

    /// Overwrite a row's three render masks
    fn update_masks(
        &mut self,
        row: RowNo,
        base: BaseMask,
        wall: WallMask,
        door: DoorMask,
    ) -> Result<()>;

    /// All terrain rows of a tile, in creation order
    fn tile_rows(&self, tile: TileNo) -> Result<Vec<TileRow>>;

    /// All tiles of a region, in creation order
    fn region_tiles(&self, region: RegionNo) -> Result<Vec<TileNo>>;
}
