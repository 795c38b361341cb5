//! Replay terrain-map reconstruction
//!
//! A Rust library for rebuilding a game world's tile-level terrain map from
//! binary replay recordings: a marker-scanning decoder recovers player
//! movement and per-tile terrain deltas from the raw byte stream, and a
//! derivation engine computes the per-piece render masks from each tile's
//! full component set.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod replay;
pub mod resolver;
pub mod state;
pub mod store;
pub mod terrain;

pub use error::{Error, Result};
pub use codec::{
    BinaryReader, Color, ColorKey, MoveRecord, MoveScanner,
    RegionId, SegmentId, TerrainId, TileType,
};
pub use catalog::{SpriteCatalog, TerrainCatalog};
pub use replay::{DecodeSummary, EndReason, ReplayDecoder};
pub use resolver::{PlayerPosition, RegionStart, ScriptedResolver, TransitionResolver};
pub use state::MapState;
pub use store::{ComponentNo, MapStore, RegionNo, RowNo, TileNo, TileRow};
pub use terrain::{
    assemble_masks, derive_tile, recompute_region,
    BaseMask, DoorMask, SpriteCategory, TileProfile, WallMask,
};
