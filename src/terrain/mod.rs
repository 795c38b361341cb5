pub mod category;
pub mod derive;
pub mod masks;

pub use category::{DoorPart, Orientation, RubbleScope, SpriteCategory, WallPart, WallShape};
pub use derive::{
    assemble_masks, derive_tile, recompute_region, DoorFlags, TileProfile, WallFlags,
};
pub use masks::{BaseMask, DoorMask, WallMask};
