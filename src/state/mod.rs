pub mod map;

pub use map::{ComponentTerrain, MapState, Region, Tile, TileComponent};
