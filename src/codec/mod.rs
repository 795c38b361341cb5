pub mod reader;
pub mod record;
pub mod types;

pub use reader::BinaryReader;
pub use record::{MoveRecord, MoveScanner, HEADER_LEN, MOVE_DISCRIMINATOR, MOVE_MARKER};
pub use types::{direction_delta, Color, ColorKey, RegionId, SegmentId, TerrainId, TileType};
