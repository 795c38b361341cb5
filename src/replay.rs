//! Replay stream decoding
//!
//! Drives the move-record scanner over a whole replay buffer and turns what
//! it finds into store rows: cumulative player movement, region transitions
//! resolved through a [`TransitionResolver`], and per-tile terrain deltas
//! fed through the derivation engine.
//!
//! The decode is strictly sequential — cumulative position, mask-bit order
//! and terrain-record order are all byte-order dependent. A transition the
//! resolver abandons ends the decode cleanly; everything persisted up to the
//! last completed tile stays valid, and because the derivation engine is
//! idempotent per tile, a rerun simply rewrites the same rows.

use tracing::{debug, trace};

use crate::catalog::SpriteCatalog;
use crate::codec::{BinaryReader, ColorKey, MoveRecord, MoveScanner, TerrainId, TileType};
use crate::error::{Error, Result};
use crate::resolver::{PlayerPosition, TransitionResolver};
use crate::store::{ComponentNo, MapStore, RegionNo};
use crate::terrain::derive_tile;

/// Why a decode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Ran out of bytes during the scan — the normal case
    EndOfStream,
    /// The resolver declined a region transition; partial output is valid
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Move records matched by the scanner
    pub moves: u32,
    /// Region transitions among them
    pub transitions: u32,
    /// Tile payloads persisted (empty tile types not counted)
    pub tiles: u32,
    pub end: EndReason,
}

/// Scanning decoder over one replay buffer.
///
/// All mutable decode state (cumulative position, counters) lives here; the
/// value is movable and can be inspected after [`run`](Self::run) returns.
pub struct ReplayDecoder<'a, S, C, R> {
    data: &'a [u8],
    store: &'a mut S,
    catalog: &'a C,
    resolver: &'a mut R,
    position: Option<PlayerPosition>,
    moves: u32,
    transitions: u32,
    tiles: u32,
}

impl<'a, S, C, R> ReplayDecoder<'a, S, C, R>
where
    S: MapStore,
    C: SpriteCatalog,
    R: TransitionResolver,
{
    pub fn new(data: &'a [u8], store: &'a mut S, catalog: &'a C, resolver: &'a mut R) -> Self {
        Self {
            data,
            store,
            catalog,
            resolver,
            position: None,
            moves: 0,
            transitions: 0,
            tiles: 0,
        }
    }

    /// Cumulative player position, absent until the first region transition
    pub fn position(&self) -> Option<PlayerPosition> {
        self.position
    }

    /// Decode the whole buffer.
    ///
    /// Fatal on corruption (unknown tile type, truncation mid-record);
    /// rows persisted before the failure are left intact.
    pub fn run(&mut self) -> Result<DecodeSummary> {
        let mut scanner = MoveScanner::new(self.data);
        while let Some(record) = scanner.next() {
            self.moves += 1;

            if record.is_region_transition() {
                self.transitions += 1;
                let Some(start) = self.resolver.resolve(self.position) else {
                    debug!(mv = self.moves, "transition abandoned, ending decode");
                    return Ok(self.summary(EndReason::Abandoned));
                };
                let region = self
                    .store
                    .find_or_create_region(start.segment_id, start.region_id)?;
                debug!(
                    mv = self.moves,
                    sid = start.segment_id,
                    rid = start.region_id,
                    x = start.x,
                    y = start.y,
                    "region transition"
                );
                self.position = Some(PlayerPosition {
                    region,
                    x: start.x,
                    y: start.y,
                });
                // The all-FF mask carries no tile payload; resume the scan
                continue;
            }

            let (dx, dy) = record.delta();
            let pos = match self.position.as_mut() {
                Some(p) => {
                    p.x += dx;
                    p.y += dy;
                    *p
                }
                None => {
                    return Err(Error::NoPosition {
                        offset: record.offset,
                    })
                }
            };
            trace!(
                mv = self.moves,
                x = pos.x,
                y = pos.y,
                dir = record.direction,
                "move"
            );
            self.process_tiles(&record, pos)?;
        }
        Ok(self.summary(EndReason::EndOfStream))
    }

    fn summary(&self, end: EndReason) -> DecodeSummary {
        DecodeSummary {
            moves: self.moves,
            transitions: self.transitions,
            tiles: self.tiles,
            end,
        }
    }

    /// Walk the 8x8 mask around the player and parse one payload per set
    /// bit. Rows are y (outer), bits are x LSB-first; the window spans
    /// [x-3, x+4] by [y-3, y+4].
    fn process_tiles(&mut self, record: &MoveRecord, pos: PlayerPosition) -> Result<()> {
        let mut reader = BinaryReader::at(self.data, record.payload_offset());
        let mut ty = pos.y - 3;
        for m in record.mask {
            let mut tx = pos.x - 3;
            for bit in 0..8u8 {
                if m & (1 << bit) != 0 {
                    self.process_tile(&mut reader, pos.region, tx, ty)?;
                }
                tx += 1;
            }
            ty += 1;
        }
        Ok(())
    }

    fn process_tile(
        &mut self,
        reader: &mut BinaryReader<'_>,
        region: RegionNo,
        tx: i32,
        ty: i32,
    ) -> Result<()> {
        let offset = reader.position();
        let value = reader.read_u8()?;
        let tile_type = TileType::from_u8(value).ok_or(Error::BadTileType { value, offset })?;
        trace!(tx, ty, tile_type = value, "tile");

        if tile_type.is_empty() {
            return Ok(());
        }

        let tile = self.store.find_or_create_tile(region, tx, ty)?;
        let count = reader.read_u8()?;

        let mut records: Vec<(ColorKey, TerrainId)> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let terrain_id = reader.read_terrain_id()?;
            let color = if tile_type.has_color() {
                reader.read_color_key()?
            } else {
                ColorKey::Untinted
            };
            records.push((color, terrain_id));
        }

        if tile_type.has_move_cost() {
            // Parsed for stream alignment; the map model does not keep it
            let cost = reader.read_u8()?;
            trace!(tx, ty, cost, "move cost");
        }

        // Group into components by contiguous equal color after sorting by
        // (color, terrain-id); equal keys always land in the same component
        records.sort_unstable();
        let mut current: Option<(ColorKey, ComponentNo)> = None;
        for (color, terrain_id) in records {
            let component = match current {
                Some((c, no)) if c == color => no,
                _ => {
                    let no = self.store.find_or_create_component(tile, color)?;
                    current = Some((color, no));
                    no
                }
            };
            self.store.find_or_create_row(component, terrain_id)?;
        }

        derive_tile(self.store, self.catalog, tile)?;
        self.tiles += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TerrainCatalog;
    use crate::codec::{MOVE_DISCRIMINATOR, MOVE_MARKER};
    use crate::resolver::{RegionStart, ScriptedResolver};
    use crate::state::MapState;
    use crate::terrain::{BaseMask, SpriteCategory, WallMask};

    fn record(direction: u8, mask: [u8; 8], payload: &[u8]) -> Vec<u8> {
        let mut v = MOVE_MARKER.to_vec();
        v.push(direction);
        v.push(MOVE_DISCRIMINATOR);
        v.extend_from_slice(&mask);
        v.extend_from_slice(payload);
        v
    }

    fn transition() -> Vec<u8> {
        record(0x44, [0xFF; 8], &[])
    }

    fn start(segment_id: u32, region_id: u32, x: i32, y: i32) -> RegionStart {
        RegionStart {
            segment_id,
            region_id,
            x,
            y,
        }
    }

    fn catalog() -> TerrainCatalog {
        let mut c = TerrainCatalog::new();
        c.insert(100, SpriteCategory::Plain);
        c.insert(101, SpriteCategory::Plain);
        c.insert(200, SpriteCategory::parse("wall vertical normal").unwrap());
        c.insert(201, SpriteCategory::parse("wall vertical destroyed").unwrap());
        c
    }

    fn decode(
        data: &[u8],
        starts: Vec<RegionStart>,
    ) -> (Result<DecodeSummary>, MapState, u32, Option<PlayerPosition>) {
        let mut map = MapState::new();
        let catalog = catalog();
        let mut resolver = ScriptedResolver::new(starts);
        let mut decoder = ReplayDecoder::new(data, &mut map, &catalog, &mut resolver);
        let result = decoder.run();
        let position = decoder.position();
        (result, map, resolver.calls(), position)
    }

    #[test]
    fn test_position_accumulates() {
        // dir 0x54: dx = 4 - 4 = 0, dy = 5 - 4 = 1; applied twice from (0, 0)
        let mut data = transition();
        data.extend(record(0x54, [0; 8], &[]));
        data.extend(record(0x54, [0; 8], &[]));
        data.push(0x00);

        let (result, _, _, position) = decode(&data, vec![start(1, 1, 0, 0)]);
        let summary = result.unwrap();
        assert_eq!(summary.moves, 3);
        assert_eq!(summary.transitions, 1);
        assert_eq!(summary.end, EndReason::EndOfStream);

        let pos = position.unwrap();
        assert_eq!((pos.x, pos.y), (0, 2));
    }

    #[test]
    fn test_transition_consumes_no_payload() {
        // The FF mask is immediately followed by the next record; the
        // resolver answers exactly once and no tile bytes are read.
        let mut data = transition();
        data.extend(record(0x45, [0; 8], &[]));
        data.push(0x00);

        let (result, map, calls, position) = decode(&data, vec![start(1, 5, 10, 20)]);
        let summary = result.unwrap();
        assert_eq!(summary.transitions, 1);
        assert_eq!(calls, 1);
        assert_eq!(map.tile_count(), 0);

        let pos = position.unwrap();
        assert_eq!((pos.x, pos.y), (11, 20));
    }

    #[test]
    fn test_abandoned_transition_ends_cleanly() {
        let mut data = transition();
        data.extend(record(0x54, [0; 8], &[]));
        data.push(0x00);

        let (result, _, _, position) = decode(&data, vec![]);
        let summary = result.unwrap();
        assert_eq!(summary.end, EndReason::Abandoned);
        assert_eq!(summary.moves, 1);
        assert!(position.is_none());
    }

    #[test]
    fn test_move_before_transition_is_fatal() {
        let mut data = record(0x54, [0; 8], &[]);
        data.push(0x00);
        let (result, _, _, _) = decode(&data, vec![]);
        assert!(matches!(result, Err(Error::NoPosition { offset: 0 })));
    }

    #[test]
    fn test_bad_tile_type_is_fatal() {
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &[0x99]));
        data.push(0x00);

        let (result, _, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert!(matches!(result, Err(Error::BadTileType { value: 0x99, .. })));
    }

    #[test]
    fn test_empty_tile_type_touches_nothing() {
        // 0x12 carries no payload and must not create a tile row
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &[0x12]));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        let summary = result.unwrap();
        assert_eq!(summary.tiles, 0);
        assert_eq!(map.tile_count(), 0);
    }

    #[test]
    fn test_plain_payload_without_color() {
        // Tile type 0x07: terrain records are bare u16 ids
        let payload = [0x07, 0x02, 100, 0, 101, 0];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert_eq!(result.unwrap().tiles, 1);
        assert_eq!(map.tile_count(), 1);
        assert_eq!(map.row_count(), 2);

        // Mask bit 0 of row 0 is the player's (x-3, y-3)
        let (_, region) = map.regions().next().unwrap();
        let tile = map.tile(region.tiles[0]).unwrap();
        assert_eq!((tile.x, tile.y), (-3, -3));
        assert_eq!(tile.components.len(), 1);
        assert_eq!(
            map.component(tile.components[0]).unwrap().color,
            ColorKey::Untinted
        );
    }

    #[test]
    fn test_tinted_payload_groups_components() {
        // Tile type 0x4D: colors follow each terrain id, then a trailing
        // move-cost byte. Two tints plus an untinted record give three
        // groups; the untinted one sorts first.
        let payload = [
            0x4D, 0x03, // tile type, count
            100, 0, 10, 20, 30, 255, // terrain 100, tint A
            101, 0, 0xFF, 0xFF, 0xFF, 0xFF, // terrain 101, no tint
            200, 0, 10, 20, 30, 255, // terrain 200, tint A
            0x05, // move cost
        ];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert_eq!(result.unwrap().tiles, 1);

        let (_, region) = map.regions().next().unwrap();
        let tile = map.tile(region.tiles[0]).unwrap();
        assert_eq!(tile.components.len(), 2);
        let first = map.component(tile.components[0]).unwrap();
        assert_eq!(first.color, ColorKey::Untinted);
        assert_eq!(first.rows.len(), 1);
        let second = map.component(tile.components[1]).unwrap();
        assert!(second.color.is_tinted());
        assert_eq!(second.rows.len(), 2);
    }

    #[test]
    fn test_masks_derived_after_persist() {
        // Wall normal + destroyed on one tile: precedence leaves only the
        // normal row visible.
        let payload = [0x07, 0x02, 200, 0, 201, 0];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        result.unwrap();

        let (_, region) = map.regions().next().unwrap();
        let rows = map.tile_rows(region.tiles[0]).unwrap();
        for tile_row in rows {
            let row = map.row(tile_row.row).unwrap();
            assert!(row.base.is_empty());
            if row.terrain_id == 200 {
                assert_eq!(row.wall, WallMask::NORMAL | WallMask::VISIBLE);
            } else {
                assert_eq!(row.wall, WallMask::DESTROYED);
            }
        }
    }

    #[test]
    fn test_rederive_is_idempotent() {
        let payload = [0x07, 0x02, 200, 0, 201, 0];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));
        data.push(0x00);

        let (result, mut map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        result.unwrap();

        let (_, region) = map.regions().next().unwrap();
        let tile = region.tiles[0];
        let before: Vec<_> = map
            .tile_rows(tile)
            .unwrap()
            .iter()
            .map(|r| {
                let row = map.row(r.row).unwrap();
                (row.base, row.wall, row.door)
            })
            .collect();

        derive_tile(&mut map, &catalog(), tile).unwrap();

        let after: Vec<_> = map
            .tile_rows(tile)
            .unwrap()
            .iter()
            .map(|r| {
                let row = map.row(r.row).unwrap();
                (row.base, row.wall, row.door)
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_unknown_terrain_is_fatal() {
        let payload = [0x07, 0x01, 0xEE, 0x03]; // terrain 1006, not in catalog
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));
        data.push(0x00);

        let (result, _, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert!(matches!(
            result,
            Err(Error::UnknownCategory { terrain_id: 1006 })
        ));
    }

    #[test]
    fn test_truncated_payload_is_fatal() {
        // Count byte promises two records but the stream ends after one
        let payload = [0x07, 0x02, 100, 0];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &payload));

        let (result, _, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert!(matches!(result, Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_mask_geometry() {
        // Row 7, bit 7 addresses the window corner (x+4, y+4)
        let payload = [0x07, 0x01, 100, 0];
        let mut data = transition();
        data.extend(record(0x44, [0, 0, 0, 0, 0, 0, 0, 0x80], &payload));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 10, 20)]);
        result.unwrap();

        let (_, region) = map.regions().next().unwrap();
        let tile = map.tile(region.tiles[0]).unwrap();
        assert_eq!((tile.x, tile.y), (14, 24));
    }

    #[test]
    fn test_revisited_tile_recomputed_from_full_set() {
        // Two moves drop terrain on the same tile; the second derivation
        // must see both rows. Terrain 100 is plain, so it stays visible
        // next to the wall rows.
        let step1 = [0x07, 0x01, 100, 0];
        let step2 = [0x07, 0x01, 200, 0];
        let mut data = transition();
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &step1));
        data.extend(record(0x44, [0x01, 0, 0, 0, 0, 0, 0, 0], &step2));
        data.push(0x00);

        let (result, map, _, _) = decode(&data, vec![start(1, 1, 0, 0)]);
        assert_eq!(result.unwrap().tiles, 2);
        assert_eq!(map.tile_count(), 1);

        let (_, region) = map.regions().next().unwrap();
        let rows = map.tile_rows(region.tiles[0]).unwrap();
        assert_eq!(rows.len(), 2);
        for tile_row in rows {
            let row = map.row(tile_row.row).unwrap();
            if row.terrain_id == 100 {
                assert_eq!(row.base, BaseMask::VISIBLE);
            } else {
                assert_eq!(row.wall, WallMask::NORMAL | WallMask::VISIBLE);
            }
        }
    }
}
