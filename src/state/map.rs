//! In-memory map state
//!
//! Arena-backed implementation of the persistence gateway: rows live in
//! vectors, handles are indexes, and natural-key lookups go through hash
//! indexes. Backs the CLI and the tests; a relational store would implement
//! [`MapStore`] against its own row ids.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::codec::{ColorKey, RegionId, SegmentId, TerrainId};
use crate::error::{Error, Result};
use crate::store::{ComponentNo, MapStore, RegionNo, RowNo, TileNo, TileRow};
use crate::terrain::{BaseMask, DoorMask, WallMask};

/// An addressable map area, unique by (segment, region-id)
#[derive(Debug, Clone)]
pub struct Region {
    pub segment_id: SegmentId,
    pub region_id: RegionId,
    pub name: String,
    pub tiles: Vec<TileNo>,
}

/// One tile of a region; (x, y) never changes after creation
#[derive(Debug, Clone)]
pub struct Tile {
    pub region: RegionNo,
    pub x: i32,
    pub y: i32,
    pub components: Vec<ComponentNo>,
}

/// Tint group on a tile: every terrain piece sharing one color multiplier
#[derive(Debug, Clone)]
pub struct TileComponent {
    pub tile: TileNo,
    pub color: ColorKey,
    pub rows: Vec<RowNo>,
}

/// One terrain piece within a component, with its three render masks
#[derive(Debug, Clone)]
pub struct ComponentTerrain {
    pub component: ComponentNo,
    pub terrain_id: TerrainId,
    pub base: BaseMask,
    pub wall: WallMask,
    pub door: DoorMask,
    pub protected: bool,
}

#[derive(Debug, Default)]
pub struct MapState {
    regions: Vec<Region>,
    tiles: Vec<Tile>,
    components: Vec<TileComponent>,
    rows: Vec<ComponentTerrain>,

    // Natural-key indexes. The region index keeps insertion order so dumps
    // and reports walk regions in the order the replay visited them.
    region_index: IndexMap<(SegmentId, RegionId), RegionNo>,
    tile_index: AHashMap<(RegionNo, i32, i32), TileNo>,
    component_index: AHashMap<(TileNo, ColorKey), ComponentNo>,
    row_index: AHashMap<(ComponentNo, TerrainId), RowNo>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, no: RegionNo) -> Option<&Region> {
        self.regions.get(no as usize)
    }

    pub fn tile(&self, no: TileNo) -> Option<&Tile> {
        self.tiles.get(no as usize)
    }

    pub fn component(&self, no: ComponentNo) -> Option<&TileComponent> {
        self.components.get(no as usize)
    }

    pub fn row(&self, no: RowNo) -> Option<&ComponentTerrain> {
        self.rows.get(no as usize)
    }

    /// Regions in the order they were first referenced
    pub fn regions(&self) -> impl Iterator<Item = (RegionNo, &Region)> {
        self.region_index.values().map(|&no| (no, &self.regions[no as usize]))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Mark a row as exempt from cleanup (the external "keep effect")
    pub fn set_protected(&mut self, row: RowNo, protected: bool) -> Result<()> {
        let row = self
            .rows
            .get_mut(row as usize)
            .ok_or_else(|| Error::Store(format!("unknown row handle {row}")))?;
        row.protected = protected;
        Ok(())
    }

    fn tile_ref(&self, no: TileNo) -> Result<&Tile> {
        self.tiles
            .get(no as usize)
            .ok_or_else(|| Error::Store(format!("unknown tile handle {no}")))
    }
}

impl MapStore for MapState {
    fn find_or_create_region(&mut self, segment: SegmentId, region: RegionId) -> Result<RegionNo> {
        if let Some(&no) = self.region_index.get(&(segment, region)) {
            return Ok(no);
        }
        let no = self.regions.len() as RegionNo;
        self.regions.push(Region {
            segment_id: segment,
            region_id: region,
            name: format!("region {region}"),
            tiles: Vec::new(),
        });
        self.region_index.insert((segment, region), no);
        Ok(no)
    }

    fn find_or_create_tile(&mut self, region: RegionNo, x: i32, y: i32) -> Result<TileNo> {
        if region as usize >= self.regions.len() {
            return Err(Error::Store(format!("unknown region handle {region}")));
        }
        if let Some(&no) = self.tile_index.get(&(region, x, y)) {
            return Ok(no);
        }
        let no = self.tiles.len() as TileNo;
        self.tiles.push(Tile {
            region,
            x,
            y,
            components: Vec::new(),
        });
        self.regions[region as usize].tiles.push(no);
        self.tile_index.insert((region, x, y), no);
        Ok(no)
    }

    fn find_or_create_component(&mut self, tile: TileNo, color: ColorKey) -> Result<ComponentNo> {
        if tile as usize >= self.tiles.len() {
            return Err(Error::Store(format!("unknown tile handle {tile}")));
        }
        if let Some(&no) = self.component_index.get(&(tile, color)) {
            return Ok(no);
        }
        let no = self.components.len() as ComponentNo;
        self.components.push(TileComponent {
            tile,
            color,
            rows: Vec::new(),
        });
        self.tiles[tile as usize].components.push(no);
        self.component_index.insert((tile, color), no);
        Ok(no)
    }

    fn find_or_create_row(&mut self, component: ComponentNo, terrain: TerrainId) -> Result<RowNo> {
        if component as usize >= self.components.len() {
            return Err(Error::Store(format!("unknown component handle {component}")));
        }
        if let Some(&no) = self.row_index.get(&(component, terrain)) {
            return Ok(no);
        }
        let no = self.rows.len() as RowNo;
        self.rows.push(ComponentTerrain {
            component,
            terrain_id: terrain,
            base: BaseMask::empty(),
            wall: WallMask::empty(),
            door: DoorMask::empty(),
            protected: false,
        });
        self.components[component as usize].rows.push(no);
        self.row_index.insert((component, terrain), no);
        Ok(no)
    }

    fn update_masks(
        &mut self,
        row: RowNo,
        base: BaseMask,
        wall: WallMask,
        door: DoorMask,
    ) -> Result<()> {
        let row = self
            .rows
            .get_mut(row as usize)
            .ok_or_else(|| Error::Store(format!("unknown row handle {row}")))?;
        row.base = base;
        row.wall = wall;
        row.door = door;
        Ok(())
    }

    fn tile_rows(&self, tile: TileNo) -> Result<Vec<TileRow>> {
        let tile = self.tile_ref(tile)?;
        let mut rows = Vec::new();
        for &component in &tile.components {
            for &no in &self.components[component as usize].rows {
                let row = &self.rows[no as usize];
                rows.push(TileRow {
                    row: no,
                    terrain_id: row.terrain_id,
                    protected: row.protected,
                });
            }
        }
        Ok(rows)
    }

    fn region_tiles(&self, region: RegionNo) -> Result<Vec<TileNo>> {
        let region = self
            .regions
            .get(region as usize)
            .ok_or_else(|| Error::Store(format!("unknown region handle {region}")))?;
        Ok(region.tiles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Color;

    #[test]
    fn test_find_or_create_is_stable() {
        let mut map = MapState::new();
        let r1 = map.find_or_create_region(1, 5).unwrap();
        let r2 = map.find_or_create_region(1, 5).unwrap();
        assert_eq!(r1, r2);
        assert_ne!(r1, map.find_or_create_region(2, 5).unwrap());

        let t1 = map.find_or_create_tile(r1, 10, -3).unwrap();
        let t2 = map.find_or_create_tile(r1, 10, -3).unwrap();
        assert_eq!(t1, t2);
        assert_eq!(map.tile(t1).unwrap().x, 10);
        assert_eq!(map.tile(t1).unwrap().y, -3);
    }

    #[test]
    fn test_color_grouping_stable() {
        let mut map = MapState::new();
        let r = map.find_or_create_region(1, 1).unwrap();
        let t = map.find_or_create_tile(r, 0, 0).unwrap();

        let tint = ColorKey::Tinted(Color::new(10, 20, 30, 255));
        let c1 = map.find_or_create_component(t, tint).unwrap();
        let c2 = map.find_or_create_component(t, ColorKey::Untinted).unwrap();
        let c3 = map.find_or_create_component(t, tint).unwrap();
        assert_eq!(c1, c3);
        assert_ne!(c1, c2);
        assert_eq!(map.tile(t).unwrap().components.len(), 2);
    }

    #[test]
    fn test_tile_rows_in_creation_order() {
        let mut map = MapState::new();
        let r = map.find_or_create_region(1, 1).unwrap();
        let t = map.find_or_create_tile(r, 0, 0).unwrap();
        let c = map.find_or_create_component(t, ColorKey::Untinted).unwrap();

        map.find_or_create_row(c, 300).unwrap();
        map.find_or_create_row(c, 100).unwrap();
        map.find_or_create_row(c, 300).unwrap(); // duplicate, no new row

        let rows = map.tile_rows(t).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.terrain_id).collect();
        assert_eq!(ids, vec![300, 100]);
    }

    #[test]
    fn test_protected_flag_carried() {
        let mut map = MapState::new();
        let r = map.find_or_create_region(1, 1).unwrap();
        let t = map.find_or_create_tile(r, 0, 0).unwrap();
        let c = map.find_or_create_component(t, ColorKey::Untinted).unwrap();
        let row = map.find_or_create_row(c, 131).unwrap();

        map.set_protected(row, true).unwrap();
        assert!(map.tile_rows(t).unwrap()[0].protected);
    }

    #[test]
    fn test_bad_handles_error() {
        let mut map = MapState::new();
        assert!(map.find_or_create_tile(9, 0, 0).is_err());
        assert!(map.tile_rows(9).is_err());
        assert!(map
            .update_masks(9, BaseMask::empty(), WallMask::empty(), DoorMask::empty())
            .is_err());
    }
}
