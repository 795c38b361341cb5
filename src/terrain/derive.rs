//! Terrain-state derivation
//!
//! Whenever a tile's component set changes, the three render masks of every
//! terrain row on that tile are recomputed from scratch in two passes:
//!
//! 1. scan all rows once into a [`TileProfile`] of tile-wide predicates
//!    (which door/wall variants exist, and which variant is authoritative
//!    after precedence),
//! 2. assemble each row's masks from its own category plus the profile.
//!
//! The computation is pure and idempotent per tile. Callers may run it for
//! different tiles concurrently but must serialize runs for the same tile;
//! the read-then-write cycle over one tile's rows is not safe under
//! concurrent mutation.

use tracing::trace;

use crate::catalog::SpriteCatalog;
use crate::error::{Error, Result};
use crate::store::{MapStore, RegionNo, TileNo};
use super::category::{DoorPart, Orientation, RubbleScope, SpriteCategory, WallPart, WallShape};
use super::masks::{BaseMask, DoorMask, WallMask};

/// Door predicates for one orientation.
///
/// After [`TileProfile::classify`], `open`/`closed`/`ruins` mean that
/// variant is the *authoritative* one, not merely present: open dominates
/// closed dominates ruins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoorFlags {
    pub present: bool,
    pub open: bool,
    pub closed: bool,
    pub ruins: bool,
}

/// Wall predicates for one shape; normal dominates destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallFlags {
    pub present: bool,
    pub normal: bool,
    pub destroyed: bool,
}

/// Tile-wide classification (pass 1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileProfile {
    door_vertical: DoorFlags,
    door_horizontal: DoorFlags,
    wall_vertical: WallFlags,
    wall_horizontal: WallFlags,
    wall_corner: WallFlags,
}

impl TileProfile {
    /// Scan the tile's categories and apply precedence.
    pub fn classify<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = &'a SpriteCategory>,
    {
        let mut p = Self::default();

        for cat in categories {
            match *cat {
                SpriteCategory::Door(o, part) => {
                    let d = p.door_mut(o);
                    match part {
                        DoorPart::Open => d.open = true,
                        DoorPart::Closed => d.closed = true,
                        DoorPart::Ruins => d.ruins = true,
                        // Thresholds, jambs and layer pieces do not decide
                        // the door's state
                        DoorPart::Threshold
                        | DoorPart::Jamb
                        | DoorPart::RuinsJamb
                        | DoorPart::Layers => {}
                    }
                }
                SpriteCategory::Wall(shape, part) => {
                    let w = p.wall_mut(shape);
                    match part {
                        WallPart::Normal => w.normal = true,
                        WallPart::Destroyed => w.destroyed = true,
                        WallPart::Layers => {}
                    }
                }
                SpriteCategory::Rubble(_) | SpriteCategory::Plain => {}
            }
        }

        // Door precedence first. A door of an orientation also takes the
        // cell away from walls of that orientation, so the wall-present
        // flags are computed only afterwards.
        for o in [Orientation::Vertical, Orientation::Horizontal] {
            let d = p.door_mut(o);
            if d.open || d.closed || d.ruins {
                d.present = true;
                if d.open {
                    d.closed = false;
                    d.ruins = false;
                } else if d.closed {
                    d.ruins = false;
                }
                let shape = match o {
                    Orientation::Vertical => WallShape::Vertical,
                    Orientation::Horizontal => WallShape::Horizontal,
                };
                let w = p.wall_mut(shape);
                w.normal = false;
                w.destroyed = false;
            }
        }

        for shape in [WallShape::Vertical, WallShape::Horizontal, WallShape::Corner] {
            let w = p.wall_mut(shape);
            if w.normal || w.destroyed {
                w.present = true;
            }
            if w.normal {
                w.destroyed = false;
            }
        }

        p
    }

    pub fn door(&self, o: Orientation) -> DoorFlags {
        match o {
            Orientation::Vertical => self.door_vertical,
            Orientation::Horizontal => self.door_horizontal,
        }
    }

    pub fn wall(&self, shape: WallShape) -> WallFlags {
        match shape {
            WallShape::Vertical => self.wall_vertical,
            WallShape::Horizontal => self.wall_horizontal,
            WallShape::Corner => self.wall_corner,
        }
    }

    fn door_mut(&mut self, o: Orientation) -> &mut DoorFlags {
        match o {
            Orientation::Vertical => &mut self.door_vertical,
            Orientation::Horizontal => &mut self.door_horizontal,
        }
    }

    fn wall_mut(&mut self, shape: WallShape) -> &mut WallFlags {
        match shape {
            WallShape::Vertical => &mut self.wall_vertical,
            WallShape::Horizontal => &mut self.wall_horizontal,
            WallShape::Corner => &mut self.wall_corner,
        }
    }
}

/// Assemble one row's masks from its category and the tile profile (pass 2).
pub fn assemble_masks(
    category: SpriteCategory,
    profile: &TileProfile,
) -> (BaseMask, WallMask, DoorMask) {
    let mut base = BaseMask::empty();
    let mut wall = WallMask::empty();
    let mut door = DoorMask::empty();

    match category {
        SpriteCategory::Plain => base |= BaseMask::VISIBLE,

        SpriteCategory::Door(o, part) => {
            let d = profile.door(o);
            match part {
                DoorPart::Threshold => {
                    if d.present {
                        door |= DoorMask::RUINS
                            | DoorMask::CLOSED
                            | DoorMask::OPEN
                            | DoorMask::VISIBLE;
                    }
                }
                DoorPart::Open => door |= DoorMask::OPEN | DoorMask::VISIBLE,
                DoorPart::Closed => {
                    door |= DoorMask::CLOSED;
                    if d.closed {
                        door |= DoorMask::VISIBLE;
                    }
                }
                DoorPart::Ruins => {
                    door |= DoorMask::RUINS;
                    if d.ruins {
                        door |= DoorMask::VISIBLE;
                    }
                }
                // Visibility of these pieces is carried entirely by sibling
                // pieces of the same door
                DoorPart::Jamb | DoorPart::RuinsJamb | DoorPart::Layers => {}
            }
        }

        SpriteCategory::Wall(shape, part) => {
            let w = profile.wall(shape);
            match part {
                WallPart::Normal => {
                    wall |= WallMask::NORMAL;
                    if w.normal {
                        wall |= WallMask::VISIBLE;
                    } else if shape != WallShape::Corner {
                        // A door of this orientation owns the cell; the
                        // wall only shows in door-aware views
                        door |= DoorMask::WALL_HIDDEN;
                    }
                }
                WallPart::Destroyed => {
                    wall |= WallMask::DESTROYED;
                    if w.destroyed {
                        wall |= WallMask::VISIBLE;
                    }
                }
                WallPart::Layers => {
                    if w.present {
                        wall |= WallMask::NORMAL;
                        if w.normal {
                            wall |= WallMask::VISIBLE;
                        }
                        if let Some(o) = shape.orientation() {
                            if profile.door(o).present {
                                door |= DoorMask::WALL_HIDDEN;
                            }
                        }
                    } else {
                        // No wall at all: the layer piece is plain scenery
                        base |= BaseMask::VISIBLE;
                    }
                }
            }
        }

        SpriteCategory::Rubble(scope) => {
            let (present, destroyed) = match scope {
                RubbleScope::AnyWall => {
                    let (v, h, c) = (
                        profile.wall(WallShape::Vertical),
                        profile.wall(WallShape::Horizontal),
                        profile.wall(WallShape::Corner),
                    );
                    (
                        v.present || h.present || c.present,
                        v.destroyed || h.destroyed || c.destroyed,
                    )
                }
                RubbleScope::Vertical => {
                    let w = profile.wall(WallShape::Vertical);
                    (w.present, w.destroyed)
                }
                RubbleScope::Horizontal => {
                    let w = profile.wall(WallShape::Horizontal);
                    (w.present, w.destroyed)
                }
            };
            if present {
                wall |= WallMask::DESTROYED;
                if destroyed {
                    wall |= WallMask::VISIBLE;
                }
            } else {
                base |= BaseMask::VISIBLE;
            }
        }
    }

    (base, wall, door)
}

/// Recompute and persist the masks of every terrain row on one tile.
///
/// Idempotent: rerunning over an unchanged row set writes identical masks.
pub fn derive_tile<S, C>(store: &mut S, catalog: &C, tile: TileNo) -> Result<()>
where
    S: MapStore,
    C: SpriteCatalog,
{
    let rows = store.tile_rows(tile)?;
    let mut annotated = Vec::with_capacity(rows.len());
    for row in rows {
        let category = catalog
            .category_of(row.terrain_id)
            .ok_or(Error::UnknownCategory {
                terrain_id: row.terrain_id,
            })?;
        annotated.push((row, category));
    }

    let profile = TileProfile::classify(annotated.iter().map(|(_, c)| c));

    for (row, category) in &annotated {
        let (base, wall, door) = assemble_masks(*category, &profile);
        trace!(
            tile,
            row = row.row,
            terrain = row.terrain_id,
            base = base.bits(),
            wall = wall.bits(),
            door = door.bits(),
            "masks"
        );
        store.update_masks(row.row, base, wall, door)?;
    }
    Ok(())
}

/// Re-derive every tile of a region, tile by tile.
pub fn recompute_region<S, C>(store: &mut S, catalog: &C, region: RegionNo) -> Result<()>
where
    S: MapStore,
    C: SpriteCatalog,
{
    for tile in store.region_tiles(region)? {
        derive_tile(store, catalog, tile)?;
    }
    Ok(())
}
