//! Sprite category classification
//!
//! Every terrain id maps to one sprite category describing its structural
//! role on a tile. The catalog stores categories as short text labels
//! ("door vertical open", "wall corner destroyed", ...); here they become a
//! closed enum so the derivation passes can match exhaustively instead of
//! falling through a string-comparison chain.

use crate::error::{Error, Result};

/// Door orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Which piece of a door assembly a sprite draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorPart {
    Threshold,
    Open,
    Closed,
    Ruins,
    /// Frame piece; visibility is driven entirely by sibling pieces
    Jamb,
    RuinsJamb,
    Layers,
}

/// Wall shape (corners are orientation-less)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallShape {
    Vertical,
    Horizontal,
    Corner,
}

impl WallShape {
    /// The door orientation that can occupy the same cell, if any.
    /// Corner walls never share a cell with a door.
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Vertical => Some(Orientation::Vertical),
            Self::Horizontal => Some(Orientation::Horizontal),
            Self::Corner => None,
        }
    }
}

/// Which piece of a wall a sprite draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallPart {
    Normal,
    Destroyed,
    Layers,
}

/// Which wall shapes a rubble sprite stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RubbleScope {
    AnyWall,
    Vertical,
    Horizontal,
}

/// Structural role of a terrain id's sprite.
///
/// `Plain` covers everything without door/wall semantics (floors, scenery,
/// effects); such pieces are always rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteCategory {
    Plain,
    Door(Orientation, DoorPart),
    Wall(WallShape, WallPart),
    Rubble(RubbleScope),
}

impl SpriteCategory {
    /// Parse a textual category label.
    ///
    /// Labels starting with "door" or "wall" must name a known structural
    /// variant — a near-miss there is a catalog defect, not a plain sprite.
    /// Any other label is `Plain`. The historical "threshhold" spelling is
    /// accepted alongside the corrected one.
    pub fn parse(label: &str) -> Result<Self> {
        use DoorPart::*;
        use Orientation::*;
        use WallPart::*;

        let cat = match label {
            "door vertical threshhold" | "door vertical threshold" => Self::Door(Vertical, Threshold),
            "door vertical open" => Self::Door(Vertical, Open),
            "door vertical closed" => Self::Door(Vertical, Closed),
            "door vertical ruins" => Self::Door(Vertical, Ruins),
            "door vertical jamb" => Self::Door(Vertical, Jamb),
            "door vertical ruins jamb" => Self::Door(Vertical, RuinsJamb),
            "door vertical layers" => Self::Door(Vertical, DoorPart::Layers),

            "door horizontal threshhold" | "door horizontal threshold" => {
                Self::Door(Horizontal, Threshold)
            }
            "door horizontal open" => Self::Door(Horizontal, Open),
            "door horizontal closed" => Self::Door(Horizontal, Closed),
            "door horizontal ruins" => Self::Door(Horizontal, Ruins),
            "door horizontal jamb" => Self::Door(Horizontal, Jamb),
            "door horizontal ruins jamb" => Self::Door(Horizontal, RuinsJamb),
            "door horizontal layers" => Self::Door(Horizontal, DoorPart::Layers),

            "wall vertical normal" => Self::Wall(WallShape::Vertical, Normal),
            "wall vertical destroyed" => Self::Wall(WallShape::Vertical, Destroyed),
            "wall vertical layers" => Self::Wall(WallShape::Vertical, WallPart::Layers),

            "wall horizontal normal" => Self::Wall(WallShape::Horizontal, Normal),
            "wall horizontal destroyed" => Self::Wall(WallShape::Horizontal, Destroyed),
            "wall horizontal layers" => Self::Wall(WallShape::Horizontal, WallPart::Layers),

            "wall corner normal" => Self::Wall(WallShape::Corner, Normal),
            "wall corner destroyed" => Self::Wall(WallShape::Corner, Destroyed),
            "wall corner layers" => Self::Wall(WallShape::Corner, WallPart::Layers),

            "wall rubble" => Self::Rubble(RubbleScope::AnyWall),
            "wall vertical rubble" => Self::Rubble(RubbleScope::Vertical),
            "wall horizontal rubble" => Self::Rubble(RubbleScope::Horizontal),

            other if other.starts_with("door ") || other.starts_with("wall ") => {
                return Err(Error::BadCategoryName(other.to_string()));
            }
            _ => Self::Plain,
        };
        Ok(cat)
    }
}
