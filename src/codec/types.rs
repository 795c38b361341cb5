/// Segment identifier as found in the game world (not a store handle)
pub type SegmentId = u32;

/// Region identifier within a segment
pub type RegionId = u32;

/// Terrain piece identifier (u16 little-endian on the wire)
pub type TerrainId = u16;

/// Color (RGBA, 0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

/// Tint grouping key for a tile component.
///
/// Terrain records carrying the sentinel color FF FF FF FF render untinted;
/// everything else is an explicit RGBA multiplier. Records with equal keys
/// stack into one component. `Untinted` sorts before any tint, matching the
/// grouping order of the original tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ColorKey {
    #[default]
    Untinted,
    Tinted(Color),
}

impl ColorKey {
    /// Sentinel meaning "no tint" on the wire
    pub const NO_TINT: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

    pub fn from_wire(bytes: [u8; 4]) -> Self {
        if bytes == Self::NO_TINT {
            Self::Untinted
        } else {
            Self::Tinted(Color::from_bytes(bytes))
        }
    }

    pub fn is_tinted(self) -> bool {
        matches!(self, Self::Tinted(_))
    }
}

impl std::fmt::Display for ColorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untinted => write!(f, "-"),
            Self::Tinted(c) => write!(f, "{}, {}, {}, {}", c.r, c.g, c.b, c.a),
        }
    }
}

/// Tile-type discriminator byte.
///
/// Read once per occupied mask cell; classifies what payload (if any)
/// follows. The legal values form a closed set — anything else is treated as
/// stream corruption and aborts the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileType(pub u8);

impl TileType {
    /// Every tile-type value the format is known to emit
    pub const KNOWN: [u8; 32] = [
        0x00, 0x02, 0x04, 0x05, 0x06, 0x07,
        0x08, 0x0A, 0x0C, 0x0D, 0x0E, 0x0F,
        0x12, 0x16, 0x17, 0x1A, 0x1E, 0x1F,
        0x22, 0x26, 0x27, 0x2A, 0x2E, 0x2F,
        0x45, 0x47, 0x4D, 0x4F,
        0x57, 0x5F,
        0x67, 0x6F,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        if Self::KNOWN.contains(&v) {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Tile types with no payload at all: only the discriminator byte
    pub fn is_empty(self) -> bool {
        matches!(
            self.0,
            0x00 | 0x02 | 0x08 | 0x0A | 0x12 | 0x1A | 0x22 | 0x2A
        )
    }

    /// Tile types whose terrain records carry a 4-byte color tuple
    pub fn has_color(self) -> bool {
        matches!(
            self.0,
            0x0C | 0x0D | 0x0E | 0x0F | 0x1E | 0x1F | 0x2E | 0x2F | 0x4D | 0x4F | 0x5F | 0x6F
        )
    }

    /// Tile types followed by a trailing movement-cost byte
    pub fn has_move_cost(self) -> bool {
        matches!(self.0, 0x05 | 0x0D | 0x45 | 0x4D)
    }
}

/// Decode a move-record direction byte into a (dx, dy) tile delta.
///
/// Low nibble is x, high nibble is y, both biased by 4: nibble 4 means no
/// movement, 5 means +1, 3 means -1.
pub fn direction_delta(direction: u8) -> (i32, i32) {
    let dx = (direction & 0x0F) as i32 - 4;
    let dy = ((direction >> 4) & 0x0F) as i32 - 4;
    (dx, dy)
}
