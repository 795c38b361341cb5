#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bad tile type {value:#04X} at offset {offset:#06X}")]
    BadTileType { value: u8, offset: usize },

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("move record at offset {offset:#06X} before any region transition")]
    NoPosition { offset: usize },

    #[error("terrain {terrain_id} has no sprite category")]
    UnknownCategory { terrain_id: u16 },

    #[error("unknown sprite category name: {0:?}")]
    BadCategoryName(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
