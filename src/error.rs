use thiserror::Error;

use crate::kind::NBTKind;

pub type NbtResult<T> = std::result::Result<T, NbtError>;

/// Low-level parse/serialise errors, surfaced by the Byte Reader, Tree
/// Builder and NBT Serialiser.
#[derive(Debug, Error)]
pub enum NbtError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input at offset {offset}")]
    Eof { offset: usize },
    #[error("invalid tag type id {0}")]
    InvalidTagId(u8),
    #[error("root tag must not be TAG_End")]
    RootIsEnd,
    #[error("list declares element type End with count {0} > 0")]
    EndTypedListNonEmpty(i32),
    #[error("negative length {0} in length-prefixed payload")]
    NegativeLength(i64),
    #[error("length-prefixed allocation of {0} elements would overflow")]
    LengthOverflow(i64),
    #[error("expected tag kind {expected} but found {found}")]
    MismatchedTag { found: NBTKind, expected: NBTKind },
    #[error("offset {0} is out of bounds")]
    OffsetOutOfBounds(usize),
    #[error("{0}")]
    Message(String),
}

/// The closed edit-status taxonomy. `OK` is represented by `Result::Ok`, so
/// this enum carries exactly the eight failure conditions of the design's
/// error table.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("{0}")]
    PathSyntax(String),
    #[error("{0}")]
    PathNotFound(String),
    #[error("{0}")]
    IndexBounds(String),
    #[error("{0}")]
    TypeMismatch(String),
    #[error("{0}")]
    InvalidJson(String),
    #[error("{0}")]
    NumericRange(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("{0}")]
    Memory(String),
}

impl EditError {
    /// The taxonomy name as printed in the driver's failure message, e.g.
    /// `PATH_NOT_FOUND`.
    pub fn status_name(&self) -> &'static str {
        match self {
            EditError::PathSyntax(_) => "PATH_SYNTAX",
            EditError::PathNotFound(_) => "PATH_NOT_FOUND",
            EditError::IndexBounds(_) => "INDEX_BOUNDS",
            EditError::TypeMismatch(_) => "TYPE_MISMATCH",
            EditError::InvalidJson(_) => "INVALID_JSON",
            EditError::NumericRange(_) => "NUMERIC_RANGE",
            EditError::Unsupported(_) => "UNSUPPORTED",
            EditError::Memory(_) => "MEMORY",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            EditError::PathSyntax(d)
            | EditError::PathNotFound(d)
            | EditError::IndexBounds(d)
            | EditError::TypeMismatch(d)
            | EditError::InvalidJson(d)
            | EditError::NumericRange(d)
            | EditError::Unsupported(d)
            | EditError::Memory(d) => d,
        }
    }
}

pub type EditResult<T> = std::result::Result<T, EditError>;

/// Errors from the region container reader/writer (`.mca`).
#[derive(Debug, Error)]
pub enum RegionError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Nbt(#[from] NbtError),
    #[error("region file is smaller than the 8192-byte header")]
    TooSmall,
    #[error("chunk ({x}, {z}): corrupt location entry (offset xor count is zero)")]
    CorruptLocationEntry { x: i32, z: i32 },
    #[error("chunk ({x}, {z}): sector offset {offset} points into header sectors")]
    OffsetInHeader { x: i32, z: i32, offset: u32 },
    #[error("chunk ({x}, {z}): sector range out of bounds")]
    SectorOutOfBounds { x: i32, z: i32 },
    #[error("chunk ({x}, {z}): overlapping chunk sector allocation")]
    SectorOverlap { x: i32, z: i32 },
    #[error("chunk ({x}, {z}): length field {length} invalid for sector span")]
    BadLength { x: i32, z: i32, length: i64 },
    #[error("chunk ({x}, {z}): invalid compression type {compression_type}")]
    BadCompressionType { x: i32, z: i32, compression_type: u8 },
    #[error("chunk ({0}, {1}) is not present in this region")]
    ChunkAbsent(i32, i32),
    #[error("chunk coordinates ({0}, {1}) out of range 0..31")]
    CoordsOutOfRange(i32, i32),
    #[error("chunk payload of {0} bytes needs more than 255 sectors")]
    ChunkTooLarge(usize),
    #[error("region file would need more than 2^24 sectors")]
    RegionTooLarge,
}

pub type RegionResult<T> = std::result::Result<T, RegionError>;
