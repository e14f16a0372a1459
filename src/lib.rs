mod reader;
mod writer;

pub mod builder;
pub mod codec;
pub mod error;
pub mod kind;
pub mod mutate;
pub mod path;
pub mod region;
pub mod serialize;
pub mod tag;
pub mod value;

pub use builder::parse_document;
pub use codec::{detect_framing, deflate, inflate, Framing};
pub use error::{EditError, EditResult, NbtError, NbtResult, RegionError, RegionResult};
pub use kind::NBTKind;
pub use mutate::{delete, edit, set_or_create};
pub use path::PathTarget;
pub use region::{chunk_coords, chunk_index, ChunkSlot, CompressionType, RegionFile};
pub use serialize::{serialize_document, serialize_to_bytes};
pub use tag::{Tag, TagValue};
