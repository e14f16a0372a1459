use std::fmt::Display;

use crate::error::NbtError;

/// Wire-format tag type discriminant (codes 0..12), matching Java-edition NBT.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum NBTKind {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl NBTKind {
    pub fn wire_code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for NBTKind {
    type Error = NbtError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NBTKind::End),
            1 => Ok(NBTKind::Byte),
            2 => Ok(NBTKind::Short),
            3 => Ok(NBTKind::Int),
            4 => Ok(NBTKind::Long),
            5 => Ok(NBTKind::Float),
            6 => Ok(NBTKind::Double),
            7 => Ok(NBTKind::ByteArray),
            8 => Ok(NBTKind::String),
            9 => Ok(NBTKind::List),
            10 => Ok(NBTKind::Compound),
            11 => Ok(NBTKind::IntArray),
            12 => Ok(NBTKind::LongArray),
            other => Err(NbtError::InvalidTagId(other)),
        }
    }
}

impl Display for NBTKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self))
    }
}
