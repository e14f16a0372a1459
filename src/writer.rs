use std::io;

use byteorder::WriteBytesExt;

use crate::error::NbtResult;

/// Thin big-endian primitive writer, grounded on the teacher's `writer.rs`
/// but stripped of the serde-driven `DelayedHeader` machinery: the tree
/// serialiser (`src/serialize.rs`) always knows its header up front.
pub(crate) struct Writer<W: io::Write> {
    writer: W,
}

impl<W: io::Write> Writer<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    pub(crate) fn write_u8(&mut self, n: u8) -> NbtResult<()> {
        self.writer.write_u8(n)?;
        Ok(())
    }

    pub(crate) fn write_i8(&mut self, n: i8) -> NbtResult<()> {
        self.writer.write_i8(n)?;
        Ok(())
    }

    pub(crate) fn write_u16(&mut self, n: u16) -> NbtResult<()> {
        self.writer.write_u16::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_i16(&mut self, n: i16) -> NbtResult<()> {
        self.writer.write_i16::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_i32(&mut self, n: i32) -> NbtResult<()> {
        self.writer.write_i32::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_i64(&mut self, n: i64) -> NbtResult<()> {
        self.writer.write_i64::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_f32(&mut self, n: f32) -> NbtResult<()> {
        self.writer.write_f32::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_f64(&mut self, n: f64) -> NbtResult<()> {
        self.writer.write_f64::<byteorder::BigEndian>(n)?;
        Ok(())
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> NbtResult<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }
}
