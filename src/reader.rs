use byteorder::{BigEndian, ByteOrder};

use crate::error::{NbtError, NbtResult};

/// Bounds-checked cursor over a byte slice with a sticky failure flag (§4.1).
/// Once a read fails, every subsequent read is a no-op that returns the same
/// failure, so builder code can read linearly and check once at the end.
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
    failure: Option<String>,
}

macro_rules! read_be {
    ($name:ident, $typ:ty, $width:expr, $read_fn:ident) => {
        pub fn $name(&mut self) -> NbtResult<$typ> {
            self.ensure($width)?;
            let value = BigEndian::$read_fn(&self.data[self.offset..self.offset + $width]);
            self.offset += $width;
            Ok(value)
        }
    };
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            failure: None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn set_offset(&mut self, offset: usize) -> NbtResult<()> {
        if offset > self.data.len() {
            return self.fail(format!("offset {} is out of bounds", offset));
        }
        self.offset = offset;
        Ok(())
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Returns the sticky failure, if any; used once at the end of a build
    /// pass instead of after every individual read.
    pub fn check(&self) -> NbtResult<()> {
        match &self.failure {
            Some(msg) => Err(NbtError::Message(msg.clone())),
            None => Ok(()),
        }
    }

    fn fail<T>(&mut self, msg: String) -> NbtResult<T> {
        if self.failure.is_none() {
            self.failure = Some(msg);
        }
        Err(NbtError::Message(self.failure.clone().unwrap()))
    }

    fn ensure(&mut self, n: usize) -> NbtResult<()> {
        if self.failure.is_some() {
            return Err(NbtError::Message(self.failure.clone().unwrap()));
        }
        if self.offset + n > self.data.len() {
            let offset = self.offset;
            return self.fail(format!("unexpected end of input at offset {}", offset));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> NbtResult<u8> {
        self.ensure(1)?;
        let byte = self.data[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    pub fn peek_u8(&mut self) -> NbtResult<u8> {
        self.ensure(1)?;
        Ok(self.data[self.offset])
    }

    pub fn read_i8(&mut self) -> NbtResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_be!(read_u16, u16, 2, read_u16);
    read_be!(read_i16, i16, 2, read_i16);
    read_be!(read_i32, i32, 4, read_i32);
    read_be!(read_i64, i64, 8, read_i64);
    read_be!(read_f32, f32, 4, read_f32);
    read_be!(read_f64, f64, 8, read_f64);

    pub fn read_bytes(&mut self, len: usize) -> NbtResult<&'a [u8]> {
        self.ensure(len)?;
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn skip_bytes(&mut self, len: usize) -> NbtResult<()> {
        self.read_bytes(len).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_primitives() {
        let mut reader = ByteReader::new(&[0x00, 0x2A, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(reader.read_u16().unwrap(), 42);
        assert_eq!(reader.read_i32().unwrap(), -1);
    }

    #[test]
    fn sticky_failure_after_first_eof() {
        let mut reader = ByteReader::new(&[0x00]);
        assert!(reader.read_u16().is_err());
        assert!(reader.failed());
        // subsequent reads are no-ops returning the same failure
        assert!(reader.read_u8().is_err());
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut reader = ByteReader::new(&[7]);
        assert_eq!(reader.peek_u8().unwrap(), 7);
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.offset(), 1);
    }
}
