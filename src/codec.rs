use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use log::debug;

use crate::error::NbtResult;

/// One of the three compression framings a standalone NBT document or a
/// region chunk payload may be stored under (§4.2 / §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Gzip,
    Zlib,
    Raw,
}

/// Classify a buffer by its leading bytes. Gzip and zlib both have
/// unambiguous magic; anything else is treated as raw NBT.
pub fn detect_framing(bytes: &[u8]) -> Framing {
    let framing = detect_framing_inner(bytes);
    debug!("detected {:?} framing from leading bytes", framing);
    framing
}

fn detect_framing_inner(bytes: &[u8]) -> Framing {
    if bytes.len() >= 2 && bytes[0] == 0x1F && bytes[1] == 0x8B {
        return Framing::Gzip;
    }
    if bytes.len() >= 2 {
        let cmf = bytes[0];
        if (cmf & 0x0F) == 8 && (cmf >> 4) <= 7 {
            let check = ((cmf as u16) << 8) | bytes[1] as u16;
            if check % 31 == 0 {
                return Framing::Zlib;
            }
        }
    }
    Framing::Raw
}

pub fn inflate(buf: &[u8], framing: Framing) -> NbtResult<Vec<u8>> {
    let mut out = Vec::new();
    match framing {
        Framing::Gzip => {
            GzDecoder::new(buf).read_to_end(&mut out)?;
        }
        Framing::Zlib => {
            ZlibDecoder::new(buf).read_to_end(&mut out)?;
        }
        Framing::Raw => out.extend_from_slice(buf),
    }
    Ok(out)
}

pub fn deflate(buf: &[u8], framing: Framing) -> NbtResult<Vec<u8>> {
    match framing {
        Framing::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(buf)?;
            Ok(encoder.finish()?)
        }
        Framing::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(buf)?;
            Ok(encoder.finish()?)
        }
        Framing::Raw => Ok(buf.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gzip_magic() {
        assert_eq!(detect_framing(&[0x1F, 0x8B, 0x08]), Framing::Gzip);
    }

    #[test]
    fn detects_zlib_header() {
        // 0x78 0x9C is the common "default compression" zlib header.
        assert_eq!(detect_framing(&[0x78, 0x9C]), Framing::Zlib);
    }

    #[test]
    fn falls_back_to_raw() {
        assert_eq!(detect_framing(&[0x0A, 0x00, 0x00]), Framing::Raw);
        assert_eq!(detect_framing(&[]), Framing::Raw);
    }

    #[test]
    fn gzip_round_trips() {
        let original = b"hello nbt world".to_vec();
        let compressed = deflate(&original, Framing::Gzip).unwrap();
        assert_eq!(detect_framing(&compressed), Framing::Gzip);
        let restored = inflate(&compressed, Framing::Gzip).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn zlib_round_trips() {
        let original = b"hello nbt world".to_vec();
        let compressed = deflate(&original, Framing::Zlib).unwrap();
        assert_eq!(detect_framing(&compressed), Framing::Zlib);
        let restored = inflate(&compressed, Framing::Zlib).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn raw_is_passthrough() {
        let original = b"raw bytes".to_vec();
        assert_eq!(deflate(&original, Framing::Raw).unwrap(), original);
        assert_eq!(inflate(&original, Framing::Raw).unwrap(), original);
    }
}
