//! Tree Builder (§4.3): consumes bytes via the Byte Reader and produces a
//! rooted tag tree. Grounded on `nbt_builder.c`'s `build_nbt_tree` /
//! `parse_payload`, translated from malloc'd `NBTTag*` into owned `Tag`
//! values so subtree teardown is just an ordinary `Drop`.

use log::trace;

use crate::error::{NbtError, NbtResult};
use crate::kind::NBTKind;
use crate::reader::ByteReader;
use crate::tag::{Tag, TagValue};

/// Parses exactly one document rooted at offset 0. Returns the root tag and
/// the offset immediately after it, so callers can warn on trailing bytes.
pub fn parse_document(data: &[u8]) -> NbtResult<(Tag, usize)> {
    let mut reader = ByteReader::new(data);
    let root = parse_named_tag(&mut reader, true)?;
    reader.check()?;
    Ok((root, reader.offset()))
}

fn read_name(reader: &mut ByteReader) -> NbtResult<Vec<u8>> {
    let len = reader.read_u16()? as usize;
    Ok(reader.read_bytes(len)?.to_vec())
}

fn parse_named_tag(reader: &mut ByteReader, is_root: bool) -> NbtResult<Tag> {
    let kind = NBTKind::try_from(reader.read_u8()?)?;
    if kind == NBTKind::End {
        if is_root {
            return Err(NbtError::RootIsEnd);
        }
        return Err(NbtError::Message(
            "TAG_End encountered where a named tag was expected".into(),
        ));
    }
    let name = read_name(reader)?;
    trace!("read tag {:?} {:?} at offset {}", kind, String::from_utf8_lossy(&name), reader.offset());
    let value = parse_payload(reader, kind)?;
    Ok(Tag { name, value })
}

/// Reads the payload for `kind` with no preceding type/name bytes — used
/// both for a named tag's body and for unnamed list elements.
fn parse_payload(reader: &mut ByteReader, kind: NBTKind) -> NbtResult<TagValue> {
    match kind {
        NBTKind::End => Err(NbtError::Message("TAG_End has no payload".into())),
        NBTKind::Byte => Ok(TagValue::Byte(reader.read_i8()?)),
        NBTKind::Short => Ok(TagValue::Short(reader.read_i16()?)),
        NBTKind::Int => Ok(TagValue::Int(reader.read_i32()?)),
        NBTKind::Long => Ok(TagValue::Long(reader.read_i64()?)),
        NBTKind::Float => Ok(TagValue::Float(reader.read_f32()?)),
        NBTKind::Double => Ok(TagValue::Double(reader.read_f64()?)),
        NBTKind::ByteArray => {
            let len = read_array_len(reader)?;
            let bytes = reader.read_bytes(len)?;
            Ok(TagValue::ByteArray(bytes.iter().map(|&b| b as i8).collect()))
        }
        NBTKind::String => {
            let len = reader.read_u16()? as usize;
            Ok(TagValue::String(reader.read_bytes(len)?.to_vec()))
        }
        NBTKind::List => {
            let element_kind = NBTKind::try_from(reader.read_u8()?)?;
            let count = reader.read_i32()?;
            if count < 0 {
                return Err(NbtError::NegativeLength(count as i64));
            }
            if count > 0 && element_kind == NBTKind::End {
                return Err(NbtError::EndTypedListNonEmpty(count));
            }
            // No `Vec::with_capacity(count)` here: each element read is
            // still bounds-checked against the remaining buffer, so a
            // corrupt oversized count fails fast instead of driving a huge
            // up-front allocation.
            let mut items = Vec::new();
            for _ in 0..count {
                let value = parse_payload(reader, element_kind)?;
                items.push(Tag {
                    name: Vec::new(),
                    value,
                });
            }
            Ok(TagValue::List { element_kind, items })
        }
        NBTKind::Compound => {
            let mut children = Vec::new();
            loop {
                if reader.peek_u8()? == NBTKind::End.wire_code() {
                    reader.read_u8()?;
                    break;
                }
                children.push(parse_named_tag(reader, false)?);
            }
            Ok(TagValue::Compound(children))
        }
        NBTKind::IntArray => {
            let len = read_array_len(reader)?;
            let mut items = Vec::new();
            for _ in 0..len {
                items.push(reader.read_i32()?);
            }
            Ok(TagValue::IntArray(items))
        }
        NBTKind::LongArray => {
            let len = read_array_len(reader)?;
            let mut items = Vec::new();
            for _ in 0..len {
                items.push(reader.read_i64()?);
            }
            Ok(TagValue::LongArray(items))
        }
    }
}

fn read_array_len(reader: &mut ByteReader) -> NbtResult<usize> {
    let len = reader.read_i32()?;
    if len < 0 {
        return Err(NbtError::NegativeLength(len as i64));
    }
    Ok(len as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_tag(name: &str, value: i8) -> Vec<u8> {
        let mut out = vec![NBTKind::Byte.wire_code()];
        out.extend((name.len() as u16).to_be_bytes());
        out.extend(name.as_bytes());
        out.push(value as u8);
        out
    }

    #[test]
    fn rejects_end_root() {
        let data = [0u8];
        assert!(matches!(
            parse_document(&data),
            Err(NbtError::RootIsEnd)
        ));
    }

    #[test]
    fn rejects_unknown_tag_id() {
        let data = [13u8, 0, 0];
        assert!(matches!(parse_document(&data), Err(NbtError::InvalidTagId(13))));
    }

    #[test]
    fn parses_compound_with_one_byte_child() {
        let mut data = vec![NBTKind::Compound.wire_code(), 0, 0];
        data.extend(byte_tag("Age", 42));
        data.push(NBTKind::End.wire_code());
        let (root, consumed) = parse_document(&data).unwrap();
        assert_eq!(consumed, data.len());
        let children = root.as_compound().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, b"Age");
        assert_eq!(children[0].value, TagValue::Byte(42));
    }

    #[test]
    fn empty_list_may_declare_end_type() {
        let mut data = vec![NBTKind::Compound.wire_code(), 0, 0];
        // unnamed List child, element type End, count 0
        data.push(NBTKind::List.wire_code());
        data.extend(0u16.to_be_bytes()); // empty name
        data.push(NBTKind::End.wire_code());
        data.extend(0i32.to_be_bytes());
        data.push(NBTKind::End.wire_code());
        let (root, _) = parse_document(&data).unwrap();
        let list = &root.as_compound().unwrap()[0];
        assert_eq!(
            list.value,
            TagValue::List {
                element_kind: NBTKind::End,
                items: vec![]
            }
        );
    }

    #[test]
    fn nonempty_end_typed_list_is_rejected() {
        let mut data = vec![NBTKind::Compound.wire_code(), 0, 0];
        data.push(NBTKind::List.wire_code());
        data.extend(0u16.to_be_bytes());
        data.push(NBTKind::End.wire_code());
        data.extend(3i32.to_be_bytes());
        assert!(matches!(
            parse_document(&data),
            Err(NbtError::EndTypedListNonEmpty(3))
        ));
    }

    #[test]
    fn negative_array_length_is_rejected() {
        let mut data = vec![NBTKind::Compound.wire_code(), 0, 0];
        data.push(NBTKind::IntArray.wire_code());
        data.extend(0u16.to_be_bytes());
        data.extend((-1i32).to_be_bytes());
        assert!(matches!(parse_document(&data), Err(NbtError::NegativeLength(-1))));
    }
}
