//! NBT Serialiser (§4.8): writes a tag tree to a byte sink in big-endian NBT
//! wire order. Grounded on the teacher's `writer.rs` primitives plus
//! `edit_save.c`'s `write_tag`/`write_payload` — in particular the List
//! writer's "count and emit only elements whose runtime type matches the
//! declared element-type" rule (§9's retained open question, property 1).

use std::io;

use crate::error::{NbtError, NbtResult};
use crate::kind::NBTKind;
use crate::tag::{Tag, TagValue};
use crate::writer::Writer;

pub fn serialize_document<W: io::Write>(root: &Tag, sink: W) -> NbtResult<()> {
    let mut writer = Writer::new(sink);
    write_named_tag(&mut writer, root)
}

pub fn serialize_to_bytes(root: &Tag) -> NbtResult<Vec<u8>> {
    let mut out = Vec::new();
    serialize_document(root, &mut out)?;
    Ok(out)
}

fn checked_len(n: usize) -> NbtResult<i32> {
    i32::try_from(n).map_err(|_| NbtError::LengthOverflow(n as i64))
}

fn write_named_tag<W: io::Write>(writer: &mut Writer<W>, tag: &Tag) -> NbtResult<()> {
    writer.write_u8(tag.kind().wire_code())?;
    write_name(writer, &tag.name)?;
    write_payload(writer, &tag.value)
}

fn write_name<W: io::Write>(writer: &mut Writer<W>, name: &[u8]) -> NbtResult<()> {
    writer.write_u16(checked_len(name.len())? as u16)?;
    writer.write_bytes(name)
}

fn write_payload<W: io::Write>(writer: &mut Writer<W>, value: &TagValue) -> NbtResult<()> {
    match value {
        TagValue::Byte(v) => writer.write_i8(*v),
        TagValue::Short(v) => writer.write_i16(*v),
        TagValue::Int(v) => writer.write_i32(*v),
        TagValue::Long(v) => writer.write_i64(*v),
        TagValue::Float(v) => writer.write_f32(*v),
        TagValue::Double(v) => writer.write_f64(*v),
        TagValue::ByteArray(items) => {
            writer.write_i32(checked_len(items.len())?)?;
            let bytes: Vec<u8> = items.iter().map(|&b| b as u8).collect();
            writer.write_bytes(&bytes)
        }
        TagValue::String(bytes) => {
            writer.write_u16(checked_len(bytes.len())? as u16)?;
            writer.write_bytes(bytes)
        }
        TagValue::List { element_kind, items } => write_list(writer, *element_kind, items),
        TagValue::Compound(children) => {
            for child in children {
                write_named_tag(writer, child)?;
            }
            writer.write_u8(NBTKind::End.wire_code())
        }
        TagValue::IntArray(items) => {
            writer.write_i32(checked_len(items.len())?)?;
            for &item in items {
                writer.write_i32(item)?;
            }
            Ok(())
        }
        TagValue::LongArray(items) => {
            writer.write_i32(checked_len(items.len())?)?;
            for &item in items {
                writer.write_i64(item)?;
            }
            Ok(())
        }
    }
}

fn write_list<W: io::Write>(
    writer: &mut Writer<W>,
    element_kind: NBTKind,
    items: &[Tag],
) -> NbtResult<()> {
    writer.write_u8(element_kind.wire_code())?;
    // Only elements whose runtime type matches the declared element-type are
    // kept (source behaviour, retained deliberately per DESIGN.md).
    let matching: Vec<&Tag> = items.iter().filter(|t| t.kind() == element_kind).collect();
    writer.write_i32(checked_len(matching.len())?)?;
    for item in matching {
        write_payload(writer, &item.value)?;
    }
    Ok(())
}
