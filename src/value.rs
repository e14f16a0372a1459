//! Value Engine (§4.6): coerces a JSON value expression into a typed tag
//! mutation. Grounded on `edit_value.c`'s `parse_token_into_tag` /
//! `apply_object_patch_token` / `apply_legacy_scalar_edit`, with
//! `serde_json::Value` standing in for the source's hand-rolled `jsmn`
//! tokenizer.

use serde_json::Value as Json;

use crate::error::{EditError, EditResult};
use crate::kind::NBTKind;
use crate::tag::{Tag, TagValue};

fn numeric_range_err(kind: &str) -> EditError {
    EditError::NumericRange(format!("value does not fit in {}", kind))
}

/// Decides integer-vs-fractional the way `edit_value.c:256` does: lexically,
/// from the literal text (`strchr(text,'.')||strchr(text,'e')||strchr(text,'E')`),
/// not from how `serde_json` happened to store the value. A plain digit-only
/// literal that overflows both `i64` and `u64` is still stored as `f64` by
/// `serde_json`, but it must fall through to `NUMERIC_RANGE`, not
/// `TYPE_MISMATCH` (mirrors `strtoll`'s `ERANGE` handling at
/// `edit_value.c:263-267`).
fn json_number_to_i64(n: &serde_json::Number, raw: &str, min: i64, max: i64) -> EditResult<i64> {
    if raw.contains(['.', 'e', 'E']) {
        return Err(EditError::TypeMismatch(
            "type mismatch: expected integer number".into(),
        ));
    }
    let v = n
        .as_i64()
        .ok_or_else(|| numeric_range_err("the requested integer width"))?;
    if v < min || v > max {
        return Err(numeric_range_err("the requested integer width"));
    }
    Ok(v)
}

fn json_number_to_f64(n: &serde_json::Number) -> EditResult<f64> {
    let v = n
        .as_f64()
        .ok_or_else(|| EditError::NumericRange("value is not a finite number".into()))?;
    if !v.is_finite() {
        return Err(EditError::NumericRange("value is not finite".into()));
    }
    Ok(v)
}

/// Raw (still-escaped) string and number literal spans from the source JSON
/// text, in the order they appear, so a tree walk over an already-parsed
/// `serde_json::Value` can recover the exact text each leaf came from.
/// `serde_json::Value` only hands back fully decoded Rust values, which
/// erases the distinction `decode_json_string` needs between a literal
/// UTF-8 byte and one produced by a `\uXXXX` escape; `Cargo.toml` enables
/// `serde_json`'s `preserve_order` feature so object-key iteration matches
/// this same source order.
struct RawLiteralCursor<'a> {
    strings: Vec<&'a str>,
    numbers: Vec<&'a str>,
    str_next: usize,
    num_next: usize,
}

impl<'a> RawLiteralCursor<'a> {
    fn new(source: &'a str) -> Self {
        let bytes = source.as_bytes();
        let mut strings = Vec::new();
        let mut numbers = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    let start = i + 1;
                    let mut j = start;
                    while j < bytes.len() {
                        match bytes[j] {
                            b'\\' => j += 2,
                            b'"' => break,
                            _ => j += 1,
                        }
                    }
                    let end = j.min(bytes.len());
                    strings.push(&source[start..end]);
                    i = end + 1;
                }
                b'-' | b'0'..=b'9' => {
                    let start = i;
                    let mut j = i;
                    if bytes[j] == b'-' {
                        j += 1;
                    }
                    while j < bytes.len() && bytes[j].is_ascii_digit() {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j] == b'.' {
                        j += 1;
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                    }
                    if j < bytes.len() && (bytes[j] == b'e' || bytes[j] == b'E') {
                        j += 1;
                        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                            j += 1;
                        }
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                    }
                    numbers.push(&source[start..j]);
                    i = j;
                }
                _ => i += 1,
            }
        }
        Self {
            strings,
            numbers,
            str_next: 0,
            num_next: 0,
        }
    }

    fn take_string(&mut self) -> &'a str {
        let s = self.strings.get(self.str_next).copied().unwrap_or("");
        self.str_next += 1;
        s
    }

    fn take_number(&mut self) -> &'a str {
        let s = self.numbers.get(self.num_next).copied().unwrap_or("");
        self.num_next += 1;
        s
    }
}

/// Decodes one `\uXXXX` escape starting right after the `\u`, handling
/// surrogate pairs. Returns the codepoint and how many bytes of `rest` it
/// consumed.
fn decode_unicode_escape(rest: &str) -> EditResult<(u32, usize)> {
    let hex = rest
        .get(..4)
        .ok_or_else(|| EditError::InvalidJson("truncated \\u escape".into()))?;
    let unit = u16::from_str_radix(hex, 16)
        .map_err(|_| EditError::InvalidJson("invalid \\u escape".into()))?;

    if (0xD800..=0xDBFF).contains(&unit) {
        if rest.get(4..6) == Some("\\u") {
            if let Some(hex2) = rest.get(6..10) {
                if let Ok(unit2) = u16::from_str_radix(hex2, 16) {
                    if (0xDC00..=0xDFFF).contains(&unit2) {
                        let cp = 0x10000 + ((unit as u32 - 0xD800) << 10) + (unit2 as u32 - 0xDC00);
                        return Ok((cp, 10));
                    }
                }
            }
        }
        return Ok((unit as u32, 4));
    }
    Ok((unit as u32, 4))
}

/// Decodes one raw (still-escaped) JSON string literal body into bytes,
/// mirroring `edit_value.c:125-136`/`edit_value.c:178`: any byte that isn't
/// part of a backslash escape is copied verbatim, preserving literal UTF-8
/// text unchanged, and only a decoded `\uXXXX` codepoint collapses to `?`
/// when it falls outside ASCII.
fn decode_json_string_literal(raw: &str) -> EditResult<Vec<u8>> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        i += 1;
        let esc = *bytes
            .get(i)
            .ok_or_else(|| EditError::InvalidJson("truncated escape sequence".into()))?;
        match esc {
            b'"' => {
                out.push(b'"');
                i += 1;
            }
            b'\\' => {
                out.push(b'\\');
                i += 1;
            }
            b'/' => {
                out.push(b'/');
                i += 1;
            }
            b'b' => {
                out.push(0x08);
                i += 1;
            }
            b'f' => {
                out.push(0x0C);
                i += 1;
            }
            b'n' => {
                out.push(b'\n');
                i += 1;
            }
            b'r' => {
                out.push(b'\r');
                i += 1;
            }
            b't' => {
                out.push(b'\t');
                i += 1;
            }
            b'u' => {
                i += 1;
                let (cp, consumed) = decode_unicode_escape(&raw[i..])?;
                i += consumed;
                if cp <= 0x7F {
                    out.push(cp as u8);
                } else {
                    out.push(b'?');
                }
            }
            other => {
                return Err(EditError::InvalidJson(format!(
                    "invalid escape '\\{}'",
                    other as char
                )))
            }
        }
    }
    Ok(out)
}

fn parse_legacy_int64(text: &str, min: i64, max: i64) -> EditResult<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(['.', 'e', 'E']) {
        return Err(EditError::TypeMismatch("invalid numeric value".into()));
    }
    let v: i64 = trimmed
        .parse()
        .map_err(|_| EditError::NumericRange("numeric overflow".into()))?;
    if v < min || v > max {
        return Err(EditError::NumericRange("numeric overflow".into()));
    }
    Ok(v)
}

fn parse_legacy_double(text: &str) -> EditResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EditError::TypeMismatch("invalid numeric value".into()));
    }
    let v: f64 = trimmed
        .parse()
        .map_err(|_| EditError::NumericRange("numeric overflow".into()))?;
    if !v.is_finite() {
        return Err(EditError::NumericRange("numeric overflow".into()));
    }
    Ok(v)
}

fn is_numeric_scalar(kind: NBTKind) -> bool {
    matches!(
        kind,
        NBTKind::Byte | NBTKind::Short | NBTKind::Int | NBTKind::Long | NBTKind::Float | NBTKind::Double
    )
}

fn apply_legacy_scalar(target: &mut Tag, text: &str) -> EditResult<()> {
    match target.kind() {
        NBTKind::Byte => {
            target.value = TagValue::Byte(parse_legacy_int64(text, -128, 127)? as i8);
        }
        NBTKind::Short => {
            target.value = TagValue::Short(parse_legacy_int64(text, -32768, 32767)? as i16);
        }
        NBTKind::Int => {
            target.value = TagValue::Int(parse_legacy_int64(text, i32::MIN as i64, i32::MAX as i64)? as i32);
        }
        NBTKind::Long => {
            target.value = TagValue::Long(parse_legacy_int64(text, i64::MIN, i64::MAX)?);
        }
        NBTKind::Float => {
            let d = parse_legacy_double(text)?;
            if d < f32::MIN as f64 || d > f32::MAX as f64 {
                return Err(numeric_range_err("f32"));
            }
            target.value = TagValue::Float(d as f32);
        }
        NBTKind::Double => {
            target.value = TagValue::Double(parse_legacy_double(text)?);
        }
        _ => return Err(EditError::TypeMismatch("legacy scalar parsing not supported for this type".into())),
    }
    Ok(())
}

/// Creates a fresh, zero-valued list/array element of `kind` (mirrors
/// `create_list_element`).
fn fresh_element(kind: NBTKind) -> EditResult<Tag> {
    if kind == NBTKind::End {
        return Err(EditError::Unsupported(
            "cannot infer element type for empty TAG_End list".into(),
        ));
    }
    Ok(Tag::empty(kind, Vec::new()))
}

/// Core dispatch: parses `json` into `target` according to `target`'s
/// current kind. Mirrors `parse_token_into_tag`. `cursor` supplies the raw
/// source text backing each string/number leaf, in the order this walk
/// visits them.
fn parse_json_into_tag(target: &mut Tag, json: &Json, cursor: &mut RawLiteralCursor<'_>) -> EditResult<()> {
    match target.kind() {
        NBTKind::Byte => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            let raw = cursor.take_number();
            target.value = TagValue::Byte(json_number_to_i64(n, raw, -128, 127)? as i8);
            Ok(())
        }
        NBTKind::Short => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            let raw = cursor.take_number();
            target.value = TagValue::Short(json_number_to_i64(n, raw, -32768, 32767)? as i16);
            Ok(())
        }
        NBTKind::Int => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            let raw = cursor.take_number();
            target.value = TagValue::Int(json_number_to_i64(n, raw, i32::MIN as i64, i32::MAX as i64)? as i32);
            Ok(())
        }
        NBTKind::Long => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            let raw = cursor.take_number();
            target.value = TagValue::Long(json_number_to_i64(n, raw, i64::MIN, i64::MAX)?);
            Ok(())
        }
        NBTKind::Float => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            cursor.take_number();
            let d = json_number_to_f64(n)?;
            if d < f32::MIN as f64 || d > f32::MAX as f64 {
                return Err(numeric_range_err("f32"));
            }
            target.value = TagValue::Float(d as f32);
            Ok(())
        }
        NBTKind::Double => {
            let n = json.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
            cursor.take_number();
            target.value = TagValue::Double(json_number_to_f64(n)?);
            Ok(())
        }
        NBTKind::String => {
            json.as_str().ok_or_else(|| EditError::TypeMismatch("expected JSON string".into()))?;
            target.value = TagValue::String(decode_json_string_literal(cursor.take_string())?);
            Ok(())
        }
        NBTKind::ByteArray => {
            let arr = json.as_array().ok_or_else(|| EditError::TypeMismatch("expected JSON array".into()))?;
            let mut data = Vec::with_capacity(arr.len());
            for elem in arr {
                let n = elem.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
                let raw = cursor.take_number();
                data.push(json_number_to_i64(n, raw, -128, 127)? as i8);
            }
            target.value = TagValue::ByteArray(data);
            Ok(())
        }
        NBTKind::IntArray => {
            let arr = json.as_array().ok_or_else(|| EditError::TypeMismatch("expected JSON array".into()))?;
            let mut data = Vec::with_capacity(arr.len());
            for elem in arr {
                let n = elem.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
                let raw = cursor.take_number();
                data.push(json_number_to_i64(n, raw, i32::MIN as i64, i32::MAX as i64)? as i32);
            }
            target.value = TagValue::IntArray(data);
            Ok(())
        }
        NBTKind::LongArray => {
            let arr = json.as_array().ok_or_else(|| EditError::TypeMismatch("expected JSON array".into()))?;
            let mut data = Vec::with_capacity(arr.len());
            for elem in arr {
                let n = elem.as_number().ok_or_else(|| EditError::TypeMismatch("expected JSON number".into()))?;
                let raw = cursor.take_number();
                data.push(json_number_to_i64(n, raw, i64::MIN, i64::MAX)?);
            }
            target.value = TagValue::LongArray(data);
            Ok(())
        }
        NBTKind::List => {
            let arr = json.as_array().ok_or_else(|| EditError::TypeMismatch("expected JSON array".into()))?;
            let element_kind = match &target.value {
                TagValue::List { element_kind, .. } => *element_kind,
                _ => unreachable!(),
            };
            if element_kind == NBTKind::End {
                return Err(EditError::Unsupported(
                    "cannot infer element type for empty TAG_End list".into(),
                ));
            }
            if element_kind == NBTKind::Compound || element_kind == NBTKind::List {
                return Err(EditError::Unsupported(
                    "whole replace for compound/list element lists is not supported".into(),
                ));
            }
            let mut items = Vec::with_capacity(arr.len());
            for elem_json in arr {
                let mut elem = fresh_element(element_kind)?;
                parse_json_into_tag(&mut elem, elem_json, cursor)?;
                items.push(elem);
            }
            target.value = TagValue::List { element_kind, items };
            Ok(())
        }
        NBTKind::Compound => apply_object_patch(target, json, cursor),
        NBTKind::End => Err(EditError::Unsupported("editing not supported for this tag type".into())),
    }
}

/// Patch semantics for a compound target: every JSON object key must match
/// an existing child name (§4.6's "unknown key → TYPE_MISMATCH").
fn apply_object_patch(compound: &mut Tag, json: &Json, cursor: &mut RawLiteralCursor<'_>) -> EditResult<()> {
    if compound.kind() != NBTKind::Compound {
        return Err(EditError::TypeMismatch("target is not a compound".into()));
    }
    let object = json
        .as_object()
        .ok_or_else(|| EditError::TypeMismatch("expected JSON object".into()))?;

    let children = compound.as_compound_mut().expect("checked kind == Compound above");
    for (key, value_json) in object {
        let key_bytes = key.as_bytes();
        cursor.take_string(); // the key's own literal precedes its value in source order
        let matched = children.iter_mut().find(|c| c.name == key_bytes);
        match matched {
            Some(child) => parse_json_into_tag(child, value_json, cursor)?,
            None => {
                return Err(EditError::TypeMismatch(format!(
                    "unknown compound key '{}' in patch",
                    key
                )))
            }
        }
    }
    Ok(())
}

/// Entry point for editing a single non-compound scalar/array/list tag from
/// a raw value expression: tries strict JSON first, then (for numeric
/// scalars only) falls back to a bare legacy literal.
pub fn apply_value_expr(target: &mut Tag, expr: &str) -> EditResult<()> {
    if target.kind() == NBTKind::Compound {
        let json: Json = serde_json::from_str(expr)
            .map_err(|e| EditError::InvalidJson(format!("invalid JSON: {}", e)))?;
        let mut cursor = RawLiteralCursor::new(expr);
        return apply_object_patch(target, &json, &mut cursor);
    }

    match serde_json::from_str::<Json>(expr) {
        Ok(json) => {
            let mut cursor = RawLiteralCursor::new(expr);
            parse_json_into_tag(target, &json, &mut cursor)
        }
        Err(parse_err) => {
            if is_numeric_scalar(target.kind()) {
                apply_legacy_scalar(target, expr)
            } else {
                Err(EditError::InvalidJson(format!("invalid JSON: {}", parse_err)))
            }
        }
    }
}

/// Edits a single list element by index, lazily recreating it if missing or
/// mistyped relative to the list's declared element type.
pub fn apply_value_to_list_element(list: &mut Tag, index: usize, expr: &str) -> EditResult<()> {
    let (element_kind, len) = match list.as_list() {
        Some((kind, items)) => (kind, items.len()),
        None => return Err(EditError::TypeMismatch("target is not a list".into())),
    };
    if index >= len {
        return Err(EditError::IndexBounds("index out of bounds".into()));
    }
    if element_kind == NBTKind::End {
        return Err(EditError::Unsupported(
            "cannot infer element type for empty TAG_End list".into(),
        ));
    }

    let (_, items) = list.as_list_mut().expect("checked kind == List above");
    if items[index].kind() != element_kind {
        items[index] = fresh_element(element_kind)?;
    }
    apply_value_expr(&mut items[index], expr)
}

/// Edits a single primitive array element via a scratch scalar tag of the
/// matching primitive kind, then stores the coerced primitive back.
pub fn apply_value_to_array_element(array: &mut Tag, index: usize, expr: &str) -> EditResult<()> {
    match &mut array.value {
        TagValue::ByteArray(items) => {
            if index >= items.len() {
                return Err(EditError::IndexBounds("index out of bounds".into()));
            }
            let mut scratch = Tag::new(Vec::new(), TagValue::Byte(items[index]));
            apply_value_expr(&mut scratch, expr)?;
            if let TagValue::Byte(v) = scratch.value {
                items[index] = v;
            }
            Ok(())
        }
        TagValue::IntArray(items) => {
            if index >= items.len() {
                return Err(EditError::IndexBounds("index out of bounds".into()));
            }
            let mut scratch = Tag::new(Vec::new(), TagValue::Int(items[index]));
            apply_value_expr(&mut scratch, expr)?;
            if let TagValue::Int(v) = scratch.value {
                items[index] = v;
            }
            Ok(())
        }
        TagValue::LongArray(items) => {
            if index >= items.len() {
                return Err(EditError::IndexBounds("index out of bounds".into()));
            }
            let mut scratch = Tag::new(Vec::new(), TagValue::Long(items[index]));
            apply_value_expr(&mut scratch, expr)?;
            if let TagValue::Long(v) = scratch.value {
                items[index] = v;
            }
            Ok(())
        }
        _ => Err(EditError::TypeMismatch("target is not an editable array".into())),
    }
}

/// Infers a brand-new tag's type and value from a JSON expression, for
/// set-or-create's "no existing child" branch (§4.6's construction rules).
/// `source` is the raw expression text `json` was parsed from, needed to
/// recover which string bytes came from a `\uXXXX` escape.
pub fn build_tag_from_json(name: impl Into<Vec<u8>>, json: &Json, source: &str) -> EditResult<Tag> {
    let mut cursor = RawLiteralCursor::new(source);
    build_tag_from_json_cursor(name, json, &mut cursor)
}

fn build_tag_from_json_cursor(
    name: impl Into<Vec<u8>>,
    json: &Json,
    cursor: &mut RawLiteralCursor<'_>,
) -> EditResult<Tag> {
    let value = infer_value(json, cursor)?;
    Ok(Tag::new(name, value))
}

fn infer_value(json: &Json, cursor: &mut RawLiteralCursor<'_>) -> EditResult<TagValue> {
    match json {
        Json::Null => Err(EditError::Unsupported("cannot infer tag type from json null".into())),
        Json::Bool(b) => Ok(TagValue::Byte(if *b { 1 } else { 0 })),
        Json::String(_) => Ok(TagValue::String(decode_json_string_literal(cursor.take_string())?)),
        Json::Number(n) => {
            if n.is_i64() || n.is_u64() {
                let v = n.as_i64().unwrap_or(i64::MAX);
                if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
                    Ok(TagValue::Int(v as i32))
                } else {
                    Ok(TagValue::Long(v))
                }
            } else {
                Ok(TagValue::Double(json_number_to_f64(n)?))
            }
        }
        Json::Array(items) => {
            if items.is_empty() {
                return Ok(TagValue::List {
                    element_kind: NBTKind::End,
                    items: Vec::new(),
                });
            }
            let first_value = infer_value(&items[0], cursor)?;
            let first_tag = Tag::new(Vec::new(), first_value);
            let element_kind = first_tag.kind();
            let mut built = Vec::with_capacity(items.len());
            built.push(first_tag);
            for item_json in &items[1..] {
                let value = infer_value(item_json, cursor)?;
                built.push(Tag::new(Vec::new(), value));
            }
            Ok(TagValue::List { element_kind, items: built })
        }
        Json::Object(map) => {
            let mut children = Vec::with_capacity(map.len());
            for (key, value_json) in map {
                cursor.take_string();
                children.push(build_tag_from_json_cursor(key.as_bytes().to_vec(), value_json, cursor)?);
            }
            Ok(TagValue::Compound(children))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_byte_from_json_number() {
        let mut tag = Tag::new("b", TagValue::Byte(0));
        apply_value_expr(&mut tag, "42").unwrap();
        assert_eq!(tag.value, TagValue::Byte(42));
    }

    #[test]
    fn byte_out_of_range_is_numeric_range_error() {
        let mut tag = Tag::new("b", TagValue::Byte(0));
        assert!(matches!(apply_value_expr(&mut tag, "200"), Err(EditError::NumericRange(_))));
    }

    #[test]
    fn legacy_scalar_fallback_accepts_bare_number() {
        let mut tag = Tag::new("i", TagValue::Int(0));
        // "1_000" is not valid JSON but parses as a legacy literal only if
        // bare; use a value JSON already rejects outright: a leading '+'.
        apply_value_expr(&mut tag, "  7  ").unwrap();
        assert_eq!(tag.value, TagValue::Int(7));
    }

    #[test]
    fn string_uses_decoded_escapes() {
        let mut tag = Tag::new("s", TagValue::String(Vec::new()));
        apply_value_expr(&mut tag, "\"a\\nb\"").unwrap();
        assert_eq!(tag.value, TagValue::String(b"a\nb".to_vec()));
    }

    #[test]
    fn compound_patch_rejects_unknown_key() {
        let mut tag = Tag::new(
            "c",
            TagValue::Compound(vec![Tag::new("known", TagValue::Int(1))]),
        );
        assert!(matches!(
            apply_value_expr(&mut tag, r#"{"missing": 1}"#),
            Err(EditError::TypeMismatch(_))
        ));
    }

    #[test]
    fn compound_patch_updates_existing_key_only() {
        let mut tag = Tag::new(
            "c",
            TagValue::Compound(vec![
                Tag::new("a", TagValue::Int(1)),
                Tag::new("b", TagValue::Int(2)),
            ]),
        );
        apply_value_expr(&mut tag, r#"{"a": 9}"#).unwrap();
        let children = tag.as_compound().unwrap();
        assert_eq!(children[0].value, TagValue::Int(9));
        assert_eq!(children[1].value, TagValue::Int(2));
    }

    #[test]
    fn list_whole_replace_rejects_compound_element_type() {
        let mut tag = Tag::new(
            "l",
            TagValue::List {
                element_kind: NBTKind::Compound,
                items: vec![],
            },
        );
        assert!(matches!(apply_value_expr(&mut tag, "[]"), Err(EditError::Unsupported(_))));
    }

    #[test]
    fn infers_int_for_small_integer() {
        let src = "5";
        let json: Json = serde_json::from_str(src).unwrap();
        let tag = build_tag_from_json("n", &json, src).unwrap();
        assert_eq!(tag.value, TagValue::Int(5));
    }

    #[test]
    fn infers_long_for_overflowing_integer() {
        let src = "5000000000";
        let json: Json = serde_json::from_str(src).unwrap();
        let tag = build_tag_from_json("n", &json, src).unwrap();
        assert_eq!(tag.value, TagValue::Long(5_000_000_000));
    }

    #[test]
    fn infers_compound_recursively() {
        let src = r#"{"a": 1, "b": "x"}"#;
        let json: Json = serde_json::from_str(src).unwrap();
        let tag = build_tag_from_json("c", &json, src).unwrap();
        assert_eq!(tag.kind(), NBTKind::Compound);
        assert_eq!(tag.as_compound().unwrap().len(), 2);
    }

    #[test]
    fn infer_rejects_null() {
        let src = "null";
        let json: Json = serde_json::from_str(src).unwrap();
        assert!(matches!(build_tag_from_json("n", &json, src), Err(EditError::Unsupported(_))));
    }

    #[test]
    fn literal_non_ascii_text_is_preserved_verbatim() {
        let mut tag = Tag::new("s", TagValue::String(Vec::new()));
        apply_value_expr(&mut tag, "\"café\"").unwrap();
        assert_eq!(tag.value, TagValue::String("café".as_bytes().to_vec()));
    }

    #[test]
    fn unicode_escape_outside_ascii_collapses_to_question_mark() {
        let mut tag = Tag::new("s", TagValue::String(Vec::new()));
        apply_value_expr(&mut tag, "\"\\u00e9\"").unwrap();
        assert_eq!(tag.value, TagValue::String(b"?".to_vec()));
    }

    #[test]
    fn literal_text_survives_inside_a_compound_patch() {
        let mut tag = Tag::new(
            "c",
            TagValue::Compound(vec![Tag::new("name", TagValue::String(Vec::new()))]),
        );
        apply_value_expr(&mut tag, r#"{"name": "café"}"#).unwrap();
        let children = tag.as_compound().unwrap();
        assert_eq!(children[0].value, TagValue::String("café".as_bytes().to_vec()));
    }

    #[test]
    fn digit_only_literal_overflowing_i64_and_u64_is_numeric_range_not_type_mismatch() {
        let mut tag = Tag::new("i", TagValue::Int(0));
        assert!(matches!(
            apply_value_expr(&mut tag, "99999999999999999999"),
            Err(EditError::NumericRange(_))
        ));
    }

    #[test]
    fn genuinely_fractional_literal_on_integer_target_is_type_mismatch() {
        let mut tag = Tag::new("i", TagValue::Int(0));
        assert!(matches!(apply_value_expr(&mut tag, "5.5"), Err(EditError::TypeMismatch(_))));
    }
}
