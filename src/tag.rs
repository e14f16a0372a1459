use std::borrow::Cow;

use crate::kind::NBTKind;

/// A named tag: the unit of the NBT tree. Compound children and list
/// elements are both represented as `Tag` — list elements simply carry an
/// empty name, since the wire format never names them.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: Vec<u8>,
    pub value: TagValue,
}

/// The twelve-way tagged union of §3. Modeled as a sum type rather than a
/// base class with twelve subclasses so that every match over it is checked
/// exhaustively at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    /// Stored as raw bytes, not `String`: the wire format's modified-UTF-8
    /// strings are never validated by this engine (see DESIGN.md).
    String(Vec<u8>),
    List {
        element_kind: NBTKind,
        items: Vec<Tag>,
    },
    /// Insertion-ordered, duplicate-name-tolerant children (invariant ii).
    Compound(Vec<Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn new(name: impl Into<Vec<u8>>, value: TagValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Zero-value constructor matching `create_empty_tag`: string becomes
    /// empty, list becomes `element_kind = End`, arrays become length 0,
    /// numeric variants become zero.
    pub fn empty(kind: NBTKind, name: impl Into<Vec<u8>>) -> Self {
        let value = match kind {
            NBTKind::End => panic!("TAG_End has no tag instance"),
            NBTKind::Byte => TagValue::Byte(0),
            NBTKind::Short => TagValue::Short(0),
            NBTKind::Int => TagValue::Int(0),
            NBTKind::Long => TagValue::Long(0),
            NBTKind::Float => TagValue::Float(0.0),
            NBTKind::Double => TagValue::Double(0.0),
            NBTKind::ByteArray => TagValue::ByteArray(Vec::new()),
            NBTKind::String => TagValue::String(Vec::new()),
            NBTKind::List => TagValue::List {
                element_kind: NBTKind::End,
                items: Vec::new(),
            },
            NBTKind::Compound => TagValue::Compound(Vec::new()),
            NBTKind::IntArray => TagValue::IntArray(Vec::new()),
            NBTKind::LongArray => TagValue::LongArray(Vec::new()),
        };
        Self::new(name, value)
    }

    pub fn kind(&self) -> NBTKind {
        match &self.value {
            TagValue::Byte(_) => NBTKind::Byte,
            TagValue::Short(_) => NBTKind::Short,
            TagValue::Int(_) => NBTKind::Int,
            TagValue::Long(_) => NBTKind::Long,
            TagValue::Float(_) => NBTKind::Float,
            TagValue::Double(_) => NBTKind::Double,
            TagValue::ByteArray(_) => NBTKind::ByteArray,
            TagValue::String(_) => NBTKind::String,
            TagValue::List { .. } => NBTKind::List,
            TagValue::Compound(_) => NBTKind::Compound,
            TagValue::IntArray(_) => NBTKind::IntArray,
            TagValue::LongArray(_) => NBTKind::LongArray,
        }
    }

    pub fn name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn as_compound(&self) -> Option<&[Tag]> {
        match &self.value {
            TagValue::Compound(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Vec<Tag>> {
        match &mut self.value {
            TagValue::Compound(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<(NBTKind, &[Tag])> {
        match &self.value {
            TagValue::List { element_kind, items } => Some((*element_kind, items)),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<(&mut NBTKind, &mut Vec<Tag>)> {
        match &mut self.value {
            TagValue::List { element_kind, items } => Some((element_kind, items)),
            _ => None,
        }
    }

    /// Linear scan for the first child with the given name (invariant ii's
    /// first-match rule). Returns its index.
    pub fn find_child_index(&self, name: &[u8]) -> Option<usize> {
        self.as_compound()?
            .iter()
            .position(|child| child.name == name)
    }

    /// Indexed access into whichever child vector this tag holds (compound
    /// children or list elements) — the path resolver walks both uniformly.
    pub fn child(&self, index: usize) -> Option<&Tag> {
        match &self.value {
            TagValue::Compound(items) => items.get(index),
            TagValue::List { items, .. } => items.get(index),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Tag> {
        match &mut self.value {
            TagValue::Compound(items) => items.get_mut(index),
            TagValue::List { items, .. } => items.get_mut(index),
            _ => None,
        }
    }

    pub fn children_len(&self) -> Option<usize> {
        match &self.value {
            TagValue::Compound(items) => Some(items.len()),
            TagValue::List { items, .. } => Some(items.len()),
            _ => None,
        }
    }
}
