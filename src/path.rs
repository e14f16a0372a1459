//! Path Resolver (§4.5): parses a `/`-separated path expression and resolves
//! it against a tag tree. Grounded on `edit_path.c`'s `parse_path_segments`,
//! `resolve_edit_paths` and `resolve_set_parent_and_key`, translated from a
//! parent-pointer cursor list into index paths from the root — Rust's borrow
//! checker won't let a resolve pass stash `&mut Tag` pointers for a later
//! mutate pass, so targets are addressed by index chain and re-walked.

use log::debug;

use crate::error::{EditError, EditResult};
use crate::tag::{Tag, TagValue};

const MAX_SEGMENTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexMode {
    None,
    Exact(usize),
    Wildcard,
}

#[derive(Debug, Clone)]
struct Segment {
    key: Option<Vec<u8>>,
    index: IndexMode,
}

/// A single resolved location in the tree, addressed by an index path from
/// the root plus a discriminant for what kind of slot it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    /// The whole document root.
    Root,
    /// A named tag, identified by its parent compound and index within it.
    Tag { parent_path: Vec<usize>, index: usize },
    ListElement { container_path: Vec<usize>, index: usize },
    ByteArrayElement { container_path: Vec<usize>, index: usize },
    IntArrayElement { container_path: Vec<usize>, index: usize },
    LongArrayElement { container_path: Vec<usize>, index: usize },
}

/// Walks an index path from `root`, where each step descends into the child
/// at that index (compound children and list elements share one addressing
/// scheme — see `Tag::child`).
pub fn walk<'a>(root: &'a Tag, path: &[usize]) -> &'a Tag {
    let mut current = root;
    for &idx in path {
        current = current
            .child(idx)
            .expect("path index produced by the resolver must stay valid");
    }
    current
}

pub fn walk_mut<'a>(root: &'a mut Tag, path: &[usize]) -> &'a mut Tag {
    let mut current = root;
    for &idx in path {
        current = current
            .child_mut(idx)
            .expect("path index produced by the resolver must stay valid");
    }
    current
}

fn split_segments(path: &str) -> EditResult<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    for ch in path.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                escape = true;
            }
            '"' => {
                current.push(ch);
                in_quotes = !in_quotes;
            }
            '/' if !in_quotes => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if in_quotes {
        return Err(EditError::PathSyntax("unterminated quoted key in path".into()));
    }
    segments.push(current);
    if segments.len() > MAX_SEGMENTS {
        return Err(EditError::PathSyntax("path has too many segments".into()));
    }
    // A leading '/' or a doubled '/' produces an empty segment; drop it
    // rather than treat it as a zero-length bare key.
    Ok(segments.into_iter().filter(|s| !s.is_empty()).collect())
}

fn decode_quoted_key(raw: &str) -> EditResult<(Vec<u8>, &str)> {
    let bytes = raw.as_bytes();
    let mut out = Vec::new();
    let mut i = 1;
    loop {
        if i >= bytes.len() {
            return Err(EditError::PathSyntax("unterminated quoted key".into()));
        }
        let c = bytes[i];
        if c == b'"' {
            i += 1;
            break;
        }
        if c == b'\\' {
            i += 1;
            if i >= bytes.len() {
                return Err(EditError::PathSyntax("unterminated escape in quoted key".into()));
            }
            let decoded = match bytes[i] {
                b'"' => b'"',
                b'\\' => b'\\',
                b'/' => b'/',
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                other => {
                    return Err(EditError::PathSyntax(format!(
                        "invalid escape '\\{}' in quoted key",
                        other as char
                    )))
                }
            };
            out.push(decoded);
            i += 1;
        } else {
            out.push(c);
            i += 1;
        }
    }
    Ok((out, &raw[i..]))
}

fn parse_index_suffix(rest: &str) -> EditResult<IndexMode> {
    if rest.is_empty() {
        return Ok(IndexMode::None);
    }
    if !rest.starts_with('[') || !rest.ends_with(']') {
        return Err(EditError::PathSyntax(format!(
            "malformed index suffix '{}'",
            rest
        )));
    }
    let inner = &rest[1..rest.len() - 1];
    if inner.contains('[') || inner.contains(']') {
        return Err(EditError::PathSyntax("nested brackets in path segment".into()));
    }
    if inner == "*" {
        return Ok(IndexMode::Wildcard);
    }
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EditError::PathSyntax(format!("invalid index '{}'", inner)));
    }
    inner
        .parse::<usize>()
        .map(IndexMode::Exact)
        .map_err(|_| EditError::PathSyntax(format!("index '{}' out of range", inner)))
}

fn parse_segment(raw: &str) -> EditResult<Segment> {
    let bytes = raw.as_bytes();
    if bytes.is_empty() {
        return Err(EditError::PathSyntax("empty path segment".into()));
    }
    if bytes[0] == b'"' {
        let (key, rest) = decode_quoted_key(raw)?;
        let index = parse_index_suffix(rest)?;
        return Ok(Segment { key: Some(key), index });
    }
    let bracket_pos = raw.find('[');
    let (key_part, rest) = match bracket_pos {
        Some(pos) => (&raw[..pos], &raw[pos..]),
        None => (raw, ""),
    };
    if key_part.is_empty() {
        let index = parse_index_suffix(rest)?;
        if index == IndexMode::None {
            return Err(EditError::PathSyntax("empty path segment".into()));
        }
        return Ok(Segment { key: None, index });
    }
    if key_part.contains('"') || key_part.contains(']') {
        return Err(EditError::PathSyntax(format!(
            "invalid character in key '{}'",
            key_part
        )));
    }
    let index = parse_index_suffix(rest)?;
    Ok(Segment {
        key: Some(key_part.as_bytes().to_vec()),
        index,
    })
}

fn parse_segments(path: &str) -> EditResult<Vec<Segment>> {
    split_segments(path)?.iter().map(|s| parse_segment(s)).collect()
}

fn is_root_alias(segment: &Segment, root_name: &[u8]) -> bool {
    !root_name.is_empty() && segment.index == IndexMode::None && segment.key.as_deref() == Some(root_name)
}

fn resolve_indices(mode: IndexMode, len: usize, saw_index_bounds: &mut bool) -> Vec<usize> {
    match mode {
        IndexMode::Exact(i) => {
            if i >= len {
                *saw_index_bounds = true;
                Vec::new()
            } else {
                vec![i]
            }
        }
        IndexMode::Wildcard => (0..len).collect(),
        IndexMode::None => Vec::new(),
    }
}

/// Resolves `path_str` against `root`, returning every matching target
/// (wildcard segments multiply the result set). Breadth-first: all cursors
/// advance through one segment before any advances through the next.
pub fn resolve_edit_paths(root: &Tag, path_str: &str) -> EditResult<Vec<PathTarget>> {
    let segments = parse_segments(path_str)?;

    let mut start = 0;
    if !segments.is_empty() && is_root_alias(&segments[0], &root.name) {
        start = 1;
    }

    if start == segments.len() {
        return Ok(vec![PathTarget::Root]);
    }

    let remaining = &segments[start..];
    let mut cursors: Vec<Vec<usize>> = vec![Vec::new()];
    let mut targets = Vec::new();
    let mut saw_index_bounds = false;
    let mut saw_type_mismatch = false;

    for (seg_pos, seg) in remaining.iter().enumerate() {
        let is_last = seg_pos == remaining.len() - 1;
        let mut next_cursors = Vec::new();

        for cursor_path in &cursors {
            let current = walk(root, cursor_path);

            let node_path: Vec<usize> = if let Some(key) = &seg.key {
                match &current.value {
                    TagValue::Compound(children) => {
                        match children.iter().position(|c| &c.name == key) {
                            Some(idx) => {
                                let mut p = cursor_path.clone();
                                p.push(idx);
                                p
                            }
                            None => continue,
                        }
                    }
                    _ => {
                        saw_type_mismatch = true;
                        continue;
                    }
                }
            } else {
                cursor_path.clone()
            };

            let node = walk(root, &node_path);

            match seg.index {
                IndexMode::None => {
                    if is_last {
                        let mut parent_path = node_path.clone();
                        let idx = parent_path.pop().expect(
                            "a keyless, indexless segment is rejected by the parser",
                        );
                        targets.push(PathTarget::Tag { parent_path, index: idx });
                    } else {
                        next_cursors.push(node_path);
                    }
                }
                IndexMode::Exact(_) | IndexMode::Wildcard => match &node.value {
                    TagValue::List { items, .. } => {
                        for i in resolve_indices(seg.index, items.len(), &mut saw_index_bounds) {
                            if is_last {
                                targets.push(PathTarget::ListElement {
                                    container_path: node_path.clone(),
                                    index: i,
                                });
                            } else {
                                let mut p = node_path.clone();
                                p.push(i);
                                next_cursors.push(p);
                            }
                        }
                    }
                    TagValue::ByteArray(items) if is_last => {
                        for i in resolve_indices(seg.index, items.len(), &mut saw_index_bounds) {
                            targets.push(PathTarget::ByteArrayElement {
                                container_path: node_path.clone(),
                                index: i,
                            });
                        }
                    }
                    TagValue::IntArray(items) if is_last => {
                        for i in resolve_indices(seg.index, items.len(), &mut saw_index_bounds) {
                            targets.push(PathTarget::IntArrayElement {
                                container_path: node_path.clone(),
                                index: i,
                            });
                        }
                    }
                    TagValue::LongArray(items) if is_last => {
                        for i in resolve_indices(seg.index, items.len(), &mut saw_index_bounds) {
                            targets.push(PathTarget::LongArrayElement {
                                container_path: node_path.clone(),
                                index: i,
                            });
                        }
                    }
                    _ => saw_type_mismatch = true,
                },
            }
        }

        cursors = next_cursors;
    }

    if targets.is_empty() {
        if saw_index_bounds {
            return Err(EditError::IndexBounds(format!(
                "path '{}': index out of bounds",
                path_str
            )));
        }
        if saw_type_mismatch {
            return Err(EditError::TypeMismatch(format!(
                "path '{}': segment applied to an incompatible tag type",
                path_str
            )));
        }
        return Err(EditError::PathNotFound(format!(
            "path '{}': no tag matched",
            path_str
        )));
    }

    debug!("path '{}' resolved to {} target(s)", path_str, targets.len());
    Ok(targets)
}

/// Resolves `path_str` to exactly one target, failing with `UNSUPPORTED` if
/// it names zero or more than one (edit/delete operations are single-target).
pub fn resolve_edit_path(root: &Tag, path_str: &str) -> EditResult<PathTarget> {
    let mut targets = resolve_edit_paths(root, path_str)?;
    if targets.len() != 1 {
        return Err(EditError::Unsupported(format!(
            "path '{}' resolves to {} targets, expected exactly one",
            path_str,
            targets.len()
        )));
    }
    Ok(targets.remove(0))
}

/// Restricted resolver for set-or-create: walks compound children and exact
/// (non-wildcard) list indices up to the last segment, which must be a bare
/// key. Returns the parent's index path and the final key to set.
pub fn resolve_set_parent_and_key(root: &Tag, path_str: &str) -> EditResult<(Vec<usize>, Vec<u8>)> {
    let segments = parse_segments(path_str)?;

    let mut start = 0;
    if !segments.is_empty() && is_root_alias(&segments[0], &root.name) {
        start = 1;
    }

    let remaining = &segments[start..];
    let (last, head) = remaining
        .split_last()
        .ok_or_else(|| EditError::Unsupported("set-create path must end with a key".into()))?;

    if last.index != IndexMode::None {
        return Err(EditError::Unsupported(
            "set-create path must end with a bare key, not an index".into(),
        ));
    }
    let final_key = last
        .key
        .clone()
        .ok_or_else(|| EditError::Unsupported("set-create path must end with a key".into()))?;

    let mut current_path: Vec<usize> = Vec::new();
    for seg in head {
        let current = walk(root, &current_path);

        let node_path = if let Some(key) = &seg.key {
            match &current.value {
                TagValue::Compound(children) => match children.iter().position(|c| &c.name == key) {
                    Some(idx) => {
                        let mut p = current_path.clone();
                        p.push(idx);
                        p
                    }
                    None => {
                        return Err(EditError::PathNotFound(format!(
                            "path '{}': no child named '{}'",
                            path_str,
                            String::from_utf8_lossy(key)
                        )))
                    }
                },
                _ => {
                    return Err(EditError::TypeMismatch(format!(
                        "path '{}': segment applied to a non-compound tag",
                        path_str
                    )))
                }
            }
        } else {
            current_path.clone()
        };

        let node = walk(root, &node_path);
        current_path = match seg.index {
            IndexMode::None => node_path,
            IndexMode::Wildcard => {
                return Err(EditError::Unsupported(
                    "wildcard index is not allowed in a set-create path".into(),
                ))
            }
            IndexMode::Exact(i) => match &node.value {
                TagValue::List { items, .. } => {
                    if i >= items.len() {
                        return Err(EditError::IndexBounds(format!(
                            "path '{}': index {} out of bounds",
                            path_str, i
                        )));
                    }
                    let mut p = node_path.clone();
                    p.push(i);
                    p
                }
                _ => {
                    return Err(EditError::TypeMismatch(format!(
                        "path '{}': index applied to a non-list tag",
                        path_str
                    )))
                }
            },
        };
    }

    let parent = walk(root, &current_path);
    if parent.as_compound().is_none() {
        return Err(EditError::TypeMismatch(format!(
            "path '{}': set-create parent is not a compound",
            path_str
        )));
    }

    Ok((current_path, final_key))
}
