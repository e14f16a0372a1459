//! Structural Mutator (§4.7): edit / set-or-create / delete against resolved
//! path targets. The path/value stages are grounded directly on
//! `edit_path.c`/`edit_value.c`; the three-operation driver itself (Edit
//! falling back to the set-or-create resolver on `PATH_NOT_FOUND`, and the
//! descending-index delete ordering) follows this crate's own §4.7 design,
//! since the retrieved original sources expose the resolver/value library
//! but not a standalone driver function for it.

use log::{error, warn};
use serde_json::Value as Json;

use crate::error::{EditError, EditResult};
use crate::path::{self, PathTarget};
use crate::tag::{Tag, TagValue};
use crate::value;

fn apply_to_node(root: &mut Tag, target: &PathTarget, value_expr: &str) -> EditResult<()> {
    match target {
        PathTarget::Root => value::apply_value_expr(root, value_expr),
        PathTarget::Tag { parent_path, index } => {
            let parent = path::walk_mut(root, parent_path);
            let child = parent
                .child_mut(*index)
                .expect("resolver-produced Tag target must stay valid");
            value::apply_value_expr(child, value_expr)
        }
        PathTarget::ListElement { container_path, index } => {
            let list = path::walk_mut(root, container_path);
            value::apply_value_to_list_element(list, *index, value_expr)
        }
        PathTarget::ByteArrayElement { container_path, index }
        | PathTarget::IntArrayElement { container_path, index }
        | PathTarget::LongArrayElement { container_path, index } => {
            let array = path::walk_mut(root, container_path);
            value::apply_value_to_array_element(array, *index, value_expr)
        }
    }
}

/// Resolves `path` (possibly to several targets) and applies `value_expr` to
/// each in resolution order. All targets must succeed; on the first failure
/// the edits already applied to earlier targets remain (§4.7's acknowledged
/// non-atomic design).
pub fn edit(root: &mut Tag, path_str: &str, value_expr: &str) -> EditResult<()> {
    let targets = path::resolve_edit_paths(root, path_str)?;
    for (done, target) in targets.iter().enumerate() {
        if let Err(err) = apply_to_node(root, target, value_expr) {
            if done > 0 {
                warn!(
                    "path '{}': {} of {} targets already edited before this failure; earlier edits are not rolled back",
                    path_str,
                    done,
                    targets.len()
                );
            }
            error!("path '{}': edit failed: {}", path_str, err);
            return Err(err);
        }
    }
    Ok(())
}

/// Edit-or-create: tries `edit` first; if the sole failure is
/// `PATH_NOT_FOUND`, falls back to the restricted set-or-create resolver and
/// either edits the existing child or builds a fresh tag inferred from the
/// JSON expression.
pub fn set_or_create(root: &mut Tag, path_str: &str, value_expr: &str) -> EditResult<()> {
    match edit(root, path_str, value_expr) {
        Ok(()) => Ok(()),
        Err(EditError::PathNotFound(_)) => {
            let (parent_path, key) = path::resolve_set_parent_and_key(root, path_str)?;
            let parent = path::walk_mut(root, &parent_path);
            let children = parent
                .as_compound_mut()
                .expect("resolve_set_parent_and_key guarantees a compound parent");

            if let Some(existing) = children.iter_mut().find(|c| c.name == key) {
                value::apply_value_expr(existing, value_expr)
            } else {
                let json: Json = serde_json::from_str(value_expr)
                    .map_err(|e| EditError::InvalidJson(format!("invalid JSON: {}", e)))?;
                let new_tag = value::build_tag_from_json(key, &json, value_expr)?;
                children.push(new_tag);
                Ok(())
            }
        }
        Err(other) => Err(other),
    }
}

fn sort_key(target: &PathTarget) -> (Vec<usize>, usize) {
    match target {
        PathTarget::Root => (Vec::new(), 0),
        PathTarget::Tag { parent_path, index } => (parent_path.clone(), *index),
        PathTarget::ListElement { container_path, index }
        | PathTarget::ByteArrayElement { container_path, index }
        | PathTarget::IntArrayElement { container_path, index }
        | PathTarget::LongArrayElement { container_path, index } => (container_path.clone(), *index),
    }
}

fn delete_one(root: &mut Tag, target: &PathTarget) {
    match target {
        PathTarget::Root => unreachable!("root targets are rejected before reaching delete_one"),
        PathTarget::Tag { parent_path, index } => {
            let parent = path::walk_mut(root, parent_path);
            let children = parent
                .as_compound_mut()
                .expect("resolver-produced Tag target's parent must be a compound");
            children.remove(*index);
        }
        PathTarget::ListElement { container_path, index } => {
            let list = path::walk_mut(root, container_path);
            let (_, items) = list
                .as_list_mut()
                .expect("resolver-produced ListElement target's container must be a list");
            items.remove(*index);
        }
        PathTarget::ByteArrayElement { container_path, index } => {
            if let TagValue::ByteArray(items) = &mut path::walk_mut(root, container_path).value {
                items.remove(*index);
            }
        }
        PathTarget::IntArrayElement { container_path, index } => {
            if let TagValue::IntArray(items) = &mut path::walk_mut(root, container_path).value {
                items.remove(*index);
            }
        }
        PathTarget::LongArrayElement { container_path, index } => {
            if let TagValue::LongArray(items) = &mut path::walk_mut(root, container_path).value {
                items.remove(*index);
            }
        }
    }
}

/// Deletes every tag/element `path` resolves to. Root deletion is
/// `UNSUPPORTED`. Targets sharing a container are removed highest-index
/// first so earlier removals never invalidate a later target's index.
pub fn delete(root: &mut Tag, path_str: &str) -> EditResult<()> {
    let mut targets = path::resolve_edit_paths(root, path_str)?;

    if targets.iter().any(|t| matches!(t, PathTarget::Root)) {
        return Err(EditError::Unsupported("deleting the document root is not supported".into()));
    }

    targets.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    for target in &targets {
        delete_one(root, target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NBTKind;

    fn sample() -> Tag {
        Tag::new(
            "root",
            TagValue::Compound(vec![
                Tag::new("Age", TagValue::Short(10)),
                Tag::new(
                    "Inventory",
                    TagValue::List {
                        element_kind: NBTKind::Compound,
                        items: vec![
                            Tag::new("", TagValue::Compound(vec![Tag::new("id", TagValue::Int(1))])),
                            Tag::new("", TagValue::Compound(vec![Tag::new("id", TagValue::Int(2))])),
                            Tag::new("", TagValue::Compound(vec![Tag::new("id", TagValue::Int(3))])),
                        ],
                    },
                ),
            ]),
        )
    }

    #[test]
    fn edit_updates_existing_scalar() {
        let mut root = sample();
        edit(&mut root, "Age", "99").unwrap();
        assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Short(99));
    }

    #[test]
    fn edit_wildcard_updates_every_match() {
        let mut root = sample();
        edit(&mut root, "Inventory[*]/id", "0").unwrap();
        let (_, items) = root.as_compound().unwrap()[1].as_list().unwrap();
        for item in items {
            assert_eq!(item.as_compound().unwrap()[0].value, TagValue::Int(0));
        }
    }

    #[test]
    fn set_or_create_edits_existing_key() {
        let mut root = sample();
        set_or_create(&mut root, "Age", "5").unwrap();
        assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Short(5));
    }

    #[test]
    fn set_or_create_adds_missing_key() {
        let mut root = sample();
        set_or_create(&mut root, "Score", "7").unwrap();
        let children = root.as_compound().unwrap();
        let score = children.iter().find(|c| c.name == b"Score").unwrap();
        assert_eq!(score.value, TagValue::Int(7));
    }

    #[test]
    fn set_or_create_infers_compound_for_nested_object() {
        let mut root = sample();
        set_or_create(&mut root, "Pos", r#"{"x": 1, "y": 2}"#).unwrap();
        let children = root.as_compound().unwrap();
        let pos = children.iter().find(|c| c.name == b"Pos").unwrap();
        assert_eq!(pos.kind(), NBTKind::Compound);
    }

    #[test]
    fn delete_single_key_removes_it() {
        let mut root = sample();
        delete(&mut root, "Age").unwrap();
        assert!(root.as_compound().unwrap().iter().all(|c| c.name != b"Age"));
    }

    #[test]
    fn delete_wildcard_removes_descending_index_safely() {
        let mut root = sample();
        delete(&mut root, "Inventory[*]").unwrap();
        let (_, items) = root.as_compound().unwrap()[1].as_list().unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn delete_root_is_unsupported() {
        let mut root = sample();
        assert!(matches!(delete(&mut root, ""), Err(EditError::Unsupported(_))));
    }
}
