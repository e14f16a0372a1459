use nbted::{edit, set_or_create, delete, EditError, NBTKind, Tag, TagValue};

fn compound(children: Vec<Tag>) -> Tag {
    Tag::new("root", TagValue::Compound(children))
}

fn inventory_of_three() -> Tag {
    compound(vec![
        Tag::new("Age", TagValue::Short(10)),
        Tag::new(
            "Inventory",
            TagValue::List {
                element_kind: NBTKind::Compound,
                items: vec![
                    Tag::new("", TagValue::Compound(vec![Tag::new("Slot", TagValue::Byte(0))])),
                    Tag::new("", TagValue::Compound(vec![Tag::new("Slot", TagValue::Byte(0))])),
                    Tag::new("", TagValue::Compound(vec![Tag::new("Slot", TagValue::Byte(0))])),
                ],
            },
        ),
    ])
}

// S1: scalar edit.
#[test]
fn scalar_edit_updates_in_place() {
    let mut root = inventory_of_three();
    edit(&mut root, "Age", "42").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Short(42));

    let bytes = nbted::serialize_to_bytes(&root).unwrap();
    let (reparsed, _) = nbted::parse_document(&bytes).unwrap();
    assert_eq!(reparsed.as_compound().unwrap()[0].value, TagValue::Short(42));
}

// S2: single list element.
#[test]
fn list_element_edit_leaves_siblings_untouched() {
    let mut root = inventory_of_three();
    edit(&mut root, "Inventory[1]/Slot", "7").unwrap();

    let (_, items) = root.as_compound().unwrap()[1].as_list().unwrap();
    assert_eq!(items[0].as_compound().unwrap()[0].value, TagValue::Byte(0));
    assert_eq!(items[1].as_compound().unwrap()[0].value, TagValue::Byte(7));
    assert_eq!(items[2].as_compound().unwrap()[0].value, TagValue::Byte(0));
}

// S3: wildcard edit touches every element.
#[test]
fn wildcard_edit_touches_every_element() {
    let mut root = inventory_of_three();
    edit(&mut root, "Inventory[*]/Slot", "9").unwrap();

    let (_, items) = root.as_compound().unwrap()[1].as_list().unwrap();
    for item in items {
        assert_eq!(item.as_compound().unwrap()[0].value, TagValue::Byte(9));
    }
}

// S4: set creates a missing child without disturbing existing ones.
#[test]
fn set_creates_missing_child() {
    let mut root = compound(vec![Tag::new("A", TagValue::Int(1))]);
    set_or_create(&mut root, "B", "\"hello\"").unwrap();

    let children = root.as_compound().unwrap();
    assert_eq!(children[0].value, TagValue::Int(1));
    let b = children.iter().find(|c| c.name == b"B").unwrap();
    assert_eq!(b.value, TagValue::String(b"hello".to_vec()));
}

// Set idempotence (property 4): repeating a set has the same effect as once.
#[test]
fn set_is_idempotent() {
    let mut once = compound(vec![Tag::new("A", TagValue::Int(1))]);
    set_or_create(&mut once, "B", "3").unwrap();

    let mut twice = compound(vec![Tag::new("A", TagValue::Int(1))]);
    set_or_create(&mut twice, "B", "3").unwrap();
    set_or_create(&mut twice, "B", "3").unwrap();

    assert_eq!(once, twice);
}

// S5: delete with re-indexing on an IntArray.
#[test]
fn delete_reindexes_int_array() {
    let mut root = compound(vec![Tag::new("arr", TagValue::IntArray(vec![10, 20, 30, 40]))]);

    delete(&mut root, "arr[1]").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::IntArray(vec![10, 30, 40]));

    delete(&mut root, "arr[2]").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::IntArray(vec![10, 30]));
}

#[test]
fn delete_out_of_bounds_on_array_is_index_bounds() {
    let mut root = compound(vec![Tag::new("arr", TagValue::IntArray(vec![1]))]);
    delete(&mut root, "arr[0]").unwrap();
    assert!(matches!(delete(&mut root, "arr[0]"), Err(EditError::IndexBounds(_))));
}

#[test]
fn deleting_the_root_is_unsupported() {
    let mut root = compound(vec![Tag::new("A", TagValue::Int(1))]);
    assert!(matches!(delete(&mut root, ""), Err(EditError::Unsupported(_))));
}

// Compound patch selectivity (property 8).
#[test]
fn object_patch_only_touches_named_children() {
    let mut root = compound(vec![
        Tag::new("Pos", TagValue::Compound(vec![
            Tag::new("x", TagValue::Double(1.0)),
            Tag::new("y", TagValue::Double(2.0)),
        ])),
    ]);
    edit(&mut root, "Pos", r#"{"x": 9.0}"#).unwrap();

    let pos = &root.as_compound().unwrap()[0];
    assert_eq!(pos.as_compound().unwrap()[0].value, TagValue::Double(9.0));
    assert_eq!(pos.as_compound().unwrap()[1].value, TagValue::Double(2.0));
}

#[test]
fn object_patch_rejects_unknown_key() {
    let mut root = compound(vec![
        Tag::new("Pos", TagValue::Compound(vec![Tag::new("x", TagValue::Double(1.0))])),
    ]);
    assert!(matches!(
        edit(&mut root, "Pos", r#"{"z": 9.0}"#),
        Err(EditError::TypeMismatch(_))
    ));
}

// Byte range boundaries.
#[test]
fn byte_range_boundaries() {
    let mut root = compound(vec![Tag::new("b", TagValue::Byte(0))]);
    edit(&mut root, "b", "127").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Byte(127));
    edit(&mut root, "b", "-128").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Byte(-128));
    assert!(matches!(edit(&mut root, "b", "128"), Err(EditError::NumericRange(_))));
    assert!(matches!(edit(&mut root, "b", "-129"), Err(EditError::NumericRange(_))));
}

// Int range boundaries.
#[test]
fn int_range_boundaries() {
    let mut root = compound(vec![Tag::new("i", TagValue::Int(0))]);
    edit(&mut root, "i", "2147483647").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Int(2147483647));
    edit(&mut root, "i", "-2147483648").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Int(-2147483648));
    assert!(matches!(edit(&mut root, "i", "2147483648"), Err(EditError::NumericRange(_))));
}

#[test]
fn indexing_a_scalar_is_type_mismatch() {
    let mut root = compound(vec![Tag::new("Age", TagValue::Short(10))]);
    assert!(matches!(edit(&mut root, "Age[0]", "1"), Err(EditError::TypeMismatch(_))));
}

#[test]
fn missing_path_is_path_not_found() {
    let mut root = compound(vec![Tag::new("Age", TagValue::Short(10))]);
    assert!(matches!(edit(&mut root, "Missing", "1"), Err(EditError::PathNotFound(_))));
}

#[test]
fn quoted_key_with_slash_and_escape() {
    let mut root = compound(vec![Tag::new("a/b\"c", TagValue::Int(1))]);
    edit(&mut root, r#""a\/b\"c""#, "2").unwrap();
    assert_eq!(root.as_compound().unwrap()[0].value, TagValue::Int(2));
}
