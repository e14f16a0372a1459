use nbted::region::{chunk_coords, chunk_index, CompressionType, RegionFile};
use nbted::{edit, NBTKind, Tag, TagValue};
use std::fs;

fn seeded_region() -> (RegionFile, Tag) {
    let mut region = RegionFile::empty();
    let tag = Tag::new(
        "",
        TagValue::Compound(vec![Tag::new("Level", TagValue::Compound(vec![Tag::new("x", TagValue::Int(1))]))]),
    );

    region.update_chunk_from_tag(3, 5, &tag, Some(CompressionType::Zlib)).unwrap();
    (region, tag)
}

// S6: region chunk round-trip.
#[test]
fn single_chunk_round_trips_through_write_and_read() {
    let (region, tag) = seeded_region();

    let bytes = region.write().unwrap();
    let reread = RegionFile::read(&bytes).unwrap();

    assert_eq!(reread.find_first_populated_chunk(), Some((3, 5)));
    let restored = reread.extract_chunk_tag(3, 5).unwrap();
    assert_eq!(restored, tag);

    let slot = reread.get_chunk(3, 5).unwrap();
    assert_eq!(slot.compression, Some(CompressionType::Zlib));

    // All other slots remain empty.
    for z in 0..32 {
        for x in 0..32 {
            if (x, z) != (3, 5) {
                assert!(!reread.get_chunk(x, z).unwrap().present);
            }
        }
    }
}

// Property 7: read(write(R)) equals R in every present slot's fields.
#[test]
fn edit_then_round_trip_preserves_compression_and_updates_timestamp() {
    let (mut region, _tag) = seeded_region();
    let before_timestamp = region.get_chunk(3, 5).unwrap().timestamp;

    let mut root = region.extract_chunk_tag(3, 5).unwrap();
    edit(&mut root, "Level/x", "42").unwrap();
    region.update_chunk_from_tag(3, 5, &root, None).unwrap();

    let after_timestamp = region.get_chunk(3, 5).unwrap().timestamp;
    assert!(after_timestamp >= before_timestamp);

    let bytes = region.write().unwrap();
    let reread = RegionFile::read(&bytes).unwrap();
    let restored = reread.extract_chunk_tag(3, 5).unwrap();

    let level = restored.as_compound().unwrap()[0].as_compound().unwrap();
    assert_eq!(level[0].value, TagValue::Int(42));
    assert_eq!(reread.get_chunk(3, 5).unwrap().compression, Some(CompressionType::Zlib));
}

#[test]
fn chunk_index_rejects_out_of_grid_coords() {
    assert_eq!(chunk_index(32, 0), None);
    assert_eq!(chunk_index(0, -1), None);
}

#[test]
fn chunk_coords_roundtrip_every_index() {
    for i in 0..1024 {
        let (x, z) = chunk_coords(i);
        assert_eq!(chunk_index(x, z), Some(i));
    }
}

#[test]
fn reading_a_file_smaller_than_header_fails() {
    assert!(RegionFile::read(&[0u8; 16]).is_err());
}

// §4.9's atomic-write guarantee: a reader must never observe a partial or
// missing file at the destination path, including on a path that doesn't
// exist yet.
#[test]
fn write_atomic_produces_a_readable_file_at_the_destination_path() {
    let (region, tag) = seeded_region();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("r.3.5.mca");

    region.write_atomic(&dest).unwrap();

    let bytes = fs::read(&dest).unwrap();
    let reread = RegionFile::read(&bytes).unwrap();
    assert_eq!(reread.extract_chunk_tag(3, 5).unwrap(), tag);

    // No leftover temp file in the same directory.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path() != dest)
        .collect();
    assert!(leftovers.is_empty(), "temp file was not cleaned up: {:?}", leftovers);
}

#[test]
fn write_atomic_overwrites_an_existing_file_in_place() {
    let (region, tag) = seeded_region();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("r.3.5.mca");
    fs::write(&dest, b"stale contents").unwrap();

    region.write_atomic(&dest).unwrap();

    let bytes = fs::read(&dest).unwrap();
    let reread = RegionFile::read(&bytes).unwrap();
    assert_eq!(reread.extract_chunk_tag(3, 5).unwrap(), tag);
}

#[test]
fn empty_list_round_trips_until_edited() {
    let tag = Tag::new(
        "",
        TagValue::Compound(vec![Tag::new(
            "Empty",
            TagValue::List { element_kind: NBTKind::End, items: Vec::new() },
        )]),
    );
    let bytes = nbted::serialize_to_bytes(&tag).unwrap();
    let (reparsed, _) = nbted::parse_document(&bytes).unwrap();
    assert_eq!(reparsed, tag);
}
