// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! Malformed input must come back as a typed error, never a panic.

mod common;

use bco_core::bco::{read_header, HEADER_SIZE, MAGIC};
use bco_core::{read_bco, write_bco, BcoFile, BuildParams, CollisionIndex, ReadError, RemapTable};
use common::{flat, mesh_of};
use proptest::prelude::*;

fn sample_file() -> Vec<u8> {
    let mesh = mesh_of(&[
        (flat(0.0, 0.0, 10.0, 0.0), 0x0100),
        (flat(5.0, 5.0, 10.0, 2.0), 0x0200),
        (flat(1500.0, 20.0, 10.0, 1.0), 0x0100),
    ]);
    let index = CollisionIndex::build(&mesh, &RemapTable::default(), &BuildParams::default()).unwrap();
    write_bco(&index).unwrap()
}

fn put_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

fn get_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
}

const CELL_SIZE_X: usize = 16;
const CELL_SIZE_Z: usize = 20;
const TRIANGLE_INDICES_OFFSET: usize = 28;
const TRIANGLES_OFFSET: usize = 32;
const VERTICES_OFFSET: usize = 36;

#[test]
fn header_fields_sit_where_readers_expect_them() {
    let bytes = sample_file();
    assert_eq!(&bytes[..4], b"0003");
    let header = read_header(&bytes).unwrap();
    assert_eq!(header.triangle_indices_offset, get_u32(&bytes, TRIANGLE_INDICES_OFFSET));
    assert_eq!(header.triangles_offset, get_u32(&bytes, TRIANGLES_OFFSET));
    assert_eq!(header.vertices_offset, get_u32(&bytes, VERTICES_OFFSET));
    assert_eq!(header.material_count, 2);
    assert_eq!(header.triangle_indices_offset % 4, 0);
    assert_eq!(header.triangles_offset % 4, 0);
}

#[test]
fn wrong_magic_is_rejected() {
    let mut bytes = sample_file();
    bytes[..4].copy_from_slice(b"0002");
    assert!(matches!(
        read_bco(&bytes),
        Err(ReadError::BadMagic { expected, actual }) if expected == MAGIC && &actual == b"0002"
    ));
}

#[test]
fn truncation_is_unexpected_eof() {
    let bytes = sample_file();
    assert!(matches!(read_bco(&bytes[..10]), Err(ReadError::UnexpectedEof { .. })));
    assert!(matches!(read_bco(&bytes[..HEADER_SIZE]), Err(ReadError::UnexpectedEof { .. })));
    assert!(matches!(
        read_bco(&bytes[..bytes.len() - 1]),
        Err(ReadError::UnexpectedEof { section: "materials", .. })
    ));
}

#[test]
fn out_of_order_offsets_are_corrupt() {
    let mut bytes = sample_file();
    let vertices = get_u32(&bytes, VERTICES_OFFSET);
    put_u32(&mut bytes, TRIANGLES_OFFSET, vertices + 36);
    assert!(matches!(
        read_bco(&bytes),
        Err(ReadError::CorruptLayout { section: "header", .. })
    ));
}

#[test]
fn ragged_section_is_corrupt() {
    let mut bytes = sample_file();
    let triangles = get_u32(&bytes, TRIANGLES_OFFSET);
    put_u32(&mut bytes, TRIANGLES_OFFSET, triangles + 2);
    assert!(matches!(read_bco(&bytes), Err(ReadError::CorruptLayout { .. })));
}

#[test]
fn slot_naming_a_missing_triangle_is_corrupt() {
    let mut bytes = sample_file();
    let slots = get_u32(&bytes, TRIANGLE_INDICES_OFFSET) as usize;
    bytes[slots..slots + 2].copy_from_slice(&0x0400u16.to_be_bytes());
    assert!(matches!(
        read_bco(&bytes),
        Err(ReadError::CorruptLayout { section: "triangle indices", .. })
    ));
}

#[test]
fn backwards_child_pointer_is_corrupt() {
    let mut bytes = sample_file();
    // First grid entry becomes a branch pointing at itself.
    bytes[HEADER_SIZE] = 0;
    bytes[HEADER_SIZE + 2..HEADER_SIZE + 4].copy_from_slice(&0u16.to_be_bytes());
    assert!(matches!(
        read_bco(&bytes),
        Err(ReadError::CorruptLayout { section: "grid", .. })
    ));
}

#[test]
fn non_positive_cell_size_is_corrupt() {
    for (at, value) in [(CELL_SIZE_X, 0_i32), (CELL_SIZE_Z, -1000)] {
        let mut bytes = sample_file();
        put_u32(&mut bytes, at, value as u32);
        assert!(matches!(
            read_bco(&bytes),
            Err(ReadError::CorruptLayout { section: "header", .. })
        ));
    }
}

#[test]
fn from_bytes_keeps_the_stored_header() {
    let bytes = sample_file();
    let file = BcoFile::from_bytes(&bytes).unwrap();
    assert_eq!(*file.header(), read_header(&bytes).unwrap());
    assert_eq!(file.header().cell_size_x, 1000);
    assert_eq!(write_bco(file.index()).unwrap(), bytes);
}

#[test]
fn open_reports_missing_files_as_io() {
    let dir = tempfile::tempdir().unwrap();
    let err = BcoFile::open(dir.path().join("absent.bco")).unwrap_err();
    assert!(matches!(err, ReadError::Io(_)));
}

#[test]
fn open_reads_what_write_produced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("track.bco");
    let bytes = sample_file();
    std::fs::write(&path, &bytes).unwrap();
    let file = BcoFile::open(&path).unwrap();
    assert_eq!(file.size(), bytes.len());
    assert_eq!(file.index().triangles().len(), 3);
    assert_eq!(file.index().query().height_below(6.0, 6.0, 100.0), Some(2.0));
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = read_bco(&bytes);
    }

    #[test]
    fn garbage_after_magic_never_panics(tail in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&tail);
        let _ = read_bco(&bytes);
    }

    #[test]
    fn single_byte_corruption_never_panics(at in any::<prop::sample::Index>(), value in any::<u8>()) {
        let mut bytes = sample_file();
        let i = at.index(bytes.len());
        bytes[i] = value;
        if let Ok(index) = read_bco(&bytes) {
            // Whatever decodes must be queryable.
            let q = index.query();
            let _ = q.height_below(6.0, 6.0, f32::INFINITY);
            let _ = q.closest_height(1500.0, 25.0, 0.0);
        }
    }
}
