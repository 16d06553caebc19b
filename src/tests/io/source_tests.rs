//! Tests for source adapters.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::io::{NopClose, RangedSource, ReadSeekClose};
use crate::tests::support::read_all;

#[test]
fn ranged_source_clamps_reads() {
    let inner = Cursor::new(b"0123456789".to_vec());
    let mut ranged = RangedSource::new(inner, 3..6).unwrap();

    assert_eq!(ranged.len(), 3);
    assert_eq!(read_all(&mut ranged), b"345");

    let mut buf = [0u8; 4];
    assert_eq!(ranged.read(&mut buf).unwrap(), 0);
}

#[test]
fn ranged_source_seeks_relative_to_window() {
    let inner = Cursor::new(b"0123456789".to_vec());
    let mut ranged = RangedSource::new(inner, 2..8).unwrap();

    assert_eq!(ranged.seek(SeekFrom::End(-2)).unwrap(), 4);
    assert_eq!(read_all(&mut ranged), b"67");
    assert_eq!(ranged.seek(SeekFrom::Current(-3)).unwrap(), 3);
    assert_eq!(ranged.stream_position().unwrap(), 3);
    assert_eq!(read_all(&mut ranged), b"567");

    // past the window: allowed, reads nothing
    assert_eq!(ranged.seek(SeekFrom::Start(20)).unwrap(), 20);
    assert!(read_all(&mut ranged).is_empty());

    let err = ranged.seek(SeekFrom::Current(-21)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(ranged.stream_position().unwrap(), 20);
}

#[test]
fn ranged_source_rejects_inverted_range() {
    let inner = Cursor::new(b"0123456789".to_vec());
    #[allow(clippy::reversed_empty_ranges)]
    let err = RangedSource::new(inner, 5..1).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn empty_range() {
    let inner = Cursor::new(b"0123".to_vec());
    let mut ranged = RangedSource::new(inner, 2..2).unwrap();

    assert!(ranged.is_empty());
    assert!(read_all(&mut ranged).is_empty());
    assert_eq!(ranged.into_inner().position(), 2);
}

#[test]
fn nop_close_passes_through() {
    let mut source = NopClose::new(Cursor::new(b"abc".to_vec()));

    source.seek(SeekFrom::Start(1)).unwrap();
    assert_eq!(read_all(&mut source), b"bc");
    source.close().unwrap();
    assert_eq!(source.get_ref().position(), 3);
    assert_eq!(source.into_inner().into_inner(), b"abc");
}

#[test]
fn ranged_source_rejects_range_past_inner_end() {
    let inner = Cursor::new(b"abc".to_vec());
    let err = RangedSource::new(inner, 1..4).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    let inner = Cursor::new(b"abc".to_vec());
    let mut ranged = RangedSource::new(inner, 1..3).unwrap();
    assert_eq!(ranged.seek(SeekFrom::End(0)).unwrap(), 2);
    ranged.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(read_all(&mut ranged), b"bc");
}
