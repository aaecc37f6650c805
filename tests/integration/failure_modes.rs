//! Stream failures, store failures, and cancellation

use super::common::{patterned, BatchFailure, BrokenReader, CancellingReader, FlakyStore};
use chunkdag::dag::DagReader;
use chunkdag::error::StorageError;
use chunkdag::{
    import, Codec, ContentId, ContentStore, HashFunction, ImportConfig, ImportError, Importer,
    MemoryContentStore,
};
use std::io::Cursor;
use tokio_util::sync::CancellationToken;

fn config() -> ImportConfig {
    ImportConfig::default().with_chunk_size(128).with_max_links(4)
}

#[test]
fn stream_error_aborts_with_nothing_stored() {
    let store = MemoryContentStore::new();
    let reader = BrokenReader {
        ok_bytes: 1_000,
        served: 0,
    };
    let err = import(reader, &store, &config()).unwrap_err();
    assert!(matches!(err, ImportError::StreamRead(_)));
    assert!(store.is_empty().unwrap());
}

#[test]
fn rejected_batch_leaves_store_untouched() {
    let store = FlakyStore::new(BatchFailure::Reject);
    let err = import(Cursor::new(patterned(5_000)), &store, &config()).unwrap_err();
    assert!(matches!(err, ImportError::Store(StorageError::Backend(_))));
    assert!(store.is_empty().unwrap());

    store.heal();
    let root = import(Cursor::new(patterned(5_000)), &store, &config()).unwrap();
    DagReader::new(&store).verify(&root).unwrap();
}

#[test]
fn torn_batch_is_repaired_by_reimport() {
    let store = FlakyStore::new(BatchFailure::Torn);
    let data = patterned(5_000);
    import(Cursor::new(data.clone()), &store, &config()).unwrap_err();

    // Only children were written; staging order keeps the root last.
    let written = store.len().unwrap();
    assert!(written > 0);

    store.heal();
    let summary = Importer::new(&store, config())
        .import(Cursor::new(data.clone()))
        .unwrap();
    assert_eq!(summary.commit.deduplicated, written);

    let reader = DagReader::new(&store);
    reader.verify(&summary.root).unwrap();
    assert_eq!(reader.read_all(&summary.root).unwrap(), data);
}

#[test]
fn torn_batch_never_exposes_root() {
    let store = FlakyStore::new(BatchFailure::Torn);
    let data = patterned(5_000);
    let expected = import(Cursor::new(data.clone()), &MemoryContentStore::new(), &config()).unwrap();

    import(Cursor::new(data), &store, &config()).unwrap_err();
    assert!(!store.has(&expected).unwrap());
}

#[test]
fn cancellation_mid_stream_discards_staged_nodes() {
    let store = MemoryContentStore::new();
    let token = CancellationToken::new();
    let reader = CancellingReader::new(patterned(10_000), 2_000, token.clone());

    let err = Importer::new(&store, config())
        .with_cancellation(token)
        .import(reader)
        .unwrap_err();
    assert!(matches!(err, ImportError::Cancelled));
    assert!(store.is_empty().unwrap());
}

#[test]
fn cancellation_after_last_read_still_blocks_commit() {
    let store = MemoryContentStore::new();
    let token = CancellationToken::new();
    // Cancels while serving the final bytes; the EOF read is never attempted.
    let reader = CancellingReader::new(patterned(1_000), 1_000, token.clone());

    let err = Importer::new(&store, config())
        .with_cancellation(token)
        .import(reader)
        .unwrap_err();
    assert!(matches!(err, ImportError::Cancelled));
    assert!(store.is_empty().unwrap());
}

#[test]
fn conflicting_bytes_surface_as_integrity_error() {
    let store = MemoryContentStore::new();
    let root = import(&b"tiny"[..], &store, &config()).unwrap();
    let err = store.put(&root, b"tinY").unwrap_err();
    assert!(matches!(err, StorageError::Integrity { .. }));
    assert_eq!(store.get(&root).unwrap(), Some(b"tiny".to_vec()));
}

#[test]
fn conflicting_block_in_store_fails_import() {
    let store = MemoryContentStore::new();
    let leaf = ContentId::compute(Codec::Raw, HashFunction::Blake3, b"0123456789");
    store.put(&leaf, b"CORRUPTED!").unwrap();

    let err = import(&b"0123456789"[..], &store, &ImportConfig::default()).unwrap_err();
    assert!(matches!(err, ImportError::Integrity { id } if id == leaf));
    assert_eq!(store.get(&leaf).unwrap(), Some(b"CORRUPTED!".to_vec()));
}

#[test]
fn conflicting_child_blocks_whole_commit() {
    let data = patterned(1_000);
    let reference = MemoryContentStore::new();
    let summary = Importer::new(&reference, config())
        .import(Cursor::new(data.clone()))
        .unwrap();
    let victim = DagReader::new(&reference).load(&summary.root).unwrap().links()[1].cid;

    let store = MemoryContentStore::new();
    store.put(&victim, b"not the leaf").unwrap();
    let err = import(Cursor::new(data), &store, &config()).unwrap_err();
    assert!(matches!(err, ImportError::Integrity { id } if id == victim));
    assert_eq!(store.len().unwrap(), 1);
}
