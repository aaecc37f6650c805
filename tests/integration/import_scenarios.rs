//! End-to-end import scenarios against the in-memory store

use super::common::{patterned, MIB};
use chunkdag::dag::{DagReader, Node};
use chunkdag::{import, Codec, ContentId, ContentStore, HashFunction, ImportConfig, Importer, MemoryContentStore};
use std::io::Cursor;

#[test]
fn two_and_a_half_mib_makes_three_leaves_under_one_root() {
    let store = MemoryContentStore::new();
    let data = patterned(5 * MIB / 2);
    let summary = Importer::new(&store, ImportConfig::default())
        .import(Cursor::new(data.clone()))
        .unwrap();

    assert_eq!(summary.leaves, 3);
    assert_eq!(summary.internal_nodes, 1);
    assert_eq!(summary.depth, 1);
    assert_eq!(store.len().unwrap(), 4);

    let reader = DagReader::new(&store);
    let root = reader.load(&summary.root).unwrap();
    let links = root.links();
    assert_eq!(links.len(), 3);
    assert_eq!(root.logical_size(), 2_621_440);
    let sizes: Vec<u64> = links.iter().map(|l| l.logical_size).collect();
    assert_eq!(sizes, vec![1_048_576, 1_048_576, 524_288]);
    for link in links {
        assert_eq!(link.cid.codec, Codec::Raw);
        assert_eq!(link.serialized_size, link.logical_size);
    }
    assert_eq!(reader.read_all(&summary.root).unwrap(), data);
}

#[test]
fn ten_byte_file_root_is_the_leaf_itself() {
    let store = MemoryContentStore::new();
    let root = import(&b"0123456789"[..], &store, &ImportConfig::default()).unwrap();
    assert_eq!(
        root,
        ContentId::compute(Codec::Raw, HashFunction::Blake3, b"0123456789")
    );
    let node = DagReader::new(&store).load(&root).unwrap();
    assert_eq!(node, Node::Raw(b"0123456789".to_vec()));
}

#[test]
fn single_wrapped_leaf_is_root_too() {
    let store = MemoryContentStore::new();
    let config = ImportConfig::default().with_raw_leaves(false);
    let root = import(&b"0123456789"[..], &store, &config).unwrap();
    let node = DagReader::new(&store).load(&root).unwrap();
    assert!(node.is_leaf());
    assert_eq!(node.logical_size(), 10);
}

#[test]
fn empty_stream_yields_canonical_empty_leaf() {
    let raw_store = MemoryContentStore::new();
    let wrapped_store = MemoryContentStore::new();
    let raw = import(&b""[..], &raw_store, &ImportConfig::default()).unwrap();
    let wrapped = import(
        &b""[..],
        &wrapped_store,
        &ImportConfig::default().with_raw_leaves(false),
    )
    .unwrap();

    assert_eq!(raw, wrapped);
    assert_eq!(raw.codec, Codec::DagNode);
    let node = DagReader::new(&raw_store).load(&raw).unwrap();
    assert_eq!(node.logical_size(), 0);
    assert!(DagReader::new(&raw_store).read_all(&raw).unwrap().is_empty());
}

#[test]
fn input_of_exactly_one_chunk_is_a_single_leaf() {
    let store = MemoryContentStore::new();
    let config = ImportConfig::default().with_chunk_size(64);
    let summary = Importer::new(&store, config)
        .import(Cursor::new(patterned(64)))
        .unwrap();
    assert_eq!(summary.leaves, 1);
    assert_eq!(summary.internal_nodes, 0);
    assert_eq!(summary.root.codec, Codec::Raw);
}

#[test]
fn same_bytes_same_config_same_root() {
    let data = patterned(10_000);
    let config = ImportConfig::default().with_chunk_size(100).with_max_links(4);
    let first = import(Cursor::new(data.clone()), &MemoryContentStore::new(), &config).unwrap();
    let second = import(Cursor::new(data), &MemoryContentStore::new(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn layout_parameters_change_the_root() {
    let data = patterned(10_000);
    let base = ImportConfig::default().with_chunk_size(100).with_max_links(4);
    let root = |config: &ImportConfig| {
        import(Cursor::new(data.clone()), &MemoryContentStore::new(), config).unwrap()
    };

    let reference = root(&base);
    assert_ne!(reference, root(&base.clone().with_max_links(5)));
    assert_ne!(reference, root(&base.clone().with_chunk_size(101)));
    assert_ne!(reference, root(&base.clone().with_raw_leaves(false)));
    assert_ne!(
        reference,
        root(&base.clone().with_hash_function(HashFunction::Sha256))
    );
}

#[test]
fn reordered_chunks_change_the_root() {
    let mut data = patterned(400);
    let config = ImportConfig::default().with_chunk_size(100);
    let original = import(Cursor::new(data.clone()), &MemoryContentStore::new(), &config).unwrap();
    data.rotate_left(100);
    let rotated = import(Cursor::new(data), &MemoryContentStore::new(), &config).unwrap();
    assert_ne!(original, rotated);
}

#[test]
fn deep_tree_reconstructs_and_respects_fanout() {
    let store = MemoryContentStore::new();
    let data = patterned(50_000);
    let config = ImportConfig::default().with_chunk_size(97).with_max_links(3);
    let summary = Importer::new(&store, config)
        .import(Cursor::new(data.clone()))
        .unwrap();

    let reader = DagReader::new(&store);
    let stat = reader.verify(&summary.root).unwrap();
    assert_eq!(stat.size, 50_000);
    assert!(stat.max_fanout <= 3);
    assert_eq!(stat.depth, summary.depth);
    assert_eq!(reader.read_all(&summary.root).unwrap(), data);
    assert_eq!(reader.read_at(&summary.root, 12_345, 678).unwrap(), data[12_345..13_023]);
}

#[test]
fn every_stored_block_hashes_to_its_id() {
    let store = MemoryContentStore::new();
    let config = ImportConfig::default()
        .with_chunk_size(50)
        .with_max_links(4)
        .with_raw_leaves(false);
    import(Cursor::new(patterned(3_000)), &store, &config).unwrap();

    for id in store.ids() {
        let bytes = store.get(&id).unwrap().unwrap();
        assert!(id.verify(&bytes), "block {} does not match its id", id);
        let mut tampered = bytes.clone();
        tampered[0] ^= 0xFF;
        assert!(!id.verify(&tampered));
    }
}

#[test]
fn repeated_content_is_stored_once() {
    let store = MemoryContentStore::new();
    let config = ImportConfig::default().with_chunk_size(1024);
    let summary = Importer::new(&store, config)
        .import(Cursor::new(vec![0u8; 8 * 1024]))
        .unwrap();
    assert_eq!(summary.leaves, 8);
    // One zero leaf plus the root.
    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(summary.commit.written, 2);

    let stat = DagReader::new(&store).stat(&summary.root).unwrap();
    assert_eq!(stat.blocks, 2);
    assert_eq!(stat.leaves, 8);
}
