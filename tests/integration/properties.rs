//! Property tests over random inputs and parameters

use chunkdag::dag::DagReader;
use chunkdag::{import, Codec, ContentId, ContentStore, HashFunction, ImportConfig, MemoryContentStore};
use proptest::prelude::*;
use std::io::Cursor;

fn hash_strategy() -> impl Strategy<Value = HashFunction> {
    prop_oneof![Just(HashFunction::Blake3), Just(HashFunction::Sha256)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn import_round_trips_and_respects_fanout(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk_size in 1usize..256,
        max_links in 2usize..6,
        raw_leaves in any::<bool>(),
        hash in hash_strategy(),
    ) {
        let config = ImportConfig::default()
            .with_chunk_size(chunk_size)
            .with_max_links(max_links)
            .with_raw_leaves(raw_leaves)
            .with_hash_function(hash);
        let store = MemoryContentStore::new();
        let root = import(Cursor::new(data.clone()), &store, &config).unwrap();

        let reader = DagReader::new(&store);
        let stat = reader.verify(&root).unwrap();
        prop_assert_eq!(stat.size, data.len() as u64);
        prop_assert!(stat.max_fanout <= max_links);
        prop_assert_eq!(reader.read_all(&root).unwrap(), data.clone());

        let again = import(Cursor::new(data), &MemoryContentStore::new(), &config).unwrap();
        prop_assert_eq!(root, again);
    }

    #[test]
    fn short_input_root_is_its_own_leaf(
        data in proptest::collection::vec(any::<u8>(), 1..512),
        hash in hash_strategy(),
    ) {
        let config = ImportConfig::default()
            .with_chunk_size(512)
            .with_hash_function(hash);
        let store = MemoryContentStore::new();
        let root = import(Cursor::new(data.clone()), &store, &config).unwrap();

        prop_assert_eq!(root, ContentId::compute(Codec::Raw, hash, &data));
        prop_assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn read_at_matches_slice(
        data in proptest::collection::vec(any::<u8>(), 1..2048),
        chunk_size in 1usize..64,
        offset in 0usize..2048,
        len in 0usize..512,
    ) {
        let offset = offset % (data.len() + 1);
        let config = ImportConfig::default().with_chunk_size(chunk_size).with_max_links(3);
        let store = MemoryContentStore::new();
        let root = import(Cursor::new(data.clone()), &store, &config).unwrap();

        let got = DagReader::new(&store)
            .read_at(&root, offset as u64, len as u64)
            .unwrap();
        let end = (offset + len).min(data.len());
        prop_assert_eq!(got, data[offset..end].to_vec());
    }
}
