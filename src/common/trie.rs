use ethereum_types::H256;
use std::collections::BTreeMap;
use sha3::{Digest, Keccak256};

/// Codec trait: defines how to encode keys and values for hashing.
pub trait MockTrieCodec<K, V> {
    fn encode_pair(key: &K, value: &V) -> (Vec<u8>, Vec<u8>);
}

/// A BTreeMap-backed stand-in for a Merkle-Patricia trie: same insert/get/delete/root_hash
/// surface, without the real trie's node structure or proof support.
#[derive(Debug, Clone)]
pub struct MockTrie<K, V, C: MockTrieCodec<K, V>> {
    data: BTreeMap<K, V>,
    codec: C,
}

impl<K, V, C> MockTrie<K, V, C>
where
    K: Ord,
    C: MockTrieCodec<K, V>,
{
    pub fn new(codec: C) -> Self {
        Self {
            data: BTreeMap::new(),
            codec,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.data.insert(key, value);
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.data.get_mut(key)
    }

    pub fn delete(&mut self, key: &K) {
        self.data.remove(key);
    }

    pub fn root_hash(&self) -> H256 {
        let mut hasher = Keccak256::new();

        for (k, v) in &self.data {
            let (encoded_k, encoded_v) = C::encode_pair(k, v);
            hasher.update(encoded_k);
            hasher.update(encoded_v);
        }

        H256::from_slice(&hasher.finalize())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.data.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct SimpleCodec;

    impl MockTrieCodec<Vec<u8>, Vec<u8>> for SimpleCodec {
        fn encode_pair(key: &Vec<u8>, value: &Vec<u8>) -> (Vec<u8>, Vec<u8>) {
            (key.clone(), value.clone())
        }
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let mut trie = MockTrie::new(SimpleCodec);
        let key = vec![1, 2, 3];
        let value = vec![4, 5, 6];
        trie.insert(key.clone(), value.clone());
        assert_eq!(trie.get(&key), Some(&value));
    }

    #[test]
    fn delete_removes_entry() {
        let mut trie = MockTrie::new(SimpleCodec);
        let key = vec![7, 8];
        trie.insert(key.clone(), vec![9]);
        trie.delete(&key);
        assert_eq!(trie.get(&key), None);
        assert!(trie.is_empty());
    }

    #[test]
    fn root_hash_changes_with_contents() {
        let mut trie = MockTrie::new(SimpleCodec);
        let empty_hash = trie.root_hash();
        trie.insert(vec![1], vec![2]);
        assert_ne!(trie.root_hash(), empty_hash);
    }
}
