//! Hashing functions.
//!
//! Two families are used by the dedup engine: a fast seeded 64-bit hash
//! (xxh3) for MinHash permutations, and a collision-resistant digest
//! (blake3) for exact line identity.

/// A byte digest used as a content key.
pub trait HashFunction: Send + Sync {
    /// Digest of `data`.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Leading eight digest bytes as a little-endian word.
    fn hash_u64(&self, data: &[u8]) -> u64 {
        let digest = self.hash(data);
        let mut word = [0u8; 8];
        let n = digest.len().min(8);
        word[..n].copy_from_slice(&digest[..n]);
        u64::from_le_bytes(word)
    }
}

/// 128-bit xxh3. Fast, but collisions are feasible for adversarial input.
#[derive(Debug, Clone, Copy, Default)]
pub struct XxHash3;

impl XxHash3 {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HashFunction for XxHash3 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        xxhash_rust::xxh3::xxh3_128(data).to_le_bytes().to_vec()
    }

    fn hash_u64(&self, data: &[u8]) -> u64 {
        xxhash_rust::xxh3::xxh3_64(data)
    }
}

/// 256-bit blake3; the default digest for exact line dedup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Full digest without allocating.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }
}

impl HashFunction for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        self.digest(data).to_vec()
    }
}

/// Member `seed` of the seeded xxh3 family.
///
/// MinHash function `i` of a run seeded with `s` is `hash_with_seed(_, s + i)`.
#[inline]
pub fn hash_with_seed(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh3::xxh3_64_with_seed(data, seed)
}
