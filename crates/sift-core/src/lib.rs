//! # sift-core
//!
//! Shared primitives for the sift corpus tools.
//!
//! Provides:
//! - Error types (`SiftError`, `Result`)
//! - Hashing (seeded xxh3 family, blake3 digests)

pub mod error;
pub mod hashing;

pub use error::{Result, SiftError};
pub use hashing::{hash_with_seed, Blake3Hasher, HashFunction, XxHash3};
