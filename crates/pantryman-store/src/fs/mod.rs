//! Filesystem primitives shared by the store

pub mod atomic;

pub use atomic::{atomic_write, sha256_hex};
