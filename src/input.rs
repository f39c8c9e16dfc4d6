//! Data read from disk at build start.
pub mod translation;
