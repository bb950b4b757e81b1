//! Persistence adapters.

pub mod disk_cache;

pub use disk_cache::DiskCache;
