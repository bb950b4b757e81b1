//! Quiver Infrastructure - adapters
//!
//! Everything that touches the outside world: the `.hit` definition
//! parser and file loader, the disk-backed response cache, the reqwest
//! HTTP adapter, and terminal output.

pub mod adapters;
pub mod output;
pub mod parser;
pub mod persistence;
pub mod serialization;

pub use adapters::reqwest_client::ReqwestHttpClient;
pub use parser::{ParseError, parse};
pub use parser::loader::{LoadError, load_dir};
pub use persistence::disk_cache::DiskCache;
