//! Mounts a remote, object-addressed storage account as a local directory tree.
//!
//! The crate is split the way requests flow:
//! - `fs`: the adapter (pending objects, staleness, attribute synthesis,
//!   enumeration, content access, capacity) and its `fuser` bridge;
//! - `remote`: the object model and the `ObjectStore` interface;
//! - `api_client` + `cache`: the HTTP implementation of that interface;
//! - `config`: `config.toml` and credentials.

pub mod api_client;
pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod path;
pub mod remote;

pub use api_client::HttpStore;
pub use error::FsError;
pub use fs::{FsOptions, MountedFs, ObjectFs, Owner};
pub use remote::{ObjectStore, RemoteObject, StorageError};
