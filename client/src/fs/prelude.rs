//! Common imports shared by the `fs` sub-modules.

// --- FUSE Types ---
pub use fuser::{
    FileAttr, FileType, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};

// --- LibC Error Codes ---
pub use libc::{EINVAL, ENOENT};

// --- Standard Library Types ---
pub use std::ffi::OsStr;
pub use std::time::SystemTime;

// --- External Crate Types ---
pub use bytes::Bytes;
pub use tracing::{debug, warn};

// --- Internal Project Modules ---
pub use crate::config::InvalidationScope;
pub use crate::error::{FsError, Result};
pub use crate::path::{file_name, is_root, join, parent_of};
pub use crate::remote::{RemoteObject, StorageError};

// --- Internal `fs` Module Types ---
pub use super::attr::{Attributes, EntryKind};
pub use super::blacklist::is_blacklisted;
pub use super::{MountedFs, ObjectFs, State};
