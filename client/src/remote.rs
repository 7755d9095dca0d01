//! The remote side of the adapter: the object model returned by the storage
//! service and the blocking `ObjectStore` interface the filesystem talks to.
//!
//! Everything the adapter knows about the remote account flows through
//! `ObjectStore`. The HTTP implementation lives in `api_client`; tests plug in
//! an in-memory double.

use bytes::Bytes;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors raised by a remote storage client.
///
/// These never leave the adapter: `fs` translates every one of them into an
/// `FsError` before replying to the kernel.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no remote object at {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    #[error("remote refused request for {path}: HTTP {status}")]
    Status { status: u16, path: String },

    #[error("malformed remote record: {0}")]
    Malformed(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Usage figures for the whole account. `capacity` is `None` when the
/// account has no quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountUsage {
    pub usage: u64,
    pub capacity: Option<u64>,
}

/// Kind of a direct child as reported in its parent's listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    MountPoint,
    Folder,
    File,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub kind: ChildKind,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub updated: SystemTime,
    pub deleted: bool,
}

/// A folder-like object: a regular folder or a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub children: Vec<Child>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMeta {
    pub name: String,
    pub mount_points: Vec<String>,
}

/// A transient view of one remote entity.
///
/// Valid until the next cache-bypassing lookup of the same path. New remote
/// kinds only need a new variant here plus their answers to the capability
/// queries below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteObject {
    File(FileMeta),
    Folder(Container),
    MountPoint(Container),
    Device(DeviceMeta),
    /// A kind this client does not recognise. Kept instead of failing so a
    /// single odd object cannot break enumeration of its parent.
    Unknown { name: String, kind: String },
}

impl RemoteObject {
    /// Whether the object carries readable byte content.
    pub fn has_content(&self) -> bool {
        matches!(self, RemoteObject::File(_))
    }

    /// Whether the object has children that can be enumerated.
    pub fn lists_children(&self) -> bool {
        matches!(
            self,
            RemoteObject::Folder(_) | RemoteObject::MountPoint(_) | RemoteObject::Device(_)
        )
    }

    /// Whether new folders may be created directly inside it. Mount points
    /// and devices are provisioned by the account, so only folders qualify.
    pub fn accepts_folders(&self) -> bool {
        matches!(self, RemoteObject::Folder(_))
    }

    /// The live children: mount points for a device, folders then files then
    /// anything else for containers, skipping tombstones.
    pub fn live_children(&self) -> Vec<Child> {
        match self {
            RemoteObject::Device(d) => d
                .mount_points
                .iter()
                .map(|name| Child { name: name.clone(), kind: ChildKind::MountPoint, deleted: false })
                .collect(),
            RemoteObject::Folder(c) | RemoteObject::MountPoint(c) => {
                let mut live = Vec::with_capacity(c.children.len());
                for kind in [ChildKind::Folder, ChildKind::File, ChildKind::Other] {
                    live.extend(
                        c.children
                            .iter()
                            .filter(|child| child.kind == kind && !child.deleted)
                            .cloned(),
                    );
                }
                live
            }
            RemoteObject::File(_) | RemoteObject::Unknown { .. } => Vec::new(),
        }
    }
}

/// Blocking interface to the remote account.
///
/// Paths are slash separated and absolute (`/Device/MountPoint/dir/file`).
/// `use_cache = false` must reach the remote service even when the client
/// holds a cached copy.
pub trait ObjectStore: Send + Sync {
    fn lookup(&self, path: &str, use_cache: bool) -> StorageResult<RemoteObject>;
    fn read_content(&self, path: &str) -> StorageResult<Bytes>;
    /// Creates the file if needed and replaces its whole content.
    fn write_content(&self, path: &str, data: Bytes) -> StorageResult<()>;
    fn mkdir(&self, path: &str) -> StorageResult<()>;
    fn delete(&self, path: &str) -> StorageResult<()>;
    fn devices(&self) -> StorageResult<Vec<String>>;
    fn account(&self) -> StorageResult<AccountUsage>;
}

/// One child entry in an `ObjectRecord`.
#[derive(Deserialize, Debug)]
pub struct ChildRecord {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Object metadata as served by `GET /meta/{path}`.
#[derive(Deserialize, Debug)]
pub struct ObjectRecord {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    /// Unix seconds.
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub children: Vec<ChildRecord>,
}

/// Account figures as served by `GET /usage`; a negative capacity means
/// unlimited.
#[derive(Deserialize, Debug)]
pub struct UsageRecord {
    pub usage: u64,
    pub capacity: i64,
}

impl From<UsageRecord> for AccountUsage {
    fn from(record: UsageRecord) -> Self {
        AccountUsage {
            usage: record.usage,
            capacity: u64::try_from(record.capacity).ok(),
        }
    }
}

fn unix_time(secs: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

impl From<ObjectRecord> for RemoteObject {
    fn from(record: ObjectRecord) -> Self {
        let container = |record: ObjectRecord| Container {
            name: record.name,
            deleted: record.deleted,
            children: record
                .children
                .into_iter()
                .map(|c| Child {
                    kind: match c.kind.as_str() {
                        "mountpoint" => ChildKind::MountPoint,
                        "folder" => ChildKind::Folder,
                        "file" => ChildKind::File,
                        _ => ChildKind::Other,
                    },
                    name: c.name,
                    deleted: c.deleted,
                })
                .collect(),
        };

        match record.kind.as_str() {
            "file" => RemoteObject::File(FileMeta {
                name: record.name,
                size: record.size,
                modified: unix_time(record.modified),
                updated: unix_time(record.updated),
                deleted: record.deleted,
            }),
            "folder" => RemoteObject::Folder(container(record)),
            "mountpoint" => RemoteObject::MountPoint(container(record)),
            "device" => RemoteObject::Device(DeviceMeta {
                name: record.name,
                mount_points: record.children.into_iter().map(|c| c.name).collect(),
            }),
            _ => RemoteObject::Unknown {
                name: record.name,
                kind: record.kind,
            },
        }
    }
}
