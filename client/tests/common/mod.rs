//! In-memory `ObjectStore` double that records every call.

#![allow(dead_code)]

use bytes::Bytes;
use objfs::path::{file_name, parent_of};
use objfs::remote::{
    AccountUsage, Child, ChildKind, Container, DeviceMeta, FileMeta, ObjectStore, RemoteObject,
    StorageError, StorageResult,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup { path: String, use_cache: bool },
    Read(String),
    Write(String, Vec<u8>),
    Mkdir(String),
    Delete(String),
    Devices,
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Device,
    MountPoint,
    Folder,
    File(Vec<u8>),
    Other(&'static str),
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    deleted: bool,
}

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<String, Node>,
    calls: Vec<Call>,
    capacity: Option<u64>,
    fail_account: bool,
}

pub struct FakeStore {
    inner: Mutex<Inner>,
}

pub const MODIFIED: u64 = 1_700_000_000;
pub const UPDATED: u64 = 1_700_000_500;

impl FakeStore {
    /// A device `Dev` with mount points `Sync` and `Archive`, a folder
    /// `/Dev/Sync/docs` and a file `/Dev/Sync/hello.txt`.
    pub fn seeded() -> Self {
        let store = FakeStore { inner: Mutex::new(Inner::default()) };
        store.insert("/Dev", Kind::Device);
        store.insert("/Dev/Sync", Kind::MountPoint);
        store.insert("/Dev/Archive", Kind::MountPoint);
        store.insert("/Dev/Sync/docs", Kind::Folder);
        store.insert("/Dev/Sync/hello.txt", Kind::File(b"hello world".to_vec()));
        store
    }

    pub fn insert(&self, path: &str, kind: Kind) {
        self.inner
            .lock()
            .unwrap()
            .nodes
            .insert(path.to_string(), Node { kind, deleted: false });
    }

    pub fn tombstone(&self, path: &str) {
        if let Some(node) = self.inner.lock().unwrap().nodes.get_mut(path) {
            node.deleted = true;
        }
    }

    pub fn set_capacity(&self, capacity: Option<u64>) {
        self.inner.lock().unwrap().capacity = capacity;
    }

    pub fn fail_account(&self) {
        self.inner.lock().unwrap().fail_account = true;
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        match self.inner.lock().unwrap().nodes.get(path) {
            Some(Node { kind: Kind::File(data), deleted: false }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Every `use_cache` flag passed for lookups of `path`, in order.
    pub fn lookups_of(&self, path: &str) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Lookup { path: p, use_cache } if p == path => Some(use_cache),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn live(inner: &Inner, path: &str) -> Option<Kind> {
        inner.nodes.get(path).filter(|n| !n.deleted).map(|n| n.kind.clone())
    }

    fn accepts_children(inner: &Inner, path: &str) -> bool {
        matches!(Self::live(inner, path), Some(Kind::MountPoint | Kind::Folder))
    }
}

fn time(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl ObjectStore for FakeStore {
    fn lookup(&self, path: &str, use_cache: bool) -> StorageResult<RemoteObject> {
        self.record(Call::Lookup { path: path.to_string(), use_cache });
        let inner = self.inner.lock().unwrap();
        let kind = Self::live(&inner, path).ok_or_else(|| StorageError::NotFound(path.to_string()))?;

        let children: Vec<Child> = inner
            .nodes
            .iter()
            .filter(|(p, _)| p.as_str() != path && parent_of(p) == path)
            .map(|(p, node)| Child {
                name: file_name(p).to_string(),
                kind: match node.kind {
                    Kind::MountPoint => ChildKind::MountPoint,
                    Kind::Folder => ChildKind::Folder,
                    Kind::File(_) => ChildKind::File,
                    Kind::Device | Kind::Other(_) => ChildKind::Other,
                },
                deleted: node.deleted,
            })
            .collect();
        let name = file_name(path).to_string();

        Ok(match kind {
            Kind::Device => RemoteObject::Device(DeviceMeta {
                name,
                mount_points: children.into_iter().map(|c| c.name).collect(),
            }),
            Kind::MountPoint => RemoteObject::MountPoint(Container { name, children, deleted: false }),
            Kind::Folder => RemoteObject::Folder(Container { name, children, deleted: false }),
            Kind::File(data) => RemoteObject::File(FileMeta {
                name,
                size: data.len() as u64,
                modified: time(MODIFIED),
                updated: time(UPDATED),
                deleted: false,
            }),
            Kind::Other(kind) => RemoteObject::Unknown { name, kind: kind.to_string() },
        })
    }

    fn read_content(&self, path: &str) -> StorageResult<Bytes> {
        self.record(Call::Read(path.to_string()));
        self.content(path)
            .map(Bytes::from)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn write_content(&self, path: &str, data: Bytes) -> StorageResult<()> {
        self.record(Call::Write(path.to_string(), data.to_vec()));
        let mut inner = self.inner.lock().unwrap();
        if !Self::accepts_children(&inner, parent_of(path)) {
            return Err(StorageError::Status { status: 409, path: path.to_string() });
        }
        inner
            .nodes
            .insert(path.to_string(), Node { kind: Kind::File(data.to_vec()), deleted: false });
        Ok(())
    }

    fn mkdir(&self, path: &str) -> StorageResult<()> {
        self.record(Call::Mkdir(path.to_string()));
        let mut inner = self.inner.lock().unwrap();
        if !Self::accepts_children(&inner, parent_of(path)) {
            return Err(StorageError::Status { status: 409, path: path.to_string() });
        }
        inner
            .nodes
            .insert(path.to_string(), Node { kind: Kind::Folder, deleted: false });
        Ok(())
    }

    fn delete(&self, path: &str) -> StorageResult<()> {
        self.record(Call::Delete(path.to_string()));
        let mut inner = self.inner.lock().unwrap();
        if Self::live(&inner, path).is_none() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path);
        for (key, node) in inner.nodes.iter_mut() {
            if key == path || key.starts_with(&prefix) {
                node.deleted = true;
            }
        }
        Ok(())
    }

    fn devices(&self) -> StorageResult<Vec<String>> {
        self.record(Call::Devices);
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .nodes
            .iter()
            .filter(|(_, node)| node.kind == Kind::Device)
            .map(|(p, _)| file_name(p).to_string())
            .collect())
    }

    fn account(&self) -> StorageResult<AccountUsage> {
        self.record(Call::Account);
        let inner = self.inner.lock().unwrap();
        if inner.fail_account {
            return Err(StorageError::Status { status: 503, path: "/".into() });
        }
        let usage = inner
            .nodes
            .values()
            .filter(|n| !n.deleted)
            .map(|n| match &n.kind {
                Kind::File(data) => data.len() as u64,
                _ => 0,
            })
            .sum();
        Ok(AccountUsage { usage, capacity: inner.capacity })
    }
}
