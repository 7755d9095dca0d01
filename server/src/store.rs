//! In-memory object store backing the development server.
//!
//! Objects are kept in a flat map keyed by absolute path. The tree has a
//! fixed shape: devices at the top level, mount points directly under a
//! device, then arbitrarily nested folders and files. Devices and mount points
//! are provisioned at startup and cannot be created or removed over HTTP.

use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;

pub type SharedStore = Arc<RwLock<Store>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no object at {0}")]
    NotFound(String),

    #[error("{0} cannot hold children")]
    NotAContainer(String),

    #[error("{0} is a different kind of object")]
    KindMismatch(String),

    #[error("{0} is managed by the account, not the client")]
    Reserved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Device,
    MountPoint,
    Folder,
    File,
}

impl NodeKind {
    fn is_container(self) -> bool {
        matches!(self, NodeKind::MountPoint | NodeKind::Folder)
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    content: Bytes,
    modified: i64,
    updated: i64,
    deleted: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        let now = unix_now();
        Self { kind, content: Bytes::new(), modified: now, updated: now, deleted: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildView {
    pub name: String,
    pub kind: NodeKind,
    pub deleted: bool,
}

/// Metadata served by `GET /meta/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectView {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    pub modified: i64,
    pub updated: i64,
    pub deleted: bool,
    pub children: Vec<ChildView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageView {
    pub usage: u64,
    /// `-1` when the account has no quota.
    pub capacity: i64,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Turns `Dev/Sync/a.txt`, `/Dev/Sync/a.txt/` and friends into `/Dev/Sync/a.txt`.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn parent_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

fn depth(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

#[derive(Debug, Default)]
pub struct Store {
    nodes: BTreeMap<String, Node>,
    capacity: Option<u64>,
}

impl Store {
    pub fn new(capacity: Option<u64>) -> Self {
        Self { nodes: BTreeMap::new(), capacity }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Provisions a device and its mount points. Existing entries are kept.
    pub fn add_device(&mut self, device: &str, mount_points: &[String]) {
        let device_path = normalize(device);
        self.nodes
            .entry(device_path.clone())
            .or_insert_with(|| Node::new(NodeKind::Device));
        for mount_point in mount_points {
            self.nodes
                .entry(format!("{}/{}", device_path, mount_point))
                .or_insert_with(|| Node::new(NodeKind::MountPoint));
        }
    }

    fn live(&self, path: &str) -> Option<&Node> {
        self.nodes.get(path).filter(|node| !node.deleted)
    }

    fn require_live(&self, path: &str) -> Result<&Node, StoreError> {
        self.live(path).ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    /// Parent must be a live mount point or folder.
    fn require_container_parent(&self, path: &str) -> Result<(), StoreError> {
        let parent = parent_of(path);
        if depth(path) <= 2 {
            return Err(StoreError::Reserved(path.to_string()));
        }
        match self.live(parent) {
            Some(node) if node.kind.is_container() => Ok(()),
            Some(_) => Err(StoreError::NotAContainer(parent.to_string())),
            None => Err(StoreError::NotFound(parent.to_string())),
        }
    }

    pub fn devices(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.kind == NodeKind::Device && !node.deleted)
            .map(|(path, _)| name_of(path).to_string())
            .collect()
    }

    pub fn meta(&self, path: &str) -> Result<ObjectView, StoreError> {
        let path = normalize(path);
        let node = self.require_live(&path)?;

        let children = if node.kind == NodeKind::File {
            Vec::new()
        } else {
            self.nodes
                .iter()
                .filter(|(child, _)| parent_of(child) == path && child.as_str() != path)
                .map(|(child, node)| ChildView {
                    name: name_of(child).to_string(),
                    kind: node.kind,
                    deleted: node.deleted,
                })
                .collect()
        };

        Ok(ObjectView {
            name: name_of(&path).to_string(),
            kind: node.kind,
            size: node.content.len() as u64,
            modified: node.modified,
            updated: node.updated,
            deleted: node.deleted,
            children,
        })
    }

    pub fn read(&self, path: &str) -> Result<Bytes, StoreError> {
        let path = normalize(path);
        let node = self.require_live(&path)?;
        if node.kind != NodeKind::File {
            return Err(StoreError::KindMismatch(path));
        }
        Ok(node.content.clone())
    }

    /// Creates or replaces a file. A tombstoned object at `path` is revived.
    pub fn write(&mut self, path: &str, content: Bytes) -> Result<(), StoreError> {
        let path = normalize(path);
        self.require_container_parent(&path)?;
        if let Some(existing) = self.live(&path) {
            if existing.kind != NodeKind::File {
                return Err(StoreError::KindMismatch(path));
            }
        }

        let mut node = Node::new(NodeKind::File);
        node.content = content;
        tracing::debug!(path = %path, len = node.content.len(), "stored file");
        self.nodes.insert(path, node);
        Ok(())
    }

    /// Creates a folder. Creating an existing folder succeeds.
    pub fn mkdir(&mut self, path: &str) -> Result<(), StoreError> {
        let path = normalize(path);
        self.require_container_parent(&path)?;
        match self.live(&path) {
            Some(existing) if existing.kind == NodeKind::Folder => return Ok(()),
            Some(_) => return Err(StoreError::KindMismatch(path)),
            None => {}
        }

        tracing::debug!(path = %path, "created folder");
        self.nodes.insert(path, Node::new(NodeKind::Folder));
        Ok(())
    }

    /// Tombstones `path` and everything below it.
    pub fn delete(&mut self, path: &str) -> Result<(), StoreError> {
        let path = normalize(path);
        let node = self.require_live(&path)?;
        if matches!(node.kind, NodeKind::Device | NodeKind::MountPoint) {
            return Err(StoreError::Reserved(path));
        }

        let prefix = format!("{}/", path);
        let now = unix_now();
        let mut count = 0;
        for (key, node) in self.nodes.iter_mut() {
            if (key == &path || key.starts_with(&prefix)) && !node.deleted {
                node.deleted = true;
                node.updated = now;
                count += 1;
            }
        }
        tracing::debug!(path = %path, count, "tombstoned objects");
        Ok(())
    }

    pub fn usage(&self) -> UsageView {
        let usage = self
            .nodes
            .values()
            .filter(|node| !node.deleted && node.kind == NodeKind::File)
            .map(|node| node.content.len() as u64)
            .sum();
        UsageView {
            usage,
            capacity: self.capacity.map_or(-1, |c| i64::try_from(c).unwrap_or(i64::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Store {
        let mut store = Store::new(None);
        store.add_device("Objfs", &["Archive".to_string(), "Sync".to_string()]);
        store
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Objfs/Sync/a.txt"), "/Objfs/Sync/a.txt");
        assert_eq!(normalize("/Objfs//Sync/"), "/Objfs/Sync");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_device_lists_mount_points() {
        let store = seeded();
        assert_eq!(store.devices(), vec!["Objfs".to_string()]);
        let meta = store.meta("Objfs").unwrap();
        assert_eq!(meta.kind, NodeKind::Device);
        let names: Vec<_> = meta.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Archive", "Sync"]);
    }

    #[test]
    fn test_write_then_read() {
        let mut store = seeded();
        store.write("Objfs/Sync/a.txt", Bytes::from_static(b"abc")).unwrap();
        assert_eq!(store.read("/Objfs/Sync/a.txt").unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(store.meta("Objfs/Sync/a.txt").unwrap().size, 3);
        assert_eq!(store.usage().usage, 3);
    }

    #[test]
    fn test_write_needs_container_parent() {
        let mut store = seeded();
        assert_eq!(
            store.write("Objfs/a.txt", Bytes::new()),
            Err(StoreError::Reserved("/Objfs/a.txt".into()))
        );
        assert_eq!(
            store.write("Objfs/Sync/missing/a.txt", Bytes::new()),
            Err(StoreError::NotFound("/Objfs/Sync/missing".into()))
        );
        store.write("Objfs/Sync/f", Bytes::new()).unwrap();
        assert_eq!(
            store.mkdir("Objfs/Sync/f/sub"),
            Err(StoreError::NotAContainer("/Objfs/Sync/f".into()))
        );
    }

    #[test]
    fn test_delete_tombstones_subtree() {
        let mut store = seeded();
        store.mkdir("Objfs/Sync/dir").unwrap();
        store.write("Objfs/Sync/dir/a.txt", Bytes::from_static(b"12345")).unwrap();
        store.delete("Objfs/Sync/dir").unwrap();

        assert!(matches!(store.meta("Objfs/Sync/dir"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.read("Objfs/Sync/dir/a.txt"), Err(StoreError::NotFound(_))));
        let sync = store.meta("Objfs/Sync").unwrap();
        assert_eq!(
            sync.children,
            vec![ChildView { name: "dir".into(), kind: NodeKind::Folder, deleted: true }]
        );
        assert_eq!(store.usage().usage, 0);
    }

    #[test]
    fn test_write_revives_tombstone() {
        let mut store = seeded();
        store.write("Objfs/Sync/a.txt", Bytes::from_static(b"old")).unwrap();
        store.delete("Objfs/Sync/a.txt").unwrap();
        store.write("Objfs/Sync/a.txt", Bytes::from_static(b"new")).unwrap();
        let meta = store.meta("Objfs/Sync/a.txt").unwrap();
        assert!(!meta.deleted);
        assert_eq!(store.read("Objfs/Sync/a.txt").unwrap(), Bytes::from_static(b"new"));
    }

    #[test]
    fn test_mount_points_are_reserved() {
        let mut store = seeded();
        assert_eq!(store.delete("Objfs/Sync"), Err(StoreError::Reserved("/Objfs/Sync".into())));
        assert_eq!(store.mkdir("Objfs/New"), Err(StoreError::Reserved("/Objfs/New".into())));
    }

    #[test]
    fn test_usage_reports_capacity() {
        assert_eq!(seeded().usage().capacity, -1);
        let store = Store::new(Some(1 << 30));
        assert_eq!(store.usage().capacity, 1 << 30);
    }
}
