use super::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const ROOT_INO: u64 = 1;
/// Set on inode numbers reported by `readdir` for names the kernel has not
/// looked up yet. Allocated inodes count up from 2 and never reach it.
const UNALLOCATED_BIT: u64 = 1 << 63;

/// Two-way mapping between kernel inode numbers and adapter paths.
///
/// An inode is allocated when the kernel learns about a path through
/// `lookup`, `create` or `mkdir`, and released when the kernel forgets as
/// many lookups as it was given. Numbers are never reused.
#[derive(Debug)]
pub struct InodeTable {
    inode_to_path: HashMap<u64, String>,
    path_to_inode: HashMap<String, u64>,
    lookups: HashMap<u64, u64>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    pub fn new() -> Self {
        let mut inode_to_path = HashMap::new();
        let mut path_to_inode = HashMap::new();
        inode_to_path.insert(ROOT_INO, "/".to_string());
        path_to_inode.insert("/".to_string(), ROOT_INO);
        Self { inode_to_path, path_to_inode, lookups: HashMap::new(), next_inode: ROOT_INO + 1 }
    }

    pub fn path(&self, ino: u64) -> Option<&str> {
        self.inode_to_path.get(&ino).map(String::as_str)
    }

    /// Full path of `name` inside the directory `parent`. `None` when the
    /// parent is unknown or the name is not valid UTF-8.
    pub fn child_path(&self, parent: u64, name: &OsStr) -> Option<String> {
        let parent_path = self.path(parent)?;
        Some(join(parent_path, name.to_str()?))
    }

    /// Inode of `path`, allocating one if the path is new. Counts as one
    /// kernel lookup, so call it only when replying with an entry.
    pub fn lookup_or_insert(&mut self, path: &str) -> u64 {
        let ino = match self.path_to_inode.get(path) {
            Some(&ino) => ino,
            None => {
                let ino = self.next_inode;
                self.next_inode += 1;
                self.inode_to_path.insert(ino, path.to_string());
                self.path_to_inode.insert(path.to_string(), ino);
                ino
            }
        };
        if ino != ROOT_INO {
            *self.lookups.entry(ino).or_insert(0) += 1;
        }
        ino
    }

    /// Inode number to show in a directory listing. Known paths report their
    /// inode; others get a stable number without allocating anything.
    pub fn listing_ino(&self, path: &str) -> u64 {
        if let Some(&ino) = self.path_to_inode.get(path) {
            return ino;
        }
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        hasher.finish() | UNALLOCATED_BIT
    }

    /// Inode of the parent directory of `ino`, the root for unknown inodes.
    pub fn parent_ino(&self, ino: u64) -> u64 {
        self.path(ino)
            .and_then(|p| self.path_to_inode.get(parent_of(p)))
            .copied()
            .unwrap_or(ROOT_INO)
    }

    /// Drops `nlookup` kernel references to `ino`, releasing it at zero.
    pub fn forget(&mut self, ino: u64, nlookup: u64) {
        let Some(count) = self.lookups.get_mut(&ino) else {
            return;
        };
        *count = count.saturating_sub(nlookup);
        if *count == 0 {
            self.lookups.remove(&ino);
            if let Some(path) = self.inode_to_path.remove(&ino) {
                self.path_to_inode.remove(&path);
            }
        }
    }

    /// Unmaps `path` after it was removed. The kernel may still forget its
    /// old inode later; that is a no-op.
    pub fn remove(&mut self, path: &str) {
        if let Some(ino) = self.path_to_inode.remove(path) {
            self.inode_to_path.remove(&ino);
            self.lookups.remove(&ino);
        }
    }
}
