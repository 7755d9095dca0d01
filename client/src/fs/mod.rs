//! The filesystem adapter.
//!
//! `ObjectFs` is the path-based core: it keeps the pending tracker and the
//! staleness state, and turns every filesystem call into calls on an
//! `ObjectStore`. `MountedFs` is the thin `fuser::Filesystem` bridge that maps
//! inodes to paths and replies to the kernel.

use fuser::{
    Filesystem, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyStatfs, ReplyWrite, Request,
};
use std::ffi::OsStr;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::config::{Config, InvalidationScope};
use crate::remote::ObjectStore;

mod attr;
mod attr_ops;
mod blacklist;
mod create;
mod delete;
mod gate;
mod inode;
mod pending;
mod prelude;
mod read;
mod read_ops;
mod statfs;
mod write;
mod write_ops;

pub use attr::{Attributes, EntryKind, DIR_PERM, FILE_PERM, READ_ONLY_DIR_PERM};
pub use attr_ops::to_file_attr;
pub use blacklist::{is_blacklisted, BLACKLISTED_PREFIXES};
pub use gate::Staleness;
pub use inode::{InodeTable, ROOT_INO};
pub use pending::PendingTracker;
pub use read::DirEntry;
pub use statfs::{capacity_stats, FsStats, BLOCK_SIZE, UNLIMITED_FLOOR};
pub use write::Written;

/// Owner reported for every entry. The mount has no ownership mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

impl Owner {
    /// The owner of the directory the account is mounted on.
    pub fn of(mountpoint: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(mountpoint)?;
        Ok(Self { uid: metadata.uid(), gid: metadata.gid() })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FsOptions {
    pub invalidation: InvalidationScope,
    pub list_pending_entries: bool,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self { invalidation: InvalidationScope::Global, list_pending_entries: true }
    }
}

impl From<&Config> for FsOptions {
    fn from(config: &Config) -> Self {
        Self {
            invalidation: config.invalidation,
            list_pending_entries: config.list_pending_entries,
        }
    }
}

/// Mutable adapter state. Held locked for the whole of each operation, so
/// operations are totally ordered even if the bridge dispatches from
/// several threads.
#[derive(Debug)]
pub struct State {
    pub(crate) pending: PendingTracker,
    pub(crate) staleness: Staleness,
}

pub struct ObjectFs {
    store: Arc<dyn ObjectStore>,
    options: FsOptions,
    owner: Owner,
    state: Mutex<State>,
}

impl ObjectFs {
    pub fn new(store: Arc<dyn ObjectStore>, options: FsOptions, owner: Owner) -> Self {
        Self {
            store,
            options,
            owner,
            state: Mutex::new(State {
                pending: PendingTracker::new(),
                staleness: Staleness::new(options.invalidation),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.lock().pending.is_pending(path)
    }

    /// Whether some mutation has not yet been followed by a fresh fetch
    /// (always true after the first mutation in global scope).
    pub fn is_dirty(&self) -> bool {
        self.lock().staleness.is_dirty()
    }

    /// Called at unmount. Pending files were never uploaded and are dropped.
    pub fn destroy(&self) {
        let state = self.lock();
        for path in state.pending.files() {
            tracing::warn!(path = %path, "dropping file that was created but never written");
        }
        tracing::info!("filesystem unmounted");
    }
}

/// The `fuser` bridge around `ObjectFs`.
pub struct MountedFs {
    pub(crate) core: ObjectFs,
    pub(crate) inodes: InodeTable,
    pub(crate) ttl: Duration,
}

impl MountedFs {
    pub fn new(core: ObjectFs, ttl: Duration) -> Self {
        Self { core, inodes: InodeTable::new(), ttl }
    }
}

impl Filesystem for MountedFs {
    fn getattr(&mut self, req: &Request, ino: u64, reply: ReplyAttr) {
        attr_ops::getattr(self, req, ino, reply);
    }
    fn setattr(&mut self, req: &Request<'_>, ino: u64, mode: Option<u32>, uid: Option<u32>, gid: Option<u32>, size: Option<u64>, atime: Option<fuser::TimeOrNow>, mtime: Option<fuser::TimeOrNow>, ctime: Option<SystemTime>, fh: Option<u64>, crtime: Option<SystemTime>, chgtime: Option<SystemTime>, bkuptime: Option<SystemTime>, flags: Option<u32>, reply: ReplyAttr) {
        attr_ops::setattr(self, req, ino, mode, uid, gid, size, atime, mtime, ctime, fh, crtime, chgtime, bkuptime, flags, reply);
    }
    fn statfs(&mut self, req: &Request<'_>, ino: u64, reply: ReplyStatfs) {
        attr_ops::statfs(self, req, ino, reply);
    }
    fn lookup(&mut self, req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        read_ops::lookup(self, req, parent, name, reply);
    }
    fn readdir(&mut self, req: &Request, ino: u64, fh: u64, offset: i64, reply: ReplyDirectory) {
        read_ops::readdir(self, req, ino, fh, offset, reply);
    }
    fn read(&mut self, req: &Request<'_>, ino: u64, fh: u64, offset: i64, size: u32, flags: i32, lock_owner: Option<u64>, reply: ReplyData) {
        read_ops::read(self, req, ino, fh, offset, size, flags, lock_owner, reply);
    }
    fn write(&mut self, req: &Request<'_>, ino: u64, fh: u64, offset: i64, data: &[u8], write_flags: u32, flags: i32, lock_owner: Option<u64>, reply: ReplyWrite) {
        write_ops::write(self, req, ino, fh, offset, data, write_flags, flags, lock_owner, reply);
    }
    fn create(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, mode: u32, umask: u32, flags: i32, reply: ReplyCreate) {
        write_ops::create(self, req, parent, name, mode, umask, flags, reply);
    }
    fn mkdir(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, mode: u32, umask: u32, reply: ReplyEntry) {
        write_ops::mkdir(self, req, parent, name, mode, umask, reply);
    }
    fn unlink(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        write_ops::unlink(self, req, parent, name, reply);
    }
    fn rmdir(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        write_ops::rmdir(self, req, parent, name, reply);
    }
    fn forget(&mut self, _req: &Request<'_>, ino: u64, nlookup: u64) {
        self.inodes.forget(ino, nlookup);
    }
    fn destroy(&mut self) {
        self.core.destroy();
    }
}
