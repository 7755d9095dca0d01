use super::prelude::*;

/// Permission bits for regular files. Content changes go through `write`,
/// so files are presented read-only.
pub const FILE_PERM: u16 = 0o444;
/// Permission bits for folders that accept new children.
pub const DIR_PERM: u16 = 0o755;
/// Permission bits for devices, mount points and anything unrecognised.
pub const READ_ONLY_DIR_PERM: u16 = 0o555;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn type_bits(self) -> u32 {
        match self {
            EntryKind::File => libc::S_IFREG as u32,
            EntryKind::Directory => libc::S_IFDIR as u32,
        }
    }
}

/// A synthesized stat record. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub kind: EntryKind,
    pub perm: u16,
    pub size: u64,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub uid: u32,
    pub gid: u32,
}

impl Attributes {
    /// Type and permission bits combined, as in `st_mode`.
    pub fn mode(&self) -> u32 {
        self.kind.type_bits() | u32::from(self.perm)
    }
}

impl ObjectFs {
    fn synthesized(&self, kind: EntryKind, perm: u16) -> Attributes {
        let now = SystemTime::now();
        Attributes {
            kind,
            perm,
            size: 0,
            atime: now,
            mtime: now,
            uid: self.owner.uid,
            gid: self.owner.gid,
        }
    }

    /// Attributes for `path`, preferring local pending state over the remote view.
    pub fn getattr(&self, path: &str) -> Result<Attributes> {
        let mut state = self.lock();
        self.getattr_locked(&mut state, path)
    }

    pub(crate) fn getattr_locked(&self, state: &mut State, path: &str) -> Result<Attributes> {
        if is_root(path) {
            return Ok(self.synthesized(EntryKind::Directory, READ_ONLY_DIR_PERM));
        }
        if state.pending.is_pending_folder(path) {
            return Ok(self.synthesized(EntryKind::Directory, DIR_PERM));
        }
        if state.pending.is_pending_file(path) {
            return Ok(self.synthesized(EntryKind::File, FILE_PERM));
        }

        let object = self
            .resolve(state, path)
            .map_err(|_| FsError::no_such_entry(path))?;

        Ok(match object {
            RemoteObject::File(file) => Attributes {
                kind: EntryKind::File,
                perm: FILE_PERM,
                size: file.size,
                atime: file.updated,
                mtime: file.modified,
                uid: self.owner.uid,
                gid: self.owner.gid,
            },
            RemoteObject::Folder(_) => self.synthesized(EntryKind::Directory, DIR_PERM),
            RemoteObject::MountPoint(_) | RemoteObject::Device(_) => {
                self.synthesized(EntryKind::Directory, READ_ONLY_DIR_PERM)
            }
            RemoteObject::Unknown { kind, .. } => {
                warn!(path, kind = %kind, "unknown remote object type, presenting it as a read-only directory");
                self.synthesized(EntryKind::Directory, READ_ONLY_DIR_PERM)
            }
        })
    }
}
