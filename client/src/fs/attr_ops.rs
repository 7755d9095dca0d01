use super::prelude::*;
use super::statfs::BLOCK_SIZE;

/// Converts a synthesized record into the `FileAttr` the kernel expects.
pub fn to_file_attr(ino: u64, attrs: &Attributes) -> FileAttr {
    let (kind, nlink) = match attrs.kind {
        EntryKind::File => (FileType::RegularFile, 1),
        EntryKind::Directory => (FileType::Directory, 2),
    };
    FileAttr {
        ino,
        size: attrs.size,
        blocks: attrs.size.div_ceil(BLOCK_SIZE),
        atime: attrs.atime,
        mtime: attrs.mtime,
        ctime: attrs.mtime,
        crtime: attrs.mtime,
        kind,
        perm: attrs.perm,
        nlink,
        uid: attrs.uid,
        gid: attrs.gid,
        rdev: 0,
        flags: 0,
        blksize: BLOCK_SIZE as u32,
    }
}

/// FUSE `getattr`: resolves the inode to a path and synthesizes its attributes.
pub fn getattr(fs: &mut MountedFs, _req: &Request, ino: u64, reply: ReplyAttr) {
    let Some(path) = fs.inodes.path(ino).map(str::to_string) else {
        reply.error(ENOENT);
        return;
    };
    debug!(ino, path = %path, "getattr");
    match fs.core.getattr(&path) {
        Ok(attrs) => reply.attr(&fs.ttl, &to_file_attr(ino, &attrs)),
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `setattr`.
///
/// Only size changes are applied (as a truncate). Mode, owner and timestamps
/// are fixed by the mount and silently kept.
pub fn setattr(fs: &mut MountedFs, _req: &Request<'_>, ino: u64, _mode: Option<u32>, _uid: Option<u32>, _gid: Option<u32>, size: Option<u64>, _atime: Option<TimeOrNow>, _mtime: Option<TimeOrNow>, _ctime: Option<SystemTime>, _fh: Option<u64>, _crtime: Option<SystemTime>, _chgtime: Option<SystemTime>, _bkuptime: Option<SystemTime>, _flags: Option<u32>, reply: ReplyAttr) {
    let Some(path) = fs.inodes.path(ino).map(str::to_string) else {
        reply.error(ENOENT);
        return;
    };
    debug!(ino, path = %path, ?size, "setattr");

    if let Some(size) = size {
        if let Err(e) = fs.core.truncate(&path, size) {
            reply.error(e.to_errno());
            return;
        }
    }

    match fs.core.getattr(&path) {
        Ok(attrs) => reply.attr(&fs.ttl, &to_file_attr(ino, &attrs)),
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `statfs`: account usage as block counts.
pub fn statfs(fs: &mut MountedFs, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
    match fs.core.statfs() {
        Ok(stats) => reply.statfs(
            stats.blocks,
            stats.blocks_free,
            stats.blocks_available,
            stats.files,
            stats.files_free,
            stats.block_size,
            stats.name_max,
            stats.fragment_size,
        ),
        Err(e) => {
            warn!(error = %e, "statfs failed");
            reply.error(e.to_errno());
        }
    }
}
