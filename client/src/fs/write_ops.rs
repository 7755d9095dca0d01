use super::prelude::*;
use super::attr_ops::to_file_attr;

/// FUSE `write`. The kernel is told how many bytes of `data` were taken,
/// not the new length of the file.
pub fn write(fs: &mut MountedFs, _req: &Request<'_>, ino: u64, _fh: u64, offset: i64, data: &[u8], _write_flags: u32, _flags: i32, _lock_owner: Option<u64>, reply: ReplyWrite) {
    let Some(path) = fs.inodes.path(ino).map(str::to_string) else {
        reply.error(ENOENT);
        return;
    };
    if offset < 0 {
        reply.error(EINVAL);
        return;
    }
    debug!(ino, path = %path, offset, len = data.len(), "write");

    match fs.core.write(&path, data, offset as u64) {
        Ok(written) => reply.written(written.accepted as u32),
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `create`: stages a pending file and hands its index out as the handle.
pub fn create(fs: &mut MountedFs, _req: &Request<'_>, parent: u64, name: &OsStr, mode: u32, _umask: u32, _flags: i32, reply: ReplyCreate) {
    let Some(path) = fs.inodes.child_path(parent, name) else {
        reply.error(ENOENT);
        return;
    };
    debug!(parent, path = %path, "create");

    let created = fs.core.create(&path, mode).and_then(|fh| Ok((fh, fs.core.getattr(&path)?)));
    match created {
        Ok((fh, attrs)) => {
            let ino = fs.inodes.lookup_or_insert(&path);
            reply.created(&fs.ttl, &to_file_attr(ino, &attrs), 0, fh, 0);
        }
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `mkdir`.
pub fn mkdir(fs: &mut MountedFs, _req: &Request<'_>, parent: u64, name: &OsStr, mode: u32, _umask: u32, reply: ReplyEntry) {
    let Some(path) = fs.inodes.child_path(parent, name) else {
        reply.error(ENOENT);
        return;
    };
    debug!(parent, path = %path, "mkdir");

    match fs.core.mkdir(&path, mode).and_then(|()| fs.core.getattr(&path)) {
        Ok(attrs) => {
            let ino = fs.inodes.lookup_or_insert(&path);
            reply.entry(&fs.ttl, &to_file_attr(ino, &attrs), 0);
        }
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `unlink`.
pub fn unlink(fs: &mut MountedFs, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
    let Some(path) = fs.inodes.child_path(parent, name) else {
        reply.error(ENOENT);
        return;
    };
    debug!(parent, path = %path, "unlink");

    match fs.core.unlink(&path) {
        Ok(()) => {
            fs.inodes.remove(&path);
            reply.ok();
        }
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `rmdir`. Folders are removed exactly like files.
pub fn rmdir(fs: &mut MountedFs, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
    unlink(fs, req, parent, name, reply);
}
