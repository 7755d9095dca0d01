use super::prelude::*;
use super::attr_ops::to_file_attr;

/// FUSE `lookup`: builds the child path and synthesizes its attributes.
pub fn lookup(fs: &mut MountedFs, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
    let Some(path) = fs.inodes.child_path(parent, name) else {
        reply.error(ENOENT);
        return;
    };
    debug!(parent, path = %path, "lookup");

    match fs.core.getattr(&path) {
        Ok(attrs) => {
            let ino = fs.inodes.lookup_or_insert(&path);
            reply.entry(&fs.ttl, &to_file_attr(ino, &attrs), 0);
        }
        Err(e) => reply.error(e.to_errno()),
    }
}

/// FUSE `readdir`.
///
/// The listing is rebuilt on every call; `offset` skips the entries already
/// returned so large directories can span several calls.
pub fn readdir(fs: &mut MountedFs, _req: &Request, ino: u64, _fh: u64, offset: i64, mut reply: ReplyDirectory) {
    let Some(dir_path) = fs.inodes.path(ino).map(str::to_string) else {
        reply.error(ENOENT);
        return;
    };
    debug!(ino, path = %dir_path, offset, "readdir");

    let entries = match fs.core.readdir(&dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            reply.error(e.to_errno());
            return;
        }
    };

    let parent_ino = fs.inodes.parent_ino(ino);
    for (i, entry) in entries.into_iter().enumerate().skip(offset.max(0) as usize) {
        let entry_ino = match entry.name.as_str() {
            "." => ino,
            ".." => parent_ino,
            name => fs.inodes.listing_ino(&join(&dir_path, name)),
        };
        let kind = match entry.kind {
            EntryKind::File => FileType::RegularFile,
            EntryKind::Directory => FileType::Directory,
        };
        if reply.add(entry_ino, (i + 1) as i64, kind, &entry.name) {
            // Buffer is full
            break;
        }
    }
    reply.ok();
}

/// FUSE `read`: replies with the requested window of the remote content.
pub fn read(fs: &mut MountedFs, _req: &Request<'_>, ino: u64, _fh: u64, offset: i64, size: u32, _flags: i32, _lock_owner: Option<u64>, reply: ReplyData) {
    let Some(path) = fs.inodes.path(ino).map(str::to_string) else {
        reply.error(ENOENT);
        return;
    };
    if offset < 0 {
        reply.error(EINVAL);
        return;
    }
    debug!(ino, path = %path, offset, size, "read");

    match fs.core.read(&path, size as usize, offset as u64) {
        Ok(data) => reply.data(&data),
        Err(e) => reply.error(e.to_errno()),
    }
}
