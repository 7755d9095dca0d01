use super::prelude::*;
use crate::remote::ChildKind;

/// One name yielded by `readdir`, with enough type information for the
/// kernel's `d_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    fn dir(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::Directory }
    }

    fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::File }
    }
}

impl ObjectFs {
    /// Lists `path`: `.` and `..`, then the remote children, then (when
    /// enabled) pending children the remote listing does not show yet.
    ///
    /// The root lists the account's devices and a device lists its mount
    /// points. Tombstoned children are skipped.
    pub fn readdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let mut state = self.lock();
        let mut entries = vec![DirEntry::dir("."), DirEntry::dir("..")];

        if is_root(path) {
            let devices = self.store.devices().map_err(|e| {
                debug!(error = %e, "cannot list devices");
                FsError::no_such_entry(path)
            })?;
            entries.extend(devices.into_iter().map(DirEntry::dir));
            return Ok(entries);
        }

        let object = self
            .resolve(&mut state, path)
            .map_err(|_| FsError::no_such_entry(path))?;
        if object.lists_children() {
            entries.extend(object.live_children().into_iter().map(|child| match child.kind {
                ChildKind::File => DirEntry::file(child.name),
                ChildKind::MountPoint | ChildKind::Folder | ChildKind::Other => DirEntry::dir(child.name),
            }));
        } else if object.has_content() {
            return Err(FsError::denied(path, "readdir"));
        } else if let RemoteObject::Unknown { kind, .. } = &object {
            warn!(path, kind = %kind, "cannot list unknown remote object type");
        }

        // Folders whose creation the remote listing now reflects are no longer pending.
        let confirmed: Vec<String> = state
            .pending
            .folders_in(path)
            .filter(|folder| entries.iter().any(|e| e.name == file_name(folder)))
            .map(str::to_string)
            .collect();
        for folder in confirmed {
            debug!(path = %folder, "pending folder confirmed by remote listing");
            state.pending.discard(&folder);
        }

        if self.options.list_pending_entries {
            let pending: Vec<DirEntry> = state
                .pending
                .folders_in(path)
                .map(|p| DirEntry::dir(file_name(p)))
                .chain(state.pending.files_in(path).map(|p| DirEntry::file(file_name(p))))
                .collect();
            for entry in pending {
                if !entries.iter().any(|e| e.name == entry.name) {
                    entries.push(entry);
                }
            }
        }

        Ok(entries)
    }

    /// Reads up to `size` bytes at `offset`. Short reads happen at end of
    /// content; a pending file reads as empty.
    ///
    /// The whole remote object is downloaded for every call.
    pub fn read(&self, path: &str, size: usize, offset: u64) -> Result<Bytes> {
        let mut state = self.lock();
        if state.pending.is_pending_file(path) {
            return Ok(Bytes::new());
        }

        let object = self
            .resolve(&mut state, path)
            .map_err(|_| FsError::no_such_entry(path))?;
        if !object.has_content() {
            return Err(FsError::denied(path, "read"));
        }

        let content = self.store.read_content(path).map_err(|e| {
            debug!(path, error = %e, "cannot fetch content");
            FsError::no_such_entry(path)
        })?;

        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
        let end = start.saturating_add(size).min(content.len());
        Ok(content.slice(start..end))
    }
}
