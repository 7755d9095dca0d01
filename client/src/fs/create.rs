use super::prelude::*;

impl ObjectFs {
    /// Stages `path` as a pending file. Nothing reaches the remote side until
    /// the first `write`. Returns the staged index, which doubles as the file
    /// handle.
    pub fn create(&self, path: &str, _mode: u32) -> Result<u64> {
        if is_blacklisted(path) {
            return Err(FsError::Rejected { path: path.to_string() });
        }
        let mut state = self.lock();
        if state.pending.is_pending_folder(path) {
            return Err(FsError::denied(path, "create"));
        }

        let index = state.pending.stage_file(path);
        debug!(path, index, "staged pending file");
        Ok(index as u64)
    }

    /// Creates a folder remotely. The parent must be an existing folder.
    pub fn mkdir(&self, path: &str, _mode: u32) -> Result<()> {
        if is_blacklisted(path) {
            return Err(FsError::Rejected { path: path.to_string() });
        }
        let mut state = self.lock();
        let parent = parent_of(path);
        if is_root(parent) {
            return Err(FsError::denied(path, "mkdir"));
        }

        let parent_object = self
            .resolve(&mut state, parent)
            .map_err(|_| FsError::no_such_entry(parent))?;
        if !parent_object.accepts_folders() {
            return Err(FsError::denied(path, "mkdir"));
        }

        self.store.mkdir(path).map_err(|e| {
            debug!(path, error = %e, "remote mkdir failed");
            FsError::no_such_entry(path)
        })?;
        self.mark_mutated(&mut state, path);
        state.pending.stage_folder(path);
        Ok(())
    }
}
