use super::prelude::*;

impl ObjectFs {
    /// Removes `path`. Serves both `unlink` and `rmdir`.
    ///
    /// A pending path is only dropped from the tracker, with no remote call.
    pub fn unlink(&self, path: &str) -> Result<()> {
        let mut state = self.lock();
        if state.pending.discard(path) {
            debug!(path, "discarded pending entry");
            return Ok(());
        }

        self.resolve(&mut state, path)
            .map_err(|_| FsError::no_such_entry(path))?;
        self.store.delete(path).map_err(|e| {
            debug!(path, error = %e, "remote delete failed");
            FsError::no_such_entry(path)
        })?;
        self.mark_removed(&mut state, path);
        Ok(())
    }
}
