use super::prelude::*;

/// Outcome of a `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Bytes taken from the caller's buffer; this is what the kernel is told.
    pub accepted: usize,
    /// Total length of the remote object after the upload.
    pub stored_len: u64,
}

/// Largest number of zero bytes `truncate` will append in one call.
pub const MAX_ZERO_FILL: u64 = 1 << 30;

/// Keeps `old[..offset]` and appends `data`. Nothing of `old` past `offset`
/// survives; an offset past the end appends directly after the old content.
pub(crate) fn splice_tail(old: &[u8], data: &[u8], offset: u64) -> Vec<u8> {
    let keep = usize::try_from(offset).map_or(old.len(), |offset| offset.min(old.len()));
    let mut buffer = Vec::with_capacity(keep + data.len());
    buffer.extend_from_slice(&old[..keep]);
    buffer.extend_from_slice(data);
    buffer
}

/// `old` cut or zero-extended to `size` bytes.
fn resized(path: &str, mut old: Vec<u8>, size: u64) -> Result<Vec<u8>> {
    let current = old.len() as u64;
    if size > current.saturating_add(MAX_ZERO_FILL) {
        return Err(FsError::TooLarge { path: path.to_string(), size });
    }
    let size = usize::try_from(size).map_err(|_| FsError::TooLarge { path: path.to_string(), size })?;
    old.resize(size, 0);
    Ok(old)
}

impl ObjectFs {
    /// Writes `data` at `offset` by rewriting the whole remote object.
    ///
    /// The first write to a pending file uploads `data` as its whole content
    /// and commits it. Any other write downloads the current content, cuts it
    /// at `offset`, appends `data` and uploads the result.
    pub fn write(&self, path: &str, data: &[u8], offset: u64) -> Result<Written> {
        if is_blacklisted(path) {
            return Err(FsError::Rejected { path: path.to_string() });
        }
        let mut state = self.lock();

        let old = if state.pending.is_pending_file(path) {
            Bytes::new()
        } else {
            self.current_content(&mut state, path)?
        };

        let buffer = splice_tail(&old, data, offset);
        let stored_len = buffer.len() as u64;
        self.upload(&mut state, path, buffer)?;
        Ok(Written { accepted: data.len(), stored_len })
    }

    /// Sets the length of `path` to `size`, cutting or zero-extending it.
    /// Growing by more than `MAX_ZERO_FILL` fails with `TooLarge`.
    pub fn truncate(&self, path: &str, size: u64) -> Result<()> {
        if is_blacklisted(path) {
            return Err(FsError::Rejected { path: path.to_string() });
        }
        let mut state = self.lock();

        let old = if state.pending.is_pending_file(path) {
            if size == 0 {
                return Ok(());
            }
            Vec::new()
        } else {
            self.current_content(&mut state, path)?.to_vec()
        };

        let buffer = resized(path, old, size)?;
        self.upload(&mut state, path, buffer)
    }

    fn current_content(&self, state: &mut State, path: &str) -> Result<Bytes> {
        let object = self
            .resolve(state, path)
            .map_err(|_| FsError::no_such_entry(path))?;
        if !object.has_content() {
            return Err(FsError::denied(path, "write"));
        }
        self.store.read_content(path).map_err(|e| {
            debug!(path, error = %e, "cannot fetch content for rewrite");
            FsError::no_such_entry(path)
        })
    }

    /// Replaces the remote content of `path`, committing it if it was pending.
    fn upload(&self, state: &mut State, path: &str, buffer: Vec<u8>) -> Result<()> {
        let len = buffer.len();
        self.store.write_content(path, Bytes::from(buffer)).map_err(|e| {
            debug!(path, error = %e, "upload failed");
            FsError::no_such_entry(path)
        })?;

        if state.pending.commit_file(path) {
            debug!(path, len, "pending file committed");
        }
        self.mark_mutated(state, path);
        Ok(())
    }
}
