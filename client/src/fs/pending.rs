use crate::path::parent_of;

/// Paths created locally that the remote account does not know about yet.
///
/// A pending file exists only here until its first write uploads it. A
/// pending folder already exists remotely but may not show up in cached
/// listings, so it is kept until a listing of its parent confirms it. A
/// path is never pending as both a file and a folder.
#[derive(Debug, Default)]
pub struct PendingTracker {
    files: Vec<String>,
    folders: Vec<String>,
}

impl PendingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `path` as a pending file and returns its position, which the
    /// bridge hands out as a file handle. Re-staging returns the existing
    /// position.
    pub fn stage_file(&mut self, path: &str) -> usize {
        if let Some(index) = self.files.iter().position(|p| p == path) {
            return index;
        }
        self.files.push(path.to_string());
        self.files.len() - 1
    }

    pub fn stage_folder(&mut self, path: &str) {
        self.files.retain(|p| p != path);
        if !self.is_pending_folder(path) {
            self.folders.push(path.to_string());
        }
    }

    pub fn is_pending_file(&self, path: &str) -> bool {
        self.files.iter().any(|p| p == path)
    }

    pub fn is_pending_folder(&self, path: &str) -> bool {
        self.folders.iter().any(|p| p == path)
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.is_pending_file(path) || self.is_pending_folder(path)
    }

    /// Drops `path` from the pending files once its content is stored remotely.
    pub fn commit_file(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|p| p != path);
        self.files.len() != before
    }

    /// Drops `path` from whichever pending list holds it.
    pub fn discard(&mut self, path: &str) -> bool {
        let before = self.files.len() + self.folders.len();
        self.files.retain(|p| p != path);
        self.folders.retain(|p| p != path);
        self.files.len() + self.folders.len() != before
    }

    /// Pending files directly inside `dir`.
    pub fn files_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.files.iter().map(String::as_str).filter(move |p| parent_of(p) == dir)
    }

    /// Pending folders directly inside `dir`.
    pub fn folders_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.folders.iter().map(String::as_str).filter(move |p| parent_of(p) == dir)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_file_is_idempotent() {
        let mut pending = PendingTracker::new();
        assert_eq!(pending.stage_file("/Dev/Sync/a.txt"), 0);
        assert_eq!(pending.stage_file("/Dev/Sync/b.txt"), 1);
        assert_eq!(pending.stage_file("/Dev/Sync/a.txt"), 0);
        assert_eq!(pending.files().len(), 2);
    }

    #[test]
    fn test_commit_removes_only_files() {
        let mut pending = PendingTracker::new();
        pending.stage_file("/Dev/Sync/a.txt");
        pending.stage_folder("/Dev/Sync/dir");
        assert!(pending.commit_file("/Dev/Sync/a.txt"));
        assert!(!pending.commit_file("/Dev/Sync/dir"));
        assert!(!pending.is_pending_file("/Dev/Sync/a.txt"));
        assert!(pending.is_pending_folder("/Dev/Sync/dir"));
    }

    #[test]
    fn test_discard_handles_both_kinds() {
        let mut pending = PendingTracker::new();
        pending.stage_file("/Dev/Sync/a.txt");
        pending.stage_folder("/Dev/Sync/dir");
        assert!(pending.discard("/Dev/Sync/a.txt"));
        assert!(pending.discard("/Dev/Sync/dir"));
        assert!(!pending.discard("/Dev/Sync/dir"));
        assert!(!pending.is_pending("/Dev/Sync/a.txt"));
        assert!(!pending.is_pending("/Dev/Sync/dir"));
    }

    #[test]
    fn test_folder_replaces_file_of_same_path() {
        let mut pending = PendingTracker::new();
        pending.stage_file("/Dev/Sync/x");
        pending.stage_folder("/Dev/Sync/x");
        pending.stage_folder("/Dev/Sync/x");
        assert!(!pending.is_pending_file("/Dev/Sync/x"));
        assert_eq!(pending.folders_in("/Dev/Sync").count(), 1);
    }

    #[test]
    fn test_children_are_direct_only() {
        let mut pending = PendingTracker::new();
        pending.stage_file("/Dev/Sync/a.txt");
        pending.stage_file("/Dev/Sync/dir/b.txt");
        pending.stage_folder("/Dev/Sync/dir");
        let files: Vec<_> = pending.files_in("/Dev/Sync").collect();
        assert_eq!(files, vec!["/Dev/Sync/a.txt"]);
        let folders: Vec<_> = pending.folders_in("/Dev/Sync").collect();
        assert_eq!(folders, vec!["/Dev/Sync/dir"]);
    }
}
