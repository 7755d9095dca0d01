use thiserror::Error;

/// Errors the filesystem adapter reports to the kernel bridge.
///
/// Remote failures are folded into these variants at the adapter boundary;
/// no `StorageError` detail travels further.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsError {
    #[error("refusing to touch blacklisted path {path}")]
    Rejected { path: String },

    #[error("no such entry: {path}")]
    NoSuchEntry { path: String },

    #[error("permission denied for {op} on {path}")]
    PermissionDenied { path: String, op: &'static str },

    #[error("remote account unavailable: {reason}")]
    NoAccess { reason: String },

    #[error("cannot grow {path} to {size} bytes")]
    TooLarge { path: String, size: u64 },
}

pub type Result<T> = std::result::Result<T, FsError>;

impl FsError {
    pub(crate) fn no_such_entry(path: &str) -> Self {
        FsError::NoSuchEntry { path: path.to_string() }
    }

    pub(crate) fn denied(path: &str, op: &'static str) -> Self {
        FsError::PermissionDenied { path: path.to_string(), op }
    }

    pub fn to_errno(&self) -> i32 {
        use libc::*;
        match self {
            FsError::Rejected { .. } => EPERM,
            FsError::NoSuchEntry { .. } => ENOENT,
            FsError::PermissionDenied { .. } => EACCES,
            FsError::NoAccess { .. } => EACCES,
            FsError::TooLarge { .. } => EFBIG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_errno() {
        let err = FsError::Rejected { path: "/a/.DS_Store".into() };
        assert_eq!(err.to_errno(), libc::EPERM);
    }

    #[test]
    fn test_no_such_entry_errno() {
        assert_eq!(FsError::no_such_entry("/x").to_errno(), libc::ENOENT);
    }

    #[test]
    fn test_permission_denied_errno() {
        assert_eq!(FsError::denied("/Dev/new", "mkdir").to_errno(), libc::EACCES);
    }

    #[test]
    fn test_no_access_errno() {
        let err = FsError::NoAccess { reason: "timeout".into() };
        assert_eq!(err.to_errno(), libc::EACCES);
    }

    #[test]
    fn test_too_large_errno() {
        let err = FsError::TooLarge { path: "/Dev/Sync/big".into(), size: u64::MAX };
        assert_eq!(err.to_errno(), libc::EFBIG);
    }

    #[test]
    fn test_display_names_the_path() {
        let msg = FsError::denied("/Dev/new", "mkdir").to_string();
        assert!(msg.contains("/Dev/new"));
        assert!(msg.contains("mkdir"));
    }
}
