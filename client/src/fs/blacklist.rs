//! Junk names that host operating systems look for or drop into every
//! directory. They are never looked up remotely and never created.

use crate::path::file_name;

pub const BLACKLISTED_PREFIXES: &[&str] = &[
    ".hidden",
    "._",
    ".DS_Store",
    ".Trash",
    ".Spotlight-",
    ".hotfiles-btree",
    "lost+found",
    "Backups.backupdb",
    "mach_kernel",
];

/// True when the final segment of `path` starts with a blacklisted prefix.
pub fn is_blacklisted(path: &str) -> bool {
    let name = file_name(path);
    BLACKLISTED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_metadata_is_blacklisted() {
        assert!(is_blacklisted("/Dev/Sync/.DS_Store"));
        assert!(is_blacklisted("/Dev/Sync/._report.pdf"));
        assert!(is_blacklisted("/Dev/.Trashes"));
        assert!(is_blacklisted("/Dev/Sync/.Spotlight-V100"));
        assert!(is_blacklisted("/lost+found"));
    }

    #[test]
    fn test_only_the_final_segment_counts() {
        assert!(!is_blacklisted("/Dev/.Trash-stuff/report.pdf"));
        assert!(!is_blacklisted("/Dev/Sync/report.pdf"));
        assert!(!is_blacklisted("/Dev/Sync/notes._txt"));
        assert!(!is_blacklisted("/"));
    }
}
