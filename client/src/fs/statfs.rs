use super::prelude::*;
use crate::remote::AccountUsage;

/// Block size reported to the kernel. macOS wants a power of two, at least 512.
pub const BLOCK_SIZE: u64 = 512;
/// Smallest total size shown for an account without a quota (1 TiB).
pub const UNLIMITED_FLOOR: u64 = 1 << 40;
const NAME_MAX: u32 = 255;

/// The `statvfs` figures for the mounted account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub block_size: u32,
    pub fragment_size: u32,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_available: u64,
    pub files: u64,
    pub files_free: u64,
    pub name_max: u32,
}

/// Converts account usage into block counts. An unlimited account is shown
/// as twice its usage, but never smaller than `UNLIMITED_FLOOR`.
pub fn capacity_stats(account: AccountUsage) -> FsStats {
    let total = account
        .capacity
        .unwrap_or_else(|| account.usage.saturating_mul(2).max(UNLIMITED_FLOOR));
    let free = total.saturating_sub(account.usage) / BLOCK_SIZE;

    FsStats {
        block_size: BLOCK_SIZE as u32,
        fragment_size: BLOCK_SIZE as u32,
        blocks: total / BLOCK_SIZE,
        blocks_free: free,
        blocks_available: free,
        files: 0,
        files_free: 0,
        name_max: NAME_MAX,
    }
}

impl ObjectFs {
    pub fn statfs(&self) -> Result<FsStats> {
        let account = self.store.account().map_err(|e| FsError::NoAccess { reason: e.to_string() })?;
        Ok(capacity_stats(account))
    }
}
