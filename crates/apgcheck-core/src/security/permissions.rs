//! Permission capping for materialized entries.

/// Mode given to every extracted regular file.
///
/// The header mode of file entries is ignored: extracted payloads are never
/// executable, setuid or writable by anyone but the owner.
pub const FILE_MODE: u32 = 0o644;

/// Upper bound for directory permissions taken from the archive.
const DIR_MODE_MAX: u32 = 0o755;

/// Bits every extracted directory keeps so the quarantine tree stays
/// traversable and removable by its owner.
const DIR_MODE_OWNER: u32 = 0o700;

/// Derives the on-disk mode of a directory entry from its header mode.
///
/// Setuid, setgid, sticky and group/world write bits are stripped; owner
/// `rwx` is always set.
///
/// # Examples
///
/// ```
/// use apgcheck_core::security::sanitize_dir_mode;
///
/// assert_eq!(sanitize_dir_mode(0o4777), 0o755);
/// assert_eq!(sanitize_dir_mode(0o500), 0o700);
/// assert_eq!(sanitize_dir_mode(0o750), 0o750);
/// ```
#[inline]
#[must_use]
pub const fn sanitize_dir_mode(mode: u32) -> u32 {
    (mode & DIR_MODE_MAX) | DIR_MODE_OWNER
}
