//! Security configuration for package extraction and validation.

/// Default ceiling for a single extracted file (500 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Default ceiling for the cleaned length of an entry name, in bytes.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

/// Resource limits applied while extracting and validating a package.
///
/// Link entries, absolute names and `..` segments are always rejected; they
/// are not configurable.
///
/// # Examples
///
/// ```
/// use apgcheck_core::SecurityConfig;
///
/// // Use the reference limits
/// let config = SecurityConfig::default();
///
/// // Opt in to an aggregate budget across all entries
/// let custom = SecurityConfig {
///     max_total_size: Some(2 * 1024 * 1024 * 1024), // 2 GiB
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Maximum declared size of a single regular file in bytes.
    pub max_file_size: u64,

    /// Maximum total size of all extracted files in bytes.
    ///
    /// `None` leaves the aggregate unbounded; only the per-file ceiling
    /// applies.
    pub max_total_size: Option<u64>,

    /// Maximum length of a cleaned entry name in bytes.
    pub max_name_length: usize,

    /// Maximum size of `metadata.json` the validator will read.
    pub max_metadata_size: u64,
}

impl Default for SecurityConfig {
    /// Creates a `SecurityConfig` with the reference limits.
    ///
    /// Default values:
    /// - `max_file_size`: 500 MiB
    /// - `max_total_size`: none
    /// - `max_name_length`: 255
    /// - `max_metadata_size`: 500 MiB
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: None,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            max_metadata_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl SecurityConfig {
    /// Returns a copy with an aggregate size budget.
    #[must_use]
    pub fn with_max_total_size(mut self, max: u64) -> Self {
        self.max_total_size = Some(max);
        self
    }
}
