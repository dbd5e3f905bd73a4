//! Size budget tracking.

use crate::QuotaResource;
use crate::SecurityConfig;

/// Tracks declared file sizes across one extraction.
///
/// The per-file ceiling always applies. The aggregate budget is only
/// enforced when [`SecurityConfig::max_total_size`] is set.
#[derive(Debug, Default)]
pub struct QuotaTracker {
    files_reserved: usize,
    bytes_reserved: u64,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves room for a regular file of `size` declared bytes.
    ///
    /// Nothing is recorded when the reservation fails.
    ///
    /// # Errors
    ///
    /// Returns the exceeded [`QuotaResource`]; the caller attaches the entry
    /// name.
    pub fn reserve(&mut self, size: u64, config: &SecurityConfig) -> Result<(), QuotaResource> {
        if size > config.max_file_size {
            return Err(QuotaResource::FileSize {
                size,
                max: config.max_file_size,
            });
        }

        let total = self
            .bytes_reserved
            .checked_add(size)
            .ok_or(QuotaResource::IntegerOverflow)?;

        if let Some(max) = config.max_total_size
            && total > max
        {
            return Err(QuotaResource::TotalSize {
                current: total,
                max,
            });
        }

        self.files_reserved += 1;
        self.bytes_reserved = total;
        Ok(())
    }

    /// Returns the number of files reserved so far.
    #[must_use]
    pub fn files_reserved(&self) -> usize {
        self.files_reserved
    }

    /// Returns the total bytes reserved so far.
    #[must_use]
    pub fn bytes_reserved(&self) -> u64 {
        self.bytes_reserved
    }
}
