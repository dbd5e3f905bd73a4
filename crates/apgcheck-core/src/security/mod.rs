//! Security policy applied to entries that pass the path guards.
//!
//! Path guards live in [`crate::types::SafePath`]; this module covers what
//! happens after a target is accepted: permission capping and size budgets.

pub mod permissions;
pub mod quota;

pub use permissions::FILE_MODE;
pub use permissions::sanitize_dir_mode;
pub use quota::QuotaTracker;
