//! Type-safe wrappers for package extraction.
//!
//! Targets are validated on construction: a [`SafePath`] cannot exist
//! without passing the path guards against a prepared [`DestDir`].

pub mod dest_dir;
pub mod entry_kind;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry_kind::EntryKind;
pub use safe_path::SafePath;
pub use safe_path::clean_name;
