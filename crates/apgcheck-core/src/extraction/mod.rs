//! Streaming extraction of xz-compressed tar packages.

pub mod engine;
pub mod stream;

pub use engine::Extractor;
pub use stream::PackageStream;
pub use stream::open_package;
