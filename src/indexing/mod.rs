pub mod builder;
pub mod walker;

pub use builder::{BuildReport, CancelToken, FileError, IndexBuilder, RecordError};
pub use walker::FileWalker;
