//! Filesystem abstraction for polsync
//!
//! Provides normalized path handling, bounded text reads, and
//! format-detecting document loading for definition and fixture files.

pub mod document;
pub mod error;
pub mod io;
pub mod path;

pub use document::{Document, DocumentFormat};
pub use error::{Error, Result};
pub use path::NormalizedPath;
