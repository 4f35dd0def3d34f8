//! Sentence-building helpers shared by every composer.

pub mod format;
pub mod mapping;
pub mod section;
