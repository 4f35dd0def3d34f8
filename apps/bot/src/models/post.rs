use std::path::PathBuf;

/// Text for one post plus the image files meant to go with it.
///
/// Image paths are not guaranteed to exist; the runner checks the filesystem
/// before uploading.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPost {
    pub message: String,
    pub images: Vec<PathBuf>,
}
