// ABOUTME: Archive module packaging Digdag projects for upload
// ABOUTME: Exports the project archiver and project tree staging helpers

pub mod archiver;
pub mod error;
pub mod staging;

pub use archiver::{archive, build_image_workflow, ProjectArchiver, BUILD_IMAGE_WORKFLOW};
pub use error::{ArchiveError, Result};
pub use staging::{copy_tree, should_ignore, DEFAULT_IGNORE};
