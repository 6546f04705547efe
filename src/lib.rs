// ABOUTME: Main library module for the digkit Digdag toolkit
// ABOUTME: Exports the workflow model, exporter, archiver, API client and CLI

pub mod api;
pub mod archive;
pub mod cli;
pub mod export;
pub mod model;

// Re-export commonly used types
pub use api::{ApiError, DigdagClient};
pub use archive::{ArchiveError, ProjectArchiver};
pub use cli::{App, Args, Config};
pub use export::{render, ExportError, WorkflowExporter};
pub use model::{ContainerImage, ModelError, Project, Schedule, Task, Workflow};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
