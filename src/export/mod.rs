// ABOUTME: Export module rendering workflow trees into Digdag .dig text
// ABOUTME: Exports command resolution, directive rendering and the workflow exporter

pub mod command;
pub mod directive;
pub mod error;
pub mod exporter;
pub mod writer;

pub use command::{build_image_command, container_start_command, merge_exports, resolve_command};
pub use error::{ExportError, Result};
pub use exporter::{call_target, render, WorkflowExporter};
