// ABOUTME: Packages rendered workflows and project files into a tar.gz archive
// ABOUTME: Stages everything in a temporary directory that is removed on every exit path

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::Path;
use tar::Builder;
use tracing::{debug, info, warn};

use super::error::{ArchiveError, Result};
use super::staging::copy_tree;
use crate::export::WorkflowExporter;
use crate::model::{ContainerImage, Project, Task, Workflow};

/// Name of the workflow (and its single task) that builds the project image.
pub const BUILD_IMAGE_WORKFLOW: &str = "build-image";

/// Gzip level used for every project archive.
pub const COMPRESSION_LEVEL: u32 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectArchiver;

/// Archive a project with the default archiver.
pub fn archive(project: &Project) -> Result<Vec<u8>> {
    ProjectArchiver::new().archive(project)
}

pub fn build_image_workflow(image: &ContainerImage) -> Workflow {
    Workflow::new(BUILD_IMAGE_WORKFLOW)
        .with_task(Task::build_image(BUILD_IMAGE_WORKFLOW, image.clone()))
}

impl ProjectArchiver {
    pub fn new() -> Self {
        Self
    }

    /// Workflows written to the archive: the project's own plus the image
    /// build workflow when an image is declared. The project is not modified.
    pub fn workflows(&self, project: &Project) -> Vec<Workflow> {
        let mut workflows = project.workflows.clone();

        if let Some(image) = &project.image {
            if project.workflow(BUILD_IMAGE_WORKFLOW).is_some() {
                warn!(
                    "Project '{}' already defines '{}', not adding the image build workflow",
                    project.name, BUILD_IMAGE_WORKFLOW
                );
            } else {
                workflows.push(build_image_workflow(image));
            }
        }

        workflows
    }

    /// Build the gzip-compressed GNU tar archive for `project`.
    pub fn archive(&self, project: &Project) -> Result<Vec<u8>> {
        info!("Archiving project '{}'", project.name);

        let workflows = self.workflows(project);
        let rendered = self.render_all(project, &workflows)?;

        let staging = tempfile::Builder::new().prefix("digkit-").tempdir()?;
        debug!("Staging project in {}", staging.path().display());

        self.stage(project, &rendered, staging.path())?;
        let content = Self::build_archive(staging.path())?;

        // Dropping the TempDir on error paths removes it too; close() surfaces
        // cleanup failures on the success path.
        staging.close()?;

        info!(
            "Archived project '{}': {} workflows, {} bytes",
            project.name,
            rendered.len(),
            content.len()
        );

        Ok(content)
    }

    /// Render every workflow before touching the filesystem so a bad task
    /// aborts the archive with nothing staged.
    fn render_all(
        &self,
        project: &Project,
        workflows: &[Workflow],
    ) -> Result<Vec<(String, String)>> {
        let exporter = WorkflowExporter::new().with_default_image(project.image.as_ref());

        workflows
            .iter()
            .map(|workflow| {
                let text = exporter.export(workflow).map_err(|source| ArchiveError::RenderError {
                    workflow: workflow.name.clone(),
                    source,
                })?;
                Ok((workflow.file_name(), text))
            })
            .collect()
    }

    fn stage(
        &self,
        project: &Project,
        rendered: &[(String, String)],
        staging: &Path,
    ) -> Result<()> {
        for (file_name, text) in rendered {
            fs::write(staging.join(file_name), text)?;
            debug!("Staged {}", file_name);
        }

        if let Some(root) = &project.root {
            if !root.path.is_dir() {
                return Err(ArchiveError::MissingRoot(root.path.clone()));
            }

            let stats = copy_tree(&root.path, staging, &root.ignore)?;
            debug!(
                "Copied project tree {}: {} files, {} bytes",
                root.path.display(),
                stats.files_copied,
                stats.bytes_copied
            );
        }

        Ok(())
    }

    fn build_archive(staging: &Path) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
        let mut tar_builder = Builder::new(encoder);

        let mut entries = fs::read_dir(staging)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();

            if path.is_dir() {
                tar_builder.append_dir_all(&name, &path)?;
            } else {
                tar_builder.append_path_with_name(&path, &name)?;
            }

            debug!("Added to archive: {}", name.to_string_lossy());
        }

        let encoder = tar_builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageConfiguration;

    #[test]
    fn test_image_adds_build_workflow_without_mutating_project() {
        let image = ContainerImage::new(ImageConfiguration::with_tag("etl", "v1"));
        let project = Project::new("p")
            .with_workflow(Workflow::new("main"))
            .with_image(image);

        let workflows = ProjectArchiver::new().workflows(&project);

        assert_eq!(workflows.len(), 2);
        assert_eq!(workflows[1].name, BUILD_IMAGE_WORKFLOW);
        assert_eq!(project.workflows.len(), 1);
    }

    #[test]
    fn test_no_image_no_extra_workflow() {
        let project = Project::new("p").with_workflow(Workflow::new("main"));
        assert_eq!(ProjectArchiver::new().workflows(&project).len(), 1);
    }

    #[test]
    fn test_existing_build_workflow_is_kept() {
        let image = ContainerImage::new(ImageConfiguration::with_tag("etl", "v1"));
        let project = Project::new("p")
            .with_workflow(Workflow::new(BUILD_IMAGE_WORKFLOW))
            .with_image(image);
        assert_eq!(ProjectArchiver::new().workflows(&project).len(), 1);
    }

    #[test]
    fn test_missing_root_is_reported() {
        let project = Project::new("p")
            .with_workflow(Workflow::new("main"))
            .with_root(crate::model::ProjectRoot::new("/definitely/not/here"));
        assert!(matches!(
            archive(&project),
            Err(ArchiveError::MissingRoot(_))
        ));
    }
}
