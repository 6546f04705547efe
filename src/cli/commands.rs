// ABOUTME: Command implementations for the digkit CLI
// ABOUTME: Handles rendering, archiving, uploading and inspecting Digdag projects

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

use super::args::Args;
use crate::api::DigdagClient;
use crate::archive::ProjectArchiver;
use crate::export::WorkflowExporter;
use crate::model::Project;

fn load_project(path: &Path) -> Result<Project> {
    let project = Project::from_file(path)
        .with_context(|| format!("Failed to load project from {}", path.display()))?;
    info!("Loaded project: {}", project.name);
    Ok(project)
}

/// Render the project's workflows as they would appear in the archive
pub fn render_project(project_path: PathBuf, workflow: Option<String>) -> Result<()> {
    let project = load_project(&project_path)?;
    let archiver = ProjectArchiver::new();
    let exporter = WorkflowExporter::new().with_default_image(project.image.as_ref());

    let workflows: Vec<_> = archiver
        .workflows(&project)
        .into_iter()
        .filter(|w| workflow.as_deref().map_or(true, |name| w.name == name))
        .collect();

    if let Some(name) = &workflow {
        if workflows.is_empty() {
            return Err(anyhow::anyhow!(
                "Workflow '{}' not found in project '{}'",
                name,
                project.name
            ));
        }
    }

    for (index, workflow) in workflows.iter().enumerate() {
        let text = exporter
            .export(workflow)
            .with_context(|| format!("Failed to render workflow '{}'", workflow.name))?;

        if index > 0 {
            println!();
        }
        println!("# {}", workflow.file_name());
        print!("{}", text);
    }

    Ok(())
}

/// Write the project archive to disk
pub fn archive_project(project_path: PathBuf, output: PathBuf) -> Result<()> {
    let project = load_project(&project_path)?;
    let content = ProjectArchiver::new()
        .archive(&project)
        .with_context(|| format!("Failed to archive project '{}'", project.name))?;

    std::fs::write(&output, &content)
        .with_context(|| format!("Failed to write archive '{}'", output.display()))?;

    println!("Wrote {} ({} bytes)", output.display(), content.len());
    Ok(())
}

/// Archive the project and upload it as a new revision
pub fn push_project(
    project_path: PathBuf,
    revision: Option<String>,
    schedule_from: Option<String>,
    client: &DigdagClient,
) -> Result<()> {
    let project = load_project(&project_path)?;
    let uploaded = client
        .upload_project(&project, revision.as_deref(), schedule_from.as_deref())
        .with_context(|| format!("Failed to upload project '{}'", project.name))?;

    println!(
        "✓ Uploaded project '{}' (id {}) revision {}",
        uploaded.name, uploaded.id, uploaded.revision
    );
    Ok(())
}

pub fn list_projects(name: Option<String>, client: &DigdagClient) -> Result<()> {
    let projects = client.get_projects(name.as_deref())?;

    for project in &projects {
        println!(
            "{}\t{}\t{}\t{}",
            project.id,
            project.name,
            project.revision,
            project.updated_at.to_rfc3339()
        );
    }
    Ok(())
}

pub fn list_workflows(project_id: Option<String>, client: &DigdagClient) -> Result<()> {
    let workflows = match project_id {
        Some(id) => client.get_project_workflows(&id)?,
        None => client.get_workflows()?,
    };

    for workflow in &workflows {
        println!(
            "{}\t{}\t{}\t{}",
            workflow.id, workflow.project.name, workflow.name, workflow.revision
        );
    }
    Ok(())
}

pub fn list_sessions(client: &DigdagClient) -> Result<()> {
    let sessions = client.get_sessions()?;

    for session in &sessions.sessions {
        let status = match &session.last_attempt {
            Some(attempt) if !attempt.done => "running",
            Some(attempt) if attempt.success => "success",
            Some(_) => "error",
            None => "-",
        };
        println!(
            "{}\t{}/{}\t{}\t{}",
            session.id,
            session.project.name,
            session.workflow.name,
            session.session_time.to_rfc3339(),
            status
        );
    }
    Ok(())
}

pub fn list_attempts(workflow: Option<String>, client: &DigdagClient) -> Result<()> {
    let attempts = match workflow {
        Some(name) => client.get_attempts_by_workflow_name(&name)?,
        None => client.get_attempts()?,
    };

    for attempt in &attempts.attempts {
        println!(
            "{}\t{}\tdone={}\tsuccess={}\t{}",
            attempt.attempt.id,
            attempt.workflow.name,
            attempt.attempt.done,
            attempt.attempt.success,
            attempt.attempt.created_at.to_rfc3339()
        );
    }
    Ok(())
}

pub fn start_attempt(
    workflow_id: String,
    session_time: Option<String>,
    params: Vec<String>,
    client: &DigdagClient,
) -> Result<()> {
    let session_time = session_time
        .map(|time| parse_session_time(&time))
        .transpose()?;
    let params = Args::parse_variables(&params)?;

    let workflow = client
        .get_workflow(&workflow_id)
        .with_context(|| format!("Failed to look up workflow {}", workflow_id))?;
    let parameters = workflow
        .reference()
        .create_attempt_parameters(session_time, Some(params));

    let attempt = client.start_attempt(&parameters)?;
    println!("✓ Started attempt {} of workflow '{}'", attempt.id, workflow.name);
    Ok(())
}

pub fn delete_project(project_id: String, client: &DigdagClient) -> Result<()> {
    let project = client.delete_project(&project_id)?;
    println!("✓ Deleted project '{}' (id {})", project.name, project.id);
    Ok(())
}

fn parse_session_time(value: &str) -> Result<DateTime<Utc>> {
    let time = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid session time '{}'", value))?;
    Ok(time.with_timezone(&Utc))
}
