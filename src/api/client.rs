// ABOUTME: Blocking HTTP client for the Digdag REST API
// ABOUTME: Lists workflows, sessions and attempts, starts attempts and uploads project archives

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::{ApiError, Result};
use super::models::{
    Attempt, AttemptParameters, Attempts, Project, ProjectRevisions, Projects, Session,
    SessionAttempts, Sessions, Workflow, WorkflowAttempt, Workflows,
};
use crate::archive::ProjectArchiver;
use crate::model;

#[derive(Debug, Clone)]
pub struct DigdagClient {
    host: String,
    http_client: Client,
}

impl DigdagClient {
    /// `host` may point at the server root or already at its `/api` path.
    pub fn new(host: &str) -> Self {
        Self::with_client(host, Client::new())
    }

    pub fn with_client(host: &str, http_client: Client) -> Self {
        Self {
            host: Self::normalize_host(host),
            http_client,
        }
    }

    pub fn normalize_host(host: &str) -> String {
        let host = host.trim_end_matches('/');
        if host.ends_with("/api") {
            host.to_string()
        } else {
            format!("{}/api", host)
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn make_url(&self, parts: &[&str]) -> String {
        let path: Vec<&str> = parts
            .iter()
            .map(|part| part.trim_matches('/'))
            .filter(|part| !part.is_empty())
            .collect();
        format!("{}/{}", self.host, path.join("/"))
    }

    fn get<T: DeserializeOwned>(&self, parts: &[&str]) -> Result<T> {
        let url = self.make_url(parts);
        debug!("GET {}", url);
        Self::send_json(self.http_client.get(&url))
    }

    fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check_status(request.send()?)?;
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                debug!("Failed to read body of {} response: {}", status, err);
                String::new()
            }
        };
        Err(ApiError::Transport {
            status: status.as_u16(),
            body,
        })
    }

    pub fn get_workflows(&self) -> Result<Workflows> {
        self.get(&["workflows"])
    }

    pub fn get_workflow(&self, id: &str) -> Result<Workflow> {
        self.get(&["workflows", id])
    }

    pub fn get_workflow_by_name(&self, name: &str) -> Result<Workflow> {
        self.get_workflows()?.filter_by_name(name).cloned()
    }

    pub fn get_sessions(&self) -> Result<Sessions> {
        self.get(&["sessions"])
    }

    pub fn get_session(&self, id: &str) -> Result<Session> {
        self.get(&["sessions", id])
    }

    pub fn get_session_attempts(&self, id: &str) -> Result<SessionAttempts> {
        self.get(&["sessions", id, "attempts"])
    }

    pub fn get_attempts(&self) -> Result<Attempts> {
        self.get(&["attempts"])
    }

    pub fn get_attempts_by_workflow_name(&self, name: &str) -> Result<Attempts> {
        Ok(self.get_attempts()?.for_workflow(name))
    }

    pub fn get_attempt(&self, id: &str) -> Result<WorkflowAttempt> {
        self.get(&["attempts", id])
    }

    pub fn start_attempt(&self, parameters: &AttemptParameters) -> Result<Attempt> {
        let url = self.make_url(&["attempts"]);
        info!("Starting attempt for workflow {}", parameters.workflow_id);
        Self::send_json(self.http_client.put(&url).json(parameters))
    }

    /// Upload an already built archive as a new project revision.
    pub fn upload_project_archive(
        &self,
        content: Vec<u8>,
        project_name: &str,
        revision: &str,
        schedule_from: Option<&str>,
    ) -> Result<Project> {
        let url = self.make_url(&["projects"]);

        let mut query = vec![("project", project_name), ("revision", revision)];
        if let Some(schedule_from) = schedule_from {
            query.push(("schedule_from", schedule_from));
        }

        info!(
            "Uploading project '{}' revision {} ({} bytes)",
            project_name,
            revision,
            content.len()
        );

        Self::send_json(
            self.http_client
                .put(&url)
                .query(&query)
                .header(CONTENT_TYPE, "application/gzip")
                .body(content),
        )
    }

    /// Archive `project` and upload it. A random revision is used when none is given.
    pub fn upload_project(
        &self,
        project: &model::Project,
        revision: Option<&str>,
        schedule_from: Option<&str>,
    ) -> Result<Project> {
        let revision = revision
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let content = ProjectArchiver::new().archive(project)?;
        self.upload_project_archive(content, &project.name, &revision, schedule_from)
    }

    pub fn delete_project(&self, id: &str) -> Result<Project> {
        let url = self.make_url(&["projects", id]);
        info!("Deleting project {}", id);
        Self::send_json(self.http_client.delete(&url))
    }

    pub fn get_projects(&self, name: Option<&str>) -> Result<Projects> {
        let url = self.make_url(&["projects"]);
        let mut request = self.http_client.get(&url);
        if let Some(name) = name {
            request = request.query(&[("name", name)]);
        }
        Self::send_json(request)
    }

    pub fn get_project(&self, id: &str) -> Result<Project> {
        let url = self.make_url(&["projects", id]);
        let response = self.http_client.get(&url).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found("project", format!("id '{}'", id)));
        }

        let body = Self::check_status(response)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn get_project_by_name(&self, name: &str) -> Result<Project> {
        self.get_projects(None)?.filter_by_name(name).cloned()
    }

    pub fn get_project_workflows(&self, id: &str) -> Result<Workflows> {
        self.get(&["projects", id, "workflows"])
    }

    pub fn get_project_workflow_by_name(
        &self,
        project_name: &str,
        workflow_name: &str,
    ) -> Result<Workflow> {
        let project = self.get_project_by_name(project_name)?;
        self.get_project_workflow(&project.id, workflow_name)
    }

    pub fn get_project_workflow(&self, id: &str, workflow_name: &str) -> Result<Workflow> {
        self.get(&["projects", id, "workflows", workflow_name])
    }

    pub fn get_project_revisions(&self, id: &str) -> Result<ProjectRevisions> {
        self.get(&["projects", id, "revisions"])
    }
}
