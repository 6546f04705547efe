// ABOUTME: Typed records for Digdag REST API responses and requests
// ABOUTME: Includes lookup helpers over returned collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::{ApiError, Result};

/// Body of `PUT /api/attempts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptParameters {
    pub session_time: DateTime<Utc>,
    pub workflow_id: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReference {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReference {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub project: ProjectReference,
    pub revision: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: String,
    pub done: bool,
    pub success: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry_attempt_name: Option<String>,
    #[serde(default)]
    pub cancel_requested: bool,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAttempt {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub workflow: WorkflowReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRevision {
    pub revision: String,
    pub created_at: DateTime<Utc>,
    pub archive_type: String,
    pub archive_md5: String,
    #[serde(default)]
    pub user_info: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub revision: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub archive_type: String,
    pub archive_md5: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub project: ProjectReference,
    pub workflow: WorkflowReference,
    pub session_uuid: Uuid,
    pub session_time: DateTime<Utc>,
    #[serde(default)]
    pub last_attempt: Option<Attempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflows {
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attempts {
    pub attempts: Vec<WorkflowAttempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionAttempts {
    pub attempts: Vec<WorkflowAttempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sessions {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projects {
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRevisions {
    pub revisions: Vec<ProjectRevision>,
}

impl WorkflowReference {
    /// Parameters for starting this workflow. Defaults to the current time
    /// and no extra params.
    pub fn create_attempt_parameters(
        &self,
        session_time: Option<DateTime<Utc>>,
        params: Option<Map<String, Value>>,
    ) -> AttemptParameters {
        AttemptParameters {
            session_time: session_time.unwrap_or_else(Utc::now),
            workflow_id: self.id.clone(),
            params: params.unwrap_or_default(),
        }
    }
}

impl Workflow {
    pub fn reference(&self) -> WorkflowReference {
        WorkflowReference {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl Workflows {
    pub fn iter(&self) -> std::slice::Iter<'_, Workflow> {
        self.workflows.iter()
    }

    fn find_by(
        &self,
        field: &str,
        value: &str,
        predicate: impl Fn(&Workflow) -> bool,
    ) -> Result<&Workflow> {
        self.workflows
            .iter()
            .find(|w| predicate(*w))
            .ok_or_else(|| ApiError::not_found("workflow", format!("{} '{}'", field, value)))
    }

    pub fn filter_by_name(&self, name: &str) -> Result<&Workflow> {
        self.find_by("name", name, |w| w.name == name)
    }

    pub fn filter_by_id(&self, id: &str) -> Result<&Workflow> {
        self.find_by("id", id, |w| w.id == id)
    }

    pub fn filter_by_project_name(&self, name: &str) -> Result<&Workflow> {
        self.find_by("project name", name, |w| w.project.name == name)
    }

    pub fn filter_by_project_id(&self, id: &str) -> Result<&Workflow> {
        self.find_by("project id", id, |w| w.project.id == id)
    }

    pub fn filter_by_revision(&self, revision: &str) -> Result<&Workflow> {
        self.find_by("revision", revision, |w| w.revision == revision)
    }
}

impl<'a> IntoIterator for &'a Workflows {
    type Item = &'a Workflow;
    type IntoIter = std::slice::Iter<'a, Workflow>;

    fn into_iter(self) -> Self::IntoIter {
        self.workflows.iter()
    }
}

impl Attempts {
    /// Attempts belonging to workflows with the given name
    pub fn for_workflow(&self, name: &str) -> Attempts {
        Attempts {
            attempts: self
                .attempts
                .iter()
                .filter(|a| a.workflow.name == name)
                .cloned()
                .collect(),
        }
    }
}

impl Projects {
    pub fn iter(&self) -> std::slice::Iter<'_, Project> {
        self.projects.iter()
    }

    pub fn filter_by_name(&self, name: &str) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ApiError::not_found("project", format!("name '{}'", name)))
    }
}

impl<'a> IntoIterator for &'a Projects {
    type Item = &'a Project;
    type IntoIter = std::slice::Iter<'a, Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}
