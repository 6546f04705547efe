// ABOUTME: Workflow and project structures plus project definition loading
// ABOUTME: Parses YAML project files and validates their structure

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::{ModelError, Result};
use super::image::ContainerImage;
use super::schedule::Schedule;
use super::task::{RetryCondition, Task, TaskKind, ERROR_TASK_NAME};
use super::value::{ExportValue, Exports};

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Exports>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    /// Failure handler, rendered last under `_error:`
    #[serde(
        default,
        deserialize_with = "deserialize_error_task",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<Task>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// The error handler is the one task allowed to omit its name.
#[derive(Deserialize)]
struct ErrorTask {
    #[serde(default = "error_task_name")]
    name: String,
    #[serde(default)]
    exports: Option<Exports>,
    #[serde(default)]
    retry: Option<RetryCondition>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(flatten)]
    kind: TaskKind,
}

fn error_task_name() -> String {
    ERROR_TASK_NAME.to_string()
}

fn deserialize_error_task<'de, D>(deserializer: D) -> std::result::Result<Option<Task>, D::Error>
where
    D: Deserializer<'de>,
{
    let handler = Option::<ErrorTask>::deserialize(deserializer)?;
    Ok(handler.map(|handler| Task {
        name: handler.name,
        exports: handler.exports,
        retry: handler.retry,
        tasks: handler.tasks,
        kind: handler.kind,
    }))
}

/// Directory bundled into the project archive next to the rendered workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoot {
    pub path: PathBuf,
    /// Glob patterns matched against entry names and paths
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ProjectRoot>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ContainerImage>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timezone: default_timezone(),
            exports: None,
            schedule: None,
            error: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_export(mut self, key: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        self.exports
            .get_or_insert_with(Exports::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_error(mut self, error: Task) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// File name inside the project archive
    pub fn file_name(&self) -> String {
        format!("{}.dig", self.name)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("workflow name".to_string()));
        }

        for task in &self.tasks {
            validate_task(task)?;
        }

        // The error handler's name is replaced on render, so it may be anything.
        if let Some(error) = &self.error {
            for task in &error.tasks {
                validate_task(task)?;
            }
        }

        Ok(())
    }
}

fn validate_task(task: &Task) -> Result<()> {
    if task.name.trim().is_empty() {
        return Err(ModelError::MissingField("task name".to_string()));
    }

    if let TaskKind::Repeat(spec) = &task.kind {
        spec.validate().map_err(|source| ModelError::InvalidIterables {
            task: task.name.clone(),
            source,
        })?;
    }

    for child in &task.tasks {
        validate_task(child)?;
    }

    Ok(())
}

impl ProjectRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ignore: Vec::new(),
        }
    }

    pub fn with_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
            workflows: Vec::new(),
            image: None,
        }
    }

    pub fn with_root(mut self, root: ProjectRoot) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflows.push(workflow);
        self
    }

    pub fn with_image(mut self, image: ContainerImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Parse a project definition from a YAML file. A relative root path is
    /// resolved against the directory containing the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ModelError::IoError)?;
        let mut project = Self::from_yaml(&content)?;

        if let (Some(root), Some(base)) = (project.root.as_mut(), path.parent()) {
            if root.path.is_relative() {
                root.path = base.join(&root.path);
            }
        }

        Ok(project)
    }

    /// Parse a project definition from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let project: Project = serde_yaml::from_str(content).map_err(ModelError::YamlError)?;
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("name".to_string()));
        }

        let mut names = HashSet::new();
        for workflow in &self.workflows {
            workflow.validate()?;
            if !names.insert(workflow.name.as_str()) {
                return Err(ModelError::DuplicateWorkflow(workflow.name.clone()));
            }
        }

        Ok(())
    }

    pub fn workflow(&self, name: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.name == name)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ModelError::YamlError)
    }
}
