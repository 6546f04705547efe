// ABOUTME: Task tree structures and the closed set of task kinds
// ABOUTME: Defines command, parallel, repeat, dependency and embedded tasks plus retry policies

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::IterableError;
use super::image::ContainerImage;
use super::value::{ExportValue, Exports, Scalar};

/// Key every error handler is rendered under, whatever it was named.
pub const ERROR_TASK_NAME: &str = "_error";

/// One node of a workflow. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Exports>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub kind: TaskKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Plain named group of sub-tasks
    Group,
    Command(CommandSpec),
    /// Builds the image unless it already exists
    BuildImage {
        #[serde(default)]
        image: Option<ContainerImage>,
    },
    Parallel(ParallelConfig),
    Repeat(RepeatSpec),
    Require(Dependency),
    Call { workflow: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub image: Option<ContainerImage>,
    #[serde(default)]
    pub continue_on_failure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatSpec {
    #[serde(flatten)]
    pub configuration: ParallelConfig,
    pub iterables: IndexMap<String, Vec<Scalar>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub workflow: String,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

/// A project is referenced either by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(i64),
    Name(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    #[default]
    Constant,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RetryCondition {
    Interval {
        limit: u32,
        interval: u32,
        #[serde(default)]
        interval_type: IntervalType,
    },
    Simple {
        limit: u32,
    },
}

impl IntervalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalType::Constant => "constant",
            IntervalType::Exponential => "exponential",
        }
    }
}

impl std::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RetryCondition {
    pub fn simple(limit: u32) -> Self {
        RetryCondition::Simple { limit }
    }

    pub fn interval(limit: u32, interval: u32, interval_type: IntervalType) -> Self {
        RetryCondition::Interval {
            limit,
            interval,
            interval_type,
        }
    }

    pub fn limit(&self) -> u32 {
        match self {
            RetryCondition::Simple { limit } | RetryCondition::Interval { limit, .. } => *limit,
        }
    }
}

impl ParallelConfig {
    /// Run every child concurrently
    pub fn unlimited() -> Self {
        Self {
            parallel: true,
            limit: None,
        }
    }

    pub fn limited(limit: u32) -> Self {
        Self {
            parallel: true,
            limit: Some(limit),
        }
    }
}

impl RepeatSpec {
    /// Every iterable must hold at least one value, all of one scalar type.
    pub fn validate(&self) -> std::result::Result<(), IterableError> {
        if self.iterables.is_empty() {
            return Err(IterableError::Empty);
        }

        for (key, values) in &self.iterables {
            let first = values.first().ok_or_else(|| IterableError::EmptyValues {
                key: key.clone(),
            })?;

            if values.iter().any(|v| v.is_int() != first.is_int()) {
                return Err(IterableError::MixedTypes { key: key.clone() });
            }
        }

        Ok(())
    }
}

impl Dependency {
    pub fn new(workflow: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            project: None,
        }
    }
}

impl Task {
    fn new(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            exports: None,
            retry: None,
            tasks: Vec::new(),
            kind,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, TaskKind::Group)
    }

    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(
            name,
            TaskKind::Command(CommandSpec {
                command: Some(command.into()),
                ..Default::default()
            }),
        )
    }

    /// Failure handler for a workflow. Always rendered as `_error:`.
    pub fn error(command: impl Into<String>) -> Self {
        Self::command(ERROR_TASK_NAME, command)
    }

    pub fn build_image(name: impl Into<String>, image: ContainerImage) -> Self {
        Self::new(name, TaskKind::BuildImage { image: Some(image) })
    }

    pub fn parallel(name: impl Into<String>, configuration: ParallelConfig) -> Self {
        Self::new(name, TaskKind::Parallel(configuration))
    }

    pub fn repeat(name: impl Into<String>, iterables: IndexMap<String, Vec<Scalar>>) -> Self {
        Self::new(
            name,
            TaskKind::Repeat(RepeatSpec {
                configuration: ParallelConfig::default(),
                iterables,
            }),
        )
    }

    pub fn require(name: impl Into<String>, dependency: Dependency) -> Self {
        Self::new(name, TaskKind::Require(dependency))
    }

    pub fn call(name: impl Into<String>, workflow: impl Into<String>) -> Self {
        Self::new(
            name,
            TaskKind::Call {
                workflow: workflow.into(),
            },
        )
    }

    pub fn with_export(mut self, key: impl Into<String>, value: impl Into<ExportValue>) -> Self {
        self.exports
            .get_or_insert_with(Exports::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryCondition) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Attach an image to a command or build task. Other kinds are returned unchanged.
    pub fn with_image(mut self, image: ContainerImage) -> Self {
        match &mut self.kind {
            TaskKind::Command(spec) => spec.image = Some(image),
            TaskKind::BuildImage { image: slot } => *slot = Some(image),
            _ => {}
        }
        self
    }

    pub fn continue_on_failure(mut self) -> Self {
        if let TaskKind::Command(spec) = &mut self.kind {
            spec.continue_on_failure = true;
        }
        self
    }

    /// Parallel settings of parallel and repeat tasks.
    pub fn parallel_config(&self) -> Option<&ParallelConfig> {
        match &self.kind {
            TaskKind::Parallel(configuration) => Some(configuration),
            TaskKind::Repeat(spec) => Some(&spec.configuration),
            _ => None,
        }
    }

    pub fn is_repeat(&self) -> bool {
        matches!(self.kind, TaskKind::Repeat(_))
    }

    /// Number of tasks in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.tasks.iter().map(Task::count).sum::<usize>()
    }
}
