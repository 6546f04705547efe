// ABOUTME: Workflow model module for building Digdag task trees in memory
// ABOUTME: Exports task, image, schedule, workflow and project structures

pub mod error;
pub mod image;
pub mod schedule;
pub mod task;
pub mod value;
pub mod workflow;

pub use error::{IterableError, ModelError};
pub use image::{ContainerImage, ImageConfiguration, Volume};
pub use schedule::{CronSchedule, Schedule, Trigger};
pub use task::{
    CommandSpec, Dependency, IntervalType, ParallelConfig, ProjectRef, RepeatSpec,
    RetryCondition, Task, TaskKind, ERROR_TASK_NAME,
};
pub use value::{render_list, ExportValue, Exports, Scalar};
pub use workflow::{Project, ProjectRoot, Workflow};
