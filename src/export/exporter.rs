// ABOUTME: Recursive renderer turning a workflow task tree into .dig text
// ABOUTME: Threads indentation depth and inherited exports through every branch

use tracing::debug;

use crate::model::{ContainerImage, Exports, ProjectRef, Task, TaskKind, Workflow};

use super::command::{command_for, merge_exports};
use super::directive::{
    write_exports, write_for_each, write_parallel, write_retry, write_schedule,
};
use super::error::{ExportError, Result};
use super::writer::DigWriter;

/// Renders workflows. Output is produced only when the whole tree renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowExporter<'a> {
    default_image: Option<&'a ContainerImage>,
}

/// Render a workflow with no project-level image.
pub fn render(workflow: &Workflow) -> Result<String> {
    WorkflowExporter::new().export(workflow)
}

/// `call>` targets are workflow file names.
pub fn call_target(workflow: &str) -> String {
    if workflow.ends_with(".dig") {
        workflow.to_string()
    } else {
        format!("{}.dig", workflow)
    }
}

impl<'a> WorkflowExporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image used by command tasks that don't declare their own
    pub fn with_default_image(mut self, image: Option<&'a ContainerImage>) -> Self {
        self.default_image = image;
        self
    }

    pub fn export(&self, workflow: &Workflow) -> Result<String> {
        debug!(
            "Rendering workflow '{}' ({} top-level tasks)",
            workflow.name,
            workflow.tasks.len()
        );

        let mut writer = DigWriter::new();

        writer.entry(0, "timezone", &workflow.timezone);
        writer.blank();

        if let Some(exports) = &workflow.exports {
            write_exports(&mut writer, 0, exports);
        }

        if let Some(schedule) = &workflow.schedule {
            write_schedule(&mut writer, schedule);
        }

        let root = workflow.exports.clone().unwrap_or_default();

        for task in &workflow.tasks {
            self.export_task(&mut writer, task, 0, &root, false)?;
        }

        if let Some(error) = &workflow.error {
            self.export_task(&mut writer, error, 0, &root, true)?;
        }

        Ok(writer.finish())
    }

    fn export_task(
        &self,
        writer: &mut DigWriter,
        task: &Task,
        level: usize,
        inherited: &Exports,
        is_error: bool,
    ) -> Result<()> {
        debug!("Rendering task '{}' at depth {}", task.name, level);

        let exports = merge_exports(inherited, task.exports.as_ref());

        if is_error {
            writer.line(level, "_error:");
        } else {
            writer.line(level, format!("+{}:", task.name));
        }

        if let Some(own) = &task.exports {
            write_exports(writer, level + 1, own);
        }

        if let Some(retry) = &task.retry {
            write_retry(writer, level + 1, retry);
        }

        if let Some(config) = task.parallel_config() {
            write_parallel(writer, level + 1, config);
        }

        if let TaskKind::Repeat(spec) = &task.kind {
            spec.validate().map_err(|source| ExportError::InvalidIterables {
                task: task.name.clone(),
                source,
            })?;
            write_for_each(writer, level + 1, &spec.iterables);
        }

        self.write_action(writer, task, level + 1, &exports)?;

        if task.tasks.is_empty() {
            return Ok(());
        }

        let mut child_level = level + 1;
        if task.is_repeat() {
            writer.line(level + 1, "_do:");
            child_level += 1;
        }

        for child in &task.tasks {
            self.export_task(writer, child, child_level, &exports, false)?;
        }

        Ok(())
    }

    fn write_action(
        &self,
        writer: &mut DigWriter,
        task: &Task,
        level: usize,
        exports: &Exports,
    ) -> Result<()> {
        match &task.kind {
            TaskKind::Command(_) | TaskKind::BuildImage { .. } => {
                if let Some(command) = command_for(task, exports, self.default_image)? {
                    writer.entry(level, "sh>", command);
                    writer.blank();
                }
            }
            TaskKind::Require(dependency) => {
                writer.entry(level, "require>", &dependency.workflow);
                match &dependency.project {
                    Some(ProjectRef::Name(name)) => writer.entry(level, "project_name", name),
                    Some(ProjectRef::Id(id)) => writer.entry(level, "project_id", id),
                    None => {}
                }
                writer.blank();
            }
            TaskKind::Call { workflow } => {
                writer.entry(level, "call>", call_target(workflow));
                writer.blank();
            }
            TaskKind::Group | TaskKind::Parallel(_) | TaskKind::Repeat(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dependency, ParallelConfig, Scalar};
    use indexmap::IndexMap;

    #[test]
    fn test_minimal_workflow() {
        let workflow = Workflow::new("demo").with_task(Task::command("say_hello", "echo hello"));
        assert_eq!(
            render(&workflow).unwrap(),
            "timezone: UTC\n\n+say_hello:\n    sh>: echo hello\n\n"
        );
    }

    #[test]
    fn test_call_target_suffix() {
        assert_eq!(call_target("other"), "other.dig");
        assert_eq!(call_target("other.dig"), "other.dig");
    }

    #[test]
    fn test_nested_group_indentation() {
        let workflow = Workflow::new("nested").with_task(
            Task::group("outer")
                .with_task(Task::group("middle").with_task(Task::command("inner", "true"))),
        );

        assert_eq!(
            render(&workflow).unwrap(),
            "timezone: UTC\n\n\
             +outer:\n\
             \x20   +middle:\n\
             \x20       +inner:\n\
             \x20           sh>: true\n\n"
        );
    }

    #[test]
    fn test_repeat_children_sit_under_do() {
        let mut iterables = IndexMap::new();
        iterables.insert("n".to_string(), vec![Scalar::Int(1), Scalar::Int(2)]);
        let workflow = Workflow::new("loop").with_task(
            Task::repeat("each", iterables)
                .with_task(Task::command("print", "echo ${n}"))
                .with_task(Task::command("again", "echo again")),
        )
        .with_task(Task::command("after", "echo done"));

        let expected = "timezone: UTC\n\n\
            +each:\n\
            \x20   for_each>:\n\
            \x20       n: [1, 2]\n\n\
            \x20   _do:\n\
            \x20       +print:\n\
            \x20           sh>: echo ${n}\n\n\
            \x20       +again:\n\
            \x20           sh>: echo again\n\n\
            +after:\n\
            \x20   sh>: echo done\n\n";
        assert_eq!(render(&workflow).unwrap(), expected);
    }

    #[test]
    fn test_dependency_references() {
        let by_name = Dependency {
            workflow: "ingest".to_string(),
            project: Some(ProjectRef::Name("shared".to_string())),
        };
        let workflow = Workflow::new("refs")
            .with_task(Task::require("wait_ingest", by_name))
            .with_task(Task::require(
                "wait_other",
                Dependency {
                    workflow: "other".to_string(),
                    project: Some(ProjectRef::Id(7)),
                },
            ))
            .with_task(Task::require("local", Dependency::new("local_wf")))
            .with_task(Task::call("embed", "shared_steps"));

        let text = render(&workflow).unwrap();
        assert!(text.contains("+wait_ingest:\n    require>: ingest\n    project_name: shared\n\n"));
        assert!(text.contains("+wait_other:\n    require>: other\n    project_id: 7\n\n"));
        assert!(text.contains("+local:\n    require>: local_wf\n\n"));
        assert!(text.contains("+embed:\n    call>: shared_steps.dig\n\n"));
    }

    #[test]
    fn test_error_task_rendered_last_under_fixed_key() {
        let mut handler = Task::error("./alert.sh");
        handler.name = "on_failure".to_string();

        let workflow = Workflow::new("guarded")
            .with_error(handler)
            .with_task(Task::command("work", "./work.sh"));

        let text = render(&workflow).unwrap();
        assert!(text.ends_with("_error:\n    sh>: ./alert.sh\n\n"));
        assert!(!text.contains("on_failure"));
        assert!(text.find("+work:").unwrap() < text.find("_error:").unwrap());
    }

    #[test]
    fn test_directive_order_within_task() {
        let task = Task::parallel("fan_out", ParallelConfig::limited(3))
            .with_export("env", "prod")
            .with_retry(crate::model::RetryCondition::simple(2))
            .with_task(Task::command("a", "echo a"));
        let text = render(&Workflow::new("order").with_task(task)).unwrap();

        let positions: Vec<usize> = ["_export:", "_retry:", "_parallel:", "+a:"]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_failure_leaves_no_output() {
        let workflow = Workflow::new("bad").with_task(Task::group("ok")).with_task(Task::repeat(
            "empty",
            IndexMap::new(),
        ));
        assert!(matches!(
            render(&workflow),
            Err(ExportError::InvalidIterables { .. })
        ));
    }
}
