// ABOUTME: Resolves the shell command a task runs, including docker wrapping
// ABOUTME: Merges inherited export variables and builds container start commands

use crate::model::{CommandSpec, ContainerImage, Exports, Task, TaskKind};

use super::error::{ExportError, Result};

/// Prefix of the environment variables carrying Digdag built-ins into a container.
pub const ENV_PREFIX: &str = "DIGDAG_";

/// Built-in variables passed into every container, in this order.
pub const BUILTIN_VARIABLES: [&str; 7] = [
    "timezone",
    "project_id",
    "task_name",
    "attempt_id",
    "session_uuid",
    "session_id",
    "session_time",
];

/// Appended to a command so its exit status is always success.
const IGNORE_FAILURE: &str = "|| :";

/// Exports visible to a task: the parent's set overlaid with the task's own.
/// Returns a fresh map so sibling branches never see each other's keys.
pub fn merge_exports(parent: &Exports, own: Option<&Exports>) -> Exports {
    let mut merged = parent.clone();
    if let Some(own) = own {
        for (key, value) in own {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

pub fn container_start_command(image: &ContainerImage, exports: &Exports) -> String {
    let mut parts = vec!["sudo docker run".to_string()];

    for volume in &image.volumes {
        parts.push(format!("-v {}:{}", volume.host_path, volume.container_path));
    }

    for variable in BUILTIN_VARIABLES {
        parts.push(format!(
            "-e {}{}='${{{}}}'",
            ENV_PREFIX,
            variable.to_uppercase(),
            variable
        ));
    }

    for key in exports.keys() {
        parts.push(format!("-e {}='${{{}}}'", key, key));
    }

    parts.push(image.full_tag());
    parts.join(" ")
}

/// Build the image only when docker does not already know the tag.
pub fn build_image_command(image: &ContainerImage) -> String {
    let tag = image.full_tag();
    format!(
        "sudo docker image inspect {} > /dev/null || sudo docker build --tag {} .",
        tag, tag
    )
}

/// Command for `task` given the exports inherited from its ancestors.
/// Tasks that do not run a shell command resolve to `None`.
pub fn resolve_command(
    task: &Task,
    inherited: &Exports,
    default_image: Option<&ContainerImage>,
) -> Result<Option<String>> {
    let exports = merge_exports(inherited, task.exports.as_ref());
    command_for(task, &exports, default_image)
}

/// Same as [`resolve_command`] but with the task's own exports already merged.
pub(crate) fn command_for(
    task: &Task,
    exports: &Exports,
    default_image: Option<&ContainerImage>,
) -> Result<Option<String>> {
    match &task.kind {
        TaskKind::Command(spec) => shell_command(task, spec, exports, default_image).map(Some),
        TaskKind::BuildImage { image } => {
            let image = image
                .as_ref()
                .or(default_image)
                .ok_or_else(|| ExportError::MissingImage {
                    task: task.name.clone(),
                })?;
            Ok(Some(build_image_command(image)))
        }
        TaskKind::Group
        | TaskKind::Parallel(_)
        | TaskKind::Repeat(_)
        | TaskKind::Require(_)
        | TaskKind::Call { .. } => Ok(None),
    }
}

fn shell_command(
    task: &Task,
    spec: &CommandSpec,
    exports: &Exports,
    default_image: Option<&ContainerImage>,
) -> Result<String> {
    let command = spec
        .command
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ExportError::MissingCommand {
            task: task.name.clone(),
        })?;

    let mut parts = Vec::new();

    if let Some(image) = spec.image.as_ref().or(default_image) {
        parts.push(container_start_command(image, exports));
    }

    parts.push(command.to_string());

    if spec.continue_on_failure {
        parts.push(IGNORE_FAILURE.to_string());
    }

    Ok(parts.join(" "))
}
