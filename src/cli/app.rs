// ABOUTME: Main application orchestration for the digkit CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};
use crate::api::DigdagClient;

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;
        self.config.override_host(args.host.clone());

        info!("Starting digkit v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        match args.command {
            Commands::Render { project, workflow } => commands::render_project(project, workflow),

            Commands::Archive { project, output } => commands::archive_project(project, output),

            Commands::Push {
                project,
                revision,
                schedule_from,
            } => commands::push_project(project, revision, schedule_from, &self.client()),

            Commands::Projects { name } => commands::list_projects(name, &self.client()),

            Commands::Workflows { project_id } => {
                commands::list_workflows(project_id, &self.client())
            }

            Commands::Sessions => commands::list_sessions(&self.client()),

            Commands::Attempts { workflow } => commands::list_attempts(workflow, &self.client()),

            Commands::Start {
                workflow_id,
                session_time,
                params,
            } => commands::start_attempt(workflow_id, session_time, params, &self.client()),

            Commands::Delete { project_id } => {
                commands::delete_project(project_id, &self.client())
            }
        }
    }

    fn client(&self) -> DigdagClient {
        debug!("Using Digdag server at {}", self.config.host);
        DigdagClient::new(&self.config.host)
    }

    /// Create application and parse command line arguments
    pub fn from_args() -> Result<(Self, Args)> {
        let args = Args::parse_args();
        let config = Config::load(args.config.clone())?;
        Ok((Self::new(config), args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_app_creation() {
        let app = App::new(Config::default());
        assert_eq!(app.config().logging.level, "info");
    }

    #[test]
    fn test_app_from_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("digkit.yaml");

        let config_content = r#"
host: http://scheduler:65432/
logging:
  level: debug
  format: compact
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let app = App::new(config);
        if std::env::var("DIGKIT_LOG_LEVEL").is_err() {
            assert_eq!(app.config().logging.level, "debug");
        }
        if std::env::var("DIGKIT_HOST").is_err() {
            assert_eq!(app.client().host(), "http://scheduler:65432/api");
        }
    }
}
