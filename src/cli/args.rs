// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for digkit

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "digkit")]
#[command(about = "Render, package and deploy Digdag workflow projects")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, global = true, help = "Digdag server URL")]
    pub host: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the rendered workflow definitions of a project
    Render {
        #[arg(help = "Path to project YAML file")]
        project: PathBuf,

        #[arg(short, long, help = "Only render the named workflow")]
        workflow: Option<String>,
    },

    /// Write the project archive to a file
    Archive {
        #[arg(help = "Path to project YAML file")]
        project: PathBuf,

        #[arg(short, long, help = "Destination of the tar.gz archive")]
        output: PathBuf,
    },

    /// Archive a project and upload it to the server
    Push {
        #[arg(help = "Path to project YAML file")]
        project: PathBuf,

        #[arg(short, long, help = "Revision name (random when omitted)")]
        revision: Option<String>,

        #[arg(long, help = "Start scheduling from this time")]
        schedule_from: Option<String>,
    },

    /// List projects on the server
    Projects {
        #[arg(short, long, help = "Only show the project with this name")]
        name: Option<String>,
    },

    /// List workflows on the server
    Workflows {
        #[arg(long, help = "Only show workflows of this project")]
        project_id: Option<String>,
    },

    /// List sessions on the server
    Sessions,

    /// List attempts on the server
    Attempts {
        #[arg(short, long, help = "Only show attempts of this workflow")]
        workflow: Option<String>,
    },

    /// Start an attempt of a workflow
    Start {
        #[arg(help = "Workflow id")]
        workflow_id: String,

        #[arg(long, help = "Session time in RFC 3339 format (defaults to now)")]
        session_time: Option<String>,

        #[arg(
            short = 'p',
            long = "param",
            help = "Attempt parameters (key=value)"
        )]
        params: Vec<String>,
    },

    /// Delete a project from the server
    Delete {
        #[arg(help = "Project id")]
        project_id: String,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(
        vars: &[String],
    ) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        let mut variables = serde_json::Map::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), value.into());
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() {
        let vars = vec![
            "env=production".to_string(),
            "version=1.0.0".to_string(),
            "query=a=b".to_string(),
        ];

        let parsed = Args::parse_variables(&vars).unwrap();

        assert_eq!(parsed.get("env"), Some(&serde_json::Value::from("production")));
        assert_eq!(parsed.get("version"), Some(&serde_json::Value::from("1.0.0")));
        assert_eq!(parsed.get("query"), Some(&serde_json::Value::from("a=b")));
    }

    #[test]
    fn test_parse_variables_invalid() {
        let vars = vec!["invalid_format".to_string()];
        let result = Args::parse_variables(&vars);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_start_command() {
        let args = Args::try_parse_from([
            "digkit",
            "--host",
            "http://digdag:65432",
            "start",
            "42",
            "--param",
            "env=prod",
        ])
        .unwrap();

        assert_eq!(args.host.as_deref(), Some("http://digdag:65432"));
        match args.command {
            Commands::Start {
                workflow_id,
                session_time,
                params,
            } => {
                assert_eq!(workflow_id, "42");
                assert!(session_time.is_none());
                assert_eq!(params, vec!["env=prod".to_string()]);
            }
            _ => panic!("expected start command"),
        }
    }
}
