// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides temp project trees, archive inspection and a one-shot HTTP responder

#![allow(dead_code)]

use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

use digkit::model::{
    ContainerImage, ImageConfiguration, Project, ProjectRoot, Schedule, Task, Workflow,
};

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` at `relative`, creating parent directories
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn root(&self) -> ProjectRoot {
        ProjectRoot::new(self.temp_dir.path())
    }
}

pub fn etl_image() -> ContainerImage {
    ContainerImage::new(ImageConfiguration::with_tag("etl", "v1"))
        .with_volume("/data", "/mnt/data")
}

/// Two workflows: one scheduled with a plain command, one running inside a container
pub fn sample_project() -> Project {
    let daily = Workflow::new("daily_report")
        .with_schedule(Schedule::daily("07:00:00"))
        .with_export("env", "prod")
        .with_task(Task::command("extract", "./extract.sh"))
        .with_task(Task::command("load", "./load.sh").continue_on_failure());

    let containerized = Workflow::new("containerized")
        .with_task(Task::command("transform", "python transform.py").with_image(etl_image()));

    Project::new("analytics")
        .with_workflow(daily)
        .with_workflow(containerized)
}

/// Decompress an archive and return its regular files keyed by path
pub fn archive_files(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = BTreeMap::new();

    for entry in archive.entries().expect("Failed to read archive entries") {
        let mut entry = entry.expect("Failed to read archive entry");
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .expect("Entry has no path")
            .to_string_lossy()
            .into_owned();
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .expect("Failed to read entry content");
        files.insert(path, content);
    }

    files
}

/// A request captured by the one-shot responder
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves exactly one HTTP response, then hands back the request it received
pub struct OneShotServer {
    pub url: String,
    requests: Receiver<CapturedRequest>,
    handle: JoinHandle<()>,
}

impl OneShotServer {
    pub fn start(status: u16, body: &str) -> Self {
        Self::start_raw(format!(
            "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        ))
    }

    /// Write `response` to the socket verbatim
    pub fn start_raw(response: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (sender, requests) = mpsc::channel();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("Failed to accept connection");
            let mut reader = BufReader::new(stream.try_clone().expect("Failed to clone stream"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_string(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            sender
                .send(CapturedRequest {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: request_body,
                })
                .unwrap();
        });

        Self {
            url,
            requests,
            handle,
        }
    }

    /// Wait for the server thread and return the request it handled
    pub fn finish(self) -> CapturedRequest {
        self.handle.join().expect("Server thread panicked");
        self.requests.recv().expect("No request captured")
    }
}
