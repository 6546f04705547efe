// ABOUTME: Container image configuration used to run commands inside Docker
// ABOUTME: Holds the image name, its tag and the host volumes mounted into the container

use serde::{Deserialize, Serialize};

fn generate_tag() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Name and tag of an image. The tag is fixed when the configuration is
/// created, so every render of the same image refers to the same `name:tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfiguration {
    pub name: String,
    #[serde(default = "generate_tag")]
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub host_path: String,
    pub container_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerImage {
    pub configuration: ImageConfiguration,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

impl ImageConfiguration {
    /// Configuration with a freshly generated UUIDv4 tag
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: generate_tag(),
        }
    }

    pub fn with_tag(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// `name:tag` reference passed to docker
    pub fn full_tag(&self) -> String {
        format!("{}:{}", self.name, self.tag)
    }
}

impl Volume {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }
}

impl ContainerImage {
    pub fn new(configuration: ImageConfiguration) -> Self {
        Self {
            configuration,
            volumes: Vec::new(),
        }
    }

    pub fn with_volume(
        mut self,
        host_path: impl Into<String>,
        container_path: impl Into<String>,
    ) -> Self {
        self.volumes.push(Volume::new(host_path, container_path));
        self
    }

    pub fn full_tag(&self) -> String {
        self.configuration.full_tag()
    }
}
