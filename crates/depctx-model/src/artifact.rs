//! Artifact coordinates (GAV plus classifier and extension)

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

const SNAPSHOT: &str = "SNAPSHOT";

/// An artifact identified by group, artifact and version.
///
/// Coordinates use the conventional `group:artifact[:extension[:classifier]]:version`
/// form. The extension defaults to `jar` and the classifier to empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: String,
    extension: String,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: String::new(),
            extension: "jar".to_string(),
        }
    }

    /// Parse `group:artifact[:extension[:classifier]]:version`.
    pub fn parse(coords: &str) -> Result<Self> {
        let parts: Vec<&str> = coords.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::InvalidCoordinates {
                coords: coords.to_string(),
            });
        }
        let artifact = match parts.as_slice() {
            [g, a, v] => Self::new(*g, *a, *v),
            [g, a, e, v] => Self::new(*g, *a, *v).with_extension(*e),
            [g, a, e, c, v] => Self::new(*g, *a, *v).with_extension(*e).with_classifier(*c),
            _ => {
                return Err(Error::InvalidCoordinates {
                    coords: coords.to_string(),
                });
            }
        };
        Ok(artifact)
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether the version denotes a snapshot (`1.0-SNAPSHOT`).
    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT)
    }

    /// File name in the default layout: `artifact-version[-classifier].extension`.
    pub fn file_name(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}-{}.{}", self.artifact_id, self.version, self.extension)
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, self.classifier, self.extension
            )
        }
    }

    /// Relative path in the default layout, always `/`-separated.
    ///
    /// `org.example:lib:1.0` maps to `org/example/lib/1.0/lib-1.0.jar`.
    pub fn layout_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for Artifact {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
