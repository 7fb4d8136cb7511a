//! Job descriptor records: the test subject and its build artifacts.
//!
//! Both are written by the external job producer as small XML documents
//! (`subject.xml`, `artifacts.xml`). The root element name is not
//! significant; only the child element names are. Absent child elements
//! read as empty strings, unknown ones are ignored. Leading and trailing
//! whitespace around element text is trimmed.

use serde::Deserialize;

use crate::error::CoreError;

/// What to test: the tmt source tree, the plans to run, and the target
/// operating system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Subject {
    /// Git URL of the repository holding the tmt plans.
    pub url: String,
    /// Git ref to check out.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// tmt plan filter expression, e.g. `tag:acceptance`.
    pub filter: String,
    /// OS compose identifier, e.g. `Fedora-40`.
    pub compose: String,
    /// Target architecture, e.g. `x86_64`.
    pub arch: String,
}

/// A Koji build to install into the test environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubjectArtifact {
    /// Name-version-release of the build. Informational only.
    pub nvr: String,
    /// Koji task identifier; this is what gets submitted.
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// `<artifact>` elements may be interleaved with other elements; the
/// workspace enables quick-xml's `overlapped-lists` for this.
#[derive(Debug, Default, Deserialize)]
struct ArtifactList {
    #[serde(default, rename = "artifact")]
    artifacts: Vec<SubjectArtifact>,
}

/// Parse a `subject.xml` document.
pub fn parse_subject(xml: &str) -> Result<Subject, CoreError> {
    quick_xml::de::from_str(xml).map_err(|e| CoreError::Markup {
        document: "subject",
        message: e.to_string(),
    })
}

/// Parse an `artifacts.xml` document, preserving element order.
pub fn parse_artifacts(xml: &str) -> Result<Vec<SubjectArtifact>, CoreError> {
    quick_xml::de::from_str::<ArtifactList>(xml)
        .map(|list| list.artifacts)
        .map_err(|e| CoreError::Markup {
            document: "artifacts",
            message: e.to_string(),
        })
}
