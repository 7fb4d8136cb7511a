//! Request body for `POST /v0.1/requests`.
//!
//! Testing Farm takes a list of environments; a dispatched job always
//! targets exactly one, so the model holds a single [`Environment`] and
//! only the wire form wraps it in a one-element array.

use gacek_core::subject::{Subject, SubjectArtifact};
use serde::{Serialize, Serializer};

/// Artifact type tag for Koji builds.
pub const KOJI_BUILD_ARTIFACT: &str = "fedora-koji-build";

/// A test request, minus the API key (attached by the client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    pub test: TestDefinition,
    #[serde(rename = "environments", serialize_with = "as_single_element_seq")]
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDefinition {
    pub tmt: TmtTest,
}

/// A tmt test tree and the plans to run from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TmtTest {
    pub url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub plan_filter: String,
    pub settings: TmtSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TmtSettings {
    #[serde(rename = "recognize-errors")]
    pub recognize_errors: bool,
}

/// The machine the plans run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub arch: String,
    pub os: OsSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsSpec {
    pub compose: String,
}

/// A build installed (or, here, merely made available) in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub install: bool,
}

fn as_single_element_seq<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_seq(std::iter::once(value))
}

/// Build the Testing Farm request for a job.
///
/// Subject fields are copied verbatim, error recognition is always on,
/// and every artifact becomes a non-installed Koji build keyed by its
/// task id, in input order.
pub fn build_request(subject: &Subject, artifacts: &[SubjectArtifact]) -> DispatchRequest {
    let artifacts = artifacts
        .iter()
        .map(|artifact| {
            tracing::info!(
                nvr = %artifact.nvr,
                task_id = %artifact.task_id,
                "Adding Koji build artifact",
            );
            Artifact {
                kind: KOJI_BUILD_ARTIFACT.to_string(),
                id: artifact.task_id.clone(),
                install: false,
            }
        })
        .collect();

    let request = DispatchRequest {
        test: TestDefinition {
            tmt: TmtTest {
                url: subject.url.clone(),
                git_ref: subject.git_ref.clone(),
                plan_filter: subject.filter.clone(),
                settings: TmtSettings {
                    recognize_errors: true,
                },
            },
        },
        environment: Environment {
            arch: subject.arch.clone(),
            os: OsSpec {
                compose: subject.compose.clone(),
            },
            artifacts,
        },
    };

    if let Ok(payload) = serde_json::to_string_pretty(&request) {
        tracing::info!("Testing Farm request: {payload}");
    }
    request
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn acceptance_subject() -> Subject {
        Subject {
            url: "https://example.com/repo".into(),
            git_ref: "main".into(),
            filter: "tag:acceptance".into(),
            compose: "Fedora-40".into(),
            arch: "x86_64".into(),
        }
    }

    fn artifact(nvr: &str, task_id: &str) -> SubjectArtifact {
        SubjectArtifact {
            nvr: nvr.into(),
            task_id: task_id.into(),
        }
    }

    #[test]
    fn maps_subject_and_single_artifact() {
        let request = build_request(
            &acceptance_subject(),
            &[artifact("pkg-1.0-1.fc40", "12345")],
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "test": {
                    "tmt": {
                        "url": "https://example.com/repo",
                        "ref": "main",
                        "plan_filter": "tag:acceptance",
                        "settings": { "recognize-errors": true }
                    }
                },
                "environments": [{
                    "arch": "x86_64",
                    "os": { "compose": "Fedora-40" },
                    "artifacts": [
                        { "type": "fedora-koji-build", "id": "12345", "install": false }
                    ]
                }]
            })
        );
    }

    #[test]
    fn nvr_is_not_transmitted() {
        let request = build_request(
            &acceptance_subject(),
            &[artifact("pkg-1.0-1.fc40", "12345")],
        );
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains("pkg-1.0-1.fc40"));
    }

    #[test]
    fn artifact_order_mirrors_input() {
        let request = build_request(
            &acceptance_subject(),
            &[
                artifact("c-1-1", "3"),
                artifact("a-1-1", "1"),
                artifact("b-1-1", "2"),
            ],
        );
        let ids: Vec<&str> = request
            .environment
            .artifacts
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn identical_inputs_serialize_identically() {
        let artifacts = [artifact("pkg-1.0-1.fc40", "12345"), artifact("x-2-1", "9")];
        let first = serde_json::to_vec(&build_request(&acceptance_subject(), &artifacts)).unwrap();
        let second = serde_json::to_vec(&build_request(&acceptance_subject(), &artifacts)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn no_artifacts_omits_the_key() {
        let request = build_request(&acceptance_subject(), &[]);
        let value = serde_json::to_value(&request).unwrap();
        let environments = value["environments"].as_array().unwrap();
        assert_eq!(environments.len(), 1);
        assert!(environments[0].get("artifacts").is_none());
        assert_eq!(environments[0]["arch"], "x86_64");
    }
}
