use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gacek_testing_farm::api::{ApiKey, DEFAULT_API_URL};

/// Shared NFS root holding the jobs and queues trees.
pub const DEFAULT_GACEK_HOME: &str = "/mnt/nfs/gacek";

/// What the dispatch loop does when one job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run. The failed job and every job after it stay in `new`.
    #[default]
    Abort,
    /// Log the failure, leave the job in `new` and carry on.
    SkipJob,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::SkipJob),
            other => Err(format!("expected `abort` or `skip`, got `{other}`")),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Failed to read API key file {}: {source}", .path.display())]
    ApiKeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("API key file {} is empty", .path.display())]
    EmptyApiKey { path: PathBuf },
}

/// Dispatcher configuration, built once per run.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Root of the per-job descriptor directories.
    pub jobs_dir: PathBuf,
    /// Root of the `new` / `pending` state directories.
    pub queues_dir: PathBuf,
    /// File whose entire contents are the Testing Farm API key.
    pub api_key_file: PathBuf,
    /// Testing Farm base URL.
    pub api_url: String,
    pub failure_policy: FailurePolicy,
}

impl DispatcherConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                           |
    /// |-----------------------|-----------------------------------|
    /// | `GACEK_HOME`          | `/mnt/nfs/gacek`                  |
    /// | `GACEK_JOBS_DIR`      | `$GACEK_HOME/jobs`                |
    /// | `GACEK_QUEUES_DIR`    | `$GACEK_HOME/queues`              |
    /// | `TF_API_KEY_FILE`     | required                          |
    /// | `TF_API_URL`          | `https://api.dev.testing-farm.io` |
    /// | `DISPATCH_ON_FAILURE` | `abort` (`abort` or `skip`)       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let home = PathBuf::from(var("GACEK_HOME").unwrap_or_else(|| DEFAULT_GACEK_HOME.into()));
        let jobs_dir = var("GACEK_JOBS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("jobs"));
        let queues_dir = var("GACEK_QUEUES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("queues"));

        let api_key_file = var("TF_API_KEY_FILE")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("TF_API_KEY_FILE"))?;

        let api_url = var("TF_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());

        let failure_policy = match var("DISPATCH_ON_FAILURE") {
            Some(value) => value.parse::<FailurePolicy>().map_err(|reason| ConfigError::Invalid {
                var: "DISPATCH_ON_FAILURE",
                reason,
            })?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            jobs_dir,
            queues_dir,
            api_key_file,
            api_url,
            failure_policy,
        })
    }

    /// Read the API key file. The whole file is the key, untrimmed.
    pub fn load_api_key(&self) -> Result<ApiKey, ConfigError> {
        read_api_key(&self.api_key_file)
    }
}

fn read_api_key(path: &Path) -> Result<ApiKey, ConfigError> {
    let key = fs::read_to_string(path).map_err(|source| ConfigError::ApiKeyFile {
        path: path.to_path_buf(),
        source,
    })?;
    if key.is_empty() {
        return Err(ConfigError::EmptyApiKey {
            path: path.to_path_buf(),
        });
    }
    Ok(ApiKey::new(key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_derive_from_gacek_home() {
        let config =
            DispatcherConfig::from_lookup(lookup(&[("TF_API_KEY_FILE", "/etc/tf/api-key")]))
                .unwrap();

        assert_eq!(config.jobs_dir, PathBuf::from("/mnt/nfs/gacek/jobs"));
        assert_eq!(config.queues_dir, PathBuf::from("/mnt/nfs/gacek/queues"));
        assert_eq!(config.api_key_file, PathBuf::from("/etc/tf/api-key"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn explicit_directories_override_home() {
        let config = DispatcherConfig::from_lookup(lookup(&[
            ("GACEK_HOME", "/srv/gacek"),
            ("GACEK_QUEUES_DIR", "/var/spool/gacek"),
            ("TF_API_KEY_FILE", "/etc/tf/api-key"),
            ("TF_API_URL", "http://localhost:8080"),
            ("DISPATCH_ON_FAILURE", "skip"),
        ]))
        .unwrap();

        assert_eq!(config.jobs_dir, PathBuf::from("/srv/gacek/jobs"));
        assert_eq!(config.queues_dir, PathBuf::from("/var/spool/gacek"));
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.failure_policy, FailurePolicy::SkipJob);
    }

    #[test]
    fn api_key_file_is_required() {
        assert_matches!(
            DispatcherConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("TF_API_KEY_FILE"))
        );
        assert_matches!(
            DispatcherConfig::from_lookup(lookup(&[("TF_API_KEY_FILE", "")])),
            Err(ConfigError::Missing("TF_API_KEY_FILE"))
        );
    }

    #[test]
    fn unknown_failure_policy_is_rejected() {
        let result = DispatcherConfig::from_lookup(lookup(&[
            ("TF_API_KEY_FILE", "/etc/tf/api-key"),
            ("DISPATCH_ON_FAILURE", "retry"),
        ]));
        assert_matches!(
            result,
            Err(ConfigError::Invalid {
                var: "DISPATCH_ON_FAILURE",
                ..
            })
        );
    }

    #[test]
    fn api_key_is_the_whole_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("api-key");
        fs::write(&path, "secret\n").unwrap();

        let key = read_api_key(&path).unwrap();
        assert_eq!(key.expose(), "secret\n");
    }

    #[test]
    fn empty_or_missing_api_key_file_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("api-key");
        assert_matches!(read_api_key(&path), Err(ConfigError::ApiKeyFile { .. }));

        fs::write(&path, "").unwrap();
        assert_matches!(read_api_key(&path), Err(ConfigError::EmptyApiKey { .. }));
    }
}
