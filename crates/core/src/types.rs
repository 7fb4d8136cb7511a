use std::ffi::OsStr;
use std::fmt;

use crate::error::CoreError;

/// Name of a job directory entry.
///
/// A job name is always a single, non-empty path component so it can be
/// joined onto the queue and jobs roots without escaping either of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobName(String);

impl JobName {
    /// Validate and wrap a raw directory entry name.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidJobName {
                name,
                reason: "must not be empty",
            });
        }
        if name == "." || name == ".." {
            return Err(CoreError::InvalidJobName {
                name,
                reason: "must not be a relative directory reference",
            });
        }
        if name.contains('/') || name.contains('\0') || (cfg!(windows) && name.contains('\\')) {
            return Err(CoreError::InvalidJobName {
                name,
                reason: "must be a single path component",
            });
        }
        Ok(Self(name))
    }

    /// Validate a raw directory entry name, which need not be UTF-8.
    pub fn from_entry(name: &OsStr) -> Result<Self, CoreError> {
        match name.to_str() {
            Some(name) => Self::new(name),
            None => Err(CoreError::InvalidJobName {
                name: name.to_string_lossy().into_owned(),
                reason: "must be valid UTF-8",
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_plain_names() {
        let name = JobName::new("job-0042.fc40").unwrap();
        assert_eq!(name.as_str(), "job-0042.fc40");
        assert_eq!(name.to_string(), "job-0042.fc40");
    }

    #[test]
    fn rejects_empty_name() {
        assert_matches!(JobName::new(""), Err(CoreError::InvalidJobName { .. }));
    }

    #[test]
    fn rejects_dot_entries() {
        assert!(JobName::new(".").is_err());
        assert!(JobName::new("..").is_err());
    }

    #[test]
    fn rejects_path_separators() {
        assert!(JobName::new("a/b").is_err());
        assert!(JobName::new("../escape").is_err());
        assert!(JobName::new("a\0b").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn accepts_backslash_on_unix() {
        let name = JobName::new("odd\\name").unwrap();
        assert_eq!(name.as_str(), "odd\\name");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_entry_is_rejected() {
        use std::os::unix::ffi::OsStrExt;

        let entry = OsStr::from_bytes(b"job-\xff");
        assert_matches!(
            JobName::from_entry(entry),
            Err(CoreError::InvalidJobName { reason: "must be valid UTF-8", .. })
        );
        assert_eq!(
            JobName::from_entry(OsStr::new("job-1")).unwrap().as_str(),
            "job-1"
        );
    }

    #[test]
    fn orders_lexicographically() {
        let mut names = vec![
            JobName::new("c").unwrap(),
            JobName::new("a").unwrap(),
            JobName::new("b").unwrap(),
        ];
        names.sort();
        let names: Vec<&str> = names.iter().map(JobName::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
