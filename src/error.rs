use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the manifest engine.
///
/// All variants are surfaced to the caller as-is; the engine never retries
/// and never writes a partial file on error.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened or written.
    #[error("failed to access manifest file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed JSON or a field with the wrong JSON value kind.
    #[error("could not parse manifest file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    /// The document parsed but violates one or more manifest invariants.
    /// Every violation found is listed, not just the first.
    #[error("invalid manifest file {}:\n{}", .path.display(), join_errors(.errors))]
    Invalid {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },
    /// The taint scanner flagged the file before parsing.
    #[error(
        "manifest file {} carries the mark of the web; unblock the file before using it",
        .path.display()
    )]
    Untrusted { path: PathBuf },
    /// Add targeted a package id that exists with a different version or
    /// command set.
    #[error(
        "package '{package_id}' is already pinned at version {existing_version} in {} \
         (requested {requested_version})",
        .path.display()
    )]
    PackageIdCollision {
        package_id: String,
        existing_version: String,
        requested_version: String,
        path: PathBuf,
    },
    /// Edit or Remove targeted a package id absent from the manifest.
    #[error("manifest {} does not contain package id '{package_id}'", .path.display())]
    PackageNotFound { package_id: String, path: PathBuf },
    /// The resolved view and the raw document disagree. Always a bug.
    #[error("internal manifest state inconsistency: {0}")]
    Inconsistent(String),
}

/// A single document- or entry-level invariant violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("manifest version {found} is higher than the highest supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u64 },
    #[error("manifest format version 0 is not supported")]
    VersionZero,
    #[error("missing required field 'isRoot'")]
    MissingIsRoot,
    #[error("the same package id appears more than once: {}", .0.join(", "))]
    DuplicatePackageIds(Vec<String>),
    #[error("in package '{package_id}':\n{}", join_problems(.problems))]
    Package {
        package_id: String,
        problems: Vec<EntryProblem>,
    },
}

/// A problem scoped to one tool entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryProblem {
    #[error("the tool is missing a version")]
    MissingVersion,
    #[error("version '{0}' is not a valid version string")]
    InvalidVersion(String),
    #[error("the 'commands' field is missing or empty")]
    MissingCommands,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\t{e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_problems(problems: &[EntryProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("\t\t{p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_error() {
        let err = ManifestError::Invalid {
            path: PathBuf::from("toolpin.json"),
            errors: vec![
                ValidationError::MissingIsRoot,
                ValidationError::DuplicatePackageIds(vec!["a".to_string(), "b".to_string()]),
                ValidationError::Package {
                    package_id: "c".to_string(),
                    problems: vec![EntryProblem::MissingVersion, EntryProblem::MissingCommands],
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("isRoot"));
        assert!(message.contains("a, b"));
        assert!(message.contains("in package 'c'"));
        assert!(message.contains("\t\tthe tool is missing a version"));
        assert!(message.contains("\t\tthe 'commands' field is missing or empty"));
    }

    #[test]
    fn collision_names_both_versions() {
        let err = ManifestError::PackageIdCollision {
            package_id: "t1".to_string(),
            existing_version: "1.0.0".to_string(),
            requested_version: "2.0.0".to_string(),
            path: PathBuf::from("toolpin.json"),
        };
        let message = err.to_string();
        assert!(message.contains("1.0.0"));
        assert!(message.contains("2.0.0"));
    }
}
